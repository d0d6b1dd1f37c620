use anyhow::Result;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::SqlitePool;
use std::str::FromStr;
use std::sync::Arc;
use tracing::info;

/// Schema statements, applied in order at startup
const SCHEMA: &[&str] = &[
    r#"
    CREATE TABLE IF NOT EXISTS species (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        scientific_name TEXT NOT NULL UNIQUE,
        common_name TEXT
    );
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS stocks (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        species_id INTEGER NOT NULL,
        name TEXT NOT NULL,
        description TEXT,
        FOREIGN KEY (species_id) REFERENCES species (id) ON DELETE CASCADE
    );
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS lines (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        stock_id INTEGER NOT NULL,
        name TEXT NOT NULL,
        description TEXT,
        FOREIGN KEY (stock_id) REFERENCES stocks (id) ON DELETE RESTRICT
    );
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS animals (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        line_id INTEGER NOT NULL,
        litter_id INTEGER,
        sex TEXT NOT NULL,
        date_of_birth TEXT NOT NULL,
        date_of_death TEXT,
        name TEXT,
        notes TEXT,
        created_at TEXT NOT NULL,
        updated_at TEXT NOT NULL,
        FOREIGN KEY (line_id) REFERENCES lines (id) ON DELETE RESTRICT,
        FOREIGN KEY (litter_id) REFERENCES litters (id) ON DELETE SET NULL
    );
    "#,
    "CREATE INDEX IF NOT EXISTS idx_animals_line_id ON animals(line_id);",
    r#"
    CREATE TABLE IF NOT EXISTS pairings (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        dam_id INTEGER NOT NULL,
        sire_id INTEGER NOT NULL,
        paired_on TEXT NOT NULL,
        separated_on TEXT,
        FOREIGN KEY (dam_id) REFERENCES animals (id) ON DELETE RESTRICT,
        FOREIGN KEY (sire_id) REFERENCES animals (id) ON DELETE RESTRICT
    );
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS litters (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        pairing_id INTEGER NOT NULL,
        date_of_birth TEXT NOT NULL,
        pup_count INTEGER NOT NULL CHECK (pup_count >= 0),
        notes TEXT,
        FOREIGN KEY (pairing_id) REFERENCES pairings (id) ON DELETE CASCADE
    );
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS ancestry_edges (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        descendant_id INTEGER NOT NULL,
        ancestor_id INTEGER NOT NULL,
        generation INTEGER NOT NULL CHECK (generation >= 1),
        sequence INTEGER NOT NULL CHECK (sequence >= 1),
        relationship TEXT NOT NULL,
        UNIQUE (descendant_id, generation, sequence),
        FOREIGN KEY (descendant_id) REFERENCES animals (id) ON DELETE CASCADE,
        FOREIGN KEY (ancestor_id) REFERENCES animals (id) ON DELETE CASCADE
    );
    "#,
    "CREATE INDEX IF NOT EXISTS idx_ancestry_edges_ancestor ON ancestry_edges(ancestor_id);",
    r#"
    CREATE TABLE IF NOT EXISTS account_types (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        name TEXT NOT NULL UNIQUE
    );
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS individuals (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        first_name TEXT NOT NULL,
        last_name TEXT NOT NULL,
        email TEXT
    );
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS users (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        individual_id INTEGER NOT NULL,
        account_type_id INTEGER NOT NULL,
        created_at TEXT NOT NULL,
        updated_at TEXT NOT NULL,
        FOREIGN KEY (individual_id) REFERENCES individuals (id) ON DELETE CASCADE,
        FOREIGN KEY (account_type_id) REFERENCES account_types (id) ON DELETE RESTRICT
    );
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS credentials (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        user_id INTEGER NOT NULL UNIQUE,
        username TEXT NOT NULL UNIQUE,
        password_hash TEXT NOT NULL,
        FOREIGN KEY (user_id) REFERENCES users (id) ON DELETE CASCADE
    );
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS studies (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        name TEXT NOT NULL,
        description TEXT,
        start_date TEXT NOT NULL,
        end_date TEXT,
        created_at TEXT NOT NULL,
        updated_at TEXT NOT NULL
    );
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS study_groups (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        study_id INTEGER NOT NULL,
        name TEXT NOT NULL,
        group_type TEXT NOT NULL,
        FOREIGN KEY (study_id) REFERENCES studies (id) ON DELETE CASCADE
    );
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS study_animals (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        study_group_id INTEGER NOT NULL,
        animal_id INTEGER NOT NULL,
        UNIQUE (study_group_id, animal_id),
        FOREIGN KEY (study_group_id) REFERENCES study_groups (id) ON DELETE CASCADE,
        FOREIGN KEY (animal_id) REFERENCES animals (id) ON DELETE CASCADE
    );
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS data_points (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        study_id INTEGER NOT NULL,
        name TEXT NOT NULL,
        data_type TEXT NOT NULL,
        options TEXT NOT NULL DEFAULT '[]',
        FOREIGN KEY (study_id) REFERENCES studies (id) ON DELETE CASCADE
    );
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS observations (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        study_animal_id INTEGER NOT NULL,
        data_point_id INTEGER NOT NULL,
        value TEXT NOT NULL,
        recorded_at TEXT NOT NULL,
        FOREIGN KEY (study_animal_id) REFERENCES study_animals (id) ON DELETE CASCADE,
        FOREIGN KEY (data_point_id) REFERENCES data_points (id) ON DELETE CASCADE
    );
    "#,
    "CREATE INDEX IF NOT EXISTS idx_observations_study_animal ON observations(study_animal_id);",
];

/// DbConnection owns the SQLite pool shared by every repository
#[derive(Clone)]
pub struct DbConnection {
    pool: Arc<SqlitePool>,
}

impl DbConnection {
    /// Open (creating if missing) the database at `url` and set up the schema
    pub async fn new(url: &str) -> Result<Self> {
        let options = SqliteConnectOptions::from_str(url)?
            .create_if_missing(true)
            .foreign_keys(true);

        let pool = SqlitePoolOptions::new()
            .max_connections(5)
            .connect_with(options)
            .await?;

        Self::setup_schema(&pool).await?;
        info!("Database ready at {}", url);

        Ok(Self { pool: Arc::new(pool) })
    }

    /// Private in-memory database, one per call.
    ///
    /// A single connection that never idles out keeps the memory database alive.
    pub async fn init_test() -> Result<Self> {
        let options = SqliteConnectOptions::from_str("sqlite::memory:")?.foreign_keys(true);
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .min_connections(1)
            .idle_timeout(None)
            .max_lifetime(None)
            .connect_with(options)
            .await?;

        Self::setup_schema(&pool).await?;

        Ok(Self { pool: Arc::new(pool) })
    }

    /// Get a reference to the connection pool
    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Set up the required database schema
    async fn setup_schema(pool: &SqlitePool) -> Result<()> {
        for statement in SCHEMA {
            sqlx::query(statement).execute(pool).await?;
        }
        Ok(())
    }
}
