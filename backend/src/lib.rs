//! # Breeding Tracker Backend
//!
//! Breeding records for rodent colonies served over a JSON REST API.
//!
//! ## Architecture
//!
//! ```text
//! IO Layer (REST handlers, mappers, envelope)
//!     ↓
//! Domain Layer (services, commands, rules)
//!     ↓
//! Storage Layer (SQLite repositories behind traits)
//! ```
//!
//! [`initialize_backend`] opens the database and wires the services into an
//! [`AppState`]; [`create_router`] mounts every endpoint under `/api`.

pub mod auth;
pub mod config;
pub mod domain;
pub mod io;
pub mod storage;

use std::any::Any;
use std::sync::Arc;

use anyhow::Result;
use axum::extract::FromRef;
use axum::http::header::{AUTHORIZATION, CONTENT_TYPE};
use axum::http::{Method, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::{delete, get, post, put};
use axum::{Json, Router};
use shared::ApiResponse;
use tower_http::catch_panic::CatchPanicLayer;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::{error, info};

use crate::auth::TokenIssuer;
use crate::config::Config;
use crate::domain::{
    AccountService, AncestryService, AnimalService, BreedingService, LineService, SpeciesService,
    StudyService,
};
use crate::io::rest::{
    account_apis, animal_apis, breeding_apis, health_apis, line_apis, species_apis, study_apis,
    INTERNAL_ERROR_MESSAGE,
};
use crate::storage::{
    AccountRepository, AncestryRepository, AnimalRepository, BreedingRepository, DbConnection,
    LineRepository, SpeciesRepository, StudyRepository,
};

/// Main application state that holds all services
#[derive(Clone)]
pub struct AppState {
    pub species_service: SpeciesService,
    pub line_service: LineService,
    pub animal_service: AnimalService,
    pub ancestry_service: AncestryService,
    pub breeding_service: BreedingService,
    pub account_service: AccountService,
    pub study_service: StudyService,
    pub token_issuer: TokenIssuer,
}

impl AppState {
    /// Wire repositories over `db` into the domain services
    pub fn new(db: DbConnection, config: &Config) -> Self {
        let species = Arc::new(SpeciesRepository::new(db.clone()));
        let lines = Arc::new(LineRepository::new(db.clone()));
        let animals = Arc::new(AnimalRepository::new(db.clone()));
        let ancestry = Arc::new(AncestryRepository::new(db.clone()));
        let breeding = Arc::new(BreedingRepository::new(db.clone()));
        let accounts = Arc::new(AccountRepository::new(db.clone()));
        let studies = Arc::new(StudyRepository::new(db));

        let token_issuer = TokenIssuer::from_config(config);

        Self {
            species_service: SpeciesService::new(species.clone()),
            line_service: LineService::new(lines.clone(), species),
            animal_service: AnimalService::new(animals.clone(), lines, breeding.clone(), ancestry.clone()),
            ancestry_service: AncestryService::new(ancestry, animals.clone()),
            breeding_service: BreedingService::new(breeding, animals.clone()),
            account_service: AccountService::new(accounts, token_issuer.clone()),
            study_service: StudyService::new(studies, animals),
            token_issuer,
        }
    }
}

impl FromRef<AppState> for TokenIssuer {
    fn from_ref(state: &AppState) -> Self {
        state.token_issuer.clone()
    }
}

/// Initialize the backend with all required services
pub async fn initialize_backend(config: &Config) -> Result<AppState> {
    info!("Setting up database");
    let db = DbConnection::new(&config.database_url).await?;

    info!("Setting up application state");
    Ok(AppState::new(db, config))
}

/// Create the Axum router with all routes configured
pub fn create_router(app_state: AppState, config: &Config) -> Result<Router> {
    let cors = CorsLayer::new()
        .allow_origin(config.cors_origins()?)
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE])
        .allow_headers([CONTENT_TYPE, AUTHORIZATION]);

    let api_routes = Router::new()
        .route("/health", get(health_apis::health))
        // Taxonomy
        .route("/species", get(species_apis::list_species).post(species_apis::create_species))
        .route(
            "/species/:id",
            get(species_apis::get_species)
                .put(species_apis::update_species)
                .delete(species_apis::delete_species),
        )
        .route(
            "/species/:id/stocks",
            get(species_apis::list_stocks).post(species_apis::create_stock),
        )
        .route("/stocks/:id", delete(species_apis::delete_stock))
        .route("/lines", get(line_apis::list_lines).post(line_apis::create_line))
        .route(
            "/lines/:id",
            get(line_apis::get_line)
                .put(line_apis::update_line)
                .delete(line_apis::delete_line),
        )
        // Animals and pedigrees
        .route("/animals", get(animal_apis::list_animals).post(animal_apis::create_animal))
        .route(
            "/animals/:id",
            get(animal_apis::get_animal)
                .put(animal_apis::update_animal)
                .delete(animal_apis::delete_animal),
        )
        .route(
            "/animals/:id/pedigree",
            get(animal_apis::get_pedigree).post(animal_apis::add_ancestor),
        )
        .route("/ancestry/:id", delete(animal_apis::remove_ancestor))
        // Breeding
        .route(
            "/pairings",
            get(breeding_apis::list_pairings).post(breeding_apis::create_pairing),
        )
        .route(
            "/pairings/:id",
            get(breeding_apis::get_pairing).delete(breeding_apis::delete_pairing),
        )
        .route("/pairings/:id/separate", post(breeding_apis::separate_pairing))
        .route(
            "/pairings/:id/litters",
            get(breeding_apis::list_litters).post(breeding_apis::create_litter),
        )
        .route("/litters/:id", get(breeding_apis::get_litter))
        // Accounts
        .route("/auth/register", post(account_apis::register))
        .route("/auth/login", post(account_apis::login))
        .route("/auth/password", put(account_apis::change_password))
        .route("/auth/me", get(account_apis::me))
        .route("/users/:id", get(account_apis::get_user))
        .route(
            "/account-types",
            get(account_apis::list_account_types).post(account_apis::create_account_type),
        )
        // Studies
        .route("/studies", get(study_apis::list_studies).post(study_apis::create_study))
        .route(
            "/studies/:id",
            get(study_apis::get_study)
                .put(study_apis::update_study)
                .delete(study_apis::delete_study),
        )
        .route(
            "/studies/:id/groups",
            get(study_apis::list_groups).post(study_apis::create_group),
        )
        .route(
            "/groups/:id/animals",
            get(study_apis::list_group_animals).post(study_apis::assign_animal),
        )
        .route(
            "/studies/:id/data-points",
            get(study_apis::list_data_points).post(study_apis::define_data_point),
        )
        .route(
            "/study-animals/:id/observations",
            get(study_apis::list_observations).post(study_apis::record_observation),
        );

    Ok(Router::new()
        .nest("/api", api_routes)
        .fallback(route_not_found)
        .layer(CatchPanicLayer::custom(panic_response))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(app_state))
}

async fn route_not_found() -> Response {
    (
        StatusCode::NOT_FOUND,
        Json(ApiResponse::<()>::error("Route not found")),
    )
        .into_response()
}

fn panic_response(panic: Box<dyn Any + Send + 'static>) -> Response {
    let detail = panic
        .downcast_ref::<String>()
        .map(String::as_str)
        .or_else(|| panic.downcast_ref::<&str>().copied())
        .unwrap_or("unknown panic");
    error!("Handler panicked: {}", detail);

    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(ApiResponse::<()>::error(INTERNAL_ERROR_MESSAGE)),
    )
        .into_response()
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::{to_bytes, Body};
    use axum::http::Request;
    use serde_json::{json, Value};
    use tower::ServiceExt;

    async fn setup_test() -> Router {
        let config = Config::for_tests();
        let db = DbConnection::init_test().await.expect("Failed to create test database");
        create_router(AppState::new(db, &config), &config).expect("router should build")
    }

    async fn send(app: &Router, request: Request<Body>) -> (StatusCode, Value) {
        let response = app.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    fn get_request(uri: &str) -> Request<Body> {
        Request::builder().uri(uri).body(Body::empty()).unwrap()
    }

    fn json_request(method: &str, uri: &str, body: Value) -> Request<Body> {
        Request::builder()
            .method(method)
            .uri(uri)
            .header(CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    async fn register_and_login(app: &Router) -> String {
        let (status, body) = send(app, json_request("POST", "/api/account-types", json!({"name": "Researcher"}))).await;
        assert_eq!(status, StatusCode::CREATED);
        let account_type_id = body["data"]["id"].as_i64().unwrap();

        let (status, _) = send(
            app,
            json_request(
                "POST",
                "/api/auth/register",
                json!({
                    "username": "ada",
                    "password": "correct-horse",
                    "first_name": "Ada",
                    "last_name": "Byron",
                    "email": null,
                    "account_type_id": account_type_id
                }),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);

        let (status, body) = send(
            app,
            json_request("POST", "/api/auth/login", json!({"username": "ada", "password": "correct-horse"})),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["data"]["token_type"], "Bearer");
        body["data"]["token"].as_str().unwrap().to_string()
    }

    #[tokio::test]
    async fn test_health() {
        let app = setup_test().await;
        let (status, body) = send(&app, get_request("/api/health")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["success"], true);
        assert_eq!(body["data"]["status"], "ok");
        assert_eq!(body["message"], "Request successful");
    }

    #[tokio::test]
    async fn test_unknown_route_is_enveloped() {
        let app = setup_test().await;
        let (status, body) = send(&app, get_request("/api/nowhere")).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["success"], false);
        assert_eq!(body["data"], Value::Null);
    }

    #[tokio::test]
    async fn test_unknown_animal_is_not_found() {
        let app = setup_test().await;
        let (status, body) = send(&app, get_request("/api/animals/999")).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(
            body,
            json!({"success": false, "data": null, "message": "Animal not found: 999", "errors": null})
        );
    }

    #[tokio::test]
    async fn test_invalid_body_is_bad_request() {
        let app = setup_test().await;

        let (status, body) = send(&app, json_request("POST", "/api/species", json!({"common_name": "mouse"}))).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["success"], false);

        let (status, _) = send(&app, get_request("/api/animals/not-a-number")).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_validation_errors_are_listed() {
        let app = setup_test().await;
        let (status, body) = send(
            &app,
            json_request(
                "POST",
                "/api/studies",
                json!({"name": "Diet", "description": null, "start_date": "June", "end_date": "July"}),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["message"], "Validation failed");
        assert_eq!(body["errors"].as_array().unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_bad_login_is_unauthorized() {
        let app = setup_test().await;
        let (status, body) = send(
            &app,
            json_request("POST", "/api/auth/login", json!({"username": "nobody", "password": "whatever1"})),
        )
        .await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body["success"], false);
        assert_eq!(body["message"], "Invalid username or password");
    }

    #[tokio::test]
    async fn test_me_requires_bearer_token() {
        let app = setup_test().await;

        let (status, _) = send(&app, get_request("/api/auth/me")).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);

        let token = register_and_login(&app).await;
        let request = Request::builder()
            .uri("/api/auth/me")
            .header(AUTHORIZATION, format!("Bearer {}", token))
            .body(Body::empty())
            .unwrap();
        let (status, body) = send(&app, request).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["data"]["username"], "ada");
        assert_eq!(body["data"]["account_type"]["name"], "Researcher");
    }

    #[tokio::test]
    async fn test_create_and_get_animal() {
        let app = setup_test().await;

        let (_, body) = send(
            &app,
            json_request("POST", "/api/species", json!({"scientific_name": "Mus musculus", "common_name": "House mouse"})),
        )
        .await;
        let species_id = body["data"]["id"].as_i64().unwrap();

        let (_, body) = send(
            &app,
            json_request(
                "POST",
                &format!("/api/species/{}/stocks", species_id),
                json!({"name": "C57BL/6", "description": null}),
            ),
        )
        .await;
        let stock_id = body["data"]["id"].as_i64().unwrap();

        let (_, body) = send(
            &app,
            json_request("POST", "/api/lines", json!({"stock_id": stock_id, "name": "B6", "description": null})),
        )
        .await;
        let line_id = body["data"]["id"].as_i64().unwrap();

        let (status, body) = send(
            &app,
            json_request(
                "POST",
                "/api/animals",
                json!({
                    "line_id": line_id,
                    "litter_id": null,
                    "sex": "Female",
                    "date_of_birth": "2024-01-01",
                    "date_of_death": null,
                    "name": "Pip",
                    "notes": null
                }),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(body["message"], "Animal created");
        let animal_id = body["data"]["id"].as_i64().unwrap();

        let (status, body) = send(&app, get_request(&format!("/api/animals/{}", animal_id))).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["data"]["display_name"], "Pip");
        assert_eq!(body["data"]["date_of_birth"], "2024-01-01");

        let (status, body) = send(&app, get_request(&format!("/api/animals?species_id={}&sex=Female", species_id))).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["data"].as_array().unwrap().len(), 1);

        let (status, body) = send(&app, get_request("/api/animals?sex=female")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["data"].as_array().unwrap().len(), 1);

        let (status, body) = send(&app, get_request("/api/animals?sex=MALE")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["data"], json!([]));

        let (status, body) = send(&app, get_request("/api/animals?sex=hamster")).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["success"], false);

        let (status, body) = send(&app, get_request(&format!("/api/animals/{}/pedigree", animal_id))).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["data"]["generations"], json!([]));
    }

    #[test]
    fn test_panic_response_is_enveloped() {
        let response = panic_response(Box::new("boom"));
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
