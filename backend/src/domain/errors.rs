//! Error taxonomy shared by every domain service.

/// Tag identifying the class of a [`DomainError`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    NotFound,
    InvalidArgument,
    InvalidOperation,
    Unauthorized,
    Internal,
}

#[derive(Debug, thiserror::Error)]
pub enum DomainError {
    #[error("{0}")]
    NotFound(String),

    #[error("{0}")]
    InvalidArgument(String),

    /// Several input problems found at once
    #[error("Validation failed: {}", .0.join("; "))]
    Validation(Vec<String>),

    /// Request is well formed but conflicts with stored state
    #[error("{0}")]
    InvalidOperation(String),

    #[error("{0}")]
    Unauthorized(String),

    #[error(transparent)]
    Internal(anyhow::Error),
}

impl DomainError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::NotFound(_) => ErrorKind::NotFound,
            Self::InvalidArgument(_) | Self::Validation(_) => ErrorKind::InvalidArgument,
            Self::InvalidOperation(_) => ErrorKind::InvalidOperation,
            Self::Unauthorized(_) => ErrorKind::Unauthorized,
            Self::Internal(_) => ErrorKind::Internal,
        }
    }

    pub fn not_found(entity: &str, id: impl std::fmt::Display) -> Self {
        Self::NotFound(format!("{} not found: {}", entity, id))
    }

    pub fn invalid(message: impl Into<String>) -> Self {
        Self::InvalidArgument(message.into())
    }

    pub fn conflict(message: impl Into<String>) -> Self {
        Self::InvalidOperation(message.into())
    }
}

/// Storage failures are internal, except unique-constraint violations, which
/// mean the record clashes with one already stored
impl From<anyhow::Error> for DomainError {
    fn from(err: anyhow::Error) -> Self {
        let unique_violation = err
            .downcast_ref::<sqlx::Error>()
            .and_then(sqlx::Error::as_database_error)
            .map_or(false, |db| db.is_unique_violation());
        if unique_violation {
            Self::InvalidOperation("A record with the same unique values already exists".to_string())
        } else {
            Self::Internal(err)
        }
    }
}

impl From<sqlx::Error> for DomainError {
    fn from(err: sqlx::Error) -> Self {
        anyhow::Error::from(err).into()
    }
}

pub type DomainResult<T> = std::result::Result<T, DomainError>;

/// Collects validation problems so a request reports all of them at once
#[derive(Debug, Default)]
pub struct Validator {
    errors: Vec<String>,
}

impl Validator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn check(&mut self, condition: bool, message: impl Into<String>) -> &mut Self {
        if !condition {
            self.errors.push(message.into());
        }
        self
    }

    pub fn finish(&mut self) -> DomainResult<()> {
        if self.errors.is_empty() {
            Ok(())
        } else {
            Err(DomainError::Validation(std::mem::take(&mut self.errors)))
        }
    }
}
