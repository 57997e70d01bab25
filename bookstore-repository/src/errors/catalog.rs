//! Error types for catalog persistence.
//!
//! Integrity failures reported by PostgreSQL are classified by SQLSTATE so
//! callers can tell a duplicate ISBN or a restricted delete apart from an
//! infrastructure failure.
use thiserror::Error;

/// `unique_violation`
pub const UNIQUE_VIOLATION: &str = "23505";
/// `foreign_key_violation`
pub const FOREIGN_KEY_VIOLATION: &str = "23503";
/// `restrict_violation`
pub const RESTRICT_VIOLATION: &str = "23001";

/// Represents errors that can occur within the catalog repository.
#[derive(Debug, Error)]
pub enum CatalogRepositoryError {
    /// A unique constraint rejected the write (duplicate ISBN, duplicate tag title).
    #[error("Unique constraint violated: {constraint}")]
    UniqueViolation { constraint: String },

    /// A row could not be deleted because other rows still reference it.
    #[error("Delete restricted by constraint: {constraint}")]
    RestrictViolation { constraint: String },

    /// A write referenced a row that does not exist (e.g. an unknown publisher).
    #[error("Referenced row does not exist: {constraint}")]
    MissingReference { constraint: String },

    #[error("{entity} not found: {uuid}")]
    NotFound { entity: &'static str, uuid: uuid::Uuid },

    #[error("Validation error: {0}")]
    Validation(String),

    /// A stored value could not be decoded into the domain model.
    #[error("Invalid stored data: {0}")]
    InvalidData(String),

    #[error("Database error: {0}")]
    DatabaseError(sqlx::Error),

    #[error("Migration error: {0}")]
    MigrationError(#[from] sqlx::migrate::MigrateError),
}

impl CatalogRepositoryError {
    pub fn not_found(entity: &'static str, uuid: uuid::Uuid) -> Self {
        Self::NotFound { entity, uuid }
    }

    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    pub fn invalid_data(msg: impl Into<String>) -> Self {
        Self::InvalidData(msg.into())
    }

    /// Classify a database error code and constraint name.
    ///
    /// Returns `None` for codes that are not integrity violations.
    pub fn classify(code: Option<&str>, constraint: Option<&str>) -> Option<Self> {
        let constraint = constraint.unwrap_or_default().to_string();
        match code? {
            UNIQUE_VIOLATION => Some(Self::UniqueViolation { constraint }),
            FOREIGN_KEY_VIOLATION => Some(Self::MissingReference { constraint }),
            RESTRICT_VIOLATION => Some(Self::RestrictViolation { constraint }),
            _ => None,
        }
    }

    /// Reinterpret a foreign key failure raised by a DELETE.
    ///
    /// PostgreSQL reports both "insert references a missing row" and "delete
    /// is still referenced" as `foreign_key_violation`; on the delete path it
    /// always means the latter.
    pub fn on_delete(self) -> Self {
        match self {
            Self::MissingReference { constraint } => Self::RestrictViolation { constraint },
            other => other,
        }
    }

    pub fn is_unique_violation(&self) -> bool {
        matches!(self, Self::UniqueViolation { .. })
    }

    pub fn is_restrict_violation(&self) -> bool {
        matches!(self, Self::RestrictViolation { .. })
    }
}

impl From<sqlx::Error> for CatalogRepositoryError {
    fn from(err: sqlx::Error) -> Self {
        if let sqlx::Error::Database(db_err) = &err {
            let code = db_err.code();
            if let Some(classified) = Self::classify(code.as_deref(), db_err.constraint()) {
                return classified;
            }
        }
        Self::DatabaseError(err)
    }
}
