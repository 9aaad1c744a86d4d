use thiserror::Error;

/// Failure of an option store or trusted-IP datastore.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Database error: {0}")]
    Database(#[from] sea_orm::DbErr),
    #[error("Malformed stored value for {key}: {source}")]
    Malformed {
        key: String,
        #[source]
        source: serde_json::Error,
    },
}

#[derive(Debug, Error)]
pub enum MailError {
    #[error("Invalid address {address}: {reason}")]
    Address { address: String, reason: String },
    #[error("Failed to build message: {0}")]
    Build(String),
    #[error("Transport error: {0}")]
    Transport(String),
    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Errors that prevent a settings section from being rendered.
///
/// Validation problems, duplicates and failed writes never end up here; they
/// are reported to the admin as notices and the section renders normally.
#[derive(Debug, Error)]
pub enum SettingsError {
    #[error(transparent)]
    Store(#[from] StoreError),
    #[error("Template rendering failed: {0}")]
    Template(#[from] askama::Error),
}

impl StoreError {
    /// Connection problems that may succeed on the next request.
    pub fn is_transient(&self) -> bool {
        matches!(
            self,
            StoreError::Database(sea_orm::DbErr::ConnectionAcquire(_) | sea_orm::DbErr::Conn(_))
        )
    }
}
