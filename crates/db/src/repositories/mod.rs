use energia_core::offers::CatalogError;
use thiserror::Error;

pub mod offer;

pub use offer::SqlOfferCatalog;

#[derive(Debug, Error)]
pub enum RepositoryError {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
    #[error("decode error: {0}")]
    Decode(String),
}

impl From<RepositoryError> for CatalogError {
    fn from(value: RepositoryError) -> Self {
        CatalogError::new(value.to_string())
    }
}
