use async_trait::async_trait;
use thiserror::Error;

use crate::domain::offer::{OfferDetail, OfferId, PaymentMethod, PriceComponent};

#[derive(Clone, Debug, Error, PartialEq, Eq)]
#[error("{message}")]
pub struct CatalogError {
    pub message: String,
}

impl CatalogError {
    pub fn new(message: impl Into<String>) -> Self {
        Self { message: message.into() }
    }
}

/// Read contracts of the offer store. All lookups are keyed by offer id.
#[async_trait]
pub trait OfferCatalog: Send + Sync {
    async fn offer_exists(&self, id: OfferId) -> Result<bool, CatalogError>;

    async fn offer_detail(&self, id: OfferId) -> Result<Option<OfferDetail>, CatalogError>;

    /// Components with their price intervals; an empty list is a valid answer.
    async fn price_components(&self, id: OfferId) -> Result<Vec<PriceComponent>, CatalogError>;

    async fn payment_methods(&self, id: OfferId) -> Result<Vec<PaymentMethod>, CatalogError>;
}
