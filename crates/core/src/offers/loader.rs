use thiserror::Error;

use crate::domain::offer::{OfferId, OfferView};
use crate::offers::catalog::OfferCatalog;

/// Failures surfaced on the offer page. Messages are shown to the user verbatim.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum OfferLoadError {
    #[error("{message}")]
    NotFound { id: String, message: String },
    #[error("{message}")]
    DetailMissing { id: OfferId, message: String },
    #[error("{message}")]
    ComponentFetch { id: OfferId, message: String },
    #[error("{message}")]
    PaymentFetch { id: OfferId, message: String },
}

impl OfferLoadError {
    pub fn kind(&self) -> &'static str {
        match self {
            Self::NotFound { .. } => "not_found",
            Self::DetailMissing { .. } => "detail_missing",
            Self::ComponentFetch { .. } => "component_fetch",
            Self::PaymentFetch { .. } => "payment_fetch",
        }
    }

    pub fn is_missing(&self) -> bool {
        matches!(self, Self::NotFound { .. } | Self::DetailMissing { .. })
    }
}

/// Loads everything the offer page shows.
///
/// The existence check gates the rest. Detail, components and payment methods
/// are independent and are fetched concurrently, then checked in that order so
/// the reported error does not depend on which lookup finished first.
pub async fn load_offer<C>(catalog: &C, raw_id: &str) -> Result<OfferView, OfferLoadError>
where
    C: OfferCatalog + ?Sized,
{
    let id = OfferId::parse(raw_id).ok_or_else(|| OfferLoadError::NotFound {
        id: raw_id.to_owned(),
        message: format!("Nessuna offerta trovata con ID: {raw_id}"),
    })?;

    match catalog.offer_exists(id).await {
        Ok(true) => {}
        Ok(false) => {
            return Err(OfferLoadError::NotFound {
                id: id.to_string(),
                message: format!("Nessuna offerta trovata con ID: {id}"),
            });
        }
        Err(error) => {
            return Err(OfferLoadError::NotFound {
                id: id.to_string(),
                message: format!("Offerta non trovata: {error}"),
            });
        }
    }

    let (detail, components, payment_methods) = tokio::join!(
        catalog.offer_detail(id),
        catalog.price_components(id),
        catalog.payment_methods(id),
    );

    let detail = match detail {
        Ok(Some(detail)) => detail,
        Ok(None) => {
            return Err(OfferLoadError::DetailMissing {
                id,
                message: format!("Nessun dettaglio trovato per l'offerta {id}"),
            });
        }
        Err(error) => {
            return Err(OfferLoadError::DetailMissing {
                id,
                message: format!("Errore nel caricamento dei dettagli: {error}"),
            });
        }
    };
    let components = components.map_err(|error| OfferLoadError::ComponentFetch {
        id,
        message: format!("Errore nel caricamento dei componenti: {error}"),
    })?;
    let payment_methods = payment_methods.map_err(|error| OfferLoadError::PaymentFetch {
        id,
        message: format!("Errore nel caricamento dei metodi di pagamento: {error}"),
    })?;

    Ok(OfferView { detail, components, payment_methods })
}
