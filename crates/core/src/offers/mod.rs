pub mod catalog;
pub mod loader;
pub mod matching;
pub mod share;

pub use catalog::{CatalogError, OfferCatalog};
pub use loader::{load_offer, OfferLoadError};
pub use matching::{
    profile_highlights, OfferFeature, OfferMatcher, PricePlan, ProfileHighlight,
    RecommendedOffer, StaticOfferMatcher,
};
pub use share::{SharePayload, CLIPBOARD_NOTICE};
