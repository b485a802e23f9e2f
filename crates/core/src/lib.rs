pub mod analysis;
pub mod config;
pub mod content;
pub mod domain;
pub mod errors;
pub mod offers;
pub mod wizard;

pub use analysis::{AnalysisEngine, ProgressSink, ProgressUpdate, SimulatedAnalysisEngine};
pub use analysis::{PreviewRegistry, RunRejection, UploadSelection};
pub use domain::analysis::{AnalysisResult, SelectedFile};
pub use domain::offer::{OfferDetail, OfferId, OfferView, PaymentMethod, PriceComponent};
pub use domain::profile::Profile;
pub use domain::question::{Question, QuestionKind};
pub use errors::{ApplicationError, DomainError, InterfaceError};
pub use offers::{load_offer, OfferCatalog, OfferLoadError, OfferMatcher, StaticOfferMatcher};
pub use wizard::{WizardEngine, WizardError, WizardEvent, WizardState};
