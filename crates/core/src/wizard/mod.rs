pub mod engine;
pub mod questionnaire;
pub mod states;

pub use engine::{WizardEngine, WizardError};
pub use questionnaire::{EnergyQuestionnaire, QuestionnaireDefinition};
pub use states::{TransitionOutcome, WizardAction, WizardEvent, WizardState, WizardStep};
