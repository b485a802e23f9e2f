use serde::{Deserialize, Serialize};

use crate::domain::profile::Profile;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "step", content = "index", rename_all = "snake_case")]
pub enum WizardStep {
    Question(usize),
    Complete,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum WizardEvent {
    OptionChosen { option_id: String },
    TextSubmitted { value: String },
    BackRequested,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct WizardState {
    pub step: WizardStep,
    pub profile: Profile,
}

impl WizardState {
    pub fn at(index: usize, profile: Profile) -> Self {
        Self { step: WizardStep::Question(index), profile }
    }

    pub fn current_index(&self) -> Option<usize> {
        match self.step {
            WizardStep::Question(index) => Some(index),
            WizardStep::Complete => None,
        }
    }

    pub fn is_complete(&self) -> bool {
        self.step == WizardStep::Complete
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum WizardAction {
    RecordAnswer { question_id: String, value: String },
    NavigateToResults { query: String },
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransitionOutcome {
    pub from: WizardStep,
    pub to: WizardState,
    pub event: WizardEvent,
    pub actions: Vec<WizardAction>,
}

impl TransitionOutcome {
    /// Query string for the results view once the questionnaire is complete.
    pub fn results_query(&self) -> Option<&str> {
        self.actions.iter().find_map(|action| match action {
            WizardAction::NavigateToResults { query } => Some(query.as_str()),
            WizardAction::RecordAnswer { .. } => None,
        })
    }
}
