use thiserror::Error;

use crate::domain::profile::Profile;
use crate::domain::question::{Question, QuestionKind};
use crate::wizard::questionnaire::{EnergyQuestionnaire, QuestionnaireDefinition};
use crate::wizard::states::{
    TransitionOutcome, WizardAction, WizardEvent, WizardState, WizardStep,
};

pub struct WizardEngine<Q> {
    questionnaire: Q,
}

impl<Q> WizardEngine<Q>
where
    Q: QuestionnaireDefinition,
{
    pub fn new(questionnaire: Q) -> Self {
        Self { questionnaire }
    }

    pub fn questionnaire(&self) -> &Q {
        &self.questionnaire
    }

    pub fn initial_state(&self) -> WizardState {
        WizardState::at(0, Profile::new())
    }

    pub fn current_question(&self, state: &WizardState) -> Option<&Question> {
        state.current_index().and_then(|index| self.questionnaire.question(index))
    }

    /// Applies one user action. On error the caller keeps `current` unchanged.
    pub fn apply(
        &self,
        current: &WizardState,
        event: &WizardEvent,
    ) -> Result<TransitionOutcome, WizardError> {
        let index = current.current_index().ok_or(WizardError::AlreadyComplete)?;
        let question = self
            .questionnaire
            .question(index)
            .ok_or(WizardError::StepOutOfRange { index, count: self.questionnaire.question_count() })?;

        let answer = match (event, &question.kind) {
            (WizardEvent::BackRequested, _) => {
                let to = WizardState::at(index.saturating_sub(1), current.profile.clone());
                return Ok(TransitionOutcome {
                    from: current.step,
                    to,
                    event: event.clone(),
                    actions: Vec::new(),
                });
            }
            (WizardEvent::OptionChosen { option_id }, QuestionKind::Choice { .. }) => {
                let option = question.option(option_id).ok_or_else(|| {
                    WizardError::UnknownOption {
                        question_id: question.id.0.clone(),
                        option_id: option_id.clone(),
                    }
                })?;
                option.id.clone()
            }
            (WizardEvent::TextSubmitted { value }, QuestionKind::Freeform { rule, .. }) => {
                if !rule.accepts(value) {
                    return Err(WizardError::Validation {
                        question_id: question.id.0.clone(),
                        message: rule.error_message().to_owned(),
                    });
                }
                value.trim().to_owned()
            }
            _ => {
                return Err(WizardError::EventMismatch {
                    question_id: question.id.0.clone(),
                    event: event.clone(),
                });
            }
        };

        let mut profile = current.profile.clone();
        profile.record(question.id.0.clone(), answer.clone());
        let mut actions =
            vec![WizardAction::RecordAnswer { question_id: question.id.0.clone(), value: answer }];

        let next = index + 1;
        let step = if next >= self.questionnaire.question_count() {
            actions.push(WizardAction::NavigateToResults { query: profile.to_query() });
            WizardStep::Complete
        } else {
            WizardStep::Question(next)
        };

        Ok(TransitionOutcome {
            from: current.step,
            to: WizardState { step, profile },
            event: event.clone(),
            actions,
        })
    }
}

impl Default for WizardEngine<EnergyQuestionnaire> {
    fn default() -> Self {
        Self::new(EnergyQuestionnaire::default())
    }
}

#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum WizardError {
    #[error("{message}")]
    Validation { question_id: String, message: String },
    #[error("option `{option_id}` is not offered by question `{question_id}`")]
    UnknownOption { question_id: String, option_id: String },
    #[error("event {event:?} does not apply to question `{question_id}`")]
    EventMismatch { question_id: String, event: WizardEvent },
    #[error("wizard step {index} is outside the questionnaire ({count} questions)")]
    StepOutOfRange { index: usize, count: usize },
    #[error("the questionnaire is already complete")]
    AlreadyComplete,
}
