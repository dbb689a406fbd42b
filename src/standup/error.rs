use crate::database::store::StoreError;
use crate::standup::flow::FlowStep;
use crate::utils::validation::ValidationError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum FlowError {
    /// A field was rejected; the session is unchanged and the user may retry.
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// A callback arrived for a user without a live session.
    #[error("no active standup for user {user_id}")]
    NoActiveFlow { user_id: String },

    /// A callback from a form belonging to an earlier or later step.
    #[error("form for step {submitted} does not match current step {current}")]
    StaleForm {
        submitted: FlowStep,
        current: FlowStep,
    },

    /// Saving the finished standup failed; the session is kept for a retry.
    #[error("failed to save standup: {0}")]
    Store(#[from] StoreError),
}

impl FlowError {
    /// Text shown next to the form.
    pub fn user_message(&self) -> String {
        match self {
            FlowError::Validation(e) => e.message.clone(),
            FlowError::NoActiveFlow { .. } => {
                "You have no standup in progress. Start one with `/standup`.".to_string()
            }
            FlowError::StaleForm { .. } => {
                "This form is out of date. Use the latest standup message or `/standup` to restart."
                    .to_string()
            }
            FlowError::Store(_) => {
                "Your standup could not be saved. Your answers are kept, please try submitting again."
                    .to_string()
            }
        }
    }
}
