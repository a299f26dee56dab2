use std::sync::Arc;

use crate::application::{
    Pipeline, SetFeedbackReturnUrl, StepController, StepOptions, SubmitFeedback,
};
use crate::config::Config;
use crate::infrastructure::session::SessionStore;

/// Shared state for all handlers.
#[derive(Clone)]
pub struct AppState {
    pub sessions: Arc<dyn SessionStore>,
    /// Content pages: default step plus the return path carrier.
    pub pages: Arc<Pipeline>,
    /// Feedback step: carrier and consumer over the feedback form.
    pub feedback: Arc<Pipeline>,
    pub base_path: String,
    pub feedback_path: String,
    pub feedback_configured: bool,
}

impl AppState {
    /// Assembles both step pipelines from the configuration.
    pub fn new(config: &Config, sessions: Arc<dyn SessionStore>, submit: SubmitFeedback) -> Self {
        let carrier = SetFeedbackReturnUrl::new(config.return_path_transport)
            .with_feedback_path(config.feedback_path.clone());
        let feedback_configured = submit.is_configured();

        let pages = Pipeline::new(Arc::new(StepController::default())).with(carrier.clone());

        let feedback_step = StepController::new(StepOptions {
            fields: config.feedback_fields.clone(),
            ..StepOptions::default()
        });
        let feedback = Pipeline::new(Arc::new(feedback_step))
            .with(carrier)
            .with(submit.with_transport(config.return_path_transport));

        Self {
            sessions,
            pages: Arc::new(pages),
            feedback: Arc::new(feedback),
            base_path: config.base_path.clone(),
            feedback_path: config.feedback_path.clone(),
            feedback_configured,
        }
    }
}
