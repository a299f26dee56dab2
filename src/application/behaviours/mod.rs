//! Behaviours layered over a form step.
//!
//! - [`SetFeedbackReturnUrl`] - attaches the return path to the feedback link
//! - [`SubmitFeedback`] - consumes it on the feedback step and sends the email

mod set_feedback_return_url;
mod submit_feedback;

pub use set_feedback_return_url::{DEFAULT_FEEDBACK_PATH, SetFeedbackReturnUrl};
pub use submit_feedback::SubmitFeedback;
