//! Application layer: request handling for form steps.
//!
//! A step is a [`pipeline::Pipeline`]: a base [`pipeline::FormController`]
//! wrapped by [`pipeline::Behaviour`] stages that call through to each other
//! via [`pipeline::Next`].
//!
//! # Components
//!
//! - [`controller::StepController`] - Default step handling
//! - [`behaviours::SetFeedbackReturnUrl`] - Return path carrier for content pages
//! - [`behaviours::SubmitFeedback`] - Return path consumer for the feedback step

pub mod behaviours;
pub mod controller;
pub mod pipeline;

pub use behaviours::{SetFeedbackReturnUrl, SubmitFeedback};
pub use controller::{StepController, StepOptions};
pub use pipeline::{Behaviour, FormController, Next, Pipeline};
