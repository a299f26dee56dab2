//! Ordered behaviour pipeline for one form step.
//!
//! A step is served by a base [`FormController`] wrapped in zero or more
//! [`Behaviour`] stages. Every stage receives a [`Next`] cursor pointing at
//! the rest of the pipeline and decides whether to call through, use the
//! result, or override it. Stages run in the order they were added: the
//! first stage sees the request first and the base controller runs last.

use async_trait::async_trait;
use serde_json::Value;
use std::sync::Arc;

use crate::domain::{FormRequest, Locals};
use crate::error::AppError;

/// Default handling of a form step.
#[async_trait]
pub trait FormController: Send + Sync {
    /// Values for the template.
    fn locals(&self, req: &mut FormRequest) -> Result<Locals, AppError>;

    /// Per-request setup, run before anything else on every request.
    fn configure(&self, req: &mut FormRequest) -> Result<(), AppError>;

    /// Handles a successful submission.
    async fn process(&self, req: &mut FormRequest) -> Result<(), AppError>;

    /// Persists submitted values.
    fn save_values(&self, req: &mut FormRequest) -> Result<(), AppError>;

    /// Where to go after a successful submission.
    fn next_step(&self, req: &FormRequest) -> String;

    /// Where the back link points, if anywhere.
    fn back_link(&self, req: &FormRequest) -> Option<String>;
}

/// A stage layered over a [`FormController`].
///
/// Every hook defaults to calling the next stage unchanged, so a behaviour
/// only implements the hooks it cares about.
#[async_trait]
pub trait Behaviour: Send + Sync {
    fn name(&self) -> &'static str;

    fn locals(&self, req: &mut FormRequest, next: Next<'_>) -> Result<Locals, AppError> {
        next.locals(req)
    }

    fn configure(&self, req: &mut FormRequest, next: Next<'_>) -> Result<(), AppError> {
        next.configure(req)
    }

    async fn process(&self, req: &mut FormRequest, next: Next<'_>) -> Result<(), AppError> {
        next.process(req).await
    }

    fn save_values(&self, req: &mut FormRequest, next: Next<'_>) -> Result<(), AppError> {
        next.save_values(req)
    }

    fn next_step(&self, req: &FormRequest, next: Next<'_>) -> String {
        next.next_step(req)
    }

    fn back_link(&self, req: &FormRequest, next: Next<'_>) -> Option<String> {
        next.back_link(req)
    }
}

/// Cursor over the stages that have not run yet.
#[derive(Clone, Copy)]
pub struct Next<'a> {
    stages: &'a [Arc<dyn Behaviour>],
    base: &'a dyn FormController,
}

impl<'a> Next<'a> {
    fn split(self) -> Option<(&'a Arc<dyn Behaviour>, Next<'a>)> {
        self.stages.split_first().map(|(stage, rest)| {
            (
                stage,
                Next {
                    stages: rest,
                    base: self.base,
                },
            )
        })
    }

    pub fn locals(self, req: &mut FormRequest) -> Result<Locals, AppError> {
        match self.split() {
            Some((stage, rest)) => stage.locals(req, rest),
            None => self.base.locals(req),
        }
    }

    pub fn configure(self, req: &mut FormRequest) -> Result<(), AppError> {
        match self.split() {
            Some((stage, rest)) => stage.configure(req, rest),
            None => self.base.configure(req),
        }
    }

    pub async fn process(self, req: &mut FormRequest) -> Result<(), AppError> {
        match self.split() {
            Some((stage, rest)) => stage.process(req, rest).await,
            None => self.base.process(req).await,
        }
    }

    pub fn save_values(self, req: &mut FormRequest) -> Result<(), AppError> {
        match self.split() {
            Some((stage, rest)) => stage.save_values(req, rest),
            None => self.base.save_values(req),
        }
    }

    pub fn next_step(self, req: &FormRequest) -> String {
        match self.split() {
            Some((stage, rest)) => stage.next_step(req, rest),
            None => self.base.next_step(req),
        }
    }

    pub fn back_link(self, req: &FormRequest) -> Option<String> {
        match self.split() {
            Some((stage, rest)) => stage.back_link(req, rest),
            None => self.base.back_link(req),
        }
    }
}

/// A base controller plus its behaviours, in declared order.
pub struct Pipeline {
    stages: Vec<Arc<dyn Behaviour>>,
    base: Arc<dyn FormController>,
}

impl Pipeline {
    pub fn new(base: Arc<dyn FormController>) -> Self {
        Self {
            stages: Vec::new(),
            base,
        }
    }

    /// Appends a stage. Stages added first run first.
    pub fn with(mut self, stage: impl Behaviour + 'static) -> Self {
        self.stages.push(Arc::new(stage));
        self
    }

    pub fn stage_names(&self) -> Vec<&'static str> {
        self.stages.iter().map(|s| s.name()).collect()
    }

    fn head(&self) -> Next<'_> {
        Next {
            stages: &self.stages,
            base: self.base.as_ref(),
        }
    }

    pub fn locals(&self, req: &mut FormRequest) -> Result<Locals, AppError> {
        self.head().locals(req)
    }

    pub fn configure(&self, req: &mut FormRequest) -> Result<(), AppError> {
        self.head().configure(req)
    }

    pub async fn process(&self, req: &mut FormRequest) -> Result<(), AppError> {
        self.head().process(req).await
    }

    pub fn save_values(&self, req: &mut FormRequest) -> Result<(), AppError> {
        self.head().save_values(req)
    }

    pub fn next_step(&self, req: &FormRequest) -> String {
        self.head().next_step(req)
    }

    pub fn back_link(&self, req: &FormRequest) -> Option<String> {
        self.head().back_link(req)
    }

    /// Runs a page view: `configure`, then `locals` with `backLink` added.
    pub fn render(&self, req: &mut FormRequest) -> Result<Locals, AppError> {
        self.configure(req)?;
        let mut locals = self.locals(req)?;
        if let Some(back) = self.back_link(req) {
            locals.insert("backLink".to_string(), Value::String(back));
        }
        Ok(locals)
    }

    /// Runs a submission: `configure`, `process`, `save_values`, and returns
    /// the next step to redirect to.
    pub async fn submit(&self, req: &mut FormRequest) -> Result<String, AppError> {
        self.configure(req)?;
        self.process(req).await?;
        self.save_values(req)?;
        Ok(self.next_step(req))
    }
}
