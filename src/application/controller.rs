//! Default step controller.

use async_trait::async_trait;
use serde_json::{Value, json};

use crate::application::pipeline::FormController;
use crate::domain::session::ERROR_VALUES_KEY;
use crate::domain::{FormRequest, Locals};
use crate::error::AppError;

/// Static options of a form step.
#[derive(Debug, Clone, Default)]
pub struct StepOptions {
    /// Field names accepted by the step.
    pub fields: Vec<String>,
    /// Next step, relative to the mount.
    pub next: Option<String>,
    /// Back link target, relative to the mount.
    pub back: Option<String>,
}

/// Plain form step: renders its fields, trims input, stores values in the
/// session and moves on to `next`.
#[derive(Debug, Clone, Default)]
pub struct StepController {
    options: StepOptions,
}

impl StepController {
    pub fn new(options: StepOptions) -> Self {
        Self { options }
    }

    pub fn options(&self) -> &StepOptions {
        &self.options
    }
}

#[async_trait]
impl FormController for StepController {
    fn locals(&self, req: &mut FormRequest) -> Result<Locals, AppError> {
        let mut locals = req.locals.clone();
        locals.insert("baseUrl".to_string(), json!(req.base_url));
        locals.insert("path".to_string(), json!(req.path));
        locals.insert("fields".to_string(), json!(req.form.options.fields));
        Ok(locals)
    }

    fn configure(&self, req: &mut FormRequest) -> Result<(), AppError> {
        req.form.options.fields = self.options.fields.clone();
        req.form.options.next = self.options.next.clone();
        Ok(())
    }

    async fn process(&self, req: &mut FormRequest) -> Result<(), AppError> {
        for value in req.form.values.values_mut() {
            if let Value::String(s) = value {
                let trimmed = s.trim();
                if trimmed.len() != s.len() {
                    *s = trimmed.to_string();
                }
            }
        }
        Ok(())
    }

    fn save_values(&self, req: &mut FormRequest) -> Result<(), AppError> {
        for (key, value) in &req.form.values {
            req.session.set(key.clone(), value.clone());
        }
        req.session.unset(ERROR_VALUES_KEY);
        Ok(())
    }

    fn next_step(&self, req: &FormRequest) -> String {
        let next = req.form.options.next.as_deref().unwrap_or("/");
        format!("{}{}", req.base_url, next)
    }

    fn back_link(&self, req: &FormRequest) -> Option<String> {
        self.options
            .back
            .as_ref()
            .map(|back| format!("{}{}", req.base_url, back))
    }
}
