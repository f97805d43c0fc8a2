//! Multi-step form wizard.
//!
//! Submission status: `idle → sending → {success | error}`. `success` is terminal;
//! `error` allows a retry. Step navigation is independent of submission status and is
//! refused only while a submission is in flight.

pub mod handlers;
pub mod sessions;
pub mod steps;
pub mod submission;

use serde::Serialize;
use serde_json::Value;
use thiserror::Error;

use crate::wizard::steps::{FieldKind, StepSpec, WizardForm, WizardOptions};

/// Shown instead of per-field errors when a required field is blank.
pub const REQUIRED_FIELDS_MESSAGE: &str = "Veuillez remplir tous les champs obligatoires";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SubmissionStatus {
    Idle,
    Sending,
    Success,
    Error,
}

#[derive(Debug, Error, PartialEq)]
pub enum WizardError {
    #[error("A submission is already in progress")]
    Busy,

    #[error("This form has already been submitted")]
    Finished,

    #[error("Unknown field '{0}'")]
    UnknownField(String),

    #[error("Invalid value for '{field}': {reason}")]
    InvalidValue { field: String, reason: String },

    #[error("Veuillez remplir tous les champs obligatoires")]
    MissingRequired(Vec<&'static str>),

    #[error("No submission is in progress")]
    NotSending,
}

/// Template the user picked in the gallery before opening the form.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TemplateRef {
    pub id: String,
    pub name: String,
}

#[derive(Debug, Clone)]
pub struct FormWizard<D> {
    step: usize,
    data: D,
    status: SubmissionStatus,
    error_message: Option<String>,
    options: WizardOptions,
    template: Option<TemplateRef>,
    profile_type: Option<String>,
}

/// Serializable snapshot for clients.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WizardView<D> {
    pub step: usize,
    pub step_count: usize,
    pub current: StepSpec,
    pub data: D,
    pub status: SubmissionStatus,
    pub error_message: Option<String>,
    pub options: WizardOptions,
    pub template: Option<TemplateRef>,
    pub profile_type: Option<String>,
}

impl<D: WizardForm> FormWizard<D> {
    pub fn new(data: D, options: WizardOptions) -> Self {
        Self {
            step: 0,
            data,
            status: SubmissionStatus::Idle,
            error_message: None,
            options,
            template: None,
            profile_type: None,
        }
    }

    pub fn with_template(mut self, template: Option<TemplateRef>) -> Self {
        self.template = template;
        self
    }

    pub fn with_profile_type(mut self, profile_type: Option<String>) -> Self {
        self.profile_type = profile_type.filter(|p| !p.trim().is_empty());
        self
    }

    #[cfg(test)]
    pub fn step(&self) -> usize {
        self.step
    }

    pub fn step_count(&self) -> usize {
        D::steps().len()
    }

    #[cfg(test)]
    pub fn data(&self) -> &D {
        &self.data
    }

    #[cfg(test)]
    pub fn status(&self) -> SubmissionStatus {
        self.status
    }

    #[cfg(test)]
    pub fn error_message(&self) -> Option<&str> {
        self.error_message.as_deref()
    }

    pub fn template(&self) -> Option<&TemplateRef> {
        self.template.as_ref()
    }

    pub fn profile_type(&self) -> Option<&str> {
        self.profile_type.as_deref()
    }

    fn ensure_editable(&self) -> Result<(), WizardError> {
        match self.status {
            SubmissionStatus::Sending => Err(WizardError::Busy),
            SubmissionStatus::Success => Err(WizardError::Finished),
            SubmissionStatus::Idle | SubmissionStatus::Error => Ok(()),
        }
    }

    /// Advances one step, staying on the last one.
    pub fn next(&mut self) -> Result<usize, WizardError> {
        self.ensure_editable()?;
        self.step = (self.step + 1).min(self.step_count().saturating_sub(1));
        Ok(self.step)
    }

    /// Goes back one step, staying on the first one.
    pub fn back(&mut self) -> Result<usize, WizardError> {
        self.ensure_editable()?;
        self.step = self.step.saturating_sub(1);
        Ok(self.step)
    }

    /// Sets one declared field. Text fields take strings, list fields take arrays.
    pub fn set_field(&mut self, key: &str, value: Value) -> Result<(), WizardError> {
        self.ensure_editable()?;
        let spec = D::field_spec(key).ok_or_else(|| WizardError::UnknownField(key.to_string()))?;

        let kind_ok = match spec.kind {
            FieldKind::List => value.is_array(),
            _ => value.is_string(),
        };
        if !kind_ok {
            return Err(WizardError::InvalidValue {
                field: key.to_string(),
                reason: match spec.kind {
                    FieldKind::List => "expected an array".to_string(),
                    _ => "expected a string".to_string(),
                },
            });
        }

        let invalid = |e: serde_json::Error| WizardError::InvalidValue {
            field: key.to_string(),
            reason: e.to_string(),
        };
        let mut object = serde_json::to_value(&self.data).map_err(invalid)?;
        if let Some(map) = object.as_object_mut() {
            map.insert(key.to_string(), value);
        }
        self.data = serde_json::from_value(object).map_err(invalid)?;
        Ok(())
    }

    /// Required fields that are blank (empty string or empty list).
    pub fn missing_required(&self) -> Vec<&'static str> {
        let object = serde_json::to_value(&self.data).unwrap_or(Value::Null);
        D::steps()
            .iter()
            .flat_map(|s| s.fields.iter())
            .filter(|f| f.required)
            .filter(|f| match object.get(f.key) {
                Some(Value::String(s)) => s.trim().is_empty(),
                Some(Value::Array(items)) => items.is_empty(),
                Some(Value::Null) | None => true,
                Some(_) => false,
            })
            .map(|f| f.key)
            .collect()
    }

    /// Validates and enters `sending`, returning the payload to dispatch.
    /// A blank required field moves to `error` with the generic message instead.
    pub fn begin_submit(&mut self) -> Result<D, WizardError> {
        self.ensure_editable()?;
        self.data.prepare_submission(&self.options);

        let missing = self.missing_required();
        if !missing.is_empty() {
            self.status = SubmissionStatus::Error;
            self.error_message = Some(REQUIRED_FIELDS_MESSAGE.to_string());
            return Err(WizardError::MissingRequired(missing));
        }

        self.status = SubmissionStatus::Sending;
        self.error_message = None;
        Ok(self.data.clone())
    }

    /// Resolves an in-flight submission.
    pub fn complete(&mut self, outcome: Result<(), String>) -> Result<(), WizardError> {
        if self.status != SubmissionStatus::Sending {
            return Err(WizardError::NotSending);
        }
        match outcome {
            Ok(()) => {
                self.status = SubmissionStatus::Success;
                self.error_message = None;
            }
            Err(message) => {
                self.status = SubmissionStatus::Error;
                self.error_message = Some(message);
            }
        }
        Ok(())
    }

    pub fn view(&self) -> WizardView<D> {
        let steps = D::steps();
        WizardView {
            step: self.step,
            step_count: steps.len(),
            current: steps[self.step.min(steps.len().saturating_sub(1))],
            data: self.data.clone(),
            status: self.status,
            error_message: self.error_message.clone(),
            options: self.options,
            template: self.template.clone(),
            profile_type: self.profile_type.clone(),
        }
    }
}
