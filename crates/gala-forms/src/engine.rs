//! Multi-step form engine
//!
//! Drives one form session over a resolved [`FormConfig`]: step navigation,
//! field edits, validation and submission. Errors never escape as panics;
//! the last failure is held as a human-readable string until the next edit.

use gala_common::FieldValue;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::bag::DataBag;
use crate::render::{render_step, visible_fields, RenderedStep};
use crate::schema::FormConfig;
use crate::transport::SubmissionTransport;
use crate::validation::{validate_all, validate_step, ValidationIssue};

/// Which bag entries go into the submission payload
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SubmitScope {
    /// Every key ever set, including fields in groups that are now hidden
    #[default]
    Everything,
    /// Only fields the user can currently see
    VisibleOnly,
}

/// The part of `bag` that `scope` lets through
pub fn scoped(config: &FormConfig, bag: &DataBag, scope: SubmitScope) -> DataBag {
    match scope {
        SubmitScope::Everything => bag.clone(),
        SubmitScope::VisibleOnly => {
            let names = config
                .steps
                .iter()
                .flat_map(|step| visible_fields(step, bag))
                .map(|f| f.name.as_str());
            bag.subset(names)
        }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct EngineOptions {
    pub submit_scope: SubmitScope,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Phase {
    Editing { step: usize },
    Submitted,
}

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum FormError {
    #[error("please fix {} field(s) before continuing", .0.len())]
    Validation(Vec<ValidationIssue>),
    #[error("{0}")]
    Transport(String),
    #[error("{message}")]
    Rejected { status: u16, message: String },
    #[error("form already submitted")]
    AlreadySubmitted,
    #[error("complete step {} of {} before submitting", .step + 1, .last + 1)]
    NotOnLastStep { step: usize, last: usize },
}

pub struct FormEngine {
    config: FormConfig,
    options: EngineOptions,
    bag: DataBag,
    phase: Phase,
    error: Option<String>,
    issues: Vec<ValidationIssue>,
}

impl FormEngine {
    pub fn new(config: FormConfig) -> Self {
        Self::with_options(config, EngineOptions::default())
    }

    pub fn with_options(config: FormConfig, options: EngineOptions) -> Self {
        Self {
            config,
            options,
            bag: DataBag::new(),
            phase: Phase::Editing { step: 0 },
            error: None,
            issues: Vec::new(),
        }
    }

    /// Start from existing answers, e.g. a registrant editing their record
    pub fn with_data(mut self, bag: DataBag) -> Self {
        self.bag = bag;
        self
    }

    pub fn config(&self) -> &FormConfig {
        &self.config
    }

    pub fn bag(&self) -> &DataBag {
        &self.bag
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn is_submitted(&self) -> bool {
        self.phase == Phase::Submitted
    }

    /// Step index; stays at the last step once submitted
    pub fn current_step(&self) -> usize {
        match self.phase {
            Phase::Editing { step } => step,
            Phase::Submitted => self.config.last_step(),
        }
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn issues(&self) -> &[ValidationIssue] {
        &self.issues
    }

    /// Shown once the submission succeeded
    pub fn success_message(&self) -> Option<&str> {
        self.is_submitted().then_some(self.config.chrome.success_message.as_str())
    }

    pub fn render(&self) -> Option<RenderedStep> {
        let index = self.current_step();
        let step = self.config.steps.get(index)?;
        Some(render_step(index, step, &self.bag))
    }

    pub fn set_field(&mut self, name: &str, value: impl Into<FieldValue>) {
        self.bag.set(name, value);
        self.touch(name);
    }

    pub fn toggle_option(&mut self, name: &str, option: &str, on: bool) {
        self.bag.toggle(name, option, on);
        self.touch(name);
    }

    fn touch(&mut self, name: &str) {
        self.error = None;
        self.issues.retain(|i| i.field != name);
    }

    /// Validate the current step and advance. On the last step this only
    /// validates.
    pub fn next(&mut self) -> Result<usize, FormError> {
        let Phase::Editing { step } = self.phase else {
            return Err(FormError::AlreadySubmitted);
        };
        self.check(validate_step(&self.config, step, &self.bag))?;
        if step < self.config.last_step() {
            self.phase = Phase::Editing { step: step + 1 };
        }
        Ok(self.current_step())
    }

    pub fn back(&mut self) -> usize {
        if let Phase::Editing { step } = self.phase {
            if step > 0 {
                self.phase = Phase::Editing { step: step - 1 };
            }
        }
        self.current_step()
    }

    fn check(&mut self, issues: Vec<ValidationIssue>) -> Result<(), FormError> {
        self.issues = issues;
        if self.issues.is_empty() {
            return Ok(());
        }
        let err = FormError::Validation(self.issues.clone());
        self.error = Some(err.to_string());
        Err(err)
    }

    /// JSON body for the submit endpoint, honouring the submit scope
    pub fn payload(&self) -> Value {
        scoped(&self.config, &self.bag, self.options.submit_scope).to_json()
    }

    /// Validate everything and POST the payload. Only offered on the last
    /// step. The bag survives a failed attempt so the user can retry as-is.
    pub async fn submit(&mut self, transport: &dyn SubmissionTransport) -> Result<(), FormError> {
        let Phase::Editing { step } = self.phase else {
            return Err(FormError::AlreadySubmitted);
        };
        let last = self.config.last_step();
        if step != last {
            return Err(FormError::NotOnLastStep { step, last });
        }
        self.check(validate_all(&self.config, &self.bag))?;

        let body = self.payload();
        let outcome = match transport.post_json(&self.config.submit_endpoint, &body).await {
            Ok(resp) if resp.is_success() => Ok(()),
            Ok(resp) => Err(FormError::Rejected { status: resp.status, message: resp.error_message() }),
            Err(err) => Err(FormError::Transport(err.to_string())),
        };

        match outcome {
            Ok(()) => {
                tracing::info!(endpoint = %self.config.submit_endpoint, "form submitted");
                self.phase = Phase::Submitted;
                self.error = None;
                Ok(())
            }
            Err(err) => {
                tracing::warn!(error = %err, "form submission failed");
                self.error = Some(err.to_string());
                Err(err)
            }
        }
    }
}
