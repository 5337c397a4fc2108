//! `FormStep`: paso declarativo (campos + reglas + chequeos cruzados).
//!
//! ```ignore
//! let details = FormStep::new("details")
//!     .field("subject", [FieldRule::Required, FieldRule::MaxLength(100)])
//!     .check("subject", |data| None);
//! ```
use std::fmt;

use super::rules::{first_failure, FieldRule};
use super::{StepDefinition, StepKind};
use crate::model::{FieldErrors, FlowData};

type Check = Box<dyn Fn(&FlowData) -> Option<String> + Send + Sync>;

struct FieldEntry {
    name: String,
    rules: Vec<FieldRule>,
}

pub struct FormStep {
    id: String,
    name: Option<String>,
    kind: StepKind,
    fields: Vec<FieldEntry>,
    /// Chequeos sobre varios campos; el error se asocia al campo indicado.
    checks: Vec<(String, Check)>,
}

impl FormStep {
    pub fn new(id: impl Into<String>) -> Self {
        Self { id: id.into(),
               name: None,
               kind: StepKind::Form,
               fields: Vec::new(),
               checks: Vec::new() }
    }

    /// Paso de resumen sin campos.
    pub fn review(id: impl Into<String>) -> Self {
        Self::new(id).with_kind(StepKind::Review)
    }

    pub fn named(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn with_kind(mut self, kind: StepKind) -> Self {
        self.kind = kind;
        self
    }

    /// Declara un campo; redeclararlo sustituye sus reglas.
    pub fn field<R>(mut self, name: impl Into<String>, rules: R) -> Self
        where R: IntoIterator<Item = FieldRule>
    {
        let name = name.into();
        let rules: Vec<FieldRule> = rules.into_iter().collect();
        match self.fields.iter_mut().find(|f| f.name == name) {
            Some(entry) => entry.rules = rules,
            None => self.fields.push(FieldEntry { name, rules }),
        }
        self
    }

    /// Chequeo cruzado. Sólo corre si `field` pasó sus reglas propias.
    pub fn check<F>(mut self, field: impl Into<String>, check: F) -> Self
        where F: Fn(&FlowData) -> Option<String> + Send + Sync + 'static
    {
        self.checks.push((field.into(), Box::new(check)));
        self
    }
}

impl StepDefinition for FormStep {
    fn id(&self) -> &str {
        &self.id
    }

    fn name(&self) -> &str {
        self.name.as_deref().unwrap_or(&self.id)
    }

    fn fields(&self) -> Vec<&str> {
        self.fields.iter().map(|f| f.name.as_str()).collect()
    }

    fn validate(&self, data: &FlowData) -> FieldErrors {
        let mut errors = FieldErrors::new();
        for entry in &self.fields {
            if let Some(msg) = first_failure(&entry.rules, data.get(&entry.name)) {
                errors.insert(entry.name.clone(), msg);
            }
        }
        for (field, check) in &self.checks {
            if errors.contains_key(field) {
                continue;
            }
            if let Some(msg) = check(data) {
                errors.insert(field.clone(), msg);
            }
        }
        errors
    }

    fn kind(&self) -> StepKind {
        self.kind
    }
}

impl fmt::Debug for FormStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FormStep")
         .field("id", &self.id)
         .field("kind", &self.kind)
         .field("fields", &self.fields())
         .field("checks", &self.checks.len())
         .finish()
    }
}
