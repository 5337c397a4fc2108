//! Resolución del siguiente paso (grafo de steps).
//!
//! La función de branching decide a partir del paso actual y los datos
//! acumulados. Puede seguir el orden por defecto, saltar a un paso concreto
//! o rechazar el avance con un error de dominio asociado a un campo.
use serde::{Deserialize, Serialize};

use super::FlowDefinition;
use crate::errors::{FlowEngineError, InvalidTransition};
use crate::model::{FieldErrors, FlowData};

/// Decisión de la función de branching.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Next {
    /// Siguiente paso en orden de definición.
    Default,
    Goto(String),
    /// Rechaza el avance (p.ej. "target must exceed current price").
    Reject { field: String, message: String },
}

impl Next {
    pub fn goto(step_id: impl Into<String>) -> Self {
        Self::Goto(step_id.into())
    }

    pub fn reject(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Reject { field: field.into(),
                       message: message.into() }
    }
}

pub trait Branching: Send + Sync {
    fn next_step(&self, current: &str, data: &FlowData) -> Next;
}

impl<F> Branching for F where F: Fn(&str, &FlowData) -> Next + Send + Sync
{
    fn next_step(&self, current: &str, data: &FlowData) -> Next {
        self(current, data)
    }
}

/// Resultado de resolver una decisión contra la definición.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolved {
    Step(String),
    Rejected(FieldErrors),
}

/// Resuelve el paso que sigue a `current`.
///
/// Falla con `PastTerminal` si `current` es el paso terminal, con
/// `UnknownStep` si la decisión apunta a un id ausente y con `SelfLoop` si
/// apunta al propio paso.
pub fn resolve_next(definition: &FlowDefinition, current: &str, data: &FlowData) -> Result<Resolved, FlowEngineError> {
    if !definition.contains(current) {
        return Err(FlowEngineError::UnknownStep(current.to_string()));
    }
    if definition.is_terminal(current) {
        return Err(InvalidTransition::PastTerminal { step_id: current.to_string() }.into());
    }
    let decision = definition.branching()
                             .map(|b| b.next_step(current, data))
                             .unwrap_or(Next::Default);
    match decision {
        Next::Default => definition.default_next(current)
                                   .map(|s| Resolved::Step(s.to_string()))
                                   .ok_or_else(|| InvalidTransition::PastTerminal { step_id: current.to_string() }.into()),
        Next::Goto(target) => {
            if !definition.contains(&target) {
                return Err(FlowEngineError::UnknownStep(target));
            }
            if target == current {
                return Err(InvalidTransition::SelfLoop { step_id: target }.into());
            }
            Ok(Resolved::Step(target))
        }
        Next::Reject { field, message } => {
            let mut errors = FieldErrors::new();
            errors.insert(field, message);
            Ok(Resolved::Rejected(errors))
        }
    }
}
