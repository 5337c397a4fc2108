//! Errores del motor de flujos.
//!
//! Se separan tres familias:
//! - `Validation`: errores de usuario, recuperables editando el campo.
//! - `InvalidTransition` / `UnknownStep`: errores de integración (uso
//!   incorrecto del engine o de la definición). Se registran con `error!`.
//! - `Sink`: el destino de la submission rechazó el snapshot.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::model::FieldErrors;

/// Transiciones rechazadas por la máquina de estados.
#[derive(Debug, Error, PartialEq, Eq, Clone, Serialize, Deserialize)]
pub enum InvalidTransition {
    #[error("flow not started")]
    NotStarted,
    #[error("flow already started")]
    AlreadyStarted,
    #[error("flow already submitted")]
    AlreadySubmitted,
    #[error("cannot advance past terminal step '{step_id}'")]
    PastTerminal { step_id: String },
    #[error("submit requires the terminal step (current: '{current}')")]
    NotAtTerminalStep { current: String },
    #[error("already at first step '{step_id}'")]
    AtFirstStep { step_id: String },
    #[error("step '{step_id}' has not been visited")]
    NotVisited { step_id: String },
    #[error("branching from '{step_id}' targets the same step")]
    SelfLoop { step_id: String },
}

/// Rechazo emitido por un `SubmissionSink`.
#[derive(Debug, Error, PartialEq, Eq, Clone, Serialize, Deserialize)]
pub enum SinkError {
    #[error("payload rejected: {0}")]
    Rejected(String),
    #[error("duplicate submission {0}")]
    Duplicate(String),
    #[error("sink unavailable: {0}")]
    Unavailable(String),
}

/// Error de las operaciones del `FlowEngine`.
#[derive(Debug, Error, PartialEq, Eq, Clone, Serialize, Deserialize)]
pub enum FlowEngineError {
    #[error("validation failed on step '{step_id}'")]
    Validation { step_id: String, errors: FieldErrors },
    #[error("invalid transition: {0}")]
    InvalidTransition(#[from] InvalidTransition),
    #[error("unknown step '{0}'")]
    UnknownStep(String),
    #[error("submission failed: {0}")]
    Sink(#[from] SinkError),
}

impl FlowEngineError {
    /// `true` para errores que el usuario puede corregir sin reabrir el flujo.
    pub fn is_recoverable(&self) -> bool {
        matches!(self, Self::Validation { .. } | Self::Sink(_))
    }

    /// Errores por campo si es un rechazo de validación.
    pub fn field_errors(&self) -> Option<&FieldErrors> {
        match self {
            Self::Validation { errors, .. } => Some(errors),
            _ => None,
        }
    }
}

/// Definición de flujo inválida (detectada al construirla).
#[derive(Debug, Error, PartialEq, Eq, Clone, Serialize, Deserialize)]
pub enum DefinitionError {
    #[error("flow '{0}' has no steps")]
    Empty(String),
    #[error("flow '{flow}' declares step '{step_id}' twice")]
    DuplicateStep { flow: String, step_id: String },
    #[error("flow '{0}' contains a step with an empty id")]
    EmptyStepId(String),
}
