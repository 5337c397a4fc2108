//! Estado en memoria de una instancia de flujo.
//!
//! `FlowState` vive mientras el diálogo/wizard está abierto y se descarta al
//! cancelar, enviar o cerrar. Invariantes:
//! - `data` sólo crece o se sobrescribe; moverse entre pasos no borra nada.
//! - `errors` sólo contiene campos del paso actual.
//! - `history` es la pila de pasos visitados usada por `retreat`/`jump`.
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::{FieldErrors, FlowData};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FlowState {
    pub current_step_id: String,
    pub data: FlowData,
    pub errors: FieldErrors,
    pub history: Vec<String>,
}

impl FlowState {
    /// Estado vacío posicionado en `first_step`.
    pub fn new(first_step: impl Into<String>) -> Self {
        Self { current_step_id: first_step.into(),
               data: FlowData::new(),
               errors: FieldErrors::new(),
               history: Vec::new() }
    }

    pub fn value(&self, field: &str) -> Option<&Value> {
        self.data.get(field)
    }

    pub fn error(&self, field: &str) -> Option<&str> {
        self.errors.get(field).map(String::as_str)
    }

    pub fn has_errors(&self) -> bool {
        !self.errors.is_empty()
    }

    /// Paso al que volvería `retreat`.
    pub fn previous_step_id(&self) -> Option<&str> {
        self.history.last().map(String::as_str)
    }
}

/// Fase de la máquina de estados más allá de los pasos concretos.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FlowPhase {
    /// Creado pero sin `start`.
    NotStarted,
    /// En algún paso de la definición.
    Active,
    /// Enviado al sink; el engine ya no acepta operaciones.
    Submitted,
}
