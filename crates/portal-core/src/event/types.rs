//! Tipos de evento del flujo y estructura `FlowEvent`.
//!
//! Cada transición del `FlowEngine` se registra en un `EventStore`
//! append-only. Es una traza de auditoría para el host (logs/telemetría):
//! sólo nombres de campo, nunca valores introducidos por el usuario.
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum FlowEventKind {
    /// Primer evento de un `flow_id`: fija definición y cantidad de steps.
    FlowStarted {
        definition_id: String,
        definition_hash: String,
        step_count: usize,
    },
    FieldUpdated {
        step_id: String,
        field: String,
        cleared_error: bool,
    },
    StepAdvanced { from: String, to: String },
    /// Validación o branching rechazó el avance (campos con error).
    AdvanceRejected { step_id: String, fields: Vec<String> },
    StepRetreated { from: String, to: String },
    StepJumped { from: String, to: String },
    FlowReset { from: String },
    /// Submit fallido (validación del paso terminal o rechazo del sink); el
    /// flujo sigue en el paso terminal.
    SubmitRejected { step_id: String, reason: String },
    /// Evento de cierre. Después no se aceptan más operaciones.
    FlowSubmitted { fingerprint: String },
}

impl FlowEventKind {
    /// Código compacto para trazas y tests.
    pub fn code(&self) -> &'static str {
        match self {
            Self::FlowStarted { .. } => "I",
            Self::FieldUpdated { .. } => "U",
            Self::StepAdvanced { .. } => "A",
            Self::AdvanceRejected { .. } => "X",
            Self::StepRetreated { .. } => "B",
            Self::StepJumped { .. } => "J",
            Self::FlowReset { .. } => "R",
            Self::SubmitRejected { .. } => "Z",
            Self::FlowSubmitted { .. } => "C",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FlowEvent {
    pub seq: u64, // asignado por el EventStore (orden append)
    pub flow_id: Uuid,
    pub kind: FlowEventKind,
    pub ts: DateTime<Utc>,
}
