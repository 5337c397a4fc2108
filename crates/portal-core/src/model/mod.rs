//! Modelos del flujo: datos acumulados, errores por campo, estado y snapshot.

pub mod snapshot;
pub mod state;

use std::collections::BTreeMap;

use serde_json::Value;

/// Datos acumulados del formulario (nombre de campo -> valor).
pub type FlowData = BTreeMap<String, Value>;

/// Errores por campo (nombre de campo -> mensaje).
pub type FieldErrors = BTreeMap<String, String>;

pub use snapshot::FlowSnapshot;
pub use state::{FlowPhase, FlowState};
