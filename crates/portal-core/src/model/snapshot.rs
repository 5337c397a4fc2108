//! Snapshot entregado al `SubmissionSink`.
//!
//! El `fingerprint` es el hash canónico de `data` y se registra en el evento
//! de submit. La identidad de la instancia es `flow_id`.
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

use super::FlowData;
use crate::definition::FlowDefinition;
use crate::hashing::hash_value;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FlowSnapshot {
    pub flow_id: Uuid,
    pub definition_id: String,
    pub definition_hash: String,
    pub data: FlowData,
    pub fingerprint: String,
    pub taken_at: DateTime<Utc>,
}

impl FlowSnapshot {
    pub fn new(flow_id: Uuid, definition: &FlowDefinition, data: FlowData) -> Self {
        let fingerprint = Self::fingerprint_of(definition.id(), &data);
        Self { flow_id,
               definition_id: definition.id().to_string(),
               definition_hash: definition.definition_hash().to_string(),
               data,
               fingerprint,
               taken_at: Utc::now() }
    }

    /// Fingerprint de un payload para un tipo de flujo dado.
    pub fn fingerprint_of(definition_id: &str, data: &FlowData) -> String {
        let payload: serde_json::Map<String, Value> = data.iter().map(|(k, v)| (k.clone(), v.clone())).collect();
        hash_value(&serde_json::json!({ "flow": definition_id, "data": payload }))
    }

    pub fn get(&self, field: &str) -> Option<&Value> {
        self.data.get(field)
    }

    pub fn get_str(&self, field: &str) -> Option<&str> {
        self.data.get(field).and_then(Value::as_str)
    }

    /// Datos como objeto JSON (útil para deserializar payloads tipados).
    pub fn to_json(&self) -> Value {
        Value::Object(self.data.iter().map(|(k, v)| (k.clone(), v.clone())).collect())
    }
}
