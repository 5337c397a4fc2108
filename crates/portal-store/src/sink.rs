//! `SubmissionSink` del portal.
use portal_core::{FlowSnapshot, SinkError, SubmissionSink};
use portal_domain::FlowKind;

use crate::store::{PortalStore, Submission};

/// Sink ligado a un tipo de flujo: valida el payload, crea el registro y
/// devuelve la referencia.
pub struct PortalSink<'a> {
    store: &'a mut PortalStore,
    kind: FlowKind,
}

impl<'a> PortalSink<'a> {
    pub fn new(store: &'a mut PortalStore, kind: FlowKind) -> Self {
        Self { store, kind }
    }
}

impl SubmissionSink for PortalSink<'_> {
    type Receipt = Submission;

    fn accept(&mut self, snapshot: &FlowSnapshot) -> Result<Submission, SinkError> {
        if snapshot.definition_id != self.kind.id() {
            return Err(SinkError::Rejected(format!("snapshot of '{}' sent to the {} sink",
                                                   snapshot.definition_id, self.kind)));
        }
        Ok(self.store.record(self.kind, snapshot)?)
    }
}
