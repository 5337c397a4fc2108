//! Host del portal: una definición compartida por tipo de flujo y el store
//! donde terminan las submissions.
use std::collections::HashMap;
use std::str::FromStr;
use std::sync::Arc;

use log::{info, warn};
use portal_core::{EventStore, FlowAction, FlowCtx, FlowDefinition, FlowEngine, FlowEngineError};
use portal_domain::{DomainError, FlowKind};
use portal_store::{PortalSink, PortalStore, StoreConfig, StoreError, Submission};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum PortalError {
    #[error(transparent)]
    Engine(#[from] FlowEngineError),
    #[error(transparent)]
    Domain(#[from] DomainError),
    #[error(transparent)]
    Store(#[from] StoreError),
    #[error("script inválido: {0}")]
    Script(String),
}

pub struct Portal {
    definitions: HashMap<FlowKind, Arc<FlowDefinition>>,
    store: PortalStore,
}

impl Portal {
    /// Construye todas las definiciones una sola vez; fallan al arrancar, no
    /// al abrir un flujo.
    pub fn new(config: &StoreConfig) -> Result<Self, PortalError> {
        let definitions = FlowKind::ALL.into_iter()
                                       .map(|kind| -> Result<_, PortalError> { Ok((kind, Arc::new(kind.definition()?))) })
                                       .collect::<Result<HashMap<_, _>, PortalError>>()?;
        Ok(Self { definitions,
                  store: PortalStore::new(config) })
    }

    pub fn definition(&self, kind: FlowKind) -> Result<Arc<FlowDefinition>, PortalError> {
        self.definitions
            .get(&kind)
            .cloned()
            .ok_or_else(|| DomainError::UnknownFlowKind(kind.to_string()).into())
    }

    /// Abre un diálogo: engine nuevo, ya en el primer paso.
    pub fn open(&self, kind: FlowKind) -> Result<FlowEngine, PortalError> {
        let engine = FlowEngine::started(self.definition(kind)?);
        info!("opened {kind} flow {}", engine.flow_id());
        Ok(engine)
    }

    /// Entrega el engine al sink de su tipo de flujo.
    pub fn submit<E>(&mut self, engine: &mut FlowEngine<E>) -> Result<Submission, PortalError>
        where E: EventStore
    {
        let kind = FlowKind::from_str(engine.definition().id())?;
        let mut sink = PortalSink::new(&mut self.store, kind);
        match engine.submit(&mut sink) {
            Ok(submission) => Ok(submission),
            Err(e) => {
                if e.is_recoverable() {
                    warn!("{kind} flow {} not submitted: {e}", engine.flow_id());
                }
                Err(e.into())
            }
        }
    }

    /// Abre un flujo, aplica las acciones y lo envía.
    pub fn run(&mut self, kind: FlowKind, actions: &[FlowAction]) -> Result<Submission, PortalError> {
        let mut engine = self.open(kind)?;
        FlowCtx::new(&mut engine).run_script(actions)?;
        self.submit(&mut engine)
    }

    /// Igual que `run` con las acciones en JSON (`[{"action": "advance"}, ...]`).
    pub fn run_json(&mut self, kind: FlowKind, script: &str) -> Result<Submission, PortalError> {
        let actions: Vec<FlowAction> = serde_json::from_str(script).map_err(|e| PortalError::Script(e.to_string()))?;
        self.run(kind, &actions)
    }

    pub fn store(&self) -> &PortalStore {
        &self.store
    }

    pub fn store_mut(&mut self) -> &mut PortalStore {
        &mut self.store
    }
}
