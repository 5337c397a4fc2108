//! Builder para `FlowEngine`.
//!
//! Permite inyectar un `EventStore` propio (p.ej. uno compartido por el host
//! o `&mut` a un store externo) y fijar el `flow_id` antes de iniciar.
//!
//! ```ignore
//! let engine = FlowEngine::builder(definition)
//!     .event_store(shared_store)
//!     .flow_id(id)
//!     .start()?;
//! ```
use std::sync::Arc;

use uuid::Uuid;

use crate::definition::FlowDefinition;
use crate::engine::FlowEngine;
use crate::errors::FlowEngineError;
use crate::event::EventStore;

#[derive(Debug)]
pub struct EngineBuilder<E: EventStore> {
    definition: Arc<FlowDefinition>,
    event_store: E,
    flow_id: Option<Uuid>,
}

impl EngineBuilder<crate::event::InMemoryEventStore> {
    pub fn new(definition: Arc<FlowDefinition>) -> Self {
        Self { definition,
               event_store: Default::default(),
               flow_id: None }
    }
}

impl<E: EventStore> EngineBuilder<E> {
    /// Sustituye el store de eventos (cambia el tipo del builder).
    #[inline]
    pub fn event_store<E2: EventStore>(self, event_store: E2) -> EngineBuilder<E2> {
        EngineBuilder { definition: self.definition,
                        event_store,
                        flow_id: self.flow_id }
    }

    #[inline]
    pub fn flow_id(mut self, flow_id: Uuid) -> Self {
        self.flow_id = Some(flow_id);
        self
    }

    /// Construye el engine sin iniciar (fase `NotStarted`).
    pub fn build(self) -> FlowEngine<E> {
        let flow_id = self.flow_id.unwrap_or_else(Uuid::new_v4);
        FlowEngine::from_parts(self.definition, flow_id, self.event_store)
    }

    /// Construye e inicia el engine en el primer paso.
    pub fn start(self) -> Result<FlowEngine<E>, FlowEngineError> {
        let mut engine = self.build();
        engine.start()?;
        Ok(engine)
    }
}
