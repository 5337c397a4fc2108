//! Flow context: API de conducción para renderers y scripts.
//!
//! Un `FlowCtx` envuelve un engine y aplica `FlowAction`s, que es la forma
//! en la que un Step Renderer (o un script de prueba) envía eventos.
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::engine::FlowEngine;
use crate::errors::FlowEngineError;
use crate::event::EventStore;

/// Evento de usuario sobre el flujo.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum FlowAction {
    UpdateField { name: String, value: Value },
    Advance,
    Retreat,
    Jump { step: String },
    Reset,
}

pub struct FlowCtx<'a, E: EventStore> {
    pub engine: &'a mut FlowEngine<E>,
}

impl<'a, E: EventStore> FlowCtx<'a, E> {
    #[inline]
    pub fn new(engine: &'a mut FlowEngine<E>) -> Self {
        Self { engine }
    }

    /// Aplica una acción.
    pub fn apply(&mut self, action: &FlowAction) -> Result<(), FlowEngineError> {
        match action {
            FlowAction::UpdateField { name, value } => self.engine.update_field(name, value.clone()),
            FlowAction::Advance => self.engine.advance().map(|_| ()),
            FlowAction::Retreat => self.engine.retreat().map(|_| ()),
            FlowAction::Jump { step } => self.engine.jump(step).map(|_| ()),
            FlowAction::Reset => self.engine.reset(),
        }
    }

    /// Aplica acciones en orden; se detiene en el primer error.
    pub fn run_script(&mut self, actions: &[FlowAction]) -> Result<(), FlowEngineError> {
        for action in actions {
            self.apply(action)?;
        }
        Ok(())
    }

    /// Rellena campos y avanza (un "Siguiente" del wizard).
    pub fn fill_and_advance<I, K, V>(&mut self, fields: I) -> Result<String, FlowEngineError>
        where I: IntoIterator<Item = (K, V)>,
              K: AsRef<str>,
              V: Into<Value>
    {
        self.engine.update_fields(fields)?;
        self.engine.advance()
    }

    /// Avanza hasta el paso terminal o hasta el primer rechazo.
    pub fn advance_to_terminal(&mut self) -> Result<String, FlowEngineError> {
        loop {
            if self.engine.is_at_terminal() {
                return Ok(self.engine.current_step_id().unwrap_or_default().to_string());
            }
            self.engine.advance()?;
        }
    }
}
