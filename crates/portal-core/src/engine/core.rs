//! Core FlowEngine implementation

use std::sync::Arc;

use log::{debug, error, warn};
use serde_json::Value;
use uuid::Uuid;

use crate::definition::{resolve_next, FlowDefinition, Resolved};
use crate::engine::EngineBuilder;
use crate::errors::{FlowEngineError, InvalidTransition};
use crate::event::{EventStore, FlowEvent, FlowEventKind, InMemoryEventStore};
use crate::model::{FieldErrors, FlowPhase, FlowSnapshot, FlowState};
use crate::sink::SubmissionSink;
use crate::step::StepDefinition;

/// Motor de una instancia de flujo guiado.
///
/// Mantiene el paso actual, los datos acumulados, los errores por campo y el
/// historial de pasos visitados. Cada operación se completa antes de aceptar
/// la siguiente; no hay trabajo en segundo plano.
#[derive(Debug)]
pub struct FlowEngine<E = InMemoryEventStore>
    where E: EventStore
{
    definition: Arc<FlowDefinition>,
    flow_id: Uuid,
    phase: FlowPhase,
    state: Option<FlowState>,
    event_store: E,
}

impl FlowEngine<InMemoryEventStore> {
    /// Crea un engine sin iniciar con store de eventos en memoria.
    #[inline]
    pub fn new(definition: Arc<FlowDefinition>) -> Self {
        Self::with_event_store(definition, InMemoryEventStore::default())
    }

    /// Atajo: crea e inicia el flujo en su primer paso.
    pub fn started(definition: Arc<FlowDefinition>) -> Self {
        let mut engine = Self::new(definition);
        engine.init_state();
        engine
    }

    /// Builder para configurar store de eventos y `flow_id`.
    #[inline]
    pub fn builder(definition: Arc<FlowDefinition>) -> EngineBuilder<InMemoryEventStore> {
        EngineBuilder::new(definition)
    }
}

impl<E> FlowEngine<E> where E: EventStore
{
    pub fn with_event_store(definition: Arc<FlowDefinition>, event_store: E) -> Self {
        Self::from_parts(definition, Uuid::new_v4(), event_store)
    }

    pub(crate) fn from_parts(definition: Arc<FlowDefinition>, flow_id: Uuid, event_store: E) -> Self {
        Self { definition,
               flow_id,
               phase: FlowPhase::NotStarted,
               state: None,
               event_store }
    }

    pub fn flow_id(&self) -> Uuid {
        self.flow_id
    }

    pub fn definition(&self) -> &FlowDefinition {
        &self.definition
    }

    pub fn phase(&self) -> FlowPhase {
        self.phase
    }

    /// Estado actual; `None` antes de `start` y después de `submit`.
    pub fn state(&self) -> Option<&FlowState> {
        self.state.as_ref()
    }

    pub fn current_step_id(&self) -> Option<&str> {
        self.state.as_ref().map(|s| s.current_step_id.as_str())
    }

    pub fn current_step(&self) -> Option<&dyn StepDefinition> {
        self.current_step_id().and_then(|id| self.definition.step(id))
    }

    pub fn is_at_terminal(&self) -> bool {
        self.current_step_id().map(|id| self.definition.is_terminal(id)).unwrap_or(false)
    }

    pub fn event_store(&self) -> &E {
        &self.event_store
    }

    /// Eventos registrados para esta instancia.
    pub fn events(&self) -> Vec<FlowEvent> {
        self.event_store.list(self.flow_id)
    }

    /// Secuencia compacta de eventos (ver `FlowEventKind::code`).
    pub fn event_codes(&self) -> Vec<&'static str> {
        self.events().iter().map(|e| e.kind.code()).collect()
    }

    /// Inicializa el estado en el primer paso con datos/errores vacíos.
    pub fn start(&mut self) -> Result<&FlowState, FlowEngineError> {
        match self.phase {
            FlowPhase::NotStarted => {}
            FlowPhase::Active => return Err(self.violation(InvalidTransition::AlreadyStarted)),
            FlowPhase::Submitted => return Err(self.violation(InvalidTransition::AlreadySubmitted)),
        }
        Ok(self.init_state())
    }

    fn init_state(&mut self) -> &FlowState {
        let first = self.definition.first_step_id().to_string();
        self.record(FlowEventKind::FlowStarted { definition_id: self.definition.id().to_string(),
                                                 definition_hash: self.definition.definition_hash().to_string(),
                                                 step_count: self.definition.len() });
        debug!("flow {} ({}) started at '{}'", self.flow_id, self.definition.id(), first);
        self.phase = FlowPhase::Active;
        self.state.insert(FlowState::new(first))
    }

    /// Escribe `data[name] = value` y limpia el error del campo si existía.
    pub fn update_field(&mut self, name: &str, value: impl Into<Value>) -> Result<(), FlowEngineError> {
        self.ensure_active()?;
        let Some(state) = self.state.as_mut() else {
            return Err(self.violation(InvalidTransition::NotStarted));
        };
        state.data.insert(name.to_string(), value.into());
        let cleared_error = state.errors.remove(name).is_some();
        let step_id = state.current_step_id.clone();
        self.record(FlowEventKind::FieldUpdated { step_id,
                                                  field: name.to_string(),
                                                  cleared_error });
        Ok(())
    }

    /// Varias escrituras seguidas (p.ej. un paso completo del formulario).
    pub fn update_fields<I, K, V>(&mut self, fields: I) -> Result<(), FlowEngineError>
        where I: IntoIterator<Item = (K, V)>,
              K: AsRef<str>,
              V: Into<Value>
    {
        for (name, value) in fields {
            self.update_field(name.as_ref(), value)?;
        }
        Ok(())
    }

    /// Valida el paso actual sin modificar el estado.
    pub fn validate_current(&self) -> Result<FieldErrors, FlowEngineError> {
        let state = self.active_state()?;
        let step = self.lookup(&state.current_step_id)?;
        Ok(scoped(step, step.validate(&state.data)))
    }

    /// Valida el paso actual y avanza al siguiente (orden por defecto o
    /// branching). Devuelve el id del nuevo paso.
    pub fn advance(&mut self) -> Result<String, FlowEngineError> {
        let definition = Arc::clone(&self.definition);
        let state = self.active_state()?;
        let current = state.current_step_id.clone();
        if definition.is_terminal(&current) {
            return Err(self.violation(InvalidTransition::PastTerminal { step_id: current }));
        }
        let step = self.lookup(&current)?;
        let errors = scoped(step, step.validate(&state.data));
        if !errors.is_empty() {
            return Err(self.reject(current, errors));
        }
        let next = match resolve_next(&definition, &current, &state.data) {
            Ok(Resolved::Step(next)) => next,
            Ok(Resolved::Rejected(errors)) => return Err(self.reject(current, errors)),
            Err(e) => {
                error!("flow {} ({}): branching from '{}' failed: {e}", self.flow_id, definition.id(), current);
                return Err(e);
            }
        };
        if let Some(state) = self.state.as_mut() {
            state.history.push(current.clone());
            state.current_step_id = next.clone();
            state.errors.clear();
        }
        debug!("flow {} advanced '{}' -> '{}'", self.flow_id, current, next);
        self.record(FlowEventKind::StepAdvanced { from: current, to: next.clone() });
        Ok(next)
    }

    /// Vuelve al último paso del historial. Los datos se conservan.
    pub fn retreat(&mut self) -> Result<String, FlowEngineError> {
        self.ensure_active()?;
        let Some(state) = self.state.as_mut() else {
            return Err(self.violation(InvalidTransition::NotStarted));
        };
        let Some(previous) = state.history.pop() else {
            debug!("flow {}: retreat at first step '{}'", self.flow_id, state.current_step_id);
            return Err(InvalidTransition::AtFirstStep { step_id: state.current_step_id.clone() }.into());
        };
        let from = std::mem::replace(&mut state.current_step_id, previous.clone());
        state.errors.clear();
        self.record(FlowEventKind::StepRetreated { from, to: previous.clone() });
        Ok(previous)
    }

    /// Vuelve a un paso ya visitado (enlaces "editar" del resumen). El
    /// historial se trunca en ese punto; no se permiten saltos hacia delante.
    pub fn jump(&mut self, step_id: &str) -> Result<String, FlowEngineError> {
        self.ensure_active()?;
        if !self.definition.contains(step_id) {
            error!("flow {}: jump to unknown step '{step_id}'", self.flow_id);
            return Err(FlowEngineError::UnknownStep(step_id.to_string()));
        }
        let Some(state) = self.state.as_mut() else {
            return Err(self.violation(InvalidTransition::NotStarted));
        };
        if state.current_step_id == step_id {
            return Ok(step_id.to_string());
        }
        let Some(pos) = state.history.iter().rposition(|s| s == step_id) else {
            return Err(self.violation(InvalidTransition::NotVisited { step_id: step_id.to_string() }));
        };
        state.history.truncate(pos);
        let from = std::mem::replace(&mut state.current_step_id, step_id.to_string());
        state.errors.clear();
        self.record(FlowEventKind::StepJumped { from, to: step_id.to_string() });
        Ok(step_id.to_string())
    }

    /// Descarta datos, errores e historial y vuelve al primer paso.
    pub fn reset(&mut self) -> Result<(), FlowEngineError> {
        self.ensure_active()?;
        let first = self.definition.first_step_id().to_string();
        let from = self.state
                       .replace(FlowState::new(first))
                       .map(|s| s.current_step_id)
                       .unwrap_or_default();
        self.record(FlowEventKind::FlowReset { from });
        Ok(())
    }

    /// Entrega el snapshot de `data` al sink. Sólo válido en el paso terminal
    /// y con su validación en verde. En caso de éxito el flujo queda
    /// `Submitted` y el estado se descarta.
    pub fn submit<S>(&mut self, sink: &mut S) -> Result<S::Receipt, FlowEngineError>
        where S: SubmissionSink + ?Sized
    {
        let definition = Arc::clone(&self.definition);
        let state = self.active_state()?;
        let current = state.current_step_id.clone();
        if !definition.is_terminal(&current) {
            return Err(self.violation(InvalidTransition::NotAtTerminalStep { current }));
        }
        let step = self.lookup(&current)?;
        let errors = scoped(step, step.validate(&state.data));
        if !errors.is_empty() {
            return Err(self.reject_submit(current, errors));
        }
        let snapshot = FlowSnapshot::new(self.flow_id, &definition, state.data.clone());
        match sink.accept(&snapshot) {
            Ok(receipt) => {
                debug!("flow {} ({}) submitted, fingerprint={}", self.flow_id, definition.id(), snapshot.fingerprint);
                self.record(FlowEventKind::FlowSubmitted { fingerprint: snapshot.fingerprint });
                self.phase = FlowPhase::Submitted;
                self.state = None;
                Ok(receipt)
            }
            Err(e) => {
                warn!("flow {} ({}): sink rejected submission: {e}", self.flow_id, definition.id());
                self.record(FlowEventKind::SubmitRejected { step_id: current,
                                                            reason: e.to_string() });
                Err(e.into())
            }
        }
    }

    fn ensure_active(&self) -> Result<(), FlowEngineError> {
        self.active_state().map(|_| ())
    }

    fn active_state(&self) -> Result<&FlowState, FlowEngineError> {
        match (self.phase, self.state.as_ref()) {
            (FlowPhase::Active, Some(state)) => Ok(state),
            (FlowPhase::Submitted, _) => Err(self.violation(InvalidTransition::AlreadySubmitted)),
            _ => Err(self.violation(InvalidTransition::NotStarted)),
        }
    }

    fn lookup(&self, step_id: &str) -> Result<&dyn StepDefinition, FlowEngineError> {
        self.definition.step(step_id).ok_or_else(|| {
                                         error!("flow {}: current step '{step_id}' not in definition '{}'",
                                                self.flow_id,
                                                self.definition.id());
                                         FlowEngineError::UnknownStep(step_id.to_string())
                                     })
    }

    /// Registra la violación de invariante y la convierte en error.
    fn violation(&self, kind: InvalidTransition) -> FlowEngineError {
        error!("flow {} ({}): invalid transition: {kind}", self.flow_id, self.definition.id());
        FlowEngineError::InvalidTransition(kind)
    }

    /// Publica errores de validación en el estado (acotados al paso) y
    /// construye el error devuelto al llamador.
    fn reject(&mut self, step_id: String, errors: FieldErrors) -> FlowEngineError {
        let fields = self.mark_invalid(&step_id, &errors);
        self.record(FlowEventKind::AdvanceRejected { step_id: step_id.clone(), fields });
        FlowEngineError::Validation { step_id, errors }
    }

    /// Validación fallida en el paso terminal al hacer submit: el sink no se invoca.
    fn reject_submit(&mut self, step_id: String, errors: FieldErrors) -> FlowEngineError {
        let fields = self.mark_invalid(&step_id, &errors);
        self.record(FlowEventKind::SubmitRejected { step_id: step_id.clone(),
                                                    reason: format!("invalid fields: {}", fields.join(", ")) });
        FlowEngineError::Validation { step_id, errors }
    }

    /// Publica los errores en el estado y devuelve los campos afectados.
    fn mark_invalid(&mut self, step_id: &str, errors: &FieldErrors) -> Vec<String> {
        let scoped_errors = match self.definition.step(step_id) {
            Some(step) => scoped(step, errors.clone()),
            None => FieldErrors::new(),
        };
        let fields: Vec<String> = errors.keys().cloned().collect();
        warn!("flow {}: step '{}' rejected, fields={:?}", self.flow_id, step_id, fields);
        if let Some(state) = self.state.as_mut() {
            state.errors = scoped_errors;
        }
        fields
    }

    fn record(&mut self, kind: FlowEventKind) {
        self.event_store.append_kind(self.flow_id, kind);
    }
}

/// Descarta errores de campos que el paso no declara.
fn scoped(step: &dyn StepDefinition, errors: FieldErrors) -> FieldErrors {
    let declared = step.fields();
    errors.into_iter().filter(|(k, _)| declared.contains(&k.as_str())).collect()
}
