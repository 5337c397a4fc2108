//! portal-core: motor genérico de flujos guiados (wizards) multi-paso.
//!
//! Un flujo se describe una vez (`FlowDefinition`: pasos, reglas, branching)
//! y cada diálogo abierto conduce su propia instancia (`FlowEngine`) hasta
//! entregar los datos validados a un `SubmissionSink`.
pub mod constants;
pub mod definition;
pub mod engine;
pub mod errors;
pub mod event;
pub mod hashing;
pub mod model;
pub mod sink;
pub mod step;

pub use definition::{Branching, FlowDefinition, FlowDefinitionBuilder, Next};
pub use engine::{EngineBuilder, FlowAction, FlowCtx, FlowEngine};
pub use errors::{DefinitionError, FlowEngineError, InvalidTransition, SinkError};
pub use event::{EventStore, FlowEvent, FlowEventKind, InMemoryEventStore};
pub use model::{FieldErrors, FlowData, FlowPhase, FlowSnapshot, FlowState};
pub use sink::{FnSink, SubmissionSink};
pub use step::{FieldRule, FormStep, StepDefinition, StepKind};
