//! Definición inmutable de un flujo y resolución del siguiente paso.

pub mod branching;
pub mod types;

pub use branching::{resolve_next, Branching, Next, Resolved};
pub use types::{FlowDefinition, FlowDefinitionBuilder};
