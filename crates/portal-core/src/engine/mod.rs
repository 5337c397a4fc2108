//! Engine module: motor, builder y contexto de conducción.

pub mod builder;
pub mod core;
pub mod flow_ctx;

pub use builder::EngineBuilder;
pub use core::FlowEngine;
pub use flow_ctx::{FlowAction, FlowCtx};
