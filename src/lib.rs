//! portalflow
//!
//! Flujos guiados del portal de autogestión: compone el motor
//! (`portal_core`), las definiciones y payloads del dominio (`portal_domain`)
//! y los repositorios en memoria (`portal_store`).
//!
//! Puede usarse desde `main.rs` o por otros crates/clientes.

pub mod config;
pub mod portal;

pub use config::{AppConfig, CONFIG};
pub use portal::{Portal, PortalError};
