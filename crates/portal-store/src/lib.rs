//! portal-store
//!
//! Almacenamiento en memoria de los registros creados por los flujos del
//! portal (tickets, pedidos, solicitudes de servicio, pagos) y el sink que
//! conecta un `FlowEngine` con esos repositorios.
//!
//! Módulos:
//! - `repository`: contrato `Repository<T>` e implementación en memoria.
//! - `reference`: generador de referencias visibles (`TKT-000001`).
//! - `store`: agrupa repositorios, referencias y deduplicación.
//! - `sink`: `PortalSink`, el `SubmissionSink` del portal.
//! - `seed`: datos mock iniciales.
//! - `config`: carga de configuración desde .env.

pub mod config;
pub mod error;
pub mod reference;
pub mod repository;
pub mod seed;
pub mod sink;
pub mod store;

pub use config::{init_dotenv, StoreConfig};
pub use error::StoreError;
pub use reference::ReferenceGenerator;
pub use repository::{InMemoryRepository, Repository};
pub use sink::PortalSink;
pub use store::{PortalStore, Submission};
