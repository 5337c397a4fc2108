// portal-domain library entry point
pub mod catalog;
pub mod error;
pub mod flows;
pub mod kind;
pub mod payload;
pub mod records;

pub use catalog::{Invoice, Plan, Product};
pub use error::DomainError;
pub use kind::FlowKind;
pub use payload::{FlowPayload, PlanChange, PlanChangePayload, TicketPayload};
pub use records::{Order, Payment, Record, ServiceRequest, Ticket};
