//! Registros creados por las submissions (tickets, pedidos, solicitudes, pagos).
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::catalog::Product;
use crate::payload::{DeactivationPayload, OrderPayload, PaymentMethod, PaymentPayload, PlanChangePayload, Priority,
                     RelocationPayload, TicketCategory, TicketPayload};

/// Registro almacenable en un repositorio.
pub trait Record: Clone + Send + 'static {
    /// Prefijo de la referencia visible por el cliente (`TKT-000123`).
    const REFERENCE_PREFIX: &'static str;

    fn id(&self) -> Uuid;
    fn reference(&self) -> &str;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TicketStatus {
    Open,
    InProgress,
    Resolved,
    Closed,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Ticket {
    pub id: Uuid,
    pub reference: String,
    pub category: TicketCategory,
    pub subject: String,
    pub description: String,
    pub priority: Priority,
    pub status: TicketStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Ticket {
    pub fn open(reference: String, payload: TicketPayload) -> Self {
        let now = Utc::now();
        Self { id: Uuid::new_v4(),
               reference,
               category: payload.category,
               subject: payload.subject,
               description: payload.description,
               priority: payload.priority,
               status: TicketStatus::Open,
               created_at: now,
               updated_at: now }
    }

    pub fn set_status(&mut self, status: TicketStatus) {
        self.status = status;
        self.updated_at = Utc::now();
    }
}

impl Record for Ticket {
    const REFERENCE_PREFIX: &'static str = "TKT";

    fn id(&self) -> Uuid {
        self.id
    }

    fn reference(&self) -> &str {
        &self.reference
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OrderStatus {
    Placed,
    Shipped,
    Delivered,
    Cancelled,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Order {
    pub id: Uuid,
    pub reference: String,
    pub product_id: String,
    pub product_name: String,
    pub quantity: u32,
    pub unit_price: f64,
    pub total: f64,
    pub delivery_address: String,
    pub contact_phone: String,
    pub status: OrderStatus,
    pub created_at: DateTime<Utc>,
}

impl Order {
    pub fn place(reference: String, product: &Product, payload: OrderPayload) -> Self {
        let total = (product.price * f64::from(payload.quantity) * 100.0).round() / 100.0;
        Self { id: Uuid::new_v4(),
               reference,
               product_id: product.id.clone(),
               product_name: product.name.clone(),
               quantity: payload.quantity,
               unit_price: product.price,
               total,
               delivery_address: payload.delivery_address,
               contact_phone: payload.contact_phone,
               status: OrderStatus::Placed,
               created_at: Utc::now() }
    }
}

impl Record for Order {
    const REFERENCE_PREFIX: &'static str = "ORD";

    fn id(&self) -> Uuid {
        self.id
    }

    fn reference(&self) -> &str {
        &self.reference
    }
}

/// Detalle de una solicitud de servicio.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum RequestDetails {
    PlanChange(PlanChangePayload),
    Relocation(RelocationPayload),
    Deactivation(DeactivationPayload),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RequestStatus {
    Pending,
    Scheduled,
    Completed,
    Rejected,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ServiceRequest {
    pub id: Uuid,
    pub reference: String,
    pub details: RequestDetails,
    pub status: RequestStatus,
    pub created_at: DateTime<Utc>,
}

impl ServiceRequest {
    pub fn new(reference: String, details: RequestDetails) -> Self {
        let status = match details {
            RequestDetails::Relocation(_) => RequestStatus::Scheduled,
            _ => RequestStatus::Pending,
        };
        Self { id: Uuid::new_v4(),
               reference,
               details,
               status,
               created_at: Utc::now() }
    }
}

impl Record for ServiceRequest {
    const REFERENCE_PREFIX: &'static str = "REQ";

    fn id(&self) -> Uuid {
        self.id
    }

    fn reference(&self) -> &str {
        &self.reference
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentStatus {
    Authorized,
    Settled,
    Refunded,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Payment {
    pub id: Uuid,
    pub reference: String,
    pub invoice_id: String,
    pub amount: f64,
    pub method: PaymentMethod,
    pub status: PaymentStatus,
    pub created_at: DateTime<Utc>,
}

impl Payment {
    /// Pago simulado: no hay pasarela real, queda autorizado.
    pub fn authorize(reference: String, payload: PaymentPayload) -> Self {
        Self { id: Uuid::new_v4(),
               reference,
               invoice_id: payload.invoice_id,
               amount: payload.amount,
               method: payload.method,
               status: PaymentStatus::Authorized,
               created_at: Utc::now() }
    }
}

impl Record for Payment {
    const REFERENCE_PREFIX: &'static str = "PAY";

    fn id(&self) -> Uuid {
        self.id
    }

    fn reference(&self) -> &str {
        &self.reference
    }
}
