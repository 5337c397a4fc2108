//! `PortalStore`: repositorios del portal, generador de referencias y
//! registro de los flujos ya aceptados.
use std::collections::HashMap;

use chrono::{DateTime, Utc};
use log::{info, warn};
use portal_core::FlowSnapshot;
use portal_domain::catalog::find_product;
use portal_domain::records::RequestDetails;
use portal_domain::{DomainError, FlowKind, FlowPayload, Order, Payment, Record, ServiceRequest, Ticket};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::config::StoreConfig;
use crate::error::StoreError;
use crate::reference::ReferenceGenerator;
use crate::repository::{InMemoryRepository, Repository};
use crate::seed;

/// Acuse de una submission aceptada.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Submission {
    pub kind: FlowKind,
    pub reference: String,
    pub record_id: Uuid,
    pub accepted_at: DateTime<Utc>,
}

pub struct PortalStore {
    pub tickets: Box<dyn Repository<Ticket>>,
    pub orders: Box<dyn Repository<Order>>,
    pub requests: Box<dyn Repository<ServiceRequest>>,
    pub payments: Box<dyn Repository<Payment>>,
    references: ReferenceGenerator,
    // flow_id -> referencia emitida
    accepted: HashMap<Uuid, String>,
}

impl PortalStore {
    /// Store en memoria según la configuración (siembra opcional).
    pub fn new(config: &StoreConfig) -> Self {
        let mut store = Self::with_repositories(Box::new(InMemoryRepository::new()),
                                                Box::new(InMemoryRepository::new()),
                                                Box::new(InMemoryRepository::new()),
                                                Box::new(InMemoryRepository::new()),
                                                ReferenceGenerator::new(config.reference_width));
        if config.seed_mock_data {
            seed::seed(&mut store);
        }
        store
    }

    pub fn with_repositories(tickets: Box<dyn Repository<Ticket>>,
                             orders: Box<dyn Repository<Order>>,
                             requests: Box<dyn Repository<ServiceRequest>>,
                             payments: Box<dyn Repository<Payment>>,
                             references: ReferenceGenerator)
                             -> Self {
        Self { tickets,
               orders,
               requests,
               payments,
               references,
               accepted: HashMap::new() }
    }

    pub fn references(&mut self) -> &mut ReferenceGenerator {
        &mut self.references
    }

    /// Referencia ya emitida para una instancia de flujo, si existe.
    pub fn accepted_reference(&self, flow_id: Uuid) -> Option<&str> {
        self.accepted.get(&flow_id).map(String::as_str)
    }

    /// Convierte el snapshot en un registro y lo guarda en su repositorio.
    ///
    /// Errores:
    /// - `Duplicate` si esa misma instancia (`flow_id`) ya fue aceptada. Dos
    ///   flujos distintos con los mismos datos generan dos registros.
    /// - `Domain` si el payload no supera la validación de dominio.
    pub fn record(&mut self, kind: FlowKind, snapshot: &FlowSnapshot) -> Result<Submission, StoreError> {
        if let Some(previous) = self.accepted.get(&snapshot.flow_id) {
            warn!("flow {} ({kind}): duplicate submission of {previous}", snapshot.flow_id);
            return Err(StoreError::Duplicate(previous.clone()));
        }
        let (reference, record_id) = match FlowPayload::from_snapshot(kind, snapshot)? {
            FlowPayload::Ticket(payload) => {
                let ticket = Ticket::open(self.references.next::<Ticket>(), payload);
                store_record(self.tickets.as_mut(), ticket)?
            }
            FlowPayload::Order(payload) => {
                let product = find_product(&payload.product).ok_or_else(|| {
                                  DomainError::ValidationError(format!("unknown product '{}'", payload.product))
                              })?;
                let order = Order::place(self.references.next::<Order>(), product, payload);
                store_record(self.orders.as_mut(), order)?
            }
            FlowPayload::PlanChange(payload) => self.request(RequestDetails::PlanChange(payload))?,
            FlowPayload::Relocation(payload) => self.request(RequestDetails::Relocation(payload))?,
            FlowPayload::Deactivation(payload) => self.request(RequestDetails::Deactivation(payload))?,
            FlowPayload::Payment(payload) => {
                let payment = Payment::authorize(self.references.next::<Payment>(), payload);
                store_record(self.payments.as_mut(), payment)?
            }
        };
        self.accepted.insert(snapshot.flow_id, reference.clone());
        info!("flow {} ({kind}) stored as {reference}", snapshot.flow_id);
        Ok(Submission { kind,
                        reference,
                        record_id,
                        accepted_at: Utc::now() })
    }

    fn request(&mut self, details: RequestDetails) -> Result<(String, Uuid), StoreError> {
        let request = ServiceRequest::new(self.references.next::<ServiceRequest>(), details);
        store_record(self.requests.as_mut(), request)
    }
}

fn store_record<T: Record>(repo: &mut dyn Repository<T>, record: T) -> Result<(String, Uuid), StoreError> {
    let key = (record.reference().to_string(), record.id());
    repo.add(record)?;
    Ok(key)
}
