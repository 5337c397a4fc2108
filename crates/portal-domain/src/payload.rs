//! Payloads tipados por tipo de flujo.
//!
//! El engine acumula datos como JSON genérico; en la frontera de `submit` se
//! convierten a un payload tipado y se aplican las reglas de dominio que no
//! pertenecen a un paso concreto (precios del catálogo, stock, importes).
use chrono::NaiveDate;
use log::warn;
use portal_core::FlowSnapshot;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::catalog::{find_invoice, find_plan, find_product, same_amount};
use crate::error::DomainError;
use crate::kind::FlowKind;

/// Deserializadores que aceptan números escritos como texto por el renderer.
mod lenient {
    use portal_core::step::rules::as_number;
    use serde::de::Error;
    use serde::{Deserialize, Deserializer};
    use serde_json::Value;

    pub fn number<'de, D: Deserializer<'de>>(d: D) -> Result<f64, D::Error> {
        let v = Value::deserialize(d)?;
        as_number(&v).ok_or_else(|| D::Error::custom(format!("expected a number, got {v}")))
    }

    pub fn whole_number<'de, D: Deserializer<'de>>(d: D) -> Result<u32, D::Error> {
        let n = number(d)?;
        if n.fract() == 0.0 && n >= 0.0 && n <= f64::from(u32::MAX) {
            Ok(n as u32)
        } else {
            Err(D::Error::custom(format!("expected a whole number, got {n}")))
        }
    }

    pub fn flag<'de, D: Deserializer<'de>>(d: D) -> Result<bool, D::Error> {
        match Value::deserialize(d)? {
            Value::Bool(b) => Ok(b),
            Value::String(s) if s.eq_ignore_ascii_case("true") => Ok(true),
            Value::String(s) if s.eq_ignore_ascii_case("false") || s.is_empty() => Ok(false),
            Value::Null => Ok(false),
            other => Err(D::Error::custom(format!("expected a boolean, got {other}"))),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TicketCategory {
    Internet,
    Tv,
    Phone,
    Billing,
    Other,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Priority {
    Low,
    Medium,
    High,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TicketPayload {
    pub category: TicketCategory,
    pub subject: String,
    pub description: String,
    pub priority: Priority,
}

/// Dirección del cambio de plan, derivada de los precios.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PlanChange {
    Upgrade,
    Downgrade,
    Lateral,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlanChangePayload {
    pub current_plan: String,
    #[serde(deserialize_with = "lenient::number")]
    pub current_price: f64,
    pub target_plan: String,
    #[serde(deserialize_with = "lenient::number")]
    pub target_price: f64,
}

impl PlanChangePayload {
    pub fn direction(&self) -> PlanChange {
        if same_amount(self.target_price, self.current_price) {
            PlanChange::Lateral
        } else if self.target_price > self.current_price {
            PlanChange::Upgrade
        } else {
            PlanChange::Downgrade
        }
    }

    /// Aviso de retención para bajadas de plan. Puramente presentacional: no
    /// altera el flujo ni los datos.
    pub fn retention_hint(&self) -> Option<&'static str> {
        match self.direction() {
            PlanChange::Downgrade => Some("Before downgrading, ask us about a loyalty discount on your current plan."),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderPayload {
    pub product: String,
    #[serde(deserialize_with = "lenient::whole_number")]
    pub quantity: u32,
    pub delivery_address: String,
    pub contact_phone: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RelocationPayload {
    pub new_address: String,
    pub move_date: NaiveDate,
    #[serde(default, deserialize_with = "lenient::flag")]
    pub keep_number: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeactivationPayload {
    pub reason: String,
    #[serde(default)]
    pub comments: Option<String>,
    #[serde(deserialize_with = "lenient::flag")]
    pub confirm: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentMethod {
    Card,
    BankTransfer,
    Wallet,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentPayload {
    pub invoice_id: String,
    #[serde(deserialize_with = "lenient::number")]
    pub amount: f64,
    pub method: PaymentMethod,
}

/// Payload finalizado, etiquetado por tipo de flujo.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "payload", rename_all = "snake_case")]
pub enum FlowPayload {
    Ticket(TicketPayload),
    PlanChange(PlanChangePayload),
    Order(OrderPayload),
    Relocation(RelocationPayload),
    Deactivation(DeactivationPayload),
    Payment(PaymentPayload),
}

impl FlowPayload {
    pub fn from_snapshot(kind: FlowKind, snapshot: &FlowSnapshot) -> Result<Self, DomainError> {
        Self::from_value(kind, snapshot.to_json())
    }

    /// Deserializa según `kind` y aplica las reglas de dominio.
    pub fn from_value(kind: FlowKind, value: Value) -> Result<Self, DomainError> {
        let payload = match kind {
            FlowKind::Ticket => Self::Ticket(serde_json::from_value(value)?),
            FlowKind::Upgrade | FlowKind::Downgrade => Self::PlanChange(serde_json::from_value(value)?),
            FlowKind::Order => Self::Order(serde_json::from_value(value)?),
            FlowKind::Relocation => Self::Relocation(serde_json::from_value(value)?),
            FlowKind::Deactivation => Self::Deactivation(serde_json::from_value(value)?),
            FlowKind::Payment => Self::Payment(serde_json::from_value(value)?),
        };
        if let Err(e) = payload.validate(kind) {
            warn!("payload de '{}' rechazado: {}", kind, e);
            return Err(e);
        }
        Ok(payload)
    }

    pub fn validate(&self, kind: FlowKind) -> Result<(), DomainError> {
        let invalid = |msg: String| Err(DomainError::ValidationError(msg));
        match self {
            Self::Ticket(t) => {
                if t.subject.trim().is_empty() {
                    return invalid("ticket subject is empty".into());
                }
            }
            Self::PlanChange(p) => {
                for (plan_id, price) in [(&p.current_plan, p.current_price), (&p.target_plan, p.target_price)] {
                    let Some(plan) = find_plan(plan_id) else {
                        return invalid(format!("unknown plan '{plan_id}'"));
                    };
                    if !same_amount(plan.monthly_price, price) {
                        return invalid(format!("price {price} does not match plan '{plan_id}'"));
                    }
                }
                let expected = match kind {
                    FlowKind::Downgrade => PlanChange::Downgrade,
                    _ => PlanChange::Upgrade,
                };
                if p.direction() != expected {
                    return invalid(format!("{:?} request changes plan in the wrong direction", kind));
                }
            }
            Self::Order(o) => {
                let Some(product) = find_product(&o.product) else {
                    return invalid(format!("unknown product '{}'", o.product));
                };
                if o.quantity == 0 || o.quantity > product.max_quantity {
                    return invalid(format!("quantity must be between 1 and {}", product.max_quantity));
                }
            }
            Self::Relocation(r) => {
                if r.new_address.trim().is_empty() {
                    return invalid("new address is empty".into());
                }
            }
            Self::Deactivation(d) => {
                if !d.confirm {
                    return invalid("deactivation must be confirmed".into());
                }
            }
            Self::Payment(p) => {
                let Some(invoice) = find_invoice(&p.invoice_id) else {
                    return invalid(format!("unknown invoice '{}'", p.invoice_id));
                };
                if p.amount <= 0.0 || p.amount > invoice.amount_due + 0.005 {
                    return invalid(format!("amount must be between 0 and {:.2}", invoice.amount_due));
                }
            }
        }
        Ok(())
    }

    pub fn kind_name(&self) -> &'static str {
        match self {
            Self::Ticket(_) => "ticket",
            Self::PlanChange(_) => "plan_change",
            Self::Order(_) => "order",
            Self::Relocation(_) => "relocation",
            Self::Deactivation(_) => "deactivation",
            Self::Payment(_) => "payment",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn plan_change_accepts_prices_as_text() {
        let payload = FlowPayload::from_value(FlowKind::Upgrade,
                                              json!({"currentPlan": "fiber-100", "currentPrice": "29.90",
                                                     "targetPlan": "fiber-300", "targetPrice": 39.9}))
                      .unwrap();
        match payload {
            FlowPayload::PlanChange(p) => {
                assert_eq!(p.direction(), PlanChange::Upgrade);
                assert!(p.retention_hint().is_none());
            }
            other => panic!("unexpected payload {other:?}"),
        }
    }

    #[test]
    fn downgrade_exposes_retention_hint_only() {
        let value = json!({"currentPlan": "fiber-600", "currentPrice": 49.90,
                           "targetPlan": "fiber-300", "targetPrice": 39.90});
        let FlowPayload::PlanChange(p) = FlowPayload::from_value(FlowKind::Downgrade, value.clone()).unwrap() else {
            panic!("expected plan change");
        };
        assert_eq!(p.direction(), PlanChange::Downgrade);
        assert!(p.retention_hint().is_some());
        assert!(matches!(FlowPayload::from_value(FlowKind::Upgrade, value), Err(DomainError::ValidationError(_))));
    }

    #[test]
    fn price_must_match_catalog() {
        let err = FlowPayload::from_value(FlowKind::Upgrade,
                                          json!({"currentPlan": "fiber-100", "currentPrice": 29.90,
                                                 "targetPlan": "fiber-300", "targetPrice": 1.0}))
                  .unwrap_err();
        assert!(err.to_string().contains("does not match"));
    }

    #[test]
    fn unknown_category_is_a_serialization_error() {
        let err = FlowPayload::from_value(FlowKind::Ticket,
                                          json!({"category": "gas", "subject": "x", "description": "y", "priority": "low"}))
                  .unwrap_err();
        assert!(matches!(err, DomainError::SerializationError(_)));
    }

    #[test]
    fn tagged_serialization() {
        let p = FlowPayload::Deactivation(DeactivationPayload { reason: "price".into(),
                                                                comments: None,
                                                                confirm: true });
        let v = serde_json::to_value(&p).unwrap();
        assert_eq!(v["kind"], json!("deactivation"));
        assert_eq!(v["payload"]["reason"], json!("price"));
    }
}
