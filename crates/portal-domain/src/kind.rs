use std::fmt;
use std::str::FromStr;

use portal_core::FlowDefinition;
use serde::{Deserialize, Serialize};

use crate::error::DomainError;
use crate::flows;

/// Tipos de flujo guiado del portal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FlowKind {
    Ticket,
    Upgrade,
    Downgrade,
    Order,
    Relocation,
    Deactivation,
    Payment,
}

impl FlowKind {
    pub const ALL: [FlowKind; 7] = [Self::Ticket,
                                    Self::Upgrade,
                                    Self::Downgrade,
                                    Self::Order,
                                    Self::Relocation,
                                    Self::Deactivation,
                                    Self::Payment];

    /// Id estable; coincide con `FlowDefinition::id`.
    pub fn id(&self) -> &'static str {
        match self {
            Self::Ticket => "ticket",
            Self::Upgrade => "upgrade",
            Self::Downgrade => "downgrade",
            Self::Order => "order",
            Self::Relocation => "relocation",
            Self::Deactivation => "deactivation",
            Self::Payment => "payment",
        }
    }

    pub fn definition(&self) -> Result<FlowDefinition, DomainError> {
        let def = match self {
            Self::Ticket => flows::ticket_flow(),
            Self::Upgrade => flows::plan_change_flow(true),
            Self::Downgrade => flows::plan_change_flow(false),
            Self::Order => flows::order_flow(),
            Self::Relocation => flows::relocation_flow(),
            Self::Deactivation => flows::deactivation_flow(),
            Self::Payment => flows::payment_flow(),
        }?;
        Ok(def)
    }
}

impl fmt::Display for FlowKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.id())
    }
}

impl FromStr for FlowKind {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL.into_iter()
                 .find(|k| k.id() == s)
                 .ok_or_else(|| DomainError::UnknownFlowKind(s.to_string()))
    }
}
