//! Errores del almacenamiento.
//! Se traducen a `SinkError` cuando ocurren dentro de una submission.

use portal_core::SinkError;
use portal_domain::DomainError;
use thiserror::Error;
use uuid::Uuid;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("not found: {0}")]
    NotFound(Uuid),
    #[error("duplicate: {0}")]
    Duplicate(String),
    #[error(transparent)]
    Domain(#[from] DomainError),
}

impl From<StoreError> for SinkError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::Duplicate(msg) => Self::Duplicate(msg),
            StoreError::Domain(e) => Self::Rejected(e.to_string()),
            StoreError::NotFound(id) => Self::Unavailable(format!("record {id} not found")),
        }
    }
}
