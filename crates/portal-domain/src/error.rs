use portal_core::DefinitionError;
use thiserror::Error;

/// Error del dominio del portal.
#[derive(Debug, Error)]
pub enum DomainError {
    #[error("Error de validación: {0}")]
    ValidationError(String),

    #[error("Error de serialización: {0}")]
    SerializationError(String),

    #[error("tipo de flujo desconocido: {0}")]
    UnknownFlowKind(String),

    #[error("definición inválida: {0}")]
    Definition(#[from] DefinitionError),
}

impl From<serde_json::Error> for DomainError {
    fn from(e: serde_json::Error) -> Self {
        DomainError::SerializationError(e.to_string())
    }
}
