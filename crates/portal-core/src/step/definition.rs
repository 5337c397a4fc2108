use serde::{Deserialize, Serialize};

use crate::model::{FieldErrors, FlowData};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum StepKind {
    /// Recoge datos del usuario.
    Form,
    /// Resumen previo al envío (normalmente sin campos).
    Review,
    /// Confirmación explícita (checkbox, "escriba CONFIRMAR"...).
    Confirm,
}

/// Trait que define un Step. `validate` debe ser pura respecto a `data`.
pub trait StepDefinition: Send + Sync {
    /// Identificador estable y único dentro del Flow.
    fn id(&self) -> &str;

    /// Nombre opcional amigable.
    fn name(&self) -> &str {
        self.id()
    }

    /// Campos que recoge este paso.
    fn fields(&self) -> Vec<&str>;

    /// Valida los datos acumulados; devuelve mapa vacío si el paso es válido.
    fn validate(&self, data: &FlowData) -> FieldErrors;

    /// Tipo general del step.
    fn kind(&self) -> StepKind;

    fn declares(&self, field: &str) -> bool {
        self.fields().iter().any(|f| *f == field)
    }
}
