//! Definiciones relacionadas a Steps.
//!
//! Un Step es una pantalla del wizard: declara los campos que recoge y cómo
//! validarlos. Este módulo define:
//! - `StepDefinition`: interfaz neutral usada por el engine.
//! - `FieldRule`: reglas declarativas por campo (presencia, longitud, rango...).
//! - `FormStep`: implementación declarativa basada en reglas.

pub mod definition;
pub mod form;
pub mod rules;

pub use definition::{StepDefinition, StepKind};
pub use form::FormStep;
pub use rules::FieldRule;
