//! Constantes del motor de flujos guiados.
//!
//! `ENGINE_VERSION` participa en el `definition_hash`: un cambio de versión
//! del engine produce hashes distintos aunque los pasos no cambien.

/// Versión lógica del motor. Mantener estable mientras no haya cambios
/// incompatibles en la semántica de validación o navegación.
pub const ENGINE_VERSION: &str = "FE1.0";

/// Mensaje estándar de campo obligatorio sin valor.
pub const MSG_REQUIRED: &str = "required";
