//! Configuración central de la aplicación.
//! Carga variables de entorno (.env) y expone una estructura inmutable (`CONFIG`).
use std::env;

use once_cell::sync::Lazy;
use portal_store::{init_dotenv, StoreConfig};

pub const DEFAULT_LOG_FILTER: &str = "info";

/// Configuración global de la aplicación.
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// Filtro de logging (`PORTAL_LOG`, sintaxis de `EnvFilter`).
    pub log_filter: String,
    /// Parámetros del almacenamiento en memoria.
    pub store: StoreConfig,
}

impl AppConfig {
    pub fn from_env() -> Self {
        init_dotenv();
        let log_filter = env::var("PORTAL_LOG").ok()
                                               .filter(|v| !v.trim().is_empty())
                                               .unwrap_or_else(|| DEFAULT_LOG_FILTER.to_string());
        Self { log_filter,
               store: StoreConfig::from_env() }
    }
}

/// Instancia global perezosa de configuración, evaluada una sola vez.
pub static CONFIG: Lazy<AppConfig> = Lazy::new(AppConfig::from_env);
