//! Carga de configuración del almacenamiento desde variables de entorno.
//! Variables: `PORTAL_SEED_MOCK_DATA` y `PORTAL_REFERENCE_WIDTH`.

use std::env;

use dotenvy::dotenv;
use once_cell::sync::Lazy;

pub const DEFAULT_REFERENCE_WIDTH: usize = 6;

// Carga perezosa del archivo .env una sola vez.
static DOTENV_LOADED: Lazy<()> = Lazy::new(|| {
    let _ = dotenv(); // ignora error si no existe .env
});

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreConfig {
    /// Sembrar registros mock al crear el store.
    pub seed_mock_data: bool,
    /// Dígitos de la parte numérica de las referencias.
    pub reference_width: usize,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self { seed_mock_data: true,
               reference_width: DEFAULT_REFERENCE_WIDTH }
    }
}

impl StoreConfig {
    pub fn from_env() -> Self {
        Lazy::force(&DOTENV_LOADED);
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Igual que `from_env` pero con una fuente de variables arbitraria.
    pub fn from_lookup<F>(lookup: F) -> Self
        where F: Fn(&str) -> Option<String>
    {
        let defaults = Self::default();
        let seed_mock_data = lookup("PORTAL_SEED_MOCK_DATA").and_then(|v| parse_flag(&v))
                                                            .unwrap_or(defaults.seed_mock_data);
        let reference_width = lookup("PORTAL_REFERENCE_WIDTH").and_then(|v| v.trim().parse().ok())
                                                              .filter(|w| (1..=12).contains(w))
                                                              .unwrap_or(defaults.reference_width);
        Self { seed_mock_data,
               reference_width }
    }
}

fn parse_flag(raw: &str) -> Option<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

/// Forzar carga temprana de .env desde aplicaciones externas si se desea.
pub fn init_dotenv() {
    Lazy::force(&DOTENV_LOADED);
}
