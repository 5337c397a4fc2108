//! Referencias visibles por el cliente: `<PREFIJO>-<número con ceros>`.
use std::collections::HashMap;

use portal_domain::Record;

use crate::config::DEFAULT_REFERENCE_WIDTH;

/// Contador independiente por prefijo, empezando en 1.
#[derive(Debug, Clone)]
pub struct ReferenceGenerator {
    width: usize,
    counters: HashMap<&'static str, u64>,
}

impl ReferenceGenerator {
    pub fn new(width: usize) -> Self {
        Self { width: width.max(1),
               counters: HashMap::new() }
    }

    pub fn next<T: Record>(&mut self) -> String {
        self.next_for(T::REFERENCE_PREFIX)
    }

    pub fn next_for(&mut self, prefix: &'static str) -> String {
        let n = self.counters.entry(prefix).or_insert(0);
        *n += 1;
        format!("{prefix}-{:0width$}", n, width = self.width)
    }

    /// Último número emitido para `prefix` (0 si ninguno).
    pub fn issued(&self, prefix: &str) -> u64 {
        self.counters.get(prefix).copied().unwrap_or(0)
    }
}

impl Default for ReferenceGenerator {
    fn default() -> Self {
        Self::new(DEFAULT_REFERENCE_WIDTH)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use portal_domain::{Order, Ticket};

    #[test]
    fn counters_are_per_prefix() {
        let mut refs = ReferenceGenerator::default();
        assert_eq!(refs.next::<Ticket>(), "TKT-000001");
        assert_eq!(refs.next::<Ticket>(), "TKT-000002");
        assert_eq!(refs.next::<Order>(), "ORD-000001");
        assert_eq!(refs.issued("TKT"), 2);
        assert_eq!(refs.issued("PAY"), 0);
    }

    #[test]
    fn width_pads_but_never_truncates() {
        let mut refs = ReferenceGenerator::new(2);
        for _ in 0..99 {
            refs.next_for("REQ");
        }
        assert_eq!(refs.next_for("REQ"), "REQ-100");
    }
}
