//! Catálogo mock (planes, productos, facturas abiertas).
//!
//! Se siembra una sola vez de forma perezosa y es de sólo lectura: no hay
//! backend, los datos se pierden al reiniciar.
use chrono::NaiveDate;
use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Plan {
    pub id: String,
    pub name: String,
    pub monthly_price: f64,
    pub download_mbps: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Product {
    pub id: String,
    pub name: String,
    pub price: f64,
    pub max_quantity: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Invoice {
    pub id: String,
    pub amount_due: f64,
    pub due_date: NaiveDate,
}

fn plan(id: &str, name: &str, monthly_price: f64, download_mbps: u32) -> Plan {
    Plan { id: id.into(),
           name: name.into(),
           monthly_price,
           download_mbps }
}

fn product(id: &str, name: &str, price: f64, max_quantity: u32) -> Product {
    Product { id: id.into(),
              name: name.into(),
              price,
              max_quantity }
}

fn invoice(id: &str, amount_due: f64, (y, m, d): (i32, u32, u32)) -> Option<Invoice> {
    Some(Invoice { id: id.into(),
                   amount_due,
                   due_date: NaiveDate::from_ymd_opt(y, m, d)? })
}

static PLANS: Lazy<Vec<Plan>> = Lazy::new(|| {
    vec![plan("fiber-100", "Fibra 100", 29.90, 100),
         plan("fiber-300", "Fibra 300", 39.90, 300),
         plan("fiber-600", "Fibra 600", 49.90, 600),
         plan("fiber-1000", "Fibra 1 Giga", 69.90, 1000)]
});

static PRODUCTS: Lazy<Vec<Product>> = Lazy::new(|| {
    vec![product("router-wifi6", "Router WiFi 6", 89.00, 2),
         product("mesh-node", "Nodo Mesh", 59.00, 4),
         product("tv-box", "Decodificador 4K", 49.00, 3),
         product("sim-card", "SIM adicional", 5.00, 5)]
});

static OPEN_INVOICES: Lazy<Vec<Invoice>> = Lazy::new(|| {
    [invoice("INV-2026-09", 49.90, (2026, 9, 30)),
     invoice("INV-2026-10", 52.40, (2026, 10, 31))].into_iter()
                                                   .flatten()
                                                   .collect()
});

pub fn plans() -> &'static [Plan] {
    &PLANS
}

pub fn products() -> &'static [Product] {
    &PRODUCTS
}

pub fn open_invoices() -> &'static [Invoice] {
    &OPEN_INVOICES
}

pub fn find_plan(id: &str) -> Option<&'static Plan> {
    PLANS.iter().find(|p| p.id == id)
}

pub fn find_product(id: &str) -> Option<&'static Product> {
    PRODUCTS.iter().find(|p| p.id == id)
}

pub fn find_invoice(id: &str) -> Option<&'static Invoice> {
    OPEN_INVOICES.iter().find(|i| i.id == id)
}

/// Igualdad de importes al céntimo.
pub fn same_amount(a: f64, b: f64) -> bool {
    (a - b).abs() < 0.005
}
