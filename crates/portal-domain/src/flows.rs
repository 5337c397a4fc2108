//! Definiciones de los flujos guiados del portal.
//!
//! Cada página del portal aporta únicamente sus pasos, reglas y (si aplica)
//! branching; la navegación y validación las resuelve `portal_core`.
use chrono::NaiveDate;
use portal_core::step::rules::as_number;
use portal_core::{DefinitionError, FieldRule, FlowData, FlowDefinition, FormStep, Next, StepKind};

use crate::catalog::{find_invoice, find_plan, find_product, open_invoices, plans, products, same_amount};

/// Nombres de campo compartidos con el renderer.
pub mod fields {
    pub const CATEGORY: &str = "category";
    pub const SUBJECT: &str = "subject";
    pub const DESCRIPTION: &str = "description";
    pub const PRIORITY: &str = "priority";

    pub const CURRENT_PLAN: &str = "currentPlan";
    pub const CURRENT_PRICE: &str = "currentPrice";
    pub const TARGET_PLAN: &str = "targetPlan";
    pub const TARGET_PRICE: &str = "targetPrice";

    pub const PRODUCT: &str = "product";
    pub const QUANTITY: &str = "quantity";
    pub const DELIVERY_ADDRESS: &str = "deliveryAddress";
    pub const CONTACT_PHONE: &str = "contactPhone";

    pub const NEW_ADDRESS: &str = "newAddress";
    pub const MOVE_DATE: &str = "moveDate";
    pub const KEEP_NUMBER: &str = "keepNumber";

    pub const REASON: &str = "reason";
    pub const COMMENTS: &str = "comments";
    pub const CONFIRM: &str = "confirm";

    pub const INVOICE_ID: &str = "invoiceId";
    pub const AMOUNT: &str = "amount";
    pub const METHOD: &str = "method";
}

/// Ids de paso.
pub mod steps {
    pub const DETAILS: &str = "details";
    pub const REVIEW: &str = "review";
    pub const SELECT_CURRENT: &str = "selectCurrent";
    pub const SELECT_TARGET: &str = "selectTarget";
    pub const PRODUCT: &str = "product";
    pub const DELIVERY: &str = "delivery";
    pub const ADDRESS: &str = "address";
    pub const SCHEDULE: &str = "schedule";
    pub const REASON: &str = "reason";
    pub const CONFIRM: &str = "confirm";
    pub const INVOICE: &str = "invoice";
    pub const METHOD: &str = "method";
}

pub const TICKET_CATEGORIES: [&str; 5] = ["internet", "tv", "phone", "billing", "other"];
pub const PRIORITIES: [&str; 3] = ["low", "medium", "high"];
pub const DEACTIVATION_REASONS: [&str; 4] = ["moving_abroad", "price", "service_quality", "other"];
pub const PAYMENT_METHODS: [&str; 3] = ["card", "bank_transfer", "wallet"];

pub const SUBJECT_MAX: usize = 100;
pub const DESCRIPTION_MAX: usize = 1000;
pub const ADDRESS_MAX: usize = 200;
pub const COMMENTS_MAX: usize = 500;

pub const MSG_TARGET_ABOVE: &str = "target must exceed current price";
pub const MSG_TARGET_BELOW: &str = "target must be below current price";
pub const MSG_WHOLE_NUMBER: &str = "must be a whole number";

fn number(data: &FlowData, field: &str) -> Option<f64> {
    data.get(field).and_then(as_number)
}

fn text<'a>(data: &'a FlowData, field: &str) -> Option<&'a str> {
    data.get(field).and_then(|v| v.as_str())
}

/// El precio debe coincidir con la tarifa del plan elegido en `plan_field`.
fn catalog_price(data: &FlowData, plan_field: &str, price_field: &str) -> Option<String> {
    let plan = find_plan(text(data, plan_field)?)?;
    let price = number(data, price_field)?;
    (!same_amount(plan.monthly_price, price)).then(|| format!("{} costs {:.2}", plan.id, plan.monthly_price))
}

/// Alta de ticket de soporte: detalles -> resumen.
pub fn ticket_flow() -> Result<FlowDefinition, DefinitionError> {
    let details = FormStep::new(steps::DETAILS).named("Describe the problem")
                                               .field(fields::CATEGORY, [FieldRule::Required, FieldRule::one_of(TICKET_CATEGORIES)])
                                               .field(fields::SUBJECT, [FieldRule::Required, FieldRule::MaxLength(SUBJECT_MAX)])
                                               .field(fields::DESCRIPTION,
                                                      [FieldRule::Required, FieldRule::MaxLength(DESCRIPTION_MAX)])
                                               .field(fields::PRIORITY, [FieldRule::Required, FieldRule::one_of(PRIORITIES)]);
    FlowDefinition::builder("ticket").step(details)
                                     .step(FormStep::review(steps::REVIEW))
                                     .build()
}

/// Cambio de plan (subida si `upgrade`, bajada en caso contrario):
/// plan actual -> plan destino -> resumen. El branching desde el plan destino
/// exige que el precio vaya en la dirección del flujo.
pub fn plan_change_flow(upgrade: bool) -> Result<FlowDefinition, DefinitionError> {
    let plan_ids: Vec<String> = plans().iter().map(|p| p.id.clone()).collect();
    let select_current = FormStep::new(steps::SELECT_CURRENT).named("Current plan")
                                                             .field(fields::CURRENT_PLAN,
                                                                    [FieldRule::Required, FieldRule::OneOf(plan_ids.clone())])
                                                             .field(fields::CURRENT_PRICE,
                                                                    [FieldRule::Required, FieldRule::Numeric])
                                                             .check(fields::CURRENT_PRICE, |data| {
                                                                 catalog_price(data, fields::CURRENT_PLAN, fields::CURRENT_PRICE)
                                                             });
    let select_target = FormStep::new(steps::SELECT_TARGET).named("New plan")
                                                           .field(fields::TARGET_PLAN,
                                                                  [FieldRule::Required, FieldRule::OneOf(plan_ids)])
                                                           .field(fields::TARGET_PRICE, [FieldRule::Required, FieldRule::Numeric])
                                                           .check(fields::TARGET_PRICE, |data| {
                                                               catalog_price(data, fields::TARGET_PLAN, fields::TARGET_PRICE)
                                                           })
                                                           .check(fields::TARGET_PLAN, |data| {
                                                               let same = text(data, fields::TARGET_PLAN)
                                                                   == text(data, fields::CURRENT_PLAN);
                                                               same.then(|| "choose a different plan".to_string())
                                                           });
    let branching = move |current: &str, data: &FlowData| match current {
        steps::SELECT_CURRENT => Next::goto(steps::SELECT_TARGET),
        steps::SELECT_TARGET => {
            let (target, cur) = (number(data, fields::TARGET_PRICE), number(data, fields::CURRENT_PRICE));
            match (target, cur) {
                (Some(t), Some(c)) if upgrade && t > c => Next::goto(steps::REVIEW),
                (Some(t), Some(c)) if !upgrade && t < c => Next::goto(steps::REVIEW),
                _ if upgrade => Next::reject(fields::TARGET_PRICE, MSG_TARGET_ABOVE),
                _ => Next::reject(fields::TARGET_PRICE, MSG_TARGET_BELOW),
            }
        }
        _ => Next::Default,
    };
    FlowDefinition::builder(if upgrade { "upgrade" } else { "downgrade" }).step(select_current)
                                                                          .step(select_target)
                                                                          .step(FormStep::review(steps::REVIEW))
                                                                          .branching(branching)
                                                                          .build()
}

/// Pedido de equipamiento: producto -> entrega -> resumen.
pub fn order_flow() -> Result<FlowDefinition, DefinitionError> {
    let product_ids: Vec<String> = products().iter().map(|p| p.id.clone()).collect();
    let product = FormStep::new(steps::PRODUCT).named("Choose equipment")
                                               .field(fields::PRODUCT, [FieldRule::Required, FieldRule::OneOf(product_ids)])
                                               .field(fields::QUANTITY,
                                                      [FieldRule::Required, FieldRule::Range { min: 1.0, max: 10.0 }])
                                               .check(fields::QUANTITY, |data| {
                                                   let qty = number(data, fields::QUANTITY)?;
                                                   (qty.fract() != 0.0).then(|| MSG_WHOLE_NUMBER.to_string())
                                               })
                                               .check(fields::QUANTITY, |data| {
                                                   let product = find_product(text(data, fields::PRODUCT)?)?;
                                                   let qty = number(data, fields::QUANTITY)?;
                                                   (qty > f64::from(product.max_quantity))
                                                       .then(|| format!("at most {} per order", product.max_quantity))
                                               });
    let delivery = FormStep::new(steps::DELIVERY).named("Delivery")
                                                 .field(fields::DELIVERY_ADDRESS,
                                                        [FieldRule::Required, FieldRule::MaxLength(ADDRESS_MAX)])
                                                 .field(fields::CONTACT_PHONE,
                                                        [FieldRule::Required, FieldRule::MinLength(7), FieldRule::MaxLength(20)]);
    FlowDefinition::builder("order").step(product)
                                    .step(delivery)
                                    .step(FormStep::review(steps::REVIEW))
                                    .build()
}

/// Traslado de servicio: nueva dirección -> fecha -> resumen.
pub fn relocation_flow() -> Result<FlowDefinition, DefinitionError> {
    let address = FormStep::new(steps::ADDRESS).named("New address")
                                               .field(fields::NEW_ADDRESS,
                                                      [FieldRule::Required, FieldRule::MinLength(5), FieldRule::MaxLength(ADDRESS_MAX)]);
    let schedule = FormStep::new(steps::SCHEDULE).named("Moving date")
                                                 .field(fields::MOVE_DATE, [FieldRule::Required])
                                                 .field(fields::KEEP_NUMBER, Vec::<FieldRule>::new())
                                                 .check(fields::MOVE_DATE, |data| {
                                                     let raw = text(data, fields::MOVE_DATE)?;
                                                     NaiveDate::parse_from_str(raw, "%Y-%m-%d")
                                                         .err()
                                                         .map(|_| "must be a date (YYYY-MM-DD)".to_string())
                                                 });
    FlowDefinition::builder("relocation").step(address)
                                         .step(schedule)
                                         .step(FormStep::review(steps::REVIEW))
                                         .build()
}

/// Baja del servicio: motivo -> confirmación explícita (terminal).
pub fn deactivation_flow() -> Result<FlowDefinition, DefinitionError> {
    let reason = FormStep::new(steps::REASON).named("Why are you leaving?")
                                             .field(fields::REASON, [FieldRule::Required, FieldRule::one_of(DEACTIVATION_REASONS)])
                                             .field(fields::COMMENTS, [FieldRule::MaxLength(COMMENTS_MAX)]);
    let confirm = FormStep::new(steps::CONFIRM).named("Confirm deactivation")
                                               .with_kind(StepKind::Confirm)
                                               .field(fields::CONFIRM, [FieldRule::Required])
                                               .check(fields::CONFIRM, |data| {
                                                   let accepted = matches!(data.get(fields::CONFIRM), Some(serde_json::Value::Bool(true)));
                                                   (!accepted).then(|| "please confirm the deactivation".to_string())
                                               });
    FlowDefinition::builder("deactivation").step(reason).step(confirm).build()
}

/// Pago de factura: factura e importe -> método -> resumen.
pub fn payment_flow() -> Result<FlowDefinition, DefinitionError> {
    let invoice_ids: Vec<String> = open_invoices().iter().map(|i| i.id.clone()).collect();
    let invoice = FormStep::new(steps::INVOICE).named("Invoice")
                                               .field(fields::INVOICE_ID, [FieldRule::Required, FieldRule::OneOf(invoice_ids)])
                                               .field(fields::AMOUNT,
                                                      [FieldRule::Required, FieldRule::Range { min: 0.01, max: 10_000.0 }])
                                               .check(fields::AMOUNT, |data| {
                                                   let invoice = find_invoice(text(data, fields::INVOICE_ID)?)?;
                                                   let amount = number(data, fields::AMOUNT)?;
                                                   (amount > invoice.amount_due + 0.005)
                                                       .then(|| format!("cannot exceed amount due ({:.2})", invoice.amount_due))
                                               });
    let method = FormStep::new(steps::METHOD).named("Payment method")
                                             .field(fields::METHOD, [FieldRule::Required, FieldRule::one_of(PAYMENT_METHODS)]);
    FlowDefinition::builder("payment").step(invoice)
                                      .step(method)
                                      .step(FormStep::review(steps::REVIEW))
                                      .build()
}

