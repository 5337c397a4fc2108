//! Demo del portal: crea un ticket y solicita una subida de plan,
//! mostrando un rechazo de branching antes de corregir el precio.
use portal_core::{FlowCtx, FlowEngineError};
use portal_domain::flows::{fields, steps};
use portal_domain::FlowKind;
use portalflow::{Portal, PortalError, CONFIG};
use serde_json::json;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

fn main() -> Result<(), PortalError> {
    tracing_subscriber::registry().with(tracing_subscriber::EnvFilter::try_new(&CONFIG.log_filter)
                                        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")))
                                  .with(tracing_subscriber::fmt::layer().without_time())
                                  .init();

    let mut portal = Portal::new(&CONFIG.store)?;
    info!("{} tickets already on file", portal.store().tickets.len());

    ticket_scenario(&mut portal)?;
    upgrade_scenario(&mut portal)?;
    Ok(())
}

fn ticket_scenario(portal: &mut Portal) -> Result<(), PortalError> {
    let mut engine = portal.open(FlowKind::Ticket)?;

    // "Siguiente" con el formulario vacío
    if let Err(e) = engine.advance() {
        let missing = e.field_errors().map(|m| m.len()).unwrap_or(0);
        warn!("ticket details rejected: {missing} fields need attention");
    }

    FlowCtx::new(&mut engine).fill_and_advance([(fields::CATEGORY, json!("internet")),
                                                (fields::SUBJECT, json!("Slow speed")),
                                                (fields::DESCRIPTION, json!("Speed drops every evening")),
                                                (fields::PRIORITY, json!("high"))])?;
    let submission = portal.submit(&mut engine)?;
    info!("ticket created: {}", submission.reference);
    Ok(())
}

fn upgrade_scenario(portal: &mut Portal) -> Result<(), PortalError> {
    let mut engine = portal.open(FlowKind::Upgrade)?;
    let mut ctx = FlowCtx::new(&mut engine);
    ctx.fill_and_advance([(fields::CURRENT_PLAN, json!("fiber-300")), (fields::CURRENT_PRICE, json!(39.90))])?;

    match ctx.fill_and_advance([(fields::TARGET_PLAN, json!("fiber-100")), (fields::TARGET_PRICE, json!(29.90))]) {
        Err(FlowEngineError::Validation { errors, .. }) => {
            let reason = errors.get(fields::TARGET_PRICE).cloned().unwrap_or_default();
            warn!("upgrade rejected on {}: {reason}", steps::SELECT_TARGET);
        }
        other => {
            other?;
        }
    }

    ctx.fill_and_advance([(fields::TARGET_PLAN, json!("fiber-600")), (fields::TARGET_PRICE, json!(49.90))])?;
    let submission = portal.submit(&mut engine)?;
    info!("upgrade requested: {}", submission.reference);
    Ok(())
}
