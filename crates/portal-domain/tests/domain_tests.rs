use std::str::FromStr;
use std::sync::Arc;

use chrono::NaiveDate;
use portal_core::{FlowEngine, FlowEngineError, FlowSnapshot, FnSink, InvalidTransition, SinkError, StepDefinition,
                  StepKind};
use portal_domain::catalog::{find_product, plans};
use portal_domain::flows::{fields, steps, MSG_TARGET_ABOVE, MSG_TARGET_BELOW, MSG_WHOLE_NUMBER};
use portal_domain::payload::{OrderPayload, PaymentMethod, PaymentPayload, RelocationPayload};
use portal_domain::records::{OrderStatus, PaymentStatus, RequestDetails, RequestStatus, TicketStatus};
use portal_domain::{DomainError, FlowKind, FlowPayload, Order, Payment, Record, ServiceRequest, Ticket};
use serde_json::json;

fn engine(kind: FlowKind) -> FlowEngine {
    FlowEngine::started(Arc::new(kind.definition().expect("definition")))
}

fn field_error(err: &FlowEngineError, field: &str) -> Option<String> {
    err.field_errors().and_then(|e| e.get(field).cloned())
}

#[test]
fn every_kind_builds_a_definition_with_matching_id() {
    for kind in FlowKind::ALL {
        let def = kind.definition().unwrap();
        assert_eq!(def.id(), kind.id());
        assert!(def.len() >= 2, "{kind} should have at least two steps");
        assert_eq!(FlowKind::from_str(kind.id()).unwrap(), kind);
    }
    assert!(matches!(FlowKind::from_str("billing"), Err(DomainError::UnknownFlowKind(_))));
}

#[test]
fn definition_hash_is_stable_per_kind() {
    let a = FlowKind::Order.definition().unwrap();
    let b = FlowKind::Order.definition().unwrap();
    assert_eq!(a.definition_hash(), b.definition_hash());
    assert_ne!(a.definition_hash(), FlowKind::Payment.definition().unwrap().definition_hash());
}

#[test]
fn ticket_rejects_long_subject_and_unknown_priority() {
    let mut e = engine(FlowKind::Ticket);
    e.update_fields([(fields::CATEGORY, json!("tv")),
                     (fields::SUBJECT, json!("x".repeat(101))),
                     (fields::DESCRIPTION, json!("no signal")),
                     (fields::PRIORITY, json!("urgent"))])
     .unwrap();
    let err = e.advance().unwrap_err();
    assert_eq!(field_error(&err, fields::SUBJECT).as_deref(), Some("must be at most 100 characters"));
    assert!(field_error(&err, fields::PRIORITY).unwrap().starts_with("must be one of"));
    assert_eq!(e.current_step_id(), Some(steps::DETAILS));
}

#[test]
fn upgrade_requires_more_expensive_target() {
    let mut e = engine(FlowKind::Upgrade);
    e.update_fields([(fields::CURRENT_PLAN, json!("fiber-300")), (fields::CURRENT_PRICE, json!(39.90))])
     .unwrap();
    assert_eq!(e.advance().unwrap(), steps::SELECT_TARGET);

    e.update_fields([(fields::TARGET_PLAN, json!("fiber-100")), (fields::TARGET_PRICE, json!(29.90))])
     .unwrap();
    let err = e.advance().unwrap_err();
    assert_eq!(field_error(&err, fields::TARGET_PRICE).as_deref(), Some(MSG_TARGET_ABOVE));
    assert_eq!(e.state().unwrap().error(fields::TARGET_PRICE), Some(MSG_TARGET_ABOVE));

    e.update_fields([(fields::TARGET_PLAN, json!("fiber-1000")), (fields::TARGET_PRICE, json!("69.90"))])
     .unwrap();
    assert_eq!(e.advance().unwrap(), steps::REVIEW);
}

#[test]
fn downgrade_mirrors_the_price_check() {
    let mut e = engine(FlowKind::Downgrade);
    e.update_fields([(fields::CURRENT_PLAN, json!("fiber-300")), (fields::CURRENT_PRICE, json!(39.90))])
     .unwrap();
    e.advance().unwrap();
    e.update_fields([(fields::TARGET_PLAN, json!("fiber-600")), (fields::TARGET_PRICE, json!(49.90))])
     .unwrap();
    let err = e.advance().unwrap_err();
    assert_eq!(field_error(&err, fields::TARGET_PRICE).as_deref(), Some(MSG_TARGET_BELOW));
}

#[test]
fn same_plan_is_rejected_before_branching() {
    let mut e = engine(FlowKind::Upgrade);
    e.update_fields([(fields::CURRENT_PLAN, json!("fiber-300")), (fields::CURRENT_PRICE, json!(39.90))])
     .unwrap();
    e.advance().unwrap();
    e.update_fields([(fields::TARGET_PLAN, json!("fiber-300")), (fields::TARGET_PRICE, json!(39.90))])
     .unwrap();
    let err = e.advance().unwrap_err();
    assert_eq!(field_error(&err, fields::TARGET_PLAN).as_deref(), Some("choose a different plan"));
    assert!(field_error(&err, fields::TARGET_PRICE).is_none());
}

#[test]
fn order_quantity_is_capped_per_product() {
    let mut e = engine(FlowKind::Order);
    e.update_fields([(fields::PRODUCT, json!("router-wifi6")), (fields::QUANTITY, json!(3))])
     .unwrap();
    let err = e.advance().unwrap_err();
    assert_eq!(field_error(&err, fields::QUANTITY).as_deref(), Some("at most 2 per order"));

    e.update_field(fields::QUANTITY, 11).unwrap();
    let err = e.advance().unwrap_err();
    assert_eq!(field_error(&err, fields::QUANTITY).as_deref(), Some("must be between 1 and 10"));

    e.update_field(fields::QUANTITY, "2").unwrap();
    assert_eq!(e.advance().unwrap(), steps::DELIVERY);
}

#[test]
fn order_quantity_must_be_whole_at_the_product_step() {
    let mut e = engine(FlowKind::Order);
    e.update_fields([(fields::PRODUCT, json!("tv-box")), (fields::QUANTITY, json!(1.5))])
     .unwrap();
    let err = e.advance().unwrap_err();
    assert_eq!(field_error(&err, fields::QUANTITY).as_deref(), Some(MSG_WHOLE_NUMBER));
    assert_eq!(e.state().unwrap().error(fields::QUANTITY), Some(MSG_WHOLE_NUMBER));
    assert_eq!(e.current_step_id(), Some(steps::PRODUCT));
}

#[test]
fn plan_prices_must_match_the_catalog() {
    let mut e = engine(FlowKind::Upgrade);
    e.update_fields([(fields::CURRENT_PLAN, json!("fiber-100")), (fields::CURRENT_PRICE, json!(10))])
     .unwrap();
    let err = e.advance().unwrap_err();
    assert_eq!(field_error(&err, fields::CURRENT_PRICE).as_deref(), Some("fiber-100 costs 29.90"));
    assert_eq!(e.current_step_id(), Some(steps::SELECT_CURRENT));

    e.update_field(fields::CURRENT_PRICE, "29.90").unwrap();
    assert_eq!(e.advance().unwrap(), steps::SELECT_TARGET);

    e.update_fields([(fields::TARGET_PLAN, json!("fiber-600")), (fields::TARGET_PRICE, json!(99.0))])
     .unwrap();
    let err = e.advance().unwrap_err();
    assert_eq!(field_error(&err, fields::TARGET_PRICE).as_deref(), Some("fiber-600 costs 49.90"));
}

#[test]
fn relocation_requires_iso_move_date() {
    let mut e = engine(FlowKind::Relocation);
    e.update_field(fields::NEW_ADDRESS, "Calle Mayor 1, Madrid").unwrap();
    e.advance().unwrap();
    e.update_field(fields::MOVE_DATE, "31/12/2026").unwrap();
    let err = e.advance().unwrap_err();
    assert_eq!(field_error(&err, fields::MOVE_DATE).as_deref(), Some("must be a date (YYYY-MM-DD)"));
    e.update_field(fields::MOVE_DATE, "2026-12-31").unwrap();
    assert_eq!(e.advance().unwrap(), steps::REVIEW);
}

#[test]
fn deactivation_confirm_step_is_terminal_and_gates_submit() {
    let mut e = engine(FlowKind::Deactivation);
    e.update_field(fields::REASON, "price").unwrap();
    assert_eq!(e.advance().unwrap(), steps::CONFIRM);
    assert!(e.is_at_terminal());
    assert_eq!(e.current_step().map(|s| s.kind()), Some(StepKind::Confirm));

    let err = e.advance().unwrap_err();
    assert!(matches!(err, FlowEngineError::InvalidTransition(InvalidTransition::PastTerminal { .. })));

    let mut calls = 0;
    let mut sink = FnSink(|_: &FlowSnapshot| -> Result<(), SinkError> {
        calls += 1;
        Ok(())
    });
    e.update_field(fields::CONFIRM, false).unwrap();
    let err = e.submit(&mut sink).unwrap_err();
    assert_eq!(field_error(&err, fields::CONFIRM).as_deref(), Some("please confirm the deactivation"));
    e.update_field(fields::CONFIRM, true).unwrap();
    e.submit(&mut sink).unwrap();
    assert_eq!(calls, 1);
}

#[test]
fn payment_amount_cannot_exceed_invoice() {
    let mut e = engine(FlowKind::Payment);
    e.update_fields([(fields::INVOICE_ID, json!("INV-2026-09")), (fields::AMOUNT, json!(60.0))])
     .unwrap();
    let err = e.advance().unwrap_err();
    assert_eq!(field_error(&err, fields::AMOUNT).as_deref(), Some("cannot exceed amount due (49.90)"));
    e.update_field(fields::AMOUNT, 49.90).unwrap();
    assert_eq!(e.advance().unwrap(), steps::METHOD);
}

#[test]
fn snapshot_converts_to_typed_payload() {
    let mut e = engine(FlowKind::Order);
    e.update_fields([(fields::PRODUCT, json!("mesh-node")),
                     (fields::QUANTITY, json!("3")),
                     (fields::DELIVERY_ADDRESS, json!("Av. del Puerto 12")),
                     (fields::CONTACT_PHONE, json!("600123123"))])
     .unwrap();
    e.advance().unwrap();
    e.advance().unwrap();

    let mut payload = None;
    let mut sink = FnSink(|snap: &FlowSnapshot| -> Result<(), SinkError> {
        payload = Some(FlowPayload::from_snapshot(FlowKind::Order, snap).map_err(|e| SinkError::Rejected(e.to_string()))?);
        Ok(())
    });
    e.submit(&mut sink).unwrap();
    let Some(FlowPayload::Order(order)) = payload else {
        panic!("expected order payload");
    };
    assert_eq!(order.quantity, 3);

    let product = find_product(&order.product).unwrap();
    let record = Order::place("ORD-000001".into(), product, order);
    assert_eq!(record.total, 177.0);
    assert_eq!(record.status, OrderStatus::Placed);
    assert_eq!(record.reference(), "ORD-000001");
}

#[test]
fn records_carry_prefix_and_initial_status() {
    assert_eq!(Ticket::REFERENCE_PREFIX, "TKT");
    assert_eq!(Order::REFERENCE_PREFIX, "ORD");
    assert_eq!(ServiceRequest::REFERENCE_PREFIX, "REQ");
    assert_eq!(Payment::REFERENCE_PREFIX, "PAY");

    let FlowPayload::Ticket(t) = FlowPayload::from_value(FlowKind::Ticket,
                                                         json!({"category": "billing", "subject": "Double charge",
                                                                "description": "Charged twice", "priority": "medium"}))
                                 .unwrap()
    else {
        panic!("expected ticket payload");
    };
    let mut ticket = Ticket::open("TKT-000007".into(), t);
    assert_eq!(ticket.status, TicketStatus::Open);
    ticket.set_status(TicketStatus::Resolved);
    assert!(ticket.updated_at >= ticket.created_at);

    let relocation = RelocationPayload { new_address: "Calle Luna 3".into(),
                                         move_date: NaiveDate::from_ymd_opt(2026, 11, 2).unwrap(),
                                         keep_number: true };
    let req = ServiceRequest::new("REQ-000001".into(), RequestDetails::Relocation(relocation));
    assert_eq!(req.status, RequestStatus::Scheduled);

    let payment = Payment::authorize("PAY-000001".into(),
                                     PaymentPayload { invoice_id: "INV-2026-10".into(),
                                                      amount: 52.40,
                                                      method: PaymentMethod::Wallet });
    assert_eq!(payment.status, PaymentStatus::Authorized);
    assert_ne!(payment.id(), req.id());
}

#[test]
fn order_payload_rejects_fractional_quantity() {
    let err = FlowPayload::from_value(FlowKind::Order,
                                      json!({"product": "tv-box", "quantity": 1.5,
                                             "deliveryAddress": "x", "contactPhone": "600000000"}))
              .unwrap_err();
    assert!(matches!(err, DomainError::SerializationError(_)));

    let ok: OrderPayload = serde_json::from_value(json!({"product": "tv-box", "quantity": "2",
                                                         "deliveryAddress": "x", "contactPhone": "600000000"}))
                           .unwrap();
    assert_eq!(ok.quantity, 2);
}

#[test]
fn catalog_is_seeded_once() {
    let first = plans().as_ptr();
    assert_eq!(first, plans().as_ptr());
    assert_eq!(plans().len(), 4);
}
