//! Propiedades del engine sobre definiciones aleatorias, lineales o con saltos.

use std::collections::BTreeMap;
use std::sync::Arc;

use portal_core::{FieldRule, FlowData, FlowDefinition, FlowEngine, FlowEngineError, FlowSnapshot, FnSink, FormStep,
                  InvalidTransition, Next, SinkError, StepDefinition};
use proptest::prelude::*;
use serde_json::{json, Value};

#[derive(Debug, Clone)]
enum Op {
    Set(usize, Option<u8>),
    Advance,
    Retreat,
    Reset,
}

fn linear_definition(steps: usize) -> Arc<FlowDefinition> {
    let mut builder = FlowDefinition::builder("linear");
    for i in 0..steps {
        builder = builder.step(FormStep::new(format!("s{i}")).field(format!("f{i}"), [FieldRule::Required]));
    }
    Arc::new(builder.step(FormStep::review("done")).build().unwrap())
}

/// Igual que la lineal, pero un valor par en `f{i}` salta el paso siguiente.
fn skipping_definition(steps: usize) -> Arc<FlowDefinition> {
    let ids: Vec<String> = (0..steps).map(|i| format!("s{i}")).chain(["done".to_string()]).collect();
    let mut builder = FlowDefinition::builder("skipping");
    for i in 0..steps {
        builder = builder.step(FormStep::new(format!("s{i}")).field(format!("f{i}"), [FieldRule::Required]));
    }
    let branching = move |current: &str, data: &FlowData| {
        let Some(i) = ids.iter().position(|id| id == current) else {
            return Next::Default;
        };
        let even = data.get(&format!("f{i}")).and_then(Value::as_u64).is_some_and(|n| n % 2 == 0);
        match ids.get(i + 2) {
            Some(target) if even => Next::goto(target.clone()),
            _ => Next::Default,
        }
    };
    Arc::new(builder.step(FormStep::review("done")).branching(branching).build().unwrap())
}

fn arb_op(steps: usize) -> impl Strategy<Value = Op> {
    prop_oneof![
        3 => (0..steps, proptest::option::of(any::<u8>())).prop_map(|(i, v)| Op::Set(i, v)),
        3 => Just(Op::Advance),
        1 => Just(Op::Retreat),
        1 => Just(Op::Reset),
    ]
}

fn arb_case() -> impl Strategy<Value = (usize, bool, Vec<Op>)> {
    (1usize..5).prop_flat_map(|n| (Just(n), any::<bool>(), prop::collection::vec(arb_op(n), 0..40)))
}

proptest! {
    #[test]
    fn engine_invariants_hold((steps, skipping, ops) in arb_case()) {
        let def = if skipping { skipping_definition(steps) } else { linear_definition(steps) };
        let mut engine = FlowEngine::started(Arc::clone(&def));
        let mut model: BTreeMap<String, Value> = BTreeMap::new();
        // pasos visitados según las operaciones aceptadas
        let mut path: Vec<String> = Vec::new();

        for op in ops {
            match op {
                Op::Set(i, v) => {
                    let name = format!("f{i}");
                    let value = v.map(|n| json!(n)).unwrap_or_else(|| json!(""));
                    engine.update_field(&name, value.clone()).unwrap();
                    model.insert(name.clone(), value.clone());
                    let state = engine.state().unwrap();
                    prop_assert_eq!(state.value(&name), Some(&value));
                    prop_assert!(state.error(&name).is_none());
                }
                Op::Advance => {
                    let before = engine.state().unwrap().clone();
                    match engine.advance() {
                        Ok(next) => {
                            let state = engine.state().unwrap();
                            prop_assert_eq!(state.history.len(), before.history.len() + 1);
                            prop_assert_eq!(state.current_step_id.as_str(), next.as_str());
                            prop_assert!(def.position(&next) > def.position(&before.current_step_id));
                            path.push(before.current_step_id.clone());
                        }
                        Err(FlowEngineError::Validation { .. }) => {
                            prop_assert_eq!(engine.current_step_id(), Some(before.current_step_id.as_str()));
                        }
                        Err(FlowEngineError::InvalidTransition(InvalidTransition::PastTerminal { .. })) => {
                            prop_assert!(def.is_terminal(&before.current_step_id));
                        }
                        Err(other) => prop_assert!(false, "unexpected error {:?}", other),
                    }
                }
                Op::Retreat => {
                    let before = engine.state().unwrap().clone();
                    match engine.retreat() {
                        Ok(prev) => {
                            prop_assert_eq!(Some(prev.as_str()), before.previous_step_id());
                            path.pop();
                        }
                        Err(_) => prop_assert!(before.history.is_empty()),
                    }
                    prop_assert_eq!(&engine.state().unwrap().data, &before.data);
                }
                Op::Reset => {
                    engine.reset().unwrap();
                    model.clear();
                    path.clear();
                    let state = engine.state().unwrap();
                    prop_assert_eq!(state.current_step_id.as_str(), def.first_step_id());
                    prop_assert!(state.data.is_empty() && state.errors.is_empty() && state.history.is_empty());
                }
            }

            let state = engine.state().unwrap();
            prop_assert!(def.contains(&state.current_step_id));
            prop_assert!(state.history.iter().all(|id| def.contains(id)));
            prop_assert_eq!(&state.history, &path);
            if skipping {
                prop_assert!(state.history.len() <= def.position(&state.current_step_id).unwrap_or(0));
            } else {
                prop_assert_eq!(Some(state.history.len()), def.position(&state.current_step_id));
            }
            prop_assert_eq!(&state.data, &model);
            let step = def.step(&state.current_step_id).unwrap();
            for field in state.errors.keys() {
                prop_assert!(step.declares(field));
            }
        }
    }

    #[test]
    fn submit_off_terminal_is_idempotent(steps in 1usize..5, attempts in 1usize..4) {
        let mut engine = FlowEngine::started(linear_definition(steps));
        let mut calls = 0usize;
        let mut sink = FnSink(|_: &FlowSnapshot| -> Result<(), SinkError> { calls += 1; Ok(()) });
        let first = engine.submit(&mut sink).unwrap_err();
        for _ in 0..attempts {
            prop_assert_eq!(engine.submit(&mut sink).unwrap_err(), first.clone());
        }
        drop(sink);
        prop_assert_eq!(calls, 0);
        prop_assert_eq!(engine.current_step_id(), Some("s0"));
    }
}
