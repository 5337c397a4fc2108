//! `FlowDefinition`: lista ordenada de steps + función de branching opcional.
//!
//! Se define una vez por tipo de flujo (ticket, upgrade, pedido...) y se
//! comparte entre instancias vía `Arc`. El `definition_hash` fija la forma
//! de la definición (ids + campos + versión del engine).
use std::fmt;

use indexmap::IndexMap;
use serde_json::json;

use super::branching::Branching;
use crate::constants::ENGINE_VERSION;
use crate::errors::DefinitionError;
use crate::hashing::hash_value;
use crate::step::StepDefinition;

pub struct FlowDefinition {
    id: String,
    steps: IndexMap<String, Box<dyn StepDefinition>>,
    branching: Option<Box<dyn Branching>>,
    definition_hash: String,
}

impl FlowDefinition {
    pub fn builder(id: impl Into<String>) -> FlowDefinitionBuilder {
        FlowDefinitionBuilder { id: id.into(),
                                steps: Vec::new(),
                                branching: None }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn definition_hash(&self) -> &str {
        &self.definition_hash
    }

    pub fn len(&self) -> usize {
        self.steps.len()
    }

    /// Siempre `false` para definiciones construidas con el builder.
    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    pub fn first_step_id(&self) -> &str {
        self.steps.keys().next().map(String::as_str).unwrap_or_default()
    }

    /// Paso terminal: el último en orden de definición.
    pub fn terminal_step_id(&self) -> &str {
        self.steps.keys().last().map(String::as_str).unwrap_or_default()
    }

    pub fn is_terminal(&self, step_id: &str) -> bool {
        !self.steps.is_empty() && self.terminal_step_id() == step_id
    }

    pub fn contains(&self, step_id: &str) -> bool {
        self.steps.contains_key(step_id)
    }

    pub fn step(&self, step_id: &str) -> Option<&dyn StepDefinition> {
        self.steps.get(step_id).map(|s| s.as_ref())
    }

    pub fn position(&self, step_id: &str) -> Option<usize> {
        self.steps.get_index_of(step_id)
    }

    pub fn step_ids(&self) -> impl Iterator<Item = &str> {
        self.steps.keys().map(String::as_str)
    }

    /// Siguiente paso en orden de definición.
    pub fn default_next(&self, step_id: &str) -> Option<&str> {
        let idx = self.position(step_id)?;
        self.steps.get_index(idx + 1).map(|(k, _)| k.as_str())
    }

    pub(crate) fn branching(&self) -> Option<&dyn Branching> {
        self.branching.as_deref()
    }
}

impl fmt::Debug for FlowDefinition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FlowDefinition")
         .field("id", &self.id)
         .field("steps", &self.steps.keys().collect::<Vec<_>>())
         .field("branching", &self.branching.is_some())
         .field("definition_hash", &self.definition_hash)
         .finish()
    }
}

pub struct FlowDefinitionBuilder {
    id: String,
    steps: Vec<Box<dyn StepDefinition>>,
    branching: Option<Box<dyn Branching>>,
}

impl FlowDefinitionBuilder {
    pub fn step<S>(mut self, step: S) -> Self
        where S: StepDefinition + 'static
    {
        self.steps.push(Box::new(step));
        self
    }

    pub fn boxed_step(mut self, step: Box<dyn StepDefinition>) -> Self {
        self.steps.push(step);
        self
    }

    /// Función de branching; sin ella se sigue el orden de definición.
    pub fn branching<B>(mut self, branching: B) -> Self
        where B: Branching + 'static
    {
        self.branching = Some(Box::new(branching));
        self
    }

    pub fn build(self) -> Result<FlowDefinition, DefinitionError> {
        if self.steps.is_empty() {
            return Err(DefinitionError::Empty(self.id));
        }
        let mut steps: IndexMap<String, Box<dyn StepDefinition>> = IndexMap::with_capacity(self.steps.len());
        for step in self.steps {
            let step_id = step.id().to_string();
            if step_id.is_empty() {
                return Err(DefinitionError::EmptyStepId(self.id));
            }
            if steps.contains_key(&step_id) {
                return Err(DefinitionError::DuplicateStep { flow: self.id, step_id });
            }
            steps.insert(step_id, step);
        }
        let shape: Vec<serde_json::Value> = steps.values()
                                                 .map(|s| json!({ "id": s.id(), "fields": s.fields() }))
                                                 .collect();
        let definition_hash = hash_value(&json!({
                                             "engine_version": ENGINE_VERSION,
                                             "flow": self.id,
                                             "steps": shape,
                                         }));
        log::debug!("flow definition '{}' built ({} steps, hash={})", self.id, steps.len(), definition_hash);
        Ok(FlowDefinition { id: self.id,
                            steps,
                            branching: self.branching,
                            definition_hash })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::step::{FieldRule, FormStep};

    fn three_steps() -> FlowDefinitionBuilder {
        FlowDefinition::builder("demo").step(FormStep::new("a").field("x", [FieldRule::Required]))
                                       .step(FormStep::new("b"))
                                       .step(FormStep::review("c"))
    }

    #[test]
    fn order_and_terminal_follow_declaration() {
        let def = three_steps().build().expect("valid definition");
        assert_eq!(def.first_step_id(), "a");
        assert_eq!(def.terminal_step_id(), "c");
        assert_eq!(def.default_next("a"), Some("b"));
        assert_eq!(def.default_next("c"), None);
        assert!(def.is_terminal("c"));
        assert!(!def.is_terminal("b"));
        assert_eq!(def.step_ids().collect::<Vec<_>>(), vec!["a", "b", "c"]);
    }

    #[test]
    fn rejects_empty_and_duplicate_definitions() {
        assert_eq!(FlowDefinition::builder("none").build().unwrap_err(), DefinitionError::Empty("none".into()));
        let err = three_steps().step(FormStep::new("a")).build().unwrap_err();
        assert_eq!(err, DefinitionError::DuplicateStep { flow: "demo".into(), step_id: "a".into() });
        assert!(matches!(FlowDefinition::builder("e").step(FormStep::new("")).build(),
                         Err(DefinitionError::EmptyStepId(_))));
    }

    #[test]
    fn hash_depends_on_shape() {
        let a = three_steps().build().unwrap();
        let b = three_steps().build().unwrap();
        let c = FlowDefinition::builder("demo").step(FormStep::new("a")).build().unwrap();
        assert_eq!(a.definition_hash(), b.definition_hash());
        assert_ne!(a.definition_hash(), c.definition_hash());
    }
}
