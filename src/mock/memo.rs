use std::collections::HashMap;
use std::rc::Rc;

use super::MockValue;

#[derive(Debug, Clone)]
pub enum Visit {
    /// Fields are still being expanded; seeing the key again means a cycle.
    Building,
    Built(Rc<MockValue>),
}

/// Per-call visitation table. Lives for exactly one top-level synthesis.
#[derive(Debug, Default)]
pub struct Memo {
    states: HashMap<String, Visit>,
}

impl Memo {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, key: &str) -> Option<&Visit> {
        self.states.get(key)
    }

    /// absent → Building
    pub fn begin(&mut self, key: &str) {
        debug_assert!(!self.states.contains_key(key), "key `{key}` visited twice");
        self.states.insert(key.to_string(), Visit::Building);
    }

    /// Building → Built
    pub fn finish(&mut self, key: String, value: Rc<MockValue>) {
        self.states.insert(key, Visit::Built(value));
    }

    pub fn building_count(&self) -> usize {
        self.states.values().filter(|v| matches!(v, Visit::Building)).count()
    }

    pub fn len(&self) -> usize {
        self.states.len()
    }

    pub fn is_empty(&self) -> bool {
        self.states.is_empty()
    }
}
