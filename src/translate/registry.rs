//! Identity-keyed tables backing the translation context.

use std::collections::HashMap;

use crate::ast::NodeHandle;
use crate::ir::{FuncId, ValueId};

/// Registry key: an instruction/parameter identity or a function identity
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Key {
    Value(ValueId),
    Function(FuncId),
}

impl From<ValueId> for Key {
    fn from(id: ValueId) -> Self {
        Key::Value(id)
    }
}

impl From<FuncId> for Key {
    fn from(id: FuncId) -> Self {
        Key::Function(id)
    }
}

/// Identity → variable name, scoped to one function
#[derive(Debug, Clone, Default)]
pub struct VariableTable {
    names: HashMap<Key, String>,
}

impl VariableTable {
    pub fn clear(&mut self) {
        self.names.clear();
    }

    pub fn has(&self, key: Key) -> bool {
        self.names.contains_key(&key)
    }

    pub fn get(&self, key: Key) -> Option<&str> {
        self.names.get(&key).map(String::as_str)
    }

    /// Bind `name` to `key`, replacing any previous binding
    pub fn insert(&mut self, key: Key, name: impl Into<String>) {
        self.names.insert(key, name.into());
    }

    /// Give `key` the name bound to `existing`; no-op when `existing` is unbound
    pub fn duplicate(&mut self, key: Key, existing: Key) -> bool {
        match self.names.get(&existing).cloned() {
            Some(name) => {
                self.names.insert(key, name);
                true
            }
            None => false,
        }
    }

    pub fn remove(&mut self, key: Key) -> Option<String> {
        self.names.remove(&key)
    }
}

/// Unconsumed nodes of the current block and its statement sequence
#[derive(Debug, Clone, Default)]
pub struct PendingNodes {
    table: HashMap<Key, NodeHandle>,
    sequence: Vec<NodeHandle>,
}

impl PendingNodes {
    pub fn clear(&mut self) {
        self.table.clear();
        self.sequence.clear();
    }

    pub fn insert(&mut self, key: Key, node: NodeHandle) {
        self.table.insert(key, node);
    }

    pub fn get(&self, key: Key) -> Option<NodeHandle> {
        self.table.get(&key).copied()
    }

    /// Drop the table entry only; the statement sequence is untouched
    pub fn erase(&mut self, key: Key) -> Option<NodeHandle> {
        self.table.remove(&key)
    }

    /// Consume the entry for `key`, erasing the first occurrence of its node
    /// from the statement sequence
    pub fn take(&mut self, key: Key) -> Option<NodeHandle> {
        let node = self.table.remove(&key)?;
        if let Some(pos) = self.sequence.iter().position(|&n| n == node) {
            self.sequence.remove(pos);
        }
        Some(node)
    }

    pub fn push_statement(&mut self, node: NodeHandle) {
        self.sequence.push(node);
    }

    #[cfg(test)]
    pub(crate) fn statements(&self) -> &[NodeHandle] {
        &self.sequence
    }

    pub fn take_statements(&mut self) -> Vec<NodeHandle> {
        std::mem::take(&mut self.sequence)
    }
}
