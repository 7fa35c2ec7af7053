//! Translation context: the identity registry threaded through every handler.

use std::collections::HashMap;

use crate::ast::{AstFactory, FactoryResult, Literal, NodeHandle, NodeKind};
use crate::ir::{BlockId, Function, ValueId};

use super::registry::{Key, PendingNodes, VariableTable};

/// Per-function and per-block translation state
#[derive(Debug, Clone, Default)]
pub struct TranslationContext {
    /// Variable names (function scope)
    variables: VariableTable,
    /// Pending nodes and statements (block scope)
    pending: PendingNodes,
    /// Parameters of every block in the current function
    block_params: HashMap<BlockId, Vec<ValueId>>,
    /// Integer literal values seen in the current function
    integers: HashMap<ValueId, i128>,
}

impl TranslationContext {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reset function-scoped state and index the blocks of `func`
    pub fn begin_function(&mut self, func: &Function) {
        self.variables.clear();
        self.pending.clear();
        self.integers.clear();
        self.block_params = func
            .blocks
            .iter()
            .map(|b| (b.id, b.params.clone()))
            .collect();
    }

    /// Reset block-scoped state
    pub fn begin_block(&mut self) {
        self.pending.clear();
    }

    // ---- Variable table ----

    pub fn has_variable(&self, key: impl Into<Key>) -> bool {
        self.variables.has(key.into())
    }

    pub fn variable(&self, key: impl Into<Key>) -> Option<&str> {
        self.variables.get(key.into())
    }

    pub fn insert_variable(&mut self, key: impl Into<Key>, name: impl Into<String>) {
        self.variables.insert(key.into(), name);
    }

    pub fn duplicate_variable(&mut self, key: impl Into<Key>, existing: impl Into<Key>) -> bool {
        self.variables.duplicate(key.into(), existing.into())
    }

    pub fn remove_variable(&mut self, key: impl Into<Key>) -> Option<String> {
        self.variables.remove(key.into())
    }

    // ---- Pending nodes ----

    pub fn pending_insert(&mut self, key: impl Into<Key>, node: NodeHandle) {
        self.pending.insert(key.into(), node);
    }

    pub fn pending_node(&self, key: impl Into<Key>) -> Option<NodeHandle> {
        self.pending.get(key.into())
    }

    /// Register `key` to the node pending under `from`, if any
    pub fn pending_alias(&mut self, key: impl Into<Key>, from: impl Into<Key>) -> bool {
        match self.pending.get(from.into()) {
            Some(node) => {
                self.pending.insert(key.into(), node);
                true
            }
            None => false,
        }
    }

    pub fn pending_erase(&mut self, key: impl Into<Key>) -> Option<NodeHandle> {
        self.pending.erase(key.into())
    }

    pub fn push_statement(&mut self, node: NodeHandle) {
        self.pending.push_statement(node);
    }

    #[cfg(test)]
    pub(crate) fn statements(&self) -> &[NodeHandle] {
        self.pending.statements()
    }

    pub fn take_statements(&mut self) -> Vec<NodeHandle> {
        self.pending.take_statements()
    }

    /// Consuming operand lookup.
    ///
    /// A variable binding wins and yields a fresh `VAR` node without
    /// touching pending state. Otherwise the pending node is removed from
    /// the table and from the statement sequence. `None` when neither exists.
    pub fn find_and_remove(
        &mut self,
        factory: &mut dyn AstFactory,
        key: impl Into<Key>,
    ) -> FactoryResult<Option<NodeHandle>> {
        let key = key.into();
        if let Some(name) = self.variables.get(key) {
            let name = factory.make_constant(Literal::Str(name.to_string()))?;
            let var = factory.make_node(NodeKind::Var, &[name.into()])?;
            return Ok(Some(var));
        }
        Ok(self.pending.take(key))
    }

    // ---- Function-scoped lookups ----

    pub fn block_params(&self, block: BlockId) -> &[ValueId] {
        self.block_params
            .get(&block)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    pub fn record_integer(&mut self, id: ValueId, value: i128) {
        self.integers.insert(id, value);
    }

    pub fn integer(&self, id: ValueId) -> Option<i128> {
        self.integers.get(&id).copied()
    }
}
