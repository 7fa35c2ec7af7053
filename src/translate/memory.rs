//! Allocation, ownership and memory-access instructions.
//!
//! Allocations only bind names: a stack slot or box becomes a variable, and
//! every later use of the slot resolves to `VAR(name)`. Stores into a named
//! slot become assignments.

use tracing::trace;

use crate::ast::{NodeHandle, NodeKind};
use crate::ir::{TailElement, ValueId};

use super::error::TranslateResult;
use super::Translator;

impl Translator<'_> {
    /// `alloc_stack` / `alloc_box`: bind the declared name, or `self`
    pub(crate) fn translate_alloc(
        &mut self,
        id: ValueId,
        var_name: Option<&str>,
    ) -> TranslateResult<Option<NodeHandle>> {
        let name = match var_name {
            Some(name) if !name.is_empty() => name.to_string(),
            _ => self.config.self_name.clone(),
        };
        trace!(target: "silcast::translate::memory", %id, name = name.as_str(), "Allocation");
        self.context.insert_variable(id, name);
        Ok(None)
    }

    pub(crate) fn translate_alloc_ref(
        &mut self,
        id: ValueId,
        type_name: &str,
        tail_elems: &[TailElement],
    ) -> TranslateResult<Option<NodeHandle>> {
        trace!(target: "silcast::translate::memory", %id, type_name, tail = tail_elems.len(), "Reference allocation");
        self.context.insert_variable(id, type_name);
        for elem in tail_elems {
            self.context.insert_variable(elem.count, elem.type_name.as_str());
        }
        Ok(None)
    }

    pub(crate) fn translate_alloc_global(&mut self, global: &str) -> TranslateResult<Option<NodeHandle>> {
        trace!(target: "silcast::translate::memory", global, "Global allocation");
        Ok(None)
    }

    pub(crate) fn translate_global_addr(
        &mut self,
        id: ValueId,
        global: &str,
    ) -> TranslateResult<Option<NodeHandle>> {
        trace!(target: "silcast::translate::memory", %id, global, "Global address");
        self.context.insert_variable(id, global);
        Ok(None)
    }

    pub(crate) fn translate_alloc_value_buffer(
        &mut self,
        buffer: ValueId,
        value_type: &str,
    ) -> TranslateResult<Option<NodeHandle>> {
        trace!(target: "silcast::translate::memory", %buffer, value_type, "Value buffer allocation");
        self.context.insert_variable(buffer, value_type);
        Ok(None)
    }

    pub(crate) fn translate_alloc_existential_box(
        &mut self,
        id: ValueId,
        concrete_type: &str,
        existential_type: &str,
    ) -> TranslateResult<Option<NodeHandle>> {
        let name = format!("ExistentialBox:{}->{}", concrete_type, existential_type);
        trace!(target: "silcast::translate::memory", %id, name = name.as_str(), "Existential box allocation");
        self.context.insert_variable(id, name);
        Ok(None)
    }

    /// Box, existential-box and value-buffer projections expose an existing
    /// slot under a new identity
    pub(crate) fn translate_projection(
        &mut self,
        id: ValueId,
        operand: ValueId,
    ) -> TranslateResult<Option<NodeHandle>> {
        let aliased = self.context.duplicate_variable(id, operand);
        trace!(target: "silcast::translate::memory", %id, %operand, aliased, "Projection");
        Ok(None)
    }

    pub(crate) fn translate_dealloc(&mut self, operand: ValueId) -> TranslateResult<Option<NodeHandle>> {
        let removed = self.context.remove_variable(operand);
        trace!(target: "silcast::translate::memory", %operand, ?removed, "Deallocation");
        Ok(None)
    }

    /// Destroy and deinit instructions consume the operand and drop its name
    pub(crate) fn translate_destroy(&mut self, operand: ValueId) -> TranslateResult<Option<NodeHandle>> {
        trace!(target: "silcast::translate::memory", %operand, "Destroy");
        self.resolve(operand)?;
        self.context.remove_variable(operand);
        Ok(None)
    }

    pub(crate) fn translate_debug_value(
        &mut self,
        operand: ValueId,
        var_name: Option<&str>,
    ) -> TranslateResult<Option<NodeHandle>> {
        match var_name {
            Some(name) if !name.is_empty() => {
                trace!(target: "silcast::translate::memory", %operand, name, "Debug value");
                self.context.insert_variable(operand, name);
            }
            _ => trace!(target: "silcast::translate::memory", %operand, "Debug value without a name"),
        }
        Ok(None)
    }

    pub(crate) fn translate_load(
        &mut self,
        id: ValueId,
        operand: ValueId,
    ) -> TranslateResult<Option<NodeHandle>> {
        let node = self.resolve(operand)?;
        trace!(target: "silcast::translate::memory", %id, %operand, resolved = node.is_some(), "Load");
        if let Some(node) = node {
            self.register(id, node);
        }
        Ok(node)
    }

    /// Pass the operand's node through under the instruction's identity.
    /// `emit` controls whether it is also returned as a statement.
    pub(crate) fn translate_forward(
        &mut self,
        id: ValueId,
        operand: ValueId,
        emit: bool,
    ) -> TranslateResult<Option<NodeHandle>> {
        let node = self.resolve(operand)?;
        trace!(target: "silcast::translate::memory", %id, %operand, resolved = node.is_some(), "Forward");
        if let Some(node) = node {
            self.register(id, node);
        }
        Ok(if emit { node } else { None })
    }

    /// `end_borrow` / `end_access`: the scoped value is no longer pending
    pub(crate) fn translate_end_scope(&mut self, operand: ValueId) -> TranslateResult<Option<NodeHandle>> {
        let erased = self.context.pending_erase(operand).is_some();
        trace!(target: "silcast::translate::memory", %operand, erased, "End of scope");
        Ok(None)
    }

    /// `store src to dest`
    ///
    /// Emits `ASSIGN(VAR dest, src)` only when `dest` is a named variable.
    /// Either way `dest` is aliased to whatever node `src` had pending, so
    /// loads from a temporary slot see the stored expression.
    pub(crate) fn translate_store(
        &mut self,
        src: ValueId,
        dest: ValueId,
    ) -> TranslateResult<Option<NodeHandle>> {
        let src_pending = self.context.pending_node(src);
        trace!(target: "silcast::translate::memory", %src, %dest, pending = src_pending.is_some(), "Store");

        let assign = if self.context.has_variable(dest) {
            let var = self.resolve_or_empty(dest)?;
            let value = self.resolve_or_empty(src)?;
            Some(self.node(NodeKind::Assign, &[var.into(), value.into()])?)
        } else {
            None
        };

        if let Some(node) = src_pending {
            self.context.pending_insert(dest, node);
        }
        Ok(assign)
    }

    /// `assign`, `store_borrow` and `copy_addr`: `ASSIGN(dest, src)`
    pub(crate) fn translate_assign(
        &mut self,
        id: ValueId,
        src: ValueId,
        dest: ValueId,
    ) -> TranslateResult<Option<NodeHandle>> {
        trace!(target: "silcast::translate::memory", %id, %src, %dest, "Assign");
        let value = self.resolve_or_empty(src)?;
        let target = self.resolve_or_empty(dest)?;
        let node = self.node(NodeKind::Assign, &[target.into(), value.into()])?;
        self.register(id, node);
        Ok(Some(node))
    }

    pub(crate) fn translate_begin_unpaired_access(
        &mut self,
        source: ValueId,
        buffer: ValueId,
    ) -> TranslateResult<Option<NodeHandle>> {
        let node = self.resolve(source)?;
        trace!(target: "silcast::translate::memory", %source, %buffer, resolved = node.is_some(), "Begin unpaired access");
        if let Some(node) = node {
            self.register(buffer, node);
        }
        Ok(None)
    }

    pub(crate) fn translate_end_unpaired_access(
        &mut self,
        buffer: ValueId,
    ) -> TranslateResult<Option<NodeHandle>> {
        trace!(target: "silcast::translate::memory", %buffer, "End unpaired access");
        self.resolve(buffer)?;
        Ok(None)
    }

    /// `index_addr` / `tail_addr`: `ARRAY_REF(base, index)`
    pub(crate) fn translate_array_ref(
        &mut self,
        id: ValueId,
        base: ValueId,
        index: ValueId,
    ) -> TranslateResult<Option<NodeHandle>> {
        trace!(target: "silcast::translate::memory", %id, %base, %index, "Address arithmetic");
        let base = self.resolve_or_empty(base)?;
        let index = self.resolve_or_empty(index)?;
        let node = self.node(NodeKind::ArrayRef, &[base.into(), index.into()])?;
        self.register(id, node);
        Ok(Some(node))
    }

    /// `mark_dependence value on base`: `PRIMITIVE(base, value)`
    pub(crate) fn translate_mark_dependence(
        &mut self,
        id: ValueId,
        value: ValueId,
        base: ValueId,
    ) -> TranslateResult<Option<NodeHandle>> {
        trace!(target: "silcast::translate::memory", %id, %value, %base, "Mark dependence");
        let value = self.resolve_or_empty(value)?;
        let base = self.resolve_or_empty(base)?;
        let node = self.node(NodeKind::Primitive, &[base.into(), value.into()])?;
        self.register(id, node);
        Ok(Some(node))
    }
}
