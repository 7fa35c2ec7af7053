//! Tuples, structs, enums, existentials and metatypes.
//!
//! Construction produces `OBJECT_LITERAL(type, key0, value0, key1, ...)`
//! with positional keys; projection produces `OBJECT_REF(base, field)`.

use tracing::trace;

use crate::ast::{NodeHandle, NodeKind};
use crate::ir::{SelectCase, ValueId};

use super::error::TranslateResult;
use super::Translator;

impl Translator<'_> {
    pub(crate) fn translate_metatype(
        &mut self,
        id: ValueId,
        type_name: &str,
    ) -> TranslateResult<Option<NodeHandle>> {
        trace!(target: "silcast::translate::aggregates", %id, type_name, "Metatype");
        let name = self.constant(type_name)?;
        let node = self.node(NodeKind::Constant, &[name.into()])?;
        self.register(id, node);
        Ok(Some(node))
    }

    pub(crate) fn translate_tuple(
        &mut self,
        id: ValueId,
        elements: &[ValueId],
    ) -> TranslateResult<Option<NodeHandle>> {
        trace!(target: "silcast::translate::aggregates", %id, elements = elements.len(), "Tuple");
        let head = self.constant("Tuple")?;
        self.object_literal(id, vec![head], elements)
    }

    pub(crate) fn translate_struct(
        &mut self,
        id: ValueId,
        type_name: &str,
        fields: &[ValueId],
    ) -> TranslateResult<Option<NodeHandle>> {
        trace!(target: "silcast::translate::aggregates", %id, type_name, fields = fields.len(), "Struct");
        let head = self.constant(type_name)?;
        self.object_literal(id, vec![head], fields)
    }

    pub(crate) fn translate_enum(
        &mut self,
        id: ValueId,
        enum_name: &str,
        case_name: &str,
        payload: Option<ValueId>,
    ) -> TranslateResult<Option<NodeHandle>> {
        trace!(target: "silcast::translate::aggregates", %id, enum_name, case_name, "Enum");
        let enum_node = self.constant(enum_name)?;
        let case_node = self.constant(case_name)?;
        let payload: Vec<ValueId> = payload.into_iter().collect();
        self.object_literal(id, vec![enum_node, case_node], &payload)
    }

    /// `tuple_extract` / `tuple_element_addr`: the field is named by its
    /// label when it has one, else by its type
    pub(crate) fn translate_tuple_extract(
        &mut self,
        id: ValueId,
        operand: ValueId,
        field_name: Option<&str>,
        field_type: &str,
    ) -> TranslateResult<Option<NodeHandle>> {
        let field = field_name.unwrap_or(field_type);
        trace!(target: "silcast::translate::aggregates", %id, %operand, field, "Tuple element");
        let base = self.resolve_or_empty(operand)?;
        let field = self.constant(field)?;
        self.object_ref(id, base, field)
    }

    /// Struct and class fields: `OBJECT_REF(base, VAR field)`
    pub(crate) fn translate_field_ref(
        &mut self,
        id: ValueId,
        operand: ValueId,
        field: &str,
    ) -> TranslateResult<Option<NodeHandle>> {
        trace!(target: "silcast::translate::aggregates", %id, %operand, field, "Field");
        let base = self.resolve_or_empty(operand)?;
        let field = self.var(field)?;
        self.object_ref(id, base, field)
    }

    pub(crate) fn translate_ref_tail_addr(
        &mut self,
        id: ValueId,
        operand: ValueId,
        tail_type: &str,
    ) -> TranslateResult<Option<NodeHandle>> {
        trace!(target: "silcast::translate::aggregates", %id, %operand, tail_type, "Tail address");
        let base = self.resolve_or_empty(operand)?;
        let tail = self.constant(tail_type)?;
        self.object_ref(id, base, tail)
    }

    pub(crate) fn translate_init_enum_data_addr(
        &mut self,
        id: ValueId,
        operand: ValueId,
        enum_name: &str,
        case_name: &str,
    ) -> TranslateResult<Option<NodeHandle>> {
        trace!(target: "silcast::translate::aggregates", %id, %operand, enum_name, case_name, "Init enum data");
        let enum_node = self.constant(enum_name)?;
        let case_node = self.constant(case_name)?;
        let value = self.resolve_or_empty(operand)?;
        let array = self.array(vec![enum_node, case_node, value])?;
        let node = self.node(NodeKind::ObjectLiteral, &[array.into()])?;
        self.register(id, node);
        Ok(Some(node))
    }

    pub(crate) fn translate_take_enum_data_addr(
        &mut self,
        id: ValueId,
        operand: ValueId,
        enum_name: &str,
        case_name: &str,
    ) -> TranslateResult<Option<NodeHandle>> {
        let case = format!("{}.{}", enum_name, case_name);
        trace!(target: "silcast::translate::aggregates", %id, %operand, case = case.as_str(), "Take enum data");
        let base = self.resolve_or_empty(operand)?;
        let case = self.constant(case)?;
        self.object_ref(id, base, case)
    }

    /// `select_enum`: `SWITCH(scrutinee, BLOCK_STMT("Enum.case", value, ..., "DEFAULT", value))`
    pub(crate) fn translate_select_enum(
        &mut self,
        id: ValueId,
        operand: ValueId,
        enum_name: &str,
        cases: &[SelectCase],
        default: Option<ValueId>,
    ) -> TranslateResult<Option<NodeHandle>> {
        trace!(target: "silcast::translate::aggregates", %id, %operand, cases = cases.len(), "Select enum");
        let scrutinee = self.resolve_or_empty(operand)?;

        let mut children = Vec::with_capacity(2 * (cases.len() + 1));
        for case in cases {
            let key = self.constant(format!("{}.{}", enum_name, case.case_name))?;
            let value = self.resolve_or_empty(case.result)?;
            children.push(key);
            children.push(value);
        }
        if let Some(default) = default {
            let key = self.constant("DEFAULT")?;
            let value = self.resolve_or_empty(default)?;
            children.push(key);
            children.push(value);
        }

        let array = self.array(children)?;
        let body = self.node(NodeKind::BlockStmt, &[array.into()])?;
        let node = self.node(NodeKind::Switch, &[scrutinee.into(), body.into()])?;
        self.register(id, node);
        Ok(Some(node))
    }

    /// `init_existential_*`: name the container after the wrapped variable
    pub(crate) fn translate_init_existential(
        &mut self,
        id: ValueId,
        container: &str,
        operand: ValueId,
        concrete_type: &str,
    ) -> TranslateResult<Option<NodeHandle>> {
        let Some(wrapped) = self.context.variable(operand) else {
            trace!(target: "silcast::translate::aggregates", %id, %operand, container, "Existential of an unnamed value");
            return Ok(None);
        };
        let name = format!("{} of {} -> {}", container, wrapped, concrete_type);
        trace!(target: "silcast::translate::aggregates", %id, name = name.as_str(), "Existential");
        self.context.insert_variable(id, name);
        Ok(None)
    }

    fn object_literal(
        &mut self,
        id: ValueId,
        mut children: Vec<NodeHandle>,
        values: &[ValueId],
    ) -> TranslateResult<Option<NodeHandle>> {
        children.reserve(2 * values.len());
        for (position, &value) in values.iter().enumerate() {
            let key = self.constant(position.to_string())?;
            let value = self.resolve_or_empty(value)?;
            children.push(key);
            children.push(value);
        }
        let array = self.array(children)?;
        let node = self.node(NodeKind::ObjectLiteral, &[array.into()])?;
        self.register(id, node);
        Ok(Some(node))
    }

    fn object_ref(
        &mut self,
        id: ValueId,
        base: NodeHandle,
        field: NodeHandle,
    ) -> TranslateResult<Option<NodeHandle>> {
        let node = self.node(NodeKind::ObjectRef, &[base.into(), field.into()])?;
        self.register(id, node);
        Ok(Some(node))
    }
}
