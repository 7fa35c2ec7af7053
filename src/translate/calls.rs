//! Function references and call sites.

use tracing::{debug, trace};

use crate::ast::{NodeHandle, NodeKind};
use crate::ir::{ApplySite, BlockId, FuncId, ValueId};

use super::error::TranslateResult;
use super::operators;
use super::registry::Key;
use super::Translator;

impl Translator<'_> {
    /// `function_ref`: `FUNCTION_EXPR(name)` under both the function and the
    /// instruction identity
    pub(crate) fn translate_function_ref(
        &mut self,
        id: ValueId,
        function: FuncId,
    ) -> TranslateResult<Option<NodeHandle>> {
        let module = self.module;
        let name = module
            .function(function)
            .map(|f| f.display_name().to_string())
            .unwrap_or_else(|| function.to_string());
        trace!(target: "silcast::translate::calls", %id, %function, name = name.as_str(), "Function reference");

        let name = self.constant(name)?;
        let expr = self.node(NodeKind::FunctionExpr, &[name.into()])?;
        self.context.pending_insert(Key::Function(function), expr);
        self.register(id, expr);
        Ok(None)
    }

    /// `apply`, `begin_apply` and `partial_apply`
    pub(crate) fn translate_apply(
        &mut self,
        id: ValueId,
        site: &ApplySite,
    ) -> TranslateResult<Option<NodeHandle>> {
        let node = self.translate_call_site(site)?;
        if let Some(node) = node {
            self.register(id, node);
        }
        Ok(node)
    }

    /// `end_apply` / `abort_apply` consume the coroutine token
    pub(crate) fn translate_end_apply(&mut self, token: ValueId) -> TranslateResult<Option<NodeHandle>> {
        trace!(target: "silcast::translate::calls", %token, "End of coroutine");
        self.resolve(token)?;
        Ok(None)
    }

    /// `try_apply`: `ASSIGN(VAR result, TRY(call))`, with the result name
    /// bound to the first parameter of the normal successor
    pub(crate) fn translate_try_apply(
        &mut self,
        id: ValueId,
        site: &ApplySite,
        normal: BlockId,
    ) -> TranslateResult<Option<NodeHandle>> {
        let call = self.translate_call_site(site)?;

        let name = self.config.try_result_name.clone();
        let result_param = self.context.block_params(normal).first().copied();
        if let Some(param) = result_param {
            self.context.insert_variable(param, name.as_str());
        }
        trace!(target: "silcast::translate::calls", %id, %normal, ?result_param, "Try call");

        let Some(call) = call else {
            return Ok(None);
        };
        let try_node = self.node(NodeKind::Try, &[call.into()])?;
        let var = self.var(&name)?;
        let node = self.node(NodeKind::Assign, &[var.into(), try_node.into()])?;
        self.register(id, node);
        Ok(Some(node))
    }

    pub(crate) fn translate_builtin(
        &mut self,
        id: ValueId,
        name: &str,
        args: &[ValueId],
    ) -> TranslateResult<Option<NodeHandle>> {
        if name.is_empty() {
            debug!(target: "silcast::translate::calls", %id, "Builtin without a name");
            return Ok(None);
        }
        let full_name = format!("{}{}", self.config.builtin_prefix, name);
        trace!(target: "silcast::translate::calls", %id, name = full_name.as_str(), args = args.len(), "Builtin");

        let name = self.constant(full_name)?;
        let callee = self.node(NodeKind::FunctionExpr, &[name.into()])?;
        let args = self.resolve_all(args)?;
        let args = self.array(args)?;
        let node = self.node(NodeKind::Call, &[callee.into(), args.into()])?;
        self.register(id, node);
        Ok(Some(node))
    }

    /// Dynamic dispatch through a class vtable: `OBJECT_REF(object, FUNCTION_EXPR member)`
    pub(crate) fn translate_class_method(
        &mut self,
        id: ValueId,
        operand: ValueId,
        member: &str,
    ) -> TranslateResult<Option<NodeHandle>> {
        trace!(target: "silcast::translate::calls", %id, %operand, member, "Class method");
        let object = self.resolve_or_empty(operand)?;
        let member = self.constant(member)?;
        let member = self.node(NodeKind::FunctionExpr, &[member.into()])?;
        let node = self.node(NodeKind::ObjectRef, &[object.into(), member.into()])?;
        self.register(id, node);
        Ok(Some(node))
    }

    /// Protocol requirement lookup: `OBJECT_REF(protocol, FUNCTION_EXPR member)`
    pub(crate) fn translate_witness_method(
        &mut self,
        id: ValueId,
        protocol: &str,
        member: &str,
    ) -> TranslateResult<Option<NodeHandle>> {
        trace!(target: "silcast::translate::calls", %id, protocol, member, "Witness method");
        let protocol = self.constant(protocol)?;
        let member = self.constant(member)?;
        let member = self.node(NodeKind::FunctionExpr, &[member.into()])?;
        let node = self.node(NodeKind::ObjectRef, &[protocol.into(), member.into()])?;
        self.register(id, node);
        Ok(Some(node))
    }

    /// Lower a call site to an operator expression or a `CALL`.
    ///
    /// A call with no statically known callee is dropped.
    fn translate_call_site(&mut self, site: &ApplySite) -> TranslateResult<Option<NodeHandle>> {
        let Some(function) = site.referenced else {
            debug!(target: "silcast::translate::calls", callee = %site.callee, "Call without a static callee");
            return Ok(None);
        };

        if let Some(node) = self.translate_operator_call(function, &site.args)? {
            return Ok(Some(node));
        }

        let callee = match self.resolve(Key::Function(function))? {
            Some(node) => node,
            None => self.resolve_or_empty(site.callee)?,
        };
        let args = self.resolve_all(&site.args)?;
        trace!(target: "silcast::translate::calls", %function, args = args.len(), "Call");
        let args = self.array(args)?;
        let node = self.node(NodeKind::Call, &[callee.into(), args.into()])?;
        Ok(Some(node))
    }

    /// `UNARY_EXPR(op, x)` / `BINARY_EXPR(op, lhs, rhs)` for calls to
    /// functions declared as a native operator
    fn translate_operator_call(
        &mut self,
        function: FuncId,
        args: &[ValueId],
    ) -> TranslateResult<Option<NodeHandle>> {
        let module = self.module;
        let Some(decl) = module.function(function).and_then(|f| f.operator.as_ref()) else {
            return Ok(None);
        };
        let Some(op) = operators::classify(&decl.symbol) else {
            trace!(target: "silcast::translate::calls", symbol = decl.symbol.as_str(), "Operator takes the call path");
            return Ok(None);
        };

        if decl.is_unary() {
            let operand = operators::unary_operand(args);
            trace!(target: "silcast::translate::calls", %op, ?operand, "Unary operator");
            let op = self.factory.make_operator(op)?;
            let operand = self.resolve_optional(operand)?;
            let node = self.node(NodeKind::UnaryExpr, &[op.into(), operand.into()])?;
            Ok(Some(node))
        } else {
            let (lhs, rhs) = operators::binary_operands(args);
            trace!(target: "silcast::translate::calls", %op, ?lhs, ?rhs, "Binary operator");
            let op = self.factory.make_operator(op)?;
            let lhs = self.resolve_optional(lhs)?;
            let rhs = self.resolve_optional(rhs)?;
            let node = self.node(NodeKind::BinaryExpr, &[op.into(), lhs.into(), rhs.into()])?;
            Ok(Some(node))
        }
    }

    fn resolve_optional(&mut self, id: Option<ValueId>) -> TranslateResult<NodeHandle> {
        match id {
            Some(id) => self.resolve_or_empty(id),
            None => self.leaf(NodeKind::Empty),
        }
    }
}
