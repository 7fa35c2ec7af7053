//! Terminator lowering.
//!
//! Control flow stays unstructured: every successor is reached through a
//! `GOTO` to its block label. Block parameters are reified as assignments
//! to `argument<k>` variables placed ahead of the branch.

use tracing::{debug, trace};

use crate::ast::{NodeHandle, NodeKind};
use crate::ir::{BlockId, EnumCase, SwitchCase, ValueId};

use super::error::TranslateResult;
use super::Translator;

impl Translator<'_> {
    /// `br dest(args...)`
    pub(crate) fn translate_branch(
        &mut self,
        dest: BlockId,
        args: &[ValueId],
    ) -> TranslateResult<Option<NodeHandle>> {
        trace!(target: "silcast::translate::control_flow", %dest, args = args.len(), "Branch");
        let params = self.context.block_params(dest).to_vec();

        for (position, &arg) in args.iter().enumerate() {
            let value = self.resolve_or_empty(arg)?;
            let name = format!("{}{}", self.config.argument_prefix, position);
            if let Some(&param) = params.get(position) {
                self.context.insert_variable(param, name.as_str());
            }
            let var = self.var(&name)?;
            let assign = self.node(NodeKind::Assign, &[var.into(), value.into()])?;
            self.context.push_statement(assign);
        }

        Ok(Some(self.goto(dest)?))
    }

    /// `IF_STMT(cond, GOTO true [, GOTO false])`
    pub(crate) fn translate_cond_branch(
        &mut self,
        condition: ValueId,
        true_dest: BlockId,
        false_dest: Option<BlockId>,
    ) -> TranslateResult<Option<NodeHandle>> {
        trace!(target: "silcast::translate::control_flow", %condition, %true_dest, ?false_dest, "Conditional branch");
        let condition = self.resolve_or_empty(condition)?;
        let then_branch = self.goto(true_dest)?;
        let node = match false_dest {
            Some(false_dest) => {
                let else_branch = self.goto(false_dest)?;
                self.node(
                    NodeKind::IfStmt,
                    &[condition.into(), then_branch.into(), else_branch.into()],
                )?
            }
            None => self.node(NodeKind::IfStmt, &[condition.into(), then_branch.into()])?,
        };
        Ok(Some(node))
    }

    /// `SWITCH(scrutinee, BLOCK_STMT(value, GOTO, ..., "DEFAULT", GOTO))`
    pub(crate) fn translate_switch_value(
        &mut self,
        operand: ValueId,
        cases: &[SwitchCase],
        default: Option<BlockId>,
    ) -> TranslateResult<Option<NodeHandle>> {
        if self.config.lower_boolean_switch && cases.len() == 2 && default.is_none() {
            return self.translate_boolean_switch(operand, cases);
        }
        trace!(target: "silcast::translate::control_flow", %operand, cases = cases.len(), ?default, "Switch on value");

        let scrutinee = self.resolve_or_empty(operand)?;
        let mut children = Vec::with_capacity(2 * (cases.len() + 1));
        for case in cases {
            let value = self.resolve_or_empty(case.value)?;
            let goto = self.goto(case.dest)?;
            children.push(value);
            children.push(goto);
        }
        self.push_default(&mut children, default)?;
        self.switch(scrutinee, children)
    }

    /// Two-case switch without a default whose case values are the integer
    /// literals 1 and 0, lowered to `IF_STMT(scrutinee, GOTO one, GOTO zero)`.
    ///
    /// A case set that cannot be paired produces no node.
    fn translate_boolean_switch(
        &mut self,
        operand: ValueId,
        cases: &[SwitchCase],
    ) -> TranslateResult<Option<NodeHandle>> {
        let find = |wanted: i128| {
            cases
                .iter()
                .find(|case| self.context.integer(case.value) == Some(wanted))
                .map(|case| case.dest)
        };
        let (Some(true_dest), Some(false_dest)) = (find(1), find(0)) else {
            debug!(target: "silcast::translate::control_flow", %operand, "Two-case switch is not boolean; dropped");
            return Ok(None);
        };
        trace!(target: "silcast::translate::control_flow", %operand, %true_dest, %false_dest, "Boolean switch");

        let condition = self.resolve_or_empty(operand)?;
        for case in cases {
            self.resolve(case.value)?;
        }
        let then_branch = self.goto(true_dest)?;
        let else_branch = self.goto(false_dest)?;
        let node = self.node(
            NodeKind::IfStmt,
            &[condition.into(), then_branch.into(), else_branch.into()],
        )?;
        Ok(Some(node))
    }

    /// `switch_enum` / `switch_enum_addr`
    pub(crate) fn translate_switch_enum(
        &mut self,
        operand: ValueId,
        cases: &[EnumCase],
        default: Option<BlockId>,
    ) -> TranslateResult<Option<NodeHandle>> {
        trace!(target: "silcast::translate::control_flow", %operand, cases = cases.len(), ?default, "Switch on enum");
        let scrutinee = self.resolve_or_empty(operand)?;
        let mut children = Vec::with_capacity(2 * (cases.len() + 1));
        for case in cases {
            let key = self.constant(case.case_name.as_str())?;
            let goto = self.goto(case.dest)?;
            children.push(key);
            children.push(goto);
        }
        self.push_default(&mut children, default)?;
        self.switch(scrutinee, children)
    }

    /// `IF_STMT(CAST(operand, type), GOTO success, GOTO failure)`
    pub(crate) fn translate_checked_cast_branch(
        &mut self,
        operand: ValueId,
        target_type: &str,
        success: BlockId,
        failure: BlockId,
    ) -> TranslateResult<Option<NodeHandle>> {
        trace!(target: "silcast::translate::control_flow", %operand, target_type, "Checked cast branch");
        let cast = self.cast(operand, target_type)?;
        self.cast_branch(cast, success, failure)
    }

    /// `IF_STMT(CAST(src, dest), GOTO success, GOTO failure)`
    pub(crate) fn translate_checked_cast_addr_branch(
        &mut self,
        src: ValueId,
        dest: ValueId,
        success: BlockId,
        failure: BlockId,
    ) -> TranslateResult<Option<NodeHandle>> {
        trace!(target: "silcast::translate::control_flow", %src, %dest, "Checked address cast branch");
        let src = self.resolve_or_empty(src)?;
        let dest = self.resolve_or_empty(dest)?;
        let cast = self.node(NodeKind::Cast, &[src.into(), dest.into()])?;
        self.cast_branch(cast, success, failure)
    }

    /// `YIELD_STMT(values..., GOTO resume, GOTO unwind)`
    pub(crate) fn translate_yield(
        &mut self,
        id: ValueId,
        values: &[ValueId],
        resume: BlockId,
        unwind: BlockId,
    ) -> TranslateResult<Option<NodeHandle>> {
        trace!(target: "silcast::translate::control_flow", %id, values = values.len(), %resume, %unwind, "Yield");
        let values = self.resolve_all(values)?;
        let values = self.array(values)?;
        let resume = self.goto(resume)?;
        let unwind = self.goto(unwind)?;
        let node = self.node(
            NodeKind::YieldStmt,
            &[values.into(), resume.into(), unwind.into()],
        )?;
        self.register(id, node);
        Ok(Some(node))
    }

    /// `RETURN` / `THROW`, with the operand when it resolves
    pub(crate) fn translate_exit(
        &mut self,
        kind: NodeKind,
        operand: Option<ValueId>,
    ) -> TranslateResult<Option<NodeHandle>> {
        trace!(target: "silcast::translate::control_flow", %kind, ?operand, "Function exit");
        let value = match operand {
            Some(operand) => self.resolve(operand)?,
            None => None,
        };
        let node = match value {
            Some(value) => self.node(kind, &[value.into()])?,
            None => self.leaf(kind)?,
        };
        Ok(Some(node))
    }

    fn push_default(
        &mut self,
        children: &mut Vec<NodeHandle>,
        default: Option<BlockId>,
    ) -> TranslateResult<()> {
        if let Some(default) = default {
            let key = self.constant("DEFAULT")?;
            let goto = self.goto(default)?;
            children.push(key);
            children.push(goto);
        }
        Ok(())
    }

    fn switch(
        &mut self,
        scrutinee: NodeHandle,
        children: Vec<NodeHandle>,
    ) -> TranslateResult<Option<NodeHandle>> {
        let array = self.array(children)?;
        let body = self.node(NodeKind::BlockStmt, &[array.into()])?;
        let node = self.node(NodeKind::Switch, &[scrutinee.into(), body.into()])?;
        Ok(Some(node))
    }

    fn cast_branch(
        &mut self,
        cast: NodeHandle,
        success: BlockId,
        failure: BlockId,
    ) -> TranslateResult<Option<NodeHandle>> {
        let then_branch = self.goto(success)?;
        let else_branch = self.goto(failure)?;
        let node = self.node(
            NodeKind::IfStmt,
            &[cast.into(), then_branch.into(), else_branch.into()],
        )?;
        Ok(Some(node))
    }
}
