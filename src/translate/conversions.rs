//! Casts, forwarding conversions and runtime checks.

use tracing::trace;

use crate::ast::{NodeHandle, NodeKind};
use crate::ir::{Conversion, Forwarding, ValueId};

use super::error::TranslateResult;
use super::Translator;

impl Translator<'_> {
    /// `CAST(operand, CONSTANT target_type)`
    pub(crate) fn translate_cast(
        &mut self,
        id: ValueId,
        conversion: Conversion,
        operand: ValueId,
        target_type: &str,
    ) -> TranslateResult<Option<NodeHandle>> {
        trace!(
            target: "silcast::translate::conversions",
            %id,
            %operand,
            conversion = conversion.mnemonic(),
            target_type,
            "Cast"
        );
        let node = self.cast(operand, target_type)?;
        self.register(id, node);
        Ok(Some(node))
    }

    /// Function-type and ownership conversions keep the operand's node
    pub(crate) fn translate_forwarding(
        &mut self,
        id: ValueId,
        conversion: Forwarding,
        operand: ValueId,
    ) -> TranslateResult<Option<NodeHandle>> {
        trace!(target: "silcast::translate::conversions", %id, conversion = conversion.mnemonic(), "Forwarding conversion");
        self.translate_forward(id, operand, true)
    }

    pub(crate) fn translate_cond_fail(
        &mut self,
        id: ValueId,
        operand: ValueId,
        message: Option<&str>,
    ) -> TranslateResult<Option<NodeHandle>> {
        trace!(target: "silcast::translate::conversions", %id, %operand, ?message, "Condition check");
        let condition = self.resolve_or_empty(operand)?;
        let node = self.node(NodeKind::Assert, &[condition.into()])?;
        self.register(id, node);
        Ok(Some(node))
    }

    pub(crate) fn cast(&mut self, operand: ValueId, target_type: &str) -> TranslateResult<NodeHandle> {
        let value = self.resolve_or_empty(operand)?;
        let ty = self.constant(target_type)?;
        self.node(NodeKind::Cast, &[value.into(), ty.into()])
    }
}
