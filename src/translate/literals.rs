//! Literal instructions.

use tracing::trace;

use crate::ast::{Literal, NodeHandle};
use crate::ir::{FloatValue, ValueId};

use super::error::TranslateResult;
use super::Translator;

/// Narrowest exact representation of an integer literal: i32, u32, i64,
/// then u64. Wider values are converted to a double.
pub fn integer_literal(value: i128) -> Literal {
    if let Ok(v) = i32::try_from(value) {
        Literal::I32(v)
    } else if let Ok(v) = u32::try_from(value) {
        Literal::U32(v)
    } else if let Ok(v) = i64::try_from(value) {
        Literal::I64(v)
    } else if let Ok(v) = u64::try_from(value) {
        Literal::U64(v)
    } else {
        Literal::F64(value as f64)
    }
}

/// Float literal at its source precision; extended precision becomes a
/// double (including `inf` and `nan`)
pub fn float_literal(value: &FloatValue) -> Literal {
    match value {
        FloatValue::Single(v) => Literal::F32(*v),
        FloatValue::Double(v) => Literal::F64(*v),
        FloatValue::Extended(text) => match text.trim().parse::<f64>() {
            Ok(v) => Literal::F64(v),
            Err(_) => Literal::Decimal(text.clone()),
        },
    }
}

impl Translator<'_> {
    pub(crate) fn translate_integer_literal(
        &mut self,
        id: ValueId,
        value: i128,
    ) -> TranslateResult<Option<NodeHandle>> {
        let literal = integer_literal(value);
        trace!(target: "silcast::translate::literals", %id, value = %value, ?literal, "Integer literal");
        self.context.record_integer(id, value);
        self.literal(id, literal)
    }

    pub(crate) fn translate_float_literal(
        &mut self,
        id: ValueId,
        value: &FloatValue,
    ) -> TranslateResult<Option<NodeHandle>> {
        let literal = float_literal(value);
        trace!(target: "silcast::translate::literals", %id, ?literal, "Float literal");
        self.literal(id, literal)
    }

    pub(crate) fn translate_string_literal(
        &mut self,
        id: ValueId,
        value: &str,
    ) -> TranslateResult<Option<NodeHandle>> {
        trace!(target: "silcast::translate::literals", %id, value, "String literal");
        self.literal(id, Literal::Str(value.to_string()))
    }

    fn literal(&mut self, id: ValueId, literal: Literal) -> TranslateResult<Option<NodeHandle>> {
        let node = self.constant(literal)?;
        self.register(id, node);
        Ok(Some(node))
    }
}
