//! Built-in operator classification.
//!
//! | Symbol | Tag | Symbol | Tag |
//! |--------|-----|--------|-----|
//! | `==` | `OP_EQ` | `<` | `OP_LT` |
//! | `!=` | `OP_NE` | `<=` | `OP_LE` |
//! | `+` | `OP_ADD` | `>` | `OP_GT` |
//! | `-` | `OP_SUB` | `>=` | `OP_GE` |
//! | `*` | `OP_MUL` | `!` | `OP_NOT` |
//! | `/` | `OP_DIV` | `~` | `OP_BITNOT` |
//! | `<<` | `OP_LSH` | `&` | `OP_BIT_AND` |
//! | `>>` | `OP_RSH` | `\|` | `OP_BIT_OR` |
//! | | | `^` | `OP_BIT_XOR` |
//!
//! `&&` and `||` short-circuit, which a binary expression node cannot
//! express, so they are left to the generic call lowering.

use crate::ast::Operator;
use crate::ir::ValueId;

/// Native operator tag for a declared operator symbol
pub fn classify(symbol: &str) -> Option<Operator> {
    let op = match symbol {
        "==" => Operator::Eq,
        "!=" => Operator::Ne,
        "+" => Operator::Add,
        "-" => Operator::Sub,
        "*" => Operator::Mul,
        "/" => Operator::Div,
        "<<" => Operator::LShift,
        ">>" => Operator::RShift,
        "<" => Operator::Lt,
        "<=" => Operator::Le,
        ">" => Operator::Gt,
        ">=" => Operator::Ge,
        "!" => Operator::Not,
        "~" => Operator::BitNot,
        "&" => Operator::BitAnd,
        "|" => Operator::BitOr,
        "^" => Operator::BitXor,
        _ => return None,
    };
    Some(op)
}

/// Operand of a unary operator call. The last argument is the metatype the
/// compiler appends to operator calls.
pub fn unary_operand(args: &[ValueId]) -> Option<ValueId> {
    args.len().checked_sub(2).map(|i| args[i])
}

/// Left and right operands of a binary operator call
pub fn binary_operands(args: &[ValueId]) -> (Option<ValueId>, Option<ValueId>) {
    let n = args.len();
    let lhs = n.checked_sub(3).map(|i| args[i]);
    let rhs = n.checked_sub(2).map(|i| args[i]);
    (lhs, rhs)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classify_known_symbols() {
        assert_eq!(classify("+"), Some(Operator::Add));
        assert_eq!(classify("=="), Some(Operator::Eq));
        assert_eq!(classify(">>"), Some(Operator::RShift));
        assert_eq!(classify("~"), Some(Operator::BitNot));
        assert_eq!(classify("^"), Some(Operator::BitXor));
    }

    #[test]
    fn test_short_circuit_operators_are_not_native() {
        assert_eq!(classify("&&"), None);
        assert_eq!(classify("||"), None);
        assert_eq!(classify("+="), None);
    }

    #[test]
    fn test_operand_positions() {
        let args = [ValueId(1), ValueId(2), ValueId(3)];
        assert_eq!(unary_operand(&args), Some(ValueId(2)));
        assert_eq!(binary_operands(&args), (Some(ValueId(1)), Some(ValueId(2))));

        let short = [ValueId(9)];
        assert_eq!(unary_operand(&short), None);
        assert_eq!(binary_operands(&short), (None, None));
        assert_eq!(binary_operands(&[ValueId(4), ValueId(5)]), (None, Some(ValueId(4))));
    }
}
