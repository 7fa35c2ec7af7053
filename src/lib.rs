/// silcast - SSA to CAst Reconstruction Library
///
/// This library rebuilds a nested, statement-oriented abstract syntax tree
/// from a flat SSA instruction stream. Values defined by one instruction are
/// folded into the expressions that consume them; whatever a block leaves
/// unconsumed becomes one of its statements.
///
/// # Architecture
///
/// The pipeline consists of three stages:
///
/// 1. **Host IR** (`ir` module)
///    - Module → function → basic block → instruction model
///    - JSON loading with structural validation
///    - `ModuleBuilder` for programmatic construction
///
/// 2. **Translation** (`translate` module)
///    - Identity registry: variable names per function, pending nodes per block
///    - One handler per instruction kind
///    - Native operators lowered to unary/binary expressions
///    - Terminators lowered to gotos, ifs and switches over block labels
///
/// 3. **AST construction** (`ast` module)
///    - `AstFactory` trait the translator builds nodes through
///    - `TreeFactory` arena with S-expression rendering
///
/// # Example
///
/// ```rust
/// use silcast::{translate_module, InstKind, ModuleBuilder, TranslatorConfig, TreeFactory};
///
/// let mut builder = ModuleBuilder::new("main.swift");
/// let mut main = builder.function("main");
/// let answer = main.push(InstKind::IntegerLiteral { value: 42 });
/// main.push(InstKind::Return { operand: Some(answer) });
/// main.finish();
/// let module = builder.build();
///
/// let mut tree = TreeFactory::new();
/// translate_module(&module, &mut tree, &TranslatorConfig::default()).unwrap();
/// assert_eq!(
///     tree.printed(),
///     &["(BLOCK_STMT\n  (LABEL_STMT \"BLOCK #0\" (RETURN 42)))".to_string()]
/// );
/// ```
///
/// # Output Shape
///
/// - **Blocks**: `BLOCK_STMT(LABEL_STMT(label, first), rest...)`
/// - **Variables**: allocations and block parameters become `VAR(name)`
/// - **Control flow**: unstructured; every successor is a `GOTO(label)`
/// - **Missing operands**: `EMPTY` nodes, never errors

pub mod ast;
pub mod config;
pub mod ir;
pub mod translate;

pub use ast::{AstFactory, FactoryError, Literal, NodeHandle, NodeKind, Operator, TreeFactory};
pub use config::{ConfigError, TranslatorConfig};
pub use ir::{InstKind, Module, ModuleBuilder, ModuleError};
pub use translate::{
    load_module, translate_module, TranslateError, TranslateResult, TranslationOutput,
    TranslationStats, Translator,
};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_translate_json_module() {
        let json = r#"{
            "source_file": "inc.swift",
            "functions": [{
                "id": 0,
                "name": "inc",
                "blocks": [{
                    "id": 0,
                    "params": [0],
                    "instructions": [
                        {"id": 1, "op": "debug_value", "operand": 0, "var_name": "x"},
                        {"id": 2, "op": "return", "operand": 0}
                    ]
                }]
            }]
        }"#;
        let module = Module::from_json(json).unwrap();
        let mut tree = TreeFactory::new();
        let output = translate_module(&module, &mut tree, &TranslatorConfig::default()).unwrap();

        assert_eq!(output.functions.len(), 1);
        assert_eq!(
            tree.render(output.functions[0].blocks[0]).unwrap(),
            "(BLOCK_STMT (LABEL_STMT \"BLOCK #0\" (RETURN (VAR \"x\"))))"
        );
    }

    #[test]
    fn test_invalid_module_is_rejected() {
        let json = r#"{
            "functions": [{
                "id": 0,
                "name": "f",
                "blocks": [{
                    "id": 0,
                    "instructions": [{"id": 1, "op": "branch", "dest": 5}]
                }]
            }]
        }"#;
        assert!(Module::from_json(json).is_err());
    }

    #[test]
    fn test_empty_module() {
        let module = Module::default();
        let mut tree = TreeFactory::new();
        let output = translate_module(&module, &mut tree, &TranslatorConfig::default()).unwrap();
        assert!(output.functions.is_empty());
        assert!(tree.is_empty());
    }
}
