//! Host IR model
//!
//! An SSA instruction stream organised as module → function → basic block →
//! instruction. Every instruction and every block parameter owns a
//! [`ValueId`]; blocks are addressed by module-unique [`BlockId`]s and
//! functions by [`FuncId`]s. The translator reads this model and never
//! mutates it.
//!
//! Modules are usually loaded from JSON (see [`Module::from_json`]) or built
//! programmatically with [`ModuleBuilder`].

mod builder;
mod instruction;

use std::collections::{HashMap, HashSet};
use std::fmt;

use serde::de::{self, Deserializer};
use serde::{Deserialize, Serialize};

pub use builder::{FunctionBuilder, ModuleBuilder};
pub use instruction::{
    ApplySite, Conversion, EnumCase, FloatValue, Forwarding, InstKind, SelectCase, SwitchCase,
    TailElement,
};

/// Identity of an instruction result or block parameter
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ValueId(pub u32);

/// Identity of a basic block, unique across a module
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BlockId(pub u32);

/// Identity of a function within a module
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FuncId(pub u32);

impl fmt::Display for ValueId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "%{}", self.0)
    }
}

impl fmt::Display for BlockId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "bb{}", self.0)
    }
}

impl fmt::Display for FuncId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "@{}", self.0)
    }
}

/// How a declared operator function takes its operands
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Fixity {
    Prefix,
    Postfix,
    Infix,
}

/// Operator declaration attached to a function (e.g. `static func + (...)`)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OperatorDecl {
    /// Declared symbol, such as `"+"` or `"=="`
    pub symbol: String,
    pub fixity: Fixity,
}

impl OperatorDecl {
    pub fn new(symbol: impl Into<String>, fixity: Fixity) -> Self {
        Self {
            symbol: symbol.into(),
            fixity,
        }
    }

    pub fn is_unary(&self) -> bool {
        matches!(self.fixity, Fixity::Prefix | Fixity::Postfix)
    }

    pub fn is_binary(&self) -> bool {
        self.fixity == Fixity::Infix
    }
}

/// A single instruction: its identity plus its kind-specific payload
///
/// An `op` tag outside the known set loads as [`InstKind::Other`] named after
/// the tag, keeping its `operands` list when it has one.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Instruction {
    pub id: ValueId,
    #[serde(flatten)]
    pub kind: InstKind,
}

impl<'de> Deserialize<'de> for Instruction {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        #[derive(Deserialize)]
        struct Tagged {
            id: ValueId,
            #[serde(flatten)]
            fields: serde_json::Map<String, serde_json::Value>,
        }

        let Tagged { id, fields } = Tagged::deserialize(deserializer)?;
        let op = fields
            .get("op")
            .and_then(serde_json::Value::as_str)
            .map(str::to_owned);
        let operands = fields.get("operands").cloned();

        match InstKind::deserialize(serde_json::Value::Object(fields)) {
            Ok(kind) => Ok(Self { id, kind }),
            Err(err) => match op {
                Some(name) if is_unknown_op(&err, &name) => {
                    let operands = operands
                        .and_then(|operands| serde_json::from_value(operands).ok())
                        .unwrap_or_default();
                    Ok(Self {
                        id,
                        kind: InstKind::Other { name, operands },
                    })
                }
                _ => Err(de::Error::custom(err)),
            },
        }
    }
}

// serde reports an unmatched internal tag as "unknown variant `<tag>`, ..."
fn is_unknown_op(err: &serde_json::Error, op: &str) -> bool {
    err.to_string()
        .starts_with(&format!("unknown variant `{}`", op))
}

impl Instruction {
    pub fn new(id: ValueId, kind: InstKind) -> Self {
        Self { id, kind }
    }
}

/// A basic block: parameters supplied by predecessors, then instructions
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BasicBlock {
    pub id: BlockId,
    #[serde(default)]
    pub params: Vec<ValueId>,
    #[serde(default)]
    pub instructions: Vec<Instruction>,
}

impl BasicBlock {
    /// The block's terminator, if it has any instructions
    pub fn terminator(&self) -> Option<&Instruction> {
        self.instructions.last()
    }
}

/// A function; one with no blocks is an external declaration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Function {
    pub id: FuncId,
    /// Raw (mangled) symbol name
    pub name: String,
    /// Human-readable name, if different from `name`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub demangled: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub operator: Option<OperatorDecl>,
    #[serde(default)]
    pub blocks: Vec<BasicBlock>,
}

impl Function {
    /// The demangled name, falling back to the raw symbol
    pub fn display_name(&self) -> &str {
        self.demangled.as_deref().unwrap_or(&self.name)
    }

    pub fn is_declaration(&self) -> bool {
        self.blocks.is_empty()
    }

    pub fn block(&self, id: BlockId) -> Option<&BasicBlock> {
        self.blocks.iter().find(|b| b.id == id)
    }
}

/// A translation unit
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Module {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_file: Option<String>,
    #[serde(default)]
    pub functions: Vec<Function>,
}

impl Module {
    /// Source file name for diagnostics
    pub fn source_name(&self) -> &str {
        match self.source_file.as_deref() {
            Some(name) if !name.is_empty() => name,
            _ => "N/A",
        }
    }

    pub fn function(&self, id: FuncId) -> Option<&Function> {
        self.functions.iter().find(|f| f.id == id)
    }

    /// Parse a module from its JSON encoding and validate it
    pub fn from_json(text: &str) -> Result<Self, ModuleError> {
        let module: Module =
            serde_json::from_str(text).map_err(|e| ModuleError::Parse(e.to_string()))?;
        module.validate()?;
        Ok(module)
    }

    pub fn to_json(&self) -> Result<String, ModuleError> {
        serde_json::to_string_pretty(self).map_err(|e| ModuleError::Parse(e.to_string()))
    }

    /// Check the structural invariants the translator relies on:
    /// unique function ids, module-unique block ids, function-unique value
    /// ids, and successor/callee references that resolve.
    pub fn validate(&self) -> Result<(), ModuleError> {
        let mut funcs = HashSet::new();
        for func in &self.functions {
            if !funcs.insert(func.id) {
                return Err(ModuleError::DuplicateFunction(func.id));
            }
        }

        let mut blocks = HashSet::new();
        for func in &self.functions {
            let mut values = HashSet::new();
            for block in &func.blocks {
                if !blocks.insert(block.id) {
                    return Err(ModuleError::DuplicateBlock(block.id));
                }
                let ids = block
                    .params
                    .iter()
                    .copied()
                    .chain(block.instructions.iter().map(|inst| inst.id));
                for id in ids {
                    if !values.insert(id) {
                        return Err(ModuleError::DuplicateValue {
                            function: func.name.clone(),
                            value: id,
                        });
                    }
                }
            }

            let local: HashMap<BlockId, usize> = func
                .blocks
                .iter()
                .map(|b| (b.id, b.params.len()))
                .collect();
            for block in &func.blocks {
                for inst in &block.instructions {
                    for target in inst.kind.successors() {
                        if !local.contains_key(&target) {
                            return Err(ModuleError::UnknownBlock {
                                function: func.name.clone(),
                                block: target,
                            });
                        }
                    }
                    if let InstKind::Branch { dest, args } = &inst.kind {
                        let expected = local.get(dest).copied().unwrap_or_default();
                        if expected != args.len() {
                            return Err(ModuleError::BranchArity {
                                function: func.name.clone(),
                                block: *dest,
                                expected,
                                got: args.len(),
                            });
                        }
                    }
                    if let Some(callee) = inst.kind.referenced_function() {
                        if !funcs.contains(&callee) {
                            return Err(ModuleError::UnknownFunction(callee));
                        }
                    }
                }
            }
        }
        Ok(())
    }
}

/// Errors raised while loading or validating a module
#[derive(Debug, Clone, PartialEq)]
pub enum ModuleError {
    /// Malformed JSON or an unknown instruction encoding
    Parse(String),
    /// Two functions share an id
    DuplicateFunction(FuncId),
    /// Two blocks share an id
    DuplicateBlock(BlockId),
    /// A value id is defined twice within a function
    DuplicateValue { function: String, value: ValueId },
    /// A terminator targets a block outside its function
    UnknownBlock { function: String, block: BlockId },
    /// An instruction references a function not in the module
    UnknownFunction(FuncId),
    /// A branch passes the wrong number of block arguments
    BranchArity {
        function: String,
        block: BlockId,
        expected: usize,
        got: usize,
    },
}

impl fmt::Display for ModuleError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Parse(msg) => write!(f, "Malformed module: {}", msg),
            Self::DuplicateFunction(id) => write!(f, "Duplicate function id {}", id),
            Self::DuplicateBlock(id) => write!(f, "Duplicate block id {}", id),
            Self::DuplicateValue { function, value } => {
                write!(f, "Value {} defined twice in '{}'", value, function)
            }
            Self::UnknownBlock { function, block } => {
                write!(f, "Unknown successor {} in '{}'", block, function)
            }
            Self::UnknownFunction(id) => write!(f, "Reference to unknown function {}", id),
            Self::BranchArity {
                function,
                block,
                expected,
                got,
            } => write!(
                f,
                "Branch to {} in '{}' passes {} arguments, block takes {}",
                block, function, got, expected
            ),
        }
    }
}

impl std::error::Error for ModuleError {}

#[cfg(test)]
mod tests {
    use super::*;

    fn tiny_module() -> Module {
        let mut builder = ModuleBuilder::new("tiny.swift");
        let mut main = builder.function("main");
        let entry = main.block();
        let exit = main.block();
        main.switch_to(entry);
        main.push(InstKind::Branch {
            dest: exit,
            args: vec![],
        });
        main.switch_to(exit);
        main.push(InstKind::Return { operand: None });
        main.finish();
        builder.build()
    }

    #[test]
    fn test_source_name_fallback() {
        let mut module = Module::default();
        assert_eq!(module.source_name(), "N/A");
        module.source_file = Some(String::new());
        assert_eq!(module.source_name(), "N/A");
        module.source_file = Some("main.swift".to_string());
        assert_eq!(module.source_name(), "main.swift");
    }

    #[test]
    fn test_display_name_prefers_demangled() {
        let mut func = Function {
            id: FuncId(0),
            name: "$s4main3fooyyF".to_string(),
            demangled: None,
            operator: None,
            blocks: vec![],
        };
        assert_eq!(func.display_name(), "$s4main3fooyyF");
        assert!(func.is_declaration());
        func.demangled = Some("main.foo() -> ()".to_string());
        assert_eq!(func.display_name(), "main.foo() -> ()");
    }

    #[test]
    fn test_validate_accepts_builder_output() {
        assert_eq!(tiny_module().validate(), Ok(()));
    }

    #[test]
    fn test_validate_rejects_unknown_successor() {
        let mut module = tiny_module();
        module.functions[0].blocks[0].instructions[0].kind = InstKind::Branch {
            dest: BlockId(99),
            args: vec![],
        };
        assert!(matches!(
            module.validate(),
            Err(ModuleError::UnknownBlock { block: BlockId(99), .. })
        ));
    }

    #[test]
    fn test_validate_rejects_branch_arity_mismatch() {
        let mut module = tiny_module();
        let dest = module.functions[0].blocks[1].id;
        module.functions[0].blocks[0].instructions[0].kind = InstKind::Branch {
            dest,
            args: vec![ValueId(0)],
        };
        assert!(matches!(
            module.validate(),
            Err(ModuleError::BranchArity { expected: 0, got: 1, .. })
        ));
    }

    #[test]
    fn test_validate_rejects_duplicate_values() {
        let mut module = tiny_module();
        let id = module.functions[0].blocks[0].instructions[0].id;
        module.functions[0].blocks[1].instructions[0].id = id;
        assert!(matches!(
            module.validate(),
            Err(ModuleError::DuplicateValue { .. })
        ));
    }

    #[test]
    fn test_json_round_trip_keeps_instruction_encoding() {
        let module = tiny_module();
        let json = module.to_json().unwrap();
        assert!(json.contains("\"op\": \"branch\""));
        let parsed = Module::from_json(&json).unwrap();
        assert_eq!(parsed, module);
    }

    #[test]
    fn test_from_json_reports_parse_errors() {
        let err = Module::from_json("{\"functions\": 3}").unwrap_err();
        assert!(matches!(err, ModuleError::Parse(_)));
    }

    #[test]
    fn test_unknown_op_loads_as_other() {
        let json = r#"{
            "functions": [{
                "id": 0,
                "name": "f",
                "blocks": [{
                    "id": 0,
                    "params": [0],
                    "instructions": [
                        {"id": 1, "op": "fix_lifetime", "operands": [0]},
                        {"id": 2, "op": "hop_to_executor", "actor": "main"},
                        {"id": 3, "op": "return"}
                    ]
                }]
            }]
        }"#;
        let module = Module::from_json(json).unwrap();
        let instructions = &module.functions[0].blocks[0].instructions;
        assert_eq!(
            instructions[0].kind,
            InstKind::Other {
                name: "fix_lifetime".to_string(),
                operands: vec![ValueId(0)],
            }
        );
        assert_eq!(
            instructions[1].kind,
            InstKind::Other {
                name: "hop_to_executor".to_string(),
                operands: vec![],
            }
        );
        assert_eq!(instructions[2].kind, InstKind::Return { operand: None });
    }

    #[test]
    fn test_malformed_known_op_is_rejected() {
        let json = r#"{
            "functions": [{
                "id": 0,
                "name": "f",
                "blocks": [{
                    "id": 0,
                    "instructions": [{"id": 1, "op": "load"}]
                }]
            }]
        }"#;
        assert!(matches!(Module::from_json(json), Err(ModuleError::Parse(_))));
    }
}
