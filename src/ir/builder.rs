//! Programmatic construction of IR modules.
//!
//! Block and value ids handed out by a [`ModuleBuilder`] are unique across
//! the whole module, which satisfies the uniqueness rules checked by
//! [`Module::validate`](super::Module::validate).

use super::{BasicBlock, BlockId, Fixity, FuncId, Function, InstKind, Instruction, Module, OperatorDecl, ValueId};

/// Builder for constructing a [`Module`]
#[derive(Debug, Default)]
pub struct ModuleBuilder {
    module: Module,
    next_func: u32,
    next_block: u32,
    next_value: u32,
}

impl ModuleBuilder {
    pub fn new(source_file: impl Into<String>) -> Self {
        Self {
            module: Module {
                source_file: Some(source_file.into()),
                functions: Vec::new(),
            },
            ..Self::default()
        }
    }

    /// Declare an external function (no body)
    pub fn declare(&mut self, name: impl Into<String>) -> FuncId {
        let id = self.fresh_func();
        self.module.functions.push(Function {
            id,
            name: name.into(),
            demangled: None,
            operator: None,
            blocks: Vec::new(),
        });
        id
    }

    /// Declare an external operator implementation such as `Int.+`
    pub fn declare_operator(
        &mut self,
        name: impl Into<String>,
        symbol: impl Into<String>,
        fixity: Fixity,
    ) -> FuncId {
        let id = self.declare(name);
        if let Some(func) = self.module.functions.last_mut() {
            func.operator = Some(OperatorDecl::new(symbol, fixity));
        }
        id
    }

    /// Start a function with a body
    pub fn function(&mut self, name: impl Into<String>) -> FunctionBuilder<'_> {
        let id = self.fresh_func();
        FunctionBuilder {
            function: Function {
                id,
                name: name.into(),
                demangled: None,
                operator: None,
                blocks: Vec::new(),
            },
            current: None,
            module: self,
        }
    }

    pub fn build(self) -> Module {
        self.module
    }

    fn fresh_func(&mut self) -> FuncId {
        let id = FuncId(self.next_func);
        self.next_func += 1;
        id
    }

    fn fresh_block(&mut self) -> BlockId {
        let id = BlockId(self.next_block);
        self.next_block += 1;
        id
    }

    fn fresh_value(&mut self) -> ValueId {
        let id = ValueId(self.next_value);
        self.next_value += 1;
        id
    }
}

/// Builder for one function body; [`finish`](Self::finish) adds it to the module
#[derive(Debug)]
pub struct FunctionBuilder<'m> {
    module: &'m mut ModuleBuilder,
    function: Function,
    current: Option<usize>,
}

impl FunctionBuilder<'_> {
    pub fn id(&self) -> FuncId {
        self.function.id
    }

    pub fn set_demangled(&mut self, name: impl Into<String>) {
        self.function.demangled = Some(name.into());
    }

    pub fn set_operator(&mut self, symbol: impl Into<String>, fixity: Fixity) {
        self.function.operator = Some(OperatorDecl::new(symbol, fixity));
    }

    /// Append an empty parameterless block
    pub fn block(&mut self) -> BlockId {
        self.block_with_params(0).0
    }

    /// Append a block taking `count` parameters
    pub fn block_with_params(&mut self, count: usize) -> (BlockId, Vec<ValueId>) {
        let id = self.module.fresh_block();
        let params: Vec<ValueId> = (0..count).map(|_| self.module.fresh_value()).collect();
        self.function.blocks.push(BasicBlock {
            id,
            params: params.clone(),
            instructions: Vec::new(),
        });
        if self.current.is_none() {
            self.current = Some(self.function.blocks.len() - 1);
        }
        (id, params)
    }

    /// Direct subsequent [`push`](Self::push) calls to `block`
    pub fn switch_to(&mut self, block: BlockId) {
        if let Some(index) = self.function.blocks.iter().position(|b| b.id == block) {
            self.current = Some(index);
        }
    }

    /// Append an instruction to the current block, returning its identity
    pub fn push(&mut self, kind: InstKind) -> ValueId {
        let index = match self.current {
            Some(index) => index,
            None => {
                self.block();
                self.function.blocks.len() - 1
            }
        };
        let id = self.module.fresh_value();
        self.function.blocks[index]
            .instructions
            .push(Instruction::new(id, kind));
        id
    }

    pub fn finish(self) -> FuncId {
        let id = self.function.id;
        self.module.module.functions.push(self.function);
        id
    }
}
