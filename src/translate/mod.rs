//! SSA-to-AST reconstruction engine
//!
//! Walks a [`Module`] function by function and block by block, turning each
//! instruction into at most one AST node through an injected
//! [`AstFactory`]. The engine handles:
//! - Literals (integers at their narrowest width, floats, strings)
//! - Memory: allocations become named variables; loads and stores resolve
//!   through them
//! - Calls, with built-in operators lowered to unary/binary expressions
//! - Aggregates (tuples, structs, enums) as object literals and references
//! - Conversions as casts
//! - Terminators as gotos, ifs, switches, returns and throws
//!
//! Nodes a block produced but never consumed become that block's
//! statements: `BLOCK_STMT(LABEL_STMT(label, first), rest...)`.
//!
//! | Scope | State | Reset |
//! |-------|-------|-------|
//! | function | variable names, block parameters, integer literals | function entry |
//! | block | pending nodes, statement sequence | block entry |

mod aggregates;
mod calls;
mod context;
mod control_flow;
mod conversions;
mod error;
mod labeller;
mod literals;
mod memory;
pub mod operators;
mod registry;


use std::path::Path;

use tracing::{debug, info, trace};

use crate::ast::{ArrayHandle, AstFactory, Child, Literal, NodeHandle, NodeKind};
use crate::config::TranslatorConfig;
use crate::ir::{BasicBlock, BlockId, FuncId, Function, InstKind, Instruction, Module, ValueId};

pub use context::TranslationContext;
pub use error::{TranslateError, TranslateResult};
pub use labeller::BlockLabeller;
pub use literals::{float_literal, integer_literal};
pub use registry::{Key, PendingNodes, VariableTable};

/// Counters collected during a translation
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TranslationStats {
    /// Functions with a body that were walked
    pub functions: usize,
    /// External declarations skipped
    pub declarations: usize,
    /// Blocks walked
    pub blocks: usize,
    /// Blocks that produced a `BLOCK_STMT`
    pub blocks_emitted: usize,
    /// Instructions visited
    pub instructions: usize,
    /// Instructions that produced a node
    pub nodes_produced: usize,
    /// Instructions with no handler
    pub unhandled: usize,
}

impl TranslationStats {
    pub fn new() -> Self {
        Self::default()
    }
}

/// Block statements produced for one function
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FunctionOutput {
    pub id: FuncId,
    pub name: String,
    /// One `BLOCK_STMT` per non-empty block, in block order
    pub blocks: Vec<NodeHandle>,
}

/// Result of translating a module
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TranslationOutput {
    pub functions: Vec<FunctionOutput>,
    pub stats: TranslationStats,
}

/// Instruction-to-AST translator
pub struct Translator<'a> {
    module: &'a Module,
    factory: &'a mut dyn AstFactory,
    config: &'a TranslatorConfig,
    labeller: BlockLabeller,
    /// Identity registry
    pub(crate) context: TranslationContext,
    stats: TranslationStats,
}

impl<'a> Translator<'a> {
    pub fn new(
        module: &'a Module,
        factory: &'a mut dyn AstFactory,
        config: &'a TranslatorConfig,
    ) -> Self {
        Self {
            module,
            factory,
            config,
            labeller: BlockLabeller::new(config.block_label_prefix.clone()),
            context: TranslationContext::new(),
            stats: TranslationStats::new(),
        }
    }

    /// Translate every function of the module, printing each function's
    /// block statements once the function is complete
    pub fn translate(mut self) -> TranslateResult<TranslationOutput> {
        let module = self.module;
        info!(
            target: "silcast::translate",
            source = module.source_name(),
            functions = module.functions.len(),
            "Translating module"
        );

        let mut functions = Vec::new();
        for func in &module.functions {
            if func.is_declaration() {
                trace!(target: "silcast::translate", function = func.display_name(), "Skipping declaration");
                self.stats.declarations += 1;
                continue;
            }
            functions.push(self.walk_function(func)?);
        }

        info!(
            target: "silcast::translate",
            source = module.source_name(),
            blocks = self.stats.blocks_emitted,
            unhandled = self.stats.unhandled,
            "Module translated"
        );
        Ok(TranslationOutput {
            functions,
            stats: self.stats,
        })
    }

    pub(crate) fn enter_function(&mut self, func: &Function) {
        self.context.begin_function(func);
    }

    fn walk_function(&mut self, func: &Function) -> TranslateResult<FunctionOutput> {
        debug!(
            target: "silcast::translate",
            function = func.display_name(),
            blocks = func.blocks.len(),
            "Walking function"
        );
        self.enter_function(func);

        let mut blocks = Vec::with_capacity(func.blocks.len());
        for block in &func.blocks {
            if let Some(stmt) = self.walk_block(block)? {
                blocks.push(stmt);
            }
        }
        for &stmt in &blocks {
            self.factory.print(stmt)?;
        }

        self.stats.functions += 1;
        Ok(FunctionOutput {
            id: func.id,
            name: func.display_name().to_string(),
            blocks,
        })
    }

    fn walk_block(&mut self, block: &BasicBlock) -> TranslateResult<Option<NodeHandle>> {
        self.context.begin_block();
        self.stats.blocks += 1;

        for inst in &block.instructions {
            self.stats.instructions += 1;
            if let Some(node) = self.translate_instruction(inst)? {
                self.stats.nodes_produced += 1;
                self.context.push_statement(node);
            }
        }

        let statements = self.context.take_statements();
        let Some((&first, rest)) = statements.split_first() else {
            debug!(target: "silcast::translate", block = %block.id, "Block produced no statements");
            return Ok(None);
        };

        let label = self.labeller.label(block.id);
        let label = self.constant(label)?;
        let labelled = self.node(NodeKind::LabelStmt, &[label.into(), first.into()])?;
        let mut children = Vec::with_capacity(statements.len());
        children.push(labelled);
        children.extend_from_slice(rest);
        let array = self.array(children)?;
        let stmt = self.node(NodeKind::BlockStmt, &[array.into()])?;

        debug!(
            target: "silcast::translate",
            block = %block.id,
            statements = statements.len(),
            "Block emitted"
        );
        self.stats.blocks_emitted += 1;
        Ok(Some(stmt))
    }

    /// Translate one instruction, returning its statement-level node, if any
    pub(crate) fn translate_instruction(
        &mut self,
        inst: &Instruction,
    ) -> TranslateResult<Option<NodeHandle>> {
        let id = inst.id;
        trace!(target: "silcast::translate", %id, op = inst.kind.mnemonic(), "Visiting instruction");

        match &inst.kind {
            // Allocation and deallocation
            InstKind::AllocStack { var_name } | InstKind::AllocBox { var_name } => {
                self.translate_alloc(id, var_name.as_deref())
            }
            InstKind::AllocRef {
                type_name,
                tail_elems,
            } => self.translate_alloc_ref(id, type_name, tail_elems),
            InstKind::AllocGlobal { global } => self.translate_alloc_global(global),
            InstKind::GlobalAddr { global } => self.translate_global_addr(id, global),
            InstKind::AllocValueBuffer { buffer, value_type } => {
                self.translate_alloc_value_buffer(*buffer, value_type)
            }
            InstKind::AllocExistentialBox {
                concrete_type,
                existential_type,
            } => self.translate_alloc_existential_box(id, concrete_type, existential_type),
            InstKind::ProjectValueBuffer { buffer: operand }
            | InstKind::ProjectBox { operand }
            | InstKind::ProjectExistentialBox { operand }
            | InstKind::MarkUninitialized { operand } => self.translate_projection(id, *operand),
            InstKind::DeallocValueBuffer { buffer: operand }
            | InstKind::DeallocBox { operand }
            | InstKind::DeallocRef { operand } => self.translate_dealloc(*operand),
            InstKind::DeallocStack { .. } | InstKind::MarkFunctionEscape { .. } => Ok(None),
            InstKind::DeallocExistentialBox { operand }
            | InstKind::DestroyAddr { operand }
            | InstKind::DestroyValue { operand }
            | InstKind::DeinitExistentialAddr { operand }
            | InstKind::DeinitExistentialValue { operand } => self.translate_destroy(*operand),
            InstKind::DebugValue { operand, var_name }
            | InstKind::DebugValueAddr { operand, var_name } => {
                self.translate_debug_value(*operand, var_name.as_deref())
            }

            // Memory access
            InstKind::Load { operand } => self.translate_load(id, *operand),
            InstKind::LoadBorrow { operand } | InstKind::BeginBorrow { operand } => {
                self.translate_forward(id, *operand, true)
            }
            InstKind::CopyValue { operand } | InstKind::BeginAccess { operand } => {
                self.translate_forward(id, *operand, false)
            }
            InstKind::EndBorrow { operand } | InstKind::EndAccess { operand } => {
                self.translate_end_scope(*operand)
            }
            InstKind::Store { src, dest } => self.translate_store(*src, *dest),
            InstKind::Assign { src, dest }
            | InstKind::StoreBorrow { src, dest }
            | InstKind::CopyAddr { src, dest } => self.translate_assign(id, *src, *dest),
            InstKind::BeginUnpairedAccess { source, buffer } => {
                self.translate_begin_unpaired_access(*source, *buffer)
            }
            InstKind::EndUnpairedAccess { buffer } => self.translate_end_unpaired_access(*buffer),
            InstKind::IndexAddr { base, index } | InstKind::TailAddr { base, index } => {
                self.translate_array_ref(id, *base, *index)
            }
            InstKind::MarkDependence { value, base } => {
                self.translate_mark_dependence(id, *value, *base)
            }

            // Literals
            InstKind::IntegerLiteral { value } => self.translate_integer_literal(id, *value),
            InstKind::FloatLiteral { value } => self.translate_float_literal(id, value),
            InstKind::StringLiteral { value } | InstKind::ConstStringLiteral { value } => {
                self.translate_string_literal(id, value)
            }

            // Functions and calls
            InstKind::FunctionRef { function } => self.translate_function_ref(id, *function),
            InstKind::Apply { site }
            | InstKind::BeginApply { site }
            | InstKind::PartialApply { site } => self.translate_apply(id, site),
            InstKind::EndApply { token } | InstKind::AbortApply { token } => {
                self.translate_end_apply(*token)
            }
            InstKind::Builtin { name, args } => self.translate_builtin(id, name, args),
            InstKind::ClassMethod { operand, member } => {
                self.translate_class_method(id, *operand, member)
            }
            InstKind::WitnessMethod { protocol, member } => {
                self.translate_witness_method(id, protocol, member)
            }

            // Aggregates and metatypes
            InstKind::Metatype { type_name } => self.translate_metatype(id, type_name),
            InstKind::ValueMetatype { operand }
            | InstKind::ExistentialMetatype { operand }
            | InstKind::UncheckedEnumData { operand } => self.translate_forward(id, *operand, true),
            InstKind::Tuple { elements } => self.translate_tuple(id, elements),
            InstKind::TupleExtract {
                operand,
                field_name,
                field_type,
                ..
            }
            | InstKind::TupleElementAddr {
                operand,
                field_name,
                field_type,
                ..
            } => self.translate_tuple_extract(id, *operand, field_name.as_deref(), field_type),
            InstKind::Struct { type_name, fields } => self.translate_struct(id, type_name, fields),
            InstKind::StructExtract { operand, field }
            | InstKind::StructElementAddr { operand, field }
            | InstKind::RefElementAddr { operand, field } => {
                self.translate_field_ref(id, *operand, field)
            }
            InstKind::RefTailAddr { operand, tail_type } => {
                self.translate_ref_tail_addr(id, *operand, tail_type)
            }
            InstKind::Enum {
                enum_name,
                case_name,
                payload,
            } => self.translate_enum(id, enum_name, case_name, *payload),
            InstKind::InitEnumDataAddr {
                operand,
                enum_name,
                case_name,
            } => self.translate_init_enum_data_addr(id, *operand, enum_name, case_name),
            InstKind::UncheckedTakeEnumDataAddr {
                operand,
                enum_name,
                case_name,
            } => self.translate_take_enum_data_addr(id, *operand, enum_name, case_name),
            InstKind::SelectEnum {
                operand,
                enum_name,
                cases,
                default,
            } => self.translate_select_enum(id, *operand, enum_name, cases, *default),
            InstKind::InitExistentialAddr {
                operand,
                concrete_type,
            } => self.translate_init_existential(id, "ExistentialAddr", *operand, concrete_type),
            InstKind::InitExistentialValue {
                operand,
                concrete_type,
            } => self.translate_init_existential(id, "ExistentialValue", *operand, concrete_type),
            InstKind::InitExistentialMetatype {
                operand,
                concrete_type,
            } => {
                self.translate_init_existential(id, "ExistentialMetatype", *operand, concrete_type)
            }

            // Conversions
            InstKind::Convert {
                conversion,
                operand,
                target_type,
            } => self.translate_cast(id, *conversion, *operand, target_type),
            InstKind::Forward {
                conversion,
                operand,
            } => self.translate_forwarding(id, *conversion, *operand),
            InstKind::CondFail { operand, message } => {
                self.translate_cond_fail(id, *operand, message.as_deref())
            }

            // Terminators
            InstKind::Branch { dest, args } => self.translate_branch(*dest, args),
            InstKind::CondBranch {
                condition,
                true_dest,
                false_dest,
            } => self.translate_cond_branch(*condition, *true_dest, *false_dest),
            InstKind::SwitchValue {
                operand,
                cases,
                default,
            } => self.translate_switch_value(*operand, cases, *default),
            InstKind::SwitchEnum {
                operand,
                cases,
                default,
            }
            | InstKind::SwitchEnumAddr {
                operand,
                cases,
                default,
            } => self.translate_switch_enum(*operand, cases, *default),
            InstKind::CheckedCastBranch {
                operand,
                target_type,
                success,
                failure,
            } => self.translate_checked_cast_branch(*operand, target_type, *success, *failure),
            InstKind::CheckedCastAddrBranch {
                src,
                dest,
                success,
                failure,
            } => self.translate_checked_cast_addr_branch(*src, *dest, *success, *failure),
            InstKind::TryApply { site, normal, .. } => self.translate_try_apply(id, site, *normal),
            InstKind::Yield {
                values,
                resume,
                unwind,
            } => self.translate_yield(id, values, *resume, *unwind),
            InstKind::Return { operand } => self.translate_exit(NodeKind::Return, *operand),
            InstKind::Throw { operand } => self.translate_exit(NodeKind::Throw, *operand),
            InstKind::Unwind => Ok(Some(self.leaf(NodeKind::Unwind)?)),
            InstKind::Unreachable => {
                trace!(target: "silcast::translate::control_flow", "Unreachable");
                Ok(None)
            }

            InstKind::Other { name, operands } => {
                debug!(
                    target: "silcast::translate",
                    %id,
                    kind = name.as_str(),
                    operands = operands.len(),
                    "No handler for instruction kind"
                );
                self.stats.unhandled += 1;
                Ok(None)
            }
        }
    }

    // ---- Node construction helpers ----

    pub(crate) fn node(&mut self, kind: NodeKind, children: &[Child]) -> TranslateResult<NodeHandle> {
        Ok(self.factory.make_node(kind, children)?)
    }

    pub(crate) fn leaf(&mut self, kind: NodeKind) -> TranslateResult<NodeHandle> {
        self.node(kind, &[])
    }

    pub(crate) fn constant(&mut self, value: impl Into<Literal>) -> TranslateResult<NodeHandle> {
        Ok(self.factory.make_constant(value.into())?)
    }

    /// `VAR(CONSTANT name)`
    pub(crate) fn var(&mut self, name: &str) -> TranslateResult<NodeHandle> {
        let name = self.constant(name)?;
        self.node(NodeKind::Var, &[name.into()])
    }

    /// `GOTO(CONSTANT label)`
    pub(crate) fn goto(&mut self, block: BlockId) -> TranslateResult<NodeHandle> {
        let label = self.labeller.label(block);
        let label = self.constant(label)?;
        self.node(NodeKind::Goto, &[label.into()])
    }

    pub(crate) fn array(&mut self, nodes: Vec<NodeHandle>) -> TranslateResult<ArrayHandle> {
        Ok(self.factory.make_array(nodes)?)
    }

    // ---- Registry helpers ----

    /// Find-and-remove an operand
    pub(crate) fn resolve(&mut self, key: impl Into<Key>) -> TranslateResult<Option<NodeHandle>> {
        Ok(self.context.find_and_remove(&mut *self.factory, key)?)
    }

    /// Find-and-remove an operand, substituting `EMPTY` when absent
    pub(crate) fn resolve_or_empty(&mut self, key: impl Into<Key>) -> TranslateResult<NodeHandle> {
        match self.resolve(key)? {
            Some(node) => Ok(node),
            None => self.leaf(NodeKind::Empty),
        }
    }

    /// Find-and-remove each operand in order, skipping absent ones
    pub(crate) fn resolve_all(&mut self, ids: &[ValueId]) -> TranslateResult<Vec<NodeHandle>> {
        let mut nodes = Vec::with_capacity(ids.len());
        for &id in ids {
            if let Some(node) = self.resolve(id)? {
                nodes.push(node);
            }
        }
        Ok(nodes)
    }

    pub(crate) fn register(&mut self, id: ValueId, node: NodeHandle) {
        self.context.pending_insert(id, node);
    }
}

/// Read a JSON module from disk and validate it
pub fn load_module(path: &Path) -> TranslateResult<Module> {
    let text = std::fs::read_to_string(path).map_err(|e| TranslateError::Io {
        path: path.display().to_string(),
        message: e.to_string(),
    })?;
    let module = Module::from_json(&text)?;
    debug!(
        target: "silcast::translate",
        path = %path.display(),
        functions = module.functions.len(),
        "Module loaded"
    );
    Ok(module)
}

/// Translate `module` with `factory`.
pub fn translate_module(
    module: &Module,
    factory: &mut dyn AstFactory,
    config: &TranslatorConfig,
) -> TranslateResult<TranslationOutput> {
    Translator::new(module, factory, config).translate()
}
