//! Instruction kinds of the host IR.
//!
//! Operands are listed in the order the translator resolves them. The JSON
//! encoding is internally tagged by `op`, e.g.
//! `{"id": 4, "op": "load", "operand": 2}`.

use serde::{Deserialize, Serialize};

use super::{BlockId, FuncId, ValueId};

/// A call site: callee value, the statically known function (if any), and
/// the argument list
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApplySite {
    pub callee: ValueId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub referenced: Option<FuncId>,
    #[serde(default)]
    pub args: Vec<ValueId>,
}

/// Tail-allocated element of an `alloc_ref`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TailElement {
    pub type_name: String,
    pub count: ValueId,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SwitchCase {
    pub value: ValueId,
    pub dest: BlockId,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EnumCase {
    pub case_name: String,
    pub dest: BlockId,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SelectCase {
    pub case_name: String,
    pub result: ValueId,
}

/// Float literal payload, keeping the source precision
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FloatValue {
    Single(f32),
    Double(f64),
    /// Wider than double; carried as decimal text (`"inf"` and `"nan"` allowed)
    Extended(String),
}

/// Conversions lowered to a CAST node carrying the target type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Conversion {
    Upcast,
    AddressToPointer,
    PointerToAddress,
    UncheckedRefCast,
    UncheckedAddrCast,
    UncheckedTrivialBitCast,
    UncheckedBitwiseCast,
    RefToRawPointer,
    RawPointerToRef,
    RefToUnowned,
    UnownedToRef,
    RefToUnmanaged,
    UnmanagedToRef,
    ConvertEscapeToNoescape,
    BridgeObjectToRef,
    RefToBridgeObject,
    BridgeObjectToWord,
    InitExistentialRef,
    OpenExistentialAddr,
    OpenExistentialValue,
    OpenExistentialRef,
    OpenExistentialBox,
    OpenExistentialBoxValue,
    OpenExistentialMetatype,
    UnconditionalCheckedCast,
}

impl Conversion {
    pub fn mnemonic(self) -> &'static str {
        match self {
            Self::Upcast => "upcast",
            Self::AddressToPointer => "address_to_pointer",
            Self::PointerToAddress => "pointer_to_address",
            Self::UncheckedRefCast => "unchecked_ref_cast",
            Self::UncheckedAddrCast => "unchecked_addr_cast",
            Self::UncheckedTrivialBitCast => "unchecked_trivial_bit_cast",
            Self::UncheckedBitwiseCast => "unchecked_bitwise_cast",
            Self::RefToRawPointer => "ref_to_raw_pointer",
            Self::RawPointerToRef => "raw_pointer_to_ref",
            Self::RefToUnowned => "ref_to_unowned",
            Self::UnownedToRef => "unowned_to_ref",
            Self::RefToUnmanaged => "ref_to_unmanaged",
            Self::UnmanagedToRef => "unmanaged_to_ref",
            Self::ConvertEscapeToNoescape => "convert_escape_to_noescape",
            Self::BridgeObjectToRef => "bridge_object_to_ref",
            Self::RefToBridgeObject => "ref_to_bridge_object",
            Self::BridgeObjectToWord => "bridge_object_to_word",
            Self::InitExistentialRef => "init_existential_ref",
            Self::OpenExistentialAddr => "open_existential_addr",
            Self::OpenExistentialValue => "open_existential_value",
            Self::OpenExistentialRef => "open_existential_ref",
            Self::OpenExistentialBox => "open_existential_box",
            Self::OpenExistentialBoxValue => "open_existential_box_value",
            Self::OpenExistentialMetatype => "open_existential_metatype",
            Self::UnconditionalCheckedCast => "unconditional_checked_cast",
        }
    }
}

/// Conversions that pass their operand through unchanged
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Forwarding {
    ThinToThickFunction,
    ThinFunctionToPointer,
    ConvertFunction,
    UncheckedOwnershipConversion,
}

impl Forwarding {
    pub fn mnemonic(self) -> &'static str {
        match self {
            Self::ThinToThickFunction => "thin_to_thick_function",
            Self::ThinFunctionToPointer => "thin_function_to_pointer",
            Self::ConvertFunction => "convert_function",
            Self::UncheckedOwnershipConversion => "unchecked_ownership_conversion",
        }
    }
}

/// Closed set of instruction kinds
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum InstKind {
    // ---- Allocation and deallocation ----
    AllocStack {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        var_name: Option<String>,
    },
    AllocBox {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        var_name: Option<String>,
    },
    AllocRef {
        type_name: String,
        #[serde(default)]
        tail_elems: Vec<TailElement>,
    },
    AllocGlobal {
        global: String,
    },
    GlobalAddr {
        global: String,
    },
    AllocValueBuffer {
        buffer: ValueId,
        value_type: String,
    },
    ProjectValueBuffer {
        buffer: ValueId,
    },
    DeallocValueBuffer {
        buffer: ValueId,
    },
    AllocExistentialBox {
        concrete_type: String,
        existential_type: String,
    },
    ProjectBox {
        operand: ValueId,
    },
    ProjectExistentialBox {
        operand: ValueId,
    },
    MarkUninitialized {
        operand: ValueId,
    },
    DeallocStack {
        operand: ValueId,
    },
    DeallocBox {
        operand: ValueId,
    },
    DeallocRef {
        operand: ValueId,
    },
    DeallocExistentialBox {
        operand: ValueId,
    },
    DestroyAddr {
        operand: ValueId,
    },
    DestroyValue {
        operand: ValueId,
    },
    DeinitExistentialAddr {
        operand: ValueId,
    },
    DeinitExistentialValue {
        operand: ValueId,
    },
    DebugValue {
        operand: ValueId,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        var_name: Option<String>,
    },
    DebugValueAddr {
        operand: ValueId,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        var_name: Option<String>,
    },
    MarkFunctionEscape {
        #[serde(default)]
        operands: Vec<ValueId>,
    },

    // ---- Memory access ----
    Load {
        operand: ValueId,
    },
    LoadBorrow {
        operand: ValueId,
    },
    BeginBorrow {
        operand: ValueId,
    },
    EndBorrow {
        operand: ValueId,
    },
    Store {
        src: ValueId,
        dest: ValueId,
    },
    Assign {
        src: ValueId,
        dest: ValueId,
    },
    StoreBorrow {
        src: ValueId,
        dest: ValueId,
    },
    CopyAddr {
        src: ValueId,
        dest: ValueId,
    },
    CopyValue {
        operand: ValueId,
    },
    BeginAccess {
        operand: ValueId,
    },
    EndAccess {
        operand: ValueId,
    },
    BeginUnpairedAccess {
        source: ValueId,
        buffer: ValueId,
    },
    EndUnpairedAccess {
        buffer: ValueId,
    },
    IndexAddr {
        base: ValueId,
        index: ValueId,
    },
    TailAddr {
        base: ValueId,
        index: ValueId,
    },
    MarkDependence {
        value: ValueId,
        base: ValueId,
    },

    // ---- Literals ----
    IntegerLiteral {
        #[serde(with = "wide_int")]
        value: i128,
    },
    FloatLiteral {
        value: FloatValue,
    },
    StringLiteral {
        value: String,
    },
    ConstStringLiteral {
        value: String,
    },

    // ---- Functions and calls ----
    FunctionRef {
        function: FuncId,
    },
    Apply {
        #[serde(flatten)]
        site: ApplySite,
    },
    BeginApply {
        #[serde(flatten)]
        site: ApplySite,
    },
    PartialApply {
        #[serde(flatten)]
        site: ApplySite,
    },
    EndApply {
        token: ValueId,
    },
    AbortApply {
        token: ValueId,
    },
    Builtin {
        name: String,
        #[serde(default)]
        args: Vec<ValueId>,
    },
    ClassMethod {
        operand: ValueId,
        member: String,
    },
    WitnessMethod {
        protocol: String,
        member: String,
    },

    // ---- Aggregates and metatypes ----
    Metatype {
        type_name: String,
    },
    ValueMetatype {
        operand: ValueId,
    },
    ExistentialMetatype {
        operand: ValueId,
    },
    Tuple {
        #[serde(default)]
        elements: Vec<ValueId>,
    },
    TupleExtract {
        operand: ValueId,
        field: usize,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        field_name: Option<String>,
        field_type: String,
    },
    TupleElementAddr {
        operand: ValueId,
        field: usize,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        field_name: Option<String>,
        field_type: String,
    },
    Struct {
        type_name: String,
        #[serde(default)]
        fields: Vec<ValueId>,
    },
    StructExtract {
        operand: ValueId,
        field: String,
    },
    StructElementAddr {
        operand: ValueId,
        field: String,
    },
    RefElementAddr {
        operand: ValueId,
        field: String,
    },
    RefTailAddr {
        operand: ValueId,
        tail_type: String,
    },
    Enum {
        enum_name: String,
        case_name: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        payload: Option<ValueId>,
    },
    UncheckedEnumData {
        operand: ValueId,
    },
    InitEnumDataAddr {
        operand: ValueId,
        enum_name: String,
        case_name: String,
    },
    UncheckedTakeEnumDataAddr {
        operand: ValueId,
        enum_name: String,
        case_name: String,
    },
    SelectEnum {
        operand: ValueId,
        enum_name: String,
        cases: Vec<SelectCase>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        default: Option<ValueId>,
    },
    InitExistentialAddr {
        operand: ValueId,
        concrete_type: String,
    },
    InitExistentialValue {
        operand: ValueId,
        concrete_type: String,
    },
    InitExistentialMetatype {
        operand: ValueId,
        concrete_type: String,
    },

    // ---- Conversions ----
    Convert {
        conversion: Conversion,
        operand: ValueId,
        target_type: String,
    },
    Forward {
        conversion: Forwarding,
        operand: ValueId,
    },
    CondFail {
        operand: ValueId,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        message: Option<String>,
    },

    // ---- Terminators ----
    Branch {
        dest: BlockId,
        #[serde(default)]
        args: Vec<ValueId>,
    },
    CondBranch {
        condition: ValueId,
        true_dest: BlockId,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        false_dest: Option<BlockId>,
    },
    SwitchValue {
        operand: ValueId,
        cases: Vec<SwitchCase>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        default: Option<BlockId>,
    },
    SwitchEnum {
        operand: ValueId,
        cases: Vec<EnumCase>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        default: Option<BlockId>,
    },
    SwitchEnumAddr {
        operand: ValueId,
        cases: Vec<EnumCase>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        default: Option<BlockId>,
    },
    CheckedCastBranch {
        operand: ValueId,
        target_type: String,
        success: BlockId,
        failure: BlockId,
    },
    CheckedCastAddrBranch {
        src: ValueId,
        dest: ValueId,
        success: BlockId,
        failure: BlockId,
    },
    TryApply {
        #[serde(flatten)]
        site: ApplySite,
        normal: BlockId,
        error: BlockId,
    },
    Yield {
        #[serde(default)]
        values: Vec<ValueId>,
        resume: BlockId,
        unwind: BlockId,
    },
    Return {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        operand: Option<ValueId>,
    },
    Throw {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        operand: Option<ValueId>,
    },
    Unwind,
    Unreachable,

    /// Any kind the translator has no handler for
    Other {
        name: String,
        #[serde(default)]
        operands: Vec<ValueId>,
    },
}

impl InstKind {
    /// Textual name of the kind, as used in traces
    pub fn mnemonic(&self) -> &str {
        match self {
            Self::AllocStack { .. } => "alloc_stack",
            Self::AllocBox { .. } => "alloc_box",
            Self::AllocRef { .. } => "alloc_ref",
            Self::AllocGlobal { .. } => "alloc_global",
            Self::GlobalAddr { .. } => "global_addr",
            Self::AllocValueBuffer { .. } => "alloc_value_buffer",
            Self::ProjectValueBuffer { .. } => "project_value_buffer",
            Self::DeallocValueBuffer { .. } => "dealloc_value_buffer",
            Self::AllocExistentialBox { .. } => "alloc_existential_box",
            Self::ProjectBox { .. } => "project_box",
            Self::ProjectExistentialBox { .. } => "project_existential_box",
            Self::MarkUninitialized { .. } => "mark_uninitialized",
            Self::DeallocStack { .. } => "dealloc_stack",
            Self::DeallocBox { .. } => "dealloc_box",
            Self::DeallocRef { .. } => "dealloc_ref",
            Self::DeallocExistentialBox { .. } => "dealloc_existential_box",
            Self::DestroyAddr { .. } => "destroy_addr",
            Self::DestroyValue { .. } => "destroy_value",
            Self::DeinitExistentialAddr { .. } => "deinit_existential_addr",
            Self::DeinitExistentialValue { .. } => "deinit_existential_value",
            Self::DebugValue { .. } => "debug_value",
            Self::DebugValueAddr { .. } => "debug_value_addr",
            Self::MarkFunctionEscape { .. } => "mark_function_escape",
            Self::Load { .. } => "load",
            Self::LoadBorrow { .. } => "load_borrow",
            Self::BeginBorrow { .. } => "begin_borrow",
            Self::EndBorrow { .. } => "end_borrow",
            Self::Store { .. } => "store",
            Self::Assign { .. } => "assign",
            Self::StoreBorrow { .. } => "store_borrow",
            Self::CopyAddr { .. } => "copy_addr",
            Self::CopyValue { .. } => "copy_value",
            Self::BeginAccess { .. } => "begin_access",
            Self::EndAccess { .. } => "end_access",
            Self::BeginUnpairedAccess { .. } => "begin_unpaired_access",
            Self::EndUnpairedAccess { .. } => "end_unpaired_access",
            Self::IndexAddr { .. } => "index_addr",
            Self::TailAddr { .. } => "tail_addr",
            Self::MarkDependence { .. } => "mark_dependence",
            Self::IntegerLiteral { .. } => "integer_literal",
            Self::FloatLiteral { .. } => "float_literal",
            Self::StringLiteral { .. } => "string_literal",
            Self::ConstStringLiteral { .. } => "const_string_literal",
            Self::FunctionRef { .. } => "function_ref",
            Self::Apply { .. } => "apply",
            Self::BeginApply { .. } => "begin_apply",
            Self::PartialApply { .. } => "partial_apply",
            Self::EndApply { .. } => "end_apply",
            Self::AbortApply { .. } => "abort_apply",
            Self::Builtin { .. } => "builtin",
            Self::ClassMethod { .. } => "class_method",
            Self::WitnessMethod { .. } => "witness_method",
            Self::Metatype { .. } => "metatype",
            Self::ValueMetatype { .. } => "value_metatype",
            Self::ExistentialMetatype { .. } => "existential_metatype",
            Self::Tuple { .. } => "tuple",
            Self::TupleExtract { .. } => "tuple_extract",
            Self::TupleElementAddr { .. } => "tuple_element_addr",
            Self::Struct { .. } => "struct",
            Self::StructExtract { .. } => "struct_extract",
            Self::StructElementAddr { .. } => "struct_element_addr",
            Self::RefElementAddr { .. } => "ref_element_addr",
            Self::RefTailAddr { .. } => "ref_tail_addr",
            Self::Enum { .. } => "enum",
            Self::UncheckedEnumData { .. } => "unchecked_enum_data",
            Self::InitEnumDataAddr { .. } => "init_enum_data_addr",
            Self::UncheckedTakeEnumDataAddr { .. } => "unchecked_take_enum_data_addr",
            Self::SelectEnum { .. } => "select_enum",
            Self::InitExistentialAddr { .. } => "init_existential_addr",
            Self::InitExistentialValue { .. } => "init_existential_value",
            Self::InitExistentialMetatype { .. } => "init_existential_metatype",
            Self::Convert { conversion, .. } => conversion.mnemonic(),
            Self::Forward { conversion, .. } => conversion.mnemonic(),
            Self::CondFail { .. } => "cond_fail",
            Self::Branch { .. } => "br",
            Self::CondBranch { .. } => "cond_br",
            Self::SwitchValue { .. } => "switch_value",
            Self::SwitchEnum { .. } => "switch_enum",
            Self::SwitchEnumAddr { .. } => "switch_enum_addr",
            Self::CheckedCastBranch { .. } => "checked_cast_br",
            Self::CheckedCastAddrBranch { .. } => "checked_cast_addr_br",
            Self::TryApply { .. } => "try_apply",
            Self::Yield { .. } => "yield",
            Self::Return { .. } => "return",
            Self::Throw { .. } => "throw",
            Self::Unwind => "unwind",
            Self::Unreachable => "unreachable",
            Self::Other { name, .. } => name,
        }
    }

    pub fn is_terminator(&self) -> bool {
        matches!(
            self,
            Self::Branch { .. }
                | Self::CondBranch { .. }
                | Self::SwitchValue { .. }
                | Self::SwitchEnum { .. }
                | Self::SwitchEnumAddr { .. }
                | Self::CheckedCastBranch { .. }
                | Self::CheckedCastAddrBranch { .. }
                | Self::TryApply { .. }
                | Self::Yield { .. }
                | Self::Return { .. }
                | Self::Throw { .. }
                | Self::Unwind
                | Self::Unreachable
        )
    }

    /// Blocks this instruction can transfer control to
    pub fn successors(&self) -> Vec<BlockId> {
        match self {
            Self::Branch { dest, .. } => vec![*dest],
            Self::CondBranch {
                true_dest,
                false_dest,
                ..
            } => std::iter::once(*true_dest).chain(*false_dest).collect(),
            Self::SwitchValue { cases, default, .. } => {
                cases.iter().map(|c| c.dest).chain(*default).collect()
            }
            Self::SwitchEnum { cases, default, .. } | Self::SwitchEnumAddr { cases, default, .. } => {
                cases.iter().map(|c| c.dest).chain(*default).collect()
            }
            Self::CheckedCastBranch {
                success, failure, ..
            }
            | Self::CheckedCastAddrBranch {
                success, failure, ..
            } => vec![*success, *failure],
            Self::TryApply { normal, error, .. } => vec![*normal, *error],
            Self::Yield { resume, unwind, .. } => vec![*resume, *unwind],
            _ => Vec::new(),
        }
    }

    /// Statically referenced function, for `function_ref` and call sites
    pub fn referenced_function(&self) -> Option<FuncId> {
        match self {
            Self::FunctionRef { function } => Some(*function),
            Self::Apply { site }
            | Self::BeginApply { site }
            | Self::PartialApply { site }
            | Self::TryApply { site, .. } => site.referenced,
            _ => None,
        }
    }
}

/// Integer literals span the full signed and unsigned 64-bit ranges and
/// beyond, so they are written as plain JSON numbers when they fit and as
/// decimal strings otherwise.
mod wide_int {
    use std::fmt;

    use serde::de::{self, Visitor};
    use serde::{Deserializer, Serializer};

    pub fn serialize<S: Serializer>(value: &i128, serializer: S) -> Result<S::Ok, S::Error> {
        if let Ok(v) = i64::try_from(*value) {
            serializer.serialize_i64(v)
        } else if let Ok(v) = u64::try_from(*value) {
            serializer.serialize_u64(v)
        } else {
            serializer.serialize_str(&value.to_string())
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<i128, D::Error> {
        deserializer.deserialize_any(WideIntVisitor)
    }

    struct WideIntVisitor;

    impl<'de> Visitor<'de> for WideIntVisitor {
        type Value = i128;

        fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            f.write_str("an integer or a decimal integer string")
        }

        fn visit_i64<E: de::Error>(self, v: i64) -> Result<i128, E> {
            Ok(i128::from(v))
        }

        fn visit_u64<E: de::Error>(self, v: u64) -> Result<i128, E> {
            Ok(i128::from(v))
        }

        fn visit_str<E: de::Error>(self, v: &str) -> Result<i128, E> {
            v.trim()
                .parse::<i128>()
                .map_err(|_| E::invalid_value(de::Unexpected::Str(v), &self))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_successors_of_terminators() {
        let cond = InstKind::CondBranch {
            condition: ValueId(1),
            true_dest: BlockId(2),
            false_dest: None,
        };
        assert_eq!(cond.successors(), vec![BlockId(2)]);

        let switch = InstKind::SwitchValue {
            operand: ValueId(1),
            cases: vec![SwitchCase {
                value: ValueId(2),
                dest: BlockId(3),
            }],
            default: Some(BlockId(4)),
        };
        assert_eq!(switch.successors(), vec![BlockId(3), BlockId(4)]);
        assert!(switch.is_terminator());
        assert!(InstKind::Load { operand: ValueId(0) }.successors().is_empty());
    }

    #[test]
    fn test_wide_integer_encoding() {
        let small = InstKind::IntegerLiteral { value: -5 };
        assert_eq!(
            serde_json::to_string(&small).unwrap(),
            r#"{"op":"integer_literal","value":-5}"#
        );

        let big = InstKind::IntegerLiteral {
            value: i128::from(u64::MAX) + 1,
        };
        let json = serde_json::to_string(&big).unwrap();
        assert_eq!(json, r#"{"op":"integer_literal","value":"18446744073709551616"}"#);
        assert_eq!(serde_json::from_str::<InstKind>(&json).unwrap(), big);

        let unsigned: InstKind =
            serde_json::from_str(r#"{"op":"integer_literal","value":18446744073709551615}"#)
                .unwrap();
        assert_eq!(
            unsigned,
            InstKind::IntegerLiteral {
                value: i128::from(u64::MAX)
            }
        );
    }

    #[test]
    fn test_apply_site_is_flattened() {
        let json = r#"{"op":"apply","callee":3,"referenced":1,"args":[4,5]}"#;
        let kind: InstKind = serde_json::from_str(json).unwrap();
        assert_eq!(kind.referenced_function(), Some(FuncId(1)));
        assert_eq!(kind.mnemonic(), "apply");
    }

    #[test]
    fn test_conversion_mnemonic() {
        let kind: InstKind = serde_json::from_str(
            r#"{"op":"convert","conversion":"unchecked_ref_cast","operand":1,"target_type":"Base"}"#,
        )
        .unwrap();
        assert_eq!(kind.mnemonic(), "unchecked_ref_cast");
    }
}
