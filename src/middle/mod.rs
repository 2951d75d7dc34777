//! Names are resolved on the HIR, which is then rebuilt as MIR where every
//! reference points at a symbol. The MIR is lowered in place until it has the
//! class shaped layout code generation expects.

pub mod hir;
pub mod lowering;
pub mod mir;
pub mod resolve;

/// Value of a literal, shared between HIR and MIR
#[derive(Debug, Clone, PartialEq)]
pub enum ConstValue {
    Number(f64),
    Str(String),
    Bool(bool),
}

impl core::fmt::Display for ConstValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConstValue::Number(value) => write!(f, "Number({value})"),
            ConstValue::Str(value) => write!(f, "Str({value:?})"),
            ConstValue::Bool(value) => write!(f, "Bool({value})"),
        }
    }
}
