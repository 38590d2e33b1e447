//! Boundary to the embedded expression language.
//!
//! The interpreter itself is an external collaborator. This module only
//! defines the value type it produces, the per-call variable-binding
//! context it reads, and the trait a concrete interpreter plugs into.

use crate::core::error::Result;
use ahash::AHashMap;
use serde::{Deserialize, Serialize};
use std::fmt;

/// A typed value produced by expression evaluation or carried as a
/// measurement result.
///
/// Arithmetic expressions always evaluate to `Float` (double precision),
/// which downstream key encoding relies on.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ExprValue {
    /// Double-precision arithmetic result
    Float(f64),
    /// Integer value
    Int(i64),
    /// String value
    Str(String),
    /// Boolean value
    Bool(bool),
    /// Ordered collection of values
    List(Vec<ExprValue>),
}

impl ExprValue {
    /// Short type name for error messages and logging
    pub fn type_name(&self) -> &'static str {
        match self {
            ExprValue::Float(_) => "float",
            ExprValue::Int(_) => "int",
            ExprValue::Str(_) => "string",
            ExprValue::Bool(_) => "bool",
            ExprValue::List(_) => "list",
        }
    }

    /// Returns the float value if this is a `Float`
    pub fn as_float(&self) -> Option<f64> {
        match self {
            ExprValue::Float(f) => Some(*f),
            _ => None,
        }
    }
}

impl fmt::Display for ExprValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExprValue::Float(v) => write!(f, "{}", v),
            ExprValue::Int(v) => write!(f, "{}", v),
            ExprValue::Str(v) => write!(f, "{}", v),
            ExprValue::Bool(v) => write!(f, "{}", v),
            ExprValue::List(vs) => {
                write!(f, "[")?;
                for (i, v) in vs.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}", v)?;
                }
                write!(f, "]")
            },
        }
    }
}

/// Variable bindings visible to one expression evaluation.
///
/// A context is allocated fresh per record and discarded afterwards.
/// Expressions may bind intermediate variables, so a context must never
/// be shared or reused across records.
#[derive(Debug, Default)]
pub struct EvalContext {
    bindings: AHashMap<String, ExprValue>,
}

impl EvalContext {
    /// Creates an empty context
    pub fn new() -> Self {
        Self::default()
    }

    /// Binds a variable, replacing any previous binding of the same name
    pub fn bind<S: Into<String>>(&mut self, name: S, value: ExprValue) {
        self.bindings.insert(name.into(), value);
    }

    /// Looks up a bound variable
    pub fn get(&self, name: &str) -> Option<&ExprValue> {
        self.bindings.get(name)
    }

    /// Number of bound variables
    pub fn len(&self) -> usize {
        self.bindings.len()
    }

    /// Returns true if no variables are bound
    pub fn is_empty(&self) -> bool {
        self.bindings.is_empty()
    }
}

/// A pluggable expression interpreter.
///
/// Implementations must be safe to share across concurrently processed
/// records; all per-evaluation state belongs in the [`EvalContext`].
pub trait ExpressionEvaluator: Send + Sync {
    /// Evaluates one expression against the given variable bindings.
    ///
    /// Fails with [`ProwlError::Expression`](crate::ProwlError::Expression)
    /// on malformed expressions or unbound references.
    fn evaluate(&self, expression: &str, context: &EvalContext) -> Result<ExprValue>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_context_bindings_shadow() {
        let mut ctx = EvalContext::new();
        ctx.bind("end", ExprValue::Int(920_000));
        ctx.bind("end", ExprValue::Int(940_000));
        assert_eq!(ctx.get("end"), Some(&ExprValue::Int(940_000)));
        assert_eq!(ctx.len(), 1);
    }

    #[test]
    fn test_value_type_names() {
        assert_eq!(ExprValue::Float(4.0).type_name(), "float");
        assert_eq!(ExprValue::List(vec![]).type_name(), "list");
    }

    #[test]
    fn test_float_accessor() {
        assert_eq!(ExprValue::Float(4.0).as_float(), Some(4.0));
        assert_eq!(ExprValue::Str("4.0".to_string()).as_float(), None);
    }
}
