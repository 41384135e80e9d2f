//! Compile and evaluation errors.

use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum Error {
    /// The grammar did not match the whole input.
    #[error("syntax error at offset {position}: {message}")]
    Syntax { position: usize, message: String },

    /// An identifier that is not among the declared parameters.
    #[error("undeclared identifier `{name}` at offset {position}")]
    UndeclaredIdentifier { name: String, position: usize },

    /// A named variable with no value in the supplied map.
    #[error("unknown variable `{0}`")]
    UnknownVariable(String),

    #[error("expected {expected} argument(s), got {found}")]
    ArityMismatch { expected: usize, found: usize },

    /// A positional variable index past the end of the argument slice.
    /// [`Function::call`](crate::Function::call) checks arity first, so
    /// this only arises when the VM is driven directly.
    #[error("argument index {index} out of range for {len} argument(s)")]
    MissingArgument { index: usize, len: usize },

    /// Never produced for programs built by the parser.
    #[error("operand stack underflow")]
    StackUnderflow,

    /// Never produced for programs built by the parser.
    #[error("operand stack holds {0} values at end of program")]
    UnbalancedStack(usize),
}

impl Error {
    pub(crate) fn syntax(position: usize, message: impl Into<String>) -> Self {
        Self::Syntax {
            position,
            message: message.into(),
        }
    }
}
