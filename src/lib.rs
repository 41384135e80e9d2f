//! Compiles arithmetic expressions into stack bytecode and evaluates them.
//!
//! ```
//! let f = xpress::compile("(-b + sqrt(b^2 - 4*a*c)) / (2*a)", &["a", "b", "c"])?;
//! assert_eq!(f.call(&[2.0, -3.0, -9.0])?, 3.0);
//!
//! let g = xpress::compile_named("x + y")?;
//! let vars = std::collections::HashMap::from([("x", 1.0), ("y", 2.0)]);
//! assert_eq!(g.call(&vars)?, 3.0);
//! # Ok::<(), xpress::Error>(())
//! ```

pub mod bytecode;
pub mod error;
pub mod function;
pub mod lex;
pub mod parse;
pub mod vm;

pub use error::{Error, Result};
pub use function::{Function, NamedFunction};

/// Compiles `text` with positional parameters `params`.
pub fn compile(text: &str, params: &[&str]) -> Result<Function> {
    Function::compile(text, params.iter().copied())
}

/// Compiles `text` with variables resolved by name at call time.
pub fn compile_named(text: &str) -> Result<NamedFunction> {
    NamedFunction::compile(text)
}
