//! Compiled expressions as reusable callables.
//!
//! A compiled function is immutable, so one instance can be shared across
//! threads; every call evaluates on its own operand stack.

use std::fmt;

use crate::{
    bytecode::{Instruction, Program},
    error::{Error, Result},
    parse::{self, Late, Params},
    vm::{Args, ExeState},
};

/// Expression with positionally bound parameters and a fixed arity.
#[derive(Debug, Clone, PartialEq)]
pub struct Function {
    params: Vec<String>,
    program: Program<usize>,
}

impl Function {
    /// Compiles `text`, binding identifiers to `params` in order.
    ///
    /// An identifier that is not a declared parameter fails with
    /// [`Error::UndeclaredIdentifier`].
    pub fn compile<I, S>(text: &str, params: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let params: Vec<String> = params.into_iter().map(Into::into).collect();
        let program = parse::load(text, Params(&params))?;
        Ok(Self { params, program })
    }

    pub fn call(&self, args: &[f64]) -> Result<f64> {
        if args.len() != self.arity() {
            return Err(Error::ArityMismatch {
                expected: self.arity(),
                found: args.len(),
            });
        }
        ExeState::with_capacity(self.program.max_depth()).execute(&self.program, args)
    }

    pub fn arity(&self) -> usize {
        self.params.len()
    }

    pub fn params(&self) -> &[String] {
        &self.params
    }

    pub fn program(&self) -> &Program<usize> {
        &self.program
    }
}

impl fmt::Display for Function {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "function({})", self.params.join(", "))?;
        write!(f, "{}", self.program)
    }
}

/// Expression whose variables are looked up by name at each call.
#[derive(Debug, Clone, PartialEq)]
pub struct NamedFunction {
    program: Program<Box<str>>,
}

impl NamedFunction {
    pub fn compile(text: &str) -> Result<Self> {
        let program = parse::load(text, Late)?;
        Ok(Self { program })
    }

    /// Fails with [`Error::UnknownVariable`] for the first referenced
    /// variable missing from `vars`.
    pub fn call<A>(&self, vars: &A) -> Result<f64>
    where
        A: Args<Box<str>> + ?Sized,
    {
        ExeState::with_capacity(self.program.max_depth()).execute(&self.program, vars)
    }

    /// Distinct variable names, in order of first use.
    pub fn variables(&self) -> Vec<&str> {
        let mut names: Vec<&str> = Vec::new();
        for code in self.program.instructions() {
            if let Instruction::PushVariable(name) = code {
                if !names.contains(&&**name) {
                    names.push(name);
                }
            }
        }
        names
    }

    pub fn program(&self) -> &Program<Box<str>> {
        &self.program
    }
}

impl fmt::Display for NamedFunction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.program)
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn positional_call() {
        let f = Function::compile("2 + 3 * x", ["x"]).unwrap();
        assert_eq!(f.arity(), 1);
        assert_eq!(f.call(&[25.0]), Ok(77.0));
        assert_eq!(f.call(&[0.0]), Ok(2.0));
    }

    #[test]
    fn arguments_follow_declaration_order() {
        let f = Function::compile("x ^ y", ["x", "y"]).unwrap();
        assert_eq!(f.call(&[2.0, 3.0]), Ok(8.0));
        let g = Function::compile("x ^ y", ["y", "x"]).unwrap();
        assert_eq!(g.call(&[2.0, 3.0]), Ok(9.0));
    }

    #[test]
    fn arity_mismatch() {
        let f = Function::compile("x ^ y", ["x", "y"]).unwrap();
        assert_eq!(
            f.call(&[2.0]),
            Err(Error::ArityMismatch {
                expected: 2,
                found: 1,
            })
        );
        assert_eq!(
            f.call(&[2.0, 3.0, 4.0]),
            Err(Error::ArityMismatch {
                expected: 2,
                found: 3,
            })
        );
    }

    #[test]
    fn unused_parameters_still_count_toward_arity() {
        let f = Function::compile("1 + 1", ["a", "b"]).unwrap();
        assert_eq!(f.call(&[7.0, 8.0]), Ok(2.0));
        assert!(f.call(&[]).is_err());
    }

    #[test]
    fn named_call() {
        let f = NamedFunction::compile("x + y * x").unwrap();
        assert_eq!(f.variables(), vec!["x", "y"]);

        let mut vars = HashMap::new();
        vars.insert("x".to_string(), 2.0);
        assert_eq!(f.call(&vars), Err(Error::UnknownVariable("y".into())));

        vars.insert("y".to_string(), 5.0);
        assert_eq!(f.call(&vars), Ok(12.0));
    }

    #[test]
    fn display_lists_signature_and_code() {
        let f = Function::compile("-x", ["x"]).unwrap();
        assert_eq!(f.to_string(), "function(x)\n0000 PUSHV 0\n0001 CALL1 neg\n");
    }
}
