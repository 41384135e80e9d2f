use std::borrow::Borrow;
use std::collections::{BTreeMap, HashMap};
use std::hash::{BuildHasher, Hash};

use tracing::trace;

use crate::{
    bytecode::{Instruction, Program},
    error::{Error, Result},
};

/// Source of variable values for one evaluation.
pub trait Args<V> {
    fn load(&self, var: &V) -> Result<f64>;
}

impl Args<usize> for [f64] {
    fn load(&self, &index: &usize) -> Result<f64> {
        self.get(index).copied().ok_or(Error::MissingArgument {
            index,
            len: self.len(),
        })
    }
}

impl<K, S> Args<Box<str>> for HashMap<K, f64, S>
where
    K: Borrow<str> + Hash + Eq,
    S: BuildHasher,
{
    fn load(&self, name: &Box<str>) -> Result<f64> {
        self.get(&**name)
            .copied()
            .ok_or_else(|| Error::UnknownVariable(name.to_string()))
    }
}

impl<K> Args<Box<str>> for BTreeMap<K, f64>
where
    K: Borrow<str> + Ord,
{
    fn load(&self, name: &Box<str>) -> Result<f64> {
        self.get(&**name)
            .copied()
            .ok_or_else(|| Error::UnknownVariable(name.to_string()))
    }
}

/// Operand stack of a single evaluation.
#[derive(Debug, Default)]
pub struct ExeState {
    stack: Vec<f64>,
}

impl ExeState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            stack: Vec::with_capacity(capacity),
        }
    }

    pub fn execute<V, A>(&mut self, program: &Program<V>, args: &A) -> Result<f64>
    where
        A: Args<V> + ?Sized,
    {
        self.stack.clear();
        for code in program.instructions() {
            match code {
                Instruction::PushConst(v) => self.stack.push(*v),
                Instruction::PushVariable(var) => {
                    let v = args.load(var)?;
                    self.stack.push(v);
                }
                Instruction::UnaryOp(op) => {
                    let a = self.pop()?;
                    self.stack.push((op.apply)(a));
                }
                Instruction::BinaryOp(op) => {
                    let b = self.pop()?;
                    let a = self.pop()?;
                    self.stack.push((op.apply)(a, b));
                }
            }
        }

        match self.stack[..] {
            [result] => {
                trace!(result, "evaluated");
                Ok(result)
            }
            _ => Err(Error::UnbalancedStack(self.stack.len())),
        }
    }

    fn pop(&mut self) -> Result<f64> {
        self.stack.pop().ok_or(Error::StackUnderflow)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bytecode::{ADD, DIV, NEG, POW, SUB};
    use pretty_assertions::assert_eq;

    const NO_ARGS: &[f64] = &[];

    #[test]
    fn left_operand_is_pushed_first() {
        let program: Program<usize> = Program::new(
            vec![
                Instruction::PushVariable(0),
                Instruction::PushVariable(1),
                Instruction::BinaryOp(&SUB),
            ],
            2,
        );
        let mut vm = ExeState::new();
        assert_eq!(vm.execute(&program, &[10.0, 4.0][..]), Ok(6.0));
        assert_eq!(vm.execute(&program, &[4.0, 10.0][..]), Ok(-6.0));
    }

    #[test]
    fn named_lookup() {
        let program: Program<Box<str>> = Program::new(
            vec![
                Instruction::PushVariable("x".into()),
                Instruction::UnaryOp(&NEG),
                Instruction::PushVariable("y".into()),
                Instruction::BinaryOp(&POW),
            ],
            2,
        );
        let mut vars = HashMap::new();
        vars.insert("x", 3.0);
        vars.insert("y", 2.0);
        assert_eq!(ExeState::new().execute(&program, &vars), Ok(9.0));

        let vars: BTreeMap<String, f64> = [("x".to_string(), 3.0)].into_iter().collect();
        assert_eq!(
            ExeState::new().execute(&program, &vars),
            Err(Error::UnknownVariable("y".into()))
        );
    }

    #[test]
    fn ieee_edge_cases_are_values() {
        let program: Program<usize> = Program::new(
            vec![
                Instruction::PushConst(1.0),
                Instruction::PushConst(0.0),
                Instruction::BinaryOp(&DIV),
            ],
            2,
        );
        assert_eq!(ExeState::new().execute(&program, NO_ARGS), Ok(f64::INFINITY));
    }

    #[test]
    fn argument_index_out_of_range() {
        let program: Program<usize> = Program::new(vec![Instruction::PushVariable(2)], 1);
        assert_eq!(
            ExeState::new().execute(&program, &[1.0][..]),
            Err(Error::MissingArgument { index: 2, len: 1 })
        );
    }

    #[test]
    fn malformed_programs_are_errors() {
        let underflow: Program<usize> =
            Program::new(vec![Instruction::PushConst(1.0), Instruction::BinaryOp(&ADD)], 1);
        assert_eq!(
            ExeState::new().execute(&underflow, NO_ARGS),
            Err(Error::StackUnderflow)
        );

        let unbalanced: Program<usize> =
            Program::new(vec![Instruction::PushConst(1.0), Instruction::PushConst(2.0)], 2);
        assert_eq!(
            ExeState::new().execute(&unbalanced, NO_ARGS),
            Err(Error::UnbalancedStack(2))
        );
    }
}
