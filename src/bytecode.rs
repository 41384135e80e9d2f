use std::fmt;
use std::ops::{Add, Div, Mul, Neg, Sub};

/// A built-in function of one operand.
#[derive(Clone, Copy)]
pub struct UnaryFn {
    pub name: &'static str,
    pub apply: fn(f64) -> f64,
}

/// A built-in function of two operands, applied as `apply(left, right)`.
#[derive(Clone, Copy)]
pub struct BinaryFn {
    pub name: &'static str,
    pub apply: fn(f64, f64) -> f64,
}

pub static NEG: UnaryFn = UnaryFn {
    name: "neg",
    apply: <f64 as Neg>::neg,
};
pub static EXP: UnaryFn = UnaryFn {
    name: "exp",
    apply: f64::exp,
};
pub static LOG: UnaryFn = UnaryFn {
    name: "log",
    apply: f64::log10,
};
pub static SQRT: UnaryFn = UnaryFn {
    name: "sqrt",
    apply: f64::sqrt,
};

pub static ADD: BinaryFn = BinaryFn {
    name: "add",
    apply: <f64 as Add>::add,
};
pub static SUB: BinaryFn = BinaryFn {
    name: "sub",
    apply: <f64 as Sub>::sub,
};
pub static MUL: BinaryFn = BinaryFn {
    name: "mul",
    apply: <f64 as Mul>::mul,
};
pub static DIV: BinaryFn = BinaryFn {
    name: "div",
    apply: <f64 as Div>::div,
};
pub static POW: BinaryFn = BinaryFn {
    name: "pow",
    apply: f64::powf,
};

/// Functions callable as `name(expression)`.
pub fn builtin(name: &str) -> Option<&'static UnaryFn> {
    match name {
        "exp" => Some(&EXP),
        "log" => Some(&LOG),
        "sqrt" => Some(&SQRT),
        _ => None,
    }
}

impl PartialEq for UnaryFn {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name
    }
}

impl PartialEq for BinaryFn {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name
    }
}

impl fmt::Debug for UnaryFn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name)
    }
}

impl fmt::Debug for BinaryFn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name)
    }
}

/// One stack-machine instruction.
///
/// `V` is the variable operand: an argument index for positional binding,
/// a name for named binding.
#[derive(Debug, Clone, PartialEq)]
pub enum Instruction<V> {
    PushConst(f64),
    PushVariable(V),
    UnaryOp(&'static UnaryFn),
    BinaryOp(&'static BinaryFn),
}

impl<V> Instruction<V> {
    /// Net change of the operand stack depth.
    pub fn stack_effect(&self) -> isize {
        match self {
            Self::PushConst(_) | Self::PushVariable(_) => 1,
            Self::UnaryOp(_) => 0,
            Self::BinaryOp(_) => -1,
        }
    }
}

impl<V: fmt::Display> fmt::Display for Instruction<V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::PushConst(v) => write!(f, "PUSHK {v}"),
            Self::PushVariable(var) => write!(f, "PUSHV {var}"),
            Self::UnaryOp(op) => write!(f, "CALL1 {}", op.name),
            Self::BinaryOp(op) => write!(f, "CALL2 {}", op.name),
        }
    }
}

/// Instruction sequence of one compiled expression.
#[derive(Debug, Clone, PartialEq)]
pub struct Program<V> {
    byte_codes: Vec<Instruction<V>>,
    max_depth: usize,
}

impl<V> Program<V> {
    pub(crate) fn new(byte_codes: Vec<Instruction<V>>, max_depth: usize) -> Self {
        Self {
            byte_codes,
            max_depth,
        }
    }

    pub fn instructions(&self) -> &[Instruction<V>] {
        &self.byte_codes
    }

    pub fn len(&self) -> usize {
        self.byte_codes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.byte_codes.is_empty()
    }

    /// Deepest operand stack reached while executing.
    pub fn max_depth(&self) -> usize {
        self.max_depth
    }
}

impl<V: fmt::Display> fmt::Display for Program<V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, code) in self.byte_codes.iter().enumerate() {
            writeln!(f, "{i:04} {code}")?;
        }
        Ok(())
    }
}
