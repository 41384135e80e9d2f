//! Single-pass compiler: a recursive-descent parser that emits stack code
//! in post-order while it matches, without building a syntax tree.
//!
//! ```text
//! expression := term ( ('+'|'-') term )*
//! term       := factor ( ('*'|'/') factor )*
//! factor     := primary ( '^' primary )*     (grouped from the right)
//! primary    := number | '-' primary | call | identifier | '(' expression ')'
//! call       := ("exp"|"log"|"sqrt") '(' expression ')'
//! ```

use tracing::debug;

use crate::{
    bytecode::{self, Instruction, Program},
    error::{Error, Result},
    lex::{Lex, Token},
};

/// Recursion through `primary` deeper than this is rejected.
const MAX_NESTING: usize = 256;

/// Decides what an identifier compiles to.
pub trait Binder {
    type Var;

    fn bind(&self, name: &str, position: usize) -> Result<Self::Var>;
}

/// Positional binding against a declared parameter list.
pub struct Params<'p>(pub &'p [String]);

impl Binder for Params<'_> {
    type Var = usize;

    fn bind(&self, name: &str, position: usize) -> Result<usize> {
        self.0
            .iter()
            .position(|p| p == name)
            .ok_or_else(|| Error::UndeclaredIdentifier {
                name: name.to_owned(),
                position,
            })
    }
}

/// Named binding, resolved when the program runs.
pub struct Late;

impl Binder for Late {
    type Var = Box<str>;

    fn bind(&self, name: &str, _position: usize) -> Result<Box<str>> {
        Ok(name.into())
    }
}

pub fn load<B: Binder>(text: &str, binder: B) -> Result<Program<B::Var>> {
    let mut compiler = Compiler {
        lex: Lex::new(text),
        binder,
        byte_codes: Vec::new(),
        depth: 0,
        max_depth: 0,
        nesting: 0,
    };

    compiler.expression()?;
    match compiler.lex.next()? {
        Token::Eos => {}
        t => {
            return Err(Error::syntax(
                compiler.lex.position(),
                format!("unexpected {t} after expression"),
            ))
        }
    }
    debug_assert_eq!(compiler.depth, 1);

    debug!(
        text,
        instructions = compiler.byte_codes.len(),
        max_depth = compiler.max_depth,
        "compiled expression"
    );
    Ok(Program::new(compiler.byte_codes, compiler.max_depth))
}

struct Compiler<'a, B: Binder> {
    lex: Lex<'a>,
    binder: B,
    byte_codes: Vec<Instruction<B::Var>>,
    depth: usize,
    max_depth: usize,
    nesting: usize,
}

impl<B: Binder> Compiler<'_, B> {
    fn expression(&mut self) -> Result<()> {
        self.term()?;
        loop {
            let op = match self.lex.peek()? {
                Token::Add => &bytecode::ADD,
                Token::Sub => &bytecode::SUB,
                _ => return Ok(()),
            };
            self.lex.next()?;
            self.term()?;
            self.emit(Instruction::BinaryOp(op));
        }
    }

    fn term(&mut self) -> Result<()> {
        self.factor()?;
        loop {
            let op = match self.lex.peek()? {
                Token::Mul => &bytecode::MUL,
                Token::Div => &bytecode::DIV,
                _ => return Ok(()),
            };
            self.lex.next()?;
            self.factor()?;
            self.emit(Instruction::BinaryOp(op));
        }
    }

    // right-associative: `a^b^c` emits `a b c pow pow`, so the operands are
    // pushed in order and every `pow` is emitted after the last one
    fn factor(&mut self) -> Result<()> {
        self.primary()?;
        let mut pows = 0usize;
        while self.lex.peek()? == &Token::Pow {
            self.lex.next()?;
            self.primary()?;
            pows += 1;
        }
        for _ in 0..pows {
            self.emit(Instruction::BinaryOp(&bytecode::POW));
        }
        Ok(())
    }

    fn primary(&mut self) -> Result<()> {
        self.nesting += 1;
        if self.nesting > MAX_NESTING {
            return Err(Error::syntax(
                self.lex.position(),
                "expression nested too deeply",
            ));
        }

        match self.lex.next()? {
            Token::Number(v) => self.emit(Instruction::PushConst(v)),
            // binds tighter than `^`: -2^2 is (-2)^2
            Token::Sub => {
                self.primary()?;
                self.emit(Instruction::UnaryOp(&bytecode::NEG));
            }
            Token::ParL => self.group()?,
            Token::Name(name) => {
                let position = self.lex.position();
                match bytecode::builtin(&name) {
                    Some(f) if self.lex.peek()? == &Token::ParL => {
                        self.lex.next()?;
                        self.group()?;
                        self.emit(Instruction::UnaryOp(f));
                    }
                    _ => {
                        let var = self.binder.bind(&name, position)?;
                        self.emit(Instruction::PushVariable(var));
                    }
                }
            }
            t => {
                return Err(Error::syntax(
                    self.lex.position(),
                    format!("expected operand, found {t}"),
                ))
            }
        }

        self.nesting -= 1;
        Ok(())
    }

    /// Rest of `'(' expression ')'` after the opening parenthesis.
    fn group(&mut self) -> Result<()> {
        self.expression()?;
        match self.lex.next()? {
            Token::ParR => Ok(()),
            t => Err(Error::syntax(
                self.lex.position(),
                format!("expected `)`, found {t}"),
            )),
        }
    }

    fn emit(&mut self, code: Instruction<B::Var>) {
        self.depth = self.depth.saturating_add_signed(code.stack_effect());
        self.max_depth = self.max_depth.max(self.depth);
        self.byte_codes.push(code);
    }
}
