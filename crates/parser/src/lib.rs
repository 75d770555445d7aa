//! Text front end for stackify blocks.
//!
//! ```text
//! # comment
//! v0 = load_local 0
//! v1 = add v0, 1
//! store_local 0, v1
//! ```
//!
//! Value names are symbolic: `v7` may name the first instruction of a block. Names are mapped
//! to positions in definition order.
use ir::{Block, Immediate, InstData, InstId, Opcode, Operand};
use pest::{iterators::Pair, Parser as _};
use rustc_hash::FxHashMap;
use smol_str::SmolStr;

mod error;
pub mod syntax;

pub use error::Error;
pub use syntax::Span;

use syntax::{Parser, Rule};

#[derive(Debug)]
pub struct ParsedBlock {
    pub block: Block,
    /// Comment lines in source order, including the leading `#`.
    pub comments: Vec<String>,
    /// Source name of every instruction that was given one.
    pub value_names: FxHashMap<InstId, SmolStr>,
}

pub fn parse_block(input: &str) -> Result<ParsedBlock, Vec<Error>> {
    let root = match Parser::parse(Rule::block, input) {
        Ok(mut pairs) => pairs.next().expect("`block` rule always yields a pair"),
        Err(err) => return Err(vec![Error::SyntaxError(err)]),
    };

    let mut ctx = BuildCtx::default();
    for pair in root.into_inner() {
        match pair.as_rule() {
            Rule::stmt => ctx.stmt(pair),
            Rule::COMMENT => ctx.comments.push(pair.as_str().trim_end().to_string()),
            _ => {}
        }
    }

    if ctx.errors.is_empty() {
        Ok(ParsedBlock {
            block: ctx.block,
            comments: ctx.comments,
            value_names: ctx.names.into_iter().map(|(name, inst)| (inst, name)).collect(),
        })
    } else {
        Err(ctx.errors)
    }
}

#[derive(Default)]
struct BuildCtx {
    block: Block,
    names: FxHashMap<SmolStr, InstId>,
    comments: Vec<String>,
    errors: Vec<Error>,
}

impl BuildCtx {
    fn stmt(&mut self, pair: Pair<'_, Rule>) {
        let stmt_span = Span::from_pest(pair.as_span());
        let mut def = None;
        let mut opcode = None;
        let mut operands = Vec::new();

        for p in pair.into_inner() {
            match p.as_rule() {
                Rule::value_name if opcode.is_none() => def = Some(p),
                Rule::opcode => opcode = Some(self.opcode(&p)),
                Rule::value_name | Rule::integer => operands.push(self.operand(&p)),
                Rule::COMMENT => self.comments.push(p.as_str().trim_end().to_string()),
                _ => unreachable!("unexpected rule in stmt: {:?}", p.as_rule()),
            }
        }

        // Keep later positions aligned with the source when the opcode is unknown.
        let Some(opcode) = opcode.flatten() else {
            self.block.push(InstData::new(Opcode::Add, operands));
            return;
        };

        if operands.len() != opcode.arity() {
            self.errors.push(Error::InstArgNumMismatch {
                expected: opcode.arity(),
                actual: operands.len(),
                span: stmt_span,
            });
        }

        let inst = self.block.push(InstData::new(opcode, operands));

        if let Some(def) = def {
            let span = Span::from_pest(def.as_span());
            if !opcode.has_result() {
                self.errors
                    .push(Error::UnexpectedResultName { inst: opcode, span });
            }
            let name = SmolStr::new(def.as_str());
            if self.names.contains_key(&name) {
                self.errors.push(Error::DuplicateValueName(name, span));
            } else {
                self.names.insert(name, inst);
            }
        }
    }

    fn opcode(&mut self, p: &Pair<'_, Rule>) -> Option<Opcode> {
        match p.as_str().parse::<Opcode>() {
            Ok(opcode) => Some(opcode),
            Err(_) => {
                self.errors.push(Error::UnknownInst(
                    p.as_str().into(),
                    Span::from_pest(p.as_span()),
                ));
                None
            }
        }
    }

    fn operand(&mut self, p: &Pair<'_, Rule>) -> Operand {
        let span = Span::from_pest(p.as_span());
        match p.as_rule() {
            Rule::value_name => match self.names.get(p.as_str()) {
                Some(&inst) => Operand::Ref(inst),
                None => {
                    self.errors
                        .push(Error::UndefinedValue(p.as_str().into(), span));
                    Operand::Const(0)
                }
            },
            _ => match p.as_str().parse::<Immediate>() {
                Ok(imm) => Operand::Const(imm),
                Err(_) => {
                    self.errors.push(Error::NumberOutOfBounds(span));
                    Operand::Const(0)
                }
            },
        }
    }
}
