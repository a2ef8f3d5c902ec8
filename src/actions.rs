//! # Action Interpreter
//!
//! Replays a finalized token stream once and builds the typed AST.
//!
//! Only action and text tokens matter here; rule tokens are passed over. The
//! protocol has three operations:
//!
//! - `Begin(kind)` opens a frame.
//! - `Attach` adds the text of the latest [`Symbol::Text`] capture to the
//!   innermost open frame.
//! - `End` closes the innermost frame, assembles it into its typed shape and
//!   adds the result to the frame below. A frame closed with nothing below it
//!   is a finished rift.
//!
//! `Mark` tokens flag the innermost frame. Productions with two shapes (scoped
//! or local references, `if` with or without `else`, the numeric forms) are
//! told apart by their marks, never by looking at what was already built.
//!
//! A frame that closes with the wrong parts means the grammar and this module
//! disagree. That is reported as a [`BuildError`] and stops the replay.

use thiserror::Error;
use tracing::debug;

use crate::ast::{
    Assignment, BinaryOperator, Body, Func, FuncApply, If, MapEntry, Node, NodeKind, Numeric,
    Operation, Ref, Rift, Source,
};
use crate::peg::rule::{Action, Mark, Symbol};
use crate::tokens::{slice, Token};

#[derive(Error, Debug, Clone, PartialEq)]
pub enum BuildError {
    #[error("end without an open node at offset {offset}")]
    UnbalancedEnd { offset: usize },
    #[error("value without an open node at offset {offset}")]
    DetachedValue { offset: usize },
    #[error("attach before any text capture at offset {offset}")]
    MissingText { offset: usize },
    #[error("unexpected shape for {kind} at offset {offset}: {detail}")]
    UnexpectedShape {
        kind: NodeKind,
        offset: usize,
        detail: String,
    },
    #[error("{count} node(s) still open at end of stream")]
    UnclosedNodes { count: usize },
    #[error("invalid {kind} literal {text:?}: {reason}")]
    InvalidLiteral {
        kind: NodeKind,
        text: String,
        reason: String,
    },
}

pub type BuildResult<T> = Result<T, BuildError>;

/// A closed frame, waiting to be added to its parent.
#[derive(Debug)]
enum Fragment {
    Text(String),
    Node(Node),
    Block(Vec<Node>),
    Arguments(Vec<Ref>),
    Entry(MapEntry),
    Operator(BinaryOperator),
    Rift(Rift),
}

impl Fragment {
    fn describe(&self) -> &'static str {
        match self {
            Fragment::Text(_) => "text",
            Fragment::Node(_) => "node",
            Fragment::Block(_) => "block",
            Fragment::Arguments(_) => "arguments",
            Fragment::Entry(_) => "map entry",
            Fragment::Operator(_) => "operator",
            Fragment::Rift(_) => "rift",
        }
    }
}

#[derive(Debug)]
struct Frame {
    kind: NodeKind,
    offset: usize,
    parts: Vec<Fragment>,
    marks: Vec<Mark>,
}

impl Frame {
    fn new(kind: NodeKind, offset: usize) -> Self {
        Self {
            kind,
            offset,
            parts: Vec::new(),
            marks: Vec::new(),
        }
    }

    fn has(&self, mark: Mark) -> bool {
        self.marks.contains(&mark)
    }

    fn shape_error(&self, detail: impl Into<String>) -> BuildError {
        BuildError::UnexpectedShape {
            kind: self.kind,
            offset: self.offset,
            detail: detail.into(),
        }
    }

    fn unexpected(&self, fragment: &Fragment, wanted: &str) -> BuildError {
        self.shape_error(format!("expected {}, found {}", wanted, fragment.describe()))
    }

    fn invalid_literal(&self, text: &str, reason: impl ToString) -> BuildError {
        BuildError::InvalidLiteral {
            kind: self.kind,
            text: text.to_string(),
            reason: reason.to_string(),
        }
    }

    fn take<const N: usize>(&mut self) -> BuildResult<[Fragment; N]> {
        let parts = std::mem::take(&mut self.parts);
        let found = parts.len();
        parts
            .try_into()
            .map_err(|_| self.shape_error(format!("expected {} parts, found {}", N, found)))
    }

    fn text(&self, fragment: Fragment) -> BuildResult<String> {
        match fragment {
            Fragment::Text(text) => Ok(text),
            other => Err(self.unexpected(&other, "text")),
        }
    }

    fn node(&self, fragment: Fragment) -> BuildResult<Node> {
        match fragment {
            Fragment::Node(node) => Ok(node),
            other => Err(self.unexpected(&other, "node")),
        }
    }

    fn reference(&self, fragment: Fragment) -> BuildResult<Ref> {
        match fragment {
            Fragment::Node(Node::Reference(reference)) => Ok(reference),
            other => Err(self.unexpected(&other, "reference")),
        }
    }

    fn block(&self, fragment: Fragment) -> BuildResult<Vec<Node>> {
        match fragment {
            Fragment::Block(lines) => Ok(lines),
            other => Err(self.unexpected(&other, "block")),
        }
    }

    fn nodes(&mut self) -> BuildResult<Vec<Node>> {
        let parts = std::mem::take(&mut self.parts);
        parts.into_iter().map(|part| self.node(part)).collect()
    }

    fn assemble(mut self) -> BuildResult<Fragment> {
        let fragment = match self.kind {
            NodeKind::Rift => {
                let [name, block] = self.take::<2>()?;
                Fragment::Rift(Rift {
                    name: self.reference(name)?,
                    lines: self.block(block)?,
                })
            }
            NodeKind::Reference => {
                let reference = if self.has(Mark::Scoped) {
                    let [unit, local] = self.take::<2>()?;
                    Ref::qualified(self.text(unit)?, self.text(local)?)
                } else {
                    let [local] = self.take::<1>()?;
                    Ref::local(self.text(local)?)
                };
                Fragment::Node(Node::Reference(reference))
            }
            NodeKind::Block => Fragment::Block(self.nodes()?),
            NodeKind::Arguments => {
                let parts = std::mem::take(&mut self.parts);
                let params = parts
                    .into_iter()
                    .map(|part| self.reference(part))
                    .collect::<BuildResult<Vec<_>>>()?;
                Fragment::Arguments(params)
            }
            NodeKind::FunctionDefinition => {
                let [params, body] = self.take::<2>()?;
                let params = match params {
                    Fragment::Arguments(params) => params,
                    other => return Err(self.unexpected(&other, "arguments")),
                };
                let body = match body {
                    Fragment::Block(lines) => Body::Block(lines),
                    Fragment::Node(expr) => Body::Expr(Box::new(expr)),
                    other => return Err(self.unexpected(&other, "block or expression")),
                };
                Fragment::Node(Node::FunctionDefinition(Func { params, body }))
            }
            NodeKind::FunctionApply => {
                let [callee, args] = self.take::<2>()?;
                let callee = self.reference(callee)?;
                let args = match args {
                    Fragment::Node(Node::Tuple(args)) => args,
                    other => return Err(self.unexpected(&other, "tuple")),
                };
                Fragment::Node(Node::FunctionApply(FuncApply { callee, args }))
            }
            NodeKind::Tuple => Fragment::Node(Node::Tuple(self.nodes()?)),
            NodeKind::List => Fragment::Node(Node::List(self.nodes()?)),
            NodeKind::Map => {
                let parts = std::mem::take(&mut self.parts);
                let entries = parts
                    .into_iter()
                    .map(|part| match part {
                        Fragment::Entry(entry) => Ok(entry),
                        other => Err(self.unexpected(&other, "map entry")),
                    })
                    .collect::<BuildResult<Vec<_>>>()?;
                Fragment::Node(Node::Map(entries))
            }
            NodeKind::MapEntry => {
                let [key, value] = self.take::<2>()?;
                Fragment::Entry(MapEntry {
                    key: self.node(key)?,
                    value: self.node(value)?,
                })
            }
            NodeKind::Assignment => {
                let [target, value] = self.take::<2>()?;
                Fragment::Node(Node::Assignment(Assignment {
                    target: self.reference(target)?,
                    value: Box::new(self.node(value)?),
                }))
            }
            NodeKind::If => {
                let statement = if self.has(Mark::Otherwise) {
                    let [condition, lines, else_lines] = self.take::<3>()?;
                    If {
                        condition: Box::new(self.node(condition)?),
                        lines: self.block(lines)?,
                        else_lines: Some(self.block(else_lines)?),
                    }
                } else {
                    let [condition, lines] = self.take::<2>()?;
                    If {
                        condition: Box::new(self.node(condition)?),
                        lines: self.block(lines)?,
                        else_lines: None,
                    }
                };
                Fragment::Node(Node::If(statement))
            }
            NodeKind::String => {
                let [raw] = self.take::<1>()?;
                let raw = self.text(raw)?;
                let decoded = crate::ast::unescape(&raw)
                    .ok_or_else(|| self.invalid_literal(&raw, "undefined escape sequence"))?;
                Fragment::Node(Node::String(decoded))
            }
            NodeKind::Numeric => {
                let [text] = self.take::<1>()?;
                let text = self.text(text)?;
                let number = if self.has(Mark::Scientific) {
                    Numeric::Scientific(text.parse().map_err(|e| self.invalid_literal(&text, e))?)
                } else if self.has(Mark::Decimal) {
                    Numeric::Decimal(text.parse().map_err(|e| self.invalid_literal(&text, e))?)
                } else {
                    Numeric::Integer(text.parse().map_err(|e| self.invalid_literal(&text, e))?)
                };
                Fragment::Node(Node::Numeric(number))
            }
            NodeKind::Boolean => {
                let [text] = self.take::<1>()?;
                let text = self.text(text)?;
                let flag = text
                    .parse::<bool>()
                    .map_err(|e| self.invalid_literal(&text, e))?;
                Fragment::Node(Node::Boolean(flag))
            }
            NodeKind::Operation => {
                let mut parts = std::mem::take(&mut self.parts).into_iter();
                let first = match parts.next() {
                    Some(first) => self.node(first)?,
                    None => return Err(self.shape_error("operation without operands")),
                };
                let mut rest = Vec::new();
                while let Some(operator) = parts.next() {
                    let operator = match operator {
                        Fragment::Operator(operator) => operator,
                        other => return Err(self.unexpected(&other, "operator")),
                    };
                    let operand = match parts.next() {
                        Some(operand) => self.node(operand)?,
                        None => return Err(self.shape_error("operator without right operand")),
                    };
                    rest.push((operator, operand));
                }
                if rest.is_empty() {
                    return Err(self.shape_error("operation without operators"));
                }
                Fragment::Node(Node::Operation(Operation {
                    first: Box::new(first),
                    rest,
                }))
            }
            NodeKind::BinaryOperator => {
                let [text] = self.take::<1>()?;
                let text = self.text(text)?;
                let operator = text
                    .parse::<BinaryOperator>()
                    .map_err(|e| self.invalid_literal(&text, e))?;
                Fragment::Operator(operator)
            }
        };
        Ok(fragment)
    }
}

/// Replay state: the open frames and the latest text capture.
pub struct Interpreter<'a> {
    buffer: &'a [char],
    stack: Vec<Frame>,
    text: Option<(usize, usize)>,
    rifts: Vec<Rift>,
}

impl<'a> Interpreter<'a> {
    pub fn new(buffer: &'a [char]) -> Self {
        Self {
            buffer,
            stack: Vec::new(),
            text: None,
            rifts: Vec::new(),
        }
    }

    /// Number of frames currently open.
    #[cfg(test)]
    fn depth(&self) -> usize {
        self.stack.len()
    }

    pub fn step(&mut self, token: &Token) -> BuildResult<()> {
        let offset = token.begin;
        match token.symbol {
            Symbol::Rule(_) => {}
            Symbol::Text => self.text = Some((token.begin, token.end)),
            Symbol::Action(Action::Begin(kind)) => self.stack.push(Frame::new(kind, offset)),
            Symbol::Action(Action::Attach) => {
                let (begin, end) = self.text.ok_or(BuildError::MissingText { offset })?;
                let text = slice(self.buffer, begin, end);
                self.top(offset)?.parts.push(Fragment::Text(text));
            }
            Symbol::Action(Action::Mark(mark)) => self.top(offset)?.marks.push(mark),
            Symbol::Action(Action::End) => {
                let frame = self
                    .stack
                    .pop()
                    .ok_or(BuildError::UnbalancedEnd { offset })?;
                let fragment = frame.assemble()?;
                match self.stack.last_mut() {
                    Some(parent) => parent.parts.push(fragment),
                    None => self.finish_rift(fragment, offset)?,
                }
            }
        }
        Ok(())
    }

    fn top(&mut self, offset: usize) -> BuildResult<&mut Frame> {
        self.stack
            .last_mut()
            .ok_or(BuildError::DetachedValue { offset })
    }

    fn finish_rift(&mut self, fragment: Fragment, offset: usize) -> BuildResult<()> {
        match fragment {
            Fragment::Rift(rift) => {
                debug!(rift = rift.raw_name(), lines = rift.lines.len(), "rift built");
                self.rifts.push(rift);
                Ok(())
            }
            other => Err(BuildError::UnexpectedShape {
                kind: NodeKind::Rift,
                offset,
                detail: format!("top-level {} outside a rift", other.describe()),
            }),
        }
    }

    pub fn finish(self) -> BuildResult<Source> {
        if !self.stack.is_empty() {
            return Err(BuildError::UnclosedNodes {
                count: self.stack.len(),
            });
        }
        Ok(Source::new(self.rifts))
    }
}

/// Replays `tokens` over `buffer` and returns the parsed rifts.
#[tracing::instrument(level = "debug", skip_all, fields(tokens = tokens.len()))]
pub fn execute(buffer: &[char], tokens: &[Token]) -> BuildResult<Source> {
    let mut interpreter = Interpreter::new(buffer);
    for token in tokens {
        interpreter.step(token)?;
    }
    interpreter.finish()
}
