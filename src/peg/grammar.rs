//! # Rift Grammar
//!
//! One function per rule. Each function wraps its body in [`Cursor::rule`], or
//! [`Cursor::memoized`] for the expression rules, so a successful match records
//! exactly one token for the rule, tagged with the depth the rule was entered
//! at. Inside a rule body a plain `&&` chain is a sequence: if any step fails
//! the enclosing rule restores its checkpoint.
//!
//! `Begin`/`Attach`/`Mark`/`End` calls are the semantic actions replayed by
//! [`crate::actions`]; `c.text(..)` marks the spans those actions read.
//!
//! ```text
//! Source     <- Sp (Rift Sp)+ !.
//! Rift       <- RiftName Sp '=>' Sp Block
//! Block      <- '{' Sp (Line (Msp / &'}'))* '}'
//! Line       <- If / Assignment / Expr
//! If         <- 'if' !NameChar Sp Expr Sp Block (Sp 'else' Sp Block)?
//! Assignment <- LocalRef Sp '=' !'>' Sp Expr
//! Expr       <- Op / FuncApply / Value
//! Op         <- Operand (Sp BinaryOp Sp Operand)+
//! FuncApply  <- Ref Tuple
//! Value      <- Literal / Ref
//! Literal    <- Func / Tuple / List / Map / String / Numeric / Boolean
//! ```

use super::combinators::{choice, many0, many1, not, optional, peek};
use super::cursor::Cursor;
use super::rule::{Action, Mark, Rule};
use crate::ast::NodeKind;

fn begin(c: &mut Cursor, kind: NodeKind) -> bool {
    c.action(Action::Begin(kind))
}

fn attach(c: &mut Cursor) -> bool {
    c.action(Action::Attach)
}

fn mark(c: &mut Cursor, mark: Mark) -> bool {
    c.action(Action::Mark(mark))
}

fn end(c: &mut Cursor) -> bool {
    c.action(Action::End)
}

fn is_name_start(c: char) -> bool {
    c.is_ascii_alphabetic() || c == '_'
}

fn is_name_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_'
}

fn name_char(c: &mut Cursor) -> bool {
    c.char_if(is_name_char)
}

/// The start rule. Must consume the whole buffer.
pub fn source(c: &mut Cursor) -> bool {
    c.rule(Rule::Source, |c| {
        sp(c) && many1(c, |c| rift(c) && sp(c)) && not(c, Cursor::any)
    })
}

pub fn rift(c: &mut Cursor) -> bool {
    c.rule(Rule::Rift, |c| {
        begin(c, NodeKind::Rift)
            && rift_name(c)
            && sp(c)
            && c.literal("=>")
            && sp(c)
            && block(c)
            && end(c)
    })
}

fn rift_name(c: &mut Cursor) -> bool {
    c.rule(Rule::RiftName, |c| {
        begin(c, NodeKind::Reference) && name(c) && attach(c) && end(c)
    })
}

pub fn block(c: &mut Cursor) -> bool {
    c.rule(Rule::Block, |c| {
        begin(c, NodeKind::Block)
            && c.char('{')
            && sp(c)
            && many0(c, |c| line(c) && (msp(c) || peek(c, |c| c.char('}'))))
            && c.char('}')
            && end(c)
    })
}

pub fn line(c: &mut Cursor) -> bool {
    c.rule(Rule::Line, |c| choice(c, &[if_statement, assignment, expr]))
}

fn if_statement(c: &mut Cursor) -> bool {
    c.rule(Rule::If, |c| {
        begin(c, NodeKind::If)
            && c.literal("if")
            && not(c, name_char)
            && sp(c)
            && expr(c)
            && sp(c)
            && block(c)
            && optional(c, |c| {
                sp(c) && c.literal("else") && sp(c) && block(c) && mark(c, Mark::Otherwise)
            })
            && end(c)
    })
}

fn assignment(c: &mut Cursor) -> bool {
    c.rule(Rule::Assignment, |c| {
        begin(c, NodeKind::Assignment)
            && local_ref(c)
            && sp(c)
            && c.char('=')
            && not(c, |c| c.char('>'))
            && sp(c)
            && expr(c)
            && end(c)
    })
}

pub fn expr(c: &mut Cursor) -> bool {
    c.memoized(Rule::Expr, |c| choice(c, &[op, func_apply, value]))
}

fn op(c: &mut Cursor) -> bool {
    c.rule(Rule::Op, |c| {
        begin(c, NodeKind::Operation)
            && operand(c)
            && many1(c, |c| sp(c) && binary_op(c) && sp(c) && operand(c))
            && end(c)
    })
}

fn operand(c: &mut Cursor) -> bool {
    c.memoized(Rule::Operand, |c| choice(c, &[func_apply, value]))
}

fn binary_op(c: &mut Cursor) -> bool {
    c.rule(Rule::BinaryOp, |c| {
        begin(c, NodeKind::BinaryOperator)
            && c.text(|c| ["**", "*", "/", "%", "+", "-"].iter().any(|symbol| c.literal(symbol)))
            && attach(c)
            && end(c)
    })
}

fn func_apply(c: &mut Cursor) -> bool {
    c.memoized(Rule::FuncApply, |c| {
        begin(c, NodeKind::FunctionApply) && reference(c) && tuple(c) && end(c)
    })
}

fn value(c: &mut Cursor) -> bool {
    c.memoized(Rule::Value, |c| choice(c, &[literal, reference]))
}

pub fn reference(c: &mut Cursor) -> bool {
    c.memoized(Rule::Ref, |c| {
        begin(c, NodeKind::Reference)
            && name(c)
            && attach(c)
            && optional(c, |c| mark(c, Mark::Scoped) && c.char(':') && name(c) && attach(c))
            && end(c)
    })
}

fn local_ref(c: &mut Cursor) -> bool {
    c.rule(Rule::LocalRef, |c| {
        begin(c, NodeKind::Reference) && name(c) && attach(c) && end(c)
    })
}

fn name(c: &mut Cursor) -> bool {
    c.rule(Rule::Name, |c| {
        c.text(|c| {
            optional(c, |c| c.char('@'))
                && c.char_if(is_name_start)
                && many0(c, name_char)
        })
    })
}

pub fn literal(c: &mut Cursor) -> bool {
    c.memoized(Rule::Literal, |c| {
        choice(c, &[func, tuple, list, map, string, numeric, boolean])
    })
}

fn func(c: &mut Cursor) -> bool {
    c.rule(Rule::Func, |c| {
        begin(c, NodeKind::FunctionDefinition)
            && params(c)
            && sp(c)
            && c.literal("->")
            && sp(c)
            && choice(c, &[block, expr])
            && end(c)
    })
}

/// `open Sp (item (Sp ',' Sp item)* Sp)? close`
fn separated(c: &mut Cursor, open: char, item: fn(&mut Cursor) -> bool, close: char) -> bool {
    c.char(open)
        && sp(c)
        && optional(c, |c| {
            item(c) && many0(c, |c| sp(c) && c.char(',') && sp(c) && item(c)) && sp(c)
        })
        && c.char(close)
}

fn params(c: &mut Cursor) -> bool {
    c.rule(Rule::Params, |c| {
        begin(c, NodeKind::Arguments) && separated(c, '(', local_ref, ')') && end(c)
    })
}

fn tuple(c: &mut Cursor) -> bool {
    c.rule(Rule::Tuple, |c| {
        begin(c, NodeKind::Tuple) && separated(c, '(', expr, ')') && end(c)
    })
}

fn list(c: &mut Cursor) -> bool {
    c.rule(Rule::List, |c| {
        begin(c, NodeKind::List) && separated(c, '[', expr, ']') && end(c)
    })
}

fn map(c: &mut Cursor) -> bool {
    c.rule(Rule::Map, |c| {
        begin(c, NodeKind::Map) && separated(c, '{', map_entry, '}') && end(c)
    })
}

fn map_entry(c: &mut Cursor) -> bool {
    c.rule(Rule::MapEntry, |c| {
        begin(c, NodeKind::MapEntry)
            && map_key(c)
            && sp(c)
            && c.char(':')
            && sp(c)
            && expr(c)
            && end(c)
    })
}

fn map_key(c: &mut Cursor) -> bool {
    c.rule(Rule::MapKey, |c| choice(c, &[string, numeric, boolean, local_ref]))
}

fn string(c: &mut Cursor) -> bool {
    c.rule(Rule::String, |c| {
        begin(c, NodeKind::String)
            && c.char('"')
            && c.text(|c| many0(c, string_char))
            && c.char('"')
            && attach(c)
            && end(c)
    })
}

fn string_char(c: &mut Cursor) -> bool {
    c.rule(Rule::StringChar, |c| {
        string_escape(c) || (not(c, |c| c.char_if(|ch| matches!(ch, '\\' | '\n' | '"'))) && c.any())
    })
}

fn string_escape(c: &mut Cursor) -> bool {
    c.rule(Rule::StringEsc, |c| {
        c.char('\\') && c.char_if(|ch| "ntrfbav\\?\"'".contains(ch))
    })
}

pub fn numeric(c: &mut Cursor) -> bool {
    c.rule(Rule::Numeric, |c| {
        begin(c, NodeKind::Numeric)
            && c.text(|c| choice(c, &[scientific, decimal, integer]))
            && attach(c)
            && end(c)
    })
}

fn scientific(c: &mut Cursor) -> bool {
    c.rule(Rule::SciNum, |c| {
        choice(c, &[decimal, integer])
            && c.char_if(|ch| ch == 'e' || ch == 'E')
            && integer(c)
            && mark(c, Mark::Scientific)
    })
}

fn decimal(c: &mut Cursor) -> bool {
    c.rule(Rule::Decimal, |c| {
        integer(c) && c.char('.') && many0(c, digit) && mark(c, Mark::Decimal)
    })
}

fn integer(c: &mut Cursor) -> bool {
    c.rule(Rule::Integer, whole_number)
}

fn whole_number(c: &mut Cursor) -> bool {
    c.rule(Rule::WholeNum, |c| {
        c.char('0')
            || (optional(c, |c| c.char('-')) && c.range('1', '9') && many0(c, digit))
    })
}

fn digit(c: &mut Cursor) -> bool {
    c.rule(Rule::Digit, |c| c.range('0', '9'))
}

fn boolean(c: &mut Cursor) -> bool {
    c.rule(Rule::Boolean, |c| {
        begin(c, NodeKind::Boolean)
            && c.text(|c| c.literal("true") || c.literal("false"))
            && not(c, name_char)
            && attach(c)
            && end(c)
    })
}

/// One or more whitespace characters or comments.
pub fn msp(c: &mut Cursor) -> bool {
    c.rule(Rule::Msp, |c| many1(c, |c| ws(c) || comment(c)))
}

/// Zero or more whitespace characters or comments.
pub fn sp(c: &mut Cursor) -> bool {
    c.rule(Rule::Sp, |c| many0(c, |c| ws(c) || comment(c)))
}

fn comment(c: &mut Cursor) -> bool {
    c.rule(Rule::Comment, |c| {
        c.char('#') && many0(c, |c| not(c, |c| c.char('\n')) && c.any())
    })
}

fn ws(c: &mut Cursor) -> bool {
    c.rule(Rule::Ws, |c| c.char_if(|ch| matches!(ch, ' ' | '\t' | '\r' | '\n')))
}
