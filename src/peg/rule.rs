//! # Grammar Symbols
//!
//! Every token recorded by the rule engine is tagged with a [`Symbol`]. A symbol
//! is either a grammar [`Rule`], a [`Symbol::Text`] capture marking a span whose
//! content an action will read, or an [`Action`] marker that drives the action
//! interpreter when the token stream is replayed.

use std::fmt;

use strum_macros::{AsRefStr, Display, EnumIter};

use crate::ast::NodeKind;

/// Named rules of the Rift grammar.
///
/// The names are the ones rendered in diagnostics and syntax listings, so they
/// follow the grammar table rather than Rust naming of the AST.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumIter, AsRefStr)]
pub enum Rule {
    Source,
    Rift,
    RiftName,
    Block,
    Line,
    If,
    Assignment,
    Expr,
    Op,
    Operand,
    BinaryOp,
    FuncApply,
    Value,
    Ref,
    LocalRef,
    Name,
    Literal,
    Func,
    Params,
    Tuple,
    List,
    Map,
    MapEntry,
    MapKey,
    String,
    StringChar,
    StringEsc,
    Numeric,
    SciNum,
    Decimal,
    Integer,
    WholeNum,
    Digit,
    Boolean,
    #[strum(serialize = "msp")]
    Msp,
    #[strum(serialize = "sp")]
    Sp,
    #[strum(serialize = "comment")]
    Comment,
    #[strum(serialize = "ws")]
    Ws,
}

impl Rule {
    /// Whitespace and comments. They never locate an error usefully.
    pub fn is_trivia(self) -> bool {
        matches!(self, Rule::Msp | Rule::Sp | Rule::Comment | Rule::Ws)
    }
}

/// Flags set on the innermost open node while replaying.
///
/// Marks let the interpreter pick between the shapes of a production from the
/// tokens that are present, instead of looking at values it already built.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumIter)]
pub enum Mark {
    /// The reference carries a `unit:` scope component.
    Scoped,
    /// The numeric literal has a fractional part.
    Decimal,
    /// The numeric literal has an exponent.
    Scientific,
    /// The `if` statement carries an `else` block.
    Otherwise,
}

/// Semantic actions, recorded as zero-width tokens.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Action {
    Begin(NodeKind),
    Attach,
    Mark(Mark),
    End,
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Action::Begin(kind) => write!(f, "Begin({})", kind),
            Action::Attach => write!(f, "Attach"),
            Action::Mark(mark) => write!(f, "Mark({})", mark),
            Action::End => write!(f, "End"),
        }
    }
}

/// The "rule id" carried by a token.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Symbol {
    Rule(Rule),
    Text,
    Action(Action),
}

impl Symbol {
    pub fn rule(&self) -> Option<Rule> {
        match self {
            Symbol::Rule(rule) => Some(*rule),
            _ => None,
        }
    }

    pub fn is_action(&self) -> bool {
        matches!(self, Symbol::Action(_))
    }
}

impl From<Rule> for Symbol {
    fn from(rule: Rule) -> Self {
        Symbol::Rule(rule)
    }
}

impl From<Action> for Symbol {
    fn from(action: Action) -> Self {
        Symbol::Action(action)
    }
}

impl fmt::Display for Symbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Symbol::Rule(rule) => write!(f, "{}", rule),
            Symbol::Text => write!(f, "Text"),
            Symbol::Action(action) => write!(f, "{}", action),
        }
    }
}
