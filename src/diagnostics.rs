//! # Error Formatter
//!
//! A failed parse is reported from its [`Frontier`]: the rules that were open
//! when the engine first inspected the farthest offset, and the tokens the
//! same path had recorded by then. Branches abandoned before that point left
//! no trace in it.
//!
//! The deepest open rule that is not whitespace is the anchor. It is reported
//! from where it began up to the farthest offset. Every shallower depth then
//! contributes the last rule token it recorded inside the enclosing open rule,
//! or that depth's open rule when it recorded none. Spans are reported with
//! 1-based line and column numbers.
//!
//! If no rule was ever entered no anchor exists; [`SyntaxError::anchor`]
//! returns `None` and the message only carries the farthest offset reached.

use std::collections::HashMap;
use std::fmt;

use serde::Serialize;
use thiserror::Error;

use crate::config::ParserConfig;
use crate::peg::cursor::Frontier;
use crate::peg::rule::Symbol;
use crate::tokens::{slice, OrderedTokens, Token};

const RULE_COLOR: &str = "\x1b[34m";
const RESET: &str = "\x1b[m";

/// A 1-based line and column (counted in characters).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct Position {
    pub line: usize,
    pub column: usize,
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "line {} symbol {}", self.line, self.column)
    }
}

/// Resolves character offsets to positions in one forward scan.
///
/// A newline belongs to the line it ends. Offsets at or past the end of the
/// buffer resolve to the position just after the last character.
pub fn translate_positions(buffer: &[char], offsets: &[usize]) -> HashMap<usize, Position> {
    let mut sorted = offsets.to_vec();
    sorted.sort_unstable();
    sorted.dedup();

    let mut positions = HashMap::with_capacity(sorted.len());
    let mut pending = sorted.into_iter().peekable();
    let (mut line, mut column) = (1, 1);
    for (offset, &c) in buffer.iter().enumerate() {
        while pending.next_if_eq(&offset).is_some() {
            positions.insert(offset, Position { line, column });
        }
        if pending.peek().is_none() {
            return positions;
        }
        if c == '\n' {
            line += 1;
            column = 1;
        } else {
            column += 1;
        }
    }
    for offset in pending {
        positions.insert(offset, Position { line, column });
    }
    positions
}

/// One located report, for one depth.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Diagnostic {
    pub depth: usize,
    #[serde(serialize_with = "serialize_symbol")]
    pub symbol: Symbol,
    pub begin: Position,
    pub end: Position,
    pub text: String,
}

fn serialize_symbol<S: serde::Serializer>(symbol: &Symbol, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.collect_str(symbol)
}

impl Diagnostic {
    pub fn render(&self, colorize: bool) -> String {
        let symbol = if colorize {
            format!("{}{}{}", RULE_COLOR, self.symbol, RESET)
        } else {
            self.symbol.to_string()
        };
        format!(
            "parse error near {} ({} - {}):\n{}",
            symbol, self.begin, self.end, self.text
        )
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.render(false))
    }
}

/// One anchor per depth, deepest first, from the anchor rule up to depth 0.
pub fn anchors(frontier: &Frontier) -> Vec<Token> {
    let ordered = OrderedTokens::new(&frontier.tokens);
    let open: Vec<_> = frontier
        .open
        .iter()
        .filter(|open| !open.rule.is_trivia())
        .collect();
    let deepest = match open.last() {
        Some(open) => open.depth,
        None => match ordered.depth_count().checked_sub(2) {
            Some(depth) => depth,
            None => return Vec::new(),
        },
    };
    let unfinished = |depth: usize| {
        open.iter()
            .find(|open| open.depth == depth)
            .map(|open| Token::new(open.rule, open.begin, frontier.offset.max(open.begin), depth))
    };

    (0..=deepest)
        .rev()
        .filter_map(|depth| {
            if depth == deepest {
                if let Some(token) = unfinished(depth) {
                    return Some(token);
                }
            }
            let scope = frontier
                .open
                .iter()
                .rev()
                .find(|open| open.depth < depth)
                .map_or(0, |open| open.begin);
            ordered
                .bucket(depth)
                .iter()
                .rev()
                .map(|entry| entry.token)
                .find(|token| {
                    token.begin >= scope
                        && token.symbol.rule().is_some_and(|rule| !rule.is_trivia())
                })
                .or_else(|| unfinished(depth))
        })
        .collect()
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{message}")]
pub struct SyntaxError {
    message: String,
    diagnostics: Vec<Diagnostic>,
    farthest: Position,
    farthest_offset: usize,
}

impl SyntaxError {
    /// Builds the error from the frontier of a failed parse.
    pub fn from_frontier(buffer: &[char], frontier: &Frontier, config: &ParserConfig) -> Self {
        let farthest_offset = frontier.offset;
        let mut anchors = anchors(frontier);
        if let Some(limit) = config.max_diagnostics {
            anchors.truncate(limit);
        }

        let mut offsets: Vec<usize> = anchors
            .iter()
            .flat_map(|token| [token.begin, token.end])
            .collect();
        offsets.push(farthest_offset);
        let positions = translate_positions(buffer, &offsets);
        let at = |offset: usize| {
            positions
                .get(&offset)
                .copied()
                .unwrap_or(Position { line: 1, column: 1 })
        };

        let diagnostics: Vec<Diagnostic> = anchors
            .iter()
            .map(|token| Diagnostic {
                depth: token.depth,
                symbol: token.symbol,
                begin: at(token.begin),
                end: at(token.end),
                text: slice(buffer, token.begin, token.end),
            })
            .collect();
        let farthest = at(farthest_offset);

        let message = if diagnostics.is_empty() {
            format!(
                "parse error: no location available (farthest reach {})",
                farthest
            )
        } else {
            diagnostics
                .iter()
                .map(|diagnostic| diagnostic.render(config.colorize_diagnostics))
                .collect::<Vec<_>>()
                .join("\n")
        };

        Self {
            message,
            diagnostics,
            farthest,
            farthest_offset,
        }
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    /// Per-depth reports, deepest first.
    pub fn diagnostics(&self) -> &[Diagnostic] {
        &self.diagnostics
    }

    /// The most specific report, if any rule was entered.
    pub fn anchor(&self) -> Option<&Diagnostic> {
        self.diagnostics.first()
    }

    /// The farthest position any primitive inspected.
    pub fn farthest(&self) -> Position {
        self.farthest
    }

    pub fn farthest_offset(&self) -> usize {
        self.farthest_offset
    }
}
