//! # Parse Entrypoint: Coordinating the Front End
//!
//! This module ties the rule engine, the token structures and the action
//! interpreter together. A parse moves through these states:
//!
//! ```text
//! Idle → Parsing → Succeeded(tokens) → Executed(AST)
//!                ↘ Failed(diagnostics)
//! ```
//!
//! Each state is a type:
//!
//! * [`Parser`] is idle. It holds configuration only and can be shared freely.
//! * [`Parser::recognize`] runs the grammar over the whole input. It returns a
//!   [`Recognized`] parse holding the finalized token stream, or a
//!   [`SyntaxError`] with located diagnostics.
//! * [`Recognized::execute`] replays the tokens once and returns the
//!   [`Source`]. It consumes the recognized parse.
//!
//! A failed parse is final for that input; there is no recovery or retry.
//! Callers that only want the AST use [`parse`] or [`parse_reader`].
//!
//! ## Inspecting a parse
//!
//! Between recognition and execution the token stream can be examined:
//!
//! * [`Recognized::syntax_tree`]: the arena tree rebuilt from spans
//! * [`Recognized::walk`]: the pre-order walk with gap items
//! * [`Recognized::render_syntax_tree`]: an indented listing of that walk

use std::io::Read;
use std::path::Path;

use tracing::{debug, instrument, warn};

use crate::actions::{self, BuildError};
use crate::ast::Source;
use crate::config::{self, ParserConfig};
use crate::diagnostics::SyntaxError;
use crate::error::RiftResult;
use crate::peg::{grammar, Cursor};
use crate::tokens::{walk, OrderedTokens, PreOrder, SyntaxTree, Token};

#[derive(Debug, Clone, Default)]
pub struct Parser {
    config: ParserConfig,
}

impl Parser {
    pub fn new(config: ParserConfig) -> Self {
        Self { config }
    }

    pub fn from_config_file<P: AsRef<Path>>(path: P) -> RiftResult<Self> {
        let config: ParserConfig = config::from_file(path)?;
        debug!(?config, "loaded parser config");
        Ok(Self::new(config))
    }

    pub fn config(&self) -> &ParserConfig {
        &self.config
    }

    /// Matches the grammar against the whole of `source`.
    #[instrument(level = "debug", skip(self, source), fields(len = source.len()))]
    pub fn recognize(&self, source: &str) -> Result<Recognized, SyntaxError> {
        let mut cursor = Cursor::with_capacity(source, self.config.initial_token_capacity);
        if grammar::source(&mut cursor) {
            cursor.commit();
            let (buffer, tokens) = cursor.into_parts();
            debug!(tokens = tokens.len(), "source recognized");
            Ok(Recognized::new(buffer, tokens.into_vec()))
        } else {
            let error = SyntaxError::from_frontier(cursor.source(), &cursor.frontier(), &self.config);
            warn!(
                farthest = %error.farthest(),
                diagnostics = error.diagnostics().len(),
                "syntax error"
            );
            Err(error)
        }
    }

    pub fn parse(&self, source: &str) -> RiftResult<Source> {
        let recognized = self.recognize(source)?;
        Ok(recognized.execute()?)
    }

    /// Reads everything from `reader`, then parses it.
    #[instrument(level = "debug", skip_all)]
    pub fn parse_reader<R: Read>(&self, mut reader: R) -> RiftResult<Source> {
        let mut source = String::new();
        reader.read_to_string(&mut source)?;
        self.parse(&source)
    }
}

/// A successful recognition: the source and its finalized token stream.
#[derive(Debug, Clone)]
pub struct Recognized {
    buffer: Vec<char>,
    tokens: Vec<Token>,
    ordered: OrderedTokens,
}

impl Recognized {
    fn new(buffer: Vec<char>, tokens: Vec<Token>) -> Self {
        let ordered = OrderedTokens::new(&tokens);
        Self {
            buffer,
            tokens,
            ordered,
        }
    }

    pub fn source(&self) -> &[char] {
        &self.buffer
    }

    /// Tokens in emission order.
    pub fn tokens(&self) -> &[Token] {
        &self.tokens
    }

    /// Tokens grouped by depth.
    pub fn ordered(&self) -> &OrderedTokens {
        &self.ordered
    }

    pub fn syntax_tree(&self) -> SyntaxTree {
        SyntaxTree::build(&self.tokens)
    }

    pub fn walk(&self) -> PreOrder<'_> {
        PreOrder::new(&self.ordered)
    }

    pub fn render_syntax_tree(&self) -> String {
        walk::render_syntax_tree(&self.ordered, &self.buffer)
    }

    /// The leaves and gaps of the walk, joined back into text.
    pub fn leaf_text(&self) -> String {
        walk::leaf_text(&self.ordered, &self.buffer)
    }

    /// Replays the token stream and builds the AST.
    #[instrument(level = "debug", skip_all, fields(tokens = self.tokens.len()))]
    pub fn execute(self) -> Result<Source, BuildError> {
        let source = actions::execute(&self.buffer, &self.tokens)?;
        debug!(rifts = source.len(), "source executed");
        Ok(source)
    }
}

/// Parses `source` with the default configuration.
pub fn parse(source: &str) -> RiftResult<Source> {
    Parser::default().parse(source)
}

/// Reads `reader` to the end and parses it with the default configuration.
pub fn parse_reader<R: Read>(reader: R) -> RiftResult<Source> {
    Parser::default().parse_reader(reader)
}
