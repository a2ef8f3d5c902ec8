//! # Rift: a front end for the Rift language
//!
//! Rift programs are made of named units called rifts:
//!
//! ```text
//! @helper => { id = (x) -> x }
//! run => { y = helper:id(5) }
//! ```
//!
//! This crate turns such source text into a typed syntax tree for downstream
//! tools. It does not execute anything.
//!
//! ## Processing Pipeline
//!
//! ```text
//! Source → Rule Engine → Token Store → Action Interpreter → AST
//!                             ↓
//!               Orderer → Tree Builder / Walker → Diagnostics
//! ```
//!
//! ### Stage 1: Recognition
//!
//! The [`peg`] module is a backtracking rule engine. The Rift grammar is
//! written as plain functions over a [`peg::Cursor`]; matching records flat
//! tokens into a [`tokens::TokenStore`] and builds no values.
//!
//! ### Stage 2: Token structures
//!
//! The [`tokens`] module regroups recorded tokens by depth, rebuilds their
//! nesting into an arena tree, and walks that nesting in pre-order with gap
//! items for uncovered text.
//!
//! ### Stage 3: Execution
//!
//! The [`actions`] module replays the token stream once and builds the
//! statically shaped AST of [`ast`].
//!
//! ### Errors
//!
//! Grammar failures are reported by [`diagnostics`] with line and column
//! positions. All failures surface through [`Error`].
//!
//! ## Entry points
//!
//! [`parse`] and [`parse_reader`] cover the common case. [`Parser`] takes a
//! [`config::ParserConfig`] and exposes the intermediate recognized state.

pub mod actions;
pub mod ast;
pub mod config;
pub mod diagnostics;
pub mod error;
pub mod parser;
pub mod peg;
pub mod tokens;

// Re-exports
pub use actions::BuildError;
pub use ast::*;
pub use config::ParserConfig;
pub use diagnostics::{Diagnostic, Position, SyntaxError};
pub use error::*;
pub use parser::{parse, parse_reader, Parser, Recognized};
