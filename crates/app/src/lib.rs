//! SQL completion pipeline: tokenize, parse tolerantly, classify the
//! cursor's neighborhood, extract visible tables and subquery views, and
//! generate prefix-filtered candidates against the schema catalog.

pub mod ast;
pub mod classify;
pub mod completer;
pub mod error;
pub mod extract;
pub mod matcher;
pub mod parser;
pub mod ports;
pub mod token;
pub mod walker;

pub use classify::ParentScope;
pub use completer::{Completer, CompletionPosition, KEYWORDS};
pub use error::{CompleteError, ParseError};
pub use ports::{CatalogError, CatalogProvider};
