//! Parser for ITML, an indentation-based format for named text templates.
//!
//! ```text
//! # greetings.itml
//! import shared/common.itml
//!
//! greeting: str
//!     Hello, {{ name }}!
//!
//! paragraphs: list
//!     First paragraph,
//!     still the first.
//!
//!     Second paragraph.
//! ```
//!
//! [`parse`] turns such text into [`Templates`] and [`compile`] renders every
//! entry with a context.

pub mod ast;
pub mod compiler;
pub mod error;
pub mod lexer;
pub mod processor;

pub use ast::{Entry, Function, Kind, Templates, Token};
pub use compiler::{Compiler, MiniJinjaRenderer, Renderer, compile};
pub use error::{ItmlError, Result};
pub use lexer::{leading_space, tokenize, tokenize_line};
pub use processor::{Cursor, ParseOptions, Source, parse, parse_file, parse_str};
