#![doc = include_str!("../README.md")]

pub use jxi_tokenizer::{LexError, LexErrorKind, Span};
pub use jxi_tree::Document;

mod diagnostic;

mod error;
pub use error::{Error, LinkError, LinkErrorKind, ParseError, ParseErrorKind};

mod options;
pub use options::ParseOptions;

mod parser;
pub use parser::Parser;

mod resolve;
pub use resolve::{PendingLink, resolve};

/// Parse and resolve a complete jxi buffer with default options.
pub fn parse(source: &str) -> Result<Document, Error> {
    parse_with_options(source, &ParseOptions::default())
}

/// Parse and resolve a complete jxi buffer.
///
/// Fails on the first lexical, structural or link error; no partial
/// document is returned.
pub fn parse_with_options(source: &str, options: &ParseOptions) -> Result<Document, Error> {
    let (mut document, pending) = Parser::with_options(source, options).parse()?;
    resolve(&mut document, pending)?;
    Ok(document)
}
