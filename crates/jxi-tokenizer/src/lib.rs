//! A tokenizer for jxi

mod error;
pub use error::{LexError, LexErrorKind};

mod span;
pub use span::Span;

mod token;
pub use token::{Token, TokenKind, TokenValue};

mod tokenizer;
pub use tokenizer::Tokenizer;
