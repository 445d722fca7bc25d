//! Encoding of jxi documents back to text.
//!
//! ```
//! use jxi_format::{FormatOptions, encode};
//!
//! let document = jxi_parse::parse(r#"<person name="Alice"><age>30</age></person>"#).unwrap();
//! let text = encode(&document, &FormatOptions::default()).unwrap();
//! assert_eq!(text, "<person name=\"Alice\">\n    <age>\n        30\n    </age>\n</person>\n");
//! ```
//!
//! Layout is chosen per construct through [`FormatOptions`]; the output
//! always parses back to an equal document as long as it holds no
//! unresolved links and no expanded reference cycles.

mod tracing_macros;

mod encode;
mod error;
mod options;
mod scalar;
mod writer;

pub use encode::{encode, encode_entity, encode_value};
pub use error::{EncodeError, EncodeErrorKind};
pub use options::{FormatOptions, Indent, Layout};
pub use scalar::{can_be_bare_key, escape_quoted, escape_raw, format_float};
pub use writer::JxiWriter;
