//! Diagnostic rendering for parse errors.

use ariadne::{Color, Label, Report, ReportKind, Source};
use jxi_tokenizer::LexErrorKind;

use crate::{Error, LinkErrorKind, ParseErrorKind};

impl Error {
    /// Render this error with ariadne.
    ///
    /// Returns the formatted report with source context.
    pub fn render(&self, filename: &str, source: &str) -> String {
        let mut output = Vec::new();
        self.write_report(filename, source, &mut output);
        String::from_utf8(output).unwrap_or_else(|_| self.to_string())
    }

    /// Write the error report to a writer.
    pub fn write_report<W: std::io::Write>(&self, filename: &str, source: &str, writer: W) {
        let report = self.build_report(filename, source.len());
        let _ = report
            .finish()
            .write((filename, Source::from(source)), writer);
    }

    fn build_report<'a>(
        &self,
        filename: &'a str,
        source_len: usize,
    ) -> ariadne::ReportBuilder<'static, (&'a str, std::ops::Range<usize>)> {
        let span = self.span();
        let start = (span.start as usize).min(source_len);
        let range = start..(span.end as usize).clamp(start, source_len);

        let (message, label, help) = match self {
            Error::Lex(e) => lex_parts(&e.kind),
            Error::Parse(e) => parse_parts(&e.kind),
            Error::Link(e) => link_parts(&e.kind),
        };

        let mut report = Report::build(ReportKind::Error, (filename, range.clone()))
            .with_message(message)
            .with_label(
                Label::new((filename, range))
                    .with_message(label)
                    .with_color(Color::Red),
            );
        if let Some(help) = help {
            report = report.with_help(help);
        }
        report
    }
}

type Parts = (String, &'static str, Option<&'static str>);

fn lex_parts(kind: &LexErrorKind) -> Parts {
    let help = match kind {
        LexErrorKind::InvalidEscape(_) => {
            Some("valid escapes are: \\b, \\f, \\n, \\r, \\t, \\\\, \\/, \\uXXXX and the quote itself")
        }
        LexErrorKind::InvalidUnicodeEscape => {
            Some("\\u takes exactly four hex digits; surrogates must come in pairs")
        }
        LexErrorKind::UnescapedControl(_) => Some("write control characters as escapes"),
        LexErrorKind::UnterminatedString => Some("add the closing quote"),
        LexErrorKind::MalformedNumber(_) => {
            Some("numbers look like -12, 0.5 or 6e23, without leading zeros in strict mode")
        }
        LexErrorKind::IllegalCharacter(_) => None,
    };
    let label = match kind {
        LexErrorKind::UnterminatedString => "string starts here",
        _ => "here",
    };
    (kind.to_string(), label, help)
}

fn parse_parts(kind: &ParseErrorKind) -> Parts {
    let (label, help) = match kind {
        ParseErrorKind::UnexpectedToken { .. } => ("unexpected", None),
        ParseErrorKind::MismatchedClosingTag { .. } => {
            ("closing tag", Some("every `<name>` must be closed by `</name>`"))
        }
        ParseErrorKind::ExpectedValue { .. } => (
            "expected a value here",
            Some("values are tags, literals, lists, dicts, sets or links"),
        ),
        ParseErrorKind::InvalidDictKey { .. } => (
            "cannot be used as a key",
            Some("dict keys are identifiers, integers or strings"),
        ),
        ParseErrorKind::UnexpectedEof => ("input ends here", None),
        ParseErrorKind::UnhashableSetMember(_) => (
            "not a scalar",
            Some("set members must be null, booleans, numbers or strings"),
        ),
    };
    (kind.to_string(), label, help)
}

fn link_parts(kind: &LinkErrorKind) -> Parts {
    let (label, help) = match kind {
        LinkErrorKind::MalformedSyntax(_) => (
            "in this link",
            Some("links look like @>tag[1].attribute[0];"),
        ),
        LinkErrorKind::TargetNotFound(_) => ("this link", None),
        LinkErrorKind::TypeMismatch(_) => ("this link", None),
        LinkErrorKind::UnresolvedCycle { .. } => (
            "this link never settles",
            Some("links that only point at each other have no value"),
        ),
    };
    (kind.to_string(), label, help)
}

#[cfg(test)]
mod tests {
    use crate::parse;
    use facet_testhelpers::test;

    fn render(source: &str) -> String {
        let err = parse(source).unwrap_err();
        let rendered = err.render("test.jxi", source);
        String::from_utf8(strip_ansi_escapes::strip(rendered)).unwrap()
    }

    #[test]
    fn test_render_mismatched_closing_tag() {
        let out = render("<tag></other>");
        assert!(out.contains("closing tag `other` does not match opening tag `tag`"), "{out}");
        assert!(out.contains("test.jxi"), "{out}");
        assert!(out.contains("every `<name>` must be closed"), "{out}");
    }

    #[test]
    fn test_render_lex_error() {
        let out = render("<tag a=\"unterminated>");
        assert!(out.contains("unterminated string literal"), "{out}");
        assert!(out.contains("add the closing quote"), "{out}");
    }

    #[test]
    fn test_render_link_cycle() {
        let out = render("<x a=@>y.a;/>\n<y a=@>x.a;/>");
        assert!(out.contains("form a cycle"), "{out}");
    }

    #[test]
    fn test_render_at_end_of_input() {
        let out = render("<tag>");
        assert!(out.contains("unexpected end of input"), "{out}");
    }
}
