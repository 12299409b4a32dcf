use super::{ParserError, ParserErrorKind};
use crate::lexer::{LexicalErrorKind, LineBreaks, Span};
use ariadne::{Color, Fmt, Label, Report, ReportKind, Source};
use std::{fmt::Write, ops::Range, path::Path};

const WRITE_FMT_MSG: &str = "Encountered an error while attempting to write format string to buffer.";
const ARIADNE_MSG: &str = "Ariadne produces valid utf-8 strings";
const ARIADNE_WRITE_MSG: &str = "Write into buffer should not fail.";

pub trait ParserFormatter {
    fn format_error(&self, error: &ParserError) -> String {
        let mut buffer = String::new();
        self.format_error_in_place(&mut buffer, error);
        buffer
    }
    fn format_error_in_place(&self, buffer: &mut String, error: &ParserError);
}

/// `[line N] Error at 'lexeme': message`, one line per error.
pub struct BasicParserFormatter<'src> {
    text: &'src str,
    line_breaks: LineBreaks,
}

impl<'src> BasicParserFormatter<'src> {
    pub fn new(text: &'src str) -> Self {
        Self {
            text,
            line_breaks: LineBreaks::new(text),
        }
    }
}

impl<'src> ParserFormatter for BasicParserFormatter<'src> {
    fn format_error_in_place(&self, buffer: &mut String, error: &ParserError) {
        match &error.kind {
            ParserErrorKind::Lexical(lexical) => {
                let line = self.line_breaks.get_line(lexical.report_offset());
                write!(buffer, "[line {line}] Error: {lexical}").expect(WRITE_FMT_MSG);
            }
            kind => {
                let line = self.line_breaks.get_line_from_span(error.span);
                if error.is_at_end() {
                    write!(buffer, "[line {line}] Error at end: {kind}").expect(WRITE_FMT_MSG);
                } else {
                    let lexeme = self.text.get(error.span.range()).unwrap_or_default();
                    write!(buffer, "[line {line}] Error at '{lexeme}': {kind}")
                        .expect(WRITE_FMT_MSG);
                }
            }
        }
    }
}

pub struct PrettyParserFormatter<'src> {
    text: &'src str,
    path: &'src Path,
}

impl<'src> PrettyParserFormatter<'src> {
    pub fn new(text: &'src str, path: &'src Path) -> Self {
        Self { text, path }
    }
}

/// Ariadne needs a non-empty range to draw a label, so the end-of-input
/// position borrows the last character.
pub(crate) fn label_range(span: Span) -> Range<usize> {
    let range = span.range();
    if range.is_empty() && range.start > 0 {
        range.start - 1..range.start
    } else {
        range
    }
}

impl<'src> ParserFormatter for PrettyParserFormatter<'src> {
    fn format_error_in_place(&self, buffer: &mut String, error: &ParserError) {
        let path = &self.path.to_string_lossy();
        let mut output = std::io::Cursor::new(Vec::new());
        let range = label_range(error.span);

        let label = match &error.kind {
            ParserErrorKind::Lexical(lexical) => match lexical.kind {
                LexicalErrorKind::Unrecognized(c) => {
                    format!("The character {} is not part of the language", c.fg(Color::Red))
                }
                LexicalErrorKind::UnclosedString => {
                    "This string is never closed".to_string()
                }
            },
            ParserErrorKind::Expect(_) if error.is_at_end() => {
                "The input ends here".to_string()
            }
            ParserErrorKind::Expect(_) => "Found this instead".to_string(),
            ParserErrorKind::ExpectExpression => "This can't start an expression".to_string(),
            ParserErrorKind::InvalidAssignmentTarget => {
                "The left hand side of this assignment is not a variable or property".to_string()
            }
            ParserErrorKind::TooManyArguments(limit) | ParserErrorKind::TooManyParameters(limit) => {
                format!("This goes past the limit of {limit}")
            }
        };

        Report::build(ReportKind::Error, (path, range.clone()))
            .with_code(error.code())
            .with_message(error.kind.to_string())
            .with_label(
                Label::new((path, range))
                    .with_message(label)
                    .with_color(Color::BrightRed),
            )
            .finish()
            .write((path, Source::from(self.text)), &mut output)
            .expect(ARIADNE_WRITE_MSG);
        buffer.push_str(&String::from_utf8(output.into_inner()).expect(ARIADNE_MSG));
    }
}
