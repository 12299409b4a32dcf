use super::error::{RuntimeError, RuntimeErrorKind};
use crate::{interpreter::MAX_CALL_DEPTH, lexer::LineBreaks, parser::formatter::label_range};
use ariadne::{Color, Fmt, Label, Report, ReportKind, Source};
use std::{fmt::Write, path::Path};

const WRITE_FMT_MSG: &str = "Encountered an error while attempting to write format string to buffer.";
const ARIADNE_MSG: &str = "Ariadne produces valid utf-8 strings";
const ARIADNE_WRITE_MSG: &str = "Write into buffer should not fail.";

pub trait RuntimeFormatter {
    fn format_error(&self, error: &RuntimeError) -> String {
        let mut buffer = String::new();
        self.format_error_in_place(&mut buffer, error);
        buffer
    }
    fn format_error_in_place(&self, buffer: &mut String, error: &RuntimeError);
}

/// The message, then `[line N]` on its own line.
pub struct BasicRuntimeFormatter {
    line_breaks: LineBreaks,
}

impl BasicRuntimeFormatter {
    pub fn new(text: &str) -> Self {
        Self {
            line_breaks: LineBreaks::new(text),
        }
    }
}

impl RuntimeFormatter for BasicRuntimeFormatter {
    fn format_error_in_place(&self, buffer: &mut String, error: &RuntimeError) {
        let line = self.line_breaks.get_line_from_span(error.span);
        write!(buffer, "{}\n[line {line}]", error.kind).expect(WRITE_FMT_MSG);
    }
}

pub struct PrettyRuntimeFormatter<'src> {
    text: &'src str,
    path: &'src Path,
}

impl<'src> PrettyRuntimeFormatter<'src> {
    pub fn new(text: &'src str, path: &'src Path) -> Self {
        Self { text, path }
    }
}

impl<'src> RuntimeFormatter for PrettyRuntimeFormatter<'src> {
    fn format_error_in_place(&self, buffer: &mut String, error: &RuntimeError) {
        let path = &self.path.to_string_lossy();
        let mut output = std::io::Cursor::new(Vec::new());
        let range = label_range(error.span);

        let label = match &error.kind {
            RuntimeErrorKind::NonNumeric(value) => format!(
                "This evaluates to {} and not a number",
                value.type_name().fg(Color::BrightRed)
            ),
            RuntimeErrorKind::NonNumerics(lhs, rhs) | RuntimeErrorKind::NonAddable(lhs, rhs) => {
                format!(
                    "The operands are {} and {}",
                    lhs.type_name().fg(Color::BrightRed),
                    rhs.type_name().fg(Color::BrightRed)
                )
            }
            RuntimeErrorKind::UndefinedVariable(name) => {
                format!("{} is not defined here", name.fg(Color::BrightRed))
            }
            RuntimeErrorKind::InvalidCallee(value) => format!(
                "This is {} and can't be called",
                value.type_name().fg(Color::BrightRed)
            ),
            RuntimeErrorKind::InvalidArgumentCount { actual, expected } => {
                format!("Called with {actual} where {expected} are needed")
            }
            RuntimeErrorKind::InvalidInstanceGet(value)
            | RuntimeErrorKind::InvalidInstanceSet(value) => format!(
                "This is {} and not an instance",
                value.type_name().fg(Color::BrightRed)
            ),
            RuntimeErrorKind::UndefinedProperty { object, name } => format!(
                "{} has no field or method {}",
                object,
                name.fg(Color::BrightRed)
            ),
            RuntimeErrorKind::InvalidSuperClass(value) => format!(
                "This is {} and not a class",
                value.type_name().fg(Color::BrightRed)
            ),
            RuntimeErrorKind::NativeFailure { name, .. } => {
                format!("The call to {} failed here", name.fg(Color::BrightRed))
            }
            RuntimeErrorKind::StackOverflow => {
                format!("This call nests deeper than {MAX_CALL_DEPTH} calls")
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
