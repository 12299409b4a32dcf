use super::{ResolutionError, ResolutionErrorKind};
use crate::{lexer::LineBreaks, parser::formatter::label_range};
use ariadne::{Color, Fmt, Label, Report, ReportKind, Source};
use std::{fmt::Write, path::Path};

const WRITE_FMT_MSG: &str = "Encountered an error while attempting to write format string to buffer.";
const ARIADNE_MSG: &str = "Ariadne produces valid utf-8 strings";
const ARIADNE_WRITE_MSG: &str = "Write into buffer should not fail.";

pub trait ResolverFormatter {
    fn format_error(&self, error: &ResolutionError) -> String {
        let mut buffer = String::new();
        self.format_error_in_place(&mut buffer, error);
        buffer
    }
    fn format_error_in_place(&self, buffer: &mut String, error: &ResolutionError);
}

pub struct BasicResolverFormatter<'src> {
    text: &'src str,
    line_breaks: LineBreaks,
}

impl<'src> BasicResolverFormatter<'src> {
    pub fn new(text: &'src str) -> Self {
        Self {
            text,
            line_breaks: LineBreaks::new(text),
        }
    }
}

impl<'src> ResolverFormatter for BasicResolverFormatter<'src> {
    fn format_error_in_place(&self, buffer: &mut String, error: &ResolutionError) {
        let line = self.line_breaks.get_line_from_span(error.span);
        let lexeme = self.text.get(error.span.range()).unwrap_or_default();
        write!(buffer, "[line {line}] Error at '{lexeme}': {}", error.kind).expect(WRITE_FMT_MSG);
    }
}

pub struct PrettyResolverFormatter<'src> {
    text: &'src str,
    path: &'src Path,
}

impl<'src> PrettyResolverFormatter<'src> {
    pub fn new(text: &'src str, path: &'src Path) -> Self {
        Self { text, path }
    }
}

impl<'src> ResolverFormatter for PrettyResolverFormatter<'src> {
    fn format_error_in_place(&self, buffer: &mut String, error: &ResolutionError) {
        let path = &self.path.to_string_lossy();
        let mut output = std::io::Cursor::new(Vec::new());
        let range = label_range(error.span);
        let report = Report::build(ReportKind::Error, (path, range.clone()))
            .with_code(error.code())
            .with_message(error.kind.to_string());

        let report = match &error.kind {
            ResolutionErrorKind::SelfReferentialInitializer {
                destination,
                reference,
            } => report
                .with_label(
                    Label::new((path, label_range(destination.span)))
                        .with_message(format!(
                            "The variable {} is declared here...",
                            destination.as_str().fg(Color::BrightRed)
                        ))
                        .with_color(Color::BrightRed),
                )
                .with_label(
                    Label::new((path, label_range(reference.span)))
                        .with_message("...and read before its initializer finishes")
                        .with_color(Color::BrightYellow),
                ),
            ResolutionErrorKind::ShadowLocal { old, new } => report
                .with_label(
                    Label::new((path, label_range(old.span)))
                        .with_message("Variable is first declared here...")
                        .with_color(Color::BrightRed),
                )
                .with_label(
                    Label::new((path, label_range(new.span)))
                        .with_message("...but is declared again over here")
                        .with_color(Color::BrightYellow),
                ),
            ResolutionErrorKind::NonFunctionReturn => report.with_label(
                Label::new((path, range))
                    .with_message("Returning from here is an invalid operation")
                    .with_color(Color::BrightRed),
            ),
            ResolutionErrorKind::InitializerReturn => report.with_label(
                Label::new((path, range))
                    .with_message("Initializers always return the instance")
                    .with_color(Color::BrightRed),
            ),
            ResolutionErrorKind::NonClassThis | ResolutionErrorKind::NonClassSuper => report
                .with_label(
                    Label::new((path, range))
                        .with_message("There is no enclosing class here")
                        .with_color(Color::BrightRed),
                ),
            ResolutionErrorKind::NoSuperClassSuper => report.with_label(
                Label::new((path, range))
                    .with_message("The enclosing class does not inherit from anything")
                    .with_color(Color::BrightRed),
            ),
            ResolutionErrorKind::SelfInheritance(name) => report.with_label(
                Label::new((path, range))
                    .with_message(format!(
                        "{} is named as its own superclass",
                        name.as_str().fg(Color::BrightRed)
                    ))
                    .with_color(Color::BrightRed),
            ),
        };

        report
            .finish()
            .write((path, Source::from(self.text)), &mut output)
            .expect(ARIADNE_WRITE_MSG);
        buffer.push_str(&String::from_utf8(output.into_inner()).expect(ARIADNE_MSG));
    }
}
