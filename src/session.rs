use crate::{
    interpreter::{Interpreter, SystemContext},
    parser::{
        formatter::{BasicParserFormatter, ParserFormatter, PrettyParserFormatter},
        Ast, Parser,
    },
    resolver::{
        formatter::{BasicResolverFormatter, PrettyResolverFormatter, ResolverFormatter},
        Resolver,
    },
    value::formatter::{BasicRuntimeFormatter, PrettyRuntimeFormatter, RuntimeFormatter},
};
use std::path::Path;

/// How diagnostics are rendered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ReportStyle {
    /// One plain line per error, in the conventional Lox format.
    #[default]
    Basic,
    /// Annotated source snippets.
    Pretty,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunStatus {
    Completed,
    StaticError,
    RuntimeError,
}

impl RunStatus {
    pub fn exit_code(&self) -> u8 {
        match self {
            RunStatus::Completed => 0,
            RunStatus::StaticError => 65,
            RunStatus::RuntimeError => 70,
        }
    }
}

/// Everything that survives between successive chunks of source: the text
/// seen so far, the syntax tree, and the interpreter with its globals.
pub struct Session<C: SystemContext> {
    source: String,
    ast: Ast,
    interpreter: Interpreter<C>,
    style: ReportStyle,
    had_error: bool,
    had_runtime_error: bool,
}

impl<C> Session<C>
where
    C: SystemContext,
{
    pub fn new(context: C, style: ReportStyle) -> Self {
        Self {
            source: String::new(),
            ast: Ast::default(),
            interpreter: Interpreter::new(context),
            style,
            had_error: false,
            had_runtime_error: false,
        }
    }

    /// Scans, parses, resolves and runs `source`. Each stage only starts if
    /// the previous one reported nothing.
    pub fn run(&mut self, source: &str, path: &Path) -> RunStatus {
        let start = self.source.len();
        self.source.push_str(source);
        log::info!("Running {} bytes from {}", source.len(), path.display());

        let statements = match Parser::starting_at(&self.source, start, &mut self.ast).parse() {
            Ok(statements) => statements,
            Err(errors) => {
                log::info!("Parsing failed with {} errors", errors.len());
                let reports: Vec<String> = match self.style {
                    ReportStyle::Basic => {
                        let formatter = BasicParserFormatter::new(&self.source);
                        errors.iter().map(|e| formatter.format_error(e)).collect()
                    }
                    ReportStyle::Pretty => {
                        let formatter = PrettyParserFormatter::new(&self.source, path);
                        errors.iter().map(|e| formatter.format_error(e)).collect()
                    }
                };
                return self.fail_static(&reports);
            }
        };

        let resolution = match Resolver::new(&self.ast).resolve(&statements) {
            Ok(resolution) => resolution,
            Err(errors) => {
                log::info!("Resolution failed with {} errors", errors.len());
                let reports: Vec<String> = match self.style {
                    ReportStyle::Basic => {
                        let formatter = BasicResolverFormatter::new(&self.source);
                        errors.iter().map(|e| formatter.format_error(e)).collect()
                    }
                    ReportStyle::Pretty => {
                        let formatter = PrettyResolverFormatter::new(&self.source, path);
                        errors.iter().map(|e| formatter.format_error(e)).collect()
                    }
                };
                return self.fail_static(&reports);
            }
        };
        log::info!("Resolved {} local references", resolution.len());
        self.interpreter.resolve(resolution);

        match self.interpreter.interpret(&self.ast, &statements) {
            Ok(()) => RunStatus::Completed,
            Err(error) => {
                log::info!("Execution stopped by runtime error {}", error.code());
                let report = match self.style {
                    ReportStyle::Basic => {
                        BasicRuntimeFormatter::new(&self.source).format_error(&error)
                    }
                    ReportStyle::Pretty => {
                        PrettyRuntimeFormatter::new(&self.source, path).format_error(&error)
                    }
                };
                self.interpreter.context_mut().ewriteln(&report);
                self.had_runtime_error = true;
                RunStatus::RuntimeError
            }
        }
    }

    fn fail_static(&mut self, reports: &[String]) -> RunStatus {
        let context = self.interpreter.context_mut();
        for report in reports {
            context.ewriteln(report);
        }
        self.had_error = true;
        RunStatus::StaticError
    }

    pub fn had_error(&self) -> bool {
        self.had_error
    }

    pub fn had_runtime_error(&self) -> bool {
        self.had_runtime_error
    }

    /// Clears the static error flag so the next REPL line starts clean.
    pub fn reset_error(&mut self) {
        self.had_error = false;
    }

    pub fn context(&self) -> &C {
        self.interpreter.context()
    }

    pub fn into_context(self) -> C {
        self.interpreter.into_context()
    }
}
