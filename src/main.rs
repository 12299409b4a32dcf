use clap::{ArgAction, Parser, Subcommand, ValueEnum};
use color_eyre::eyre::{Result, WrapErr};
use std::{
    fs::read_to_string,
    io::{BufRead, Write},
    path::{Path, PathBuf},
    process::ExitCode,
};
use treelox::{
    interpreter::context::StdioContext,
    session::{ReportStyle, RunStatus, Session},
};

#[derive(Debug, Parser)]
#[clap(name = "treelox", version, about = "Tree-walking interpreter for Lox")]
pub struct CLArgs {
    #[clap(subcommand)]
    pub routine: TreeloxCommand,
    /// Raise log verbosity (-v info, -vv debug, -vvv trace).
    #[clap(short, long, global = true, action = ArgAction::Count)]
    pub verbose: u8,
}

#[derive(Debug, Subcommand)]
pub enum TreeloxCommand {
    /// Run a Lox script.
    Run {
        path: PathBuf,
        #[clap(long = "format", value_enum, default_value = "basic")]
        format: ReportFormat,
    },
    /// Start an interactive prompt.
    Repl {
        #[clap(long = "format", value_enum, default_value = "basic")]
        format: ReportFormat,
    },
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum ReportFormat {
    Basic,
    Pretty,
}

impl From<ReportFormat> for ReportStyle {
    fn from(value: ReportFormat) -> Self {
        match value {
            ReportFormat::Basic => ReportStyle::Basic,
            ReportFormat::Pretty => ReportStyle::Pretty,
        }
    }
}

fn main() -> Result<ExitCode> {
    color_eyre::install()?;
    let args = CLArgs::parse();
    init_logger(args.verbose);
    log::debug!("CLI arguments: {args:?}");

    match args.routine {
        TreeloxCommand::Run { path, format } => run_file(&path, format.into()),
        TreeloxCommand::Repl { format } => run_prompt(format.into()),
    }
}

fn init_logger(verbosity: u8) {
    let level = match verbosity {
        0 => log::LevelFilter::Warn,
        1 => log::LevelFilter::Info,
        2 => log::LevelFilter::Debug,
        _ => log::LevelFilter::Trace,
    };
    // RUST_LOG, when set, takes precedence over the flag.
    env_logger::Builder::new()
        .filter_level(level)
        .parse_default_env()
        .target(env_logger::Target::Stderr)
        .init();
}

fn run_file(path: &Path, style: ReportStyle) -> Result<ExitCode> {
    let src = read_to_string(path).wrap_err_with(|| format!("Failed to read {path:?}"))?;
    let mut session = Session::new(StdioContext, style);
    let status = session.run(&src, path);
    Ok(ExitCode::from(status.exit_code()))
}

fn run_prompt(style: ReportStyle) -> Result<ExitCode> {
    let path = Path::new("<repl>");
    let mut session = Session::new(StdioContext, style);
    let stdin = std::io::stdin();
    let mut stdout = std::io::stdout();
    let mut line = String::new();

    loop {
        write!(stdout, "> ")?;
        stdout.flush()?;
        line.clear();
        if stdin.lock().read_line(&mut line)? == 0 {
            break;
        }
        let status = session.run(&line, path);
        if status != RunStatus::Completed {
            log::debug!("Line finished with {status:?}");
        }
        session.reset_error();
    }
    Ok(ExitCode::SUCCESS)
}
