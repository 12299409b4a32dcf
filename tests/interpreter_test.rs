use std::{
    fs::{read_dir, read_to_string},
    path::Path,
};

use color_eyre::{eyre::Context, Result};
use treelox::{
    interpreter::context::BufferedContext,
    session::{ReportStyle, RunStatus, Session},
};

#[test]
fn test_assignment() -> Result<()> {
    let input_dir = Path::new("./test_data/interpreter/assignment");
    test_engine(input_dir)
}

#[test]
fn test_block() -> Result<()> {
    let input_dir = Path::new("./test_data/interpreter/block");
    test_engine(input_dir)
}

#[test]
fn test_bool() -> Result<()> {
    let input_dir = Path::new("./test_data/interpreter/bool");
    test_engine(input_dir)
}

#[test]
fn test_call() -> Result<()> {
    let input_dir = Path::new("./test_data/interpreter/call");
    test_engine(input_dir)
}

#[test]
fn test_class() -> Result<()> {
    let input_dir = Path::new("./test_data/interpreter/class");
    test_engine(input_dir)
}

#[test]
fn test_closure() -> Result<()> {
    let input_dir = Path::new("./test_data/interpreter/closure");
    test_engine(input_dir)
}

#[test]
fn test_comments() -> Result<()> {
    let input_dir = Path::new("./test_data/interpreter/comments");
    test_engine(input_dir)
}

#[test]
fn test_constructor() -> Result<()> {
    let input_dir = Path::new("./test_data/interpreter/constructor");
    test_engine(input_dir)
}

#[test]
fn test_field() -> Result<()> {
    let input_dir = Path::new("./test_data/interpreter/field");
    test_engine(input_dir)
}

#[test]
fn test_for() -> Result<()> {
    let input_dir = Path::new("./test_data/interpreter/for");
    test_engine(input_dir)
}

#[test]
fn test_function() -> Result<()> {
    let input_dir = Path::new("./test_data/interpreter/function");
    test_engine(input_dir)
}

#[test]
fn test_if() -> Result<()> {
    let input_dir = Path::new("./test_data/interpreter/if");
    test_engine(input_dir)
}

#[test]
fn test_inheritance() -> Result<()> {
    let input_dir = Path::new("./test_data/interpreter/inheritance");
    test_engine(input_dir)
}

#[test]
fn test_logical_operator() -> Result<()> {
    let input_dir = Path::new("./test_data/interpreter/logical_operator");
    test_engine(input_dir)
}

#[test]
fn test_method() -> Result<()> {
    let input_dir = Path::new("./test_data/interpreter/method");
    test_engine(input_dir)
}

#[test]
fn test_miscellaneous() -> Result<()> {
    let input_dir = Path::new("./test_data/interpreter/miscellaneous");
    test_engine(input_dir)
}

#[test]
fn test_nil() -> Result<()> {
    let input_dir = Path::new("./test_data/interpreter/nil");
    test_engine(input_dir)
}

#[test]
fn test_number() -> Result<()> {
    let input_dir = Path::new("./test_data/interpreter/number");
    test_engine(input_dir)
}

#[test]
fn test_operator() -> Result<()> {
    let input_dir = Path::new("./test_data/interpreter/operator");
    test_engine(input_dir)
}

#[test]
fn test_print() -> Result<()> {
    let input_dir = Path::new("./test_data/interpreter/print");
    test_engine(input_dir)
}

#[test]
fn test_return() -> Result<()> {
    let input_dir = Path::new("./test_data/interpreter/return");
    test_engine(input_dir)
}

#[test]
fn test_string() -> Result<()> {
    let input_dir = Path::new("./test_data/interpreter/string");
    test_engine(input_dir)
}

#[test]
fn test_super() -> Result<()> {
    let input_dir = Path::new("./test_data/interpreter/super");
    test_engine(input_dir)
}

#[test]
fn test_this() -> Result<()> {
    let input_dir = Path::new("./test_data/interpreter/this");
    test_engine(input_dir)
}

#[test]
fn test_variable() -> Result<()> {
    let input_dir = Path::new("./test_data/interpreter/variable");
    test_engine(input_dir)
}

#[test]
fn test_while() -> Result<()> {
    let input_dir = Path::new("./test_data/interpreter/while");
    test_engine(input_dir)
}

struct TestCase {
    name: String,
    source: String,
    output: String,
    compiler_errors: Vec<String>,
    runtime_error: Option<String>,
}

impl TestCase {
    fn expected_status(&self) -> RunStatus {
        if !self.compiler_errors.is_empty() {
            RunStatus::StaticError
        } else if self.runtime_error.is_some() {
            RunStatus::RuntimeError
        } else {
            RunStatus::Completed
        }
    }

    fn expected_errors(&self) -> String {
        let mut buffer = String::new();
        for error in self.compiler_errors.iter().chain(self.runtime_error.iter()) {
            buffer.push_str(error);
            buffer.push('\n');
        }
        buffer
    }

    pub fn check(&self) {
        let mut session = Session::new(BufferedContext::new(), ReportStyle::Basic);
        let status = session.run(&self.source, Path::new(&self.name));
        let context = session.into_context();

        assert_eq!(
            self.expected_errors(),
            context.errors(),
            "Failed test {} at diagnostics.",
            self.name,
        );
        assert_eq!(
            self.expected_status(),
            status,
            "Failed test {} at exit status.",
            self.name,
        );
        assert_eq!(
            self.output,
            context.output(),
            "Failed test {} at print.",
            self.name
        );
    }
}

fn test_engine(input_dir: &Path) -> Result<()> {
    let mut succeeded = true;
    for entry in read_dir(input_dir).context("Failed to open input test data folder")? {
        let entry = entry?;
        let path = entry.path();

        let Some(extension) = path.extension() else {
            continue;
        };

        if extension != "lox" {
            continue;
        }

        println!("Parsing {path:?}");
        let test_case = parse_test_case(&path)?;
        println!("Checking {}", test_case.name);

        let res = std::panic::catch_unwind(|| {
            test_case.check();
        });
        if res.is_err() {
            println!("\tFails test case {}", test_case.name);
            succeeded = false;
        }
    }

    assert!(succeeded, "Some test cases in {input_dir:?} failed.");
    Ok(())
}

fn parse_test_case(input_path: &Path) -> Result<TestCase> {
    let test_name = AsRef::<Path>::as_ref(
        input_path
            .file_name()
            .expect("File name can't be none as the path is to a real file."),
    )
    .to_string_lossy();

    let input = read_to_string(input_path).context("Failed to open input test data file")?;

    let mut source_lines = Vec::new();
    let mut expected_outputs = Vec::new();
    let mut expected_compiler_errors = Vec::new();
    let mut expected_runtime_error = None;

    for (line_index, line) in input.lines().enumerate() {
        let line_number = line_index + 1;
        if let Some(comment_index) = line.find("// expect:") {
            let expected = line[comment_index..]
                .strip_prefix("// expect:")
                .unwrap()
                .trim()
                .to_string();
            expected_outputs.push(expected);
        } else if let Some(comment_index) = line.find("// Error at") {
            let expected = line[comment_index..].strip_prefix("// ").unwrap().trim();
            expected_compiler_errors.push(format!("[line {line_number}] {expected}"));
        } else if let Some(comment_index) = line.find("// [line ") {
            let expected = line[comment_index..].strip_prefix("// ").unwrap().trim();
            expected_compiler_errors.push(expected.to_string());
        } else if let Some(comment_index) = line.find("// expect runtime error [line ") {
            // The error is raised on another line than the one carrying the comment.
            let (error_line, expected) = line[comment_index..]
                .strip_prefix("// expect runtime error [line ")
                .unwrap()
                .split_once("]:")
                .expect("Runtime error annotation names a line.");
            expected_runtime_error = Some(format!("{}\n[line {}]", expected.trim(), error_line));
        } else if let Some(comment_index) = line.find("// expect runtime error:") {
            let expected = line[comment_index..]
                .strip_prefix("// expect runtime error:")
                .unwrap()
                .trim();
            expected_runtime_error = Some(format!("{expected}\n[line {line_number}]"));
        }
        source_lines.push(line.to_string());
    }

    let mut output = expected_outputs.join("\n");
    if !expected_outputs.is_empty() {
        output.push('\n');
    }
    Ok(TestCase {
        name: test_name.into_owned(),
        source: source_lines.join("\n"),
        output,
        compiler_errors: expected_compiler_errors,
        runtime_error: expected_runtime_error,
    })
}
