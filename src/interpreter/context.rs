use super::SystemContext;

/// Program output to stdout, diagnostics to stderr.
pub struct StdioContext;

impl SystemContext for StdioContext {
    fn writeln(&mut self, text: &str) {
        println!("{text}");
    }

    fn ewriteln(&mut self, text: &str) {
        eprintln!("{text}");
    }
}

/// Captures both streams in memory.
#[derive(Debug, Default)]
pub struct BufferedContext {
    buffer: String,
    errors: String,
}

impl BufferedContext {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn output(&self) -> &str {
        &self.buffer
    }

    pub fn errors(&self) -> &str {
        &self.errors
    }
}

impl SystemContext for BufferedContext {
    fn writeln(&mut self, text: &str) {
        self.buffer.push_str(text);
        self.buffer.push('\n');
    }

    fn ewriteln(&mut self, text: &str) {
        self.errors.push_str(text);
        self.errors.push('\n');
    }
}
