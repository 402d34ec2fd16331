use std::fmt;

/// A command-line tool call: program plus argument vector, never a shell string.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToolInvocation {
    program: String,
    args: Vec<String>,
    /// Files, relative to the working directory, the call is expected to write.
    outputs: Vec<String>,
}

impl ToolInvocation {
    pub fn new(program: &str, args: Vec<String>) -> Self {
        Self { program: program.to_string(), args, outputs: Vec::new() }
    }

    /// Declares a file the tool writes, so callers can verify or move it.
    pub fn producing(mut self, file: &str) -> Self {
        self.outputs.push(file.to_string());
        self
    }

    pub fn program(&self) -> &str { &self.program }
    pub fn args(&self) -> &[String] { &self.args }
    pub fn outputs(&self) -> &[String] { &self.outputs }
}

impl fmt::Display for ToolInvocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.program)?;
        for arg in &self.args {
            if arg.is_empty() || arg.contains([' ', '"', '(', ')', '*']) {
                write!(f, " \"{}\"", arg.replace('"', "\\\""))?;
            } else {
                write!(f, " {arg}")?;
            }
        }
        Ok(())
    }
}
