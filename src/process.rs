//! External tool invocation.
//!
//! Every external step (curl, tar, patch, cmake) goes through [`Cmd`]:
//! a non-zero exit is always an error, and `error_msg` replaces the
//! generic failure text with an actionable one.

use std::ffi::{OsStr, OsString};
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};

use anyhow::{Context, Result};

/// Builder for one external tool invocation.
pub struct Cmd {
    program: String,
    args: Vec<OsString>,
    current_dir: Option<PathBuf>,
    error_msg: Option<String>,
}

impl Cmd {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
            current_dir: None,
            error_msg: None,
        }
    }

    pub fn arg(mut self, arg: impl AsRef<OsStr>) -> Self {
        self.args.push(arg.as_ref().to_os_string());
        self
    }

    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<OsStr>,
    {
        for arg in args {
            self.args.push(arg.as_ref().to_os_string());
        }
        self
    }

    /// Append a path argument without lossy string conversion.
    pub fn arg_path(mut self, path: &Path) -> Self {
        self.args.push(path.as_os_str().to_os_string());
        self
    }

    pub fn current_dir(mut self, dir: &Path) -> Self {
        self.current_dir = Some(dir.to_path_buf());
        self
    }

    /// Message to report instead of the generic failure text.
    pub fn error_msg(mut self, msg: impl Into<String>) -> Self {
        self.error_msg = Some(msg.into());
        self
    }

    fn command(&self) -> Command {
        let mut command = Command::new(&self.program);
        command.args(&self.args);
        if let Some(dir) = &self.current_dir {
            command.current_dir(dir);
        }
        command
    }

    fn fail(&self, status: std::process::ExitStatus, stderr: &str) -> anyhow::Error {
        let detail = stderr.trim();
        match &self.error_msg {
            Some(msg) if detail.is_empty() => anyhow::anyhow!("{}", msg),
            Some(msg) => anyhow::anyhow!("{}\n{}", msg, detail),
            None if detail.is_empty() => {
                anyhow::anyhow!("'{}' failed with {}", self.program, status)
            }
            None => anyhow::anyhow!("'{}' failed with {}:\n{}", self.program, status, detail),
        }
    }

    /// Run with captured output; stderr is folded into the error.
    pub fn run(self) -> Result<()> {
        let output = self
            .command()
            .stdin(Stdio::null())
            .output()
            .with_context(|| format!("failed to launch '{}'", self.program))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(self.fail(output.status, &stderr));
        }
        Ok(())
    }

    /// Run with the terminal attached (progress bars, build output).
    pub fn run_interactive(self) -> Result<()> {
        let status = self
            .command()
            .status()
            .with_context(|| format!("failed to launch '{}'", self.program))?;

        if !status.success() {
            return Err(self.fail(status, ""));
        }
        Ok(())
    }
}

/// Find a tool on PATH.
pub fn which(tool: &str) -> Option<PathBuf> {
    let path = std::env::var_os("PATH")?;
    for dir in std::env::split_paths(&path) {
        let candidate = dir.join(tool);
        if candidate.is_file() {
            return Some(candidate);
        }
    }
    None
}

/// Whether a tool is available on PATH.
pub fn exists(tool: &str) -> bool {
    which(tool).is_some()
}
