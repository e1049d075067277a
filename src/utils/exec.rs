//! External command execution utilities.
//!
//! Provides a Builder-based API for running the build step and foreground
//! helper commands with proper output handling.
//!
//! # Examples
//!
//! ```ignore
//! use crate::utils::exec::Cmd;
//!
//! // Build step: captured output, killed if the caller stops waiting
//! let output = Cmd::from_slice(&config.build.command)
//!     .cwd(config.get_root())
//!     .output()
//!     .await?;
//!
//! // Foreground tool with the terminal attached
//! Cmd::new("node").args(["cli.js", "start"]).run_inherited()?;
//! ```

use crate::log;
use anyhow::{Context, Result};
use regex::Regex;
use std::{
    ffi::{OsStr, OsString},
    path::{Path, PathBuf},
    process::{Command, ExitStatus, Output, Stdio},
    sync::OnceLock,
};

// ============================================================================
// Builder API
// ============================================================================

/// Command builder for external process execution.
#[derive(Default)]
pub struct Cmd {
    program: OsString,
    args: Vec<OsString>,
    cwd: Option<PathBuf>,
    envs: Vec<(String, String)>,
    filter: Option<&'static FilterRule>,
}

impl Cmd {
    /// Create a new command builder.
    pub fn new<S: AsRef<OsStr>>(program: S) -> Self {
        Self {
            program: program.as_ref().to_owned(),
            ..Default::default()
        }
    }

    /// Create from a command array (e.g., `["broccoli", "build", "build"]`).
    pub fn from_slice<S: AsRef<OsStr>>(cmd: &[S]) -> Self {
        let mut iter = cmd.iter();
        let program = iter
            .next()
            .map(|s| s.as_ref().to_owned())
            .unwrap_or_default();
        let args: Vec<_> = iter.map(|s| s.as_ref().to_owned()).collect();
        Self {
            program,
            args,
            ..Default::default()
        }
    }

    /// Add a single argument.
    pub fn arg<S: AsRef<OsStr>>(mut self, arg: S) -> Self {
        let arg = arg.as_ref();
        if !arg.is_empty() {
            self.args.push(arg.to_owned());
        }
        self
    }

    /// Add multiple arguments.
    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<OsStr>,
    {
        for arg in args {
            let arg = arg.as_ref();
            if !arg.is_empty() {
                self.args.push(arg.to_owned());
            }
        }
        self
    }

    /// Set working directory.
    pub fn cwd<P: AsRef<Path>>(mut self, dir: P) -> Self {
        self.cwd = Some(dir.as_ref().to_owned());
        self
    }

    /// Set environment variables for the subprocess.
    pub fn envs<K, V, I>(mut self, vars: I) -> Self
    where
        K: AsRef<str>,
        V: AsRef<str>,
        I: IntoIterator<Item = (K, V)>,
    {
        for (k, v) in vars {
            self.envs.push((k.as_ref().to_owned(), v.as_ref().to_owned()));
        }
        self
    }

    /// Set output filter for logging.
    pub fn filter(mut self, filter: &'static FilterRule) -> Self {
        self.filter = Some(filter);
        self
    }

    /// Get the program name for error messages.
    pub fn program_name(&self) -> String {
        self.program.to_string_lossy().to_string()
    }

    #[cfg(test)]
    pub fn arg_strings(&self) -> Vec<String> {
        self.args.iter().map(|a| a.to_string_lossy().into_owned()).collect()
    }

    /// Run in the foreground with the terminal attached, waiting for exit.
    pub fn run_inherited(self) -> Result<ExitStatus> {
        let name = self.program_name();
        let mut cmd = Command::new(&self.program);
        cmd.args(&self.args)
            .envs(self.envs.iter().cloned())
            .stdin(Stdio::inherit())
            .stdout(Stdio::inherit())
            .stderr(Stdio::inherit());

        if let Some(dir) = &self.cwd {
            cmd.current_dir(dir);
        }

        let status = cmd
            .status()
            .with_context(|| format!("Failed to execute `{name}`"))?;

        if !status.success() {
            anyhow::bail!("Command `{name}` failed with {status}");
        }
        Ok(status)
    }

    /// Run asynchronously, capturing stdout and stderr.
    ///
    /// The child is killed if the returned future is dropped before it
    /// completes. A non-zero exit becomes an error carrying the filtered
    /// output.
    pub async fn output(self) -> Result<Output> {
        let filter = self.filter.unwrap_or(&EMPTY_FILTER);
        let name = self.program_name();

        let mut cmd = tokio::process::Command::new(&self.program);
        cmd.args(&self.args)
            .envs(self.envs.iter().cloned())
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);

        if let Some(dir) = &self.cwd {
            cmd.current_dir(dir);
        }

        let output = cmd
            .output()
            .await
            .with_context(|| format!("Failed to execute `{name}`"))?;

        log_output(&name, &output, filter)?;
        Ok(output)
    }
}

// ============================================================================
// Output Filtering
// ============================================================================

/// Filter rule for command output logging.
///
/// Used to reduce noise by skipping known warnings or irrelevant messages.
pub struct FilterRule {
    /// Prefixes to skip when logging output.
    pub skip_prefixes: &'static [&'static str],
}

impl FilterRule {
    /// Create a new filter rule.
    pub const fn new(skip_prefixes: &'static [&'static str]) -> Self {
        Self { skip_prefixes }
    }

    /// Check if a line should be skipped.
    fn should_skip(&self, line: &str) -> bool {
        line.is_empty() || self.skip_prefixes.iter().any(|p| line.starts_with(p))
    }

    /// Lines of `output` that pass the filter, ANSI colors removed.
    fn keep(&self, output: &str) -> Vec<String> {
        output
            .lines()
            .map(|line| strip_ansi(line).trim().to_string())
            .filter(|line| !self.should_skip(line))
            .collect()
    }

    /// Log output lines that pass the filter.
    pub fn log(&self, name: &str, output: &str) {
        let lines = self.keep(output);
        if !lines.is_empty() {
            log!(name; "{}", lines.join("\n"));
        }
    }
}

/// Empty filter (no skipping).
pub const EMPTY_FILTER: FilterRule = FilterRule::new(&[]);

// ============================================================================
// Helpers
// ============================================================================

/// Strip ANSI escape codes from string.
fn strip_ansi(s: &str) -> std::borrow::Cow<'_, str> {
    static RE: OnceLock<Regex> = OnceLock::new();
    let re = RE.get_or_init(|| Regex::new(r"\x1b\[[0-9;]*m").unwrap());
    re.replace_all(s, "")
}

/// Log command output, returning error on failure.
fn log_output(name: &str, output: &Output, filter: &'static FilterRule) -> Result<()> {
    if !output.status.success() {
        anyhow::bail!(format_error(name, output, filter));
    }

    let stderr = String::from_utf8_lossy(&output.stderr);
    filter.log(name, stderr.trim());
    Ok(())
}

/// Format error message for failed command.
fn format_error(name: &str, output: &Output, filter: &'static FilterRule) -> String {
    let stderr = String::from_utf8_lossy(&output.stderr);
    let stdout = String::from_utf8_lossy(&output.stdout);

    let mut msg = format!("Command `{name}` failed with {}", output.status);

    let stderr_lines = filter.keep(&stderr);
    if !stderr_lines.is_empty() {
        msg.push('\n');
        msg.push_str(&stderr_lines.join("\n"));
    }

    let stdout_lines = filter.keep(&stdout);
    if !stdout_lines.is_empty() {
        msg.push_str("\nStdout:\n");
        msg.push_str(&stdout_lines.join("\n"));
    }
    msg
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cmd_builder() {
        let cmd = Cmd::new("broccoli")
            .arg("build")
            .args(["build", "--verbose"])
            .cwd("/tmp");

        assert_eq!(cmd.program, OsString::from("broccoli"));
        assert_eq!(cmd.args.len(), 3);
        assert_eq!(cmd.cwd, Some(PathBuf::from("/tmp")));
    }

    #[test]
    fn test_from_slice() {
        let cmd = Cmd::from_slice(&["node", "fern/run_selenium_tests.es"]);
        assert_eq!(cmd.program_name(), "node");
        assert_eq!(cmd.args, [OsString::from("fern/run_selenium_tests.es")]);
    }

    #[test]
    fn test_empty_args_filtered() {
        let cmd = Cmd::new("echo").arg("").args(["a", "", "b"]);
        assert_eq!(cmd.args.len(), 2);
    }

    #[test]
    fn test_filter_rule() {
        let filter = FilterRule::new(&["WARN:", "npm notice"]);
        assert!(filter.should_skip("WARN: something"));
        assert!(filter.should_skip("npm notice new version"));
        assert!(!filter.should_skip("Error: something"));
        assert!(filter.should_skip(""));
    }

    #[test]
    fn test_filter_keep_strips_ansi() {
        let kept = EMPTY_FILTER.keep("\x1b[31mSyntaxError\x1b[0m\n\n  at line 3  ");
        assert_eq!(kept, ["SyntaxError", "at line 3"]);
        assert!(FilterRule::new(&[""]).keep("anything\nat all").is_empty());
    }

    #[test]
    fn test_strip_ansi() {
        assert_eq!(strip_ansi("\x1b[31mRed\x1b[0m"), "Red");
        assert_eq!(strip_ansi("Plain text"), "Plain text");
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_output_success() {
        let output = Cmd::new("echo").arg("hello").output().await.unwrap();
        assert!(output.status.success());
        assert!(String::from_utf8_lossy(&output.stdout).contains("hello"));
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_output_failure_carries_stderr() {
        let err = Cmd::new("sh")
            .args(["-c", "echo SyntaxError >&2; exit 3"])
            .output()
            .await
            .unwrap_err();
        let msg = err.to_string();
        assert!(msg.contains("`sh` failed"));
        assert!(msg.contains("SyntaxError"));
    }

    #[test]
    fn test_run_inherited_missing_program() {
        assert!(Cmd::new("fern-definitely-missing-program").run_inherited().is_err());
    }
}
