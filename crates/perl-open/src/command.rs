//! Command lines for process-backed handles.
//!
//! A command is either spawned directly from an argument vector, or handed
//! to a shell as a single `-c` argument. Only the shell form understands
//! pipelines, redirections and command substitution.

use std::ffi::OsStr;
use std::fmt;
use std::process::Command;

use crate::error::{Error, Result};

/// Characters that make [`CommandLine::detect`] pick the shell form.
pub const SHELL_METACHARACTERS: &[char] = &['|', '<', '>', '`', ';'];

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CommandLine {
    /// Program followed by its arguments, spawned without a shell.
    Direct(Vec<String>),
    /// Text interpreted by a shell.
    Shell(String),
}

impl CommandLine {
    /// Spawn `argv[0]` with the remaining elements as arguments. No shell is involved.
    pub fn direct<I, S>(argv: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let argv: Vec<String> = argv.into_iter().map(Into::into).collect();
        match argv.first() {
            Some(program) if !program.is_empty() => Ok(Self::Direct(argv)),
            _ => Err(Error::InvalidCommand(argv.join(" "))),
        }
    }

    /// Run `text` through a shell.
    ///
    /// The text is executed verbatim: if any part of it comes from an
    /// untrusted source this is a command injection vector.
    pub fn shell(text: impl Into<String>) -> Result<Self> {
        let text = text.into();
        if text.trim().is_empty() {
            return Err(Error::InvalidCommand(text));
        }
        Ok(Self::Shell(text))
    }

    /// Pick the shell form if `text` contains any of [`SHELL_METACHARACTERS`],
    /// otherwise split it with shell quoting rules and spawn directly.
    ///
    /// The same injection caveat as [`CommandLine::shell`] applies whenever
    /// the text contains a metacharacter.
    pub fn detect(text: &str) -> Result<Self> {
        let text = text.trim();
        if text.contains(SHELL_METACHARACTERS) {
            return Self::shell(text);
        }
        match shlex::split(text) {
            Some(argv) => Self::direct(argv),
            None => Err(Error::InvalidCommand(text.to_string())),
        }
    }

    pub fn is_shell(&self) -> bool {
        matches!(self, Self::Shell(_))
    }

    /// Build the [`Command`] to spawn. `shell` is only used for the shell form.
    pub fn to_command(&self, shell: impl AsRef<OsStr>) -> Result<Command> {
        match self {
            Self::Direct(argv) => {
                let Some((program, args)) = argv.split_first() else {
                    return Err(Error::InvalidCommand(String::new()));
                };
                let mut cmd = Command::new(program);
                cmd.args(args);
                Ok(cmd)
            }
            Self::Shell(text) => {
                let mut cmd = Command::new(shell);
                cmd.arg("-c").arg(text);
                Ok(cmd)
            }
        }
    }
}

/// Renders the command for logs and error messages.
///
/// Direct arguments are shell-quoted, but the result is not guaranteed to
/// parse back into the same command: an argument containing one of
/// [`SHELL_METACHARACTERS`] makes [`CommandLine::detect`] pick the shell form.
impl fmt::Display for CommandLine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Direct(argv) => {
                for (i, arg) in argv.iter().enumerate() {
                    if i > 0 {
                        f.write_str(" ")?;
                    }
                    match shlex::try_quote(arg) {
                        Ok(quoted) => f.write_str(&quoted)?,
                        Err(_) => write!(f, "{arg:?}")?,
                    }
                }
                Ok(())
            }
            Self::Shell(text) => f.write_str(text),
        }
    }
}
