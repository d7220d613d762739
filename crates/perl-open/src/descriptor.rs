//! Parsing of Perl-style open descriptors such as `"> out.txt"` or `"ls -l |"`.

use std::fmt;
use std::fs::OpenOptions;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use crate::command::CommandLine;
use crate::error::{Error, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileMode {
    /// `<path` or a bare path
    Read,
    /// `>path`: truncate or create
    Write,
    /// `>>path`: create if missing, write at the end
    Append,
    /// `+<path` or `+>path`: read and write an existing file in place
    ReadWrite,
}

impl FileMode {
    pub fn options(self) -> OpenOptions {
        let mut opts = OpenOptions::new();
        match self {
            Self::Read => opts.read(true),
            Self::Write => opts.write(true).create(true).truncate(true),
            Self::Append => opts.append(true).create(true),
            Self::ReadWrite => opts.read(true).write(true),
        };
        opts
    }

    fn prefix(self) -> &'static str {
        match self {
            Self::Read => "<",
            Self::Write => ">",
            Self::Append => ">>",
            Self::ReadWrite => "+<",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Descriptor {
    /// `cmd |`: read the command's standard output
    ReadFrom(CommandLine),
    /// `| cmd`: write to the command's standard input
    WriteTo(CommandLine),
    File { path: PathBuf, mode: FileMode },
    /// `-`
    Stdin,
    /// `>-`
    Stdout,
}

impl Descriptor {
    pub fn parse(text: &str) -> Result<Self> {
        let text = text.trim();
        let invalid = || Error::InvalidDescriptor(text.to_string());

        if text.is_empty() {
            return Err(invalid());
        }
        if text == "-" {
            return Ok(Self::Stdin);
        }
        if text == ">-" {
            return Ok(Self::Stdout);
        }

        if let Some(cmd) = text.strip_suffix('|') {
            return Ok(Self::ReadFrom(command(cmd).ok_or_else(invalid)??));
        }
        if let Some(cmd) = text.strip_prefix('|') {
            return Ok(Self::WriteTo(command(cmd).ok_or_else(invalid)??));
        }

        let (mode, path) = if let Some(path) = text.strip_prefix(">>") {
            (FileMode::Append, path)
        } else if let Some(path) = text.strip_prefix('>') {
            (FileMode::Write, path)
        } else if let Some(path) = text.strip_prefix('<') {
            (FileMode::Read, path)
        } else if let Some(path) = text
            .strip_prefix("+>")
            .or_else(|| text.strip_prefix("+<"))
        {
            (FileMode::ReadWrite, path)
        } else {
            (FileMode::Read, text)
        };

        let path = path.trim();
        if path.is_empty() {
            return Err(invalid());
        }
        Ok(Self::File {
            path: PathBuf::from(path),
            mode,
        })
    }

    pub fn path(&self) -> Option<&Path> {
        match self {
            Self::File { path, .. } => Some(path),
            _ => None,
        }
    }

    pub fn command(&self) -> Option<&CommandLine> {
        match self {
            Self::ReadFrom(cmd) | Self::WriteTo(cmd) => Some(cmd),
            _ => None,
        }
    }

    pub fn is_process(&self) -> bool {
        self.command().is_some()
    }
}

// `None` when nothing but whitespace follows the pipe marker.
fn command(text: &str) -> Option<Result<CommandLine>> {
    if text.trim().is_empty() {
        return None;
    }
    Some(CommandLine::detect(text))
}

impl FromStr for Descriptor {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

impl fmt::Display for Descriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ReadFrom(cmd) => write!(f, "{cmd} |"),
            Self::WriteTo(cmd) => write!(f, "| {cmd}"),
            Self::File { path, mode } => write!(f, "{} {}", mode.prefix(), path.display()),
            Self::Stdin => f.write_str("-"),
            Self::Stdout => f.write_str(">-"),
        }
    }
}
