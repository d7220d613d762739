use std::fmt;
use std::io::{self, Read, Write};
use std::path::PathBuf;
use std::process::Stdio;

use log::{debug, error};

use crate::command::CommandLine;
use crate::descriptor::{Descriptor, FileMode};
use crate::error::{Error, Result};
use crate::handle::{Handle, Stream};

#[derive(Clone, Copy)]
enum Pipe {
    /// We read the child's stdout.
    FromChild,
    /// We write the child's stdin.
    ToChild,
}

/// Opens descriptors into [`Handle`]s.
///
/// ```ignore
/// let mut handle = Opener::new().open("sort -u words.txt |")?;
/// let mut sorted = String::new();
/// handle.read_to_string(&mut sorted)?;
/// handle.close()?;
/// ```
pub struct Opener {
    shell: PathBuf,
    capture_stderr: bool,
    stdin: Option<Box<dyn Read + Send>>,
    stdout: Option<Box<dyn Write + Send>>,
}

impl Default for Opener {
    fn default() -> Self {
        Self {
            shell: PathBuf::from("sh"),
            capture_stderr: true,
            stdin: None,
            stdout: None,
        }
    }
}

impl fmt::Debug for Opener {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Opener")
            .field("shell", &self.shell)
            .field("capture_stderr", &self.capture_stderr)
            .field("stdin", &self.stdin.is_some())
            .field("stdout", &self.stdout.is_some())
            .finish()
    }
}

impl Opener {
    pub fn new() -> Self {
        Self::default()
    }

    /// Shell used to run shell-interpreted commands, invoked as `<shell> -c <text>`.
    pub fn shell(mut self, shell: impl Into<PathBuf>) -> Self {
        self.shell = shell.into();
        self
    }

    /// Whether a child's standard error is piped back to the handle (the
    /// default) or inherited from this process.
    pub fn capture_stderr(mut self, capture: bool) -> Self {
        self.capture_stderr = capture;
        self
    }

    /// Reader bound to the `-` descriptor instead of this process's stdin.
    pub fn stdin(mut self, reader: impl Read + Send + 'static) -> Self {
        self.stdin = Some(Box::new(reader));
        self
    }

    /// Writer bound to the `>-` descriptor instead of this process's stdout.
    pub fn stdout(mut self, writer: impl Write + Send + 'static) -> Self {
        self.stdout = Some(Box::new(writer));
        self
    }

    pub fn open(self, descriptor: &str) -> Result<Handle> {
        let descriptor = Descriptor::parse(descriptor)?;
        self.open_descriptor(descriptor)
    }

    /// Like [`Opener::open`], but failures are logged and an empty handle is
    /// returned in their place.
    ///
    /// The failure is emitted as an `error` record through the `log` crate.
    /// Nothing reaches stderr unless the caller has installed a logger such
    /// as `env_logger`.
    pub fn open_lenient(self, descriptor: &str) -> Handle {
        match self.open(descriptor) {
            Ok(handle) => handle,
            Err(err) => {
                error!("{err}");
                Handle::empty()
            }
        }
    }

    pub fn open_descriptor(self, descriptor: Descriptor) -> Result<Handle> {
        debug!("opening `{descriptor}`");
        let handle = match &descriptor {
            Descriptor::ReadFrom(cmd) => self.spawn(cmd, Pipe::FromChild)?,
            Descriptor::WriteTo(cmd) => self.spawn(cmd, Pipe::ToChild)?,
            Descriptor::File { path, mode } => {
                let file = mode.options().open(path).map_err(|source| Error::Open {
                    path: path.clone(),
                    source,
                })?;
                Handle::new(Stream::File(file))
            }
            Descriptor::Stdin => {
                let reader = self.stdin.unwrap_or_else(|| Box::new(io::stdin()));
                Handle::new(Stream::Stdin(reader))
            }
            Descriptor::Stdout => {
                let writer = self.stdout.unwrap_or_else(|| Box::new(io::stdout()));
                Handle::new(Stream::Stdout(writer))
            }
        };
        Ok(handle.with_descriptor(descriptor))
    }

    /// Spawn `cmd` and read its standard output.
    pub fn read_from(self, cmd: CommandLine) -> Result<Handle> {
        self.open_descriptor(Descriptor::ReadFrom(cmd))
    }

    /// Spawn `cmd` and write to its standard input.
    pub fn write_to(self, cmd: CommandLine) -> Result<Handle> {
        self.open_descriptor(Descriptor::WriteTo(cmd))
    }

    pub fn open_file(self, path: impl Into<PathBuf>, mode: FileMode) -> Result<Handle> {
        self.open_descriptor(Descriptor::File {
            path: path.into(),
            mode,
        })
    }

    fn spawn(&self, cmd: &CommandLine, pipe: Pipe) -> Result<Handle> {
        let mut command = cmd.to_command(&self.shell)?;
        match pipe {
            Pipe::FromChild => command.stdout(Stdio::piped()),
            Pipe::ToChild => command.stdin(Stdio::piped()),
        };
        if self.capture_stderr {
            command.stderr(Stdio::piped());
        }

        let mut child = command.spawn().map_err(|source| Error::Spawn {
            command: cmd.to_string(),
            source,
        })?;
        debug!("spawned `{cmd}` as pid {}", child.id());

        let stream = match pipe {
            Pipe::FromChild => child.stdout.take().map(Stream::ChildStdout),
            Pipe::ToChild => child.stdin.take().map(Stream::ChildStdin),
        };
        Ok(Handle::process(child, stream))
    }
}
