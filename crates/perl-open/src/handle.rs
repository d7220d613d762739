use std::fmt;
use std::fs::File;
use std::io::{self, Read, Write};
use std::process::{Child, ChildStderr, ChildStdin, ChildStdout, ExitStatus};
use std::thread::{self, JoinHandle};

use log::{debug, warn};

use crate::descriptor::Descriptor;
use crate::error::Result;

/// The primary stream of a [`Handle`].
pub enum Stream {
    File(File),
    /// Standard output of a child, readable.
    ChildStdout(ChildStdout),
    /// Standard input of a child, writable.
    ChildStdin(ChildStdin),
    /// The reader bound to `-`.
    Stdin(Box<dyn Read + Send>),
    /// The writer bound to `>-`.
    Stdout(Box<dyn Write + Send>),
}

impl Stream {
    pub fn is_readable(&self) -> bool {
        matches!(self, Self::File(_) | Self::ChildStdout(_) | Self::Stdin(_))
    }

    pub fn is_writable(&self) -> bool {
        matches!(self, Self::File(_) | Self::ChildStdin(_) | Self::Stdout(_))
    }
}

fn unsupported(op: &str) -> io::Error {
    io::Error::new(
        io::ErrorKind::Unsupported,
        format!("stream does not support {op}"),
    )
}

impl Read for Stream {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        match self {
            Self::File(f) => f.read(buf),
            Self::ChildStdout(r) => r.read(buf),
            Self::Stdin(r) => r.read(buf),
            Self::ChildStdin(_) | Self::Stdout(_) => Err(unsupported("reading")),
        }
    }
}

impl Write for Stream {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        match self {
            Self::File(f) => f.write(buf),
            Self::ChildStdin(w) => w.write(buf),
            Self::Stdout(w) => w.write(buf),
            Self::ChildStdout(_) | Self::Stdin(_) => Err(unsupported("writing")),
        }
    }

    fn flush(&mut self) -> io::Result<()> {
        match self {
            Self::File(f) => f.flush(),
            Self::ChildStdin(w) => w.flush(),
            Self::Stdout(w) => w.flush(),
            Self::ChildStdout(_) | Self::Stdin(_) => Ok(()),
        }
    }
}

impl fmt::Debug for Stream {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::File(file) => f.debug_tuple("File").field(file).finish(),
            Self::ChildStdout(r) => f.debug_tuple("ChildStdout").field(r).finish(),
            Self::ChildStdin(w) => f.debug_tuple("ChildStdin").field(w).finish(),
            Self::Stdin(_) => f.write_str("Stdin"),
            Self::Stdout(_) => f.write_str("Stdout"),
        }
    }
}

/// An opened file, pipe or standard stream.
///
/// A handle owns at most one stream and, when process-backed, the child on
/// the other end of it along with the child's standard error pipe (if it
/// was captured). A handle returned by [`Opener::open_lenient`] after a
/// failure holds nothing at all; check [`Handle::is_open`] before use.
///
/// Dropping a handle releases it the same way [`Handle::close`] does, so a
/// process-backed handle blocks in `drop` until its child exits.
///
/// [`Opener::open_lenient`]: crate::Opener::open_lenient
#[derive(Debug, Default)]
pub struct Handle {
    stream: Option<Stream>,
    child: Option<Child>,
    stderr: Option<ChildStderr>,
    descriptor: Option<Descriptor>,
}

impl Handle {
    /// A handle with no stream, as left behind by a failed lenient open.
    pub fn empty() -> Self {
        Self::default()
    }

    pub(crate) fn new(stream: Stream) -> Self {
        Self {
            stream: Some(stream),
            child: None,
            stderr: None,
            descriptor: None,
        }
    }

    pub(crate) fn process(mut child: Child, stream: Option<Stream>) -> Self {
        let stderr = child.stderr.take();
        Self {
            stream,
            child: Some(child),
            stderr,
            descriptor: None,
        }
    }

    pub(crate) fn with_descriptor(mut self, descriptor: Descriptor) -> Self {
        self.descriptor = Some(descriptor);
        self
    }

    pub fn is_open(&self) -> bool {
        self.stream.is_some()
    }

    pub fn stream(&self) -> Option<&Stream> {
        self.stream.as_ref()
    }

    pub fn stream_mut(&mut self) -> Option<&mut Stream> {
        self.stream.as_mut()
    }

    /// Standard error of the child, if the handle is process-backed and
    /// stderr was captured.
    ///
    /// Nothing reads this pipe until the handle is closed. A child that
    /// fills it while the caller is still reading or writing the primary
    /// stream will block.
    pub fn stderr_mut(&mut self) -> Option<&mut ChildStderr> {
        self.stderr.as_mut()
    }

    pub fn take_stderr(&mut self) -> Option<ChildStderr> {
        self.stderr.take()
    }

    /// Process id of the child, for process-backed handles.
    pub fn id(&self) -> Option<u32> {
        self.child.as_ref().map(Child::id)
    }

    pub fn descriptor(&self) -> Option<&Descriptor> {
        self.descriptor.as_ref()
    }

    /// Close the handle.
    ///
    /// For a process-backed handle this closes the child's standard input,
    /// reads whatever is left on its standard output and standard error, and
    /// waits for it to exit. The exit status is returned but an unsuccessful
    /// exit is not treated as an error. Other handles return `None`.
    pub fn close(mut self) -> Result<Option<ExitStatus>> {
        self.release()
    }

    fn release(&mut self) -> Result<Option<ExitStatus>> {
        let stream = self.stream.take();
        let Some(mut child) = self.child.take() else {
            if let Some(mut stream) = stream {
                stream.flush()?;
            }
            return Ok(None);
        };

        let stderr = self
            .stderr
            .take()
            .map(|mut stderr| thread::spawn(move || io::copy(&mut stderr, &mut io::sink())));
        let drained = match stream {
            Some(Stream::ChildStdout(mut stdout)) => {
                io::copy(&mut stdout, &mut io::sink()).map(|_| ())
            }
            // dropping the writer sends EOF to the child
            other => {
                drop(other);
                Ok(())
            }
        };
        if let Some(Ok(Err(err))) = stderr.map(JoinHandle::join) {
            warn!("failed to drain stderr of child {}: {err}", child.id());
        }

        // reap the child even when draining failed
        let pid = child.id();
        let status = child.wait()?;
        debug!("child {pid} exited with {status}");
        drained?;
        Ok(Some(status))
    }

    fn stream_or_not_connected(&mut self) -> io::Result<&mut Stream> {
        self.stream
            .as_mut()
            .ok_or_else(|| io::Error::new(io::ErrorKind::NotConnected, "handle has no stream"))
    }
}

impl Read for Handle {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        self.stream_or_not_connected()?.read(buf)
    }
}

impl Write for Handle {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.stream_or_not_connected()?.write(buf)
    }

    fn flush(&mut self) -> io::Result<()> {
        self.stream_or_not_connected()?.flush()
    }
}

impl Drop for Handle {
    fn drop(&mut self) {
        if let Err(err) = self.release() {
            match &self.descriptor {
                Some(descriptor) => warn!("failed to close `{descriptor}`: {err}"),
                None => warn!("failed to close handle: {err}"),
            }
        }
    }
}
