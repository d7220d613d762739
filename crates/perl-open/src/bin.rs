use std::io;
use std::path::PathBuf;

use anyhow::{Context, Result, bail};
use clap::Parser;
use log::{debug, error, info};
use perl_open::{Handle, Opener};

/// Copy everything from one Perl-style descriptor to another
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Cli {
    #[arg(short, long)]
    /// Log every open and close
    verbose: bool,

    #[arg(short, long, default_value = "sh")]
    /// Shell used for commands containing | < > ` or ;
    shell: PathBuf,

    #[arg(short('e'), long)]
    /// Let child processes write their stderr to ours
    inherit_stderr: bool,

    /// Descriptor to read from, e.g. "< in.txt" or "ls -l |"
    source: String,

    #[arg(default_value = ">-")]
    /// Descriptor to write to, e.g. "> out.txt" or "| gzip -c > out.gz"
    dest: String,
}

impl Cli {
    fn opener(&self) -> Opener {
        Opener::new()
            .shell(&self.shell)
            .capture_stderr(!self.inherit_stderr)
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let level = if cli.verbose { "debug" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level)).init();

    let mut source = cli
        .opener()
        .open(&cli.source)
        .with_context(|| format!("failed to open source {:?}", cli.source))?;
    let mut dest = cli
        .opener()
        .open(&cli.dest)
        .with_context(|| format!("failed to open destination {:?}", cli.dest))?;

    let copied = io::copy(&mut source, &mut dest).context("failed to copy")?;
    debug!("copied {copied} bytes");

    // close the destination first so a writer child sees EOF
    let dest_ok = close("destination", &cli.dest, dest)?;
    let source_ok = close("source", &cli.source, source)?;
    if !(dest_ok && source_ok) {
        bail!("child process exited unsuccessfully");
    }
    Ok(())
}

fn close(role: &str, descriptor: &str, handle: Handle) -> Result<bool> {
    let status = handle
        .close()
        .with_context(|| format!("failed to close {role} {descriptor:?}"))?;
    match status {
        Some(status) if !status.success() => {
            error!("{role} {descriptor:?} exited with {status}");
            Ok(false)
        }
        Some(status) => {
            info!("{role} {descriptor:?} exited with {status}");
            Ok(true)
        }
        None => Ok(true),
    }
}
