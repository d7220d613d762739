#![doc = include_str!("../README.md")]

pub mod command;
pub mod descriptor;
pub mod error;
pub mod handle;
pub mod opener;


pub use command::CommandLine;
pub use descriptor::{Descriptor, FileMode};
pub use error::{Error, Result};
pub use handle::{Handle, Stream};
pub use opener::Opener;

/// Open `descriptor` with a default [`Opener`].
pub fn open(descriptor: &str) -> Result<Handle> {
    Opener::new().open(descriptor)
}

/// Open `descriptor` with a default [`Opener`], logging any failure and
/// returning an empty [`Handle`] instead.
pub fn open_lenient(descriptor: &str) -> Handle {
    Opener::new().open_lenient(descriptor)
}
