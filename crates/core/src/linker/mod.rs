//! Symlink management for the consumer library.
//!
//! The organiser never copies or moves media. Each winning source file is
//! exposed through a symlink at its canonical target path. Links are
//! written with the path the media server will see, which may differ from
//! the path this process reads from when the two run in separate
//! containers; [`MountRemap`] translates between the two views.
//!
//! # Example
//!
//! ```rust,ignore
//! use reelink_core::linker::{FsLinker, Linker, MountRemap};
//!
//! let linker = FsLinker::new(MountRemap::new("/zurg", "/mnt/zurg"));
//! linker.link(&source, &target).await?;
//! let report = linker.sweep(Path::new("/media/films")).await;
//! ```

mod error;
mod fs_linker;
mod remap;
mod traits;
mod types;

pub use error::LinkError;
pub use fs_linker::FsLinker;
pub use remap::MountRemap;
pub use traits::Linker;
pub use types::{LinkOutcome, SweepReport};
