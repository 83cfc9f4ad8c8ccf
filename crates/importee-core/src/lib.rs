#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::too_many_lines)]
#![allow(clippy::return_self_not_must_use)]

//! Core of importee: resolving import specifiers to files on disk.

pub mod config;
pub mod error;
pub mod resolver;
pub mod version;

pub use config::ResolutionOptions;
pub use error::{Error, ResolveError};
pub use resolver::{
    resolve_import_path, Explained, FileSystem, Logger, MemoryFs, MemoryLogger, OsFs,
    ResolveRequest, Resolver, TracingLogger,
};
pub use version::VERSION;
