//! Module specifier resolver.
//!
//! Resolves relative, absolute, and bare specifiers to files, the way
//! bundlers resolve imports for JavaScript modules. Filesystem access goes
//! through [`FileSystem`] and unresolved specifiers are reported to a
//! [`Logger`].

mod batch;
mod exports;
pub mod fs;
pub mod logger;
mod pkg_json;
mod resolve;
pub mod specifier;
pub mod trace;

pub use batch::{ResolveRequest, DEFAULT_BATCH_CONCURRENCY};
pub use exports::resolve_exports;
pub use fs::{FileKind, FileSystem, MemoryFs, OsFs};
pub use logger::{Logger, MemoryLogger, TracingLogger};
pub use pkg_json::{read_package_json, PackageJson, PackageJsonRead, PACKAGE_JSON};
pub use resolve::{resolve_import_path, Explained, Resolver};
pub use specifier::SpecifierKind;
pub use trace::{
    steps as trace_steps, warning_codes as trace_warning_codes, ResolveTrace, TraceStep,
    TraceWarning, EXPLAIN_SCHEMA_VERSION,
};
