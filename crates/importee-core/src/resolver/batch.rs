//! Resolving many specifiers at once.

use super::fs::FileSystem;
use super::logger::Logger;
use super::resolve::Resolver;
use crate::config::ResolutionOptions;
use crate::error::ResolveError;
use futures::stream::{self, StreamExt};
use std::path::PathBuf;

/// Maximum resolutions in flight for one batch.
pub const DEFAULT_BATCH_CONCURRENCY: usize = 64;

/// One specifier to resolve.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolveRequest {
    pub specifier: String,
    pub importer: PathBuf,
}

impl ResolveRequest {
    pub fn new(specifier: impl Into<String>, importer: impl Into<PathBuf>) -> Self {
        Self {
            specifier: specifier.into(),
            importer: importer.into(),
        }
    }
}

impl<F: FileSystem, L: Logger> Resolver<F, L> {
    /// Resolve every request, returning results in request order.
    ///
    /// Requests are independent: a failing request does not stop the others.
    pub async fn resolve_all(
        &self,
        requests: &[ResolveRequest],
        options: &ResolutionOptions,
    ) -> Vec<Result<Option<PathBuf>, ResolveError>> {
        self.resolve_all_with_concurrency(requests, options, DEFAULT_BATCH_CONCURRENCY)
            .await
    }

    /// [`Resolver::resolve_all`] with an explicit concurrency limit.
    pub async fn resolve_all_with_concurrency(
        &self,
        requests: &[ResolveRequest],
        options: &ResolutionOptions,
        concurrency: usize,
    ) -> Vec<Result<Option<PathBuf>, ResolveError>> {
        stream::iter(requests)
            .map(|req| self.resolve(&req.specifier, &req.importer, options))
            .buffered(concurrency.max(1))
            .collect()
            .await
    }
}
