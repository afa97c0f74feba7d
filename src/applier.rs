use std::sync::Arc;

use futures::{TryStreamExt, stream};
use serde::Serialize;
use tracing::{debug, warn};

use crate::edit::{order_mutations_with_dropped, validate_span};
use crate::error::{Error, Result};
use crate::mutation::{FileMutations, Mutation};
use crate::position::span_to_positions;
use crate::store::{ContentStore, checksum};
use crate::transformer::TransformerRegistry;

/// Outcome of applying one file's mutations
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FileReport {
    pub file: String,
    /// Mutations run through a transformer
    pub applied: usize,
    /// Mutations with no registered transformer
    pub skipped: usize,
    /// Mutations discarded for overlapping a later one
    pub dropped: usize,
    /// BLAKE3 hash of the written content (hex-encoded)
    pub checksum: String,
}

/// Outcome of applying one wave, files sorted by name
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct WaveReport {
    pub files: Vec<FileReport>,
}

impl WaveReport {
    pub fn applied_count(&self) -> usize {
        self.files.iter().map(|f| f.applied).sum()
    }

    pub fn skipped_count(&self) -> usize {
        self.files.iter().map(|f| f.skipped).sum()
    }

    pub fn dropped_count(&self) -> usize {
        self.files.iter().map(|f| f.dropped).sum()
    }
}

/// Applies waves of file mutations through a content store
///
/// Each file gets exactly one read and one write. Files in a wave are
/// processed concurrently; mutations within a file run strictly in sequence.
pub struct MutationsApplier {
    store: Arc<dyn ContentStore>,
    registry: TransformerRegistry,
    max_concurrent_files: Option<usize>,
}

impl MutationsApplier {
    /// Create an applier with no cap on concurrent files
    ///
    /// # Arguments
    /// * `store` - Where file contents are read from and written to
    /// * `registry` - Transformers resolved by mutation type
    pub fn new(store: Arc<dyn ContentStore>, registry: TransformerRegistry) -> Self {
        Self {
            store,
            registry,
            max_concurrent_files: None,
        }
    }

    /// Cap how many files of a wave are in flight at once
    ///
    /// `None` (the default) processes every file of the wave together.
    pub fn with_max_concurrent_files(mut self, limit: Option<usize>) -> Self {
        self.max_concurrent_files = limit;
        self
    }

    /// Apply every file's mutations in a wave
    ///
    /// Files with no mutations are not touched. The first failing file fails
    /// the whole wave; files still in flight at that point are abandoned.
    pub async fn apply(&self, file_mutations: &FileMutations) -> Result<WaveReport> {
        let pending: Vec<(&String, &Vec<Mutation>)> = file_mutations
            .iter()
            .filter(|(_, mutations)| !mutations.is_empty())
            .collect();
        let limit = self
            .max_concurrent_files
            .unwrap_or(pending.len())
            .max(1);

        let mut files: Vec<FileReport> = stream::iter(pending.into_iter().map(Ok::<_, Error>))
            .map_ok(|(file, mutations)| self.apply_file(file, mutations))
            .try_buffer_unordered(limit)
            .try_collect()
            .await?;

        files.sort_by(|a, b| a.file.cmp(&b.file));
        Ok(WaveReport { files })
    }

    /// Apply a file's mutations
    ///
    /// Every range is validated against the stored content before anything
    /// runs; a malformed range fails the file without writing it. Mutations of
    /// an unknown type are skipped with a warning.
    pub async fn apply_file(&self, file: &str, mutations: &[Mutation]) -> Result<FileReport> {
        let (ordered, dropped) = order_mutations_with_dropped(mutations);

        let mut content = self.store.read(file).await.map_err(|source| Error::Store {
            file: file.to_string(),
            source,
        })?;

        for mutation in mutations {
            validate_span(mutation.range, &content).map_err(|source| Error::Mutation {
                file: file.to_string(),
                source,
            })?;
        }

        if dropped > 0 {
            debug!(file, dropped, "Dropped overlapping mutations");
        }

        let mut applied = 0;
        let mut skipped = 0;

        for mutation in ordered {
            let Some(transformer) = self.registry.resolve(&mutation.kind) else {
                // Content below the mutation's start is still untouched here
                let (start, end) = span_to_positions(&content, mutation.range);
                warn!(
                    file,
                    kind = %mutation.kind,
                    start = %start,
                    end = %end,
                    "Unknown mutator type"
                );
                skipped += 1;
                continue;
            };

            content = transformer
                .mutate(&content, mutation)
                .map_err(|source| Error::Mutation {
                    file: file.to_string(),
                    source,
                })?;
            applied += 1;
        }

        self.store
            .write(file, &content)
            .await
            .map_err(|source| Error::Store {
                file: file.to_string(),
                source,
            })?;

        debug!(file, applied, skipped, dropped, "Applied file mutations");

        Ok(FileReport {
            file: file.to_string(),
            applied,
            skipped,
            dropped,
            checksum: checksum(&content),
        })
    }
}
