// Byte spans and line/column positions
pub mod position;

// Mutation and wave data model
pub mod mutation;

// Ordering and span validation
pub mod edit;

// Transformer trait and registry
pub mod transformer;

// Stock text transformers
pub mod mutators;

// Content stores
pub mod store;

// Mutation application engine
pub mod applier;

// Wave producers and observers
pub mod wave;

// Wave loop
pub mod orchestrator;

// Settings
pub mod config;

// JSON request/response module
pub mod json;

// Crate-level errors
pub mod error;

// Re-exports
pub use position::{Position, Span, byte_to_position, span_to_positions};
pub use mutation::{FileMutations, Mutation, MutationsWave, Payload};
pub use edit::{
    MutationError, order_mutations, order_mutations_with_dropped, splice, validate_span,
};
pub use transformer::{Transformer, TransformerRegistry};
pub use mutators::{
    MultipleMutator, TextDeleteMutator, TextInsertMutator, TextReplaceMutator, TextSwapMutator,
};
pub use store::{ContentStore, LocalFileStore, MemoryStore, StoreError, checksum};
pub use applier::{FileReport, MutationsApplier, WaveReport};
pub use wave::{
    ChannelWaveProducer, QueuedWaveProducer, TracingObserver, WaveObserver, WaveProducer,
};
pub use orchestrator::{AutoMutator, RunReport, RunState};
pub use config::Settings;
pub use json::{FileResultJson, RunRequest, RunResponse, generate_execution_id};
pub use error::{Error, Result};
