use std::sync::Arc;

use serde::Serialize;
use tokio_util::sync::CancellationToken;
use tracing::debug;

use crate::applier::{MutationsApplier, WaveReport};
use crate::error::{Error, Result};
use crate::wave::{WaveObserver, WaveProducer};

/// Lifecycle of an [`AutoMutator`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunState {
    /// Still requesting waves
    Running,
    /// The producer signalled there is no more work
    Done,
}

/// Outcome of a completed run, one entry per applied wave
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RunReport {
    pub waves: Vec<WaveReport>,
}

impl RunReport {
    pub fn files_written(&self) -> usize {
        self.waves.iter().map(|w| w.files.len()).sum()
    }

    pub fn applied_count(&self) -> usize {
        self.waves.iter().map(WaveReport::applied_count).sum()
    }

    pub fn skipped_count(&self) -> usize {
        self.waves.iter().map(WaveReport::skipped_count).sum()
    }

    pub fn dropped_count(&self) -> usize {
        self.waves.iter().map(WaveReport::dropped_count).sum()
    }
}

/// Runs waves of file mutations until the producer runs dry
///
/// Waves are strictly sequential: the next wave is requested only after the
/// previous one has been fully applied.
pub struct AutoMutator {
    producer: Box<dyn WaveProducer>,
    applier: MutationsApplier,
    observers: Vec<Arc<dyn WaveObserver>>,
    cancellation: CancellationToken,
    state: RunState,
}

impl AutoMutator {
    pub fn new(producer: impl WaveProducer + 'static, applier: MutationsApplier) -> Self {
        Self {
            producer: Box::new(producer),
            applier,
            observers: Vec::new(),
            cancellation: CancellationToken::new(),
            state: RunState::Running,
        }
    }

    pub fn with_observer(mut self, observer: impl WaveObserver + 'static) -> Self {
        self.observers.push(Arc::new(observer));
        self
    }

    /// Stop the run with [`Error::Cancelled`] once `token` is cancelled
    ///
    /// Checked while waiting on the producer and while a wave is applied.
    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancellation = token;
        self
    }

    pub fn state(&self) -> RunState {
        self.state
    }

    /// Request and apply waves until the sentinel arrives
    ///
    /// A failing wave aborts the run: its end notification does not fire and
    /// no further waves are requested.
    pub async fn run(&mut self) -> Result<RunReport> {
        let mut report = RunReport::default();

        while self.state == RunState::Running {
            let wave = tokio::select! {
                biased;
                _ = self.cancellation.cancelled() => return Err(Error::Cancelled),
                wave = self.producer.produce() => wave?,
            };

            let Some(file_mutations) = wave.file_mutations.as_ref() else {
                debug!(waves = report.waves.len(), "Producer signalled completion");
                self.state = RunState::Done;
                break;
            };

            let index = report.waves.len();
            for observer in &self.observers {
                observer.on_wave_begin(index, &wave);
            }

            let wave_report = tokio::select! {
                biased;
                _ = self.cancellation.cancelled() => return Err(Error::Cancelled),
                result = self.applier.apply(file_mutations) => result?,
            };

            for observer in &self.observers {
                observer.on_wave_end(index, &wave, &wave_report);
            }
            report.waves.push(wave_report);
        }

        Ok(report)
    }
}
