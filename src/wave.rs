use std::collections::VecDeque;

use async_trait::async_trait;
use tokio::sync::mpsc;
use tracing::info;

use crate::applier::WaveReport;
use crate::error::Result;
use crate::mutation::MutationsWave;

/// Source of mutation waves
///
/// Must eventually yield [`MutationsWave::done`] to end a run.
#[async_trait]
pub trait WaveProducer: Send {
    async fn produce(&mut self) -> Result<MutationsWave>;
}

/// Yields a fixed list of waves, then the sentinel
#[derive(Debug, Clone, Default)]
pub struct QueuedWaveProducer {
    waves: VecDeque<MutationsWave>,
}

impl QueuedWaveProducer {
    pub fn new(waves: impl IntoIterator<Item = MutationsWave>) -> Self {
        Self {
            waves: waves.into_iter().collect(),
        }
    }

    pub fn remaining(&self) -> usize {
        self.waves.len()
    }
}

#[async_trait]
impl WaveProducer for QueuedWaveProducer {
    async fn produce(&mut self) -> Result<MutationsWave> {
        Ok(self.waves.pop_front().unwrap_or_else(MutationsWave::done))
    }
}

/// Yields waves sent over a channel
///
/// The run ends when a sentinel is sent or every sender is dropped.
#[derive(Debug)]
pub struct ChannelWaveProducer {
    receiver: mpsc::Receiver<MutationsWave>,
}

impl ChannelWaveProducer {
    pub fn new(receiver: mpsc::Receiver<MutationsWave>) -> Self {
        Self { receiver }
    }

    /// A producer together with the sender feeding it
    pub fn channel(buffer: usize) -> (mpsc::Sender<MutationsWave>, Self) {
        let (sender, receiver) = mpsc::channel(buffer);
        (sender, Self::new(receiver))
    }
}

#[async_trait]
impl WaveProducer for ChannelWaveProducer {
    async fn produce(&mut self) -> Result<MutationsWave> {
        Ok(self.receiver.recv().await.unwrap_or_else(MutationsWave::done))
    }
}

/// Notified around every applied wave
///
/// `on_wave_end` fires only when the wave applied successfully.
pub trait WaveObserver: Send + Sync {
    fn on_wave_begin(&self, _index: usize, _wave: &MutationsWave) {}

    fn on_wave_end(&self, _index: usize, _wave: &MutationsWave, _report: &WaveReport) {}
}

/// Logs wave boundaries through `tracing`
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingObserver;

impl WaveObserver for TracingObserver {
    fn on_wave_begin(&self, index: usize, wave: &MutationsWave) {
        info!(
            wave = index,
            files = wave.file_count(),
            mutations = wave.mutation_count(),
            "Starting wave"
        );
    }

    fn on_wave_end(&self, index: usize, _wave: &MutationsWave, report: &WaveReport) {
        info!(
            wave = index,
            files = report.files.len(),
            applied = report.applied_count(),
            skipped = report.skipped_count(),
            dropped = report.dropped_count(),
            "Finished wave"
        );
    }
}
