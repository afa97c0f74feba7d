use serde::{Deserialize, Serialize};

use crate::applier::FileReport;
use crate::mutation::MutationsWave;
use crate::orchestrator::RunReport;

/// Batch of waves submitted to the CLI
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunRequest {
    /// Caller-chosen run identifier; `"auto"` generates one
    #[serde(default = "auto_execution_id")]
    pub execution_id: String,
    /// Waves applied in order; a sentinel (or the end of the list) stops the run
    pub waves: Vec<MutationsWave>,
}

fn auto_execution_id() -> String {
    "auto".to_string()
}

impl RunRequest {
    /// The request's execution id, generating one for `"auto"`
    pub fn resolve_execution_id(&self) -> String {
        if self.execution_id == "auto" {
            generate_execution_id()
        } else {
            self.execution_id.clone()
        }
    }
}

/// Result of a run, as printed by the CLI
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunResponse {
    pub execution_id: String,
    pub success: bool,
    pub waves_applied: usize,
    pub files_written: usize,
    pub applied_count: usize,
    pub skipped_count: usize,
    pub dropped_count: usize,
    pub files: Vec<FileResultJson>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Per-file entry of a [`RunResponse`]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileResultJson {
    pub wave: usize,
    pub file: String,
    pub applied: usize,
    pub skipped: usize,
    pub dropped: usize,
    pub checksum: String,
}

impl FileResultJson {
    fn from_report(wave: usize, report: &FileReport) -> Self {
        Self {
            wave,
            file: report.file.clone(),
            applied: report.applied,
            skipped: report.skipped,
            dropped: report.dropped,
            checksum: report.checksum.clone(),
        }
    }
}

impl RunResponse {
    pub fn success(execution_id: String, report: &RunReport) -> Self {
        let files = report
            .waves
            .iter()
            .enumerate()
            .flat_map(|(wave, wave_report)| {
                wave_report
                    .files
                    .iter()
                    .map(move |file| FileResultJson::from_report(wave, file))
            })
            .collect();

        Self {
            execution_id,
            success: true,
            waves_applied: report.waves.len(),
            files_written: report.files_written(),
            applied_count: report.applied_count(),
            skipped_count: report.skipped_count(),
            dropped_count: report.dropped_count(),
            files,
            error: None,
        }
    }

    pub fn failure(execution_id: String, error: String) -> Self {
        Self {
            execution_id,
            success: false,
            waves_applied: 0,
            files_written: 0,
            applied_count: 0,
            skipped_count: 0,
            dropped_count: 0,
            files: Vec::new(),
            error: Some(error),
        }
    }
}

/// Fresh UUID v4 execution id
pub fn generate_execution_id() -> String {
    uuid::Uuid::new_v4().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::applier::WaveReport;

    #[test]
    fn test_request_defaults_to_auto() {
        let request: RunRequest = serde_json::from_str(r#"{ "waves": [] }"#).unwrap();

        assert_eq!(request.execution_id, "auto");
        let id = request.resolve_execution_id();
        assert!(uuid::Uuid::parse_str(&id).is_ok());
    }

    #[test]
    fn test_request_keeps_explicit_id() {
        let request: RunRequest =
            serde_json::from_str(r#"{ "execution_id": "run-7", "waves": [{}] }"#).unwrap();

        assert_eq!(request.resolve_execution_id(), "run-7");
        assert!(request.waves[0].is_done());
    }

    #[test]
    fn test_response_from_report() {
        let report = RunReport {
            waves: vec![
                WaveReport {
                    files: vec![FileReport {
                        file: "a".into(),
                        applied: 2,
                        skipped: 1,
                        dropped: 0,
                        checksum: "aa".into(),
                    }],
                },
                WaveReport {
                    files: vec![FileReport {
                        file: "b".into(),
                        applied: 1,
                        skipped: 0,
                        dropped: 3,
                        checksum: "bb".into(),
                    }],
                },
            ],
        };

        let response = RunResponse::success("id".into(), &report);

        assert!(response.success);
        assert_eq!(response.waves_applied, 2);
        assert_eq!(response.files_written, 2);
        assert_eq!(response.applied_count, 3);
        assert_eq!(response.skipped_count, 1);
        assert_eq!(response.dropped_count, 3);
        assert_eq!(response.files[1].wave, 1);
        assert_eq!(response.files[1].file, "b");
    }

    #[test]
    fn test_failure_serializes_error() {
        let response = RunResponse::failure("id".into(), "boom".into());
        let json = serde_json::to_value(&response).unwrap();

        assert_eq!(json["success"], false);
        assert_eq!(json["error"], "boom");
    }

    #[test]
    fn test_generate_execution_id_unique() {
        assert_ne!(generate_execution_id(), generate_execution_id());
    }
}
