//! Inspect command implementation
//!
//! Prints every header field that can be recovered from a WAVE or AIFF file,
//! followed by its notes, warnings and errors. Directories are scanned
//! recursively and their files inspected in parallel.

use anyhow::Result;
use colored::Colorize;
use rayon::prelude::*;
use serde::Serialize;
use std::fs;
use std::path::Path;
use std::process::ExitCode;
use tracing::info;
use wavemend_core::{parse_as, ContainerKind, HeaderReport};

use super::json_output::{error_codes, JsonError};
use super::reporting::{print_report, separator};
use crate::input::{display_name, scan_directory, AudioFile, Entry};

/// Result of inspecting a single file.
#[derive(Debug, Clone, Serialize)]
pub struct InspectFileResult {
    /// Path to the audio file
    pub path: String,
    /// Container kind implied by the extension
    pub container: ContainerKind,
    /// Parsed header (absent if the file could not be read)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub report: Option<HeaderReport>,
    /// Coded error (if reading failed)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<JsonError>,
}

impl InspectFileResult {
    /// True if the file could not be read or its header has errors.
    pub fn failed(&self) -> bool {
        self.error.is_some() || self.report.as_ref().is_some_and(|r| r.has_errors())
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct InspectSummary {
    /// Audio files inspected
    pub total: usize,
    /// Files without errors or warnings
    pub clean: usize,
    /// Files with warnings but no errors
    pub with_warnings: usize,
    /// Files with header errors
    pub with_errors: usize,
    /// Files that could not be read
    pub unreadable: usize,
    /// Non-audio files skipped during a directory scan
    pub skipped: usize,
}

/// JSON output for the inspect command.
#[derive(Debug, Clone, Serialize)]
pub struct InspectOutput {
    /// True if no file has header errors
    pub success: bool,
    pub results: Vec<InspectFileResult>,
    pub summary: InspectSummary,
    /// Non-audio files skipped during a directory scan
    pub skipped: Vec<String>,
    pub errors: Vec<JsonError>,
}

impl InspectOutput {
    pub fn from_results(
        results: Vec<InspectFileResult>,
        skipped: Vec<String>,
        errors: Vec<JsonError>,
    ) -> Self {
        let unreadable = results.iter().filter(|r| r.error.is_some()).count();
        let with_errors = results
            .iter()
            .filter(|r| r.report.as_ref().is_some_and(|r| r.has_errors()))
            .count();
        let with_warnings = results
            .iter()
            .filter(|r| {
                r.report
                    .as_ref()
                    .is_some_and(|r| !r.has_errors() && r.has_warnings())
            })
            .count();
        let total = results.len();
        let clean = total - unreadable - with_errors - with_warnings;
        let success = unreadable == 0 && with_errors == 0 && errors.is_empty();

        Self {
            success,
            summary: InspectSummary {
                total,
                clean,
                with_warnings,
                with_errors,
                unreadable,
                skipped: skipped.len(),
            },
            results,
            skipped,
            errors,
        }
    }
}

/// Run the inspect command.
///
/// # Arguments
/// * `path` - Audio file or directory to inspect
/// * `json_output` - Whether to output machine-readable JSON
///
/// # Returns
/// Exit code: 0 if no header has errors, 1 otherwise
pub fn run(path: &str, json_output: bool) -> Result<ExitCode> {
    let input = Path::new(path);

    if input.is_dir() {
        return run_directory(input, json_output);
    }

    let error = if input.is_file() {
        match AudioFile::from_path(input) {
            Some(file) => return run_single(&file, json_output),
            None => JsonError::new(
                error_codes::UNKNOWN_EXTENSION,
                format!("File is neither a WAVE nor an AIFF file: {}", path),
            ),
        }
    } else {
        JsonError::new(
            error_codes::INVALID_PATH,
            format!("Given path is neither a file nor a directory: {}", path),
        )
    };

    if json_output {
        let output = InspectOutput::from_results(vec![], vec![], vec![error.with_file(path)]);
        println!("{}", serde_json::to_string_pretty(&output)?);
        Ok(ExitCode::from(1))
    } else {
        anyhow::bail!("{}", error.message)
    }
}

fn run_single(file: &AudioFile, json_output: bool) -> Result<ExitCode> {
    let result = inspect_file(file);

    if json_output {
        let output = InspectOutput::from_results(vec![result], vec![], vec![]);
        println!("{}", serde_json::to_string_pretty(&output)?);
        return Ok(exit_code(output.success));
    }

    print_result(&result);
    Ok(exit_code(!result.failed()))
}

fn run_directory(dir: &Path, json_output: bool) -> Result<ExitCode> {
    let entries = scan_directory(dir);
    info!(dir = %dir.display(), files = entries.len(), "scanned directory");

    let results: Vec<Option<InspectFileResult>> = entries
        .par_iter()
        .map(|entry| match entry {
            Entry::Audio(file) => Some(inspect_file(file)),
            Entry::Skipped(_) => None,
        })
        .collect();

    if json_output {
        let skipped = entries
            .iter()
            .filter(|e| matches!(e, Entry::Skipped(_)))
            .map(|e| e.path().display().to_string())
            .collect();
        let output =
            InspectOutput::from_results(results.into_iter().flatten().collect(), skipped, vec![]);
        println!("{}", serde_json::to_string_pretty(&output)?);
        return Ok(exit_code(output.success));
    }

    println!("Scanning directory {}...", dir.display());
    let mut total = 0;
    let mut failed = false;
    for (entry, result) in entries.iter().zip(&results) {
        match result {
            Some(result) => {
                print_result(result);
                println!("{}", separator());
                total += 1;
                failed |= result.failed();
            }
            None => println!(
                "Unrecognized file extension, skipping file {}",
                entry.path().display()
            ),
        }
    }
    println!("Total Number of Audio Files: {}", total);
    Ok(exit_code(!failed))
}

/// Read and inspect a single audio file.
pub fn inspect_file(file: &AudioFile) -> InspectFileResult {
    let path = file.path.display().to_string();
    match fs::read(&file.path) {
        Ok(data) => {
            let report = parse_as(file.kind, &data);
            info!(
                path = %path,
                errors = report.errors.len(),
                warnings = report.warnings.len(),
                "inspected"
            );
            InspectFileResult {
                path,
                container: file.kind,
                report: Some(report),
                error: None,
            }
        }
        Err(e) => InspectFileResult {
            error: Some(
                JsonError::new(error_codes::FILE_READ, format!("Failed to read file: {}", e))
                    .with_file(&path),
            ),
            path,
            container: file.kind,
            report: None,
        },
    }
}

fn print_result(result: &InspectFileResult) {
    match (&result.report, &result.error) {
        (Some(report), _) => print_report(&display_name(Path::new(&result.path)), report),
        (None, Some(error)) => println!(
            "{} {} - {}",
            "[ERROR]".red().bold(),
            result.path,
            error.message
        ),
        (None, None) => {}
    }
}

fn exit_code(success: bool) -> ExitCode {
    if success {
        ExitCode::SUCCESS
    } else {
        ExitCode::from(1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wavemend_core::{synthesize, PcmFormat};

    fn write_wave(path: &Path, payload_len: u32) {
        let mut data = synthesize(ContainerKind::Wave, &PcmFormat::default(), payload_len);
        data.resize(data.len() + payload_len as usize, 0);
        fs::write(path, data).unwrap();
    }

    #[test]
    fn test_inspect_clean_file() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("clean.wav");
        write_wave(&path, 100);

        let result = inspect_file(&AudioFile::from_path(&path).unwrap());
        assert!(!result.failed());
        let report = result.report.unwrap();
        assert!(report.errors.is_empty());
        assert!(report.warnings.is_empty());
    }

    #[test]
    fn test_inspect_uses_extension_kind() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("mislabeled.aiff");
        write_wave(&path, 10);

        let result = inspect_file(&AudioFile::from_path(&path).unwrap());
        assert_eq!(result.container, ContainerKind::Aiff);
        assert!(result.failed());
    }

    #[test]
    fn test_missing_file_is_recorded() {
        let file = AudioFile {
            path: Path::new("/nonexistent/take.wav").to_path_buf(),
            kind: ContainerKind::Wave,
        };
        let result = inspect_file(&file);
        assert!(result.report.is_none());
        let error = result.error.unwrap();
        assert_eq!(error.code, error_codes::FILE_READ);
        assert!(error.message.starts_with("Failed to read file"));
        assert_eq!(error.file.as_deref(), Some("/nonexistent/take.wav"));
    }

    #[test]
    fn test_summary_counts() {
        let tmp = tempfile::tempdir().unwrap();
        let clean = tmp.path().join("clean.wav");
        write_wave(&clean, 100);
        let broken = tmp.path().join("broken.wav");
        fs::write(&broken, [0u8; 100]).unwrap();
        let short = tmp.path().join("short.wav");
        let mut data = synthesize(ContainerKind::Wave, &PcmFormat::default(), 100);
        data.resize(44 + 80, 0);
        fs::write(&short, data).unwrap();

        let results = [clean, broken, short]
            .iter()
            .map(|p| inspect_file(&AudioFile::from_path(p).unwrap()))
            .collect();
        let output = InspectOutput::from_results(results, vec!["notes.txt".into()], vec![]);

        assert!(!output.success);
        assert_eq!(output.summary.total, 3);
        assert_eq!(output.summary.clean, 1);
        assert_eq!(output.summary.with_errors, 1);
        assert_eq!(output.summary.with_warnings, 1);
        assert_eq!(output.summary.skipped, 1);
    }

    #[test]
    fn test_run_directory_exit_code() {
        let tmp = tempfile::tempdir().unwrap();
        write_wave(&tmp.path().join("a.wav"), 10);
        fs::write(tmp.path().join("readme.md"), b"hi").unwrap();
        assert_eq!(run(tmp.path().to_str().unwrap(), true).unwrap(), ExitCode::SUCCESS);

        fs::write(tmp.path().join("b.wav"), [0u8; 64]).unwrap();
        assert_eq!(run(tmp.path().to_str().unwrap(), true).unwrap(), ExitCode::from(1));
    }

    #[test]
    fn test_run_rejects_unknown_extension() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("song.mp3");
        fs::write(&path, b"ID3").unwrap();
        let err = run(path.to_str().unwrap(), false).unwrap_err();
        assert!(err.to_string().contains("neither a WAVE nor an AIFF file"));
    }

    #[test]
    fn test_run_rejects_missing_path() {
        let err = run("/nonexistent/path", false).unwrap_err();
        assert!(err
            .to_string()
            .contains("Given path is neither a file nor a directory"));
    }
}
