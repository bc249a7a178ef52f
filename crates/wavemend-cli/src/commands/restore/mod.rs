//! Restore command implementation
//!
//! Rebuilds the header of damaged WAVE/AIFF files from the given audio
//! parameters and splices it onto the intact payload. A directory source is
//! restored into a destination directory, keeping relative paths; only files
//! whose inspection reports errors are rewritten unless `force` is set.

mod types;

pub use types::{RestoreFileResult, RestoreOptions, RestoreOutput, RestoreStatus, RestoreSummary};

use anyhow::{Context, Result};
use colored::Colorize;
use rayon::prelude::*;
use std::fs;
use std::path::Path;
use std::process::ExitCode;
use tracing::{info, warn};
use wavemend_core::{parse_as, restore, ContainerKind, ProfileTable};

use super::json_output::{error_codes, JsonError};
use super::reporting::separator;
use crate::config::load_profiles;
use crate::input::{destination_for, scan_directory, Entry};

/// Run the restore command.
///
/// # Arguments
/// * `source` - Damaged audio file or directory of audio files
/// * `destination` - Output file, or output directory for a directory source
/// * `options` - Audio parameters, offsets and flags
///
/// # Returns
/// Exit code: 0 if no file failed, 1 otherwise
pub fn run(source: &str, destination: &str, options: &RestoreOptions) -> Result<ExitCode> {
    let profiles = load_profiles(options.profiles.as_deref())?;
    let source_path = Path::new(source);
    let destination_path = Path::new(destination);

    if source_path.is_dir() {
        run_directory(source_path, destination_path, options, &profiles)
    } else if source_path.is_file() {
        run_single(source_path, destination_path, options, &profiles)
    } else {
        fail(
            options,
            JsonError::new(
                error_codes::INVALID_PATH,
                format!("Given path is neither a file nor a directory: {}", source),
            )
            .with_file(source),
        )
    }
}

fn run_single(
    source: &Path,
    destination: &Path,
    options: &RestoreOptions,
    profiles: &ProfileTable,
) -> Result<ExitCode> {
    let Some(kind) = options.container.or_else(|| ContainerKind::from_path(source)) else {
        return fail(
            options,
            JsonError::new(
                error_codes::UNKNOWN_EXTENSION,
                format!(
                    "Unrecognized file extension, skipping file {}",
                    source.display()
                ),
            )
            .with_file(source.display().to_string()),
        );
    };

    let result = restore_file(source, destination, kind, options, profiles, false);

    if options.json {
        let output = RestoreOutput::from_results(vec![result], vec![]);
        println!("{}", serde_json::to_string_pretty(&output)?);
        return Ok(exit_code(output.success));
    }

    print_outcome(&result, options);
    Ok(exit_code(result.status != RestoreStatus::Failed))
}

fn run_directory(
    source: &Path,
    destination: &Path,
    options: &RestoreOptions,
    profiles: &ProfileTable,
) -> Result<ExitCode> {
    if destination.exists() {
        if !destination.is_dir() {
            return fail(
                options,
                JsonError::new(
                    error_codes::INVALID_DESTINATION,
                    "File at destination path already exists but is not a directory.",
                )
                .with_file(destination.display().to_string()),
            );
        }
    } else {
        if !options.json {
            println!("Creating destination directory {}...", destination.display());
        }
        fs::create_dir_all(destination).with_context(|| {
            format!(
                "Failed to create destination directory: {}",
                destination.display()
            )
        })?;
    }

    let entries = scan_directory(source);
    info!(dir = %source.display(), files = entries.len(), "scanned directory");

    let results: Vec<Option<RestoreFileResult>> = entries
        .par_iter()
        .map(|entry| match entry {
            Entry::Audio(file) => {
                let target_kind = options.container.unwrap_or(file.kind);
                let target = destination_for(file, source, destination, target_kind);
                Some(restore_file(
                    &file.path,
                    &target,
                    file.kind,
                    options,
                    profiles,
                    !options.force,
                ))
            }
            Entry::Skipped(_) => None,
        })
        .collect();

    if options.json {
        let output = RestoreOutput::from_results(results.into_iter().flatten().collect(), vec![]);
        println!("{}", serde_json::to_string_pretty(&output)?);
        return Ok(exit_code(output.success));
    }

    println!("Scanning directory {}...", source.display());
    println!("{}", separator());
    let mut repaired = 0;
    let mut failed = false;
    for (entry, result) in entries.iter().zip(&results) {
        let Some(result) = result else {
            println!(
                "Unrecognized file extension, skipping file {}",
                entry.path().display()
            );
            continue;
        };

        println!(
            "Analyzing {} file {}",
            result.source_container.name(),
            result.source
        );
        if result.status == RestoreStatus::Intact {
            continue;
        }
        if result.header_errors > 0 {
            println!("Found errors in file {}, trying to restore...", result.source);
        }
        print_outcome(result, options);
        println!("{}", separator());

        match result.status {
            RestoreStatus::Restored => repaired += 1,
            RestoreStatus::Failed => failed = true,
            RestoreStatus::Intact | RestoreStatus::Skipped => {}
        }
    }
    println!("Total Number of Repaired Audio Files: {}", repaired);
    Ok(exit_code(!failed))
}

/// Restore a single file.
///
/// With `only_damaged`, a source whose header inspects without errors is
/// left alone and reported as [`RestoreStatus::Intact`].
fn restore_file(
    source: &Path,
    destination: &Path,
    source_kind: ContainerKind,
    options: &RestoreOptions,
    profiles: &ProfileTable,
    only_damaged: bool,
) -> RestoreFileResult {
    let params = options.parameters(source_kind);
    let mut result = RestoreFileResult {
        source: source.display().to_string(),
        destination: destination.display().to_string(),
        source_container: source_kind,
        container: params.container,
        status: RestoreStatus::Failed,
        header_errors: 0,
        range: None,
        payload_hash: None,
        error: None,
    };

    let data = match fs::read(source) {
        Ok(d) => d,
        Err(e) => {
            result.error = Some(
                JsonError::new(error_codes::FILE_READ, format!("Failed to read file: {}", e))
                    .with_file(&result.source),
            );
            return result;
        }
    };

    result.header_errors = parse_as(source_kind, &data).errors.len();
    if only_damaged && result.header_errors == 0 {
        result.status = RestoreStatus::Intact;
        return result;
    }

    if destination.exists() && !options.overwrite {
        result.status = RestoreStatus::Skipped;
        return result;
    }

    let restored = match restore(&data, &params, profiles) {
        Ok(r) => r,
        Err(e) => {
            warn!(source = %result.source, error = %e, "restore failed");
            result.error = Some(
                JsonError::new(error_codes::RESTORE_FAILED, e.to_string())
                    .with_file(&result.source),
            );
            return result;
        }
    };

    let written = match destination.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => fs::create_dir_all(parent),
        _ => Ok(()),
    }
    .and_then(|_| fs::write(destination, &restored.bytes));
    if let Err(e) = written {
        result.error = Some(
            JsonError::new(error_codes::FILE_WRITE, format!("Failed to write file: {}", e))
                .with_file(&result.destination),
        );
        return result;
    }

    info!(
        source = %result.source,
        destination = %result.destination,
        bytes = restored.bytes.len(),
        "restored"
    );
    result.status = RestoreStatus::Restored;
    result.range = Some(restored.range);
    result.payload_hash = Some(restored.payload_hash);
    result
}

fn print_outcome(result: &RestoreFileResult, options: &RestoreOptions) {
    let kind = result.container.name();
    match result.status {
        RestoreStatus::Restored => {
            println!(
                "Restoring {} header in source file {}, storing result file in {}",
                kind, result.source, result.destination
            );
            println!(
                "Writing {} file header with sample rate {} Hz, {} bits per sample, {} audio channels...",
                kind,
                options.format.sample_rate,
                options.format.bits_per_sample,
                options.format.channels
            );
            if let Some(range) = result.range {
                println!(
                    "Payload: bytes {}..{} of the source ({} bytes)",
                    range.start,
                    range.end,
                    range.len()
                );
            }
            println!(
                "{} file {} written successfully.",
                kind,
                result.destination.green()
            );
        }
        RestoreStatus::Skipped => println!(
            "{} Destination file {} already exists, skipping (use --overwrite to replace it)",
            "[WARNING]".yellow(),
            result.destination
        ),
        RestoreStatus::Failed => println!(
            "{} {} - {}",
            "[ERROR]".red().bold(),
            result.source,
            result
                .error
                .as_ref()
                .map_or("unknown error", |e| e.message.as_str())
        ),
        RestoreStatus::Intact => println!(
            "No header errors found in file {}, leaving it untouched.",
            result.source
        ),
    }
}

/// Reports a fatal error before any file was processed.
fn fail(options: &RestoreOptions, error: JsonError) -> Result<ExitCode> {
    if options.json {
        let output = RestoreOutput::from_results(vec![], vec![error]);
        println!("{}", serde_json::to_string_pretty(&output)?);
        Ok(ExitCode::from(1))
    } else {
        anyhow::bail!("{}", error.message)
    }
}

fn exit_code(success: bool) -> ExitCode {
    if success {
        ExitCode::SUCCESS
    } else {
        ExitCode::from(1)
    }
}
