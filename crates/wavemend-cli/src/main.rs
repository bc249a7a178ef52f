//! wavemend - inspect and repair damaged WAVE and AIFF file headers
//!
//! `inspect` prints the header fields of a file or of every audio file in a
//! directory. `restore` writes a fresh header in front of the intact payload.

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::process::ExitCode;

use wavemend_cli::commands;
use wavemend_cli::commands::restore::RestoreOptions;
use wavemend_cli::logging::{self, Runtime};
use wavemend_core::{Application, ContainerKind, PcmFormat};

/// wavemend - WAVE/AIFF header inspection and repair
#[derive(Parser)]
#[command(name = "wavemend")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    /// Log progress to stderr (RUST_LOG overrides the level)
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Number of worker threads for directory processing
    #[arg(short = 'j', long, global = true)]
    jobs: Option<usize>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Display the header fields of an audio file or of all audio files in a directory
    Inspect {
        /// Path to a .wav/.wave/.aif/.aiff file or a directory
        path: String,

        /// Output machine-readable JSON diagnostics (no colored output)
        #[arg(long)]
        json: bool,
    },

    /// Restore damaged headers from the given audio parameters
    Restore {
        /// Damaged audio file, or directory of audio files
        source: String,

        /// Output file, or output directory for a directory source
        destination: String,

        /// Sample rate in Hz
        #[arg(short, long, default_value_t = 44100)]
        sample_rate: u32,

        /// Bits per sample (multiple of 8)
        #[arg(short, long, default_value_t = 16)]
        bits_per_sample: u16,

        /// Number of audio channels
        #[arg(short, long, default_value_t = 1)]
        channels: u16,

        /// Application that produced the damaged file (logic, live, djvu)
        #[arg(short, long, default_value = "logic")]
        application: Application,

        /// Payload start in bytes; negative values count from the end of the file
        #[arg(long, allow_hyphen_values = true)]
        offset: Option<i64>,

        /// Payload end in bytes; negative values count from the end of the file
        #[arg(long, allow_hyphen_values = true)]
        end_offset: Option<i64>,

        /// Container to write (wave, aiff); defaults to the source extension
        #[arg(long)]
        format: Option<ContainerKind>,

        /// Application profile table (JSON) overriding the built-in offsets
        #[arg(long)]
        profiles: Option<PathBuf>,

        /// Restore every file in a directory, not only those with header errors
        #[arg(short, long)]
        force: bool,

        /// Replace existing destination files
        #[arg(long)]
        overwrite: bool,

        /// Output machine-readable JSON diagnostics (no colored output)
        #[arg(long)]
        json: bool,
    },
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let runtime = Runtime {
        verbose: cli.verbose,
        jobs: cli.jobs,
    };
    if let Err(e) = logging::init(runtime) {
        eprintln!("{}: {}", colored::Colorize::red("error"), e);
        return ExitCode::from(1);
    }

    let result = match cli.command {
        Commands::Inspect { path, json } => commands::inspect::run(&path, json),
        Commands::Restore {
            source,
            destination,
            sample_rate,
            bits_per_sample,
            channels,
            application,
            offset,
            end_offset,
            format,
            profiles,
            force,
            overwrite,
            json,
        } => {
            let options = RestoreOptions {
                format: PcmFormat::new(sample_rate, bits_per_sample, channels),
                application,
                offset,
                end_offset,
                container: format,
                profiles,
                force,
                overwrite,
                json,
            };
            commands::restore::run(&source, &destination, &options)
        }
    };

    match result {
        Ok(code) => code,
        Err(e) => {
            eprintln!("{}: {:#}", colored::Colorize::red("error"), e);
            ExitCode::from(1)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_parses_inspect() {
        let cli = Cli::try_parse_from(["wavemend", "inspect", "take.wav"]).unwrap();
        assert!(!cli.verbose);
        match cli.command {
            Commands::Inspect { path, json } => {
                assert_eq!(path, "take.wav");
                assert!(!json);
            }
            _ => panic!("expected inspect command"),
        }
    }

    #[test]
    fn test_cli_parses_global_flags_after_subcommand() {
        let cli =
            Cli::try_parse_from(["wavemend", "inspect", "recordings", "--json", "-v", "-j", "4"])
                .unwrap();
        assert!(cli.verbose);
        assert_eq!(cli.jobs, Some(4));
        match cli.command {
            Commands::Inspect { json, .. } => assert!(json),
            _ => panic!("expected inspect command"),
        }
    }

    #[test]
    fn test_cli_restore_defaults() {
        let cli = Cli::try_parse_from(["wavemend", "restore", "in.wav", "out.wav"]).unwrap();
        match cli.command {
            Commands::Restore {
                source,
                destination,
                sample_rate,
                bits_per_sample,
                channels,
                application,
                offset,
                end_offset,
                format,
                profiles,
                force,
                overwrite,
                json,
            } => {
                assert_eq!(source, "in.wav");
                assert_eq!(destination, "out.wav");
                assert_eq!(sample_rate, 44100);
                assert_eq!(bits_per_sample, 16);
                assert_eq!(channels, 1);
                assert_eq!(application, Application::Logic);
                assert_eq!(offset, None);
                assert_eq!(end_offset, None);
                assert_eq!(format, None);
                assert!(profiles.is_none());
                assert!(!force && !overwrite && !json);
            }
            _ => panic!("expected restore command"),
        }
    }

    #[test]
    fn test_cli_restore_accepts_negative_offsets() {
        let cli = Cli::try_parse_from([
            "wavemend",
            "restore",
            "in.aif",
            "out.aif",
            "-s",
            "48000",
            "-b",
            "24",
            "-c",
            "2",
            "-a",
            "Djvu",
            "--offset",
            "-100",
            "--end-offset",
            "-128",
            "--format",
            "aiff",
            "-f",
        ])
        .unwrap();
        match cli.command {
            Commands::Restore {
                sample_rate,
                bits_per_sample,
                channels,
                application,
                offset,
                end_offset,
                format,
                force,
                ..
            } => {
                assert_eq!(sample_rate, 48000);
                assert_eq!(bits_per_sample, 24);
                assert_eq!(channels, 2);
                assert_eq!(application, Application::Djvu);
                assert_eq!(offset, Some(-100));
                assert_eq!(end_offset, Some(-128));
                assert_eq!(format, Some(ContainerKind::Aiff));
                assert!(force);
            }
            _ => panic!("expected restore command"),
        }
    }

    #[test]
    fn test_cli_rejects_unknown_application() {
        let err = Cli::try_parse_from([
            "wavemend", "restore", "in.wav", "out.wav", "-a", "audacity",
        ])
        .err()
        .unwrap();
        assert!(err.to_string().contains("unknown application 'audacity'"));
    }

    #[test]
    fn test_cli_requires_destination() {
        let err = Cli::try_parse_from(["wavemend", "restore", "in.wav"])
            .err()
            .unwrap();
        assert!(err.to_string().contains("<DESTINATION>"));
    }
}
