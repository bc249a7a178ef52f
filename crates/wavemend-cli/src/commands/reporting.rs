//! Text rendering of header reports.

use colored::Colorize;
use wavemend_core::{ContainerKind, Diagnostic, HeaderReport};

/// Width of the separator printed between files.
const SEPARATOR_WIDTH: usize = 42;

pub(crate) fn separator() -> String {
    "-".repeat(SEPARATOR_WIDTH)
}

/// Renders the header fields and diagnostics of one file.
pub(crate) fn report_lines(name: &str, report: &HeaderReport) -> Vec<String> {
    let kind = report.container_kind.map(|k| k.name()).unwrap_or("Audio");
    let mut lines = vec![
        format!("Displaying {} File Header Data for File {}", kind, name),
        format!("Number of Bytes: {}", report.file_size),
        format!(
            "Header contains the following bytes (hexadecimal): {}",
            report.hex_header()
        ),
    ];

    let mut field = |label: &str, value: Option<String>| {
        if let Some(value) = value {
            lines.push(format!("{}: {}", label, value));
        }
    };

    field("Chunk Size", report.declared_chunk_size.map(|v| v.to_string()));
    field("Subchunk Size", report.format_chunk_size.map(|v| v.to_string()));
    if let Some(info) = &report.format_info {
        let aiff = report.container_kind == Some(ContainerKind::Aiff);
        if !aiff {
            field("Audio Format", Some(info.audio_format.to_string()));
        }
        field("Number of Channels", Some(info.channels.to_string()));
        field("Number of Frames", info.sample_frames.map(|v| v.to_string()));
        field(
            "Sample Rate",
            Some(match info.extended_sample_rate {
                Some(rate) if rate.fract() != 0.0 => format!("{} ({})", info.sample_rate, rate),
                _ => info.sample_rate.to_string(),
            }),
        );
        field(
            "Byte Rate (number of bytes per second)",
            Some(info.byte_rate.to_string()),
        );
        field(
            "Bytes per Sample in all Channels (Block Align)",
            Some(info.block_align.to_string()),
        );
        field("Bits per Sample", Some(info.bits_per_sample.to_string()));
    }
    field("Data Subchunk Size", report.declared_data_size.map(|v| v.to_string()));
    field("Offset", report.sound_data_offset.map(|v| v.to_string()));
    field("Block Size", report.sound_block_size.map(|v| v.to_string()));

    for note in &report.notes {
        lines.push(diagnostic_line("[NOTE]".cyan().to_string(), note));
    }
    for warning in &report.warnings {
        lines.push(diagnostic_line("[WARNING]".yellow().to_string(), warning));
    }
    for error in &report.errors {
        lines.push(diagnostic_line("[ERROR]".red().bold().to_string(), error));
    }
    lines
}

fn diagnostic_line(label: String, diagnostic: &impl Diagnostic) -> String {
    format!(
        "{} {} {}",
        label,
        diagnostic,
        format!("({})", diagnostic.code()).dimmed()
    )
}

pub(crate) fn print_report(name: &str, report: &HeaderReport) {
    for line in report_lines(name, report) {
        println!("{}", line);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wavemend_core::{parse, synthesize, PcmFormat};

    fn contains(lines: &[String], needle: &str) -> bool {
        lines.iter().any(|l| l.contains(needle))
    }

    #[test]
    fn test_wave_fields() {
        let mut file = synthesize(ContainerKind::Wave, &PcmFormat::new(44100, 16, 2), 8);
        file.extend_from_slice(&[0u8; 8]);
        let lines = report_lines("take.wav", &parse(&file));

        assert_eq!(lines[0], "Displaying WAVE File Header Data for File take.wav");
        assert_eq!(lines[1], "Number of Bytes: 52");
        assert!(lines[2].starts_with("Header contains the following bytes (hexadecimal): 52 49 46 46"));
        for expected in [
            "Chunk Size: 44",
            "Subchunk Size: 16",
            "Audio Format: 1",
            "Number of Channels: 2",
            "Sample Rate: 44100",
            "Byte Rate (number of bytes per second): 176400",
            "Bytes per Sample in all Channels (Block Align): 4",
            "Bits per Sample: 16",
            "Data Subchunk Size: 8",
        ] {
            assert!(contains(&lines, expected), "missing {:?} in {:#?}", expected, lines);
        }
        assert!(!contains(&lines, "Number of Frames"));
        assert!(!contains(&lines, "[ERROR]"));
    }

    #[test]
    fn test_aiff_fields() {
        let mut file = synthesize(ContainerKind::Aiff, &PcmFormat::new(48000, 16, 1), 20);
        file.extend_from_slice(&[0u8; 20]);
        let lines = report_lines("take.aiff", &parse(&file));

        assert_eq!(lines[0], "Displaying AIFF File Header Data for File take.aiff");
        assert!(contains(&lines, "Number of Frames: 10"));
        assert!(contains(&lines, "Offset: 0"));
        assert!(contains(&lines, "Block Size: 0"));
        assert!(!contains(&lines, "Audio Format"));
    }

    #[test]
    fn test_diagnostics_are_listed() {
        let lines = report_lines("junk.wav", &parse(b"garbage bytes"));
        assert!(contains(&lines, "[ERROR]"));
        assert!(contains(
            &lines,
            "File does not start with 'RIFF' or 'FORM' and therefore does not contain a correct header."
        ));
        assert!(contains(&lines, "H001"));
        assert!(!contains(&lines, "Chunk Size"));
    }
}
