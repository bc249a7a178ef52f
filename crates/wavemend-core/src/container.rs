//! Container kinds and their fixed layout constants.

use std::fmt;
use std::path::Path;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Byte order of multi-byte integer fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Endianness {
    Little,
    Big,
}

/// The two supported container families.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ContainerKind {
    /// RIFF/WAVE, little-endian.
    Wave,
    /// FORM/AIFF, big-endian.
    Aiff,
}

impl ContainerKind {
    /// All kinds, in detection order.
    pub const ALL: [ContainerKind; 2] = [ContainerKind::Wave, ContainerKind::Aiff];

    /// Outer chunk identifier at offset 0.
    pub fn magic(&self) -> &'static [u8; 4] {
        match self {
            ContainerKind::Wave => b"RIFF",
            ContainerKind::Aiff => b"FORM",
        }
    }

    /// Form type at offset 8.
    pub fn form_type(&self) -> &'static [u8; 4] {
        match self {
            ContainerKind::Wave => b"WAVE",
            ContainerKind::Aiff => b"AIFF",
        }
    }

    /// Tag of the format-description chunk.
    pub fn format_tag(&self) -> &'static [u8; 4] {
        match self {
            ContainerKind::Wave => b"fmt ",
            ContainerKind::Aiff => b"COMM",
        }
    }

    /// Tag of the sample data chunk.
    pub fn data_tag(&self) -> &'static [u8; 4] {
        match self {
            ContainerKind::Wave => b"data",
            ContainerKind::Aiff => b"SSND",
        }
    }

    /// Smallest body a format chunk needs to describe PCM audio.
    pub fn min_format_chunk_size(&self) -> u32 {
        match self {
            ContainerKind::Wave => 16,
            ContainerKind::Aiff => 18,
        }
    }

    /// Length of the canonical header written by the synthesizer.
    pub fn header_len(&self) -> usize {
        match self {
            ContainerKind::Wave => 44,
            ContainerKind::Aiff => 54,
        }
    }

    /// Byte order of every multi-byte field in this container.
    pub fn endianness(&self) -> Endianness {
        match self {
            ContainerKind::Wave => Endianness::Little,
            ContainerKind::Aiff => Endianness::Big,
        }
    }

    /// Display name used in messages.
    pub fn name(&self) -> &'static str {
        match self {
            ContainerKind::Wave => "WAVE",
            ContainerKind::Aiff => "AIFF",
        }
    }

    /// Lowercase file extensions associated with this kind.
    pub fn extensions(&self) -> &'static [&'static str] {
        match self {
            ContainerKind::Wave => &["wav", "wave"],
            ContainerKind::Aiff => &["aif", "aiff"],
        }
    }

    /// Detects the kind from the first four bytes of a buffer.
    ///
    /// Only the outer magic is checked; the form type at offset 8 is left to
    /// the parser so that it can be reported.
    pub fn detect(buffer: &[u8]) -> Option<Self> {
        let head = buffer.get(0..4)?;
        Self::ALL.into_iter().find(|kind| head == kind.magic())
    }

    /// Guesses the kind from a path's extension (case-insensitive).
    pub fn from_path(path: &Path) -> Option<Self> {
        let ext = path.extension()?.to_str()?.to_lowercase();
        Self::ALL
            .into_iter()
            .find(|kind| kind.extensions().contains(&ext.as_str()))
    }
}

impl fmt::Display for ContainerKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for ContainerKind {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "wave" | "wav" => Ok(ContainerKind::Wave),
            "aiff" | "aif" => Ok(ContainerKind::Aiff),
            _ => Err(ConfigError::UnknownContainer(s.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn detect_by_magic() {
        assert_eq!(ContainerKind::detect(b"RIFF\0\0\0\0WAVE"), Some(ContainerKind::Wave));
        assert_eq!(ContainerKind::detect(b"FORM\0\0\0\0AIFF"), Some(ContainerKind::Aiff));
        assert_eq!(ContainerKind::detect(b"RIF"), None);
        assert_eq!(ContainerKind::detect(&[0u8; 44]), None);
    }

    #[test]
    fn detect_by_extension() {
        assert_eq!(
            ContainerKind::from_path(Path::new("take1.WAV")),
            Some(ContainerKind::Wave)
        );
        assert_eq!(
            ContainerKind::from_path(Path::new("dir/take1.wave")),
            Some(ContainerKind::Wave)
        );
        assert_eq!(
            ContainerKind::from_path(Path::new("take1.Aif")),
            Some(ContainerKind::Aiff)
        );
        assert_eq!(ContainerKind::from_path(Path::new("take1.mp3")), None);
        assert_eq!(ContainerKind::from_path(Path::new("noext")), None);
    }

    #[test]
    fn parse_names() {
        assert_eq!("WAVE".parse::<ContainerKind>().unwrap(), ContainerKind::Wave);
        assert_eq!("aiff".parse::<ContainerKind>().unwrap(), ContainerKind::Aiff);
        assert!("flac".parse::<ContainerKind>().is_err());
    }
}
