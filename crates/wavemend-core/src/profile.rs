//! Application profiles: where damaged files from a known application keep
//! their intact payload.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::container::ContainerKind;
use crate::error::ConfigError;

/// Application that produced the damaged file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Application {
    /// Logic Pro.
    #[default]
    Logic,
    /// Ableton Live.
    Live,
    /// DJ software that appends an ID3v1 tag to its recordings.
    Djvu,
}

impl Application {
    pub const ALL: [Application; 3] = [Application::Logic, Application::Live, Application::Djvu];

    pub fn as_str(&self) -> &'static str {
        match self {
            Application::Logic => "logic",
            Application::Live => "live",
            Application::Djvu => "djvu",
        }
    }

    fn index(&self) -> usize {
        match self {
            Application::Logic => 0,
            Application::Live => 1,
            Application::Djvu => 2,
        }
    }
}

impl fmt::Display for Application {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Application {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Application::ALL
            .into_iter()
            .find(|app| app.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| ConfigError::UnknownApplication(s.to_string()))
    }
}

/// Where the payload ends when no explicit end offset is given.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EndOffsetPolicy {
    /// The payload runs to the end of the file.
    #[default]
    FileEnd,
    /// The last `n` bytes are trailer, not audio, whatever they contain.
    TrimTrailing(u32),
    /// A trailing ID3v1 tag is dropped when the file ends with one.
    TrimId3v1,
}

/// Length of an ID3v1 tag block.
pub const ID3V1_TAG_LEN: u64 = 128;

/// True if the last 128 bytes of `source` start with `TAG`.
pub fn has_id3v1_tag(source: &[u8]) -> bool {
    let len = source.len() as u64;
    len >= ID3V1_TAG_LEN && source[(len - ID3V1_TAG_LEN) as usize..].starts_with(b"TAG")
}

impl EndOffsetPolicy {
    /// Default end offset for a file of `file_size` bytes.
    ///
    /// Only the size is known here, so [`EndOffsetPolicy::TrimId3v1`] keeps
    /// the whole file. Use [`EndOffsetPolicy::end_in`] when the contents are
    /// available.
    pub fn end_for(&self, file_size: u64) -> i64 {
        match self {
            EndOffsetPolicy::FileEnd | EndOffsetPolicy::TrimId3v1 => file_size as i64,
            EndOffsetPolicy::TrimTrailing(n) => file_size as i64 - *n as i64,
        }
    }

    /// Default end offset for the file `source`.
    pub fn end_in(&self, source: &[u8]) -> i64 {
        let file_size = source.len() as u64;
        match self {
            EndOffsetPolicy::TrimId3v1 if has_id3v1_tag(source) => {
                (file_size - ID3V1_TAG_LEN) as i64
            }
            _ => self.end_for(file_size),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApplicationProfile {
    pub application: Application,
    /// Payload start in damaged WAVE files.
    pub wave_default_offset: u32,
    /// Payload start in damaged AIFF files.
    pub aiff_default_offset: u32,
    #[serde(default)]
    pub end_offset_policy: EndOffsetPolicy,
}

impl ApplicationProfile {
    /// Default payload start for the container kind.
    pub fn default_offset(&self, kind: ContainerKind) -> u32 {
        match kind {
            ContainerKind::Wave => self.wave_default_offset,
            ContainerKind::Aiff => self.aiff_default_offset,
        }
    }
}

/// One profile per application. Built once, then only read.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProfileTable {
    profiles: [ApplicationProfile; 3],
}

/// On-disk form of a profile table.
#[derive(Debug, Deserialize)]
struct ProfileFile {
    #[serde(default)]
    profiles: Vec<ApplicationProfile>,
}

impl ProfileTable {
    /// The empirically derived defaults.
    pub fn builtin() -> Self {
        Self {
            profiles: [
                ApplicationProfile {
                    application: Application::Logic,
                    wave_default_offset: 44,
                    aiff_default_offset: 512,
                    end_offset_policy: EndOffsetPolicy::FileEnd,
                },
                ApplicationProfile {
                    application: Application::Live,
                    wave_default_offset: 44,
                    aiff_default_offset: 54,
                    end_offset_policy: EndOffsetPolicy::FileEnd,
                },
                ApplicationProfile {
                    application: Application::Djvu,
                    wave_default_offset: 44,
                    aiff_default_offset: 54,
                    end_offset_policy: EndOffsetPolicy::TrimId3v1,
                },
            ],
        }
    }

    /// Parses a JSON table. Applications missing from the file keep their
    /// built-in profile; when an application is listed twice the last entry wins.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let file: ProfileFile = serde_json::from_str(json)?;
        let mut table = Self::builtin();
        for profile in file.profiles {
            table.profiles[profile.application.index()] = profile;
        }
        Ok(table)
    }

    pub fn get(&self, application: Application) -> &ApplicationProfile {
        &self.profiles[application.index()]
    }

    pub fn iter(&self) -> impl Iterator<Item = &ApplicationProfile> {
        self.profiles.iter()
    }
}

impl Default for ProfileTable {
    fn default() -> Self {
        Self::builtin()
    }
}
