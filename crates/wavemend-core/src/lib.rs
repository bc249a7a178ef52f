//! wavemend core - inspection and reconstruction of RIFF/WAVE and AIFF headers.
//!
//! This crate contains everything that operates on the bytes of a single audio
//! file:
//!
//! - [`reader`]: bounds-checked cursor over a byte buffer
//! - [`parser`]: chunk walker producing a [`HeaderReport`]
//! - [`profile`] and [`offsets`]: where the intact payload starts and ends
//! - [`synth`]: byte-exact WAVE and AIFF header synthesis
//! - [`restore`]: header + payload splicing for one file
//!
//! All operations are pure and synchronous. Buffers are handed in fully
//! materialized, results are handed back fully materialized, and nothing is
//! shared between calls except the read-only [`ProfileTable`].
//!
//! # Example
//!
//! ```
//! use wavemend_core::{parse, restore, ContainerKind, PcmFormat, ProfileTable, RestoreParameters};
//!
//! let mut damaged = vec![0u8; 44];
//! damaged.extend(std::iter::repeat(0x7f).take(1000));
//!
//! let params = RestoreParameters::new(ContainerKind::Wave, PcmFormat::new(44100, 16, 1));
//! let restored = restore(&damaged, &params, &ProfileTable::builtin()).unwrap();
//! assert_eq!(restored.bytes.len(), 1044);
//!
//! let report = parse(&restored.bytes);
//! assert!(!report.has_errors());
//! ```

pub mod container;
pub mod error;
pub mod float80;
pub mod format;
pub mod offsets;
pub mod parser;
pub mod profile;
pub mod reader;
pub mod report;
pub mod restore;
pub mod synth;

pub use container::{ContainerKind, Endianness};
pub use error::{ConfigError, ReadError, RestoreError};
pub use format::{FormatInfo, PcmFormat};
pub use offsets::{OffsetResolver, ResolvedRange};
pub use parser::{parse, parse_as, ContainerParser};
pub use profile::{Application, ApplicationProfile, EndOffsetPolicy, ProfileTable};
pub use reader::ChunkReader;
pub use report::{Diagnostic, HeaderError, HeaderNote, HeaderReport, HeaderWarning, Severity};
pub use restore::{restore, RestoreParameters, RestoredFile};
pub use synth::{synthesize, write_header};
