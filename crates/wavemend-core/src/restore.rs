//! Header + payload splicing for one file.

use serde::Serialize;
use tracing::debug;

use crate::container::ContainerKind;
use crate::error::RestoreError;
use crate::format::PcmFormat;
use crate::offsets::{OffsetResolver, ResolvedRange};
use crate::profile::{Application, ProfileTable};
use crate::synth::{max_payload_len, write_header};

/// Everything needed to rebuild one file's header.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RestoreParameters {
    /// Container to synthesize.
    pub container: ContainerKind,
    /// Container the damaged file was written as, which decides the default
    /// payload start. Same as `container` when `None`.
    pub source_container: Option<ContainerKind>,
    pub format: PcmFormat,
    pub application: Application,
    /// Payload start; negative counts from the end of the file.
    pub explicit_start_offset: Option<i64>,
    /// Payload end; negative counts from the end of the file.
    pub explicit_end_offset: Option<i64>,
}

impl RestoreParameters {
    pub fn new(container: ContainerKind, format: PcmFormat) -> Self {
        Self {
            container,
            source_container: None,
            format,
            application: Application::default(),
            explicit_start_offset: None,
            explicit_end_offset: None,
        }
    }

    pub fn with_source_container(mut self, kind: ContainerKind) -> Self {
        self.source_container = Some(kind);
        self
    }

    pub fn with_application(mut self, application: Application) -> Self {
        self.application = application;
        self
    }

    pub fn with_start_offset(mut self, offset: Option<i64>) -> Self {
        self.explicit_start_offset = offset;
        self
    }

    pub fn with_end_offset(mut self, offset: Option<i64>) -> Self {
        self.explicit_end_offset = offset;
        self
    }
}

/// A rebuilt file, ready to be written.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RestoredFile {
    #[serde(skip)]
    pub bytes: Vec<u8>,
    /// Payload range in the source buffer.
    pub range: ResolvedRange,
    pub header_len: usize,
    /// BLAKE3 hex digest of the payload.
    pub payload_hash: String,
}

impl RestoredFile {
    /// The payload portion of [`Self::bytes`].
    pub fn payload(&self) -> &[u8] {
        &self.bytes[self.header_len..]
    }
}

/// Rebuilds `source` with a fresh header in front of its payload.
///
/// The source buffer is not modified. Fails when the parameters are invalid,
/// the resolved range is empty or inverted, or the payload does not fit the
/// header's size fields.
pub fn restore(
    source: &[u8],
    params: &RestoreParameters,
    profiles: &ProfileTable,
) -> Result<RestoredFile, RestoreError> {
    params.format.validate()?;

    let kind = params.container;
    let range = OffsetResolver::new(profiles).resolve_in(
        params.source_container.unwrap_or(kind),
        params.application,
        params.explicit_start_offset,
        params.explicit_end_offset,
        source,
    )?;

    if range.len() > max_payload_len(kind) {
        return Err(RestoreError::PayloadTooLarge {
            len: range.len(),
            kind,
        });
    }
    let payload = &source[range.start as usize..range.end as usize];
    // Checked against the size limit above.
    let payload_len = payload.len() as u32;

    let mut bytes = Vec::with_capacity(kind.header_len() + payload.len());
    write_header(&mut bytes, kind, &params.format, payload_len)
        .expect("writing to Vec should not fail");
    let header_len = bytes.len();
    bytes.extend_from_slice(payload);

    let payload_hash = blake3::hash(payload).to_hex().to_string();
    debug!(%kind, start = range.start, end = range.end, header_len, "restored");

    Ok(RestoredFile {
        bytes,
        range,
        header_len,
        payload_hash,
    })
}
