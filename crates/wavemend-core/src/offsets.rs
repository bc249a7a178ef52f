//! Resolution of the payload byte range inside a damaged file.

use serde::Serialize;
use tracing::debug;

use crate::container::ContainerKind;
use crate::error::RestoreError;
use crate::profile::{Application, ProfileTable};

/// Half-open byte range `[start, end)` of the payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ResolvedRange {
    pub start: u64,
    pub end: u64,
}

impl ResolvedRange {
    pub fn len(&self) -> u64 {
        self.end - self.start
    }

    /// Never true for a range returned by [`OffsetResolver::resolve`].
    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }
}

/// Turns explicit offsets and profile defaults into a concrete range.
#[derive(Debug, Clone, Copy)]
pub struct OffsetResolver<'a> {
    profiles: &'a ProfileTable,
}

impl<'a> OffsetResolver<'a> {
    pub fn new(profiles: &'a ProfileTable) -> Self {
        Self { profiles }
    }

    /// Resolves the payload range for a file of `file_size` bytes.
    ///
    /// Negative explicit offsets count back from the end of the file. Without
    /// an explicit start the application's default for `kind` is used; without
    /// an explicit end the application's end policy applies.
    pub fn resolve(
        &self,
        kind: ContainerKind,
        application: Application,
        explicit_start: Option<i64>,
        explicit_end: Option<i64>,
        file_size: u64,
    ) -> Result<ResolvedRange, RestoreError> {
        let policy = self.profiles.get(application).end_offset_policy;
        self.resolve_with(
            kind,
            application,
            explicit_start,
            explicit_end,
            file_size,
            policy.end_for(file_size),
        )
    }

    /// Like [`Self::resolve`], but the end policy may look at the contents of
    /// `source` (a trailing ID3v1 tag is only dropped when present).
    pub fn resolve_in(
        &self,
        kind: ContainerKind,
        application: Application,
        explicit_start: Option<i64>,
        explicit_end: Option<i64>,
        source: &[u8],
    ) -> Result<ResolvedRange, RestoreError> {
        let policy = self.profiles.get(application).end_offset_policy;
        self.resolve_with(
            kind,
            application,
            explicit_start,
            explicit_end,
            source.len() as u64,
            policy.end_in(source),
        )
    }

    fn resolve_with(
        &self,
        kind: ContainerKind,
        application: Application,
        explicit_start: Option<i64>,
        explicit_end: Option<i64>,
        file_size: u64,
        default_end: i64,
    ) -> Result<ResolvedRange, RestoreError> {
        let profile = self.profiles.get(application);
        let size = file_size as i64;

        let start = match explicit_start {
            Some(offset) => end_relative(offset, size),
            None => profile.default_offset(kind) as i64,
        };
        let end = match explicit_end {
            Some(offset) => end_relative(offset, size),
            None => default_end,
        };
        debug!(%kind, %application, start, end, file_size, "resolved payload range");

        if start < 0 || start >= end || end > size {
            return Err(RestoreError::InvalidRange {
                start,
                end,
                file_size,
            });
        }
        Ok(ResolvedRange {
            start: start as u64,
            end: end as u64,
        })
    }
}

fn end_relative(offset: i64, file_size: i64) -> i64 {
    if offset < 0 {
        file_size.saturating_add(offset)
    } else {
        offset
    }
}

/// Resolves against a profile table without keeping a resolver around.
pub fn resolve(
    profiles: &ProfileTable,
    kind: ContainerKind,
    application: Application,
    explicit_start: Option<i64>,
    explicit_end: Option<i64>,
    file_size: u64,
) -> Result<ResolvedRange, RestoreError> {
    OffsetResolver::new(profiles).resolve(kind, application, explicit_start, explicit_end, file_size)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn wave(start: Option<i64>, end: Option<i64>, size: u64) -> Result<ResolvedRange, RestoreError> {
        resolve(
            &ProfileTable::builtin(),
            ContainerKind::Wave,
            Application::Logic,
            start,
            end,
            size,
        )
    }

    #[test]
    fn negative_start_is_end_relative() {
        assert_eq!(
            wave(Some(-100), None, 1000).unwrap(),
            ResolvedRange { start: 900, end: 1000 }
        );
    }

    #[test]
    fn negative_end_is_end_relative() {
        let range = wave(Some(50), Some(-10), 1000).unwrap();
        assert_eq!(range, ResolvedRange { start: 50, end: 990 });
        assert_eq!(range.len(), 940);
    }

    #[test]
    fn profile_defaults() {
        let table = ProfileTable::builtin();
        let resolver = OffsetResolver::new(&table);

        let range = resolver
            .resolve(ContainerKind::Wave, Application::Logic, None, None, 1044)
            .unwrap();
        assert_eq!(range, ResolvedRange { start: 44, end: 1044 });

        let range = resolver
            .resolve(ContainerKind::Aiff, Application::Logic, None, None, 2000)
            .unwrap();
        assert_eq!(range.start, 512);

        let range = resolver
            .resolve(ContainerKind::Aiff, Application::Live, None, None, 2000)
            .unwrap();
        assert_eq!(range.start, 54);

        // Without the contents there is no tag to drop.
        let range = resolver
            .resolve(ContainerKind::Wave, Application::Djvu, None, None, 2000)
            .unwrap();
        assert_eq!(range, ResolvedRange { start: 44, end: 2000 });
    }

    #[test]
    fn djvu_drops_id3v1_tag_only_when_present() {
        let table = ProfileTable::builtin();
        let resolver = OffsetResolver::new(&table);

        let mut source = vec![0u8; 1872];
        source.extend_from_slice(b"TAG");
        source.resize(2000, 0);
        let range = resolver
            .resolve_in(ContainerKind::Wave, Application::Djvu, None, None, &source)
            .unwrap();
        assert_eq!(range, ResolvedRange { start: 44, end: 1872 });

        let untagged = vec![0u8; 2000];
        let range = resolver
            .resolve_in(ContainerKind::Wave, Application::Djvu, None, None, &untagged)
            .unwrap();
        assert_eq!(range, ResolvedRange { start: 44, end: 2000 });

        let range = resolver
            .resolve_in(ContainerKind::Wave, Application::Logic, None, None, &source)
            .unwrap();
        assert_eq!(range.end, 2000);
    }

    #[test]
    fn explicit_end_overrides_trim() {
        let range = resolve(
            &ProfileTable::builtin(),
            ContainerKind::Wave,
            Application::Djvu,
            None,
            Some(-1),
            2000,
        )
        .unwrap();
        assert_eq!(range.end, 1999);
    }

    #[test]
    fn empty_range_is_rejected() {
        let err = wave(None, None, 44).unwrap_err();
        assert_eq!(
            err,
            RestoreError::InvalidRange {
                start: 44,
                end: 44,
                file_size: 44
            }
        );
        assert!(err
            .to_string()
            .starts_with("invalid offsets producing empty or inverted payload range"));
    }

    #[test]
    fn inverted_and_out_of_bounds_ranges() {
        assert!(wave(Some(500), Some(100), 1000).is_err());
        assert!(wave(Some(0), Some(1001), 1000).is_err());
        assert!(wave(Some(-2000), None, 1000).is_err());
        assert!(wave(Some(1000), None, 1000).is_err());
        assert!(wave(None, None, 0).is_err());
    }

    #[test]
    fn whole_file() {
        assert_eq!(
            wave(Some(0), None, 10).unwrap(),
            ResolvedRange { start: 0, end: 10 }
        );
    }

    proptest! {
        #[test]
        fn resolved_range_is_within_file(
            start in proptest::option::of(-5000i64..5000),
            end in proptest::option::of(-5000i64..5000),
            size in 0u64..5000,
        ) {
            if let Ok(range) = wave(start, end, size) {
                prop_assert!(range.start < range.end);
                prop_assert!(range.end <= size);
                prop_assert_eq!(range.len(), range.end - range.start);
            }
        }

        #[test]
        fn end_relative_matches_absolute(offset in 1i64..1000, size in 1000u64..4000) {
            let relative = wave(Some(-offset), None, size).unwrap();
            let absolute = wave(Some(size as i64 - offset), None, size).unwrap();
            prop_assert_eq!(relative, absolute);
        }
    }
}
