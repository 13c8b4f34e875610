//! Container path decomposition and document-class tests.

/// Marker separating an archive name from the path inside it.
pub const ARCHIVE_MARKER: &str = "//";

/// Structural tokens of one record's container path. Missing pieces are
/// empty strings, never errors — a malformed path just routes the record
/// into the no-folder or no-archive handling.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContainerPath {
    /// Archive (e.g. ZIP) name, empty when the record is outside any archive.
    pub archive: String,
    /// Immediate folder inside the archive, empty at archive root.
    pub folder: String,
    /// Bare filename, the final path segment.
    pub filename: String,
}

impl ContainerPath {
    /// Decompose a raw path. Everything before `//` is the archive; the
    /// remainder splits on `/`, taking the second segment as the folder when
    /// more than one segment exists and the last segment as the filename.
    pub fn parse(raw: &str) -> Self {
        let Some((archive, inside)) = raw.split_once(ARCHIVE_MARKER) else {
            return Self {
                archive: String::new(),
                folder: String::new(),
                filename: raw.rsplit('/').next().unwrap_or("").to_string(),
            };
        };

        let segments: Vec<&str> = inside.split('/').collect();
        let folder = if segments.len() > 1 {
            segments.get(1).copied().unwrap_or("")
        } else {
            ""
        };
        let filename = segments.last().copied().unwrap_or("");

        Self {
            archive: archive.to_string(),
            folder: folder.to_string(),
            filename: filename.to_string(),
        }
    }

    /// Whether the record lives inside an archive at all. Records outside
    /// any archive are excluded from sequence allocation.
    pub fn in_archive(&self) -> bool {
        !self.archive.is_empty()
    }
}

/// Document-type precedence bucket. `Primary` documents anchor their group's
/// family; `Secondary` documents attach to it; everything else tags along.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum DocClass {
    /// Matches the primary filename prefix; allocated first, family root.
    Primary,
    /// Matches the secondary filename prefix; allocated second, attached
    /// to the group's root.
    Secondary,
    /// Matches neither prefix; allocated last, outside the family.
    Other,
}

impl DocClass {
    /// Classify a bare filename by case-sensitive prefix test. The primary
    /// prefix is tested first.
    pub fn classify(filename: &str, primary_prefix: &str, secondary_prefix: &str) -> Self {
        if filename.starts_with(primary_prefix) {
            DocClass::Primary
        } else if filename.starts_with(secondary_prefix) {
            DocClass::Secondary
        } else {
            DocClass::Other
        }
    }
}
