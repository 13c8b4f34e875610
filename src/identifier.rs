//! The structured Bates identifier: `PREFIX.BOX.FOLDER.PAGE`.

use std::fmt;

/// Digits in the zero-padded page field.
pub const PAGE_WIDTH: usize = 4;

/// Minimum digits in the zero-padded folder field.
pub const FOLDER_WIDTH: usize = 3;

/// Literal appended to the page field when a run asks for a suffix.
pub const PAGE_SUFFIX: &str = "_0001";

/// A parsed four-part Bates number. The prefix and box fields are free text;
/// the folder segment is numeric and carries the digit width it was written
/// with, so attachment derivation preserves the host's padding. The page
/// field is kept verbatim (digits, possibly with a trailing literal suffix)
/// because derivation copies it unchanged.
///
/// Formatting and re-parsing a `BatesNumber` reproduces the same fields.
/// Formatted values order lexicographically, which is the production order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BatesNumber {
    /// Free-text production prefix (e.g. `ABC`).
    pub prefix: String,
    /// Free-text box token.
    pub box_id: String,
    /// Numeric folder segment.
    pub folder: u32,
    /// Digit width the folder segment was written with, at least 3.
    pub folder_width: usize,
    /// Page token, preserved verbatim.
    pub page: String,
}

impl BatesNumber {
    /// Parse a dotted four-part value. The folder part must be all digits;
    /// anything else, or a wrong part count, is `None` — callers attach the
    /// row context to the resulting diagnostic.
    pub fn parse(value: &str) -> Option<Self> {
        let parts: Vec<&str> = value.split('.').collect();
        let [prefix, box_id, folder_str, page] = parts.as_slice() else {
            return None;
        };
        if folder_str.is_empty() || !folder_str.bytes().all(|b| b.is_ascii_digit()) {
            return None;
        }
        let folder: u32 = folder_str.parse().ok()?;

        Some(Self {
            prefix: (*prefix).to_string(),
            box_id: (*box_id).to_string(),
            folder,
            folder_width: folder_str.len().max(FOLDER_WIDTH),
            page: (*page).to_string(),
        })
    }

    /// A copy of this number with a different folder segment. Prefix, box,
    /// page, and folder width all carry over.
    pub fn with_folder(&self, folder: u32) -> Self {
        Self {
            folder,
            ..self.clone()
        }
    }
}

impl fmt::Display for BatesNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}.{}.{:0width$}.{}",
            self.prefix,
            self.box_id,
            self.folder,
            self.page,
            width = self.folder_width
        )
    }
}

/// Render a freshly allocated Bates number from run configuration. The
/// folder token is taken verbatim — during allocation it is a constant the
/// operator supplies, not a counter.
pub fn compose(
    prefix: &str,
    box_id: &str,
    folder_token: &str,
    page: u32,
    include_suffix: bool,
) -> String {
    let mut bates = format!("{prefix}.{box_id}.{folder_token}.{page:04}");
    if include_suffix {
        bates.push_str(PAGE_SUFFIX);
    }
    bates
}
