//! Layout resource patching.
//!
//! The layout resource lives at a fixed path inside the container
//! (`Report/Layout`) and is encoded as UTF-16LE. The encoding must be
//! preserved exactly on write-back, otherwise the authoring application
//! cannot parse the file at all. The resource is rewritten in full; all other
//! files in the scratch tree pass through the pipeline untouched.

use std::borrow::Cow;
use std::fs;
use std::path::{Path, PathBuf};

use log::debug;

use crate::rules::RuleSet;
use crate::{Error, Result};

/// Subdirectory of the container holding the layout resource.
pub const LAYOUT_SUBDIR: &str = "Report";

/// File name of the layout resource.
pub const LAYOUT_FILE: &str = "Layout";

/// Result of patching one layout resource.
#[must_use = "patch summary should be checked to see whether anything was replaced"]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PatchSummary {
    /// Total number of literal occurrences replaced.
    pub replacements: usize,
    /// Number of rules that matched at least once.
    pub rules_matched: usize,
}

/// Decodes a UTF-16LE byte buffer.
///
/// A BOM, when present, decodes to U+FEFF and survives the round trip.
pub fn decode_utf16le(bytes: &[u8], path: &Path) -> Result<String> {
    if bytes.len() % 2 != 0 {
        return Err(Error::Encoding {
            path: path.to_path_buf(),
            reason: format!("odd byte count ({})", bytes.len()),
        });
    }
    let units: Vec<u16> = bytes
        .chunks_exact(2)
        .map(|pair| u16::from_le_bytes([pair[0], pair[1]]))
        .collect();
    String::from_utf16(&units).map_err(|_| Error::Encoding {
        path: path.to_path_buf(),
        reason: "invalid UTF-16 code unit sequence".to_string(),
    })
}

/// Encodes text as UTF-16LE.
pub fn encode_utf16le(text: &str) -> Vec<u8> {
    text.encode_utf16().flat_map(u16::to_le_bytes).collect()
}

/// Applies every rule in order to the given text.
///
/// Returns the patched text and a summary of what matched.
pub fn apply_rules<'t>(text: &'t str, rules: &RuleSet) -> (Cow<'t, str>, PatchSummary) {
    let mut current = Cow::Borrowed(text);
    let mut summary = PatchSummary::default();

    for rule in rules.rules() {
        let (patched, matches) = rule.apply(&current);
        if matches > 0 {
            debug!("rule {}: {} replacement(s)", rule.label(), matches);
            summary.replacements += matches;
            summary.rules_matched += 1;
            current = Cow::Owned(patched.into_owned());
        }
    }

    (current, summary)
}

/// Patches the layout resource under `scratch` in place.
///
/// Loads `Report/Layout` as UTF-16LE, applies the rule set, and writes the
/// result back with the same encoding, fully replacing the file.
pub fn patch_layout(scratch: &Path, rules: &RuleSet) -> Result<PatchSummary> {
    let path = layout_path(scratch);
    if !path.is_file() {
        return Err(Error::LayoutMissing(path));
    }

    let raw = fs::read(&path)?;
    let text = decode_utf16le(&raw, &path)?;

    let (patched, summary) = apply_rules(&text, rules);
    fs::write(&path, encode_utf16le(&patched))?;

    debug!(
        "patched {}: {} replacement(s) across {} rule(s)",
        path.display(),
        summary.replacements,
        summary.rules_matched
    );
    Ok(summary)
}

/// The layout resource path inside a scratch tree.
pub fn layout_path(scratch: &Path) -> PathBuf {
    scratch.join(LAYOUT_SUBDIR).join(LAYOUT_FILE)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_utf16le_round_trip() {
        let text = "slicer 'Jan' 2023L 季度";
        let bytes = encode_utf16le(text);
        assert_eq!(decode_utf16le(&bytes, Path::new("Layout")).unwrap(), text);
    }

    #[test]
    fn test_bom_survives_round_trip() {
        let mut bytes = vec![0xFF, 0xFE];
        bytes.extend(encode_utf16le("data"));
        let decoded = decode_utf16le(&bytes, Path::new("Layout")).unwrap();
        assert!(decoded.starts_with('\u{FEFF}'));
        assert_eq!(encode_utf16le(&decoded), bytes);
    }

    #[test]
    fn test_odd_byte_count_is_an_encoding_error() {
        let err = decode_utf16le(&[0x41, 0x00, 0x42], Path::new("Layout")).unwrap_err();
        assert!(matches!(err, Error::Encoding { .. }));
    }

    #[test]
    fn test_unpaired_surrogate_is_an_encoding_error() {
        // Lone high surrogate 0xD800.
        let err = decode_utf16le(&[0x00, 0xD8], Path::new("Layout")).unwrap_err();
        assert!(matches!(err, Error::Encoding { .. }));
    }
}
