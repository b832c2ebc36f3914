//! Integrity-checksum stripping.
//!
//! The authoring application records a checksum over the container payload in
//! a root-level `SecurityBindings` part. Once the layout is edited outside
//! the application, that checksum no longer matches and the file is rejected
//! as tampered. Removing the part *and* its content-type declaration makes
//! the container look like one that never carried integrity protection,
//! which the application accepts.
//!
//! The manifest edit is a literal substring removal, not an XML rewrite: the
//! byte layout of every other manifest entry must be preserved unchanged.

use std::fs;
use std::path::Path;

use log::debug;

use crate::Result;

/// Root-level name of the checksum artifact.
pub const SECURITY_BINDINGS: &str = "SecurityBindings";

/// Root-level name of the part manifest.
pub const CONTENT_TYPES: &str = "[Content_Types].xml";

/// The manifest declaration of the checksum artifact, removed verbatim.
const BINDINGS_OVERRIDE: &str = r#"<Override PartName="/SecurityBindings" ContentType="" />"#;

/// Removes the checksum artifact and its manifest declaration from a scratch
/// tree.
///
/// Returns `true` if the artifact was present. Absence is not an error: some
/// containers never carried integrity protection.
pub fn strip_bindings(scratch: &Path) -> Result<bool> {
    let artifact = scratch.join(SECURITY_BINDINGS);
    let was_present = artifact.is_file();
    if was_present {
        fs::remove_file(&artifact)?;
        debug!("removed {}", artifact.display());
    }

    let manifest = scratch.join(CONTENT_TYPES);
    let xml = fs::read_to_string(&manifest)?;
    if xml.contains(BINDINGS_OVERRIDE) {
        fs::write(&manifest, xml.replace(BINDINGS_OVERRIDE, ""))?;
        debug!("removed {SECURITY_BINDINGS} override from {}", manifest.display());
    }

    Ok(was_present)
}
