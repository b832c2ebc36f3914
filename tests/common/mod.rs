//! Shared test utilities for integration tests.
//!
//! This module provides common helper functions used across multiple test
//! files. Container fixture builders are consolidated here to avoid
//! duplication.
//!
//! Note: `#![allow(dead_code)]` is required because each integration test
//! file compiles as a separate crate and may only use a subset of these
//! helpers.

#![allow(dead_code)]

use std::fs::File;
use std::io::{BufReader, Read, Write};
use std::path::Path;

use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipArchive, ZipWriter};

use pbixroll::layout::encode_utf16le;

/// The manifest declaration the stripper removes.
pub const BINDINGS_OVERRIDE: &str = r#"<Override PartName="/SecurityBindings" ContentType="" />"#;

/// A `[Content_Types].xml` body, optionally declaring the integrity artifact.
pub fn manifest_xml(with_bindings: bool) -> String {
    let bindings = if with_bindings { BINDINGS_OVERRIDE } else { "" };
    format!(
        concat!(
            r#"<?xml version="1.0" encoding="utf-8"?>"#,
            r#"<Types xmlns="http://schemas.openxmlformats.org/package/2006/content-types">"#,
            r#"<Default Extension="json" ContentType="" />"#,
            r#"<Override PartName="/Report/Layout" ContentType="" />"#,
            r#"<Override PartName="/DataModel" ContentType="" />"#,
            "{}",
            r#"</Types>"#,
        ),
        bindings
    )
}

/// Layout text carrying one of each period literal, wrapped in the escaped
/// value envelope as the authoring application writes it.
pub fn layout_text(month: &str, quarter: u32, year: i32) -> String {
    format!(
        concat!(
            r#"{{"sections":[{{"filters":"{{\"Value\":\"'{m}'\"}}","#,
            r#""slicers":"{{\"Value\":\"'Q{q}'\"}},{{\"Value\":\"{y}L\"}}","#,
            r#""label":"{m} overview"}}]}}"#,
        ),
        m = month,
        q = quarter,
        y = year
    )
}

/// Writes a container with explicit entries and per-entry compression.
pub fn write_container(path: &Path, entries: &[(&str, &[u8], CompressionMethod)]) {
    let mut writer = ZipWriter::new(File::create(path).unwrap());
    for (name, data, method) in entries {
        writer
            .start_file(
                *name,
                SimpleFileOptions::default().compression_method(*method),
            )
            .unwrap();
        writer.write_all(data).unwrap();
    }
    writer.finish().unwrap();
}

/// Writes a realistic report container fixture.
///
/// Contains the manifest, a UTF-16LE layout resource, a stored data-model
/// blob, and one static resource that must pass through untouched.
pub fn write_report_container(path: &Path, layout: &str, with_bindings: bool) {
    let manifest = manifest_xml(with_bindings);
    let layout_bytes = encode_utf16le(layout);
    let mut entries: Vec<(&str, &[u8], CompressionMethod)> = vec![
        (
            "[Content_Types].xml",
            manifest.as_bytes(),
            CompressionMethod::Deflated,
        ),
        ("Report/Layout", &layout_bytes, CompressionMethod::Deflated),
        ("DataModel", b"\x00\x01model-blob\xfe\xff", CompressionMethod::Stored),
        (
            "Report/StaticResources/logo.png",
            b"\x89PNG fake image bytes",
            CompressionMethod::Deflated,
        ),
    ];
    if with_bindings {
        entries.push((
            "SecurityBindings",
            b"checksum-blob",
            CompressionMethod::Deflated,
        ));
    }
    write_container(path, &entries);
}

/// Reads back every entry of a container: (name, bytes, compression method).
pub fn read_entries(path: &Path) -> Vec<(String, Vec<u8>, CompressionMethod)> {
    let mut archive = ZipArchive::new(BufReader::new(File::open(path).unwrap())).unwrap();
    let mut entries = Vec::new();
    for index in 0..archive.len() {
        let mut entry = archive.by_index(index).unwrap();
        let mut data = Vec::new();
        entry.read_to_end(&mut data).unwrap();
        entries.push((entry.name().to_string(), data, entry.compression()));
    }
    entries
}

/// Looks up one entry by name.
pub fn entry_by_name(
    entries: &[(String, Vec<u8>, CompressionMethod)],
    name: &str,
) -> (Vec<u8>, CompressionMethod) {
    let (_, data, method) = entries
        .iter()
        .find(|(n, _, _)| n == name)
        .unwrap_or_else(|| panic!("entry {name} not found"));
    (data.clone(), *method)
}
