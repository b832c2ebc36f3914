//! End-to-end batch tests.
//!
//! These tests build whole working directories of report containers and run
//! the full pipeline: discovery, backup, extraction, integrity stripping,
//! layout patching, and repacking, across both output modes and across
//! failure of individual containers.

mod common;

use std::fs;
use std::path::Path;

use zip::CompressionMethod;

use pbixroll::layout::decode_utf16le;
use pbixroll::{ContainerRef, NoProgress, OutputMode, RollOptions, Workspace};

fn options(year: i32, month: u32) -> RollOptions {
    RollOptions {
        period: Some((year, month)),
        ..RollOptions::default()
    }
}

fn patched_layout(container: &Path) -> String {
    let entries = common::read_entries(container);
    let (data, _) = common::entry_by_name(&entries, "Report/Layout");
    decode_utf16le(&data, container).unwrap()
}

#[test]
fn test_end_to_end_results_mode() {
    let dir = tempfile::tempdir().unwrap();
    let root = dir.path();
    fs::create_dir_all(root.join("Sales")).unwrap();
    common::write_report_container(
        &root.join("Sales/monthly.pbix"),
        &common::layout_text("Jan", 1, 2023),
        true,
    );

    let ws = Workspace::open(root).unwrap();
    let report = pbixroll::run(&ws, &options(2024, 4), &NoProgress).unwrap();
    assert_eq!(report.succeeded(), 1);
    assert_eq!(report.failed(), 0);
    assert_eq!(report.replacements(), 3);

    let output = root.join("#RESULTS/Sales/monthly.pbix");
    assert!(output.is_file());

    // Period literals rolled forward, label text untouched.
    let layout = patched_layout(&output);
    assert_eq!(layout, common::layout_text("Apr", 2, 2024));
    assert!(layout.contains("Jan overview"));

    // Integrity artifact and its manifest declaration are gone.
    let entries = common::read_entries(&output);
    assert!(!entries.iter().any(|(n, _, _)| n == "SecurityBindings"));
    let (manifest, _) = common::entry_by_name(&entries, "[Content_Types].xml");
    let manifest = String::from_utf8(manifest).unwrap();
    assert!(!manifest.contains("SecurityBindings"));
    assert_eq!(manifest, common::manifest_xml(false));

    // Compression policy holds in the output archive.
    let (_, method) = common::entry_by_name(&entries, "DataModel");
    assert_eq!(method, CompressionMethod::Stored);

    // The original is untouched in results mode.
    let original = common::read_entries(&root.join("Sales/monthly.pbix"));
    assert!(original.iter().any(|(n, _, _)| n == "SecurityBindings"));

    // Scratch tree is cleaned up after success.
    assert!(!root.join("#TEMP/Sales/monthly").exists());
}

#[test]
fn test_missing_integrity_artifact_is_tolerated() {
    let dir = tempfile::tempdir().unwrap();
    let root = dir.path();
    common::write_report_container(
        &root.join("plain.pbix"),
        &common::layout_text("Mar", 1, 2024),
        false,
    );

    let ws = Workspace::open(root).unwrap();
    let report = pbixroll::run(&ws, &options(2024, 4), &NoProgress).unwrap();
    assert_eq!(report.succeeded(), 1);
    assert_eq!(report.failed(), 0);
}

#[test]
fn test_one_bad_container_does_not_stop_the_batch() {
    let dir = tempfile::tempdir().unwrap();
    let root = dir.path();
    fs::write(root.join("broken.pbix"), b"not a zip archive").unwrap();
    common::write_report_container(
        &root.join("good.pbix"),
        &common::layout_text("Jan", 1, 2023),
        true,
    );

    let ws = Workspace::open(root).unwrap();
    let report = pbixroll::run(&ws, &options(2024, 4), &NoProgress).unwrap();
    assert_eq!(report.succeeded(), 1);
    assert_eq!(report.failed(), 1);

    let failed = report
        .outcomes
        .iter()
        .find(|o| o.container.file_name == "broken.pbix")
        .unwrap();
    assert!(matches!(
        failed.result,
        Err(pbixroll::Error::Archive(_))
    ));
    assert!(root.join("#RESULTS/good.pbix").is_file());
}

#[test]
fn test_in_place_mode_backs_up_then_overwrites() {
    let dir = tempfile::tempdir().unwrap();
    let root = dir.path();
    let container = root.join("inplace.pbix");
    common::write_report_container(&container, &common::layout_text("Jan", 1, 2023), true);
    let original_bytes = fs::read(&container).unwrap();

    let ws = Workspace::open(root).unwrap();
    let opts = RollOptions {
        period: Some((2024, 4)),
        output: OutputMode::InPlace,
        backup: false, // in-place forces backup regardless
        ..RollOptions::default()
    };
    let report = pbixroll::run(&ws, &opts, &NoProgress).unwrap();
    assert_eq!(report.succeeded(), 1);

    // The original path now holds the patched container.
    assert_eq!(patched_layout(&container), common::layout_text("Apr", 2, 2024));

    // A backup with the original bytes exists under the stamped tree.
    let backup_root = root.join("#BACKUP");
    let stamp_dir = fs::read_dir(&backup_root).unwrap().next().unwrap().unwrap();
    let backup = stamp_dir.path().join("inplace.pbix");
    assert_eq!(fs::read(backup).unwrap(), original_bytes);
}

#[test]
fn test_explicit_target_processes_single_container() {
    let dir = tempfile::tempdir().unwrap();
    let root = dir.path();
    fs::create_dir_all(root.join("Sales")).unwrap();
    fs::create_dir_all(root.join("Finance")).unwrap();
    common::write_report_container(
        &root.join("Sales/monthly.pbix"),
        &common::layout_text("Jan", 1, 2023),
        true,
    );
    common::write_report_container(
        &root.join("Finance/monthly.pbix"),
        &common::layout_text("Jan", 1, 2023),
        true,
    );

    let ws = Workspace::open(root).unwrap();
    let opts = RollOptions {
        period: Some((2024, 4)),
        target: Some(ContainerRef::new("Sales", "monthly.pbix")),
        ..RollOptions::default()
    };
    let report = pbixroll::run(&ws, &opts, &NoProgress).unwrap();
    assert_eq!(report.outcomes.len(), 1);
    assert!(root.join("#RESULTS/Sales/monthly.pbix").is_file());
    assert!(!root.join("#RESULTS/Finance/monthly.pbix").exists());
}

#[test]
fn test_results_tree_is_not_rediscovered() {
    let dir = tempfile::tempdir().unwrap();
    let root = dir.path();
    common::write_report_container(
        &root.join("report.pbix"),
        &common::layout_text("Jan", 1, 2023),
        true,
    );

    let ws = Workspace::open(root).unwrap();
    pbixroll::run(&ws, &options(2024, 4), &NoProgress).unwrap();
    // A second run over the same root must see one container, not two:
    // the repacked copy under #RESULTS is skipped by discovery.
    let report = pbixroll::run(&ws, &options(2024, 4), &NoProgress).unwrap();
    assert_eq!(report.outcomes.len(), 1);
}

#[test]
fn test_missing_explicit_container_fails_that_outcome() {
    let dir = tempfile::tempdir().unwrap();
    let ws = Workspace::open(dir.path()).unwrap();
    let opts = RollOptions {
        period: Some((2024, 4)),
        target: Some(ContainerRef::new("Sales", "absent.pbix")),
        ..RollOptions::default()
    };
    let report = pbixroll::run(&ws, &opts, &NoProgress).unwrap();
    assert_eq!(report.failed(), 1);
    assert!(matches!(
        report.outcomes[0].result,
        Err(pbixroll::Error::ContainerMissing(_))
    ));
}
