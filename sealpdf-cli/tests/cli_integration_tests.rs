//! Integration tests for the sealpdf CLI
//!
//! Runs the built binary against temporary directories and inspects the
//! written files.

use anyhow::Result;
use pretty_assertions::assert_eq;
use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;
use tempfile::{tempdir, TempDir};

fn get_cli_path() -> PathBuf {
    PathBuf::from(env!("CARGO_BIN_EXE_sealpdf"))
}

fn setup_temp_dir() -> TempDir {
    tempdir().expect("Failed to create temp directory")
}

fn run_cli_command(args: &[&str]) -> Result<std::process::Output> {
    let output = Command::new(get_cli_path()).args(args).output()?;
    Ok(output)
}

/// Reads the file after checking it looks like a complete PDF.
fn read_pdf(path: &Path) -> String {
    assert!(path.exists(), "PDF file should exist: {}", path.display());
    let content = fs::read(path).expect("Failed to read PDF file");
    assert!(content.starts_with(b"%PDF-"), "File should start with PDF header");
    assert!(content.ends_with(b"%%EOF\n"), "File should end with %%EOF");
    String::from_utf8_lossy(&content).into_owned()
}

#[test]
fn test_cli_help() {
    let output = run_cli_command(&["--help"]).expect("Failed to run CLI");
    assert!(output.status.success());

    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("create"));
}

#[test]
fn test_cli_create_unencrypted() {
    let temp_dir = setup_temp_dir();
    let output_path = temp_dir.path().join("plain.pdf");

    let output = run_cli_command(&[
        "create",
        "--output",
        output_path.to_str().unwrap(),
        "--title",
        "Quarterly report",
        "--pdf-version",
        "1.4",
    ])
    .expect("Failed to run CLI");

    assert!(output.status.success(), "stderr: {}", String::from_utf8_lossy(&output.stderr));
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("Created PDF"));

    let pdf = read_pdf(&output_path);
    assert!(pdf.starts_with("%PDF-1.4\n"));
    assert!(pdf.contains("/Title (Quarterly report)"));
    assert!(pdf.contains("/Type /Catalog"));
    assert!(!pdf.contains("/Encrypt"));
}

#[test]
fn test_cli_create_encrypted_aes_256() {
    let temp_dir = setup_temp_dir();
    let output_path = temp_dir.path().join("sealed.pdf");

    let output = run_cli_command(&[
        "create",
        "-o",
        output_path.to_str().unwrap(),
        "--title",
        "Secret",
        "--pdf-version",
        "1.7ext3",
        "--user-password",
        "user",
        "--owner-password",
        "owner",
        "--allow-print",
        "high",
    ])
    .expect("Failed to run CLI");
    assert!(output.status.success(), "stderr: {}", String::from_utf8_lossy(&output.stderr));

    let pdf = read_pdf(&output_path);
    assert!(pdf.starts_with("%PDF-1.7\n"));
    assert!(pdf.contains("/Filter /Standard"));
    assert!(pdf.contains("/V 5"));
    assert!(pdf.contains("/R 5"));
    assert!(pdf.contains("/CFM /AESV3"));
    assert!(pdf.contains("/Perms <"));
    assert!(pdf.contains("/ID [<"));
    // Strings are encrypted, so the title is not readable
    assert!(!pdf.contains("(Secret)"));
}

#[test]
fn test_cli_create_rc4_is_reproducible() {
    let temp_dir = setup_temp_dir();
    let first = temp_dir.path().join("first.pdf");
    let second = temp_dir.path().join("second.pdf");

    for path in [&first, &second] {
        let output = run_cli_command(&[
            "create",
            "-o",
            path.to_str().unwrap(),
            "--title",
            "Same",
            "--pdf-version",
            "1.3",
            "--user-password",
            "pw",
        ])
        .expect("Failed to run CLI");
        assert!(output.status.success());
    }

    let first = read_pdf(&first);
    let second = read_pdf(&second);
    assert!(first.contains("/V 1"));
    assert_eq!(first, second);
}

#[test]
fn test_cli_rejects_wide_password_before_aes_256() {
    let temp_dir = setup_temp_dir();
    let output_path = temp_dir.path().join("wide.pdf");

    let output = run_cli_command(&[
        "create",
        "-o",
        output_path.to_str().unwrap(),
        "--pdf-version",
        "1.6",
        "--user-password",
        "密码",
    ])
    .expect("Failed to run CLI");

    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("invalid character"), "stderr: {stderr}");
}

#[test]
fn test_cli_invalid_version() {
    let temp_dir = setup_temp_dir();
    let output_path = temp_dir.path().join("bad.pdf");

    let output = run_cli_command(&[
        "create",
        "-o",
        output_path.to_str().unwrap(),
        "--pdf-version",
        "one.seven",
    ])
    .expect("Failed to run CLI");

    assert!(!output.status.success());
    assert!(!output_path.exists());
}

#[test]
fn test_cli_missing_output() {
    let output = run_cli_command(&["create"]).expect("Failed to run CLI");
    assert!(!output.status.success());
}

#[test]
fn test_cli_uncompressed_content() {
    let temp_dir = setup_temp_dir();
    let output_path = temp_dir.path().join("raw.pdf");

    let output = run_cli_command(&[
        "create",
        "-o",
        output_path.to_str().unwrap(),
        "--no-compress",
    ])
    .expect("Failed to run CLI");
    assert!(output.status.success());

    let pdf = read_pdf(&output_path);
    assert!(pdf.contains("stream\nq\n2 w\n72 72 468 648 re\nS\nQ\n\nendstream"));
    assert!(!pdf.contains("/FlateDecode"));
}
