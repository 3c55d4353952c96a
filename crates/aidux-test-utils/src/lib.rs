//! Test utilities for the AiDuxCare integrity crates.

use std::path::PathBuf;
use tempfile::TempDir;

/// Creates a temporary directory that is cleaned up on drop.
pub fn temp_dir() -> TempDir {
    tempfile::tempdir().expect("Failed to create temp dir")
}

/// A fresh SQLite database path inside a temporary directory.
///
/// Keep the returned `TempDir` alive for as long as the database is used.
pub fn temp_database() -> (TempDir, String) {
    let dir = temp_dir();
    let path = dir.path().join("integrity.db").to_string_lossy().into_owned();
    (dir, path)
}

/// Creates a temporary file with given bytes.
pub fn temp_file(content: &[u8]) -> (TempDir, PathBuf) {
    let dir = temp_dir();
    let path = dir.path().join("document.pdf");
    std::fs::write(&path, content).expect("Failed to write temp file");
    (dir, path)
}

/// Bytes shaped like a small exported visit report.
pub fn sample_document(visit_id: &str) -> Vec<u8> {
    format!(
        "%PDF-1.7\n1 0 obj << /Type /Catalog >> endobj\n\
         % INFORME DE VISITA CLINICA\n% ID Visita: {visit_id}\n\
         % Motivo: Dolor lumbar\n%%EOF\n"
    )
    .into_bytes()
}

/// Copy of `bytes` with a single byte flipped at `index` (clamped to the last byte).
pub fn tamper(bytes: &[u8], index: usize) -> Vec<u8> {
    let mut altered = bytes.to_vec();
    if let Some(last) = altered.len().checked_sub(1) {
        altered[index.min(last)] ^= 0x01;
    } else {
        altered.push(0x01);
    }
    altered
}

/// Assert that a Result is Ok and return the value.
#[macro_export]
macro_rules! assert_ok {
    ($expr:expr) => {
        match $expr {
            Ok(v) => v,
            Err(e) => panic!("Expected Ok, got Err: {:?}", e),
        }
    };
}

/// Assert that a Result is Err and return the error.
#[macro_export]
macro_rules! assert_err {
    ($expr:expr) => {
        match $expr {
            Ok(v) => panic!("Expected Err, got Ok: {:?}", v),
            Err(e) => e,
        }
    };
}
