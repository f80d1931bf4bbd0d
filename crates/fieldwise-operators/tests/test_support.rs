//! Shared test support utilities for integration tests

#![allow(dead_code)]

use fieldwise_core::{Described, TypeDescriptor};
use serde::{Deserialize, Serialize};
use std::io::Write;
use tempfile::NamedTempFile;
use tracing_subscriber::EnvFilter;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Customer {
    pub name: String,
    pub country: String,
    pub card_number: String,
    pub cvv: Option<u16>,
    pub notes: Vec<String>,
    pub credit_limit: f64,
}

impl Described for Customer {
    fn describe() -> TypeDescriptor {
        TypeDescriptor::record::<Self>()
            .field::<String>("name")
            .field::<String>("country")
            .field::<String>("card_number")
            .field::<Option<u16>>("cvv")
            .field::<Vec<String>>("notes")
            .field::<f64>("credit_limit")
            .build()
    }
}

pub fn customer() -> Customer {
    Customer {
        name: "  Grace Hopper ".to_string(),
        country: "us".to_string(),
        card_number: "4111111111111111".to_string(),
        cvv: Some(123),
        notes: vec!["VIP".to_string(), String::new()],
        credit_limit: 1000.0,
    }
}

/// Write `content` to a temporary file with the given extension
pub fn temp_file(extension: &str, content: &str) -> NamedTempFile {
    let mut file = tempfile::Builder::new()
        .suffix(&format!(".{extension}"))
        .tempfile()
        .expect("create temp file");
    file.write_all(content.as_bytes()).expect("write temp file");
    file
}

/// Install a test subscriber honouring `RUST_LOG`; repeated calls are no-ops
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}
