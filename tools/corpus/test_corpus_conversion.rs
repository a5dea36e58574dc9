#!/usr/bin/env rust-script
//! Test corpus conversion validation
//!
//! Converts one stored mail body and prints the plaintext part. The charset
//! is taken from an optional Content-Type argument or from the document.
//!
//! ```cargo
//! [dependencies]
//! plaintext-converter = { path = "../.." }
//! tracing-subscriber = { version = "0.3", features = ["env-filter"] }
//! ```

use plaintext_converter::PlaintextConverter;
use std::env;
use std::fs;
use std::process;
use tracing_subscriber::EnvFilter;

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let args: Vec<String> = env::args().collect();

    if args.len() < 2 {
        eprintln!("Usage: {} <html_file> [content-type]", args[0]);
        process::exit(1);
    }

    let filename = &args[1];
    let content_type = args.get(2).map(String::as_str);

    let html = match fs::read(filename) {
        Ok(content) => content,
        Err(e) => {
            eprintln!("Error reading file {}: {}", filename, e);
            process::exit(1);
        }
    };

    let converter = PlaintextConverter::new();
    let text = match converter.convert_bytes(&html, content_type, Some(filename)) {
        Ok(text) => text,
        Err(e) => {
            eprintln!("Error converting to plaintext (code {}): {}", e.code(), e);
            process::exit(1);
        }
    };

    println!("{}", text);
}
