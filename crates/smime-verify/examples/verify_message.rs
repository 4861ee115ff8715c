//! Example: Verify an S/MIME signed message
//!
//! Usage:
//!   cargo run --example verify_message -- <message.eml> --trust <anchor.der> [--text]
//!
//! `--trust` may be repeated.
//!
//! Exits with status 0 if the message verifies and 1 otherwise.

use smime_verify::mime::Canonicalization;
use smime_verify::trust::TrustStore;
use smime_verify::{Verifier, VerifyOptions};
use std::env;
use std::fs;
use std::process;

fn main() {
    let args: Vec<String> = env::args().collect();

    let mut message_path = None;
    let mut trust_paths = Vec::new();
    let mut canonicalization = Canonicalization::Exact;

    let mut rest = args.iter().skip(1);
    while let Some(arg) = rest.next() {
        match arg.as_str() {
            "--trust" => match rest.next() {
                Some(path) => trust_paths.push(path.clone()),
                None => usage(&args[0]),
            },
            "--text" => canonicalization = Canonicalization::Text,
            _ if message_path.is_none() => message_path = Some(arg.clone()),
            _ => usage(&args[0]),
        }
    }

    let Some(message_path) = message_path else {
        usage(&args[0]);
    };

    // Read message
    let raw = match fs::read(&message_path) {
        Ok(data) => data,
        Err(e) => {
            eprintln!("Error reading message {}: {}", message_path, e);
            process::exit(1);
        }
    };

    // Build trust store
    let mut store = TrustStore::new();
    for path in &trust_paths {
        let der = match fs::read(path) {
            Ok(data) => data,
            Err(e) => {
                eprintln!("Error reading certificate {}: {}", path, e);
                process::exit(1);
            }
        };
        if let Err(e) = store.add_der(&der) {
            eprintln!("Error loading certificate {}: {}", path, e);
            process::exit(1);
        }
    }
    println!("Trust store: {} certificate(s)", store.len());

    let options = VerifyOptions::default().with_canonicalization(canonicalization);
    let verifier = Verifier::with_options(store, options);

    match verifier.verify_message(&raw) {
        Ok(verdict) if verdict.is_verified() => {
            println!("Verification: SUCCESS");
        }
        Ok(verdict) => {
            eprintln!("Verification: FAILED - {}", verdict);
            process::exit(1);
        }
        Err(e) => {
            eprintln!("Verification: ERROR - {}", e);
            process::exit(1);
        }
    }
}

fn usage(program: &str) -> ! {
    eprintln!(
        "Usage: {} <message.eml> --trust <anchor.der> [--trust <anchor.der>...] [--text]",
        program
    );
    process::exit(1);
}
