//! Terminal output for the casper CLI

use casper_lib::{CasperError, RequestSignature, SIGNATURE_PREFIX};
use colored::Colorize;

/// Print a success message
pub fn success(message: &str) {
    println!("{} {}", "✓".green().bold(), message);
}

/// Print an info message
pub fn info(message: &str) {
    println!("{} {}", "ℹ".blue().bold(), message);
}

/// Print a warning message
pub fn warning(message: &str) {
    println!("{} {}", "⚠".yellow().bold(), message);
}

/// Print a section header
pub fn header(text: &str) {
    println!("\n{}", text.bold().underline());
}

/// Print a key-value pair
pub fn key_value(key: &str, value: &str) {
    println!("  {}: {}", key.cyan(), value);
}

/// Print a `v1:` signature with the digest highlighted.
pub fn signature(signature: &RequestSignature) {
    println!(
        "  {}: {}{}",
        "Signature".cyan(),
        SIGNATURE_PREFIX.dimmed(),
        signature.digest_hex().bold()
    );
}

/// Print a platform status against the status the endpoint treats as success.
pub fn status(status: u16, expected: u16) {
    let code = status.to_string();
    let code = if status == expected {
        code.green()
    } else {
        code.red()
    };
    println!("  {}: {} (expected {})", "Status".cyan(), code, expected);
}

/// Print an error, its kind and its chain of causes to stderr.
pub fn failure(err: &anyhow::Error) {
    let mut lines = describe(err).into_iter();
    if let Some(first) = lines.next() {
        eprintln!("{} {}", "✗".red().bold(), first);
    }
    for line in lines {
        eprintln!("  {}", line.dimmed());
    }
}

/// Plain-text lines for [`failure`]: the error with its kind, then one line per cause.
pub fn describe(err: &anyhow::Error) -> Vec<String> {
    let head = match err.downcast_ref::<CasperError>() {
        Some(casper) if casper.is_retryable() => format!("{} [{:?}, retryable]", err, casper.code()),
        Some(casper) => format!("{} [{:?}]", err, casper.code()),
        None => err.to_string(),
    };
    std::iter::once(head)
        .chain(err.chain().skip(1).map(|cause| format!("caused by: {}", cause)))
        .collect()
}

/// Print JSON prettily
pub fn json(value: &serde_json::Value) {
    if let Ok(pretty) = serde_json::to_string_pretty(value) {
        println!("{}", pretty);
    }
}
