//! mi-dump
//!
//! Reads GDB/MI output text from stdin, batches it at each `(gdb)` prompt,
//! and prints every parsed record as one JSON object per line. Useful for
//! inspecting captured MI traffic:
//!
//! ```text
//! gdb --interpreter=mi2 ./a.out 2>/dev/null | mi-dump
//! ```
//!
//! Skipped lines are logged to stderr; set `RUST_LOG=debug` for per-batch
//! detail.

use anyhow::Result;
use gdb_mi_core::{MiReader, PROMPT_SENTINEL};
use std::io::{BufRead, Write};
use tracing::warn;
use tracing_subscriber::EnvFilter;

fn main() -> Result<()> {
    // Logging to stderr; stdout carries only JSON records.
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let stdin = std::io::stdin();
    let stdout = std::io::stdout();
    let mut stdout = stdout.lock();
    let reader = MiReader::new();

    let mut block = String::new();
    for line in stdin.lock().lines() {
        let line = line?;
        let is_prompt = line.trim_end() == PROMPT_SENTINEL;
        block.push_str(&line);
        block.push('\n');
        if is_prompt {
            dump_batch(&reader, &block, &mut stdout)?;
            block.clear();
        }
    }
    // Trailing output with no closing prompt still gets parsed.
    if !block.trim().is_empty() {
        dump_batch(&reader, &block, &mut stdout)?;
    }

    Ok(())
}

fn dump_batch(reader: &MiReader, block: &str, out: &mut impl Write) -> Result<()> {
    let output = reader.parse_output(block);
    if !output.diagnostics.is_empty() {
        warn!("{} line(s) skipped in this batch", output.diagnostics.len());
    }
    for record in &output.records {
        writeln!(out, "{}", serde_json::to_string(record)?)?;
    }
    out.flush()?;
    Ok(())
}
