use std::io::{Read, Write};
use std::path::PathBuf;

use clap::Parser;
use serde_json::Value;

#[derive(Parser)]
#[command(name = "proxify-cli")]
#[command(about = "Submit a request descriptor to a running proxify relay", long_about = None)]
struct Cli {
    #[arg(short, long, default_value = "http://localhost:8080")]
    url: String,

    /// Descriptor JSON file, or `-` for stdin
    descriptor: PathBuf,

    /// Write the reply body here instead of stdout
    #[arg(short, long)]
    output: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let descriptor = if cli.descriptor.as_os_str() == "-" {
        let mut buf = String::new();
        std::io::stdin().read_to_string(&mut buf)?;
        buf
    } else {
        std::fs::read_to_string(&cli.descriptor)?
    };
    // Fail locally on malformed input rather than round-tripping it.
    let parsed: Value = serde_json::from_str(&descriptor)?;
    let binary = is_binary(&parsed);

    let client = reqwest::Client::builder().no_proxy().build()?;
    let res = client
        .post(format!("{}/proxify", cli.url.trim_end_matches('/')))
        .header(reqwest::header::CONTENT_TYPE, "application/json")
        .body(descriptor)
        .send()
        .await?;

    let status = res.status();
    let is_json = res
        .headers()
        .get(reqwest::header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .is_some_and(|ct| ct.starts_with("application/json"));
    let body = res.bytes().await?;

    if !status.is_success() {
        eprintln!("Error: relay returned status {}", status);
        eprintln!("Response: {}", String::from_utf8_lossy(&body));
        std::process::exit(1);
    }

    let rendered = if pretty_print(binary, is_json, cli.output.is_some()) {
        let json: Value = serde_json::from_slice(&body)?;
        let mut pretty = serde_json::to_vec_pretty(&json)?;
        pretty.push(b'\n');
        pretty
    } else {
        body.to_vec()
    };

    match cli.output {
        Some(path) => std::fs::write(path, rendered)?,
        None => std::io::stdout().write_all(&rendered)?,
    }

    Ok(())
}

/// Whether the descriptor asks for the upstream bytes unframed.
fn is_binary(descriptor: &Value) -> bool {
    descriptor.get("response_type").and_then(Value::as_str) == Some("binary")
}

/// Only envelopes headed for a terminal are reformatted; binary replies keep
/// the upstream bytes even when the upstream served JSON.
fn pretty_print(binary: bool, is_json: bool, to_file: bool) -> bool {
    !binary && is_json && !to_file
}
