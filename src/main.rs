//! `equal-http` command line.
//!
//! Decodes raw HTTP requests the way the message layer sees them and
//! looks up status lines.

use std::error::Error;
use std::fs;
use std::io::{self, Read};
use std::path::PathBuf;

use clap::{Parser, Subcommand};
use serde_json::{json, Value};

use equal_http::config::{load_config, EqualConfig};
use equal_http::http::status;
use equal_http::http::{Body, HttpRequest};
use equal_http::observability::{init_logging, metrics};

#[derive(Parser)]
#[command(name = "equal-http")]
#[command(about = "Inspect HTTP messages as the eQual core decodes them", long_about = None)]
struct Cli {
    /// TOML configuration file
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Print the Prometheus exposition after the command
    #[arg(long, global = true)]
    metrics: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Parse a raw HTTP request and print its decoded form
    Decode {
        /// Read the request from a file instead of stdin
        #[arg(short, long)]
        file: Option<PathBuf>,
    },
    /// Print the status line for a code
    Status { code: u16 },
}

fn main() -> Result<(), Box<dyn Error>> {
    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => load_config(path)?,
        None => EqualConfig::default(),
    };
    init_logging(&config.observability);

    let recorder = if cli.metrics || config.observability.metrics_enabled {
        Some(metrics::init_metrics()?)
    } else {
        None
    };

    match cli.command {
        Commands::Decode { file } => {
            let raw = match file {
                Some(path) => fs::read_to_string(path)?,
                None => {
                    let mut buf = String::new();
                    io::stdin().read_to_string(&mut buf)?;
                    buf
                }
            };
            let request = HttpRequest::parse_with_config(&raw, &config.http)?;
            println!("{}", serde_json::to_string_pretty(&summary(&request))?);
        }
        Commands::Status { code } => {
            if status::reason_phrase(code).is_none() {
                tracing::warn!(code, "Code not in the status table");
            }
            println!("{}", status::status_line(code));
        }
    }

    if let Some(handle) = recorder {
        print!("{}", handle.render());
    }
    Ok(())
}

fn summary(request: &HttpRequest) -> Value {
    let body = match request.body() {
        Body::Structured(value) => value.clone(),
        Body::Raw(raw) => Value::String(raw.clone()),
    };
    json!({
        "method": request.method().as_str(),
        "uri": request.uri_string(),
        "protocol": request.protocol(),
        "headers": request.headers_map(),
        "body": body,
    })
}
