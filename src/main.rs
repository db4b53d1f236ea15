use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use directions_core::{
    sdk::config::ExplainConfig,
    sdk::routing::{archive, DirectionsError, Intersection, ResponseMetadata},
    sdk::util::log::init_logging,
};
use std::{
    fs,
    path::{Path, PathBuf},
};

/// Decode routing-service intersections and explain routing failures
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Cli {
    /// Log decode and classification details
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Decode raw intersection records (a single object or an array)
    Decode {
        /// JSON file holding the raw records
        file: PathBuf,

        /// [Optional] Write the decoded intersections to this archive file
        #[arg(long)]
        archive: Option<PathBuf>,
    },
    /// Classify a service response and explain the failure it describes
    Explain {
        /// HTTP status of the response
        #[arg(short, long)]
        status: u16,

        /// Response header as "Name: value"; repeatable
        #[arg(long = "header", value_name = "NAME: VALUE")]
        headers: Vec<String>,

        /// [Optional] File holding the response body
        #[arg(short, long)]
        body: Option<PathBuf>,
    },
}

fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match cli.command {
        Command::Decode { file, archive } => decode(&file, archive.as_deref()),
        Command::Explain {
            status,
            headers,
            body,
        } => explain(status, &headers, body.as_deref()),
    }
}

fn decode(file: &Path, archive_path: Option<&Path>) -> Result<()> {
    let data = fs::read_to_string(file)
        .with_context(|| format!("Failed to read {}", file.display()))?;
    let records: serde_json::Value =
        serde_json::from_str(&data).context("Input is not valid JSON")?;
    let intersections =
        Intersection::decode_all(&records).context("Failed to decode intersections")?;
    log::info!(
        "Decoded {} intersections from {}",
        intersections.len(),
        file.display()
    );

    for (i, intersection) in intersections.iter().enumerate() {
        let location = intersection.location();
        println!(
            "#{} ({:.5}, {:.5}) headings={:?} enterable={:?} lanes={} usable={}",
            i,
            location.latitude,
            location.longitude,
            intersection.headings(),
            intersection.enterable_headings().collect::<Vec<_>>(),
            intersection.lanes().map_or(0, |lanes| lanes.len()),
            intersection.usable_lanes().len()
        );
    }

    if let Some(path) = archive_path {
        archive::save_to_file(&intersections, path)
            .with_context(|| format!("Failed to write archive {}", path.display()))?;
        log::info!("Archive written to {}", path.display());
    }
    Ok(())
}

fn explain(status: u16, headers: &[String], body: Option<&Path>) -> Result<()> {
    let ctx = ExplainConfig::from_env()?.context()?;

    let mut response = ResponseMetadata::new(status);
    for header in headers {
        let Some((name, value)) = header.split_once(':') else {
            bail!("Header '{}' is not in \"Name: value\" form", header);
        };
        response.insert_header(name.trim(), value);
    }

    let body = match body {
        Some(path) => {
            fs::read(path).with_context(|| format!("Failed to read {}", path.display()))?
        }
        None => Vec::new(),
    };

    match DirectionsError::classify_response(response, &body) {
        Some(error) => {
            println!("Reason: {}", error.reason(&ctx));
            if let Some(suggestion) = error.suggestion(&ctx) {
                println!("Suggestion: {}", suggestion);
            }
        }
        None => println!("The response does not describe a failure."),
    }
    Ok(())
}
