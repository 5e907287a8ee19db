//! Binary entry point for `incident-toolkit`.
//!
//! This module provides the command-line interface with options for the
//! configuration file path and logging verbosity. It lists and invokes the
//! incident tools, reports the configured model, and runs assistant turns.

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use incident_toolkit::{
    assistant,
    base::types::{Res, Void},
    factory::ModelConfig,
    toolkit::IncidentToolkit,
};
use opentelemetry::trace::TracerProvider;
use opentelemetry_otlp::{Protocol, WithExportConfig};
use tracing_subscriber::{fmt::format::FmtSpan, layer::SubscriberExt, util::SubscriberInitExt};

/// Incident toolkit – incident tools and an OpenAI / Azure OpenAI model for a DevOps assistant.
///
/// Model configuration comes from `.env` (or `.env.azure`) in the current
/// directory or one of its parents, layered over the process environment.
#[derive(Parser, Debug)]
#[command(version, author, about, long_about = None)]
struct Args {
    /// Override the configuration file path (optional).
    ///
    /// By default, `.env` is searched for from the current directory upwards,
    /// then `.env.azure`.
    #[arg(short, long, global = true)]
    env_file: Option<PathBuf>,
    /// Increase log verbosity (-v, -vv, etc.).
    ///
    /// Use multiple times to increase verbosity:
    /// - No flag: INFO level
    /// - -v: DEBUG level
    /// - -vv or more: TRACE level
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Print the incident tool definitions as JSON.
    Tools,
    /// Run one incident tool and print its JSON result.
    Invoke {
        /// Tool name, e.g. `read_incident`.
        tool: String,
        /// JSON-encoded tool arguments.
        #[arg(default_value = "{}")]
        arguments: String,
    },
    /// Print the configured provider and model without contacting it.
    Provider,
    /// Ask the assistant a question with the incident tools available.
    Ask {
        /// The question, e.g. "Summarize incident INC-123".
        prompt: String,
    },
}

/// Main entry point for the incident-toolkit binary.
///
/// Sets up logging based on verbosity, then runs the requested command.
#[tokio::main]
async fn main() -> Void {
    let args = Args::parse();

    // Construct the level filter.

    let level = match args.verbose {
        0 => tracing::Level::INFO,
        1 => tracing::Level::DEBUG,
        _ => tracing::Level::TRACE,
    };

    let level_filter = tracing_subscriber::filter::LevelFilter::from_level(level);

    // Prepare the log layer; stdout carries command output, so logs go to stderr.

    let stderr = tracing_subscriber::fmt::layer()
        .with_writer(std::io::stderr)
        .without_time()
        .with_ansi(true)
        .with_level(true)
        .with_file(false)
        .with_target(false)
        .with_thread_ids(false)
        .with_thread_names(false)
        .with_span_events(FmtSpan::NEW | FmtSpan::CLOSE);

    // Prepare the otlp layer.

    let exporter = opentelemetry_otlp::SpanExporter::builder().with_http().with_protocol(Protocol::HttpBinary).build()?;
    let tracer = opentelemetry_sdk::trace::SdkTracerProvider::builder().with_simple_exporter(exporter).build().tracer("incident-toolkit");
    let otel = tracing_opentelemetry::layer().with_tracer(tracer);

    tracing_subscriber::registry().with(otel).with(level_filter).with(stderr).init();

    let toolkit = IncidentToolkit::stub();

    match args.command {
        Command::Tools => {
            println!("{}", serde_json::to_string_pretty(&toolkit.definitions()?)?);
        }
        Command::Invoke { tool, arguments } => {
            let output = toolkit.invoke(&tool, &arguments).await?;
            println!("{}", serde_json::to_string_pretty(&output)?);
        }
        Command::Provider => {
            let config = load_model_config(args.env_file)?;
            let model = &config.chat_model;

            println!("provider: {}", model.provider());
            println!("model: {}", model.model());
            if let Some(endpoint) = model.endpoint() {
                println!("endpoint: {endpoint}");
            }
            if let Some(api_version) = model.api_version() {
                println!("api_version: {api_version}");
            }
        }
        Command::Ask { prompt } => {
            let config = load_model_config(args.env_file)?;
            let turn = assistant::ask(&config.chat_model, &toolkit, &prompt).await?;

            for outcome in &turn.tool_outcomes {
                println!("[{}] {}", outcome.name, outcome.output);
            }
            println!("{}", turn.reply.unwrap_or_default());
        }
    }

    Ok(())
}

/// Build the model configuration from an explicit file, or by searching for one.
fn load_model_config(env_file: Option<PathBuf>) -> Res<ModelConfig> {
    match env_file {
        Some(path) => ModelConfig::from_env_file(&path),
        None => ModelConfig::new(),
    }
}
