//! cot-cli: chain-of-thought reasoning from the command line.
//!
//! Usage:
//!   cot-cli ask <QUERY> [--temperature F] [--no-structured] [--no-tools] [--fallback] [--config PATH]
//!   cot-cli calc <EXPRESSION>
//!   cot-cli health

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use cot_reasoner::service::{health, QueryRequest, ReasoningService, ServiceError};
use cot_reasoner::tools::calculator;
use cot_reasoner::{logging, HttpCompletionClient, ReasonerConfig};
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

#[derive(Parser, Debug)]
#[command(name = "cot-cli", version)]
#[command(about = "Step-by-step reasoning with a chat-completions model")]
#[command(long_about = "Sends a query to an OpenAI-compatible chat-completions API and prints \
the structured chain-of-thought answer as JSON.\n\n\
Authentication:\n\
  The API key is read from the system keyring (service 'cot-reasoner'), then from\n\
  GROQ_API_KEY (or the variable named by api_key_env in the config file).\n\n\
Environment Variables:\n\
  COT_MODEL         Model name (default llama-3.3-70b-versatile)\n\
  COT_BASE_URL      API base URL (default https://api.groq.com/openai/v1)\n\
  COT_MAX_TOKENS    Maximum output tokens (default 4000)\n\
  COT_TIMEOUT_SECS  Request timeout in seconds (default 60)\n\
  LOG_LEVEL         Log level when RUST_LOG is unset (default info)")]
struct Args {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Answer a query with step-by-step reasoning
    Ask {
        query: String,

        /// Sampling temperature, 0.0 to 1.0
        #[arg(short, long)]
        temperature: Option<f64>,

        /// Return free text instead of structured JSON
        #[arg(long)]
        no_structured: bool,

        /// Do not offer the calculator tool to the model
        #[arg(long)]
        no_tools: bool,

        /// Retry with a plain prompt when the structured attempt fails
        #[arg(long)]
        fallback: bool,

        /// YAML config file
        #[arg(short, long, value_name = "PATH")]
        config: Option<PathBuf>,
    },
    /// Evaluate an arithmetic expression locally
    Calc { expression: String },
    /// Print the health payload
    Health,
}

#[tokio::main]
async fn main() -> ExitCode {
    let args = Args::parse();
    match run(args).await {
        Ok(code) => code,
        Err(e) => {
            eprintln!("Error: {:#}", e);
            ExitCode::FAILURE
        }
    }
}

async fn run(args: Args) -> Result<ExitCode> {
    match args.command {
        Commands::Ask {
            query,
            temperature,
            no_structured,
            no_tools,
            fallback,
            config,
        } => {
            let config = ReasonerConfig::load(config.as_deref()).context("loading configuration")?;
            logging::init_tracing(&config.log_level)?;

            let client = Arc::new(HttpCompletionClient::new(&config)?);
            let service = ReasoningService::new(client, &config);
            let request = QueryRequest {
                query,
                temperature: temperature.unwrap_or(config.default_temperature),
                structured_output: !no_structured,
                use_tools: !no_tools,
            };

            if fallback {
                let result = service
                    .reasoner(request.use_tools)
                    .process_with_fallback(&request.query, request.temperature)
                    .await;
                let text = serde_json::to_string_pretty(&result)?;
                if result.is_error() {
                    eprintln!("{}", text);
                    return Ok(ExitCode::FAILURE);
                }
                println!("{}", text);
                return Ok(ExitCode::SUCCESS);
            }

            match service.handle(&request).await {
                Ok(response) => {
                    println!("{}", serde_json::to_string_pretty(&response.result)?);
                    Ok(ExitCode::SUCCESS)
                }
                Err(e) => {
                    let payload = ServiceError::from(&e);
                    eprintln!("{}", serde_json::to_string_pretty(&payload)?);
                    Ok(ExitCode::FAILURE)
                }
            }
        }
        Commands::Calc { expression } => {
            let evaluation = calculator::evaluate(&expression);
            println!("{}", serde_json::to_string(&evaluation)?);
            Ok(if evaluation.is_error() {
                ExitCode::FAILURE
            } else {
                ExitCode::SUCCESS
            })
        }
        Commands::Health => {
            println!("{}", serde_json::to_string(&health())?);
            Ok(ExitCode::SUCCESS)
        }
    }
}
