use clap::{Parser, Subcommand};
use std::process::ExitCode;
use std::sync::Arc;

use api_shared::{ConsultaRes, ErrorRes};
use sisreg_core::config::config_from_lookup;
use sisreg_core::{CanonicalCpf, ConsultaService, Phase, SisregClient};

#[derive(Parser)]
#[command(name = "sisreg")]
#[command(about = "SISREG consultation CLI")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Consult a citizen's referrals and appointments
    Consulta {
        /// CPF, formatted or digits only
        cpf: String,
        /// Mother's name; omit to only check whether records exist
        #[arg(long)]
        nome_mae: Option<String>,
    },
    /// Print the canonical form of a CPF
    Cpf {
        /// CPF, formatted or digits only
        cpf: String,
    },
}

#[tokio::main]
async fn main() -> ExitCode {
    dotenvy::dotenv().ok();

    // Logs go to stderr so stdout stays valid JSON.
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Some(Commands::Consulta { cpf, nome_mae }) => consulta(&cpf, nome_mae.as_deref()).await,
        Some(Commands::Cpf { cpf }) => {
            println!("{}", CanonicalCpf::new(&cpf).as_str());
            ExitCode::SUCCESS
        }
        None => {
            println!("Use 'sisreg --help' for commands");
            ExitCode::SUCCESS
        }
    }
}

async fn consulta(cpf: &str, nome_mae: Option<&str>) -> ExitCode {
    let client = match config_from_lookup(|name| std::env::var(name).ok())
        .and_then(|cfg| SisregClient::new(Arc::new(cfg)))
    {
        Ok(client) => client,
        Err(e) => {
            eprintln!("Error configuring SISREG client: {}", e);
            return ExitCode::FAILURE;
        }
    };

    let service = ConsultaService::new(client);
    let outcome = service.consult(cpf, Phase::from_param(nome_mae)).await;

    let (json, code) = match outcome {
        Ok(disclosure) => (
            serde_json::to_string_pretty(&ConsultaRes::from(disclosure)),
            ExitCode::SUCCESS,
        ),
        Err(e) if e.is_gate_rejection() => (
            serde_json::to_string_pretty(&ErrorRes::from(&e)),
            ExitCode::FAILURE,
        ),
        Err(e) => {
            eprintln!("Error during consultation: {}", e);
            (
                serde_json::to_string_pretty(&ConsultaRes::Records(Vec::new())),
                ExitCode::SUCCESS,
            )
        }
    };

    match json {
        Ok(json) => {
            println!("{}", json);
            code
        }
        Err(e) => {
            eprintln!("Error rendering response: {}", e);
            ExitCode::FAILURE
        }
    }
}
