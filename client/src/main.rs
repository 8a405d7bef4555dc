use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use tokio::io::{AsyncReadExt, BufReader};

use loan_client::form::parse_payload;
use loan_client::render::render_decision;
use loan_client::session::run_session;
use loan_client::{ApplicantForm, ClientError, ClientSettings, LoanClient};

#[derive(Parser, Debug)]
#[command(name = "loan-client", version, about = "Loan approval prediction client")]
struct Cli {
    #[command(flatten)]
    settings: ClientSettings,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Submits the applicant form built from flags.
    Form(ApplicantForm),
    /// Prints the JSON payload the form flags would send.
    Payload(ApplicantForm),
    /// Sends a raw JSON payload and prints the service response.
    Json(JsonArgs),
    /// Reads one JSON payload per line from stdin until EOF or `quit`.
    Interactive,
    /// Prints the first rows of the service's reference dataset.
    Dataset,
}

#[derive(Args, Debug)]
struct JsonArgs {
    /// Payload text.
    #[arg(long, conflicts_with = "file")]
    data: Option<String>,
    /// File holding the payload; stdin when neither flag is given.
    #[arg(long)]
    file: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn"))
        .format_timestamp_millis()
        .format_module_path(false)
        .init();

    let cli = Cli::parse();
    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("{}", describe_failure(&err));
            ExitCode::FAILURE
        }
    }
}

fn describe_failure(err: &anyhow::Error) -> String {
    match err.downcast_ref::<ClientError>() {
        Some(ClientError::InvalidJson(_) | ClientError::Api { .. }) => err.to_string(),
        Some(_) => format!("API error: {err}"),
        None => format!("Error: {err:#}"),
    }
}

async fn run(cli: Cli) -> Result<()> {
    let format = cli.settings.probability_format;
    let client = LoanClient::new(cli.settings)?;

    match cli.command {
        Command::Form(form) => {
            let decision = client.predict(&form.to_payload()).await?;
            println!("{}", render_decision(&decision, format));
        }
        Command::Payload(form) => {
            println!("{}", serde_json::to_string_pretty(&form.to_payload())?);
        }
        Command::Json(args) => {
            let text = match (args.data, args.file) {
                (Some(data), _) => data,
                (None, Some(path)) => tokio::fs::read_to_string(&path)
                    .await
                    .with_context(|| format!("reading {}", path.display()))?,
                (None, None) => {
                    let mut text = String::new();
                    tokio::io::stdin()
                        .read_to_string(&mut text)
                        .await
                        .context("reading stdin")?;
                    text
                }
            };
            let payload = parse_payload(&text).map_err(ClientError::InvalidJson)?;
            let response = client.predict_raw(&payload).await?;
            println!("{}", serde_json::to_string_pretty(&response)?);
        }
        Command::Interactive => {
            let stdin = BufReader::new(tokio::io::stdin());
            let summary = run_session(&client, stdin, &mut std::io::stdout()).await?;
            eprintln!(
                "{} decision(s) received, {} request(s) failed",
                summary.submitted, summary.failed
            );
        }
        Command::Dataset => {
            let rows = client.preview().await?;
            println!("{}", serde_json::to_string_pretty(&rows)?);
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn api_errors_are_not_prefixed_twice() {
        let err = anyhow::Error::from(ClientError::Api {
            status: 422,
            message: "validation failed".into(),
        });
        assert_eq!(describe_failure(&err), "API error (422): validation failed");
    }

    #[test]
    fn invalid_json_prints_as_is() {
        let parse = parse_payload("{").unwrap_err();
        let err = anyhow::Error::from(ClientError::InvalidJson(parse));
        assert!(describe_failure(&err).starts_with("Invalid JSON: "));
    }

    #[test]
    fn transport_failures_get_a_prefix() {
        let err = anyhow::Error::from(ClientError::Timeout(10));
        assert_eq!(describe_failure(&err), "API error: request timed out after 10s");

        let err = anyhow::anyhow!("disk full").context("reading payload.json");
        assert_eq!(describe_failure(&err), "Error: reading payload.json: disk full");
    }
}
