//! Line-oriented interactive mode: one JSON payload per line, every failure
//! reported and the session kept open for the next attempt.

use std::io::Write;

use log::warn;
use tokio::io::{AsyncBufRead, AsyncBufReadExt};

use crate::client::{ClientError, LoanClient};
use crate::form::parse_payload;
use crate::render::render_decision;

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct SessionSummary {
    pub submitted: usize,
    pub failed: usize,
}

pub async fn run_session<R, W>(
    client: &LoanClient,
    input: R,
    out: &mut W,
) -> std::io::Result<SessionSummary>
where
    R: AsyncBufRead + Unpin,
    W: Write,
{
    let format = client.settings().probability_format;
    let mut summary = SessionSummary::default();
    let mut lines = input.lines();

    while let Some(line) = lines.next_line().await? {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        if matches!(line, "quit" | "exit") {
            break;
        }

        let outcome = match parse_payload(line) {
            Ok(payload) => client.predict(&payload).await,
            Err(err) => Err(ClientError::InvalidJson(err)),
        };
        match outcome {
            Ok(decision) => {
                summary.submitted += 1;
                writeln!(out, "{}", render_decision(&decision, format))?;
            }
            Err(err) => {
                summary.failed += 1;
                warn!("request failed: {err}");
                writeln!(out, "Error: {err}")?;
            }
        }
    }
    Ok(summary)
}
