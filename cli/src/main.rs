//! Console driver: run the event-planning workflow from a prompt, stream its
//! events, collect human-input answers on stdin, and resume until the run
//! reaches a terminal state.

mod demo;
mod display;

use std::collections::HashMap;
use std::io::Write;
use std::process::ExitCode;

use clap::Parser;
use thiserror::Error;
use tokio_stream::StreamExt;
use tracing_subscriber::EnvFilter;

use planweave::RunStatus;

use crate::demo::{demo_workflow, DemoError};
use crate::display::EventRenderer;

#[derive(Parser, Debug)]
#[command(name = "planweave", about = "Plan an event with a supervised agent team")]
struct Args {
    /// The event to plan (e.g. "plan a 10-person team lunch, $200, Seattle").
    prompt: Vec<String>,

    /// Print executor invocations and status transitions.
    #[arg(long, short)]
    verbose: bool,
}

#[derive(Debug, Error)]
enum CliError {
    #[error(transparent)]
    Demo(#[from] DemoError),
    #[error("stdin: {0}")]
    Io(#[from] std::io::Error),
    #[error("workflow failed")]
    RunFailed,
}

fn read_answer(question: &str) -> Result<String, CliError> {
    print!("{} > ", question);
    std::io::stdout().flush()?;
    let mut line = String::new();
    std::io::stdin().read_line(&mut line)?;
    Ok(line.trim().to_string())
}

async fn run(args: Args) -> Result<(), CliError> {
    let prompt = if args.prompt.is_empty() {
        "plan a team event".to_string()
    } else {
        args.prompt.join(" ")
    };

    let (workflow, tool_scope) = demo_workflow().await?;
    tracing::info!(workflow_id = %workflow.id(), "starting run");

    let mut renderer = EventRenderer::new(args.verbose);
    let mut requests: Vec<(String, String)> = Vec::new();

    let mut events = workflow.run_stream(prompt);
    while let Some(event) = events.next().await {
        if let Some(request) = renderer.render(&event) {
            requests.push(request);
        }
    }
    drop(events);

    while workflow.status() == Some(RunStatus::IdleWithPendingRequests) {
        let mut responses = HashMap::new();
        for (request_id, question) in requests.drain(..) {
            responses.insert(request_id, read_answer(&question)?);
        }
        let mut events = workflow.send_responses_streaming(responses);
        while let Some(event) = events.next().await {
            if let Some(request) = renderer.render(&event) {
                requests.push(request);
            }
        }
    }

    tool_scope.close().await.ok();

    match workflow.status() {
        Some(RunStatus::Completed) => Ok(()),
        other => {
            tracing::error!(status = ?other, "run did not complete");
            Err(CliError::RunFailed)
        }
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    dotenv::dotenv().ok();
    let args = Args::parse();
    let default_filter = if args.verbose { "info" } else { "warn" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter)),
        )
        .with_writer(std::io::stderr)
        .init();

    match run(args).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("{}", e);
            ExitCode::FAILURE
        }
    }
}
