//! Runs the Zhipu demo groups against the live API.
//!
//! ```text
//! zhipu-demos                 # interactive menu
//! zhipu-demos --quick         # basic chat, multi-turn and function calling
//! zhipu-demos --run thinking 9
//! ```

mod runner;
mod scenarios;
mod settings;

use std::process::ExitCode;
use std::time::Instant;

use anyhow::Result;
use clap::Parser;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

use crate::runner::{MenuChoice, Selection};
use crate::scenarios::Scenario;
use crate::settings::Settings;

#[derive(Parser, Debug)]
#[command(
    name = "zhipu-demos",
    version,
    about = "Exercise the Zhipu (BigModel) free models: chat, vision, tools and generation"
)]
struct Cli {
    /// Run only the core groups (basic chat, multi-turn, function calling)
    #[arg(long, conflicts_with = "run")]
    quick: bool,

    /// Run the named groups, by name or menu number
    #[arg(long, value_name = "GROUP", num_args = 1..)]
    run: Vec<String>,

    /// List the demo groups and exit
    #[arg(long)]
    list: bool,

    /// Print the model catalogue and API key status, then exit
    #[arg(long)]
    models: bool,
}

fn init_logging() {
    let _ = tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with(fmt::layer().with_writer(std::io::stderr))
        .try_init();
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    init_logging();

    match run(Cli::parse()).await {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::FAILURE,
        Err(e) => {
            println!("❌ {e:#}");
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> Result<bool> {
    if cli.list {
        runner::print_menu();
        return Ok(true);
    }

    println!("\n{}", "=".repeat(60));
    println!("🚀 Zhipu AI demo suite");
    println!("{}", "=".repeat(60));

    let settings = Settings::load()?;
    settings.print_key_status();

    if cli.models {
        settings::print_model_catalogue();
        return Ok(true);
    }

    let selection = if cli.quick {
        Selection::Custom(Scenario::QUICK.to_vec())
    } else if !cli.run.is_empty() {
        Selection::Custom(runner::resolve_names(&cli.run)?)
    } else {
        prompt_selection().await?
    };

    let scenarios = selection.scenarios();
    if scenarios.is_empty() {
        println!("\n👋 Bye");
        return Ok(true);
    }

    tracing::info!(groups = scenarios.len(), "starting demo run");
    let started = Instant::now();
    let outcomes = runner::run_scenarios(&settings.client, &scenarios).await;
    Ok(runner::print_report(&outcomes, started.elapsed()))
}

async fn prompt_selection() -> Result<Selection> {
    runner::print_menu();
    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    let choice = ask(&mut lines, "\nYour choice (1-4): ").await?;
    match runner::parse_menu_choice(&choice) {
        MenuChoice::Ready(selection) => Ok(selection),
        MenuChoice::AskCustom => {
            let list = ask(&mut lines, "Group numbers, comma separated (e.g. 1,3,5): ").await?;
            Ok(Selection::Custom(runner::parse_custom_list(&list)?))
        }
    }
}

async fn ask<R>(lines: &mut tokio::io::Lines<R>, prompt: &str) -> Result<String>
where
    R: tokio::io::AsyncBufRead + Unpin,
{
    let mut stdout = tokio::io::stdout();
    stdout.write_all(prompt.as_bytes()).await?;
    stdout.flush().await?;
    Ok(lines.next_line().await?.unwrap_or_default())
}
