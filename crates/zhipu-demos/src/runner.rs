//! Menu parsing, group execution and the final report.

use std::time::{Duration, Instant};

use anyhow::{Result, bail};
use strum::IntoEnumIterator;
use zhipu_ox::Zhipu;

use crate::scenarios::Scenario;

const PAUSE_BETWEEN_GROUPS: Duration = Duration::from_secs(2);

/// What the interactive menu resolved to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Selection {
    All,
    Fast,
    Custom(Vec<Scenario>),
    Exit,
}

impl Selection {
    pub fn scenarios(&self) -> Vec<Scenario> {
        match self {
            Selection::All => Scenario::all(),
            Selection::Fast => Scenario::fast(),
            Selection::Custom(list) => list.clone(),
            Selection::Exit => Vec::new(),
        }
    }
}

pub fn print_menu() {
    println!("\nAvailable demo groups:");
    for scenario in Scenario::iter() {
        let slow = if scenario.is_slow() { " ⏳" } else { "" };
        println!(
            "  {:>2}. {:<22} {}{slow}",
            scenario.number(),
            scenario.title(),
            scenario.description()
        );
    }
    println!("\nChoose:");
    println!("  1. Run everything");
    println!("  2. Fast run (skip video groups)");
    println!("  3. Pick groups");
    println!("  4. Exit");
}

/// Top-level menu answer. Anything unrecognised exits.
pub fn parse_menu_choice(input: &str) -> MenuChoice {
    match input.trim() {
        "1" => MenuChoice::Ready(Selection::All),
        "2" => MenuChoice::Ready(Selection::Fast),
        "3" => MenuChoice::AskCustom,
        _ => MenuChoice::Ready(Selection::Exit),
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MenuChoice {
    Ready(Selection),
    /// A second prompt for the group numbers is needed.
    AskCustom,
}

/// Parse `"1,3,5"`. Numbers outside the menu are dropped; any token that is
/// not a number rejects the whole line.
pub fn parse_custom_list(input: &str) -> Result<Vec<Scenario>> {
    let mut picked = Vec::new();
    for token in input.split(',').map(str::trim).filter(|t| !t.is_empty()) {
        let Ok(number) = token.parse::<usize>() else {
            bail!("invalid input {token:?}: expected comma-separated numbers such as 1,3,5");
        };
        if let Some(scenario) = Scenario::from_number(number) {
            picked.push(scenario);
        }
    }
    Ok(picked)
}

/// Resolve `--run` arguments: menu numbers or group names (`basic-chat` or `basic_chat`).
pub fn resolve_names(names: &[String]) -> Result<Vec<Scenario>> {
    names
        .iter()
        .map(|name| {
            let name = name.trim();
            if let Ok(number) = name.parse::<usize>() {
                return Scenario::from_number(number)
                    .ok_or_else(|| anyhow::anyhow!("no demo group numbered {number}"));
            }
            name.replace('-', "_")
                .parse::<Scenario>()
                .map_err(|_| anyhow::anyhow!("unknown demo group {name:?}; try --list"))
        })
        .collect()
}

#[derive(Debug)]
pub struct Outcome {
    pub scenario: Scenario,
    pub passed: bool,
    pub duration: Duration,
}

/// Run the groups in order with a short pause between them.
pub async fn run_scenarios(client: &Zhipu, scenarios: &[Scenario]) -> Vec<Outcome> {
    let mut outcomes = Vec::with_capacity(scenarios.len());

    for (i, &scenario) in scenarios.iter().enumerate() {
        println!("\n{}", "#".repeat(60));
        println!("# {}. {}", scenario.number(), scenario.title());
        println!("{}", "#".repeat(60));

        let started = Instant::now();
        let steps = scenario.run(client).await;
        let duration = started.elapsed();

        tracing::info!(
            group = %scenario,
            failed = steps.failed(),
            elapsed_ms = u64::try_from(duration.as_millis()).unwrap_or(u64::MAX),
            "demo group finished"
        );
        outcomes.push(Outcome {
            scenario,
            passed: steps.passed(),
            duration,
        });

        if i + 1 < scenarios.len() {
            tokio::time::sleep(PAUSE_BETWEEN_GROUPS).await;
        }
    }

    outcomes
}

/// Print the summary. Returns `true` when every group passed.
pub fn print_report(outcomes: &[Outcome], elapsed: Duration) -> bool {
    let passed = outcomes.iter().filter(|o| o.passed).count();
    let failed = outcomes.len() - passed;

    println!("\n{}", "=".repeat(60));
    println!("📊 Report");
    println!("{}", "=".repeat(60));
    println!("  Groups run: {}", outcomes.len());
    println!("  ✅ Passed:  {passed}");
    println!("  ❌ Failed:  {failed}");
    println!("  ⏱️  Elapsed: {:.1}s", elapsed.as_secs_f64());

    println!("\nDetails:");
    for outcome in outcomes {
        let mark = if outcome.passed { "✅" } else { "❌" };
        println!(
            "  {mark} {:<22} {:.1}s",
            outcome.scenario.title(),
            outcome.duration.as_secs_f64()
        );
    }

    if failed == 0 {
        println!("\n🎉 All demo groups passed!");
    } else {
        println!("\n⚠️  {failed} group(s) had failures, see the output above");
    }
    failed == 0
}
