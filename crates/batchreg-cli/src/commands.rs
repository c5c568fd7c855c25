use anyhow::Context;
use batchreg_gate::GateConfig;
use batchreg_types::RegistryError;
use colored::Colorize;

use crate::cli::*;
use crate::script::{self, RunReport, Script, StepOutcome};

pub fn run_command(cli: Cli) -> anyhow::Result<()> {
    match cli.command {
        Command::Run(args) => cmd_run(args, &cli.format),
        Command::Codes => cmd_codes(&cli.format),
    }
}

fn cmd_run(args: RunArgs, format: &OutputFormat) -> anyhow::Result<()> {
    let script = Script::load(&args.script)?;
    let config = match &args.config {
        Some(path) => GateConfig::load(path)
            .with_context(|| format!("loading gate config {}", path.display()))?,
        None => script.default_config(),
    };
    tracing::debug!(steps = script.steps.len(), admin = %config.admin, "running script");

    let report = script::run(&script, config);
    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&report)?),
        OutputFormat::Text => print_report(&report),
    }

    let failures = report.failures();
    if args.strict && failures > 0 {
        anyhow::bail!("{failures} step(s) failed");
    }
    if !report.summary.audit_clean {
        anyhow::bail!("registry audit found violations");
    }
    Ok(())
}

fn print_report(report: &RunReport) {
    for outcome in &report.outcomes {
        print_outcome(outcome);
    }

    let summary = &report.summary;
    println!();
    println!("Admin: {}", summary.admin.to_string().cyan());
    println!(
        "Paused: {}  Minting: {}",
        on_off(summary.paused),
        on_off(summary.mint_enabled)
    );
    println!(
        "Last id: {}  Live batches: {}",
        summary.last_id.to_string().bold(),
        summary.batch_count.to_string().bold()
    );
    if !summary.flagged.is_empty() {
        let ids: Vec<String> = summary.flagged.iter().map(|id| id.to_string()).collect();
        println!("Flagged: {}", ids.join(", ").red());
    }
    if summary.audit_clean {
        println!("{} Invariants hold", "✓".green().bold());
    } else {
        println!("{} Invariant violations:", "✗".red().bold());
        for violation in &summary.violations {
            println!("  {violation}");
        }
    }
}

fn print_outcome(outcome: &StepOutcome) {
    let who = outcome
        .caller
        .as_deref()
        .map(|c| format!(" as {c}"))
        .unwrap_or_default();
    match outcome.error {
        None => {
            let value = outcome
                .value
                .as_deref()
                .map(|v| format!(" → {}", v.yellow()))
                .unwrap_or_default();
            println!(
                "{} {:>3} {}{}{}",
                "✓".green(),
                outcome.step,
                outcome.action.bold(),
                who.dimmed(),
                value
            );
        }
        Some(error) => println!(
            "{} {:>3} {}{} {} ({})",
            "✗".red(),
            outcome.step,
            outcome.action.bold(),
            who.dimmed(),
            error.name().red(),
            error.code()
        ),
    }
    if let Some(record) = &outcome.record {
        println!(
            "      {} owner={} origin={:?} size={} frozen={}",
            record.id,
            record.owner,
            record.metadata.origin,
            record.metadata.batch_size,
            record.frozen
        );
        if record.flag.flagged {
            println!(
                "      flagged by {} at {}: {}",
                record.flag.flagged_by, record.flag.flag_time, record.flag.reason
            );
        }
    }
    for event in &outcome.events {
        println!("      {} {}", "event".blue(), event);
    }
}

fn on_off(value: bool) -> colored::ColoredString {
    if value {
        "on".yellow()
    } else {
        "off".normal()
    }
}

fn cmd_codes(format: &OutputFormat) -> anyhow::Result<()> {
    match format {
        OutputFormat::Json => {
            let table: Vec<serde_json::Value> = RegistryError::ALL
                .iter()
                .map(|e| {
                    serde_json::json!({
                        "code": e.code(),
                        "name": e.name(),
                        "message": e.to_string(),
                    })
                })
                .collect();
            println!("{}", serde_json::to_string_pretty(&table)?);
        }
        OutputFormat::Text => {
            for error in RegistryError::ALL {
                println!("{}  {:<16} {}", error.code().to_string().bold(), error.name(), error);
            }
        }
    }
    Ok(())
}
