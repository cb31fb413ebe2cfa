use crate::cli::OutputFormat;
use crate::core::error::Result;
use crate::module::{ModuleFailure, ModuleResult};
use crate::reconciler::Plan;
use colored::Colorize;

pub fn result(result: &ModuleResult, format: OutputFormat) -> Result<()> {
    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string(result)?),
        OutputFormat::Human => {
            let status = if result.changed {
                "changed".yellow().bold()
            } else {
                "ok".green().bold()
            };
            println!("{} {}", "✓".green().bold(), status);
            if !result.cmd.is_empty() {
                println!("  cmd: {}", result.cmd.join(" ").cyan());
            }
            if let Some(version) = &result.uv_version {
                println!("  uv: {}", version.yellow());
            }
            print_lines("stdout", &result.stdout_lines);
            print_lines("stderr", &result.stderr_lines);
            for warning in &result.warnings {
                println!("{} {}", "⚠".yellow().bold(), warning.yellow());
            }
        }
    }
    Ok(())
}

pub fn failure(failure: &ModuleFailure, format: OutputFormat) -> Result<()> {
    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string(failure)?),
        OutputFormat::Human => {
            println!("{} {}", "✗".red().bold(), "failed".red().bold());
            if let Some(cmd) = &failure.cmd {
                println!("  cmd: {}", cmd.join(" ").cyan());
            }
            if let Some(rc) = failure.rc {
                println!("  rc: {}", rc.to_string().red());
            }
            println!("  msg: {}", failure.msg);
        }
    }
    Ok(())
}

pub fn plan(plan: &Plan) {
    if plan.check_mode {
        println!("{} check mode", "ℹ".blue().bold());
    }
    if let Some(create) = &plan.create_virtualenv {
        println!("{} {}", "⚙ create virtualenv:".blue().bold(), create.join(" ").cyan());
    }
    match &plan.cmd {
        Some(cmd) => println!("{} {}", "→".blue().bold(), cmd.join(" ").cyan()),
        None => println!(
            "{} {}",
            "⚠".yellow().bold(),
            "nothing to run: no valid name or requirements file".yellow()
        ),
    }
}

fn print_lines(label: &str, lines: &[String]) {
    if lines.is_empty() {
        return;
    }
    println!("  {}:", label);
    for line in lines {
        println!("    {}", line);
    }
}
