use crate::config::DefaultsManager;
use crate::core::error::Result;
use crate::module::params::DEFAULT_PIP_COMMAND;
use crate::python::{resolve_interpreter, UvManager};
use colored::Colorize;
use std::path::PathBuf;

pub async fn execute(config: Option<PathBuf>) -> Result<()> {
    println!("{}", "Running environment checks...".bold());
    println!();

    let mut all_ok = true;

    // Defaults file
    let manager = DefaultsManager::new(config);
    print!("Checking defaults... ");
    let defaults = match manager.load().await {
        Ok(defaults) => {
            match manager.config_path().filter(|p| p.exists()) {
                Some(path) => println!("{} ({})", "✓".green(), path.display().to_string().yellow()),
                None => println!("{}", "✓ built-in".green()),
            }
            defaults
        }
        Err(e) => {
            println!("{} {}", "✗".red(), e);
            return Ok(());
        }
    };

    // Check uv
    print!("Checking uv... ");
    match UvManager::locate(DEFAULT_PIP_COMMAND, &defaults.uv.search_paths) {
        Ok(uv) => match uv.tool_version().await {
            Some(version) => println!(
                "{} ({} {})",
                "✓".green(),
                uv.program().yellow(),
                version.to_string().cyan()
            ),
            None => println!("{} ({})", "✓".green(), uv.program().yellow()),
        },
        Err(_) => {
            println!("{}", "✗ Not found".red());
            println!("  Install from: https://github.com/astral-sh/uv");
            all_ok = false;
        }
    }

    // Check Python
    print!("Checking python... ");
    match resolve_interpreter(None, &defaults.python.candidates) {
        Ok(python) => println!("{} ({})", "✓".green(), python.display().to_string().yellow()),
        Err(_) => {
            println!("{}", "○ Not found".yellow());
            println!(
                "  Tasks without {} or {} will fail on this host",
                "virtualenv".cyan(),
                "python".cyan()
            );
            all_ok = false;
        }
    }

    println!();
    if all_ok {
        println!("{}", "All checks passed!".green().bold());
    } else {
        println!(
            "{}",
            "Some checks failed. Please fix the issues above."
                .yellow()
                .bold()
        );
    }

    Ok(())
}
