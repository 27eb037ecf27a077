use crate::profile::{CONF_FILE, SCRIPT_FILE, WrittenProfile};
use crate::report::{ParsedReport, Policy};
use colored::Colorize;
use std::path::Path;

pub fn print_summary(parsed: &ParsedReport, policy: Policy) {
    let subsystems: Vec<String> = parsed
        .directives
        .subsystems()
        .iter()
        .map(|s| s.to_string())
        .collect();

    println!(
        "  {} tunings found: {} as tuned plugin options, {} kept in {}",
        parsed.rows.to_string().bold(),
        parsed.classified,
        parsed.script_rows(),
        SCRIPT_FILE
    );
    if !subsystems.is_empty() {
        println!("  Plugins: {}", subsystems.join(", ").cyan());
    }
    if policy == Policy::Disabled {
        println!(
            "  {} Tunings are commented out. Edit the files or rerun with {}.",
            "Note:".yellow(),
            "--enable".cyan()
        );
    }
}

pub fn print_written(written: &WrittenProfile) {
    println!("Generating shell script {}", written.script.display());
    println!("Generating tuned config file {}", written.conf.display());
    println!("{}", "Profile written successfully!".green().bold());
}

pub fn print_dry_run(dir: &Path, script: &str, conf: &str) {
    for (name, content) in [(SCRIPT_FILE, script), (CONF_FILE, conf)] {
        let title = format!("{}", dir.join(name).display());
        println!("── {} {}", title.bold(), "─".repeat(64usize.saturating_sub(4 + title.len())));
        print!("{}", content);
        println!();
    }
    println!("{}", "Dry run complete. No files written.".yellow());
}

pub fn summary_json(
    parsed: &ParsedReport,
    policy: Policy,
    dir: &Path,
    include: Option<&str>,
) -> serde_json::Value {
    serde_json::json!({
        "output": dir.display().to_string(),
        "include": include,
        "policy": policy,
        "rows": parsed.rows,
        "classified": parsed.classified,
        "script_rows": parsed.script_rows(),
        "plugins": parsed.directives,
    })
}

pub fn print_summary_json(
    parsed: &ParsedReport,
    policy: Policy,
    dir: &Path,
    include: Option<&str>,
) -> anyhow::Result<()> {
    let value = summary_json(parsed, policy, dir, include);
    println!("{}", serde_json::to_string_pretty(&value)?);
    Ok(())
}
