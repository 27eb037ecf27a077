use anyhow::{Result, anyhow};
use clap::Parser;
use colored::Colorize;
use powertop2tuned::cli::Cli;
use powertop2tuned::error::Error;
use powertop2tuned::profile::{self, ProfileWriter};
use powertop2tuned::report::{self, Policy};
use powertop2tuned::source::ReportSource;
use tracing_subscriber::EnvFilter;

fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    if let Err(e) = run(cli) {
        eprintln!("{} {:#}", "error:".red().bold(), e);
        let code = e.downcast_ref::<Error>().map_or(1, Error::exit_code);
        std::process::exit(code);
    }
}

fn init_tracing(verbose: bool) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new(if verbose {
            "warn,powertop2tuned=debug"
        } else {
            "warn"
        })
    });
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn run(cli: Cli) -> Result<()> {
    if let Some(shell) = cli.completions {
        powertop2tuned::cli::print_completions(shell);
        return Ok(());
    }

    let config = powertop2tuned::config::load(cli.config.as_deref());

    let dir = profile::resolve_output_dir(
        cli.profile.as_deref(),
        cli.output.as_deref(),
        &config.output.dir,
    )
    .ok_or_else(|| {
        anyhow!("You have to specify the profile_name or output directory using the --output argument.")
    })?;

    // Fail before spending time on PowerTOP.
    let writer = ProfileWriter::new(&dir, cli.force);
    if !cli.dry_run {
        writer.check()?;
    }

    let source = match cli.input {
        Some(path) => ReportSource::File(path),
        None => ReportSource::Generate(config.powertop.clone()),
    };
    let mut report = source.acquire()?;
    tracing::debug!(path = %report.path.display(), bytes = report.html.len(), "report loaded");

    let policy = Policy::from(cli.enable || config.tunings.enable);
    let parsed = report::parse_report(&report.html, policy);
    report.cleanup();
    let parsed = parsed?;

    let include = if cli.new_profile || config.profile.new_profile {
        None
    } else {
        Some(powertop2tuned::tuned::active_profile())
    };

    let script = profile::render_script(&parsed.script);
    let conf = profile::render_tuned_conf(include.as_deref(), &parsed.directives);

    if cli.json {
        powertop2tuned::output::print_summary_json(&parsed, policy, &dir, include.as_deref())?;
    } else {
        powertop2tuned::output::print_summary(&parsed, policy);
    }

    if cli.dry_run {
        if !cli.json {
            powertop2tuned::output::print_dry_run(&dir, &script, &conf);
        }
        return Ok(());
    }

    let written = writer.write(&script, &conf)?;
    if !cli.json {
        powertop2tuned::output::print_written(&written);
    }

    Ok(())
}
