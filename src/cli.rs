use clap::{CommandFactory, Parser};
use clap_complete::Shell;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(
    name = "powertop2tuned",
    about = "Creates a tuned profile from PowerTOP HTML output",
    version
)]
pub struct Cli {
    /// Name for the profile to be written
    #[arg(
        value_name = "PROFILE_NAME",
        required_unless_present_any = ["output", "completions"]
    )]
    pub profile: Option<String>,

    /// Path to PowerTOP HTML report. If not given, it is generated automatically
    #[arg(short, long, value_name = "INPUT_HTML")]
    pub input: Option<PathBuf>,

    /// Directory where the profile will be written, default is /etc/tuned/PROFILE_NAME
    #[arg(short, long, value_name = "OUTPUT_DIRECTORY")]
    pub output: Option<PathBuf>,

    /// Creates new profile, otherwise it merges (include) your current profile
    #[arg(short, long)]
    pub new_profile: bool,

    /// Overwrites the output directory if it already exists
    #[arg(short, long)]
    pub force: bool,

    /// Enable all tunings (not recommended). Even with this enabled, tunings
    /// known to be harmful (like USB autosuspend of input devices) won't be enabled
    #[arg(long)]
    pub enable: bool,

    /// Print the generated files instead of writing them
    #[arg(long)]
    pub dry_run: bool,

    /// Print a JSON summary of the parsed report
    #[arg(long)]
    pub json: bool,

    /// Use this config file instead of the system and user ones
    #[arg(long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Show debug logging (RUST_LOG takes precedence)
    #[arg(short, long)]
    pub verbose: bool,

    /// Generate shell completions and exit
    #[arg(long, value_name = "SHELL")]
    pub completions: Option<Shell>,
}

/// Print shell completions to stdout.
pub fn print_completions(shell: Shell) {
    clap_complete::generate(
        shell,
        &mut Cli::command(),
        "powertop2tuned",
        &mut std::io::stdout(),
    );
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_profile_and_flags() {
        let cli = Cli::try_parse_from([
            "powertop2tuned",
            "-i",
            "/tmp/report.html",
            "-n",
            "--enable",
            "laptop",
        ])
        .unwrap();
        assert_eq!(cli.profile.as_deref(), Some("laptop"));
        assert_eq!(cli.input, Some(PathBuf::from("/tmp/report.html")));
        assert!(cli.new_profile);
        assert!(cli.enable);
        assert!(!cli.force);
    }

    #[test]
    fn test_output_without_profile() {
        let cli = Cli::try_parse_from(["powertop2tuned", "-o", "/tmp/out"]).unwrap();
        assert!(cli.profile.is_none());
        assert_eq!(cli.output, Some(PathBuf::from("/tmp/out")));
    }

    #[test]
    fn test_profile_or_output_required() {
        assert!(Cli::try_parse_from(["powertop2tuned"]).is_err());
        assert!(Cli::try_parse_from(["powertop2tuned", "--completions", "bash"]).is_ok());
    }
}
