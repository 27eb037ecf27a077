use std::path::PathBuf;

/// Exit code when the report has to be generated but we are not root.
pub const EXIT_BAD_PRIVS: i32 = 100;
/// Exit code when the report yields neither script lines nor directives.
pub const EXIT_PARSING_ERROR: i32 = 101;
/// Exit code when the profile files cannot be written.
pub const EXIT_BAD_SCRIPTSH: i32 = 102;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("failed to read report {path}: {source}")]
    ReportRead {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("report generation failed: {0}")]
    Generator(String),

    #[error(
        "your PowerTOP version is incompatible (maybe too old) or the generated HTML output is malformed"
    )]
    ReportUnparseable,

    #[error("not running as root (required for {operation})")]
    NotRoot { operation: String },

    #[error("output directory {} already exists, use --force to overwrite it", path.display())]
    OutputExists { path: PathBuf },

    #[error("failed to write {path}: {source}")]
    ProfileWrite {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("config error: {0}")]
    Config(String),
}

impl Error {
    /// Process exit code the binary uses for this error.
    pub fn exit_code(&self) -> i32 {
        match self {
            Error::NotRoot { .. } => EXIT_BAD_PRIVS,
            Error::ReportUnparseable => EXIT_PARSING_ERROR,
            Error::ProfileWrite { .. } => EXIT_BAD_SCRIPTSH,
            _ => 1,
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
