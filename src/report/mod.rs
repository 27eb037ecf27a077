pub mod classify;
pub mod markup;
pub mod scanner;

use crate::error::Result;
use classify::DirectiveSet;
use scanner::Scanner;
use serde::Serialize;

/// Whether emitted tunings are active or commented out by default.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Policy {
    Enabled,
    Disabled,
}

impl Policy {
    /// Line prefix applied to commands under this policy.
    pub fn prefix(self) -> &'static str {
        match self {
            Policy::Enabled => "",
            Policy::Disabled => "#",
        }
    }
}

impl From<bool> for Policy {
    fn from(enable_tunings: bool) -> Self {
        if enable_tunings {
            Policy::Enabled
        } else {
            Policy::Disabled
        }
    }
}

/// Output of one parse pass.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ParsedReport {
    /// Body of the `start()` section of script.sh.
    pub script: String,
    /// Plugin blocks for tuned.conf.
    pub directives: DirectiveSet,
    /// Rows that had both a description and a command.
    pub rows: usize,
    /// Rows turned into plugin directives.
    pub classified: usize,
}

impl ParsedReport {
    pub fn script_rows(&self) -> usize {
        self.rows - self.classified
    }
}

/// Parse a PowerTOP HTML report.
pub fn parse_report(html: &str, policy: Policy) -> Result<ParsedReport> {
    let mut scanner = Scanner::new(policy);
    for event in markup::events(html) {
        scanner.feed(event);
    }
    scanner.finish()
}
