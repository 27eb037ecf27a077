use super::classify::{self, DirectiveSet};
use super::markup::MarkupEvent;
use super::{ParsedReport, Policy};
use crate::error::{Error, Result};

/// `id` of the `<div>` that wraps the tuning table.
const TUNING_SECTION_ID: &str = "tuning";

const INPUT_DEVICE_WARNING: &str =
    "\n\t# WARNING: For some devices, uncommenting this command can disable the device.";

/// Autosuspend on keyboards and mice can leave the device dead.
fn is_input_autosuspend(description: &str) -> bool {
    let lower = description.to_lowercase();
    lower.contains("autosuspend") && (lower.contains("keyboard") || lower.contains("mouse"))
}

/// Single-pass state machine over the report's markup events.
///
/// Feed events with [`Scanner::feed`] in document order, then call
/// [`Scanner::finish`].
#[derive(Debug)]
pub struct Scanner {
    policy: Policy,
    in_section: bool,
    in_cell: bool,
    /// 1-based index of the current `<td>` within its row.
    cell: usize,
    /// Raw description cell text, whitespace collapsed when the row ends.
    description: String,
    /// Raw action cell text; `Some` once the action cell produced text.
    command: Option<String>,
    script: String,
    directives: DirectiveSet,
    rows: usize,
    classified: usize,
}

impl Scanner {
    pub fn new(policy: Policy) -> Self {
        Self {
            policy,
            in_section: false,
            in_cell: false,
            cell: 0,
            description: String::new(),
            command: None,
            script: String::new(),
            directives: DirectiveSet::new(),
            rows: 0,
            classified: 0,
        }
    }

    pub fn feed(&mut self, event: MarkupEvent) {
        match event {
            MarkupEvent::StartTag { name, id } => self.start_tag(&name, id.as_deref()),
            MarkupEvent::EndTag { name } => self.end_tag(&name),
            MarkupEvent::Text(data) => self.text(&data),
        }
    }

    fn start_tag(&mut self, name: &str, id: Option<&str>) {
        if name == "div" && id == Some(TUNING_SECTION_ID) {
            self.in_section = true;
        }
        if self.in_section && name == "td" {
            self.cell += 1;
            self.in_cell = true;
        }
    }

    fn end_tag(&mut self, name: &str) {
        match name {
            "td" => {
                if self.in_cell && self.cell >= 2 {
                    self.finish_row();
                }
                self.in_cell = false;
            }
            "tr" => {
                self.finish_row();
                self.cell = 0;
                self.in_cell = false;
                self.description.clear();
            }
            "table" if self.in_section => {
                self.finish_row();
                self.in_section = false;
                self.in_cell = false;
                self.cell = 0;
            }
            _ => {}
        }
    }

    /// Fragments are kept verbatim; inline markup such as `<b>` splits a
    /// cell's text without owning the whitespace around it.
    fn text(&mut self, data: &str) {
        if !self.in_section || !self.in_cell {
            return;
        }
        match self.cell {
            1 => self.description.push_str(data),
            2 => self.command.get_or_insert_with(String::new).push_str(data),
            _ => {}
        }
    }

    /// Build the row block from the finished action cell, then offer its
    /// last line to the classifier; keep the whole block as script text
    /// when it is not recognized.
    fn finish_row(&mut self) {
        let Some(raw) = self.command.take() else {
            return;
        };
        let command = raw.trim();
        if command.is_empty() {
            return;
        }
        self.rows += 1;

        let mut description = self.description.split_whitespace().collect::<Vec<_>>().join(" ");
        let mut prefix = self.policy.prefix();
        if is_input_autosuspend(&description) {
            description.push_str(INPUT_DEVICE_WARNING);
            prefix = "#";
        }
        if command.starts_with('#') {
            prefix = "";
        }
        let block = format!("\t# {}\n\t{}{}", description, prefix, command);

        let line = block.rsplit('\n').next().unwrap_or(&block);
        let classified = classify::classify(line);
        match classified.directive(&description) {
            Some((subsystem, entry)) => {
                tracing::debug!(%subsystem, command = line.trim(), "structured tuning");
                self.directives.append(subsystem, &entry);
                self.classified += 1;
            }
            None => {
                tracing::debug!(command = line.trim(), "script tuning");
                self.script.push_str(&block);
                self.script.push_str("\n\n");
            }
        }
    }

    /// End the pass. Fails when the report produced no output at all.
    pub fn finish(mut self) -> Result<ParsedReport> {
        self.finish_row();
        if self.script.is_empty() && self.directives.is_empty() {
            return Err(Error::ReportUnparseable);
        }
        Ok(ParsedReport {
            script: self.script,
            directives: self.directives,
            rows: self.rows,
            classified: self.classified,
        })
    }
}
