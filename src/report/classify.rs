use serde::Serialize;
use std::collections::BTreeMap;

const PROC_SYS_ROOT: &str = "/proc/sys/";
const HDA_INTEL_POWER_SAVE: &str = "/sys/module/snd_hda_intel/parameters/power_save";

/// Backend plugin a directive is written for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Subsystem {
    Sysfs,
    Audio,
    Net,
}

impl Subsystem {
    pub fn name(self) -> &'static str {
        match self {
            Subsystem::Sysfs => "sysfs",
            Subsystem::Audio => "audio",
            Subsystem::Net => "net",
        }
    }

    /// Two-line block header written once per subsystem.
    fn header(self) -> String {
        format!("[{}]\ndynamic_tuning=0\n", self.name())
    }
}

impl std::fmt::Display for Subsystem {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// Recognized command shapes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CommandShape {
    /// `echo 'value' > '/proc/sys/...'` or a generic `/sys/` attribute write.
    SysfsWrite { key: String, value: String },
    /// Write to the snd_hda_intel `power_save` parameter.
    AudioPowerSave,
    /// `ethtool -s <iface> wol d;`
    NetWakeOnLan,
    Unrecognized,
}

impl CommandShape {
    pub fn subsystem(&self) -> Option<Subsystem> {
        match self {
            CommandShape::SysfsWrite { .. } => Some(Subsystem::Sysfs),
            CommandShape::AudioPowerSave => Some(Subsystem::Audio),
            CommandShape::NetWakeOnLan => Some(Subsystem::Net),
            CommandShape::Unrecognized => None,
        }
    }
}

/// Result of classifying one command line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Classified {
    pub shape: CommandShape,
    /// The line carried a leading `#`.
    pub disabled: bool,
}

impl Classified {
    fn prefix(&self) -> &'static str {
        if self.disabled { "#" } else { "" }
    }

    /// Directive text for this command, or `None` when unrecognized.
    pub fn directive(&self, description: &str) -> Option<(Subsystem, String)> {
        let subsystem = self.shape.subsystem()?;
        let prefix = self.prefix();
        let body = match &self.shape {
            CommandShape::SysfsWrite { key, value } => {
                format!("#{}\n{}{}={}\n\n", description, prefix, key, value)
            }
            CommandShape::AudioPowerSave => {
                format!("#{}\n{}hda_intel_powersave=1\n", description, prefix)
            }
            CommandShape::NetWakeOnLan => {
                format!("#{}\n{}wake_on_lan=0\n", description, prefix)
            }
            CommandShape::Unrecognized => return None,
        };
        Some((subsystem, body))
    }
}

struct Rule {
    name: &'static str,
    matches: fn(&str) -> Option<CommandShape>,
}

/// Evaluated top to bottom; first match wins.
const RULES: &[Rule] = &[
    Rule {
        name: "proc-sys-write",
        matches: proc_sys_write,
    },
    Rule {
        name: "hda-intel-power-save",
        matches: hda_intel_power_save,
    },
    Rule {
        name: "sys-attribute-write",
        matches: sys_attribute_write,
    },
    Rule {
        name: "ethtool-wol-disable",
        matches: ethtool_wol_disable,
    },
];

/// Classify one command line. Never fails: unmatched input is `Unrecognized`.
pub fn classify(line: &str) -> Classified {
    let line = line.trim();
    let (disabled, command) = match line.strip_prefix('#') {
        Some(rest) => (true, rest),
        None => (false, line),
    };

    for rule in RULES {
        if let Some(shape) = (rule.matches)(command) {
            tracing::trace!(rule = rule.name, command, "command matched");
            return Classified { shape, disabled };
        }
    }

    Classified {
        shape: CommandShape::Unrecognized,
        disabled,
    }
}

/// Contents of the quoted strings in `command`, in order.
/// Both quote styles are accepted; an unterminated quote ends the scan.
fn quoted_operands(command: &str) -> Vec<&str> {
    let mut operands = Vec::new();
    let mut rest = command;
    while let Some(start) = rest.find(['\'', '"']) {
        let quote = rest[start..].chars().next().unwrap_or('\'');
        let after = &rest[start + 1..];
        let Some(len) = after.find(quote) else {
            break;
        };
        operands.push(&after[..len]);
        rest = &after[len + 1..];
    }
    operands
}

/// `(value, path)` of an `echo 'value' > 'path'` command.
fn echo_operands(command: &str) -> Option<(&str, &str)> {
    if !command.starts_with("echo") {
        return None;
    }
    match quoted_operands(command)[..] {
        [value, path, ..] => Some((value, path)),
        _ => None,
    }
}

fn targets_sys(command: &str) -> bool {
    command.contains("'/sys/") || command.contains("\"/sys/")
}

fn proc_sys_write(command: &str) -> Option<CommandShape> {
    if !command.contains("/proc/sys") {
        return None;
    }
    let (value, path) = echo_operands(command)?;
    let key = path.replace(PROC_SYS_ROOT, "").replace('/', ".");
    Some(CommandShape::SysfsWrite {
        key,
        value: value.to_string(),
    })
}

fn hda_intel_power_save(command: &str) -> Option<CommandShape> {
    if !targets_sys(command) {
        return None;
    }
    let (_, path) = echo_operands(command)?;
    (path == HDA_INTEL_POWER_SAVE).then_some(CommandShape::AudioPowerSave)
}

fn sys_attribute_write(command: &str) -> Option<CommandShape> {
    if !targets_sys(command) {
        return None;
    }
    let (value, path) = echo_operands(command)?;
    Some(CommandShape::SysfsWrite {
        key: path.to_string(),
        value: value.to_string(),
    })
}

fn ethtool_wol_disable(command: &str) -> Option<CommandShape> {
    (command.starts_with("ethtool -s ") && command.ends_with("wol d;"))
        .then_some(CommandShape::NetWakeOnLan)
}

/// Per-subsystem directive text accumulated over one parse.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct DirectiveSet {
    blocks: BTreeMap<Subsystem, String>,
}

impl DirectiveSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append an entry, seeding the subsystem header on first use.
    pub fn append(&mut self, subsystem: Subsystem, entry: &str) {
        self.blocks
            .entry(subsystem)
            .or_insert_with(|| subsystem.header())
            .push_str(entry);
    }

    pub fn get(&self, subsystem: Subsystem) -> Option<&str> {
        self.blocks.get(&subsystem).map(String::as_str)
    }

    /// Lookup by plugin name (`"sysfs"`, `"audio"`, `"net"`).
    #[cfg(test)]
    pub fn by_name(&self, name: &str) -> Option<&str> {
        self.blocks
            .iter()
            .find(|(subsystem, _)| subsystem.name() == name)
            .map(|(_, text)| text.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (Subsystem, &str)> {
        self.blocks.iter().map(|(s, text)| (*s, text.as_str()))
    }

    pub fn subsystems(&self) -> Vec<Subsystem> {
        self.blocks.keys().copied().collect()
    }

    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }

    #[cfg(test)]
    pub fn len(&self) -> usize {
        self.blocks.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_proc_sys_write() {
        let c = classify("echo '1500' > '/proc/sys/vm/dirty_writeback_centisecs';");
        assert!(!c.disabled);
        assert_eq!(
            c.shape,
            CommandShape::SysfsWrite {
                key: "vm.dirty_writeback_centisecs".to_string(),
                value: "1500".to_string(),
            }
        );
    }

    #[test]
    fn test_disabled_marker_is_stripped_and_recorded() {
        let c = classify("\t#echo '0' > '/proc/sys/kernel/nmi_watchdog';");
        assert!(c.disabled);
        let (subsystem, text) = c.directive("NMI watchdog should be turned off").unwrap();
        assert_eq!(subsystem, Subsystem::Sysfs);
        assert_eq!(
            text,
            "#NMI watchdog should be turned off\n#kernel.nmi_watchdog=0\n\n"
        );
    }

    #[test]
    fn test_hda_intel_value_is_fixed() {
        let c = classify("echo '10' > '/sys/module/snd_hda_intel/parameters/power_save';");
        assert_eq!(c.shape, CommandShape::AudioPowerSave);
        let (subsystem, text) = c.directive("Enable Audio codec power management").unwrap();
        assert_eq!(subsystem, Subsystem::Audio);
        assert_eq!(
            text,
            "#Enable Audio codec power management\nhda_intel_powersave=1\n"
        );
        assert!(!text.contains("10"));
    }

    #[test]
    fn test_sys_attribute_write_keeps_path() {
        let c = classify(
            "echo 'min_power' > '/sys/class/scsi_host/host0/link_power_management_policy';",
        );
        assert_eq!(
            c.shape,
            CommandShape::SysfsWrite {
                key: "/sys/class/scsi_host/host0/link_power_management_policy".to_string(),
                value: "min_power".to_string(),
            }
        );
    }

    #[test]
    fn test_double_quoted_sys_path() {
        let c = classify("echo \"auto\" > \"/sys/bus/usb/devices/1-1/power/control\";");
        assert_eq!(
            c.shape,
            CommandShape::SysfsWrite {
                key: "/sys/bus/usb/devices/1-1/power/control".to_string(),
                value: "auto".to_string(),
            }
        );
    }

    #[test]
    fn test_ethtool_wol() {
        let c = classify("ethtool -s eth0 wol d;");
        assert_eq!(c.shape, CommandShape::NetWakeOnLan);
        let (subsystem, text) = c.directive("Wake-on-lan status for device eth0").unwrap();
        assert_eq!(subsystem, Subsystem::Net);
        assert_eq!(text, "#Wake-on-lan status for device eth0\nwake_on_lan=0\n");
    }

    #[test]
    fn test_unrecognized() {
        for cmd in [
            "iw dev wlan0 set power_save on;",
            "ethtool -s eth0 wol g;",
            "echo 'x' > /tmp/foo;",
            "cpupower frequency-set -g powersave",
            "",
        ] {
            let c = classify(cmd);
            assert_eq!(c.shape, CommandShape::Unrecognized, "{}", cmd);
            assert!(c.directive("desc").is_none());
        }
    }

    #[test]
    fn test_proc_sys_without_operands_falls_through() {
        let c = classify("echo 1 > /proc/sys/vm/laptop_mode;");
        assert_eq!(c.shape, CommandShape::Unrecognized);
    }

    #[test]
    fn test_quoted_operands() {
        assert_eq!(
            quoted_operands("echo 'a' > \"b\" 'c"),
            vec!["a", "b"]
        );
        assert!(quoted_operands("no quotes").is_empty());
    }

    #[test]
    fn test_directive_set_header_written_once() {
        let mut set = DirectiveSet::new();
        set.append(Subsystem::Sysfs, "#one\na=1\n\n");
        set.append(Subsystem::Sysfs, "#two\nb=2\n\n");
        let text = set.get(Subsystem::Sysfs).unwrap();
        assert_eq!(text.matches("[sysfs]").count(), 1);
        assert_eq!(text, "[sysfs]\ndynamic_tuning=0\n#one\na=1\n\n#two\nb=2\n\n");
        assert_eq!(set.by_name("sysfs"), Some(text));
        assert_eq!(set.len(), 1);
    }

    #[test]
    fn test_directive_set_orders_by_subsystem() {
        let mut set = DirectiveSet::new();
        set.append(Subsystem::Net, "#n\nwake_on_lan=0\n");
        set.append(Subsystem::Sysfs, "#s\na=1\n\n");
        set.append(Subsystem::Audio, "#a\nhda_intel_powersave=1\n");
        assert_eq!(
            set.subsystems(),
            vec![Subsystem::Sysfs, Subsystem::Audio, Subsystem::Net]
        );
    }
}
