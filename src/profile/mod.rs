use crate::error::{Error, Result};
use crate::report::classify::DirectiveSet;
use std::os::unix::fs::PermissionsExt;
use std::path::{Path, PathBuf};

pub const SCRIPT_FILE: &str = "script.sh";
pub const CONF_FILE: &str = "tuned.conf";

const CONF_PROLOG: &str = "# Automatically generated by powertop2tuned tool\n\n";
const CONF_EPILOG: &str = "\n[powertop_script]\ntype=script\nreplace=1\nscript=script.sh\n";

/// Render script.sh around the `start()` body produced by the parser.
pub fn render_script(start_body: &str) -> String {
    format!(
        r#"#!/bin/sh

. /usr/lib/tuned/functions

start() {{
{}
	return 0
}}

stop() {{
{}
	return 0
}}

process $@
"#,
        start_body, ""
    )
}

/// Render tuned.conf. `include` is the profile to merge with, `None` for a
/// standalone profile.
pub fn render_tuned_conf(include: Option<&str>, directives: &DirectiveSet) -> String {
    let mut conf = String::from(CONF_PROLOG);
    if let Some(profile) = include {
        conf.push_str(&format!("[main]\ninclude={}\n\n", profile));
    }
    for (_, block) in directives.iter() {
        conf.push_str(block);
        conf.push('\n');
    }
    conf.push_str(CONF_EPILOG);
    conf
}

/// Work out the profile directory from the command line.
///
/// `output` defaults to `base`; a profile name is appended as a
/// subdirectory. Returns `None` when neither a name nor an output
/// directory was given.
pub fn resolve_output_dir(
    profile: Option<&str>,
    output: Option<&Path>,
    base: &Path,
) -> Option<PathBuf> {
    match (profile, output) {
        (None, None) => None,
        (None, Some(dir)) => Some(dir.to_path_buf()),
        (Some(name), dir) => Some(dir.unwrap_or(base).join(name)),
    }
}

/// Files written for one profile.
#[derive(Debug, Clone)]
pub struct WrittenProfile {
    pub script: PathBuf,
    pub conf: PathBuf,
}

/// Writes script.sh and tuned.conf into a profile directory.
#[derive(Debug, Clone)]
pub struct ProfileWriter {
    dir: PathBuf,
    force: bool,
}

impl ProfileWriter {
    pub fn new(dir: impl Into<PathBuf>, force: bool) -> Self {
        Self {
            dir: dir.into(),
            force,
        }
    }

    /// Refuse to reuse an existing directory unless forced.
    pub fn check(&self) -> Result<()> {
        if self.dir.exists() && !self.force {
            return Err(Error::OutputExists {
                path: self.dir.clone(),
            });
        }
        Ok(())
    }

    pub fn write(&self, script: &str, conf: &str) -> Result<WrittenProfile> {
        self.check()?;
        std::fs::create_dir_all(&self.dir).map_err(|e| Error::ProfileWrite {
            path: self.dir.clone(),
            source: e,
        })?;

        let script_path = self.dir.join(SCRIPT_FILE);
        write_file(&script_path, script)?;
        std::fs::set_permissions(&script_path, std::fs::Permissions::from_mode(0o755)).map_err(
            |e| Error::ProfileWrite {
                path: script_path.clone(),
                source: e,
            },
        )?;

        let conf_path = self.dir.join(CONF_FILE);
        write_file(&conf_path, conf)?;

        Ok(WrittenProfile {
            script: script_path,
            conf: conf_path,
        })
    }
}

fn write_file(path: &Path, content: &str) -> Result<()> {
    std::fs::write(path, content).map_err(|e| Error::ProfileWrite {
        path: path.to_path_buf(),
        source: e,
    })
}
