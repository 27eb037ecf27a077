const ACTIVE_PREFIX: &str = "Current active profile: ";

/// Name of the tuned profile currently active, or `"unknown"`.
pub fn active_profile() -> String {
    let output = std::process::Command::new("tuned-adm")
        .arg("active")
        .output();

    match output {
        Ok(o) => parse_active_profile(&String::from_utf8_lossy(&o.stdout)),
        Err(e) => {
            tracing::debug!("tuned-adm not available: {}", e);
            "unknown".to_string()
        }
    }
}

fn parse_active_profile(stdout: &str) -> String {
    stdout
        .strip_prefix(ACTIVE_PREFIX)
        .and_then(|rest| rest.lines().next())
        .map(str::trim)
        .filter(|name| !name.is_empty())
        .unwrap_or("unknown")
        .to_string()
}
