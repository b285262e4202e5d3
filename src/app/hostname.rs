/// Treats a missing or whitespace-only hostname as unset.
pub fn normalize_hostname(hostname: Option<&str>) -> Option<String> {
    hostname
        .filter(|value| !value.trim().is_empty())
        .map(str::to_string)
}

pub fn local_hostname() -> Option<String> {
    let hostname = hostname::get().ok()?;
    normalize_hostname(hostname.to_str())
}

/// Uses the override when it is set, the machine name otherwise.
pub fn resolve_hostname(hostname_override: Option<&str>) -> Option<String> {
    normalize_hostname(hostname_override).or_else(local_hostname)
}
