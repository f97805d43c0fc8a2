//! Id, name and profile-type conventions for saved versions.

use chrono::{DateTime, Duration, Local, Utc};

/// Canonical profile-type tag: trimmed and upper-cased for both CV and LM versions.
/// A blank tag falls back to `fallback`.
pub fn normalize_profile_type(raw: &str, fallback: &str) -> String {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        fallback.to_uppercase()
    } else {
        trimmed.to_uppercase()
    }
}

/// `<PREFIX>_<PROFILE>_<yyyyMMddHHmmssSSS>`. Whitespace inside the profile tag becomes `-`
/// so the id stays a single token.
pub fn version_id(prefix: &str, profile_type: &str, at: DateTime<Utc>) -> String {
    let segment = profile_type.split_whitespace().collect::<Vec<_>>().join("-");
    format!("{prefix}_{segment}_{}", at.format("%Y%m%d%H%M%S%3f"))
}

/// Returns an id not present in `taken`, bumping the millisecond stamp on collision.
pub fn unique_version_id(
    prefix: &str,
    profile_type: &str,
    at: DateTime<Utc>,
    taken: &[&str],
) -> String {
    let mut stamp = at;
    loop {
        let id = version_id(prefix, profile_type, stamp);
        if !taken.contains(&id.as_str()) {
            return id;
        }
        stamp += Duration::milliseconds(1);
    }
}

/// `dd/mm/yyyy HHhMM` in the server's local time zone.
pub fn format_date_with_time(at: DateTime<Utc>) -> String {
    at.with_timezone(&Local).format("%d/%m/%Y %Hh%M").to_string()
}

/// Default display name: `"DEV - 03/12/2025 10h22"`.
pub fn default_version_name(profile_type: &str, at: DateTime<Utc>) -> String {
    format!("{profile_type} - {}", format_date_with_time(at))
}

/// A refreshed `updatedAt` that is strictly later than `previous`.
pub fn touch(previous: DateTime<Utc>) -> DateTime<Utc> {
    let now = Utc::now();
    if now > previous {
        now
    } else {
        previous + Duration::milliseconds(1)
    }
}
