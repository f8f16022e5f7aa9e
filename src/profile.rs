use std::path::Path;

use anyhow::Context;
use tracing::info;

use crate::models::Profile;

pub fn parse_profile(json: &str) -> anyhow::Result<Profile> {
    let profile: Profile = serde_json::from_str(json).context("profile is not valid JSON")?;
    Ok(profile)
}

/// Reads a previously fetched profile document from disk.
pub fn load_profile(path: &Path) -> anyhow::Result<Profile> {
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read profile {}", path.display()))?;
    let profile = parse_profile(&raw).with_context(|| format!("in {}", path.display()))?;

    info!(
        name = %profile.name,
        activities = profile.activities.len(),
        repositories = profile.github_repositories.len(),
        "loaded profile"
    );
    Ok(profile)
}
