use crate::context::AppContext;
use colored::Colorize;
use runeflow_npm::NpmCredentials;
use std::path::Path;

pub fn handle_create_credentials(
    ctx: &AppContext,
    registry_url: Option<&str>,
    auth_token: Option<&str>,
    user_folder: Option<&Path>,
) -> anyhow::Result<()> {
    let credentials = NpmCredentials::new(registry_url, auth_token, user_folder, &ctx.settings)?;

    if ctx.is_dry_run() {
        tracing::info!("[dry-run] would write {}", credentials.npmrc_path().display());
        return Ok(());
    }

    let path = credentials.create_credentials()?;
    println!(
        "{} {} ({})",
        "✓ npm credentials written to".green(),
        path.display(),
        credentials.registry_url()
    );
    Ok(())
}
