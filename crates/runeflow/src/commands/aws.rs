use crate::context::AppContext;
use colored::Colorize;
use runeflow_cloud_aws::AwsCredentials;
use std::path::Path;

pub fn handle_create_credentials(
    ctx: &AppContext,
    access_key_id: Option<&str>,
    secret_access_key: Option<&str>,
    user_folder: Option<&Path>,
) -> anyhow::Result<()> {
    let credentials = AwsCredentials::new(access_key_id, secret_access_key, user_folder, &ctx.settings)?;

    if ctx.is_dry_run() {
        tracing::info!("[dry-run] would write {}", credentials.config_path().display());
        return Ok(());
    }

    let path = credentials.create_credentials()?;
    println!("{} {}", "✓ AWS credentials written to".green(), path.display());
    Ok(())
}
