use crate::context::AppContext;
use colored::Colorize;
use runeflow_cloud_aws::{S3_IMAGE, S3Handler};
use runeflow_core::DockerContainer;

fn handler(ctx: &AppContext) -> anyhow::Result<S3Handler<DockerContainer<runeflow_core::ShellRunner>>> {
    let container = DockerContainer::new(S3_IMAGE, ctx.runner.clone());
    Ok(S3Handler::new(container, None, None, &ctx.settings)?)
}

pub async fn handle_list(ctx: &AppContext, bucket: &str) -> anyhow::Result<()> {
    let output = handler(ctx)?.list(bucket).await?;
    print!("{}", output.stdout);
    Ok(())
}

pub async fn handle_get(ctx: &AppContext, uri: &str, target: Option<&str>) -> anyhow::Result<()> {
    let target = handler(ctx)?.get(uri, target).await?;
    println!("{} {}", "✓ Downloaded to".green(), target);
    Ok(())
}
