use crate::context::AppContext;
use anyhow::Context;
use colored::Colorize;
use runeflow_cloud_aws::{EB_IMAGE, ElasticBeanstalk, aws_volume};
use runeflow_core::DockerContainer;

pub async fn handle_deploy(ctx: &AppContext, pattern: Option<&str>, timeout: u32) -> anyhow::Result<()> {
    let home = ctx
        .settings
        .home()
        .context("Home directory could not be determined; set HOME")?;

    let container = DockerContainer::new(EB_IMAGE, ctx.runner.clone()).with_volume(aws_volume(&home));
    let eb = ElasticBeanstalk::new(
        container,
        ctx.params.clone(),
        ctx.settings.elastic_beanstalk.deployment_pattern.clone(),
    );

    let environment = eb.target_environment(pattern)?;
    println!("{} {}", "Deploying to".blue(), environment.cyan().bold());
    eb.deploy(pattern, timeout).await?;
    println!("{}", "✓ Deployment complete".green().bold());
    Ok(())
}
