use crate::context::{AppContext, concurrency};
use colored::Colorize;
use runeflow_build::{
    BuildOptions, DescriptorSource, ImageBuilder, ImagePusher, LoginRequest, PushError,
    PushOptions, RegistryAuth, parse_build_arg, resolve,
};

pub struct BuildArgs {
    pub no_cache: bool,
    pub pull: bool,
    pub build_args: Vec<String>,
    pub context: String,
    pub jobs: usize,
}

pub struct PushArgs {
    pub registry: Option<String>,
    pub tags: Vec<String>,
    pub release_tags: bool,
    pub jobs: usize,
}

pub async fn handle_build(
    ctx: &AppContext,
    descriptor: Option<&str>,
    args: BuildArgs,
) -> anyhow::Result<()> {
    let mut build_args = Vec::new();
    for raw in &args.build_args {
        match parse_build_arg(raw) {
            Ok(arg) => build_args.push(arg),
            Err(e) => {
                eprintln!("  {} {}", "✗".red().bold(), e);
                return Err(anyhow::anyhow!("Invalid build arguments"));
            }
        }
    }

    let options = BuildOptions {
        build_args,
        no_cache: args.no_cache,
        pull: args.pull,
        context: args.context,
        concurrency: concurrency(args.jobs),
    };

    println!("{}", "Building images...".blue());
    let builder = ImageBuilder::new(ctx.runner.clone(), ctx.defaults());

    match builder.build(descriptor, &options).await {
        Ok(groups) => {
            for group in &groups {
                println!("  {} {}", "▶".cyan(), group.build_file.bold());
                for target in &group.targets {
                    println!("    {} {}", "✓".green(), target.to_string().cyan());
                }
            }
            println!("{}", "✓ Build complete".green().bold());
            Ok(())
        }
        Err(e) => {
            eprintln!("  {} {}", "✗".red().bold(), e.user_message());
            Err(anyhow::anyhow!("Build failed"))
        }
    }
}

pub async fn handle_push(
    ctx: &AppContext,
    descriptor: Option<&str>,
    args: PushArgs,
) -> anyhow::Result<()> {
    let mut extra_tags = args.tags;
    if args.release_tags {
        extra_tags.extend(ctx.defaults().default_tags()?);
    }

    let options = PushOptions {
        registry: args.registry,
        extra_tags,
        concurrency: concurrency(args.jobs),
    };

    println!("{}", "Pushing images...".blue());
    let pusher = ImagePusher::new(ctx.runner.clone(), ctx.defaults());

    match pusher.push(descriptor, &options).await {
        Ok(report) => {
            for reference in &report.pushed {
                println!("  {} {}", "✓".green(), reference.cyan());
            }
            println!("{}", "✓ Push complete".green().bold());
            Ok(())
        }
        Err(PushError::Aggregate {
            failures,
            attempted,
        }) => {
            for failure in &failures {
                eprintln!("  {} {}", "✗".red().bold(), failure);
            }
            Err(anyhow::anyhow!(
                "{} of {} image reference(s) failed to push",
                failures.len(),
                attempted
            ))
        }
        Err(e) => {
            eprintln!("  {} {}", "✗".red().bold(), e);
            Err(anyhow::anyhow!("Push failed"))
        }
    }
}

pub async fn handle_login(
    ctx: &AppContext,
    username: Option<&str>,
    password: Option<&str>,
    registry: Option<&str>,
) -> anyhow::Result<()> {
    let auth = RegistryAuth::new(ctx.runner.clone(), ctx.settings.docker.clone());
    auth.login(LoginRequest {
        username,
        password,
        registry,
    })
    .await?;
    println!("{}", "✓ Login succeeded".green());
    Ok(())
}

pub async fn handle_logout(ctx: &AppContext, registry: Option<&str>) -> anyhow::Result<()> {
    let auth = RegistryAuth::new(ctx.runner.clone(), ctx.settings.docker.clone());
    auth.logout(registry).await?;
    println!("{}", "✓ Logged out".green());
    Ok(())
}

pub fn handle_defaults(ctx: &AppContext) -> anyhow::Result<()> {
    let defaults = ctx.defaults();
    let unset = || "(unset)".dimmed().to_string();

    println!(
        "image:    {}",
        defaults
            .default_image_name()
            .map(|name| name.cyan().to_string())
            .unwrap_or_else(|_| unset())
    );
    println!(
        "tags:     {}",
        defaults
            .default_tags()
            .map(|tags| tags.join(", ").cyan().to_string())
            .unwrap_or_else(|_| unset())
    );
    println!(
        "registry: {}",
        defaults
            .default_registry()
            .map(|registry| registry.cyan().to_string())
            .unwrap_or_else(unset)
    );
    Ok(())
}

pub fn handle_resolve(ctx: &AppContext, descriptor: Option<&str>) -> anyhow::Result<()> {
    let resolved = match resolve(descriptor, &ctx.defaults()) {
        Ok(resolved) => resolved,
        Err(e) => {
            eprintln!("  {} {}", "✗".red().bold(), e);
            return Err(anyhow::anyhow!("Invalid descriptor"));
        }
    };

    let source = match resolved.source {
        DescriptorSource::Document => "document",
        DescriptorSource::Grammar => "string",
        DescriptorSource::Default => "default image name",
    };
    eprintln!("{} {}", "Resolved from".dimmed(), source.dimmed());
    println!("{}", serde_json::to_string_pretty(&resolved.group)?);
    Ok(())
}
