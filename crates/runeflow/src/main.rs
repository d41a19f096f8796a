mod commands;
mod context;

use clap::{Parser, Subcommand};
use context::AppContext;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "rune")]
#[command(about = "Build, push and deploy from CI with one command", long_about = None)]
struct Cli {
    /// Log commands instead of executing them
    #[arg(long, global = true)]
    dry_run: bool,

    /// More log output (-v debug, -vv trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Build, push and publish Docker images
    #[command(subcommand)]
    Docker(DockerCommands),
    /// Write the AWS credentials file
    #[command(subcommand)]
    Aws(AwsCommands),
    /// List and download S3 objects
    #[command(subcommand)]
    S3(S3Commands),
    /// Deploy to Elastic Beanstalk
    #[command(subcommand)]
    Elb(ElbCommands),
    /// Write npm registry credentials
    #[command(subcommand)]
    Npm(NpmCommands),
    /// Show version information
    Version,
}

#[derive(Subcommand)]
enum DockerCommands {
    /// Build images, one `docker build` per Dockerfile
    Build {
        /// Image descriptor, e.g. `api:v1,worker[docker/Dockerfile.worker]` or a JSON document
        descriptor: Option<String>,
        /// Build without cache
        #[arg(long)]
        no_cache: bool,
        /// Do not pull newer base images
        #[arg(long)]
        no_pull: bool,
        /// Build argument (KEY=VALUE), repeatable
        #[arg(long = "build-arg", value_name = "KEY=VALUE")]
        build_args: Vec<String>,
        /// Build context directory
        #[arg(long, default_value = ".")]
        context: String,
        /// Builds running at once (0: available parallelism)
        #[arg(short, long, default_value = "1")]
        jobs: usize,
    },
    /// Tag and push images to a registry
    Push {
        /// Image descriptor
        descriptor: Option<String>,
        /// Target registry (default: DOCKER_REGISTRY, empty: no prefix)
        #[arg(long)]
        registry: Option<String>,
        /// Additional tags to publish, comma separated
        #[arg(long, value_delimiter = ',')]
        tags: Vec<String>,
        /// Also publish the default tags (release version or commit hash)
        #[arg(long)]
        release_tags: bool,
        /// Pushes running at once (0: available parallelism)
        #[arg(short, long, default_value = "1")]
        jobs: usize,
    },
    /// Log in to a registry
    Login {
        #[arg(short, long)]
        username: Option<String>,
        #[arg(short, long)]
        password: Option<String>,
        #[arg(long)]
        registry: Option<String>,
    },
    /// Log out of a registry
    Logout {
        #[arg(long)]
        registry: Option<String>,
    },
    /// Show the default image name, tags and registry
    Defaults,
    /// Show how a descriptor resolves, without running anything
    Resolve {
        /// Image descriptor
        descriptor: Option<String>,
    },
}

#[derive(Subcommand)]
enum AwsCommands {
    /// Write the `eb-cli` profile to ~/.aws/config
    CreateCredentials {
        #[arg(long)]
        access_key_id: Option<String>,
        #[arg(long)]
        secret_access_key: Option<String>,
        /// Folder for the config file (default: ~/.aws)
        #[arg(long)]
        user_folder: Option<PathBuf>,
    },
}

#[derive(Subcommand)]
enum S3Commands {
    /// List a bucket
    List {
        bucket: String,
    },
    /// Download an object
    Get {
        /// Object URI (s3://bucket/key)
        uri: String,
        /// Local target (default: ./<last path segment>)
        target: Option<String>,
    },
}

#[derive(Subcommand)]
enum ElbCommands {
    /// Deploy the current branch to its mapped environment
    Deploy {
        /// `branch:environment|...` (default: EB_DEPLOYMENT_PATTERN_STRING)
        pattern: Option<String>,
        /// eb deploy timeout in minutes
        #[arg(long, default_value = "60")]
        timeout: u32,
    },
}

#[derive(Subcommand)]
enum NpmCommands {
    /// Write the auth token entry to ~/.npmrc
    CreateCredentials {
        #[arg(long)]
        registry_url: Option<String>,
        #[arg(long)]
        auth_token: Option<String>,
        /// Folder for .npmrc (default: home directory)
        #[arg(long)]
        user_folder: Option<PathBuf>,
    },
}

fn init_tracing(verbose: u8) {
    let default_level = match verbose {
        0 => "info",
        1 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_env("RUNEFLOW_LOG")
        .unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    // Version needs no settings
    if matches!(cli.command, Commands::Version) {
        println!("runeflow {}", env!("CARGO_PKG_VERSION"));
        return Ok(());
    }

    let ctx = AppContext::load(cli.dry_run)?;

    match cli.command {
        Commands::Docker(command) => match command {
            DockerCommands::Build {
                descriptor,
                no_cache,
                no_pull,
                build_args,
                context,
                jobs,
            } => {
                commands::docker::handle_build(
                    &ctx,
                    descriptor.as_deref(),
                    commands::docker::BuildArgs {
                        no_cache,
                        pull: !no_pull,
                        build_args,
                        context,
                        jobs,
                    },
                )
                .await
            }
            DockerCommands::Push {
                descriptor,
                registry,
                tags,
                release_tags,
                jobs,
            } => {
                commands::docker::handle_push(
                    &ctx,
                    descriptor.as_deref(),
                    commands::docker::PushArgs {
                        registry,
                        tags,
                        release_tags,
                        jobs,
                    },
                )
                .await
            }
            DockerCommands::Login {
                username,
                password,
                registry,
            } => {
                commands::docker::handle_login(
                    &ctx,
                    username.as_deref(),
                    password.as_deref(),
                    registry.as_deref(),
                )
                .await
            }
            DockerCommands::Logout { registry } => {
                commands::docker::handle_logout(&ctx, registry.as_deref()).await
            }
            DockerCommands::Defaults => commands::docker::handle_defaults(&ctx),
            DockerCommands::Resolve { descriptor } => {
                commands::docker::handle_resolve(&ctx, descriptor.as_deref())
            }
        },
        Commands::Aws(AwsCommands::CreateCredentials {
            access_key_id,
            secret_access_key,
            user_folder,
        }) => commands::aws::handle_create_credentials(
            &ctx,
            access_key_id.as_deref(),
            secret_access_key.as_deref(),
            user_folder.as_deref(),
        ),
        Commands::S3(command) => match command {
            S3Commands::List { bucket } => commands::s3::handle_list(&ctx, &bucket).await,
            S3Commands::Get { uri, target } => {
                commands::s3::handle_get(&ctx, &uri, target.as_deref()).await
            }
        },
        Commands::Elb(ElbCommands::Deploy { pattern, timeout }) => {
            commands::elb::handle_deploy(&ctx, pattern.as_deref(), timeout).await
        }
        Commands::Npm(NpmCommands::CreateCredentials {
            registry_url,
            auth_token,
            user_folder,
        }) => commands::npm::handle_create_credentials(
            &ctx,
            registry_url.as_deref(),
            auth_token.as_deref(),
            user_folder.as_deref(),
        ),
        Commands::Version => unreachable!("Version is handled before settings are loaded"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_push_tags_are_comma_separated() {
        let cli = Cli::try_parse_from(["rune", "docker", "push", "app", "--tags", "latest,stable"]).unwrap();
        match cli.command {
            Commands::Docker(DockerCommands::Push { tags, .. }) => {
                assert_eq!(tags, vec!["latest", "stable"]);
            }
            _ => panic!("expected docker push"),
        }
    }

    #[test]
    fn test_global_flags_after_subcommand() {
        let cli = Cli::try_parse_from(["rune", "docker", "build", "--dry-run", "-vv"]).unwrap();
        assert!(cli.dry_run);
        assert_eq!(cli.verbose, 2);
    }
}
