use crate::defaults::DefaultsResolver;
use crate::descriptor::{self, ImageTarget};
use crate::error::{BuildError, BuildResult};
use futures_util::stream::{self, StreamExt, TryStreamExt};
use runeflow_core::{CommandRunner, shell_quote};

const SENSITIVE_PATTERNS: [&str; 5] = ["password", "token", "secret", "api_key", "private_key"];

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildOptions {
    pub build_args: Vec<(String, String)>,
    pub no_cache: bool,
    /// Always pull newer base images
    pub pull: bool,
    pub context: String,
    /// Builds running at once; `0` is treated as `1`
    pub concurrency: usize,
}

impl Default for BuildOptions {
    fn default() -> Self {
        Self {
            build_args: Vec::new(),
            no_cache: false,
            pull: true,
            context: ".".to_string(),
            concurrency: 1,
        }
    }
}

/// A build file whose targets were built.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuiltGroup {
    pub build_file: String,
    pub targets: Vec<ImageTarget>,
}

/// Builds every group of a descriptor with one `docker build` per build file.
pub struct ImageBuilder<R> {
    runner: R,
    defaults: DefaultsResolver,
}

impl<R: CommandRunner> ImageBuilder<R> {
    pub fn new(runner: R, defaults: DefaultsResolver) -> Self {
        Self { runner, defaults }
    }

    /// Resolves `raw` and builds each group.
    ///
    /// Groups are started in order. The first failure stops the build and
    /// drops any build still running.
    pub async fn build(
        &self,
        raw: Option<&str>,
        options: &BuildOptions,
    ) -> BuildResult<Vec<BuiltGroup>> {
        let resolved = descriptor::resolve(raw, &self.defaults)?;
        tracing::debug!(
            "Resolved {} build file(s) from {:?} descriptor",
            resolved.group.len(),
            resolved.source
        );

        for (key, _) in &options.build_args {
            warn_if_sensitive(key);
        }

        let groups: Vec<BuiltGroup> = resolved
            .group
            .iter()
            .map(|(build_file, targets)| BuiltGroup {
                build_file: build_file.to_string(),
                targets: targets.to_vec(),
            })
            .collect();

        stream::iter(groups)
            .map(|group| self.build_group(group, options))
            .buffered(options.concurrency.max(1))
            .try_collect()
            .await
    }

    async fn build_group(&self, group: BuiltGroup, options: &BuildOptions) -> BuildResult<BuiltGroup> {
        let command = build_command(&group.build_file, &group.targets, options);
        let description = format!(
            "Building {} from {}",
            join_targets(&group.targets),
            group.build_file
        );

        self.runner
            .run(&command, &description)
            .await
            .map_err(|source| BuildError::BuildFailed {
                build_file: group.build_file.clone(),
                source,
            })?;

        tracing::info!("Successfully built: {}", join_targets(&group.targets));
        Ok(group)
    }
}

/// `docker build -f <file> -t <n:t>... [--no-cache] [--pull] [--build-arg k=v]... <context>`
pub fn build_command(build_file: &str, targets: &[ImageTarget], options: &BuildOptions) -> String {
    let mut args = vec![
        "docker".to_string(),
        "build".to_string(),
        "-f".to_string(),
        shell_quote(build_file),
    ];

    for target in targets {
        args.push("-t".to_string());
        args.push(shell_quote(&target.to_string()));
    }
    if options.no_cache {
        args.push("--no-cache".to_string());
    }
    if options.pull {
        args.push("--pull".to_string());
    }
    for (key, value) in &options.build_args {
        args.push("--build-arg".to_string());
        args.push(shell_quote(&format!("{}={}", key, value)));
    }
    args.push(shell_quote(&options.context));

    args.join(" ")
}

/// Parses a `KEY=VALUE` build argument. The value may be empty.
pub fn parse_build_arg(raw: &str) -> BuildResult<(String, String)> {
    match raw.split_once('=') {
        Some((key, value)) if !key.trim().is_empty() => {
            Ok((key.trim().to_string(), value.to_string()))
        }
        _ => Err(BuildError::InvalidBuildArg(raw.to_string())),
    }
}

/// Build arguments end up in the image history.
fn warn_if_sensitive(key: &str) {
    let key_lower = key.to_lowercase();
    if SENSITIVE_PATTERNS.iter().any(|p| key_lower.contains(p)) {
        tracing::warn!(
            "Build argument '{}' may contain a secret. Build arguments are recorded in the image history; \
             use a secret mount instead.",
            key
        );
    }
}

fn join_targets(targets: &[ImageTarget]) -> String {
    targets
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}
