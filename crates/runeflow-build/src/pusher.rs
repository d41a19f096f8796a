use crate::defaults::DefaultsResolver;
use crate::descriptor::{self, ImageTarget, validate_tag};
use crate::error::{PushError, PushFailure, PushResult, PushStep};
use futures_util::stream::{self, StreamExt};
use runeflow_core::{CommandError, CommandRunner, shell_quote};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PushOptions {
    /// `None` falls back to the `DockerRegistry` parameter; `Some("")` pushes
    /// without a registry prefix.
    pub registry: Option<String>,
    /// Additional tags published for every target
    pub extra_tags: Vec<String>,
    pub concurrency: usize,
}

impl Default for PushOptions {
    fn default() -> Self {
        Self {
            registry: None,
            extra_tags: Vec::new(),
            concurrency: 1,
        }
    }
}

/// References that were published, in attempt order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PushReport {
    pub pushed: Vec<String>,
}

/// One reference to publish, taken from a local image.
#[derive(Debug, Clone, PartialEq, Eq)]
struct PushJob {
    local: ImageTarget,
    reference: String,
}

/// Tags and pushes every target of a descriptor.
///
/// Pushes are best-effort: a failing reference is recorded and the remaining
/// ones are still attempted.
pub struct ImagePusher<R> {
    runner: R,
    defaults: DefaultsResolver,
}

impl<R: CommandRunner> ImagePusher<R> {
    pub fn new(runner: R, defaults: DefaultsResolver) -> Self {
        Self { runner, defaults }
    }

    pub async fn push(&self, raw: Option<&str>, options: &PushOptions) -> PushResult<PushReport> {
        let resolved = descriptor::resolve(raw, &self.defaults)?;
        let registry = self.registry(options);

        let mut jobs = Vec::new();
        for target in resolved.group.targets() {
            for extra in &options.extra_tags {
                validate_tag(&target.name, extra)?;
            }
            jobs.extend(push_jobs(target, registry.as_deref(), &options.extra_tags));
        }

        if jobs.is_empty() {
            return Ok(PushReport::default());
        }

        match &registry {
            Some(registry) => tracing::info!("Pushing {} reference(s) to {}", jobs.len(), registry),
            None => tracing::info!("Pushing {} reference(s)", jobs.len()),
        }

        let attempted = jobs.len();
        let results: Vec<std::result::Result<String, PushFailure>> = stream::iter(jobs)
            .map(|job| self.push_job(job))
            .buffered(options.concurrency.max(1))
            .collect()
            .await;

        let mut report = PushReport::default();
        let mut failures = Vec::new();
        for result in results {
            match result {
                Ok(reference) => report.pushed.push(reference),
                Err(failure) => {
                    tracing::warn!("Push failed: {}", failure);
                    failures.push(failure);
                }
            }
        }

        if failures.is_empty() {
            Ok(report)
        } else {
            Err(PushError::Aggregate {
                failures,
                attempted,
            })
        }
    }

    /// `docker tag <source> <target>`
    pub async fn tag(&self, source: &str, target: &str) -> std::result::Result<(), CommandError> {
        let command = format!("docker tag {} {}", shell_quote(source), shell_quote(target));
        self.runner
            .run(&command, &format!("Tagging {} as {}", source, target))
            .await?;
        Ok(())
    }

    async fn push_job(&self, job: PushJob) -> std::result::Result<String, PushFailure> {
        let local = job.local.to_string();

        if local != job.reference {
            self.tag(&local, &job.reference)
                .await
                .map_err(|source| PushFailure {
                    reference: job.reference.clone(),
                    step: PushStep::Tag,
                    source,
                })?;
        }

        let command = format!("docker push {}", shell_quote(&job.reference));
        self.runner
            .run(&command, &format!("Pushing {}", job.reference))
            .await
            .map_err(|source| PushFailure {
                reference: job.reference.clone(),
                step: PushStep::Push,
                source,
            })?;

        Ok(job.reference)
    }

    fn registry(&self, options: &PushOptions) -> Option<String> {
        options
            .registry
            .clone()
            .or_else(|| self.defaults.default_registry())
            .map(|registry| registry.trim().trim_end_matches('/').to_string())
            .filter(|registry| !registry.is_empty())
    }
}

fn push_jobs(target: &ImageTarget, registry: Option<&str>, extra_tags: &[String]) -> Vec<PushJob> {
    let mut tags = vec![target.tag.as_str()];
    for extra in extra_tags {
        if !tags.contains(&extra.as_str()) {
            tags.push(extra);
        }
    }

    tags.into_iter()
        .map(|tag| {
            let reference = match registry {
                Some(registry) => format!("{}/{}:{}", registry, target.name, tag),
                None => format!("{}:{}", target.name, tag),
            };
            PushJob {
                local: target.clone(),
                reference,
            }
        })
        .collect()
}
