//! CI environment detection.
//!
//! Derives the [`ParameterKey`] values from CircleCI or GitHub Actions
//! variables. `RUNEFLOW_*` variables override whatever the CI provides.

use runeflow_core::{ParameterKey, StaticParameters};

const SHORT_HASH_LEN: usize = 8;

/// CI system the parameters were read from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CiProvider {
    CircleCi,
    GithubActions,
    Local,
}

impl CiProvider {
    pub fn detect<F>(lookup: &F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        if lookup("CIRCLECI").is_some_and(|v| !v.is_empty()) {
            CiProvider::CircleCi
        } else if lookup("GITHUB_ACTIONS").is_some_and(|v| v == "true") {
            CiProvider::GithubActions
        } else {
            CiProvider::Local
        }
    }
}

/// Builds the parameter set for the current CI run.
pub fn ci_parameters<F>(lookup: F) -> StaticParameters
where
    F: Fn(&str) -> Option<String>,
{
    let get = |key: &str| lookup(key).filter(|v| !v.is_empty());
    let provider = CiProvider::detect(&lookup);
    tracing::debug!("Detected CI provider: {:?}", provider);

    let (project, branch, sha, tag) = match provider {
        CiProvider::CircleCi => (
            match (get("CIRCLE_PROJECT_USERNAME"), get("CIRCLE_PROJECT_REPONAME")) {
                (Some(user), Some(repo)) => Some(format!("{}/{}", user, repo)),
                (None, Some(repo)) => Some(repo),
                _ => None,
            },
            get("CIRCLE_BRANCH"),
            get("CIRCLE_SHA1"),
            get("CIRCLE_TAG"),
        ),
        CiProvider::GithubActions => {
            let is_tag = get("GITHUB_REF_TYPE").as_deref() == Some("tag");
            (
                get("GITHUB_REPOSITORY"),
                get("GITHUB_HEAD_REF").or_else(|| {
                    if is_tag {
                        None
                    } else {
                        get("GITHUB_REF_NAME")
                    }
                }),
                get("GITHUB_SHA"),
                if is_tag { get("GITHUB_REF_NAME") } else { None },
            )
        }
        CiProvider::Local => (None, None, None, None),
    };

    let project = get("RUNEFLOW_PROJECT_NAME").or(project);
    let branch = get("RUNEFLOW_BRANCH_NAME").or(branch);
    let sha = get("RUNEFLOW_COMMIT_SHA").or(sha);
    let tag = get("RUNEFLOW_RELEASE_TAG").or(tag);

    let mut params = StaticParameters::new();
    if let Some(project) = project {
        params.set(ParameterKey::ProjectName, project);
    }
    if let Some(branch) = branch {
        params.set(ParameterKey::BranchName, branch);
    }
    if let Some(sha) = sha {
        params.set(
            ParameterKey::ShortHash,
            sha.chars().take(SHORT_HASH_LEN).collect::<String>(),
        );
    }

    match tag.as_deref().and_then(release_version) {
        Some(version) => {
            params.set(ParameterKey::IsRelease, "true");
            params.set(ParameterKey::ReleaseVersion, version);
        }
        None => params.set(ParameterKey::IsRelease, "false"),
    }

    if let Some(registry) = get("DOCKER_REGISTRY") {
        params.set(ParameterKey::DockerRegistry, registry);
    }

    params
}

/// Extracts the version from a release tag.
///
/// # Examples
/// - `release-1.2.3` -> `1.2.3`
/// - `v2.0.0` -> `2.0.0`
/// - `nightly` -> not a release
pub fn release_version(tag: &str) -> Option<String> {
    if let Some(version) = tag.strip_prefix("release-") {
        return (!version.is_empty()).then(|| version.to_string());
    }

    tag.strip_prefix('v')
        .filter(|rest| rest.starts_with(|c: char| c.is_ascii_digit()))
        .map(|rest| rest.to_string())
}
