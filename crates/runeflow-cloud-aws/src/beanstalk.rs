use crate::error::{AwsError, Result};
use runeflow_core::{CommandOutput, ContainerProvider, ParameterKey, ParameterProvider, shell_quote};
use std::path::Path;
use std::sync::Arc;

/// Image providing the `eb` CLI.
pub const EB_IMAGE: &str = "mini/eb-cli";

pub const DEFAULT_TIMEOUT_MINUTES: u32 = 60;

/// Host `~/.aws` mounted where the eb-cli image expects its profile.
pub fn aws_volume(home: &Path) -> String {
    format!("{}:/home/aws/.aws", home.join(".aws").display())
}

/// Parses `branch:environment|branch:environment` into ordered rules.
///
/// Fragments without exactly one `:` are skipped with a warning. A later rule
/// for the same branch replaces the earlier one.
pub fn resolve_pattern(pattern: &str) -> Vec<(String, String)> {
    let mut rules: Vec<(String, String)> = Vec::new();

    for fragment in pattern.split('|') {
        let tokens: Vec<&str> = fragment.split(':').collect();
        let &[branch, environment] = tokens.as_slice() else {
            tracing::warn!("Invalid pattern string fragment: '{}'", fragment);
            continue;
        };

        match rules.iter_mut().find(|(b, _)| b == branch) {
            Some(rule) => rule.1 = environment.to_string(),
            None => rules.push((branch.to_string(), environment.to_string())),
        }
    }

    rules
}

/// Deploys the current branch to the Elastic Beanstalk environment mapped to it.
pub struct ElasticBeanstalk<C> {
    container: C,
    params: Arc<dyn ParameterProvider>,
    default_pattern: Option<String>,
}

impl<C: ContainerProvider> ElasticBeanstalk<C> {
    /// `default_pattern` is the `EB_DEPLOYMENT_PATTERN_STRING` setting.
    pub fn new(
        container: C,
        params: Arc<dyn ParameterProvider>,
        default_pattern: Option<String>,
    ) -> Self {
        Self {
            container,
            params,
            default_pattern,
        }
    }

    /// Runs `init && eb deploy <environment> --timeout <minutes>`.
    pub async fn deploy(&self, pattern: Option<&str>, timeout: u32) -> Result<CommandOutput> {
        tracing::info!("Starting Elastic Beanstalk deployment");

        let environment = self.target_environment(pattern)?;
        tracing::debug!("Matching environment name: {}", environment);

        let command = format!(
            "init && eb deploy {} --timeout {}",
            shell_quote(&environment),
            timeout
        );
        let output = self
            .container
            .run(&command, &format!("Deploying to {}", environment))
            .await?;
        Ok(output)
    }

    /// Environment for the current branch, without deploying.
    pub fn target_environment(&self, pattern: Option<&str>) -> Result<String> {
        let pattern = pattern
            .or(self.default_pattern.as_deref())
            .filter(|p| !p.trim().is_empty())
            .ok_or(AwsError::MissingPattern)?;

        let rules = resolve_pattern(pattern);
        tracing::debug!("Using rules: {:?}", rules);

        let branch = self
            .params
            .parameter(ParameterKey::BranchName)
            .ok_or(AwsError::MissingBranch)?;
        tracing::debug!("Current branch name: {}", branch);

        rules
            .into_iter()
            .find(|(b, _)| *b == branch)
            .map(|(_, environment)| environment)
            .filter(|environment| !environment.is_empty())
            .ok_or(AwsError::NoMatchingEnvironment { branch })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use runeflow_core::testing::RecordingRunner;
    use runeflow_core::{DockerContainer, StaticParameters};

    fn eb(
        branch: Option<&str>,
        default_pattern: Option<&str>,
    ) -> (Arc<RecordingRunner>, ElasticBeanstalk<DockerContainer<Arc<RecordingRunner>>>) {
        let runner = Arc::new(RecordingRunner::new());
        let container = DockerContainer::new(EB_IMAGE, runner.clone())
            .with_volume(aws_volume(Path::new("/home/ci")));

        let mut params = StaticParameters::new();
        if let Some(branch) = branch {
            params.set(ParameterKey::BranchName, branch);
        }

        (
            runner,
            ElasticBeanstalk::new(
                container,
                Arc::new(params),
                default_pattern.map(str::to_string),
            ),
        )
    }

    #[test]
    fn test_resolve_pattern() {
        assert_eq!(
            resolve_pattern("master:prod|develop:staging"),
            vec![
                ("master".to_string(), "prod".to_string()),
                ("develop".to_string(), "staging".to_string()),
            ]
        );
    }

    #[test]
    fn test_resolve_pattern_skips_invalid_fragments() {
        assert_eq!(
            resolve_pattern("master:prod|broken|a:b:c|develop:staging|master:live"),
            vec![
                ("master".to_string(), "live".to_string()),
                ("develop".to_string(), "staging".to_string()),
            ]
        );
        assert!(resolve_pattern("").is_empty());
    }

    #[tokio::test]
    async fn test_deploy_matching_branch() {
        let (runner, eb) = eb(Some("develop"), None);
        eb.deploy(Some("master:prod|develop:staging"), DEFAULT_TIMEOUT_MINUTES)
            .await
            .unwrap();

        assert_eq!(
            runner.commands(),
            vec![
                "docker run --rm -v /home/ci/.aws:/home/aws/.aws mini/eb-cli \
                 sh -c 'init && eb deploy staging --timeout 60'"
            ]
        );
    }

    #[tokio::test]
    async fn test_deploy_uses_configured_pattern() {
        let (runner, eb) = eb(Some("master"), Some("master:prod"));
        eb.deploy(None, 15).await.unwrap();

        assert!(runner.commands()[0].ends_with("'init && eb deploy prod --timeout 15'"));
    }

    #[tokio::test]
    async fn test_deploy_without_pattern() {
        let (runner, eb) = eb(Some("master"), None);
        assert!(matches!(
            eb.deploy(None, 60).await,
            Err(AwsError::MissingPattern)
        ));
        assert!(runner.commands().is_empty());
    }

    #[tokio::test]
    async fn test_deploy_without_branch() {
        let (_, eb) = eb(None, Some("master:prod"));
        assert!(matches!(
            eb.deploy(None, 60).await,
            Err(AwsError::MissingBranch)
        ));
    }

    #[tokio::test]
    async fn test_deploy_unmapped_branch() {
        let (runner, eb) = eb(Some("feature-x"), Some("master:prod"));
        let err = eb.deploy(None, 60).await.unwrap_err();

        assert!(matches!(err, AwsError::NoMatchingEnvironment { ref branch } if branch == "feature-x"));
        assert!(runner.commands().is_empty());
    }

    #[test]
    fn test_aws_volume() {
        assert_eq!(
            aws_volume(Path::new("/root")),
            "/root/.aws:/home/aws/.aws"
        );
    }
}
