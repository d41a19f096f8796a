use runeflow_build::DefaultsResolver;
use runeflow_config::Settings;
use runeflow_core::{ParameterKey, ParameterProvider, ShellRunner, StaticParameters};
use std::sync::Arc;

/// Settings, parameters and runner shared by every command handler.
pub struct AppContext {
    pub settings: Settings,
    pub params: Arc<dyn ParameterProvider>,
    pub runner: ShellRunner,
}

impl AppContext {
    /// Reads the config file and environment once.
    pub fn load(dry_run: bool) -> anyhow::Result<Self> {
        let settings = runeflow_config::load_settings()?;
        let params = with_settings_fallbacks(runeflow_config::load_parameters(), &settings);

        for key in ParameterKey::ALL {
            tracing::debug!("{} = {:?}", key, params.parameter(key));
        }

        let dry_run = dry_run || settings.dry_run;
        let runner = if dry_run {
            ShellRunner::dry_run()
        } else {
            ShellRunner::new()
        };

        Ok(Self {
            settings,
            params: Arc::new(params),
            runner,
        })
    }

    pub fn is_dry_run(&self) -> bool {
        self.runner.is_dry_run()
    }

    pub fn defaults(&self) -> DefaultsResolver {
        DefaultsResolver::new(self.params.clone())
    }
}

/// Fills parameters the environment left unset from the settings file.
fn with_settings_fallbacks(mut params: StaticParameters, settings: &Settings) -> StaticParameters {
    if params.parameter(ParameterKey::DockerRegistry).is_none() {
        if let Some(registry) = settings.docker.registry.as_deref().filter(|r| !r.trim().is_empty()) {
            params.set(ParameterKey::DockerRegistry, registry);
        }
    }
    params
}

/// `--jobs` value; `0` means available parallelism.
pub fn concurrency(jobs: usize) -> usize {
    if jobs == 0 {
        std::thread::available_parallelism()
            .map(|n| n.get())
            .unwrap_or(1)
    } else {
        jobs
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn settings_with_registry(registry: &str) -> Settings {
        let mut settings = Settings::default();
        settings.docker.registry = Some(registry.to_string());
        settings
    }

    #[test]
    fn test_registry_falls_back_to_settings() {
        let params = with_settings_fallbacks(
            StaticParameters::new(),
            &settings_with_registry("reg.example.com"),
        );
        assert_eq!(
            params.parameter(ParameterKey::DockerRegistry).as_deref(),
            Some("reg.example.com")
        );
    }

    #[test]
    fn test_registry_parameter_wins_over_settings() {
        let params = with_settings_fallbacks(
            StaticParameters::new().with(ParameterKey::DockerRegistry, "ghcr.io/acme"),
            &settings_with_registry("reg.example.com"),
        );
        assert_eq!(
            params.parameter(ParameterKey::DockerRegistry).as_deref(),
            Some("ghcr.io/acme")
        );

        let params = with_settings_fallbacks(StaticParameters::new(), &settings_with_registry(" "));
        assert_eq!(params.parameter(ParameterKey::DockerRegistry), None);
    }

    #[test]
    fn test_concurrency() {
        assert_eq!(concurrency(3), 3);
        assert!(concurrency(0) >= 1);
    }
}
