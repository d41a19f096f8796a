use crate::error::{DescriptorError, DescriptorResult};
use runeflow_core::{ParameterKey, ParameterProvider, normalize};
use std::sync::Arc;

/// Derives default image name, tags and registry from the parameter provider.
#[derive(Clone)]
pub struct DefaultsResolver {
    params: Arc<dyn ParameterProvider>,
}

impl DefaultsResolver {
    pub fn new(params: Arc<dyn ParameterProvider>) -> Self {
        Self { params }
    }

    pub fn params(&self) -> &dyn ParameterProvider {
        self.params.as_ref()
    }

    /// `normalize(ProjectName)`.
    pub fn default_image_name(&self) -> DescriptorResult<String> {
        let project = self.require(ParameterKey::ProjectName)?;
        let name = normalize(&project);
        if name.is_empty() {
            return Err(DescriptorError::InvalidName { name: project });
        }
        Ok(name)
    }

    /// `[ReleaseVersion]` for releases, `[normalize(ShortHash)]` otherwise.
    pub fn default_tags(&self) -> DescriptorResult<Vec<String>> {
        let tag = if self.params.flag(ParameterKey::IsRelease) {
            self.require(ParameterKey::ReleaseVersion)?
        } else {
            normalize(&self.require(ParameterKey::ShortHash)?)
        };
        Ok(vec![tag])
    }

    pub fn default_registry(&self) -> Option<String> {
        self.params.parameter(ParameterKey::DockerRegistry)
    }

    fn require(&self, key: ParameterKey) -> DescriptorResult<String> {
        self.params
            .parameter(key)
            .ok_or_else(|| DescriptorError::MissingParameter {
                key: key.to_string(),
            })
    }
}

impl std::fmt::Debug for DefaultsResolver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DefaultsResolver").finish_non_exhaustive()
    }
}
