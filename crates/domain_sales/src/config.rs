//! Pipeline configuration

use serde::Deserialize;

use core_kernel::CoreError;

use crate::access::Role;
use crate::engine::StagePolicy;

/// Pipeline service configuration
///
/// Loaded from `PIPELINE_*` environment variables; every key is optional.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// `strict` (single step) or `lenient` (forward jumps)
    pub stage_policy: StagePolicy,
    /// Refuse leaving the quote stage without a selected quote
    pub require_selected_quote: bool,
    /// Lowest role allowed to import a process into a policy
    pub import_role_floor: Role,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            stage_policy: StagePolicy::Strict,
            require_selected_quote: true,
            import_role_floor: Role::Admin,
        }
    }
}

impl PipelineConfig {
    /// Loads configuration from the process environment
    pub fn from_env() -> Result<Self, CoreError> {
        Self::from_environment(config::Environment::with_prefix("PIPELINE"))
    }

    /// Loads configuration from an explicit environment source
    pub fn from_environment(environment: config::Environment) -> Result<Self, CoreError> {
        config::Config::builder()
            .add_source(environment.try_parsing(true))
            .build()
            .and_then(|settings| settings.try_deserialize())
            .map_err(|e| CoreError::configuration(e.to_string()))
    }
}
