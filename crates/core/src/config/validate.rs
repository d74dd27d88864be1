use super::{types::Config, ConfigError};
use crate::resolver::Tool;

/// Validate configuration
/// Currently validates:
/// - Every tool has a binary name and somewhere to look for it
/// - The format query timeout is not 0
/// - A user agent is set
pub fn validate_config(config: &Config) -> Result<(), ConfigError> {
    for tool in Tool::all() {
        let spec = config.tools.spec(*tool);
        if spec.binary_name.trim().is_empty() {
            return Err(ConfigError::ValidationError(format!(
                "tools.{}.binary_name cannot be empty",
                tool
            )));
        }
        if spec.candidates.is_empty() && !spec.search_system_path {
            return Err(ConfigError::ValidationError(format!(
                "tools.{} has no candidates and system PATH search is disabled",
                tool
            )));
        }
    }

    if config.download.format_query_timeout_secs == 0 {
        return Err(ConfigError::ValidationError(
            "download.format_query_timeout_secs cannot be 0".to_string(),
        ));
    }

    if config.download.user_agent.trim().is_empty() {
        return Err(ConfigError::ValidationError(
            "download.user_agent cannot be empty".to_string(),
        ));
    }

    Ok(())
}
