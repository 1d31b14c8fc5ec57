use log::warn;

use crate::core::validation::NamingRules;
use crate::error::CreatorError;

pub const DEFAULT_SITE: &str = "https://nfa.shotgunstudio.com";
pub const DEFAULT_SCRIPT_NAME: &str = "project_creation_V2";
pub const DEFAULT_CONFIG_REPOSITORY: &str =
    "https://github.com/nfa-vfxim/nfa-shotgun-configuration.git";
pub const DEFAULT_PAGE_SIZE: u32 = 500;
/// Largest `page[size]` the ShotGrid REST API serves.
pub const MAX_PAGE_SIZE: u32 = 500;

pub fn init() {
    dotenv::dotenv().ok();
}

/**
 * Get an environment variable or a default value
 *
 * # Arguments
 * @param key: &str - The environment variable key
 * @param default: &str - The default value
 *
 * # Returns
 * @return String - The value of the environment variable or the default value
 */
pub fn get_env_var_or_default(key: &str, default: &str) -> String {
    match std::env::var(key) {
        Ok(val) => val,
        Err(_) => {
            warn!("{} not set, using default value: {}", key, default);
            default.to_string()
        }
    }
}

/**
 * Get a required environment variable
 *
 * # Returns
 * @return Result<String, CreatorError> - The value or a settings error naming the key
 */
pub fn get_env_or_error(key: &str) -> Result<String, CreatorError> {
    match std::env::var(key) {
        Ok(val) if !val.trim().is_empty() => Ok(val),
        _ => Err(CreatorError::Settings(format!(
            "{} not found in environment or .env file",
            key
        ))),
    }
}

/// Everything the tool needs from the process environment, read once at
/// start and handed to the client and the creator explicitly.
#[derive(Debug, Clone)]
pub struct Settings {
    pub site: String,
    pub script_name: String,
    pub api_key: String,
    pub config_repository: String,
    pub naming_rules: NamingRules,
    pub page_size: u32,
}

impl Settings {
    pub fn from_env() -> Result<Self, CreatorError> {
        let api_key = get_env_or_error("SHOTGRID_API_KEY")?;
        let naming_rules = get_env_var_or_default("SGPC_NAMING_RULES", "standard")
            .parse::<NamingRules>()?;
        let page_size = get_env_var_or_default("SHOTGRID_PAGE_SIZE", "500")
            .parse::<u32>()
            .ok()
            .filter(|size| (1..=MAX_PAGE_SIZE).contains(size))
            .ok_or_else(|| {
                CreatorError::Settings(format!(
                    "SHOTGRID_PAGE_SIZE must be a number between 1 and {}",
                    MAX_PAGE_SIZE
                ))
            })?;

        Ok(Settings {
            site: get_env_var_or_default("SHOTGRID_SITE", DEFAULT_SITE)
                .trim_end_matches('/')
                .to_string(),
            script_name: get_env_var_or_default("SHOTGRID_SCRIPT_NAME", DEFAULT_SCRIPT_NAME),
            api_key,
            config_repository: get_env_var_or_default(
                "SHOTGRID_CONFIG_REPOSITORY",
                DEFAULT_CONFIG_REPOSITORY,
            ),
            naming_rules,
            page_size,
        })
    }

    /// Settings for offline commands and tests: no credential, defaults elsewhere.
    pub fn offline() -> Self {
        Settings {
            site: DEFAULT_SITE.to_string(),
            script_name: DEFAULT_SCRIPT_NAME.to_string(),
            api_key: String::new(),
            config_repository: DEFAULT_CONFIG_REPOSITORY.to_string(),
            naming_rules: NamingRules::default(),
            page_size: DEFAULT_PAGE_SIZE,
        }
    }

    pub fn project_page_url(&self, project_id: u64) -> String {
        format!(
            "{}/page/project_overview?project_id={}",
            self.site, project_id
        )
    }
}
