use config::{Config, Environment, File};
use serde::de::DeserializeOwned;
use std::borrow::Cow;
use std::path::{Path, PathBuf};
use tracing::info;

/// Prefix of environment overrides, e.g. `BRGY__EVIDENCE__API_KEY`.
pub const ENV_PREFIX: &str = "BRGY";
const DEFAULT_CONFIG_FILE: &str = "server";

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Config error{}: {source}", format_context(.context))]
    Config {
        #[source]
        source: config::ConfigError,
        context: Option<Cow<'static, str>>,
    },
}

trait ConfigErrorExt<T> {
    fn context(self, context: impl Into<Cow<'static, str>>) -> Result<T, ConfigError>;
}

impl<T> ConfigErrorExt<T> for Result<T, config::ConfigError> {
    fn context(self, context: impl Into<Cow<'static, str>>) -> Result<T, ConfigError> {
        self.map_err(|source| ConfigError::Config { source, context: Some(context.into()) })
    }
}

/// Loads layered configuration: a base file, then `BRGY__`-prefixed environment overrides.
///
/// The file is optional, so a bare environment (or nothing at all) yields the
/// [`Default`] values of `T`'s sections. Nested keys use double underscores:
/// `BRGY__DATABASE__URL` maps to `database.url`.
///
/// # Errors
/// Returns [`ConfigError::Config`] if the file is malformed or values do not match `T`.
///
/// # Example
/// ```rust
/// use brgy_kernel::config::load_config;
///
/// #[derive(Default, serde::Deserialize)]
/// struct AppConfig {
///     port: u16,
/// }
///
/// let cfg: AppConfig = load_config(Some("config/local")).unwrap_or_default();
/// ```
pub fn load_config<T>(path: Option<impl AsRef<Path>>) -> Result<T, ConfigError>
where
    T: DeserializeOwned,
{
    build(path, None)
}

/// Same as [`load_config`], reading overrides from `vars` instead of the process environment.
///
/// # Errors
/// Returns [`ConfigError::Config`] if the file is malformed or values do not match `T`.
pub fn load_config_with_env<T>(
    path: Option<impl AsRef<Path>>,
    vars: impl IntoIterator<Item = (String, String)>,
) -> Result<T, ConfigError>
where
    T: DeserializeOwned,
{
    build(path, Some(vars.into_iter().collect()))
}

fn build<T>(
    path: Option<impl AsRef<Path>>,
    vars: Option<config::Map<String, String>>,
) -> Result<T, ConfigError>
where
    T: DeserializeOwned,
{
    let effective_path =
        path.map_or_else(|| PathBuf::from(DEFAULT_CONFIG_FILE), |p| p.as_ref().to_path_buf());

    info!("Loading config from {}", effective_path.display());

    Config::builder()
        .add_source(File::from(effective_path.as_path()).required(false))
        .add_source(
            Environment::with_prefix(ENV_PREFIX)
                .prefix_separator("__")
                .separator("__")
                .try_parsing(true)
                .source(vars),
        )
        .build()
        .context("Failed to build config")?
        .try_deserialize::<T>()
        .context("Failed to deserialize config")
}

fn format_context(context: &Option<Cow<'static, str>>) -> Cow<'static, str> {
    context.as_ref().map_or(Cow::Borrowed(""), |c| Cow::Owned(format!(" ({c})")))
}
