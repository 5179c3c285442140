use std::{
    fmt, io,
    path::{Path, PathBuf},
};

use rust_cli_config::builder::{ConfigBuilder, DefaultState};
use serde::de::DeserializeOwned;
use thiserror::Error;

use crate::environment::Environment;

/// Directory holding the configuration files, relative to the working directory.
const CONFIGURATION_DIR: &str = "configuration";

/// Extensions tried, in order, for every configuration file.
const CONFIG_FILE_EXTENSIONS: &[&str] = &["yaml", "yml", "json"];

/// Prefix of environment variable overrides.
const ENV_PREFIX: &str = "APP";

const ENV_PREFIX_SEPARATOR: &str = "_";

/// Separator of nested keys in environment variable overrides, as in `APP_SOURCE__EVENTS_PATH`.
const ENV_SEPARATOR: &str = "__";

/// Which configuration file is being loaded.
#[derive(Debug, Clone, Copy)]
enum ConfigFileKind {
    /// Settings shared by every environment, always required.
    Base,
    /// Overrides of one environment, optional.
    Environment(Environment),
}

impl ConfigFileKind {
    fn stem(&self) -> &'static str {
        match self {
            ConfigFileKind::Base => "base",
            ConfigFileKind::Environment(env) => env.as_str(),
        }
    }
}

impl fmt::Display for ConfigFileKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigFileKind::Base => f.write_str("base configuration"),
            ConfigFileKind::Environment(env) => write!(f, "{env} environment configuration"),
        }
    }
}

/// Errors raised while loading the configuration.
#[derive(Debug, Error)]
pub enum LoadConfigError {
    #[error("failed to determine the current directory: {0}")]
    CurrentDir(#[source] io::Error),

    #[error("configuration directory `{0}` does not exist")]
    MissingConfigurationDirectory(PathBuf),

    #[error("could not locate the base configuration in `{directory}`; attempted: {attempted}")]
    BaseConfigurationMissing {
        directory: PathBuf,
        attempted: String,
    },

    #[error("failed to load {kind_description} from `{path}`: {source}")]
    ConfigurationFileLoad {
        kind_description: String,
        path: PathBuf,
        source: rust_cli_config::ConfigError,
    },

    #[error("failed to determine runtime environment: {0}")]
    Environment(#[from] io::Error),

    #[error("failed to build configuration: {0}")]
    Builder(#[source] rust_cli_config::ConfigError),

    #[error("failed to deserialize configuration: {0}")]
    Deserialization(#[source] rust_cli_config::ConfigError),
}

/// Loads the configuration from the `configuration` directory of the working directory.
///
/// The environment is read from `APP_ENVIRONMENT`, see [`load_config_from`] for the layering.
pub fn load_config<T>() -> Result<T, LoadConfigError>
where
    T: DeserializeOwned,
{
    let base_path = std::env::current_dir().map_err(LoadConfigError::CurrentDir)?;
    let environment = Environment::load()?;

    load_config_from(&base_path.join(CONFIGURATION_DIR), environment)
}

/// Loads the configuration from `directory`.
///
/// `base.(yaml|yml|json)` is required. `{environment}.(yaml|yml|json)` is applied on top of it
/// when present. `APP_` prefixed environment variables are applied last, with nested keys
/// separated by `__`.
pub fn load_config_from<T>(directory: &Path, environment: Environment) -> Result<T, LoadConfigError>
where
    T: DeserializeOwned,
{
    if !directory.is_dir() {
        return Err(LoadConfigError::MissingConfigurationDirectory(directory.to_path_buf()));
    }

    let base_file = find_configuration_file(directory, ConfigFileKind::Base).map_err(
        |attempted| LoadConfigError::BaseConfigurationMissing {
            directory: directory.to_path_buf(),
            attempted,
        },
    )?;

    let builder = rust_cli_config::Config::builder()
        .add_source(rust_cli_config::File::from(base_file.clone()));
    validate_configuration_source(&builder, ConfigFileKind::Base, &base_file)?;

    let environment_kind = ConfigFileKind::Environment(environment);
    let builder = match find_configuration_file(directory, environment_kind) {
        Ok(environment_file) => {
            let builder = builder.add_source(rust_cli_config::File::from(environment_file.clone()));
            validate_configuration_source(&builder, environment_kind, &environment_file)?;
            builder
        }
        Err(_) => builder,
    };

    let environment_source = rust_cli_config::Environment::with_prefix(ENV_PREFIX)
        .prefix_separator(ENV_PREFIX_SEPARATOR)
        .separator(ENV_SEPARATOR);

    let settings = builder
        .add_source(environment_source)
        .build()
        .map_err(LoadConfigError::Builder)?;

    settings
        .try_deserialize::<T>()
        .map_err(LoadConfigError::Deserialization)
}

/// Finds the file of `kind` in `directory`, returning the attempted paths when none exists.
fn find_configuration_file(directory: &Path, kind: ConfigFileKind) -> Result<PathBuf, String> {
    let mut attempted_paths = Vec::with_capacity(CONFIG_FILE_EXTENSIONS.len());

    for extension in CONFIG_FILE_EXTENSIONS {
        let path = directory.join(format!("{}.{extension}", kind.stem()));
        if path.is_file() {
            return Ok(path);
        }

        attempted_paths.push(format!("`{}`", path.display()));
    }

    Err(attempted_paths.join(", "))
}

fn validate_configuration_source(
    builder: &ConfigBuilder<DefaultState>,
    kind: ConfigFileKind,
    path: &Path,
) -> Result<(), LoadConfigError> {
    builder
        .clone()
        .build()
        .map(|_| ())
        .map_err(|source| LoadConfigError::ConfigurationFileLoad {
            kind_description: kind.to_string(),
            path: path.to_path_buf(),
            source,
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shared::DrainerConfig;
    use std::fs;

    fn config_dir(name: &str) -> PathBuf {
        let directory = std::env::temp_dir().join(format!(
            "drainer-config-{}-{name}",
            std::process::id()
        ));
        let _ = fs::remove_dir_all(&directory);
        fs::create_dir_all(&directory).unwrap();

        directory
    }

    #[test]
    fn environment_file_overrides_base() {
        let directory = config_dir("override");
        fs::write(
            directory.join("base.yaml"),
            "translator:\n  dialect: mysql\nsource:\n  events_path: events.json\n",
        )
        .unwrap();
        fs::write(
            directory.join("prod.json"),
            r#"{"translator": {"target_schema": "replica"}}"#,
        )
        .unwrap();

        let config: DrainerConfig = load_config_from(&directory, Environment::Prod).unwrap();

        assert_eq!(config.translator.dialect, "mysql");
        assert_eq!(config.translator.target_schema.as_deref(), Some("replica"));
        assert_eq!(config.source.events_path, PathBuf::from("events.json"));
    }

    #[test]
    fn environment_file_is_optional() {
        let directory = config_dir("optional");
        fs::write(
            directory.join("base.yml"),
            "source:\n  events_path: /tmp/events.json\n",
        )
        .unwrap();

        let config: DrainerConfig = load_config_from(&directory, Environment::Dev).unwrap();

        assert_eq!(config.translator.dialect, "mysql");
        assert_eq!(config.translator.target_schema, None);
    }

    #[test]
    fn missing_base_file_is_reported() {
        let directory = config_dir("missing");

        let err = load_config_from::<DrainerConfig>(&directory, Environment::Dev).unwrap_err();

        assert!(matches!(err, LoadConfigError::BaseConfigurationMissing { .. }));
        assert!(err.to_string().contains("base.yaml"));
    }

    #[test]
    fn missing_directory_is_reported() {
        let directory = config_dir("absent").join("nested");

        let err = load_config_from::<DrainerConfig>(&directory, Environment::Dev).unwrap_err();

        assert!(matches!(err, LoadConfigError::MissingConfigurationDirectory(_)));
    }
}
