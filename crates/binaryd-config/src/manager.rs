//! INI loading

use std::path::{Path, PathBuf};
use std::time::Duration;

use ini::{Ini, Properties};
use tracing::{debug, info};

use crate::{
    error::{ConfigError, Result},
    types::{CommandConfig, CommandsConfig, DEFAULT_SECTION},
};

/// Loads the command table from an INI file
pub struct ConfigLoader {
    /// Configuration file path
    config_path: PathBuf,
}

impl ConfigLoader {
    /// Loader for `./binaryd.ini`
    pub fn new() -> Self {
        Self::with_path(Self::default_config_path())
    }

    pub fn with_path(path: impl Into<PathBuf>) -> Self {
        Self {
            config_path: path.into(),
        }
    }

    pub fn default_config_path() -> PathBuf {
        PathBuf::from("./binaryd.ini")
    }

    pub fn path(&self) -> &Path {
        &self.config_path
    }

    /// Read, parse and validate the file.
    ///
    /// Section names are kept exactly as written and commands keep file
    /// order. A section repeated later in the file overrides earlier keys.
    pub fn load(&self) -> Result<CommandsConfig> {
        if !self.config_path.is_file() {
            return Err(ConfigError::NotFound(
                self.config_path.display().to_string(),
            ));
        }

        let ini = Ini::load_from_file(&self.config_path)?;

        let mut sections: Vec<(&str, RawSection)> = Vec::new();
        for (section, properties) in ini.iter() {
            let Some(section) = section else {
                if !properties.is_empty() {
                    debug!(keys = properties.len(), "Ignoring keys outside of a section");
                }
                continue;
            };
            if section.eq_ignore_ascii_case(DEFAULT_SECTION) {
                continue;
            }

            let raw = RawSection::from(properties);
            match sections.iter_mut().find(|(name, _)| *name == section) {
                Some((_, existing)) => existing.merge(raw),
                None => sections.push((section, raw)),
            }
        }

        let mut commands = Vec::new();
        for (name, raw) in sections {
            if let Some(command) = parse_section(name, raw)? {
                commands.push(command);
            }
        }

        let commands = CommandsConfig::new(commands);
        self.validate(&commands)?;

        info!(
            path = %self.config_path.display(),
            commands = commands.len(),
            "Loaded command configuration"
        );
        Ok(commands)
    }

    pub fn validate(&self, commands: &CommandsConfig) -> Result<()> {
        if commands.is_empty() {
            return Err(ConfigError::Validation(
                "no commands defined. Please check your config.ini".to_string(),
            ));
        }
        Ok(())
    }
}

impl Default for ConfigLoader {
    fn default() -> Self {
        Self::new()
    }
}

/// The keys binaryd reads from one section
#[derive(Debug, Default)]
struct RawSection {
    command: Option<String>,
    shell: Option<String>,
    timeout: Option<String>,
}

impl RawSection {
    fn merge(&mut self, later: RawSection) {
        if later.command.is_some() {
            self.command = later.command;
        }
        if later.shell.is_some() {
            self.shell = later.shell;
        }
        if later.timeout.is_some() {
            self.timeout = later.timeout;
        }
    }
}

impl From<&Properties> for RawSection {
    fn from(properties: &Properties) -> Self {
        Self {
            command: properties.get("command").map(str::to_string),
            shell: properties.get("shell").map(str::to_string),
            timeout: properties.get("timeout").map(str::to_string),
        }
    }
}

/// Sections without a `command` key are skipped
fn parse_section(name: &str, raw: RawSection) -> Result<Option<CommandConfig>> {
    let Some(command) = raw.command else {
        return Ok(None);
    };
    if command.trim().is_empty() {
        debug!(section = %name, "Skipping section with empty command");
        return Ok(None);
    }

    let shell = raw.shell.filter(|s| !s.is_empty());

    let timeout = match raw.timeout {
        Some(value) => {
            let secs: i64 = value.trim().parse().map_err(|e| {
                ConfigError::Parse(format!(
                    "timeout of command '{}' is not a number: {}",
                    name, e
                ))
            })?;
            if secs <= 0 {
                return Err(ConfigError::Validation(format!(
                    "timeout of command '{}' must be greater than 0",
                    name
                )));
            }
            Some(Duration::from_secs(secs as u64))
        }
        None => None,
    };

    Ok(Some(CommandConfig {
        name: name.to_string(),
        command,
        shell,
        timeout,
    }))
}
