use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand};
use serde::Deserialize;
use tracing::debug;

use crate::connman::BusChoice;
use crate::error::{ConnmanError, ConnmanResult};

// ─── Embedded Default ────────────────────────────────────────────────────
/// Compiled into the binary; used whenever no config file is present.
const DEFAULT_CONFIG_TOML: &str = include_str!("../default_config.toml");

// ─── CLI Arguments (override layer) ─────────────────────────────────────
/// connman-lite: inspect and drive the ConnMan daemon over D-Bus
#[derive(Parser, Debug, Clone)]
#[command(name = "connman-lite", version, about, long_about = None)]
pub struct CliArgs {
    /// Bus to use: auto, system or session (overrides config file)
    #[arg(short, long)]
    pub bus: Option<String>,

    /// Log level filter (overrides config file)
    #[arg(short, long)]
    pub log_level: Option<String>,

    /// Log file path (overrides config file)
    #[arg(long)]
    pub log_file: Option<PathBuf>,

    /// Path to a custom config file
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Print the default config to stdout and exit
    #[arg(long)]
    pub print_default_config: bool,

    /// Print listings as JSON
    #[arg(long, global = true)]
    pub json: bool,

    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Online state, technologies and services
    Status,
    /// List services
    Services,
    /// List technologies
    Technologies,
    /// Exit 0 when online, 1 when offline
    Online,
    /// Connect to a wifi service by name or object path
    Connect {
        /// Service name (SSID) or object path
        service: String,
        /// Passphrase for protected networks
        #[arg(short, long)]
        passphrase: Option<String>,
    },
    /// Control wifi tethering
    #[command(subcommand)]
    Tether(TetherCommand),
}

#[derive(Subcommand, Debug, Clone)]
pub enum TetherCommand {
    /// Start an access point on the wifi technology
    Enable {
        /// Network name to advertise
        #[arg(short, long)]
        identifier: String,
        /// WPA passphrase
        #[arg(short, long)]
        passphrase: String,
    },
    /// Stop the access point
    Disable,
}

// ─── TOML Structs ───────────────────────────────────────────────────────

/// Root configuration: parsed from TOML, then overridden by CLI flags.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub general: GeneralConfig,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct GeneralConfig {
    /// "auto", "system" or "session"
    pub bus: String,

    /// Log level
    pub log_level: String,

    /// Log file (empty string = stderr)
    pub log_file: String,
}

// ─── Defaults ───────────────────────────────────────────────────────────

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            bus: "auto".into(),
            log_level: "warn".into(),
            log_file: String::new(),
        }
    }
}

// ─── Accessors ──────────────────────────────────────────────────────────

impl Config {
    /// Standard config file path: ~/.config/connman-lite/config.toml
    pub fn config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("connman-lite")
            .join("config.toml")
    }

    /// Parse a TOML document
    pub fn from_toml(toml_str: &str) -> ConnmanResult<Self> {
        toml::from_str(toml_str).map_err(|e| ConnmanError::Config(e.to_string()))
    }

    /// Bus selection, validated
    pub fn bus(&self) -> ConnmanResult<BusChoice> {
        self.general.bus.parse()
    }

    /// Convenience: log file as Option<&Path> (empty = None)
    pub fn log_file(&self) -> Option<&Path> {
        let file = self.general.log_file.trim();
        if file.is_empty() {
            None
        } else {
            Some(Path::new(file))
        }
    }
}

// ─── Bootloader ─────────────────────────────────────────────────────────

/// Resolve the configuration. Called once at startup.
///
/// 1. Start from the embedded defaults
/// 2. If a config file exists (`--config` or the standard path), parse it
/// 3. Apply CLI overrides on top
///
/// An explicit `--config` that does not exist is an error; a missing file at
/// the standard path is not.
pub fn load(cli: &CliArgs) -> ConnmanResult<Config> {
    let (config_path, explicit) = match &cli.config {
        Some(path) => (path.clone(), true),
        None => (Config::config_path(), false),
    };

    let mut config: Config = if config_path.exists() {
        let toml_str = std::fs::read_to_string(&config_path)?;
        toml::from_str(&toml_str).map_err(|e| {
            ConnmanError::Config(format!("{}: {}", config_path.display(), e))
        })?
    } else if explicit {
        return Err(ConnmanError::Config(format!(
            "config file {} does not exist",
            config_path.display()
        )));
    } else {
        debug!(
            "No config at {}, using built-in defaults",
            config_path.display()
        );
        Config::from_toml(DEFAULT_CONFIG_TOML)?
    };

    // ── CLI overrides ───────────────────────────────────────────────
    if let Some(ref bus) = cli.bus {
        config.general.bus = bus.clone();
    }
    if let Some(ref level) = cli.log_level {
        config.general.log_level = level.clone();
    }
    if let Some(ref file) = cli.log_file {
        config.general.log_file = file.display().to_string();
    }

    // Fail early on a bad bus name rather than at connect time
    config.bus()?;

    Ok(config)
}

/// Returns the embedded default config TOML string.
pub fn default_config_toml() -> &'static str {
    DEFAULT_CONFIG_TOML
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn args(extra: &[&str]) -> CliArgs {
        let mut argv = vec!["connman-lite"];
        argv.extend_from_slice(extra);
        CliArgs::parse_from(argv)
    }

    #[test]
    fn embedded_default_parses() {
        let config = Config::from_toml(default_config_toml()).unwrap();
        assert_eq!(config.bus().unwrap(), BusChoice::Auto);
        assert_eq!(config.general.log_level, "warn");
        assert!(config.log_file().is_none());
    }

    #[test]
    fn partial_file_keeps_defaults() {
        let config = Config::from_toml("[general]\nbus = \"system\"\n").unwrap();
        assert_eq!(config.bus().unwrap(), BusChoice::System);
        assert_eq!(config.general.log_level, "warn");
    }

    #[test]
    fn empty_file_is_all_defaults() {
        let config = Config::from_toml("").unwrap();
        assert_eq!(config.general.bus, "auto");
    }

    #[test]
    fn file_then_cli_overrides() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[general]\nbus = \"system\"\nlog_level = \"info\"").unwrap();
        let path = file.path().to_str().unwrap().to_owned();

        let config = load(&args(&["--config", &path, "--bus", "session"])).unwrap();
        assert_eq!(config.bus().unwrap(), BusChoice::Session);
        assert_eq!(config.general.log_level, "info");
    }

    #[test]
    fn missing_explicit_config_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nope.toml");
        let err = load(&args(&["--config", path.to_str().unwrap()])).unwrap_err();
        assert!(matches!(err, ConnmanError::Config(_)), "got: {err}");
    }

    #[test]
    fn bad_toml_names_the_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[general\nbus = ").unwrap();
        let path = file.path().to_str().unwrap().to_owned();

        let err = load(&args(&["--config", &path])).unwrap_err();
        assert!(err.to_string().contains(&path));
    }

    #[test]
    fn bad_bus_override_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "").unwrap();
        let err = load(&args(&["--config", path.to_str().unwrap(), "--bus", "tcp"])).unwrap_err();
        assert!(matches!(err, ConnmanError::Config(_)));
    }

    #[test]
    fn parses_subcommands() {
        let cli = args(&["connect", "cafe", "--passphrase", "hunter2"]);
        assert!(matches!(
            cli.command,
            Some(Command::Connect { ref service, passphrase: Some(ref p) })
                if service == "cafe" && p == "hunter2"
        ));

        let cli = args(&["tether", "enable", "-i", "hotspot", "-p", "secret123"]);
        assert!(matches!(
            cli.command,
            Some(Command::Tether(TetherCommand::Enable { .. }))
        ));

        assert!(args(&[]).command.is_none());
    }
}
