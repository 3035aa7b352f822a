use std::{fs, path::Path, path::PathBuf, time::Duration};

use asciicraft_client::{MovementConfig, SessionConfig};
use asciicraft_input::BindingOverrides;
use asciicraft_render::ProjectionConfig;
use clap::Parser;
use serde::{Deserialize, Serialize};
use tracing::warn;

pub const DEFAULT_CONFIG_PATH: &str = "config/asciicraft.toml";
const DEFAULT_LOG_PATH: &str = "asciicraft.log";

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct ClientConfig {
    /// Name sent in every handshake.
    pub username: String,
    /// `host[:port]` entries opened at startup.
    pub servers: Vec<String>,
    /// UI tick in milliseconds; also the position heartbeat period.
    pub tick_ms: u64,
    pub connect_timeout_ms: u64,
    pub render: ProjectionConfig,
    pub movement: MovementConfig,
    /// Key character to action name, e.g. `w = "step_north"`.
    pub bindings: BindingOverrides,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            username: "Player".to_string(),
            servers: Vec::new(),
            tick_ms: 50,
            connect_timeout_ms: 5000,
            render: ProjectionConfig::default(),
            movement: MovementConfig::default(),
            bindings: BindingOverrides::default(),
        }
    }
}

impl ClientConfig {
    /// Load configuration from an explicit path, falling back to defaults on errors.
    pub fn load_from_path(path: &Path) -> Self {
        match fs::read_to_string(path) {
            Ok(contents) => match toml::from_str::<ClientConfig>(&contents) {
                Ok(cfg) => cfg,
                Err(err) => {
                    warn!("Failed to parse {}: {err}. Using defaults", path.display());
                    ClientConfig::default()
                }
            },
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
                warn!("Config not found at {}. Using defaults", path.display());
                ClientConfig::default()
            }
            Err(err) => {
                warn!("Failed to read {}: {err}. Using defaults", path.display());
                ClientConfig::default()
            }
        }
    }

    /// Apply command-line overrides. Servers given on the command line
    /// replace the configured list.
    pub fn apply_cli_overrides(&mut self, args: &CliArgs) {
        if let Some(ref username) = args.username {
            self.username = username.clone();
        }
        if !args.server.is_empty() {
            self.servers = args.server.clone();
        }
    }

    pub fn tick(&self) -> Duration {
        Duration::from_millis(self.tick_ms.max(1))
    }

    pub fn session_config(&self) -> SessionConfig {
        SessionConfig {
            username: self.username.clone(),
            connect_timeout: Duration::from_millis(self.connect_timeout_ms),
            movement: self.movement,
            max_depth: self.render.max_depth,
        }
    }
}

/// Command-line arguments. Values override `config/asciicraft.toml`.
#[derive(Parser, Debug)]
#[command(name = "asciicraft", version, about = "Terminal client for Minecraft 1.5.2 servers")]
pub struct CliArgs {
    /// Config file to load.
    #[arg(long, default_value = DEFAULT_CONFIG_PATH)]
    pub config: PathBuf,

    /// Server to open at startup (`host[:port]`); repeat for more sessions.
    #[arg(long)]
    pub server: Vec<String>,

    /// Player name.
    #[arg(long)]
    pub username: Option<String>,

    /// Where logs go; the terminal itself is taken by the UI.
    #[arg(long, default_value = DEFAULT_LOG_PATH)]
    pub log_file: PathBuf,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_file_yields_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let cfg = ClientConfig::load_from_path(&dir.path().join("nope.toml"));
        assert_eq!(cfg, ClientConfig::default());
        assert_eq!(cfg.render.max_depth, 8);
        assert_eq!(cfg.movement.max_drop, 3);
    }

    #[test]
    fn invalid_file_yields_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bad.toml");
        fs::write(&path, "tick_ms = \"soon\"").unwrap();
        assert_eq!(ClientConfig::load_from_path(&path), ClientConfig::default());
    }

    #[test]
    fn partial_file_keeps_other_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("partial.toml");
        fs::write(
            &path,
            r#"
username = "alex"
servers = ["127.0.0.1:25565", "mc.example.org"]

[render]
max_depth = 12

[bindings]
w = "step_north"
"#,
        )
        .unwrap();
        let cfg = ClientConfig::load_from_path(&path);
        assert_eq!(cfg.username, "alex");
        assert_eq!(cfg.servers.len(), 2);
        assert_eq!(cfg.render.max_depth, 12);
        assert_eq!(cfg.tick_ms, 50);
        assert_eq!(cfg.bindings.0.get("w").map(String::as_str), Some("step_north"));
        assert_eq!(cfg.session_config().max_depth, 12);
    }

    #[test]
    fn cli_overrides_username_and_servers() {
        let mut cfg = ClientConfig {
            servers: vec!["old:1".into()],
            ..ClientConfig::default()
        };
        let args = CliArgs::parse_from([
            "asciicraft",
            "--server",
            "a:25565",
            "--server",
            "b",
            "--username",
            "notch",
        ]);
        cfg.apply_cli_overrides(&args);
        assert_eq!(cfg.username, "notch");
        assert_eq!(cfg.servers, vec!["a:25565".to_string(), "b".to_string()]);
        assert_eq!(args.config, PathBuf::from(DEFAULT_CONFIG_PATH));
    }

    #[test]
    fn cli_without_servers_keeps_config_list() {
        let mut cfg = ClientConfig {
            servers: vec!["kept:1".into()],
            ..ClientConfig::default()
        };
        cfg.apply_cli_overrides(&CliArgs::parse_from(["asciicraft"]));
        assert_eq!(cfg.servers, vec!["kept:1".to_string()]);
        assert_eq!(cfg.username, "Player");
    }
}
