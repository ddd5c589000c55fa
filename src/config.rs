use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;
use std::net::{IpAddr, SocketAddr};
use std::path::Path;
use std::time::Duration;

/// Main configuration structure
///
/// Every field has a default, so the daemon runs with no config file at all.
/// The coordination core itself keeps no persistent state; the file is purely
/// an operator convenience for tuning ports and behavior knobs.
#[derive(Debug, Clone, Deserialize, Default)]
pub struct AppConfig {
    #[serde(default)]
    pub network: NetworkConfig,
    #[serde(default)]
    pub behavior: BehaviorConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct NetworkConfig {
    /// UDP port shared by every instance on the broadcast domain
    #[serde(default = "default_port")]
    pub port: u16,
    /// Broadcast address datagrams are sent to
    #[serde(default = "default_broadcast_addr")]
    pub broadcast_addr: String,
    /// Delay before joining a peer's dance, so the join reads as a reaction
    #[serde(default = "default_join_delay_ms")]
    pub join_delay_ms: u64,
}

fn default_port() -> u16 {
    2014
}

fn default_broadcast_addr() -> String {
    "255.255.255.255".to_string()
}

fn default_join_delay_ms() -> u64 {
    1000
}

impl Default for NetworkConfig {
    fn default() -> Self {
        Self {
            port: default_port(),
            broadcast_addr: default_broadcast_addr(),
            join_delay_ms: default_join_delay_ms(),
        }
    }
}

impl NetworkConfig {
    /// Resolve the configured broadcast target
    pub fn broadcast_target(&self) -> Result<SocketAddr, std::net::AddrParseError> {
        let addr: IpAddr = self.broadcast_addr.parse()?;
        Ok(SocketAddr::new(addr, self.port))
    }

    pub fn join_delay(&self) -> Duration {
        Duration::from_millis(self.join_delay_ms)
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct BehaviorConfig {
    /// Per-tick probability of a self-initiated dance while idle
    #[serde(default = "default_chance_to_dance")]
    pub chance_to_dance: f64,
    /// Minimum seconds between eligible self-initiated dances
    #[serde(default = "default_dance_cooldown_secs")]
    pub dance_cooldown_secs: u64,
    /// Probability of a brief sad flourish after a dance completes
    #[serde(default = "default_sad_flourish_chance")]
    pub sad_flourish_chance: f64,
    /// How long a sad flourish lasts
    #[serde(default = "default_sad_duration_ms")]
    pub sad_duration_ms: u64,
    /// Dance length used by the headless runtime in place of a playback signal
    #[serde(default = "default_dance_duration_ms")]
    pub dance_duration_ms: u64,
    /// Tick interval of the main loop
    #[serde(default = "default_tick_interval_ms")]
    pub tick_interval_ms: u64,
    /// Bounds of the randomized gap between idle chirp cues
    #[serde(default = "default_idle_chirp_min_secs")]
    pub idle_chirp_min_secs: u64,
    #[serde(default = "default_idle_chirp_max_secs")]
    pub idle_chirp_max_secs: u64,
}

fn default_chance_to_dance() -> f64 {
    0.001
}

fn default_dance_cooldown_secs() -> u64 {
    30
}

fn default_sad_flourish_chance() -> f64 {
    0.3
}

fn default_sad_duration_ms() -> u64 {
    2000
}

fn default_dance_duration_ms() -> u64 {
    6000
}

fn default_tick_interval_ms() -> u64 {
    16
}

fn default_idle_chirp_min_secs() -> u64 {
    1
}

fn default_idle_chirp_max_secs() -> u64 {
    20
}

impl Default for BehaviorConfig {
    fn default() -> Self {
        Self {
            chance_to_dance: default_chance_to_dance(),
            dance_cooldown_secs: default_dance_cooldown_secs(),
            sad_flourish_chance: default_sad_flourish_chance(),
            sad_duration_ms: default_sad_duration_ms(),
            dance_duration_ms: default_dance_duration_ms(),
            tick_interval_ms: default_tick_interval_ms(),
            idle_chirp_min_secs: default_idle_chirp_min_secs(),
            idle_chirp_max_secs: default_idle_chirp_max_secs(),
        }
    }
}

impl BehaviorConfig {
    pub fn dance_cooldown(&self) -> Duration {
        Duration::from_secs(self.dance_cooldown_secs)
    }

    pub fn sad_duration(&self) -> Duration {
        Duration::from_millis(self.sad_duration_ms)
    }

    pub fn dance_duration(&self) -> Duration {
        Duration::from_millis(self.dance_duration_ms)
    }

    pub fn tick_interval(&self) -> Duration {
        Duration::from_millis(self.tick_interval_ms)
    }

    fn validate(&self) -> Result<(), String> {
        if !(0.0..=1.0).contains(&self.chance_to_dance) {
            return Err(format!(
                "chance_to_dance must be within [0, 1], got {}",
                self.chance_to_dance
            ));
        }
        if !(0.0..=1.0).contains(&self.sad_flourish_chance) {
            return Err(format!(
                "sad_flourish_chance must be within [0, 1], got {}",
                self.sad_flourish_chance
            ));
        }
        if self.idle_chirp_min_secs > self.idle_chirp_max_secs {
            return Err(format!(
                "idle_chirp_min_secs ({}) exceeds idle_chirp_max_secs ({})",
                self.idle_chirp_min_secs, self.idle_chirp_max_secs
            ));
        }
        if self.tick_interval_ms == 0 {
            return Err("tick_interval_ms must be positive".to_string());
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub level: String,
    /// Enable JSON formatted logs
    #[serde(default)]
    pub json: bool,
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            json: false,
        }
    }
}

impl AppConfig {
    /// Load configuration from the default file location and environment
    pub fn load() -> Result<Self, ConfigError> {
        Self::build(File::with_name("mipmesh").required(false))
    }

    /// Load configuration from a specific file
    pub fn load_from<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        Self::build(File::from(path.as_ref()).required(true))
    }

    fn build(file: File<config::FileSourceFile, config::FileFormat>) -> Result<Self, ConfigError> {
        let cfg: Self = Config::builder()
            .add_source(file)
            // Override with environment variables (MIPMESH_NETWORK__PORT, etc.)
            .add_source(
                Environment::with_prefix("MIPMESH")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?
            .try_deserialize()?;

        cfg.behavior.validate().map_err(ConfigError::Message)?;
        cfg.network
            .broadcast_target()
            .map_err(|e| ConfigError::Message(format!("broadcast_addr: {e}")))?;
        Ok(cfg)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_reference_tuning() {
        let cfg = AppConfig::default();
        assert_eq!(cfg.network.port, 2014);
        assert_eq!(cfg.network.broadcast_addr, "255.255.255.255");
        assert_eq!(cfg.behavior.chance_to_dance, 0.001);
        assert_eq!(cfg.behavior.dance_cooldown(), Duration::from_secs(30));
        assert!(!cfg.logging.json);
    }

    #[test]
    fn broadcast_target_parses_default() {
        let cfg = NetworkConfig::default();
        let target = cfg.broadcast_target().unwrap();
        assert_eq!(target.port(), 2014);
        assert_eq!(target.ip().to_string(), "255.255.255.255");
    }

    #[test]
    fn validate_rejects_bad_probability() {
        let behavior = BehaviorConfig {
            chance_to_dance: 1.5,
            ..Default::default()
        };
        assert!(behavior.validate().is_err());
    }

    #[test]
    fn validate_rejects_inverted_chirp_bounds() {
        let behavior = BehaviorConfig {
            idle_chirp_min_secs: 30,
            idle_chirp_max_secs: 10,
            ..Default::default()
        };
        assert!(behavior.validate().is_err());
    }
}
