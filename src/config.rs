//! Configuration loaded from `config.json` next to the binary. Every field
//! has a default, so a missing or partial file still yields a working
//! setup pointed at a stock X AIR console.

use std::fs;
use std::path::Path;

use serde::Deserialize;

#[derive(Clone, Debug, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub mixer: MixerConfig,
    pub meters: MeterConfig,
}

#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct MixerConfig {
    /// host:port the mixer listens on; X AIR consoles take OSC on UDP
    /// port 10024.
    pub address: String,
    /// Number of input channels on the console (XR12 has 12, XR18 has 16).
    pub channel_count: u8,
}

impl Default for MixerConfig {
    fn default() -> Self {
        MixerConfig {
            address: "192.168.1.181:10024".to_string(),
            channel_count: 12,
        }
    }
}

#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct MeterConfig {
    /// Meter feed to subscribe to; `/meters/1` carries the input channels.
    pub feed: String,
    /// Default subscription length for the `meters` console command.
    pub duration_secs: u64,
    /// Width of a full-scale meter bar, in characters.
    pub bar_width: usize,
}

impl Default for MeterConfig {
    fn default() -> Self {
        MeterConfig {
            feed: "/meters/1".to_string(),
            duration_secs: 10,
            bar_width: 60,
        }
    }
}

impl Config {
    /// Loads the configuration, falling back to defaults when the file is
    /// absent or broken. A broken file is worth a warning; an absent one
    /// is the normal first-run case.
    pub fn load(path: &Path) -> Config {
        match fs::read_to_string(path) {
            Ok(text) => match serde_json::from_str(&text) {
                Ok(config) => config,
                Err(err) => {
                    eprintln!(
                        "config parse error in {}: {} (using defaults)",
                        path.display(),
                        err
                    );
                    Config::default()
                }
            },
            Err(_) => Config::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_point_at_a_stock_console() {
        let config = Config::default();
        assert_eq!(config.mixer.address, "192.168.1.181:10024");
        assert_eq!(config.mixer.channel_count, 12);
        assert_eq!(config.meters.feed, "/meters/1");
        assert_eq!(config.meters.duration_secs, 10);
    }

    #[test]
    fn partial_file_keeps_defaults_for_missing_sections() {
        let config: Config =
            serde_json::from_str(r#"{ "mixer": { "address": "10.0.0.7:10024" } }"#).unwrap();
        assert_eq!(config.mixer.address, "10.0.0.7:10024");
        assert_eq!(config.mixer.channel_count, 12);
        assert_eq!(config.meters.bar_width, 60);
    }

    #[test]
    fn full_file_overrides_everything() {
        let config: Config = serde_json::from_str(
            r#"{
                "mixer": { "address": "mixer.local:10024", "channel_count": 16 },
                "meters": { "feed": "/meters/2", "duration_secs": 3, "bar_width": 40 }
            }"#,
        )
        .unwrap();
        assert_eq!(config.mixer.channel_count, 16);
        assert_eq!(config.meters.feed, "/meters/2");
        assert_eq!(config.meters.duration_secs, 3);
        assert_eq!(config.meters.bar_width, 40);
    }
}
