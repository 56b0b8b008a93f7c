// ============================================================================
// config.rs — LifeRewind
// Construction-time configuration, optionally loaded from a JSON file.
// ============================================================================

use std::fs::File;
use std::io;

use serde::Deserialize;

/// Sandbox configuration. Supplied once at startup and never mutated; the
/// grid shape and ring capacity are fixed for the process lifetime.
#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct SandboxConfig {
    pub grid_width: usize,
    pub grid_height: usize,
    /// Ring capacity: how many generations stay reachable by scrubbing.
    pub history_size: usize,
    /// Seconds between generations while playing.
    pub simulate_period: f32,
    pub window_title: String,
}

impl Default for SandboxConfig {
    fn default() -> Self {
        Self {
            grid_width: 256,
            grid_height: 256,
            history_size: 234,
            simulate_period: 0.5,
            window_title: String::from("life, rewound"),
        }
    }
}

/// Load a configuration file; missing fields fall back to the defaults.
pub fn load_config(path: &str) -> io::Result<SandboxConfig> {
    let file = File::open(path)?;
    let config: SandboxConfig = serde_json::from_reader(file)
        .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?;
    validate(config)
}

fn validate(config: SandboxConfig) -> io::Result<SandboxConfig> {
    if config.grid_width == 0 || config.grid_height == 0 || config.history_size < 2 {
        return Err(io::Error::new(
            io::ErrorKind::InvalidData,
            "grid dimensions must be non-zero and history_size at least 2",
        ));
    }
    // Negated so NaN is rejected too; a non-positive period would stall the
    // tick accumulator.
    if !(config.simulate_period > 0.0) {
        return Err(io::Error::new(
            io::ErrorKind::InvalidData,
            "simulate_period must be a positive number of seconds",
        ));
    }
    Ok(config)
}

// ======================== Tests ========================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_the_reference_setup() {
        let config = SandboxConfig::default();
        assert_eq!(config.grid_width, 256);
        assert_eq!(config.grid_height, 256);
        assert_eq!(config.history_size, 234);
        assert!((config.simulate_period - 0.5).abs() < f32::EPSILON);
    }

    #[test]
    fn partial_json_keeps_defaults_for_missing_fields() {
        let config: SandboxConfig =
            serde_json::from_str(r#"{ "grid_width": 64, "simulate_period": 0.1 }"#).unwrap();
        assert_eq!(config.grid_width, 64);
        assert_eq!(config.grid_height, 256);
        assert_eq!(config.history_size, 234);
    }

    #[test]
    fn rejects_degenerate_dimensions() {
        let config = SandboxConfig {
            grid_width: 0,
            ..SandboxConfig::default()
        };
        assert!(validate(config).is_err());

        let config = SandboxConfig {
            history_size: 1,
            ..SandboxConfig::default()
        };
        assert!(validate(config).is_err());
    }

    #[test]
    fn rejects_nonpositive_simulate_period() {
        for period in [0.0, -0.5, f32::NAN] {
            let config = SandboxConfig {
                simulate_period: period,
                ..SandboxConfig::default()
            };
            assert!(validate(config).is_err(), "period {period} accepted");
        }
    }
}
