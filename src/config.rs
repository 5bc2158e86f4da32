//! Application-level configuration loading, including default game settings and the challenge pool.

use std::{env, fs, io::ErrorKind, path::PathBuf, sync::Arc};

use serde::Deserialize;
use tracing::{info, warn};

use crate::engine::{
    Challenge, ChallengeGenerator, PoolChallengeGenerator, Settings,
    settings::{DEFAULT_CYCLE_LENGTH, DEFAULT_NUM_CHALLENGES, DEFAULT_WARNING_TIME},
};

/// Default location on disk where the server looks for the JSON configuration.
const DEFAULT_CONFIG_PATH: &str = "config/app.json";
/// Environment variable that overrides [`DEFAULT_CONFIG_PATH`].
const CONFIG_PATH_ENV: &str = "SNAKE_RACE_BACK_CONFIG_PATH";
/// Seconds of public countdown before the first cycle starts.
const DEFAULT_COUNTDOWN_SECS: u64 = 5;

#[derive(Debug, Clone)]
/// Immutable runtime configuration shared across the application.
pub struct AppConfig {
    settings: Settings,
    countdown_secs: u64,
    generator: PoolChallengeGenerator,
}

impl AppConfig {
    /// Load the application configuration from disk, falling back to baked-in defaults.
    pub fn load() -> Self {
        let path = resolve_config_path();
        match fs::read_to_string(&path) {
            Ok(contents) => match serde_json::from_str::<RawConfig>(&contents) {
                Ok(raw) => {
                    let app_config: Self = raw.into();
                    info!(
                        path = %path.display(),
                        challenges = app_config.generator.pool_size(),
                        "loaded game configuration"
                    );
                    app_config
                }
                Err(err) => {
                    warn!(
                        path = %path.display(),
                        error = %err,
                        "failed to parse config; falling back to defaults"
                    );
                    Self::default()
                }
            },
            Err(err) if err.kind() == ErrorKind::NotFound => {
                info!(
                    path = %path.display(),
                    "config file not found; using built-in defaults"
                );
                Self::default()
            }
            Err(err) => {
                warn!(
                    path = %path.display(),
                    error = %err,
                    "failed to read config; falling back to defaults"
                );
                Self::default()
            }
        }
    }

    /// Settings every new game starts with.
    pub fn default_settings(&self) -> Settings {
        self.settings
    }

    pub fn countdown_secs(&self) -> u64 {
        self.countdown_secs
    }

    /// Generator drawing from the configured challenge pool.
    pub fn challenge_generator(&self) -> Arc<dyn ChallengeGenerator> {
        Arc::new(self.generator.clone())
    }

    /// Same configuration with a different start countdown.
    pub fn with_countdown_secs(mut self, countdown_secs: u64) -> Self {
        self.countdown_secs = countdown_secs;
        self
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            settings: Settings::default(),
            countdown_secs: DEFAULT_COUNTDOWN_SECS,
            generator: default_generator(),
        }
    }
}

#[derive(Debug, Deserialize)]
/// JSON representation of the configuration file located at [`DEFAULT_CONFIG_PATH`].
struct RawConfig {
    #[serde(default)]
    settings: RawSettings,
    #[serde(default = "default_countdown_secs")]
    countdown_secs: u64,
    #[serde(default)]
    challenges: Vec<RawChallenge>,
}

#[derive(Debug, Deserialize)]
#[serde(default)]
struct RawSettings {
    cycle_length: u64,
    warning_time: u64,
    num_challenges: usize,
}

impl Default for RawSettings {
    fn default() -> Self {
        Self {
            cycle_length: DEFAULT_CYCLE_LENGTH,
            warning_time: DEFAULT_WARNING_TIME,
            num_challenges: DEFAULT_NUM_CHALLENGES,
        }
    }
}

#[derive(Debug, Deserialize)]
/// JSON representation of a single challenge inside the configuration file.
struct RawChallenge {
    title: String,
    description: String,
}

impl From<RawChallenge> for Challenge {
    fn from(value: RawChallenge) -> Self {
        Challenge::new(value.title, value.description)
    }
}

impl From<RawConfig> for AppConfig {
    fn from(value: RawConfig) -> Self {
        let RawSettings {
            cycle_length,
            warning_time,
            num_challenges,
        } = value.settings;

        let settings = match Settings::new(cycle_length, warning_time, num_challenges) {
            Ok(settings) => settings,
            Err(err) => {
                warn!(error = %err, "invalid default settings in config; using built-in defaults");
                Settings::default()
            }
        };

        let pool = value.challenges.into_iter().map(Into::into).collect();
        let generator = match PoolChallengeGenerator::new(pool) {
            Ok(generator) => generator,
            Err(err) => {
                info!(reason = %err, "no challenges configured; using built-in pool");
                default_generator()
            }
        };

        Self {
            settings,
            countdown_secs: value.countdown_secs,
            generator,
        }
    }
}

fn default_countdown_secs() -> u64 {
    DEFAULT_COUNTDOWN_SECS
}

/// Resolve the configuration path taking the environment override into account.
fn resolve_config_path() -> PathBuf {
    env::var_os(CONFIG_PATH_ENV)
        .map(PathBuf::from)
        .filter(|path| !path.as_os_str().is_empty())
        .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_PATH))
}

fn default_generator() -> PoolChallengeGenerator {
    PoolChallengeGenerator::new(default_challenges()).expect("built-in challenge pool is not empty")
}

/// Built-in challenge pool shipped with the binary.
fn default_challenges() -> Vec<Challenge> {
    [
        ("Human pyramid", "Build a three-level pyramid with your whole team."),
        ("Statue", "Find a statue and recreate its pose as a team photo."),
        ("Stranger high five", "Get a high five from someone wearing red."),
        ("Team chant", "Record your team chanting a brand new team song."),
        ("Landmark", "Take a photo of your team in front of the nearest landmark."),
        ("Alphabet walk", "Photograph five signs whose words start with S, N, A, K, E."),
        ("Bench press", "Fit every team member on a single bench."),
        ("Shadow puppets", "Film a shadow puppet show lasting at least ten seconds."),
        ("Street musician", "Take a photo with a street performer or musician."),
        ("Snake line", "Form a conga line and walk it across a crossing."),
        ("Local snack", "Buy and share a snack you have never tried before."),
        ("Reflection", "Photograph the whole team reflected in a window."),
    ]
    .into_iter()
    .map(|(title, description)| Challenge::new(title, description))
    .collect()
}
