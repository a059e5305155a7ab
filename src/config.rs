use crate::app_dirs::AppDirs;
use crate::exercise::ExerciseKind;
use crate::profile::ExerciseProfile;
use crate::synth::{DEFAULT_DROPOUT, DEFAULT_FPS, DEFAULT_DURATION};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::warn;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct Config {
    pub exercise: ExerciseKind,
    pub profile: ExerciseProfile,
    /// Length of a `--demo` session
    pub demo_secs: u64,
    pub demo_fps: f64,
    /// Chance of a synthetic frame with no pose
    pub demo_dropout: f64,
    pub seed: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            exercise: ExerciseKind::JumpingJacks,
            profile: ExerciseProfile::guest(),
            demo_secs: DEFAULT_DURATION.as_secs(),
            demo_fps: DEFAULT_FPS,
            demo_dropout: DEFAULT_DROPOUT,
            seed: 42,
        }
    }
}

pub trait ConfigStore {
    fn load(&self) -> Config;
    fn save(&self, cfg: &Config) -> std::io::Result<()>;
}

#[derive(Debug, Clone)]
pub struct FileConfigStore {
    path: PathBuf,
}

impl FileConfigStore {
    #[allow(clippy::new_without_default)]
    pub fn new() -> Self {
        Self {
            path: AppDirs::config_path(),
        }
    }

    pub fn with_path<P: AsRef<Path>>(p: P) -> Self {
        Self {
            path: p.as_ref().to_path_buf(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Default for FileConfigStore {
    fn default() -> Self {
        Self::new()
    }
}

impl ConfigStore for FileConfigStore {
    fn load(&self) -> Config {
        let Ok(bytes) = fs::read(&self.path) else {
            return Config::default();
        };
        match serde_json::from_slice::<Config>(&bytes) {
            Ok(cfg) if cfg.profile.validate().is_ok() => cfg,
            Ok(_) => {
                warn!(path = %self.path.display(), "stored profile is invalid, using defaults");
                Config::default()
            }
            Err(err) => {
                warn!(path = %self.path.display(), %err, "unreadable config, using defaults");
                Config::default()
            }
        }
    }

    fn save(&self, cfg: &Config) -> std::io::Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        let data = serde_json::to_vec_pretty(cfg)?;
        fs::write(&self.path, data)
    }
}
