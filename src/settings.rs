use std::time::Duration;
use std::{fs, path::PathBuf, sync::RwLock};

use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};

pub const WORK_MINUTES_MIN: u32 = 1;
pub const WORK_MINUTES_MAX: u32 = 120;
pub const BREAK_MINUTES_MIN: u32 = 1;
pub const BREAK_MINUTES_MAX: u32 = 60;
pub const ALERT_THRESHOLD_SECS_MIN: u32 = 1;
pub const ALERT_THRESHOLD_SECS_MAX: u32 = 60;

/// Work/break cadence configuration. Values are validated by range only
/// and converted to seconds when a session starts; a running session is
/// never affected by later edits.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CadenceSettings {
    pub work_minutes: u32,
    pub break_minutes: u32,
    pub alert_threshold_secs: u32,
}

impl Default for CadenceSettings {
    fn default() -> Self {
        Self {
            work_minutes: 25,
            break_minutes: 5,
            alert_threshold_secs: 5,
        }
    }
}

impl CadenceSettings {
    pub fn validate(&self) -> Result<()> {
        if !(WORK_MINUTES_MIN..=WORK_MINUTES_MAX).contains(&self.work_minutes) {
            bail!(
                "work minutes must be within [{WORK_MINUTES_MIN}, {WORK_MINUTES_MAX}], got {}",
                self.work_minutes
            );
        }
        if !(BREAK_MINUTES_MIN..=BREAK_MINUTES_MAX).contains(&self.break_minutes) {
            bail!(
                "break minutes must be within [{BREAK_MINUTES_MIN}, {BREAK_MINUTES_MAX}], got {}",
                self.break_minutes
            );
        }
        if !(ALERT_THRESHOLD_SECS_MIN..=ALERT_THRESHOLD_SECS_MAX)
            .contains(&self.alert_threshold_secs)
        {
            bail!(
                "alert threshold seconds must be within [{ALERT_THRESHOLD_SECS_MIN}, {ALERT_THRESHOLD_SECS_MAX}], got {}",
                self.alert_threshold_secs
            );
        }
        Ok(())
    }

    pub fn work_duration_secs(&self) -> u64 {
        self.work_minutes as u64 * 60
    }

    pub fn break_duration_secs(&self) -> u64 {
        self.break_minutes as u64 * 60
    }

    pub fn alert_threshold(&self) -> Duration {
        Duration::from_secs(self.alert_threshold_secs as u64)
    }
}

/// JSON-persisted settings, guarded for shared access.
pub struct SettingsStore {
    path: PathBuf,
    data: RwLock<CadenceSettings>,
}

impl SettingsStore {
    pub fn new(path: PathBuf) -> Result<Self> {
        let data = if path.exists() {
            let contents = fs::read_to_string(&path)
                .with_context(|| format!("Failed to read settings from {}", path.display()))?;
            serde_json::from_str(&contents).unwrap_or_default()
        } else {
            CadenceSettings::default()
        };

        Ok(Self {
            path,
            data: RwLock::new(data),
        })
    }

    pub fn cadence(&self) -> CadenceSettings {
        self.data.read().unwrap().clone()
    }

    pub fn update_cadence(&self, settings: CadenceSettings) -> Result<()> {
        settings.validate()?;
        let mut guard = self.data.write().unwrap();
        *guard = settings;
        self.persist(&guard)
    }

    fn persist(&self, data: &CadenceSettings) -> Result<()> {
        let serialized = serde_json::to_string_pretty(data)?;
        fs::write(&self.path, serialized)
            .with_context(|| format!("Failed to write settings to {}", self.path.display()))
    }

    pub fn reload(&self) -> Result<()> {
        let contents = fs::read_to_string(&self.path)?;
        let data: CadenceSettings = serde_json::from_str(&contents)?;
        let mut guard = self.data.write().unwrap();
        *guard = data;
        Ok(())
    }
}
