//! Typed configuration loaded from the environment (with `.env` support).

use std::{
    env, fs,
    path::{Path, PathBuf},
};

use crate::{errors::Error, Result};
use crate::store::{LOCATIONS_FILE, MEMBERS_FILE, POLLS_FILE, TEAMS_FILE};

/// Default local wall-clock hour the daily sweep is anchored to.
const DEFAULT_REPORT_HOUR: u32 = 21;

#[derive(Clone, Debug)]
pub struct Config {
    pub telegram_bot_token: String,

    /// Directory holding the flat-file snapshots.
    pub data_dir: PathBuf,

    /// Local hour (0-23) of the daily sweep.
    pub report_hour: u32,
}

impl Config {
    pub fn load() -> Result<Self> {
        load_dotenv_if_present(Path::new(".env"));

        let telegram_bot_token = env_str("TELEGRAM_BOT_TOKEN").unwrap_or_default();
        if telegram_bot_token.trim().is_empty() {
            return Err(Error::Config(
                "TELEGRAM_BOT_TOKEN environment variable is required".to_string(),
            ));
        }

        let data_dir = env::var_os("FTB_DATA_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from("."));
        fs::create_dir_all(&data_dir)?;

        let report_hour = env_u32("REPORT_HOUR").unwrap_or(DEFAULT_REPORT_HOUR);
        if report_hour > 23 {
            return Err(Error::Config(format!(
                "REPORT_HOUR must be 0-23, got {report_hour}"
            )));
        }

        Ok(Self {
            telegram_bot_token,
            data_dir,
            report_hour,
        })
    }

    pub fn polls_file(&self) -> PathBuf {
        self.data_dir.join(POLLS_FILE)
    }

    pub fn members_file(&self) -> PathBuf {
        self.data_dir.join(MEMBERS_FILE)
    }

    pub fn teams_file(&self) -> PathBuf {
        self.data_dir.join(TEAMS_FILE)
    }

    pub fn locations_file(&self) -> PathBuf {
        self.data_dir.join(LOCATIONS_FILE)
    }
}

fn env_str(key: &str) -> Option<String> {
    env::var(key).ok()
}

fn env_u32(key: &str) -> Option<u32> {
    env_str(key).and_then(|s| s.trim().parse::<u32>().ok())
}

fn load_dotenv_if_present(path: &Path) {
    let Ok(contents) = fs::read_to_string(path) else {
        return;
    };

    for raw in contents.lines() {
        let line = raw.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }

        let Some((k, v)) = line.split_once('=') else {
            continue;
        };

        let key = k.trim();
        if key.is_empty() {
            continue;
        }
        if env::var_os(key).is_some() {
            continue; // do not override existing env
        }

        let mut val = v.trim().to_string();
        // Strip optional surrounding quotes.
        if val.len() >= 2
            && ((val.starts_with('"') && val.ends_with('"'))
                || (val.starts_with('\'') && val.ends_with('\'')))
        {
            val = val[1..val.len() - 1].to_string();
        }

        env::set_var(key, val);
    }
}
