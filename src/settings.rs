use anyhow::Context;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::path::Path;

pub const SETTINGS_FILE_NAME: &str = "settings.json";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Settings {
    pub due_soon_days: i64,
    pub currency_symbol: String,
}

impl Default for Settings {
    fn default() -> Self {
        Settings {
            due_soon_days: crate::calc::DUE_SOON_DAYS,
            currency_symbol: "$".to_string(),
        }
    }
}

fn parse_i64_range(v: &Value, key: &str, min: i64, max: i64) -> Result<i64, String> {
    let n = v
        .as_i64()
        .ok_or_else(|| format!("{} must be integer", key))?;
    if !(min..=max).contains(&n) {
        return Err(format!("{} must be in {}..={}", key, min, max));
    }
    Ok(n)
}

fn parse_string_max(v: &Value, key: &str, max_len: usize) -> Result<String, String> {
    let s = v.as_str().ok_or_else(|| format!("{} must be string", key))?;
    let s = s.trim();
    if s.chars().count() > max_len {
        return Err(format!("{} length must be <= {}", key, max_len));
    }
    Ok(s.to_string())
}

impl Settings {
    /// Applies every field of `patch` or none of them.
    pub fn merge_patch(&mut self, patch: &Map<String, Value>) -> Result<(), String> {
        let mut next = self.clone();
        for (k, v) in patch {
            match k.as_str() {
                "dueSoonDays" => next.due_soon_days = parse_i64_range(v, k, 0, 30)?,
                "currencySymbol" => next.currency_symbol = parse_string_max(v, k, 4)?,
                _ => return Err(format!("unknown settings field: {}", k)),
            }
        }
        *self = next;
        Ok(())
    }

    /// Reads `settings.json` from a workspace. A missing file yields `None`;
    /// fields that fail validation keep their defaults.
    pub fn load(workspace: &Path) -> anyhow::Result<Option<Settings>> {
        let path = workspace.join(SETTINGS_FILE_NAME);
        if !path.is_file() {
            return Ok(None);
        }
        let text = std::fs::read_to_string(&path)
            .with_context(|| format!("failed to read {}", path.to_string_lossy()))?;
        let saved: Value = serde_json::from_str(&text)
            .with_context(|| format!("invalid settings json in {}", path.to_string_lossy()))?;
        let mut settings = Settings::default();
        if let Some(obj) = saved.as_object() {
            for (k, v) in obj {
                let mut one = Map::new();
                one.insert(k.clone(), v.clone());
                if let Err(msg) = settings.merge_patch(&one) {
                    log::warn!("ignoring saved setting: {}", msg);
                }
            }
        }
        Ok(Some(settings))
    }

    pub fn save(&self, workspace: &Path) -> anyhow::Result<()> {
        let path = workspace.join(SETTINGS_FILE_NAME);
        let text = serde_json::to_string_pretty(self).context("failed to serialize settings")?;
        std::fs::write(&path, text)
            .with_context(|| format!("failed to write {}", path.to_string_lossy()))?;
        Ok(())
    }
}
