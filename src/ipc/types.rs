use std::path::PathBuf;

use serde::Deserialize;

use crate::roster::RosterStore;
use crate::settings::Settings;

#[derive(Debug, Deserialize, Clone)]
pub struct Request {
    pub id: String,
    pub method: String,
    #[serde(default)]
    pub params: serde_json::Value,
}

/// Everything one session owns. Built in `main` and lent to each handler.
#[derive(Debug, Default)]
pub struct AppState {
    pub workspace: Option<PathBuf>,
    pub roster: RosterStore,
    pub settings: Settings,
}
