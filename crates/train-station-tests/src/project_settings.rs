use std::{io::ErrorKind, path::PathBuf};

use eyre::{eyre, Result};
use serde::Deserialize;

#[derive(Clone, Deserialize, Debug)]
#[serde(rename_all = "kebab-case")]
pub struct ProjectSettings {
    #[serde(skip)]
    pub project_root: PathBuf,

    #[allow(unused)]
    pub team_name: String,

    pub implementation: Implementation,

    /// How long the harness waits for any single event, in milliseconds
    #[serde(default)]
    pub patience_ms: Option<u64>,
}

/// Station implementation under test
#[derive(Clone, Copy, PartialEq, Eq, Deserialize, Debug)]
#[serde(rename_all = "kebab-case")]
pub enum Implementation {
    /// [`train_station_monitor::Station`]
    Monitor,
    /// [`train_station_driver::slug::Station`]
    Slug,
}

impl ProjectSettings {
    pub fn load() -> Result<Self> {
        let mut path = std::env::current_dir()?;
        let contents = loop {
            path.push("project.toml");

            match std::fs::read_to_string(&path) {
                Ok(s) => break s,
                Err(e) if e.kind() == ErrorKind::NotFound => {}
                Err(e) => return Err(e.into()),
            }

            path.pop();
            if !path.pop() {
                return Err(eyre!("Could not find project.toml"));
            }
        };
        path.pop();

        let mut settings: ProjectSettings = toml::from_str(&contents)?;
        settings.project_root = path;

        if let Some(v) = std::env::var_os("TS_IMPLEMENTATION") {
            if v.eq_ignore_ascii_case("monitor") {
                settings.implementation = Implementation::Monitor;
            } else if v.eq_ignore_ascii_case("slug") {
                settings.implementation = Implementation::Slug;
            }
        }

        tracing::debug!(?settings, "loaded project settings");
        Ok(settings)
    }
}
