//! Small persistent key/value store backing session restore.

use std::{
    collections::BTreeMap,
    fs,
    path::PathBuf,
};

use anyhow::Context;

pub const LOGGED_IN_KEY: &str = "loggedIn";
pub const RESTORE_PATH_KEY: &str = "restorePath";

pub struct LocalStorage {
    path: PathBuf,
    items: BTreeMap<String, String>,
}

impl LocalStorage {
    /// Opens the store at `path`; a missing file is an empty store.
    pub fn open(path: impl Into<PathBuf>) -> anyhow::Result<Self> {
        let path = path.into();
        let items = match fs::read_to_string(&path) {
            Ok(text) => serde_json::from_str(&text)
                .with_context(|| format!("corrupt local storage '{}'", path.display()))?,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => BTreeMap::new(),
            Err(err) => {
                return Err(err)
                    .with_context(|| format!("failed to read '{}'", path.display()));
            }
        };
        Ok(Self { path, items })
    }

    pub fn get_item(&self, key: &str) -> Option<&str> {
        self.items.get(key).map(String::as_str)
    }

    pub fn set_item(&mut self, key: &str, value: impl Into<String>) -> anyhow::Result<()> {
        self.items.insert(key.to_string(), value.into());
        self.flush()
    }

    pub fn remove_item(&mut self, key: &str) -> anyhow::Result<()> {
        if self.items.remove(key).is_some() {
            self.flush()?;
        }
        Ok(())
    }

    pub fn logged_in(&self) -> bool {
        self.get_item(LOGGED_IN_KEY) == Some("true")
    }

    fn flush(&self) -> anyhow::Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent).with_context(|| {
                format!("failed to create directory '{}'", parent.display())
            })?;
        }
        let text = serde_json::to_string_pretty(&self.items)?;
        fs::write(&self.path, text)
            .with_context(|| format!("failed to write '{}'", self.path.display()))
    }
}
