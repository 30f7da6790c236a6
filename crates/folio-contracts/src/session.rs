use std::fs;
use std::path::{Path, PathBuf};

use anyhow::Context;
use indexmap::IndexMap;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::{Map, Value};

/// Values a routine keeps between renders, one JSON object per namespace.
///
/// Each routine reads and writes only its own namespace (its project slug).
/// When backed by a file, [`SessionState::flush`] writes the dirty state back.
#[derive(Debug, Clone, Default)]
pub struct SessionState {
    path: Option<PathBuf>,
    namespaces: IndexMap<String, Map<String, Value>>,
    dirty: bool,
}

impl SessionState {
    pub fn new() -> Self {
        Self::default()
    }

    /// File-backed session. A missing or unreadable file starts empty.
    pub fn load(path: impl Into<PathBuf>) -> Self {
        let path: PathBuf = path.into();
        let stored: IndexMap<String, Value> = fs::read_to_string(&path)
            .ok()
            .and_then(|raw| serde_json::from_str(&raw).ok())
            .unwrap_or_default();
        let namespaces = stored
            .into_iter()
            .filter_map(|(namespace, value)| match value {
                Value::Object(scope) => Some((namespace, scope)),
                _ => None,
            })
            .collect();
        Self {
            path: Some(path),
            namespaces,
            dirty: false,
        }
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    pub fn get(&self, namespace: &str, key: &str) -> Option<&Value> {
        self.namespaces.get(namespace)?.get(key)
    }

    pub fn get_as<T: DeserializeOwned>(&self, namespace: &str, key: &str) -> Option<T> {
        self.get(namespace, key)
            .cloned()
            .and_then(|value| serde_json::from_value(value).ok())
    }

    pub fn contains(&self, namespace: &str, key: &str) -> bool {
        self.get(namespace, key).is_some()
    }

    pub fn set(&mut self, namespace: &str, key: &str, value: Value) {
        let scope = self.namespaces.entry(namespace.to_string()).or_default();
        if scope.get(key) == Some(&value) {
            return;
        }
        scope.insert(key.to_string(), value);
        self.dirty = true;
    }

    pub fn set_as<T: Serialize>(
        &mut self,
        namespace: &str,
        key: &str,
        value: &T,
    ) -> anyhow::Result<()> {
        self.set(namespace, key, serde_json::to_value(value)?);
        Ok(())
    }

    /// Drops one namespace. Returns whether anything was stored there.
    pub fn clear(&mut self, namespace: &str) -> bool {
        let removed = self.namespaces.shift_remove(namespace).is_some();
        self.dirty |= removed;
        removed
    }

    pub fn clear_all(&mut self) {
        if !self.namespaces.is_empty() {
            self.namespaces.clear();
            self.dirty = true;
        }
    }

    pub fn namespaces(&self) -> impl Iterator<Item = &str> {
        self.namespaces.keys().map(String::as_str)
    }

    pub fn flush(&mut self) -> anyhow::Result<()> {
        let Some(path) = self.path.as_deref() else {
            return Ok(());
        };
        if !self.dirty {
            return Ok(());
        }
        if let Some(dir) = path.parent().filter(|dir| !dir.as_os_str().is_empty()) {
            fs::create_dir_all(dir)
                .with_context(|| format!("failed creating {}", dir.display()))?;
        }
        let body = serde_json::to_string_pretty(&self.namespaces)?;
        fs::write(path, body).with_context(|| format!("failed writing {}", path.display()))?;
        self.dirty = false;
        Ok(())
    }
}
