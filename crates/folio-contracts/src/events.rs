use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use chrono::{SecondsFormat, Utc};
use serde::Serialize;
use serde_json::Value;
use uuid::Uuid;

/// Something the host did during one session, tagged by `type`.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum SessionEvent {
    SessionStarted {
        mode: String,
        project_count: usize,
        data_dir: String,
        out_dir: String,
        session_path: Option<String>,
    },
    ProjectSelected {
        project: String,
    },
    ProjectRendered {
        project: String,
    },
    DispatchFailed {
        project: String,
        kind: String,
        message: String,
    },
    /// `project` is `None` when every namespace was cleared.
    SessionReset {
        project: Option<String>,
        cleared: bool,
    },
    SessionFinished {
        renders: usize,
    },
}

/// Append-only `events.jsonl` for one session: one compact object per line
/// with the event fields plus `session_id` and `ts`.
#[derive(Debug, Clone)]
pub struct EventWriter {
    path: PathBuf,
    session_id: String,
}

impl EventWriter {
    pub fn new(path: impl Into<PathBuf>, session_id: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            session_id: session_id.into(),
        }
    }

    pub fn for_new_session(path: impl Into<PathBuf>) -> Self {
        Self::new(path, Uuid::new_v4().to_string())
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn session_id(&self) -> &str {
        &self.session_id
    }

    /// Appends `event` and returns the object that was written.
    pub fn emit(&self, event: &SessionEvent) -> Result<Value> {
        let Value::Object(mut fields) = serde_json::to_value(event)? else {
            bail!("session event did not serialize to an object");
        };
        fields.insert(
            "session_id".to_string(),
            Value::String(self.session_id.clone()),
        );
        fields.insert(
            "ts".to_string(),
            Value::String(Utc::now().to_rfc3339_opts(SecondsFormat::Micros, false)),
        );
        let record = Value::Object(fields);
        append_line(&self.path, &serde_json::to_string(&record)?)?;
        Ok(record)
    }
}

fn append_line(path: &Path, line: &str) -> Result<()> {
    if let Some(parent) = path.parent().filter(|dir| !dir.as_os_str().is_empty()) {
        fs::create_dir_all(parent)
            .with_context(|| format!("failed creating {}", parent.display()))?;
    }
    let mut file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .with_context(|| format!("failed opening {}", path.display()))?;
    writeln!(file, "{line}")?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use chrono::DateTime;

    use super::*;

    fn read_lines(path: &Path) -> Result<Vec<Value>> {
        fs::read_to_string(path)?
            .lines()
            .map(|line| Ok(serde_json::from_str(line)?))
            .collect()
    }

    #[test]
    fn events_are_tagged_and_stamped() -> Result<()> {
        let temp = tempfile::tempdir()?;
        let writer = EventWriter::new(temp.path().join("events.jsonl"), "session-123");

        let written = writer.emit(&SessionEvent::ProjectSelected {
            project: "Home".to_string(),
        })?;
        let lines = read_lines(writer.path())?;

        assert_eq!(lines, vec![written]);
        assert_eq!(lines[0]["type"], "project_selected");
        assert_eq!(lines[0]["project"], "Home");
        assert_eq!(lines[0]["session_id"], "session-123");
        DateTime::parse_from_rfc3339(lines[0]["ts"].as_str().unwrap_or_default())?;
        Ok(())
    }

    #[test]
    fn optional_fields_serialize_as_null() -> Result<()> {
        let temp = tempfile::tempdir()?;
        let writer = EventWriter::new(temp.path().join("events.jsonl"), "s");
        let written = writer.emit(&SessionEvent::SessionReset {
            project: None,
            cleared: true,
        })?;
        assert_eq!(written["type"], "session_reset");
        assert!(written["project"].is_null());
        assert_eq!(written["cleared"], true);
        Ok(())
    }

    #[test]
    fn appends_in_order_and_creates_parent() -> Result<()> {
        let temp = tempfile::tempdir()?;
        let writer = EventWriter::for_new_session(temp.path().join("out").join("events.jsonl"));
        assert_eq!(writer.session_id().len(), 36);

        writer.emit(&SessionEvent::SessionFinished { renders: 0 })?;
        writer.emit(&SessionEvent::DispatchFailed {
            project: "Blog".to_string(),
            kind: "project_not_found".to_string(),
            message: "Project not found: Blog".to_string(),
        })?;

        let lines = read_lines(writer.path())?;
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[0]["renders"], 0);
        assert_eq!(lines[1]["type"], "dispatch_failed");
        assert_eq!(lines[1]["session_id"], lines[0]["session_id"]);
        Ok(())
    }
}
