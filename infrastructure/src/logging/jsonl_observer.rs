//! JSONL file writer for workflow step events.
//!
//! Each [`StepEvent`] is serialized as a single JSON line with `type`,
//! `execution_id` and `timestamp` fields merged into its payload, appended
//! to the file via a buffered writer.

use maestro_application::{StepEvent, StepObserver};
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use tracing::warn;

/// JSONL step observer that writes one JSON object per line.
///
/// Thread-safe via `Mutex<BufWriter<File>>`. Flushes on `Drop`.
pub struct JsonlStepObserver {
    writer: Mutex<BufWriter<File>>,
    path: PathBuf,
}

impl JsonlStepObserver {
    /// Create a new observer writing to the given path.
    ///
    /// Creates the file (and parent directories) if they don't exist.
    /// Returns `None` if the file cannot be created.
    pub fn new(path: impl AsRef<Path>) -> Option<Self> {
        let path = path.as_ref();

        if let Some(parent) = path.parent()
            && let Err(e) = std::fs::create_dir_all(parent)
        {
            warn!(
                "Could not create step trace directory {}: {}",
                parent.display(),
                e
            );
            return None;
        }

        let file = match File::create(path) {
            Ok(f) => f,
            Err(e) => {
                warn!("Could not create step trace file {}: {}", path.display(), e);
                return None;
            }
        };

        Some(Self {
            writer: Mutex::new(BufWriter::new(file)),
            path: path.to_path_buf(),
        })
    }

    /// Get the path to the trace file.
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl StepObserver for JsonlStepObserver {
    fn record(&self, event: &StepEvent) {
        let timestamp = chrono::Utc::now().to_rfc3339_opts(chrono::SecondsFormat::Millis, true);

        // Merge payload with type + execution_id + timestamp
        let record = if let serde_json::Value::Object(map) = &event.payload {
            let mut map = map.clone();
            map.insert(
                "type".to_string(),
                serde_json::Value::String(event.event_type.clone()),
            );
            map.insert(
                "execution_id".to_string(),
                serde_json::Value::String(event.execution_id.clone()),
            );
            map.insert(
                "timestamp".to_string(),
                serde_json::Value::String(timestamp),
            );
            serde_json::Value::Object(map)
        } else {
            serde_json::json!({
                "type": event.event_type,
                "execution_id": event.execution_id,
                "timestamp": timestamp,
                "data": event.payload,
            })
        };

        let Ok(line) = serde_json::to_string(&record) else {
            return;
        };

        if let Ok(mut writer) = self.writer.lock() {
            let _ = writeln!(writer, "{}", line);
            // Flush every line; the trace is append-only and crash-relevant
            let _ = writer.flush();
        }
    }
}

impl Drop for JsonlStepObserver {
    fn drop(&mut self) {
        if let Ok(mut writer) = self.writer.lock() {
            let _ = writer.flush();
        }
    }
}
