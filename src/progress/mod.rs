//! Structured progress reporting for pipeline runs.
//!
//! The pipeline emits discrete events through a caller-supplied
//! [`ProgressSink`]: leveled text messages plus stage-completion events
//! carrying item counts and elapsed time. Each run gets its own sink;
//! there is no shared global channel between runs.

use serde::{Deserialize, Serialize};

/// Message level for display.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProgressLevel {
    Info,
    Success,
    Warning,
    Error,
}

/// Pipeline stages, in execution order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Stage {
    /// Reading the staged input files.
    Read,
    /// Left outer join plus the Total derivation.
    Merge,
    /// Persisting the merged dataset.
    Write,
    /// Discovering and selecting output files.
    Select,
    /// Bundling the selection into the zip archive.
    Archive,
}

impl Stage {
    pub fn name(&self) -> &'static str {
        match self {
            Stage::Read => "read",
            Stage::Merge => "merge",
            Stage::Write => "write",
            Stage::Select => "select",
            Stage::Archive => "archive",
        }
    }
}

/// A single progress event.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum ProgressEvent {
    /// Free-form leveled message.
    #[serde(rename_all = "camelCase")]
    Message {
        level: ProgressLevel,
        message: String,
    },
    /// A pipeline stage finished.
    #[serde(rename_all = "camelCase")]
    StageCompleted {
        stage: Stage,
        /// Rows processed or files handled, whichever the stage counts.
        items: usize,
        elapsed_ms: u64,
    },
}

/// Receiver for pipeline progress events.
///
/// Object-safe so the pipeline can hold `&dyn ProgressSink`; the
/// convenience methods take `&str` for the same reason.
pub trait ProgressSink {
    fn emit(&self, event: ProgressEvent);

    fn info(&self, message: &str) {
        self.emit(ProgressEvent::Message {
            level: ProgressLevel::Info,
            message: message.to_string(),
        });
    }

    fn success(&self, message: &str) {
        self.emit(ProgressEvent::Message {
            level: ProgressLevel::Success,
            message: message.to_string(),
        });
    }

    fn warning(&self, message: &str) {
        self.emit(ProgressEvent::Message {
            level: ProgressLevel::Warning,
            message: message.to_string(),
        });
    }

    fn error(&self, message: &str) {
        self.emit(ProgressEvent::Message {
            level: ProgressLevel::Error,
            message: message.to_string(),
        });
    }

    fn stage_completed(&self, stage: Stage, items: usize, elapsed_ms: u64) {
        self.emit(ProgressEvent::StageCompleted {
            stage,
            items,
            elapsed_ms,
        });
    }
}

// =============================================================================
// Provided sinks
// =============================================================================

/// Renders events to stdout, one line each.
#[derive(Debug, Default)]
pub struct ConsoleSink;

impl ProgressSink for ConsoleSink {
    fn emit(&self, event: ProgressEvent) {
        match event {
            ProgressEvent::Message { level, message } => {
                let prefix = match level {
                    ProgressLevel::Info => "   ",
                    ProgressLevel::Success => "   ✓",
                    ProgressLevel::Warning => "   ⚠️",
                    ProgressLevel::Error => "   ❌",
                };
                println!("{} {}", prefix, message);
            }
            ProgressEvent::StageCompleted {
                stage,
                items,
                elapsed_ms,
            } => {
                println!("   ✓ [{}] {} items in {}ms", stage.name(), items, elapsed_ms);
            }
        }
    }
}

/// Discards every event.
#[derive(Debug, Default)]
pub struct NullSink;

impl ProgressSink for NullSink {
    fn emit(&self, _event: ProgressEvent) {}
}

/// Captures events in memory, for tests and embedding callers.
#[derive(Debug, Default)]
pub struct MemorySink {
    events: std::sync::Mutex<Vec<ProgressEvent>>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of everything emitted so far.
    pub fn events(&self) -> Vec<ProgressEvent> {
        self.events.lock().expect("progress sink poisoned").clone()
    }

    /// Completed stages, in emission order.
    pub fn completed_stages(&self) -> Vec<Stage> {
        self.events()
            .into_iter()
            .filter_map(|e| match e {
                ProgressEvent::StageCompleted { stage, .. } => Some(stage),
                _ => None,
            })
            .collect()
    }
}

impl ProgressSink for MemorySink {
    fn emit(&self, event: ProgressEvent) {
        self.events.lock().expect("progress sink poisoned").push(event);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_memory_sink_captures_in_order() {
        let sink = MemorySink::new();
        sink.info("reading");
        sink.stage_completed(Stage::Read, 42, 3);
        sink.success("done");

        let events = sink.events();
        assert_eq!(events.len(), 3);
        assert!(matches!(
            events[1],
            ProgressEvent::StageCompleted {
                stage: Stage::Read,
                items: 42,
                ..
            }
        ));
        assert_eq!(sink.completed_stages(), vec![Stage::Read]);
    }

    #[test]
    fn test_event_serialization() {
        let event = ProgressEvent::StageCompleted {
            stage: Stage::Merge,
            items: 10,
            elapsed_ms: 5,
        };
        let json = serde_json::to_string(&event).unwrap();
        assert!(json.contains("\"kind\":\"stageCompleted\""));
        assert!(json.contains("\"stage\":\"merge\""));
        assert!(json.contains("\"elapsedMs\":5"));
    }

    #[test]
    fn test_level_serialization() {
        let event = ProgressEvent::Message {
            level: ProgressLevel::Warning,
            message: "no outputs produced".into(),
        };
        let json = serde_json::to_string(&event).unwrap();
        assert!(json.contains("\"level\":\"warning\""));
    }
}
