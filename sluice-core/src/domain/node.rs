//! Node-detail tree
//!
//! The backend's view of a run's execution graph: nodes with their steps and
//! any pending input metadata. Only the fields the gateway reasons about are
//! typed; everything else is carried along untouched so the tree can be handed
//! back to clients verbatim.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// A stage or parallel branch of a run, with its steps
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NodeDetail {
    pub id: String,
    #[serde(default)]
    pub steps: Vec<StepDetail>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl NodeDetail {
    pub fn step(&self, step_id: &str) -> Option<&StepDetail> {
        self.steps.iter().find(|s| s.id == step_id)
    }
}

/// A single step, optionally paused on an input request
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StepDetail {
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub input: Option<InputRequest>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Pending human-input prompt attached to a step
///
/// `submitter` is free text authored in the pipeline definition. It is usually
/// a comma separated list of user names but nothing guarantees its shape.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct InputRequest {
    #[serde(default)]
    pub submitter: Value,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl InputRequest {
    pub fn with_submitter(submitter: impl Into<String>) -> Self {
        Self {
            submitter: Value::String(submitter.into()),
            extra: Map::new(),
        }
    }

    /// Raw submitter text; absent or null renders as empty
    ///
    /// A list of names is joined with commas. Objects keep their JSON text,
    /// which matches no user name.
    pub fn submitter_text(&self) -> String {
        match &self.submitter {
            Value::Null => String::new(),
            Value::String(s) => s.clone(),
            Value::Array(items) => items
                .iter()
                .filter_map(Value::as_str)
                .collect::<Vec<_>>()
                .join(","),
            other => other.to_string(),
        }
    }

    /// Submitter entries, split on commas and trimmed
    pub fn submitters(&self) -> Vec<String> {
        split_submitters(&self.submitter_text())
    }
}

/// Split a free-text submitter list into trimmed entries
pub fn split_submitters(raw: &str) -> Vec<String> {
    if raw.is_empty() {
        return Vec::new();
    }
    raw.split(',').map(|s| s.trim().to_string()).collect()
}

/// Find the input request at a node/step coordinate, if the run has one
pub fn find_input<'a>(
    nodes: &'a [NodeDetail],
    node_id: &str,
    step_id: &str,
) -> Option<&'a InputRequest> {
    nodes
        .iter()
        .find(|n| n.id == node_id)?
        .step(step_id)?
        .input
        .as_ref()
}
