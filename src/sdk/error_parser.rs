//! Turns raw SDK failures into something a user can act on.

use crate::error::SdkError;
use itertools::Itertools;
use regex::Regex;
use serde_json::Value;
use std::sync::LazyLock;

static THRESHOLD_FAILURE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"Threshold of responses not met; TACo decryption failed with errors: (.*)")
        .expect("threshold failure pattern is valid")
});
static NODE_MESSAGE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"ThresholdDecryptionRequestFailed\('Node .* raised (.*?)'\)")
        .expect("node message pattern is valid")
});
static ERROR_CLASS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"<class '(.+?)'").expect("error class pattern is valid"));

/// One node's reason for refusing a decryption share.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NodeError {
    pub node_address: String,
    pub error_message: String,
    pub error_type: String,
}

impl NodeError {
    fn unknown(message: &str, error_type: &str) -> Self {
        Self {
            node_address: "Unknown".to_string(),
            error_message: message.to_string(),
            error_type: error_type.to_string(),
        }
    }
}

/// Splits a threshold failure into per-node errors.
///
/// Messages that are not threshold failures come back as a single
/// `Unknown Error` entry carrying the raw text.
pub fn parse_threshold_error(message: &str) -> Vec<NodeError> {
    let Some(json) = THRESHOLD_FAILURE
        .captures(message)
        .and_then(|c| c.get(1))
        .map(|m| m.as_str())
        .filter(|s| !s.is_empty())
    else {
        return vec![NodeError::unknown(message, "Unknown Error")];
    };

    match serde_json::from_str::<Value>(json) {
        Ok(Value::Object(nodes)) => nodes
            .into_iter()
            .map(|(node_address, details)| parse_node(node_address, &details))
            .collect(),
        _ => vec![NodeError::unknown(message, "Parse Error")],
    }
}

fn parse_node(node_address: String, details: &Value) -> NodeError {
    let Value::String(text) = details else {
        return NodeError {
            node_address,
            error_message: "Unknown error".to_string(),
            error_type: "Unknown".to_string(),
        };
    };

    let error_message = NODE_MESSAGE
        .captures(text)
        .and_then(|c| c.get(1))
        .map(|m| m.as_str())
        .filter(|s| !s.is_empty())
        .unwrap_or(text.as_str())
        .to_string();
    let error_type = ERROR_CLASS
        .captures(text)
        .and_then(|c| c.get(1))
        .and_then(|m| m.as_str().rsplit('.').next())
        .filter(|s| !s.is_empty())
        .unwrap_or("Unknown")
        .to_string();

    NodeError {
        node_address,
        error_message,
        error_type,
    }
}

/// Groups node addresses by the message they reported, ordered by message.
pub fn group_by_message(errors: &[NodeError]) -> Vec<(String, Vec<String>)> {
    errors
        .iter()
        .into_group_map_by(|e| e.error_message.clone())
        .into_iter()
        .map(|(message, group)| {
            let nodes: Vec<String> = group.into_iter().map(|e| e.node_address.clone()).collect();
            (message, nodes)
        })
        .sorted_by(|a, b| a.0.cmp(&b.0))
        .collect()
}

/// A failed SDK call with its user-facing summary.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SdkFailure {
    pub raw: String,
    pub summary: String,
    pub node_errors: Vec<NodeError>,
}

impl SdkFailure {
    pub fn from_message(raw: &str) -> Self {
        if !THRESHOLD_FAILURE.is_match(raw) {
            return Self {
                raw: raw.to_string(),
                summary: raw.to_string(),
                node_errors: Vec::new(),
            };
        }

        let node_errors = parse_threshold_error(raw);
        let mut summary = String::from("Decryption failed: threshold of responses not met");
        for (message, nodes) in group_by_message(&node_errors) {
            summary.push_str(&format!("\n- {}: {}", message, nodes.join(", ")));
        }
        Self {
            raw: raw.to_string(),
            summary,
            node_errors,
        }
    }
}

impl From<SdkError> for SdkFailure {
    fn from(error: SdkError) -> Self {
        Self::from_message(&error.message)
    }
}
