use crate::error::EditorError;
use crate::ir::{Alternative, BRANCHING_QUESTION, ContentNode, NodeKind, is_end_scenario};
use anyhow::{Context, Result, anyhow};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

static LIBRARY_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(?P<name>H5P\.[A-Za-z][A-Za-z0-9]*)(?:\s+(?P<major>\d+)\.(?P<minor>\d+))?$")
        .unwrap()
});

/// Machine name of a versioned library string, e.g.
/// `"H5P.BranchingQuestion 1.0"` -> `"H5P.BranchingQuestion"`.
pub fn library_machine_name(library: &str) -> Option<&str> {
    LIBRARY_RE
        .captures(library.trim())
        .and_then(|captures| captures.name("name"))
        .map(|name| name.as_str())
}

pub fn is_branching_library(library: &str) -> bool {
    library_machine_name(library) == Some(BRANCHING_QUESTION)
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawNode {
    #[serde(rename = "type")]
    library: RawLibrary,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    next_content_id: Option<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    content_title: Option<String>,
    #[serde(flatten)]
    extras: Map<String, Value>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawLibrary {
    library: String,
    #[serde(default)]
    params: Value,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    sub_content_id: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawAlternative {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    next_content_id: Option<i32>,
    #[serde(flatten)]
    extras: Map<String, Value>,
}

/// Parse a scenario content array. Strict JSON first, json5 as a fallback so
/// hand-authored fixtures may carry comments and trailing commas.
pub fn parse_content(input: &str) -> Result<Vec<ContentNode>> {
    let raw: Vec<RawNode> = match serde_json::from_str(input) {
        Ok(raw) => raw,
        Err(json_err) => json5::from_str(input)
            .map_err(|_| json_err)
            .context("content array is not valid JSON")?,
    };

    let content = raw
        .into_iter()
        .enumerate()
        .map(|(id, node)| decode_node(node).map_err(|err| anyhow!("content node {id}: {err}")))
        .collect::<Result<Vec<_>>>()?;

    validate_graph(&content)?;
    Ok(content)
}

/// Serialize a content array back to the host document shape.
pub fn emit_content(content: &[ContentNode]) -> Result<String> {
    let raw: Vec<RawNode> = content.iter().map(encode_node).collect();
    Ok(serde_json::to_string_pretty(&raw)?)
}

fn decode_node(raw: RawNode) -> Result<ContentNode, EditorError> {
    if library_machine_name(&raw.library.library).is_none() {
        return Err(EditorError::invalid(format!(
            "unrecognized library string {:?}",
            raw.library.library
        )));
    }

    let mut params = raw.library.params;
    let kind = if is_branching_library(&raw.library.library) {
        let question = match &mut params {
            Value::Object(map) => map.remove("branchingQuestion"),
            _ => None,
        };
        let Some(Value::Object(mut question)) = question else {
            return Err(EditorError::invalid(
                "branching node lacks a branchingQuestion params block",
            ));
        };
        let Some(alternatives) = question.remove("alternatives") else {
            return Err(EditorError::invalid(
                "branching node lacks an alternatives list",
            ));
        };
        let alternatives: Vec<RawAlternative> = serde_json::from_value(alternatives)
            .map_err(|err| EditorError::invalid(format!("malformed alternatives: {err}")))?;
        NodeKind::Branching {
            alternatives: alternatives
                .into_iter()
                .map(|alternative| Alternative {
                    next_content_id: alternative.next_content_id,
                    extras: alternative.extras,
                })
                .collect(),
        }
    } else {
        NodeKind::Simple {
            next_content_id: raw.next_content_id,
        }
    };

    Ok(ContentNode {
        library: raw.library.library,
        title: raw.content_title,
        sub_content_id: raw.library.sub_content_id,
        params,
        kind,
        extras: raw.extras,
    })
}

fn encode_node(node: &ContentNode) -> RawNode {
    let mut params = node.params.clone();
    let next_content_id = match &node.kind {
        NodeKind::Simple { next_content_id } => *next_content_id,
        NodeKind::Branching { alternatives } => {
            let raw_alternatives: Vec<Value> = alternatives
                .iter()
                .map(|alternative| {
                    serde_json::to_value(RawAlternative {
                        next_content_id: alternative.next_content_id,
                        extras: alternative.extras.clone(),
                    })
                    .unwrap_or(Value::Null)
                })
                .collect();
            let mut question = Map::new();
            question.insert("alternatives".to_string(), Value::Array(raw_alternatives));
            if !params.is_object() {
                params = Value::Object(Map::new());
            }
            if let Value::Object(map) = &mut params {
                map.insert("branchingQuestion".to_string(), Value::Object(question));
            }
            None
        }
    };

    RawNode {
        library: RawLibrary {
            library: node.library.clone(),
            params,
            sub_content_id: node.sub_content_id.clone(),
        },
        next_content_id,
        content_title: node.title.clone(),
        extras: node.extras.clone(),
    }
}

/// Invariant check: every link that addresses a node must be in bounds. The
/// mutators and the layout engine refuse to run on arrays that fail this.
pub fn validate_graph(content: &[ContentNode]) -> Result<(), EditorError> {
    for (id, node) in content.iter().enumerate() {
        for value in node.link_values() {
            if !is_end_scenario(value) && value as usize >= content.len() {
                return Err(EditorError::invalid(format!(
                    "node {id} links to {value}, but the array holds {} nodes",
                    content.len()
                )));
            }
        }
    }
    Ok(())
}
