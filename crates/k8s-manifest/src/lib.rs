//! Identity injection for free-form Kubernetes manifests.
//!
//! A manifest is declared as an arbitrary YAML (or JSON) document next to the
//! identity fields that own it. [`merge`] stamps `kind`, `metadata.name` and
//! `metadata.namespace` into the document and renders it back to YAML, ready
//! to be piped into `kubectl apply -f -`.

pub mod yaml;

use serde_json::{Map, Value};
use thiserror::Error;
use tracing::instrument;

/// Errors produced while merging identity fields into a manifest.
#[derive(Debug, Error)]
pub enum MergeError {
	#[error("parsing yaml")]
	Parse(#[source] serde_yaml_with_quirks::Error),

	#[error("metadata must be a mapping, got {0}")]
	MetadataNotMapping(&'static str),

	#[error("no namespace provided but yml has namespace {0:?}")]
	NamespaceConflict(String),

	#[error("generating yaml")]
	Serialize(#[source] serde_saphyr::ser_error::Error),
}

/// Parse `content`, inject the identity fields and render the result as YAML.
///
/// An empty `namespace` is the same as `None`. Without a namespace the
/// document must not carry `metadata.namespace` either, since it would be
/// unclear who owns it.
#[instrument(skip(content))]
pub fn merge(
	content: &str,
	name: &str,
	namespace: Option<&str>,
	kind: &str,
) -> Result<String, MergeError> {
	let document = parse(content)?;
	let document = merge_document(document, name, namespace, kind)?;
	yaml::to_yaml(Value::Object(document)).map_err(MergeError::Serialize)
}

/// Parse a manifest into a string-keyed mapping.
///
/// A document without a value (blank, comments only, a bare `---`, `null`
/// or `~`) is an empty mapping.
pub fn parse(content: &str) -> Result<Map<String, Value>, MergeError> {
	if !has_content(content) {
		return Ok(Map::new());
	}
	serde_yaml_with_quirks::from_str::<Option<Map<String, Value>>>(content)
		.map(Option::unwrap_or_default)
		.map_err(MergeError::Parse)
}

// The parser reports end of stream for input holding only comments and
// document markers.
fn has_content(content: &str) -> bool {
	content.lines().any(|line| {
		let line = line.trim();
		!(line.is_empty() || line.starts_with('#') || line == "---" || line == "...")
	})
}

/// Inject identity fields into an already parsed manifest.
pub fn merge_document(
	mut document: Map<String, Value>,
	name: &str,
	namespace: Option<&str>,
	kind: &str,
) -> Result<Map<String, Value>, MergeError> {
	let namespace = namespace.filter(|ns| !ns.is_empty());

	document.insert("kind".to_owned(), Value::String(kind.to_owned()));

	if document.get("metadata").is_some_and(Value::is_null) {
		document.remove("metadata");
	}
	let metadata = match document
		.entry("metadata")
		.or_insert_with(|| Value::Object(Map::new()))
	{
		Value::Object(metadata) => metadata,
		other => return Err(MergeError::MetadataNotMapping(type_name(other))),
	};

	match namespace {
		Some(namespace) => {
			metadata.insert("namespace".to_owned(), Value::String(namespace.to_owned()));
		}
		None => {
			if let Some(existing) = metadata.get("namespace") {
				let existing = match existing {
					Value::String(s) => s.clone(),
					other => other.to_string(),
				};
				return Err(MergeError::NamespaceConflict(existing));
			}
		}
	}

	metadata.insert("name".to_owned(), Value::String(name.to_owned()));

	Ok(document)
}

fn type_name(value: &Value) -> &'static str {
	match value {
		Value::Null => "null",
		Value::Bool(_) => "a boolean",
		Value::Number(_) => "a number",
		Value::String(_) => "a string",
		Value::Array(_) => "a sequence",
		Value::Object(_) => "a mapping",
	}
}
