//! Wire types and the shapes passed between engine stages.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::error::ValidationError;
use super::tier::TierId;

/// Largest accepted sum of edge weights.
pub const MAX_TOTAL_WEIGHT: f64 = f64::MAX / 2.0;

/// Trims the surrounding whitespace the backend sometimes leaves on resource ids.
pub fn normalize_id(id: &str) -> &str {
	id.trim()
}

/// A resource as delivered by the graph API.
#[derive(Clone, Debug, Default, PartialEq, Deserialize)]
#[serde(try_from = "Map<String, Value>")]
pub struct RawNode {
	/// Resource id (`i-0abc`, `sg-12`, an ARN, ...).
	pub id: String,
	/// Display name, when the backend has one.
	pub name: Option<String>,
	/// Resource type string (`EC2`, `SecurityGroup`, `IAMRole`, ...).
	pub node_type: Option<String>,
	/// Graph labels; the first one stands in for a missing `type`.
	pub labels: Vec<String>,
	/// Every other field, untouched.
	pub properties: Map<String, Value>,
}

impl RawNode {
	/// Builds a node with just an id, name and type.
	pub fn new(id: impl Into<String>, name: impl Into<String>, node_type: impl Into<String>) -> Self {
		Self {
			id: id.into(),
			name: Some(name.into()),
			node_type: Some(node_type.into()),
			..Self::default()
		}
	}

	/// The type used for classification: `type`, else the first label, else empty.
	pub fn type_name(&self) -> &str {
		self.node_type
			.as_deref()
			.or_else(|| self.labels.first().map(String::as_str))
			.unwrap_or("")
	}

	/// The name, or the id when the name is missing or blank.
	pub fn display_name(&self) -> &str {
		match self.name.as_deref().map(str::trim) {
			Some(name) if !name.is_empty() => name,
			_ => normalize_id(&self.id),
		}
	}
}

/// Removes the first non-null of `keys`, in order. Later aliases stay in `row`.
fn take_string(row: &mut Map<String, Value>, keys: &[&str], field: &str) -> Result<Option<String>, String> {
	for key in keys {
		match row.remove(*key) {
			None | Some(Value::Null) => continue,
			Some(Value::String(s)) => return Ok(Some(s)),
			Some(other) => return Err(format!("`{field}` must be a string, got {other}")),
		}
	}
	Ok(None)
}

fn take_number(row: &mut Map<String, Value>, keys: &[&str], field: &str) -> Result<Option<f64>, String> {
	for key in keys {
		match row.remove(*key) {
			None | Some(Value::Null) => continue,
			Some(Value::Number(n)) => return Ok(n.as_f64()),
			Some(other) => return Err(format!("`{field}` must be a number, got {other}")),
		}
	}
	Ok(None)
}

impl TryFrom<Map<String, Value>> for RawNode {
	type Error = String;

	fn try_from(mut row: Map<String, Value>) -> Result<Self, Self::Error> {
		let id = take_string(&mut row, &["id", "resourceId"], "id")?
			.ok_or_else(|| "node is missing `id`".to_string())?;
		let name = take_string(&mut row, &["name"], "name")?;
		let node_type = take_string(&mut row, &["type"], "type")?;
		let labels = match row.remove("labels") {
			None | Some(Value::Null) => Vec::new(),
			Some(Value::Array(items)) => items
				.into_iter()
				.filter_map(|v| match v {
					Value::String(s) => Some(s),
					_ => None,
				})
				.collect(),
			Some(other) => return Err(format!("node `labels` must be an array, got {other}")),
		};
		Ok(Self {
			id,
			name,
			node_type,
			labels,
			properties: row,
		})
	}
}

/// One observed or allowed connection before merging.
///
/// Rows may name a field several ways (`kind`/`type`/`relType`,
/// `weight`/`hits`/`hitCount`); the first present name wins.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Map<String, Value>")]
pub struct RawEdge {
	/// Source node id.
	pub source: String,
	/// Target node id.
	pub target: String,
	/// Relationship kind (`PROTECTED_BY`, `ACTUAL_TRAFFIC`, ...).
	pub kind: String,
	/// Weight or hit count; `None` counts as 1.
	#[serde(skip_serializing_if = "Option::is_none")]
	pub weight: Option<f64>,
}

impl RawEdge {
	/// Builds an unweighted edge.
	pub fn new(source: impl Into<String>, target: impl Into<String>, kind: impl Into<String>) -> Self {
		Self {
			source: source.into(),
			target: target.into(),
			kind: kind.into(),
			weight: None,
		}
	}

	/// Sets the weight.
	pub fn weighted(mut self, weight: f64) -> Self {
		self.weight = Some(weight);
		self
	}
}

impl TryFrom<Map<String, Value>> for RawEdge {
	type Error = String;

	fn try_from(mut row: Map<String, Value>) -> Result<Self, Self::Error> {
		let source = take_string(&mut row, &["source", "sourceId"], "source")?
			.ok_or_else(|| "edge is missing `source`".to_string())?;
		let target = take_string(&mut row, &["target", "targetId"], "target")?
			.ok_or_else(|| "edge is missing `target`".to_string())?;
		let kind = take_string(&mut row, &["kind", "type", "relType"], "kind")?.unwrap_or_default();
		let weight = take_number(&mut row, &["weight", "hits", "hitCount"], "weight")?;
		Ok(Self {
			source,
			target,
			kind,
			weight,
		})
	}
}

/// The `{nodes, edges}` payload handed to the engine.
#[derive(Clone, Debug, Default, PartialEq, Deserialize)]
pub struct GraphInput {
	/// Resources.
	#[serde(default)]
	pub nodes: Vec<RawNode>,
	/// Connections, duplicates allowed.
	#[serde(default, alias = "links", alias = "relationships")]
	pub edges: Vec<RawEdge>,
}

impl GraphInput {
	/// Parses and validates a JSON payload.
	pub fn from_json(json: &str) -> Result<Self, ValidationError> {
		let input: Self = serde_json::from_str(json)?;
		input.validate()?;
		Ok(input)
	}

	/// Rejects weights that would poison the aggregation and physics passes.
	///
	/// Besides each weight on its own, the sum of all weights must stay below
	/// half of `f64::MAX`: per-node in plus out totals add two such sums.
	pub fn validate(&self) -> Result<(), ValidationError> {
		let mut total = 0.0;
		for (index, edge) in self.edges.iter().enumerate() {
			let Some(weight) = edge.weight else {
				continue;
			};
			if !weight.is_finite() {
				return Err(ValidationError::NonFiniteWeight {
					index,
					from: edge.source.clone(),
					to: edge.target.clone(),
					weight,
				});
			}
			if weight < 0.0 {
				return Err(ValidationError::NegativeWeight {
					index,
					from: edge.source.clone(),
					to: edge.target.clone(),
					weight,
				});
			}
			total += weight;
		}
		if !total.is_finite() || total > MAX_TOTAL_WEIGHT {
			return Err(ValidationError::WeightOverflow { total });
		}
		Ok(())
	}
}

/// A node after tier assignment. Never mutated once built.
#[derive(Clone, Debug, PartialEq)]
pub struct ClassifiedNode {
	/// The input node.
	pub node: RawNode,
	/// Assigned tier.
	pub tier: TierId,
	/// Shortened display label.
	pub label: String,
}

impl ClassifiedNode {
	/// Normalized node id.
	pub fn id(&self) -> &str {
		normalize_id(&self.node.id)
	}
}

/// All raw edges sharing one `(source, target, kind)` key.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct AggregatedEdge {
	/// Source node id.
	pub source: String,
	/// Target node id.
	pub target: String,
	/// Relationship kind.
	pub kind: String,
	/// Number of raw edges merged, at least 1.
	pub count: usize,
	/// Summed weight, floored at 1.
	pub total_weight: f64,
}

/// Placement of one node.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct LayoutPosition {
	/// Node id.
	pub node_id: String,
	/// Horizontal coordinate.
	pub x: f64,
	/// Vertical coordinate.
	pub y: f64,
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn parses_backend_rows() {
		let input = GraphInput::from_json(
			r#"{
				"nodes": [
					{"id": "i-1", "name": "web", "type": "EC2", "region": "eu-west-1"},
					{"resourceId": "sg-1", "labels": ["SecurityGroup", "Resource"]}
				],
				"relationships": [
					{"sourceId": "i-1", "targetId": "sg-1", "type": "PROTECTED_BY"},
					{"source": "i-1", "target": "sg-1", "kind": "ACTUAL_TRAFFIC", "hits": 12}
				]
			}"#,
		)
		.unwrap();

		assert_eq!(input.nodes[0].properties["region"], "eu-west-1");
		assert_eq!(input.nodes[1].id, "sg-1");
		assert_eq!(input.nodes[1].type_name(), "SecurityGroup");
		assert_eq!(input.nodes[1].display_name(), "sg-1");
		assert_eq!(input.edges[0].kind, "PROTECTED_BY");
		assert_eq!(input.edges[0].weight, None);
		assert_eq!(input.edges[1].weight, Some(12.0));
	}

	#[test]
	fn rejects_non_string_ids() {
		let err = GraphInput::from_json(r#"{"nodes": [{"id": 7, "type": "EC2"}]}"#).unwrap_err();
		assert!(matches!(err, ValidationError::Json(ref msg) if msg.contains("id")));
	}

	#[test]
	fn rejects_bad_weights() {
		let mut input = GraphInput {
			nodes: Vec::new(),
			edges: vec![RawEdge::new("a", "b", "x").weighted(f64::INFINITY)],
		};
		assert!(matches!(input.validate(), Err(ValidationError::NonFiniteWeight { index: 0, .. })));

		input.edges[0].weight = Some(-1.0);
		assert!(matches!(input.validate(), Err(ValidationError::NegativeWeight { index: 0, .. })));
	}

	#[test]
	fn first_alias_wins_when_a_row_repeats_a_field() {
		let input = GraphInput::from_json(
			r#"{"edges": [
				{"source": "i-1", "target": "b", "kind": "ACTUAL_TRAFFIC", "type": "FLOW", "weight": 3, "hits": 9},
				{"sourceId": "i-1", "targetId": "b", "relType": "FLOW", "hitCount": 4}
			]}"#,
		)
		.unwrap();
		assert_eq!(input.edges[0].kind, "ACTUAL_TRAFFIC");
		assert_eq!(input.edges[0].weight, Some(3.0));
		assert_eq!(input.edges[1].kind, "FLOW");
		assert_eq!(input.edges[1].weight, Some(4.0));
	}

	#[test]
	fn rejects_edges_without_endpoints_or_with_text_weights() {
		assert!(GraphInput::from_json(r#"{"edges": [{"target": "b"}]}"#).is_err());
		assert!(GraphInput::from_json(r#"{"edges": [{"source": "a", "target": "b", "hits": "12"}]}"#).is_err());
	}

	#[test]
	fn rejects_weights_whose_sum_overflows() {
		let input = GraphInput {
			nodes: Vec::new(),
			edges: vec![
				RawEdge::new("i-1", "sg-1", "x").weighted(1e308),
				RawEdge::new("i-1", "sg-1", "x").weighted(1e308),
			],
		};
		assert!(matches!(input.validate(), Err(ValidationError::WeightOverflow { .. })));

		let near_limit = GraphInput {
			nodes: Vec::new(),
			edges: vec![RawEdge::new("i-1", "sg-1", "x").weighted(MAX_TOTAL_WEIGHT)],
		};
		assert_eq!(near_limit.validate(), Ok(()));
	}

	#[test]
	fn missing_sections_are_empty() {
		let input = GraphInput::from_json("{}").unwrap();
		assert!(input.nodes.is_empty() && input.edges.is_empty());
	}
}
