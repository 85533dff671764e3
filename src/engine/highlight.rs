//! Focus neighbourhoods for hover emphasis.

use std::collections::HashSet;

use super::types::{AggregatedEdge, normalize_id};

/// The focused node and its one-hop neighbours over `edges`.
///
/// Pass the filtered edge set the view is showing; hidden edges contribute no
/// neighbours. No focus gives an empty set.
pub fn resolve(focused: Option<&str>, edges: &[AggregatedEdge]) -> HashSet<String> {
	let Some(focused) = focused.map(normalize_id) else {
		return HashSet::new();
	};

	let mut set = HashSet::from([focused.to_string()]);
	for edge in edges {
		let (source, target) = (normalize_id(&edge.source), normalize_id(&edge.target));
		if source == focused {
			set.insert(target.to_string());
		} else if target == focused {
			set.insert(source.to_string());
		}
	}
	set
}

#[cfg(test)]
mod tests {
	use super::*;

	fn edge(a: &str, b: &str) -> AggregatedEdge {
		AggregatedEdge {
			source: a.into(),
			target: b.into(),
			kind: "x".into(),
			count: 1,
			total_weight: 1.0,
		}
	}

	#[test]
	fn no_focus_no_highlight() {
		assert!(resolve(None, &[edge("a", "b")]).is_empty());
	}

	#[test]
	fn both_directions_count() {
		let edges = [edge("a", "b"), edge("c", "a"), edge("c", "d")];
		let set = resolve(Some("a"), &edges);
		assert_eq!(set, HashSet::from(["a".into(), "b".into(), "c".into()]));
	}

	#[test]
	fn isolated_focus_is_just_itself() {
		assert_eq!(resolve(Some("z"), &[edge("a", "b")]), HashSet::from(["z".into()]));
	}
}
