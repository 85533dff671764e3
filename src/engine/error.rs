//! Boundary errors.

use thiserror::Error;

/// Rejection of input that breaks the basic type contract.
///
/// Raised only at the boundary, before anything reaches aggregation or layout.
#[derive(Debug, Error, PartialEq)]
pub enum ValidationError {
	/// The payload is not valid JSON or a field has the wrong type.
	#[error("malformed graph payload: {0}")]
	Json(String),

	/// An edge weight is NaN or infinite.
	#[error("edge #{index} ({from} -> {to}) has non-finite weight {weight}")]
	NonFiniteWeight {
		/// Position of the edge in the input.
		index: usize,
		/// Edge source id.
		from: String,
		/// Edge target id.
		to: String,
		/// Offending value.
		weight: f64,
	},

	/// An edge weight is below zero.
	#[error("edge #{index} ({from} -> {to}) has negative weight {weight}")]
	NegativeWeight {
		/// Position of the edge in the input.
		index: usize,
		/// Edge source id.
		from: String,
		/// Edge target id.
		to: String,
		/// Offending value.
		weight: f64,
	},

	/// Every weight is finite, but their sum is not safely representable.
	#[error("edge weights sum to {total}, past the representable range")]
	WeightOverflow {
		/// Sum of the explicit weights.
		total: f64,
	},

	/// An engine setting is out of its usable range.
	#[error("invalid config `{field}`: {reason}")]
	InvalidConfig {
		/// Dotted path of the setting.
		field: &'static str,
		/// What is wrong with it.
		reason: String,
	},
}

impl From<serde_json::Error> for ValidationError {
	fn from(err: serde_json::Error) -> Self {
		Self::Json(err.to_string())
	}
}
