//! Engine settings, loadable from JSON with every field optional.

use serde::{Deserialize, Serialize};

use super::aggregate::AggregateOptions;
use super::error::ValidationError;
use super::force::ForceConfig;
use super::tier::ClassifierConfig;
use super::tier_layout::TierLayoutConfig;

/// Which layout produces positions for a snapshot.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LayoutStrategy {
	/// Deterministic tier columns.
	#[default]
	Tiered,
	/// Physics simulation.
	Force,
}

impl LayoutStrategy {
	/// The other strategy.
	pub fn toggled(self) -> Self {
		match self {
			Self::Tiered => Self::Force,
			Self::Force => Self::Tiered,
		}
	}
}

/// Everything the engine can be tuned with. Every section is optional in JSON.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
	/// Tier rule table and label settings.
	pub classifier: ClassifierConfig,
	/// Edge merging and filtering.
	pub aggregation: AggregateOptions,
	/// Physics constants.
	pub force: ForceConfig,
	/// Column spacing.
	pub tiers: TierLayoutConfig,
	/// Layout used by the pipeline.
	pub strategy: LayoutStrategy,
	/// Keep nodes that no surviving edge touches.
	pub keep_isolated_nodes: bool,
}

impl Default for EngineConfig {
	fn default() -> Self {
		Self {
			classifier: ClassifierConfig::default(),
			aggregation: AggregateOptions::default(),
			force: ForceConfig::default(),
			tiers: TierLayoutConfig::default(),
			strategy: LayoutStrategy::default(),
			keep_isolated_nodes: true,
		}
	}
}

fn invalid(field: &'static str, reason: impl Into<String>) -> ValidationError {
	ValidationError::InvalidConfig {
		field,
		reason: reason.into(),
	}
}

fn finite(field: &'static str, value: f64) -> Result<f64, ValidationError> {
	if value.is_finite() {
		Ok(value)
	} else {
		Err(invalid(field, format!("{value} is not finite")))
	}
}

fn positive(field: &'static str, value: f64) -> Result<(), ValidationError> {
	if finite(field, value)? > 0.0 {
		Ok(())
	} else {
		Err(invalid(field, format!("{value} must be greater than zero")))
	}
}

fn non_negative(field: &'static str, value: f64) -> Result<(), ValidationError> {
	if finite(field, value)? >= 0.0 {
		Ok(())
	} else {
		Err(invalid(field, format!("{value} must not be negative")))
	}
}

impl EngineConfig {
	/// Parses a (possibly partial) JSON config and validates it.
	pub fn from_json(json: &str) -> Result<Self, ValidationError> {
		let config: Self = serde_json::from_str(json)?;
		config.validate()?;
		Ok(config)
	}

	/// Checks every numeric setting is usable.
	pub fn validate(&self) -> Result<(), ValidationError> {
		non_negative("aggregation.min_weight", self.aggregation.min_weight)?;

		let force = &self.force;
		non_negative("force.repulsion", force.repulsion)?;
		non_negative("force.attraction", force.attraction)?;
		if !(finite("force.damping", force.damping)? >= 0.0 && force.damping < 1.0) {
			return Err(invalid("force.damping", format!("{} must be in [0, 1)", force.damping)));
		}
		positive("force.dt", force.dt)?;
		positive("force.spacing", force.spacing)?;
		positive("force.width", force.width)?;
		positive("force.height", force.height)?;

		let tiers = &self.tiers;
		non_negative("tiers.lane_gap", tiers.lane_gap)?;
		non_negative("tiers.node_gap", tiers.node_gap)?;
		non_negative("tiers.node_size", tiers.node_size)?;
		non_negative("tiers.padding", tiers.padding)?;

		if self.classifier.ellipsis.chars().count() > self.classifier.max_label_len {
			return Err(invalid(
				"classifier.ellipsis",
				"longer than classifier.max_label_len",
			));
		}
		Ok(())
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::engine::tier::TierId;

	#[test]
	fn defaults_are_valid() {
		let config = EngineConfig::default();
		assert_eq!(config.force.iterations, 80);
		assert_eq!(config.force.damping, 0.85);
		assert_eq!(config.aggregation.min_weight, 0.0);
		assert_eq!(config.aggregation.max_edges, Some(200));
		assert!(config.validate().is_ok());
	}

	#[test]
	fn partial_json_fills_defaults() {
		let config = EngineConfig::from_json(
			r#"{"strategy": "force", "force": {"iterations": 10}, "classifier": {"default_tier": "external"}}"#,
		)
		.unwrap();
		assert_eq!(config.strategy, LayoutStrategy::Force);
		assert_eq!(config.force.iterations, 10);
		assert_eq!(config.force.damping, 0.85);
		assert_eq!(config.classifier.default_tier, TierId::External);
		assert!(!config.classifier.rules.is_empty());
	}

	#[test]
	fn rejects_runaway_damping() {
		let err = EngineConfig::from_json(r#"{"force": {"damping": 1.5}}"#).unwrap_err();
		assert!(matches!(err, ValidationError::InvalidConfig { field: "force.damping", .. }));
	}

	#[test]
	fn rejects_zero_canvas() {
		let mut config = EngineConfig::default();
		config.force.width = 0.0;
		assert!(config.validate().is_err());
	}

	#[test]
	fn rejects_wrong_types() {
		assert!(matches!(
			EngineConfig::from_json(r#"{"force": {"iterations": "many"}}"#),
			Err(ValidationError::Json(_))
		));
	}
}
