//! Tier assignment.
//!
//! A node's tier decides its column in the tiered layout and which boundaries
//! its traffic crosses. Assignment walks an ordered rule table and falls back
//! to a default tier, so every node gets one.

use serde::{Deserialize, Serialize};

use super::types::{ClassifiedNode, RawNode, normalize_id};

/// Ordered resource category. Declaration order is left-to-right placement.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TierId {
	/// Internet, CIDRs and other outside callers.
	External,
	/// VPCs, subnets, gateways, load balancers.
	Network,
	/// Instances, functions, containers.
	Compute,
	/// Security groups and NACLs.
	Security,
	/// Roles, policies, users.
	Identity,
	/// Buckets, databases, volumes.
	Storage,
}

impl TierId {
	/// Every tier in order.
	pub const ALL: [Self; 6] = [
		Self::External,
		Self::Network,
		Self::Compute,
		Self::Security,
		Self::Identity,
		Self::Storage,
	];

	/// Position in the left-to-right order.
	pub fn order(self) -> usize {
		self as usize
	}

	/// Stable lower-case key.
	pub fn key(self) -> &'static str {
		match self {
			Self::External => "external",
			Self::Network => "network",
			Self::Compute => "compute",
			Self::Security => "security",
			Self::Identity => "identity",
			Self::Storage => "storage",
		}
	}

	/// Column header.
	pub fn label(self) -> &'static str {
		match self {
			Self::External => "External",
			Self::Network => "Network",
			Self::Compute => "Compute",
			Self::Security => "Security",
			Self::Identity => "Identity",
			Self::Storage => "Storage",
		}
	}
}

/// Which node field a rule inspects.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RuleField {
	/// The resource id.
	Id,
	/// The resource type (or first label).
	Type,
}

/// How a rule compares its pattern.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Matcher {
	/// Field starts with the pattern.
	Prefix,
	/// Field contains the pattern.
	Contains,
}

/// One row of the classification table. Comparison is case-insensitive.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TierRule {
	/// Field to inspect.
	pub field: RuleField,
	/// Comparison.
	pub matcher: Matcher,
	/// Pattern, compared lower-cased.
	pub pattern: String,
	/// Tier assigned on match.
	pub tier: TierId,
}

impl TierRule {
	fn new(field: RuleField, matcher: Matcher, pattern: &str, tier: TierId) -> Self {
		Self {
			field,
			matcher,
			pattern: pattern.into(),
			tier,
		}
	}

	fn matches(&self, id: &str, type_name: &str) -> bool {
		let haystack = match self.field {
			RuleField::Id => id,
			RuleField::Type => type_name,
		};
		let pattern = self.pattern.to_ascii_lowercase();
		match self.matcher {
			Matcher::Prefix => haystack.starts_with(&pattern),
			Matcher::Contains => haystack.contains(&pattern),
		}
	}
}

/// Rule table plus label settings.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClassifierConfig {
	/// Rules, first match wins.
	pub rules: Vec<TierRule>,
	/// Tier for nodes no rule matches.
	pub default_tier: TierId,
	/// Longest label, in characters, including the ellipsis.
	pub max_label_len: usize,
	/// Suffix for truncated labels.
	pub ellipsis: String,
}

impl Default for ClassifierConfig {
	fn default() -> Self {
		use Matcher::{Contains, Prefix};
		use RuleField::{Id, Type};
		use TierId::*;

		let mut rules = vec![
			TierRule::new(Id, Prefix, "i-", Compute),
			TierRule::new(Id, Prefix, "sg-", Security),
			TierRule::new(Id, Prefix, "arn:aws:iam:", Identity),
			TierRule::new(Id, Prefix, "arn:aws:s3:", Storage),
			TierRule::new(Id, Prefix, "vpc-", Network),
			TierRule::new(Id, Prefix, "subnet-", Network),
			TierRule::new(Type, Contains, "securitygroup", Security),
			TierRule::new(Type, Contains, "security_group", Security),
			TierRule::new(Type, Contains, "nacl", Security),
		];
		let by_type: [(&[&str], TierId); 5] = [
			(&["s3", "bucket", "dynamodb", "rds", "ebs", "efs", "storage", "database"], Storage),
			(&["iam", "role", "policy", "user", "principal", "identity"], Identity),
			(
				&[
					"vpc",
					"subnet",
					"elb",
					"loadbalancer",
					"gateway",
					"natgateway",
					"route",
					"networkinterface",
					"network",
				],
				Network,
			),
			(&["internet", "external", "cidr", "public_ip"], External),
			(
				&["ec2", "lambda", "ecs", "eks", "instance", "function", "container", "compute"],
				Compute,
			),
		];
		for (patterns, tier) in by_type {
			rules.extend(patterns.iter().map(|p| TierRule::new(Type, Contains, p, tier)));
		}

		Self {
			rules,
			default_tier: Compute,
			max_label_len: 24,
			ellipsis: "…".into(),
		}
	}
}

/// Assigns tiers and labels from a rule table.
#[derive(Clone, Debug, Default)]
pub struct TierClassifier {
	config: ClassifierConfig,
}

impl TierClassifier {
	/// Classifier over the given table.
	pub fn new(config: ClassifierConfig) -> Self {
		Self { config }
	}

	/// Tier and label for one node. Total: unknown types get the default tier.
	pub fn classify(&self, node: &RawNode) -> (TierId, String) {
		let id = normalize_id(&node.id).to_ascii_lowercase();
		let type_name = node.type_name().to_ascii_lowercase();
		let tier = self
			.config
			.rules
			.iter()
			.find(|rule| rule.matches(&id, &type_name))
			.map_or(self.config.default_tier, |rule| rule.tier);
		(tier, self.label(node.display_name()))
	}

	/// Classifies a whole node list, preserving order.
	pub fn classify_all(&self, nodes: &[RawNode]) -> Vec<ClassifiedNode> {
		nodes
			.iter()
			.map(|node| {
				let (tier, label) = self.classify(node);
				ClassifiedNode {
					node: node.clone(),
					tier,
					label,
				}
			})
			.collect()
	}

	/// Shortens a name for display.
	pub fn label(&self, name: &str) -> String {
		shorten_label(name, self.config.max_label_len, &self.config.ellipsis)
	}
}

/// ARNs collapse to their last path segment, then anything past `max_len`
/// characters is cut and suffixed with `ellipsis`.
pub fn shorten_label(name: &str, max_len: usize, ellipsis: &str) -> String {
	let name = if name.starts_with("arn:") {
		name.rsplit(['/', ':'])
			.find(|segment| !segment.is_empty())
			.unwrap_or(name)
	} else {
		name
	};

	if name.chars().count() <= max_len {
		return name.to_string();
	}
	let keep = max_len.saturating_sub(ellipsis.chars().count());
	let mut label: String = name.chars().take(keep).collect();
	label.push_str(ellipsis);
	label
}

#[cfg(test)]
mod tests {
	use super::*;

	fn tier_of(id: &str, node_type: &str) -> TierId {
		TierClassifier::default().classify(&RawNode::new(id, id, node_type)).0
	}

	#[test]
	fn tiers_are_totally_ordered() {
		for pair in TierId::ALL.windows(2) {
			assert!(pair[0] < pair[1]);
			assert_eq!(pair[0].order() + 1, pair[1].order());
		}
		assert_eq!(TierId::External.order(), 0);
		assert_eq!(TierId::Storage.order(), 5);
	}

	#[test]
	fn id_prefix_rules() {
		assert_eq!(tier_of("i-0abc", ""), TierId::Compute);
		assert_eq!(tier_of("sg-123", ""), TierId::Security);
		assert_eq!(tier_of("arn:aws:iam::123:role/app", ""), TierId::Identity);
	}

	#[test]
	fn type_rules_are_case_insensitive() {
		assert_eq!(tier_of("x", "SecurityGroup"), TierId::Security);
		assert_eq!(tier_of("x", "S3Bucket"), TierId::Storage);
		assert_eq!(tier_of("x", "IAMRole"), TierId::Identity);
		assert_eq!(tier_of("x", "IAM_POLICY"), TierId::Identity);
		assert_eq!(tier_of("x", "EC2"), TierId::Compute);
		assert_eq!(tier_of("x", "LoadBalancer"), TierId::Network);
		assert_eq!(tier_of("x", "Internet"), TierId::External);
	}

	#[test]
	fn unknown_and_empty_types_fall_back() {
		assert_eq!(tier_of("mystery", "Quux"), TierId::Compute);
		assert_eq!(tier_of("", ""), TierId::Compute);

		let classifier = TierClassifier::new(ClassifierConfig {
			default_tier: TierId::External,
			..ClassifierConfig::default()
		});
		assert_eq!(classifier.classify(&RawNode::new("q", "q", "Quux")).0, TierId::External);
	}

	#[test]
	fn first_matching_rule_wins() {
		// id prefix beats the type rule for security groups
		assert_eq!(tier_of("i-1", "SecurityGroup"), TierId::Compute);
	}

	#[test]
	fn labels_fall_back_to_id() {
		let classifier = TierClassifier::default();
		let node = RawNode {
			id: " i-42 ".into(),
			..RawNode::default()
		};
		assert_eq!(classifier.classify(&node).1, "i-42");

		let blank = RawNode {
			id: "sg-9".into(),
			name: Some("   ".into()),
			..RawNode::default()
		};
		assert_eq!(classifier.classify(&blank).1, "sg-9");
	}

	#[test]
	fn labels_are_truncated_deterministically() {
		let long = "a-very-long-resource-name-that-keeps-going";
		let first = shorten_label(long, 10, "…");
		assert_eq!(first, "a-very-lo…");
		assert_eq!(first.chars().count(), 10);
		assert_eq!(first, shorten_label(long, 10, "…"));
		assert_eq!(shorten_label("short", 10, "…"), "short");
	}

	#[test]
	fn arns_shorten_to_last_segment() {
		assert_eq!(shorten_label("arn:aws:iam::123456789012:role/payments-api", 24, "…"), "payments-api");
		assert_eq!(shorten_label("arn:aws:s3:::audit-logs", 24, "…"), "audit-logs");
	}

	#[test]
	fn labels_respect_multibyte_chars() {
		assert_eq!(shorten_label("ééééé", 3, "…"), "éé…");
	}
}
