use crate::engine::TierId;

/// Fill colours per tier plus the canvas background. Injected into the view so
/// the engine never carries colours.
#[derive(Clone, Debug)]
pub struct TierPalette {
	pub background: String,
	pub edge: String,
	pub tiers: [String; TierId::ALL.len()],
}

impl TierPalette {
	pub fn color(&self, tier: TierId) -> &str {
		&self.tiers[tier.order()]
	}
}

impl Default for TierPalette {
	fn default() -> Self {
		Self {
			background: "#1a1a2e".into(),
			edge: "100, 180, 255".into(),
			tiers: [
				"#7f7f7f".into(),
				"#17becf".into(),
				"#ff7f0e".into(),
				"#d62728".into(),
				"#9467bd".into(),
				"#2ca02c".into(),
			],
		}
	}
}
