//! Graph layout and flow aggregation.
//!
//! Pure, synchronous functions from a `{nodes, edges}` snapshot to positions,
//! merged edges and flow totals. Nothing here touches the DOM or keeps state
//! between calls.

pub mod aggregate;
pub mod config;
pub mod error;
pub mod flows;
pub mod force;
pub mod highlight;
pub mod pipeline;
pub mod tier;
pub mod tier_layout;
pub mod types;

pub use aggregate::{AggregateOptions, Aggregation, aggregate, aggregate_to_raw};
pub use config::{EngineConfig, LayoutStrategy};
pub use error::ValidationError;
pub use flows::{FlowTotals, TierBoundaryFlow, TierPairKey};
pub use force::ForceConfig;
pub use pipeline::GraphSnapshot;
pub use tier::{ClassifierConfig, TierClassifier, TierId};
pub use tier_layout::{TierLane, TierLayout, TierLayoutConfig};
pub use types::{AggregatedEdge, ClassifiedNode, GraphInput, LayoutPosition, RawEdge, RawNode};
