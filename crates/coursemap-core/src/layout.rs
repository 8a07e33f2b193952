//! Tiered column layout for the prerequisite graph
//!
//! Nodes are bucketed into five fixed complexity tiers (CL1..CL5) rendered as
//! vertical columns. Horizontal position and tier are coupled in both
//! directions: a node without a stored position is placed in its tier's
//! column, and dragging a node re-derives its tier from the new x.

use serde::{Deserialize, Serialize};

/// Number of complexity tiers.
pub const TIER_COUNT: u8 = 5;

/// Horizontal distance between tier columns.
pub const COLUMN_SPACING: f32 = 300.0;

/// Vertical distance between stacked nodes in a column.
pub const ROW_SPACING: f32 = 120.0;

/// Inset of the first column / row from the origin.
const MARGIN: f32 = 40.0;

/// Column header labels, one per tier.
pub const TIER_LABELS: [&str; TIER_COUNT as usize] = ["CL1", "CL2", "CL3", "CL4", "CL5"];

/// Free-form layout coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, Default)]
pub struct Position {
    pub x: f32,
    pub y: f32,
}

/// Derive a complexity tier from a horizontal position:
/// `floor(x / spacing) + 1`, clamped into the tier range so a drag past the
/// last column cannot produce an out-of-range tier.
pub fn tier_from_x(x: f32) -> u8 {
    let raw = (x / COLUMN_SPACING).floor() as i64 + 1;
    raw.clamp(1, TIER_COUNT as i64) as u8
}

/// Default layout slot for the `ordinal`-th node of a tier.
pub fn position_for(tier: u8, ordinal: usize) -> Position {
    let column = tier.clamp(1, TIER_COUNT).saturating_sub(1) as f32;
    Position {
        x: column * COLUMN_SPACING + MARGIN,
        y: ordinal as f32 * ROW_SPACING + MARGIN,
    }
}
