//! # Award Catalog
//!
//! The fixed price list of awards. Static configuration, never persisted;
//! rendering concerns (icons) live in the view layer and key off `id`.

use once_cell::sync::Lazy;
use serde::Serialize;
use std::collections::HashMap;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct AwardType {
    pub id: &'static str,
    pub label: &'static str,
    /// Price in Kopeki, paid by the sender and credited to the receiver
    pub cost: u64,
    /// Hex accent colour
    pub color: &'static str,
    pub description: &'static str,
}

const fn tier(
    id: &'static str,
    label: &'static str,
    cost: u64,
    color: &'static str,
    description: &'static str,
) -> AwardType {
    AwardType {
        id,
        label,
        cost,
        color,
        description,
    }
}

/// Ordered from cheapest to most expensive.
pub static AWARD_CATALOG: [AwardType; 20] = [
    tier("silver", "Silver", 100, "#c0c0c0", "A small token of appreciation."),
    tier("gold", "Gold", 250, "#ffd700", "For content worth remembering."),
    tier("platinum", "Platinum", 500, "#e5e4e2", "Rare and shiny."),
    tier("helpful", "Helpful", 750, "#4caf50", "This actually helped."),
    tier("wholesome", "Wholesome", 1_000, "#ff9eb5", "Warms the heart."),
    tier("rocket", "Rocket", 1_500, "#ff5722", "To the moon."),
    tier("fire", "Fire", 2_000, "#ff3d00", "Absolutely on fire."),
    tier("heart", "Heart", 2_500, "#e91e63", "Sent with love."),
    tier("star", "Star", 5_000, "#ffeb3b", "A star among posts."),
    tier("diamond", "Diamond", 7_500, "#00bcd4", "Unbreakable brilliance."),
    tier("crown", "Crown", 10_000, "#ffc107", "Royalty of the board."),
    tier("trophy", "Trophy", 15_000, "#ff9800", "A champion's contribution."),
    tier("galaxy", "Galaxy", 25_000, "#673ab7", "Out of this world."),
    tier("phoenix", "Phoenix", 40_000, "#f44336", "Rises above the rest."),
    tier("dragon", "Dragon", 60_000, "#8bc34a", "Legendary power."),
    tier("legend", "Legend", 100_000, "#9c27b0", "Talked about for ages."),
    tier("titan", "Titan", 200_000, "#3f51b5", "Colossal respect."),
    tier("cosmic", "Cosmic", 350_000, "#1a237e", "Bends space and time."),
    tier("eternal", "Eternal", 600_000, "#212121", "Never forgotten."),
    tier("qult", "Qult", 1_000_000, "#b71c1c", "The highest honour of The Qult."),
];

static BY_ID: Lazy<HashMap<&'static str, &'static AwardType>> =
    Lazy::new(|| AWARD_CATALOG.iter().map(|a| (a.id, a)).collect());

/// Looks up an award tier by id.
pub fn award_type(id: &str) -> Option<&'static AwardType> {
    BY_ID.get(id).copied()
}

pub fn cheapest_award() -> &'static AwardType {
    &AWARD_CATALOG[0]
}
