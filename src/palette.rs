//! Application colours
//!
//! Applications are coloured from a fixed categorical palette in the order
//! they are first seen. Target method nodes are not applications and always
//! use [`TARGET_NODE_COLOR`].

use std::collections::{BTreeMap, HashMap};

/// Colour of every target method node
pub const TARGET_NODE_COLOR: &str = "#2E8484";

/// "Paired" (12), "Dark2" (8) and "Accent" (8) categorical schemes, in that order.
pub const PALETTE: [&str; 28] = [
    // Paired
    "#a6cee3", "#1f78b4", "#b2df8a", "#33a02c", "#fb9a99", "#e31a1c", "#fdbf6f", "#ff7f00",
    "#cab2d6", "#6a3d9a", "#ffff99", "#b15928",
    // Dark2
    "#1b9e77", "#d95f02", "#7570b3", "#e7298a", "#66a61e", "#e6ab02", "#a6761d", "#666666",
    // Accent
    "#7fc97f", "#beaed4", "#fdc086", "#ffff99", "#386cb0", "#f0027f", "#bf5b17", "#666666",
];

/// Colour at palette slot `index`; slots past the end wrap around.
pub fn palette_color(index: usize) -> &'static str {
    PALETTE[index % PALETTE.len()]
}

/// Ordinal scale from application name to palette colour.
#[derive(Debug, Clone, Default)]
pub struct ColorScale {
    slots: HashMap<String, usize>,
}

impl ColorScale {
    pub fn new() -> Self {
        Self::default()
    }

    /// Colour for `application`, assigning the next free slot on first sight.
    pub fn color_for(&mut self, application: &str) -> &'static str {
        if let Some(&slot) = self.slots.get(application) {
            return palette_color(slot);
        }
        let slot = self.slots.len();
        self.slots.insert(application.to_string(), slot);
        palette_color(slot)
    }

    /// Number of distinct applications seen so far
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// Application name to colour, for the graph legend
    pub fn to_color_map(&self) -> BTreeMap<String, String> {
        self.slots
            .iter()
            .map(|(name, &slot)| (name.clone(), palette_color(slot).to_string()))
            .collect()
    }
}
