//! Canonical category identities and the name catalog that produces them
//!
//! Block and item types arrive as human-readable names in mission
//! parameters. They are resolved exactly once, when a matcher is built, to
//! small integer identities so that the scanning loops only ever compare
//! integers.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::{Result, SignalError};

/// Canonical identity of a block or item type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct CategoryId(pub u32);

/// Canonical identity of a variant (wood type, stone type, ...)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct VariantId(pub u32);

/// Dye colours a block or item can carry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[allow(missing_docs)]
pub enum Colour {
    White,
    Orange,
    Magenta,
    LightBlue,
    Yellow,
    Lime,
    Pink,
    Gray,
    Silver,
    Cyan,
    Purple,
    Blue,
    Brown,
    Green,
    Red,
    Black,
}

const VANILLA_CATEGORIES: &[&str] = &[
    // blocks
    "air",
    "stone",
    "grass",
    "dirt",
    "cobblestone",
    "planks",
    "log",
    "sand",
    "gravel",
    "gold_ore",
    "iron_ore",
    "coal_ore",
    "diamond_ore",
    "redstone_ore",
    "lapis_ore",
    "emerald_ore",
    "wool",
    "carpet",
    "stained_glass",
    "stained_hardened_clay",
    "glowstone",
    "obsidian",
    "water",
    "lava",
    "furnace",
    "crafting_table",
    "chest",
    "torch",
    "gold_block",
    "iron_block",
    "diamond_block",
    // items
    "iron_ingot",
    "gold_ingot",
    "coal",
    "charcoal",
    "cooked_beef",
    "cooked_porkchop",
    "cooked_chicken",
    "cooked_fish",
    "baked_potato",
    "bread",
    "brick",
    "glass",
    "netherbrick",
    "dye",
];

const VANILLA_VARIANTS: &[&str] = &[
    "oak", "spruce", "birch", "jungle", "acacia", "dark_oak", "granite", "diorite", "andesite",
    "cod", "salmon",
];

lazy_static::lazy_static! {
    static ref VANILLA: CategoryRegistry = {
        let mut registry = CategoryRegistry::new();
        for name in VANILLA_CATEGORIES {
            registry.register(name);
        }
        for name in VANILLA_VARIANTS {
            registry.register_variant(name);
        }
        registry
    };
}

/// Interning catalog from type and variant names to canonical identities
#[derive(Debug, Clone, Default)]
pub struct CategoryRegistry {
    categories: Vec<String>,
    category_ids: HashMap<String, CategoryId>,
    variants: Vec<String>,
    variant_ids: HashMap<String, VariantId>,
}

impl CategoryRegistry {
    /// Create an empty registry
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// The shared catalog of common blocks, items and variants
    #[must_use]
    pub fn vanilla() -> &'static CategoryRegistry {
        &VANILLA
    }

    /// Register a category name, returning its identity.
    ///
    /// Registering an already known name returns the existing identity.
    pub fn register(&mut self, name: &str) -> CategoryId {
        let key = normalize(name);
        if let Some(id) = self.category_ids.get(&key) {
            return *id;
        }
        let id = CategoryId(self.categories.len() as u32);
        self.categories.push(key.clone());
        self.category_ids.insert(key, id);
        id
    }

    /// Register a variant name, returning its identity
    pub fn register_variant(&mut self, name: &str) -> VariantId {
        let key = normalize(name);
        if let Some(id) = self.variant_ids.get(&key) {
            return *id;
        }
        let id = VariantId(self.variants.len() as u32);
        self.variants.push(key.clone());
        self.variant_ids.insert(key, id);
        id
    }

    /// Resolve a category name
    pub fn resolve(&self, name: &str) -> Result<CategoryId> {
        self.category_ids
            .get(&normalize(name))
            .copied()
            .ok_or_else(|| SignalError::UnknownCategory(name.to_string()))
    }

    /// Resolve a variant name
    pub fn resolve_variant(&self, name: &str) -> Result<VariantId> {
        self.variant_ids
            .get(&normalize(name))
            .copied()
            .ok_or_else(|| SignalError::UnknownVariant(name.to_string()))
    }

    /// Name a category was registered under
    #[must_use]
    pub fn name_of(&self, id: CategoryId) -> Option<&str> {
        self.categories.get(id.0 as usize).map(String::as_str)
    }

    /// Number of registered categories
    #[must_use]
    pub fn len(&self) -> usize {
        self.categories.len()
    }

    /// Whether no categories are registered
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.categories.is_empty()
    }
}

fn normalize(name: &str) -> String {
    let trimmed = name.trim();
    let bare = trimmed.strip_prefix("minecraft:").unwrap_or(trimmed);
    bare.to_ascii_lowercase()
}
