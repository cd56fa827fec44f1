//! Observations of blocks and items that matchers are evaluated against

use serde::{Deserialize, Serialize};

use crate::{CategoryId, Colour, VariantId};

/// Anything a [`SpecMatcher`](crate::SpecMatcher) can be evaluated against
pub trait Matchable {
    /// Resolved category of the observation
    fn category(&self) -> CategoryId;

    /// Colour attribute, if the observation has one
    fn colour(&self) -> Option<Colour>;

    /// Variant attribute, if the observation has one
    fn variant(&self) -> Option<VariantId>;
}

/// State of a single block at a cell
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct BlockObservation {
    /// Block type
    pub category: CategoryId,
    /// Block colour
    pub colour: Option<Colour>,
    /// Block variant
    pub variant: Option<VariantId>,
}

impl BlockObservation {
    /// A plain block with no colour or variant
    #[must_use]
    pub fn new(category: CategoryId) -> Self {
        Self {
            category,
            colour: None,
            variant: None,
        }
    }

    /// Set the colour
    #[must_use]
    pub fn with_colour(mut self, colour: Colour) -> Self {
        self.colour = Some(colour);
        self
    }

    /// Set the variant
    #[must_use]
    pub fn with_variant(mut self, variant: VariantId) -> Self {
        self.variant = Some(variant);
        self
    }
}

impl Matchable for BlockObservation {
    fn category(&self) -> CategoryId {
        self.category
    }

    fn colour(&self) -> Option<Colour> {
        self.colour
    }

    fn variant(&self) -> Option<VariantId> {
        self.variant
    }
}

/// A stack of items produced by a conversion event
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ItemStack {
    /// Item type
    pub category: CategoryId,
    /// Item colour
    pub colour: Option<Colour>,
    /// Item variant
    pub variant: Option<VariantId>,
    /// Number of items in the stack
    pub count: u32,
}

impl ItemStack {
    /// A plain stack with no colour or variant
    #[must_use]
    pub fn new(category: CategoryId, count: u32) -> Self {
        Self {
            category,
            colour: None,
            variant: None,
            count,
        }
    }

    /// Set the colour
    #[must_use]
    pub fn with_colour(mut self, colour: Colour) -> Self {
        self.colour = Some(colour);
        self
    }

    /// Set the variant
    #[must_use]
    pub fn with_variant(mut self, variant: VariantId) -> Self {
        self.variant = Some(variant);
        self
    }

    /// Identity used to count this stack.
    ///
    /// `fine` selects the colour/variant-qualified identity; otherwise only
    /// the type is used.
    #[must_use]
    pub fn count_key(&self, fine: bool) -> CountKey {
        if fine {
            CountKey::Fine {
                category: self.category,
                colour: self.colour,
                variant: self.variant,
            }
        } else {
            CountKey::Coarse(self.category)
        }
    }
}

impl Matchable for ItemStack {
    fn category(&self) -> CategoryId {
        self.category
    }

    fn colour(&self) -> Option<Colour> {
        self.colour
    }

    fn variant(&self) -> Option<VariantId> {
        self.variant
    }
}

/// Key running event counts are indexed by
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CountKey {
    /// Type-only identity
    Coarse(CategoryId),
    /// Instance identity qualified by colour and variant
    Fine {
        /// Item type
        category: CategoryId,
        /// Item colour
        colour: Option<Colour>,
        /// Item variant
        variant: Option<VariantId>,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_count_key_granularity() {
        let stack = ItemStack::new(CategoryId(3), 2)
            .with_colour(Colour::Red)
            .with_variant(VariantId(1));

        assert_eq!(stack.count_key(false), CountKey::Coarse(CategoryId(3)));
        assert_eq!(
            stack.count_key(true),
            CountKey::Fine {
                category: CategoryId(3),
                colour: Some(Colour::Red),
                variant: Some(VariantId(1)),
            }
        );
    }
}
