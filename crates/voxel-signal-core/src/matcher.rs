//! Specification matchers
//!
//! A [`SpecMatcher`] is the pure predicate half of every handler entry: a
//! set of allowed categories plus optional colour and variant filters. All
//! mutable bookkeeping (cooldowns, counts) lives in the owning engine.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};
use tracing::trace;

use crate::{CategoryId, CategoryRegistry, Colour, Matchable, Result, SignalError, VariantId};

/// Declarative block/item specification as it appears in mission parameters
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MatchSpec {
    /// Allowed type names
    #[serde(rename = "type", default)]
    pub types: Vec<String>,
    /// Allowed colours; empty means any colour
    #[serde(rename = "colour", default, skip_serializing_if = "Vec::is_empty")]
    pub colours: Vec<Colour>,
    /// Allowed variant names; empty means any variant
    #[serde(rename = "variant", default, skip_serializing_if = "Vec::is_empty")]
    pub variants: Vec<String>,
}

impl MatchSpec {
    /// Spec allowing the given type names
    pub fn of_types<I, S>(types: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            types: types.into_iter().map(Into::into).collect(),
            ..Self::default()
        }
    }

    /// Restrict to the given colours
    #[must_use]
    pub fn with_colours(mut self, colours: impl IntoIterator<Item = Colour>) -> Self {
        self.colours = colours.into_iter().collect();
        self
    }

    /// Restrict to the given variant names
    #[must_use]
    pub fn with_variants<I, S>(mut self, variants: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.variants = variants.into_iter().map(Into::into).collect();
        self
    }
}

/// Resolved, side-effect free predicate over observations
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpecMatcher {
    allowed: HashSet<CategoryId>,
    colours: HashSet<Colour>,
    variants: HashSet<VariantId>,
}

impl SpecMatcher {
    /// Resolve a spec against a catalog.
    ///
    /// Fails on the first unknown type or variant name, or when the spec
    /// lists no types at all.
    pub fn new(spec: &MatchSpec, registry: &CategoryRegistry) -> Result<Self> {
        if spec.types.is_empty() {
            return Err(SignalError::InvalidParameters(
                "specification lists no types".to_string(),
            ));
        }

        let allowed = spec
            .types
            .iter()
            .map(|name| registry.resolve(name))
            .collect::<Result<HashSet<_>>>()?;
        let variants = spec
            .variants
            .iter()
            .map(|name| registry.resolve_variant(name))
            .collect::<Result<HashSet<_>>>()?;

        let names: Vec<&str> = allowed.iter().filter_map(|id| registry.name_of(*id)).collect();
        trace!(
            types = ?names,
            colours = spec.colours.len(),
            variants = variants.len(),
            "matcher resolved"
        );

        Ok(Self {
            allowed,
            colours: spec.colours.iter().copied().collect(),
            variants,
        })
    }

    /// Whether the observation satisfies type, colour and variant filters
    pub fn matches<O: Matchable + ?Sized>(&self, observation: &O) -> bool {
        if !self.allowed.contains(&observation.category()) {
            return false;
        }
        if !self.colours.is_empty()
            && !observation.colour().is_some_and(|c| self.colours.contains(&c))
        {
            return false;
        }
        if !self.variants.is_empty()
            && !observation.variant().is_some_and(|v| self.variants.contains(&v))
        {
            return false;
        }
        true
    }

    /// Whether the category is among the allowed types
    #[must_use]
    pub fn allows_category(&self, category: CategoryId) -> bool {
        self.allowed.contains(&category)
    }

    /// Whether a colour or variant filter is configured
    #[must_use]
    pub fn has_attribute_filter(&self) -> bool {
        !self.colours.is_empty() || !self.variants.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{BlockObservation, ItemStack};

    fn registry() -> CategoryRegistry {
        CategoryRegistry::vanilla().clone()
    }

    #[test]
    fn test_type_only_match() {
        let registry = registry();
        let matcher =
            SpecMatcher::new(&MatchSpec::of_types(["gold_ore", "iron_ore"]), &registry).unwrap();

        let gold = BlockObservation::new(registry.resolve("gold_ore").unwrap());
        let stone = BlockObservation::new(registry.resolve("stone").unwrap());
        assert!(matcher.matches(&gold));
        assert!(matcher.matches(&gold.with_colour(Colour::Red)));
        assert!(!matcher.matches(&stone));
        assert!(!matcher.has_attribute_filter());
    }

    #[test]
    fn test_colour_and_variant_filters() {
        let registry = registry();
        let wool = registry.resolve("wool").unwrap();
        let birch = registry.resolve_variant("birch").unwrap();
        let oak = registry.resolve_variant("oak").unwrap();

        let spec = MatchSpec::of_types(["wool"])
            .with_colours([Colour::Red, Colour::Blue])
            .with_variants(["birch"]);
        let matcher = SpecMatcher::new(&spec, &registry).unwrap();

        let red_birch = ItemStack::new(wool, 1).with_colour(Colour::Red).with_variant(birch);
        assert!(matcher.matches(&red_birch));
        assert!(!matcher.matches(&red_birch.with_variant(oak)));
        assert!(!matcher.matches(&red_birch.with_colour(Colour::Green)));
        assert!(!matcher.matches(&ItemStack::new(wool, 1).with_variant(birch)));
        assert!(matcher.has_attribute_filter());
    }

    #[test]
    fn test_construction_fails_fast() {
        let registry = registry();

        let err = SpecMatcher::new(&MatchSpec::of_types(["gold_ore", "mithril_ore"]), &registry)
            .unwrap_err();
        assert!(matches!(err, SignalError::UnknownCategory(name) if name == "mithril_ore"));

        let spec = MatchSpec::of_types(["log"]).with_variants(["ebony"]);
        let err = SpecMatcher::new(&spec, &registry).unwrap_err();
        assert!(matches!(err, SignalError::UnknownVariant(_)));

        let err = SpecMatcher::new(&MatchSpec::default(), &registry).unwrap_err();
        assert!(matches!(err, SignalError::InvalidParameters(_)));
    }

    #[test]
    fn test_spec_deserializes_mission_keys() {
        let spec: MatchSpec = serde_json::from_value(serde_json::json!({
            "type": ["wool"],
            "colour": ["WHITE"],
        }))
        .unwrap();

        assert_eq!(spec.types, vec!["wool".to_string()]);
        assert_eq!(spec.colours, vec![Colour::White]);
        assert!(spec.variants.is_empty());
    }
}
