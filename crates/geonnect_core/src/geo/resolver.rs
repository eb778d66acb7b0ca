//! Address resolution with ordered fallbacks.
//!
//! # Responsibility
//! - Apply the normalized-then-original retry around one provider call.
//! - Evaluate the ordered address-formatting strategies for form input.
//!
//! # Invariants
//! - Fallbacks only fire on empty results; provider failures propagate
//!   immediately and unchanged.
//! - Formatting strategies run in declaration order and stop at the first
//!   non-empty result.

use crate::geo::normalize::fold_diacritics;
use crate::geo::provider::{GeocodeCandidate, GeocodeResult, GeocodingProvider};
use log::debug;
use once_cell::sync::Lazy;
use regex::Regex;

static WHITESPACE_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").expect("valid ws regex"));

/// Structured address fields collected by the registration form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AddressInput {
    pub street: String,
    pub number: String,
    pub city: String,
    /// Two-letter state code ("UF").
    pub state_uf: String,
}

/// One address-string formatting strategy.
///
/// Kept as a named table entry so the fallback order stays explicit and
/// testable instead of being buried in nested conditionals.
struct FormatStrategy {
    name: &'static str,
    compose: fn(&AddressInput) -> String,
}

const FORMAT_STRATEGIES: &[FormatStrategy] = &[
    FormatStrategy {
        name: "street_number_dash_city_uf",
        compose: |input| {
            format!(
                "{}, {} - {}, {}",
                input.street, input.number, input.city, input.state_uf
            )
        },
    },
    FormatStrategy {
        name: "street_number_city_uf",
        compose: |input| {
            format!(
                "{} {}, {}, {}",
                input.street, input.number, input.city, input.state_uf
            )
        },
    },
    FormatStrategy {
        name: "street_number_city_space_uf",
        compose: |input| {
            format!(
                "{}, {}, {} {}",
                input.street, input.number, input.city, input.state_uf
            )
        },
    },
];

impl AddressInput {
    pub fn new(
        street: impl Into<String>,
        number: impl Into<String>,
        city: impl Into<String>,
        state_uf: impl Into<String>,
    ) -> Self {
        Self {
            street: street.into(),
            number: number.into(),
            city: city.into(),
            state_uf: state_uf.into(),
        }
    }

    /// Canonical display composition, stored on the record.
    ///
    /// Always the first strategy's shape, regardless of which variant
    /// eventually produced the geocoding hit.
    pub fn display_address(&self) -> String {
        collapse_whitespace(&(FORMAT_STRATEGIES[0].compose)(self))
    }

    /// All formatting variants in fallback order.
    pub fn variants(&self) -> Vec<String> {
        FORMAT_STRATEGIES
            .iter()
            .map(|strategy| collapse_whitespace(&(strategy.compose)(self)))
            .collect()
    }
}

fn collapse_whitespace(value: &str) -> String {
    WHITESPACE_RE.replace_all(value.trim(), " ").into_owned()
}

/// Resolver wrapping one geocoding provider with the retry policy.
pub struct AddressResolver<P: GeocodingProvider> {
    provider: P,
}

impl<P: GeocodingProvider> AddressResolver<P> {
    pub fn new(provider: P) -> Self {
        Self { provider }
    }

    pub fn provider(&self) -> &P {
        &self.provider
    }

    /// Resolves one free-text address.
    ///
    /// Tries the diacritic-folded text first, then the original text when
    /// folding changed it and the first attempt found nothing. Returns an
    /// empty sequence when both attempts are empty.
    pub fn resolve(&self, address_text: &str) -> GeocodeResult<Vec<GeocodeCandidate>> {
        let normalized = fold_diacritics(address_text);
        let candidates = self.provider.geocode(&normalized)?;
        if !candidates.is_empty() {
            debug!(
                "event=geocode_resolve module=geo status=hit form=normalized candidates={}",
                candidates.len()
            );
            return Ok(candidates);
        }

        if normalized == address_text {
            debug!("event=geocode_resolve module=geo status=miss form=normalized");
            return Ok(candidates);
        }

        let original = self.provider.geocode(address_text)?;
        debug!(
            "event=geocode_resolve module=geo status={} form=original candidates={}",
            if original.is_empty() { "miss" } else { "hit" },
            original.len()
        );
        Ok(original)
    }

    /// Resolves structured form input through the formatting fallbacks.
    ///
    /// Evaluates each strategy in order and stops at the first non-empty
    /// result; an empty sequence after all strategies means the address was
    /// not found anywhere.
    pub fn resolve_input(&self, input: &AddressInput) -> GeocodeResult<Vec<GeocodeCandidate>> {
        for (index, variant) in input.variants().iter().enumerate() {
            let candidates = self.resolve(variant)?;
            if !candidates.is_empty() {
                debug!(
                    "event=geocode_resolve_input module=geo status=hit strategy={} attempt={}",
                    FORMAT_STRATEGIES[index].name,
                    index + 1
                );
                return Ok(candidates);
            }
        }

        debug!(
            "event=geocode_resolve_input module=geo status=miss attempts={}",
            FORMAT_STRATEGIES.len()
        );
        Ok(Vec::new())
    }
}

#[cfg(test)]
mod tests {
    use super::AddressInput;

    #[test]
    fn display_address_uses_dash_composition() {
        let input = AddressInput::new("Av. Paulista", "1000", "São Paulo", "SP");
        assert_eq!(input.display_address(), "Av. Paulista, 1000 - São Paulo, SP");
    }

    #[test]
    fn variants_are_ordered_and_distinct() {
        let input = AddressInput::new("Rua A", "12", "Santos", "SP");
        let variants = input.variants();
        assert_eq!(
            variants,
            vec![
                "Rua A, 12 - Santos, SP".to_string(),
                "Rua A 12, Santos, SP".to_string(),
                "Rua A, 12, Santos SP".to_string(),
            ]
        );
    }

    #[test]
    fn composition_collapses_stray_whitespace() {
        let input = AddressInput::new("  Rua   B ", "7", " Campinas", "SP ");
        assert_eq!(input.display_address(), "Rua B , 7 - Campinas, SP");
    }
}
