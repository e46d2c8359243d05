use garde::Validate;
use regex::{Regex, RegexBuilder};
use serde::{Deserialize, Serialize};

use crate::error::VocabularyError;

pub const NOT_AVAILABLE: &str = "N/A";

#[derive(Debug, Clone, Deserialize, Serialize, Validate, PartialEq)]
pub struct AliasEntry {
    #[garde(length(min = 1))]
    pub alias: String,
    #[garde(length(min = 1))]
    pub canonical: String,
}

impl<A: Into<String>, C: Into<String>> From<(A, C)> for AliasEntry {
    fn from((alias, canonical): (A, C)) -> Self {
        Self {
            alias: alias.into(),
            canonical: canonical.into(),
        }
    }
}

/// The serializable definition of a controlled vocabulary. Alias order is
/// significant: when several aliases occur in the same candidate, the one
/// listed first wins.
#[derive(Debug, Clone, Deserialize, Serialize, Validate, PartialEq)]
pub struct VocabularySpec {
    #[garde(length(min = 1))]
    pub default: String,
    #[garde(dive)]
    pub aliases: Vec<AliasEntry>,
}

impl VocabularySpec {
    pub fn new<E: Into<AliasEntry>>(aliases: impl IntoIterator<Item = E>) -> Self {
        Self {
            default: NOT_AVAILABLE.to_string(),
            aliases: aliases.into_iter().map(Into::into).collect(),
        }
    }

    /// Canonical entries in alias order, followed by the default, without
    /// repeats.
    #[must_use]
    pub fn canonical_entries(&self) -> Vec<&str> {
        let mut entries: Vec<&str> = Vec::with_capacity(self.aliases.len() + 1);

        for entry in self
            .aliases
            .iter()
            .map(|a| a.canonical.as_str())
            .chain([self.default.as_str()])
        {
            if !entries.contains(&entry) {
                entries.push(entry);
            }
        }

        entries
    }
}

#[derive(Debug, Clone)]
pub struct Vocabulary {
    name: String,
    default: String,
    patterns: Vec<(Regex, String)>,
}

impl Vocabulary {
    /// # Errors
    /// Fails only if an escaped alias exceeds the regex size limit.
    pub fn new(name: &str, spec: &VocabularySpec) -> Result<Self, VocabularyError> {
        let patterns = spec
            .aliases
            .iter()
            .map(|AliasEntry { alias, canonical }| {
                let pattern = RegexBuilder::new(&regex::escape(alias))
                    .case_insensitive(true)
                    .build()
                    .map_err(|source| VocabularyError {
                        vocabulary: name.to_string(),
                        alias: alias.clone(),
                        source,
                    })?;

                Ok((pattern, canonical.clone()))
            })
            .collect::<Result<_, VocabularyError>>()?;

        Ok(Self {
            name: name.to_string(),
            default: spec.default.clone(),
            patterns,
        })
    }

    /// Maps free text onto the canonical entry of the first alias found
    /// anywhere in it, ignoring case.
    #[must_use]
    pub fn resolve(&self, candidate: Option<&str>) -> &str {
        let Some(candidate) = candidate.map(str::trim).filter(|c| !c.is_empty()) else {
            return &self.default;
        };

        let resolved = self
            .patterns
            .iter()
            .find(|(pattern, _)| pattern.is_match(candidate))
            .map_or(self.default.as_str(), |(_, canonical)| canonical.as_str());

        if resolved == self.default {
            tracing::debug!(vocabulary = %self.name, candidate, "no alias matched, using default");
        }

        resolved
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use rstest::{fixture, rstest};

    use super::*;

    #[fixture]
    fn animal_sources() -> Vocabulary {
        let spec = VocabularySpec::new([
            ("Jackson", "JAX"),
            ("JAX", "JAX"),
            ("Charles River", "Charles River"),
            ("home", "Homemade"),
        ]);

        Vocabulary::new("animal_source", &spec).unwrap()
    }

    #[rstest]
    #[case(Some("The Jackson Laboratory"), "JAX")]
    #[case(Some("jax stock 000664"), "JAX")]
    #[case(Some("charles river labs"), "Charles River")]
    #[case(Some("bred in-house (homemade)"), "Homemade")]
    #[case(Some("Taconic"), "N/A")]
    #[case(Some("   "), "N/A")]
    #[case(None, "N/A")]
    fn resolves_aliases(
        animal_sources: Vocabulary,
        #[case] candidate: Option<&str>,
        #[case] expected: &str,
    ) {
        assert_eq!(animal_sources.resolve(candidate), expected);
    }

    #[rstest]
    fn first_registered_alias_wins() {
        let spec = VocabularySpec::new([("cre", "L7-cre"), ("chr2", "ChR2")]);
        let vocab = Vocabulary::new("strain", &spec).unwrap();

        assert_eq!(vocab.resolve(Some("ChR2 x L7-Cre")), "L7-cre");
    }

    #[rstest]
    fn resolution_is_deterministic(animal_sources: Vocabulary) {
        let candidate = Some("Jackson Labs / JAX");
        let first = animal_sources.resolve(candidate).to_string();

        assert_eq!(animal_sources.resolve(candidate), first);
    }

    #[rstest]
    fn alias_metacharacters_are_literal() {
        let spec = VocabularySpec::new([("C57BL/6J (B6)", "000664")]);
        let vocab = Vocabulary::new("strain", &spec).unwrap();

        assert_eq!(vocab.resolve(Some("c57bl/6j (b6) male")), "000664");
        assert_eq!(vocab.resolve(Some("C57BL/6J B6")), "N/A");
    }

    #[test]
    fn canonical_entries_are_unique() {
        let spec = VocabularySpec::new([("Jackson", "JAX"), ("JAX", "JAX"), ("home", "Homemade")]);

        assert_eq!(spec.canonical_entries(), vec!["JAX", "Homemade", "N/A"]);
    }
}
