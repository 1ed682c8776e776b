//! Fixed keyword polarity lists for descriptor inference.
//!
//! The generator mines a gap's free-text characteristics for these words;
//! hits push the inferred closure/scope away from the neutral 0.5 and
//! anchor the compatible-strata prefix.

use crate::taxonomy::Stratum;

/// Words that push inferred closure up.
pub const AUTONOMY_WORDS: &[&str] = &[
    "autonomous",
    "self-maintaining",
    "self-organizing",
    "closed",
    "independent",
    "homeostatic",
];

/// Words that push inferred closure down.
pub const DEPENDENCY_WORDS: &[&str] = &[
    "dependent",
    "derived",
    "maintained",
    "external",
    "parasitic",
];

/// Words that push inferred scope up.
pub const BREADTH_WORDS: &[&str] = &["global", "universal", "broad", "pervasive", "general"];

/// Words that push inferred scope down.
pub const NARROWNESS_WORDS: &[&str] = &["local", "narrow", "specific", "niche", "specialized"];

/// Relation-name substrings implying symmetry.
pub const SYMMETRY_WORDS: &[&str] = &["with", "mutual", "between", "among"];

/// Relation-name substrings implying transitivity.
pub const TRANSITIVITY_WORDS: &[&str] = &["part_of", "contains", "within", "precedes", "encloses"];

/// Count how many characteristics contain any of the given words.
pub fn polarity_hits(characteristics: &[String], words: &[&str]) -> usize {
    characteristics
        .iter()
        .filter(|c| {
            let lowered = c.to_lowercase();
            words.iter().any(|w| lowered.contains(w))
        })
        .count()
}

/// Highest stratum a characteristic keyword implies, if any.
pub fn stratum_for_keyword(characteristic: &str) -> Option<Stratum> {
    let lowered = characteristic.to_lowercase();
    let hit = |words: &[&str]| words.iter().any(|w| lowered.contains(w));

    if hit(&["symbolic", "normative", "linguistic", "logos"]) {
        Some(Stratum::Logos)
    } else if hit(&["sentient", "conscious", "perceiving", "feeling"]) {
        Some(Stratum::Sentience)
    } else if hit(&["life", "living", "biological", "metabolic"]) {
        Some(Stratum::Life)
    } else {
        None
    }
}

/// Highest stratum implied by any characteristic; `Matter` when none match.
/// The resulting compatible-strata prefix never skips a level.
pub fn implied_stratum_ceiling(characteristics: &[String]) -> Stratum {
    characteristics
        .iter()
        .filter_map(|c| stratum_for_keyword(c))
        .max()
        .unwrap_or(Stratum::Matter)
}
