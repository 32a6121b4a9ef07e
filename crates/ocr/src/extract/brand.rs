use coney_core::{BrandCatalog, BrandEntry};

use crate::types::FieldResult;

pub const KEYWORD_WEIGHT: f32 = 0.5;
pub const ALIAS_WEIGHT: f32 = 0.8;

/// Best-matching catalog entry by cumulative literal score.
///
/// Every keyword hit adds [`KEYWORD_WEIGHT`] and every alias hit adds
/// [`ALIAS_WEIGHT`]. The sum is uncapped, so the confidence is a relative
/// ranking signal rather than a probability. Ties keep the entry that comes
/// first in the catalog.
pub fn extract_brand(text: &str, catalog: &BrandCatalog) -> FieldResult<String> {
    let haystack = text.to_lowercase();

    let mut best: Option<(&BrandEntry, f32)> = None;
    for entry in catalog.entries() {
        let score = score_entry(&haystack, entry);
        if score > best.map_or(0.0, |(_, s)| s) {
            best = Some((entry, score));
        }
    }

    match best {
        Some((entry, score)) => FieldResult::found(entry.canonical_name.clone(), score),
        None => FieldResult::absent(),
    }
}

fn score_entry(haystack: &str, entry: &BrandEntry) -> f32 {
    let keywords = entry
        .keywords
        .iter()
        .filter(|k| haystack.contains(k.as_str()))
        .map(|_| KEYWORD_WEIGHT);
    let aliases = entry
        .aliases
        .iter()
        .filter(|a| haystack.contains(a.as_str()))
        .map(|_| ALIAS_WEIGHT);
    keywords.chain(aliases).sum()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn catalog(entries: Vec<BrandEntry>) -> BrandCatalog {
        BrandCatalog::new(entries).unwrap()
    }

    #[test]
    fn keyword_and_alias_scores_sum() {
        let r = extract_brand("SKYLINE CHILI\n123 Vine St", &BrandCatalog::builtin());
        assert_eq!(r.value.as_deref(), Some("Skyline Chili"));
        // skyline + chili + "skyline chili"
        assert!((r.confidence - 1.8).abs() < 1e-6, "confidence was {}", r.confidence);
    }

    #[test]
    fn confidence_is_not_capped_at_one() {
        let r = extract_brand("gold star chili goldstar", &BrandCatalog::builtin());
        assert_eq!(r.value.as_deref(), Some("Gold Star Chili"));
        assert!(r.confidence > 1.0);
    }

    #[test]
    fn single_keyword_hit() {
        let r = extract_brand("Thanks for visiting Empress!", &BrandCatalog::builtin());
        assert_eq!(r.value.as_deref(), Some("Empress Chili"));
        assert_eq!(r.confidence, KEYWORD_WEIGHT);
    }

    #[test]
    fn tie_keeps_first_catalog_entry() {
        let c = catalog(vec![
            BrandEntry::new("First", ["chili"], Vec::<&str>::new()),
            BrandEntry::new("Second", ["chili"], Vec::<&str>::new()),
        ]);
        assert_eq!(extract_brand("CHILI", &c).value.as_deref(), Some("First"));
    }

    #[test]
    fn alias_outweighs_keyword() {
        let c = catalog(vec![
            BrandEntry::new("Keyword Brand", ["coney"], Vec::<&str>::new()),
            BrandEntry::new("Alias Brand", Vec::<&str>::new(), ["coney"]),
        ]);
        let r = extract_brand("coney", &c);
        assert_eq!(r.value.as_deref(), Some("Alias Brand"));
        assert_eq!(r.confidence, ALIAS_WEIGHT);
    }

    #[test]
    fn substring_matching_is_case_insensitive() {
        let r = extract_brand("wElCoMe To CaMp WaShInGtOn", &BrandCatalog::builtin());
        assert_eq!(r.value.as_deref(), Some("Camp Washington Chili"));
    }

    #[test]
    fn no_match_is_absent() {
        let r = extract_brand("WAFFLE HOUSE\nHashbrowns", &BrandCatalog::builtin());
        assert_eq!(r, FieldResult::absent());
        assert_eq!(extract_brand("", &BrandCatalog::builtin()), FieldResult::absent());
    }

    #[test]
    fn payment_lines_do_not_suggest_a_brand() {
        let text = "AMERICAN EXPRESS ****1234\nNational Bank of Ohio\nTotal $7.38";
        assert_eq!(extract_brand(text, &BrandCatalog::builtin()), FieldResult::absent());
    }

    #[test]
    fn full_coney_island_name_still_matches() {
        let r = extract_brand("American Coney Island", &BrandCatalog::builtin());
        assert_eq!(r.value.as_deref(), Some("American Coney Island"));
    }

    #[test]
    fn empty_catalog_is_absent() {
        let c = catalog(vec![]);
        assert_eq!(extract_brand("skyline chili", &c), FieldResult::absent());
    }
}
