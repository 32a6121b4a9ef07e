use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum CatalogError {
    #[error("Brand canonical name must not be empty")]
    EmptyName,
    #[error("Duplicate brand canonical name: '{0}'")]
    DuplicateName(String),
}

/// One receipt-issuing brand and the literals that identify it in OCR text.
///
/// Keywords and aliases are stored lowercased, in first-seen order, with
/// duplicates dropped.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BrandEntry {
    pub canonical_name: String,
    #[serde(default)]
    pub keywords: Vec<String>,
    #[serde(default)]
    pub aliases: Vec<String>,
}

impl BrandEntry {
    pub fn new<K, A>(canonical_name: &str, keywords: K, aliases: A) -> Self
    where
        K: IntoIterator,
        K::Item: AsRef<str>,
        A: IntoIterator,
        A::Item: AsRef<str>,
    {
        BrandEntry {
            canonical_name: canonical_name.trim().to_string(),
            keywords: ordered_set(keywords),
            aliases: ordered_set(aliases),
        }
    }

    fn normalized(self) -> Self {
        BrandEntry::new(&self.canonical_name, self.keywords, self.aliases)
    }
}

fn ordered_set<I>(items: I) -> Vec<String>
where
    I: IntoIterator,
    I::Item: AsRef<str>,
{
    let mut out: Vec<String> = Vec::new();
    for item in items {
        let lit = item.as_ref().trim().to_lowercase();
        if !lit.is_empty() && !out.contains(&lit) {
            out.push(lit);
        }
    }
    out
}

/// (canonical name, keywords, aliases)
pub const DEFAULT_BRANDS: &[(&str, &[&str], &[&str])] = &[
    ("Skyline Chili", &["skyline", "chili"], &["skyline chili"]),
    ("Gold Star Chili", &["gold star", "chili"], &["gold star chili", "goldstar"]),
    (
        "Camp Washington Chili",
        &["camp washington", "chili"],
        &["camp washington chili"],
    ),
    ("Dixie Chili", &["dixie", "chili"], &["dixie chili"]),
    ("Empress Chili", &["empress", "chili"], &["empress chili"]),
    (
        "Pleasant Ridge Chili",
        &["pleasant ridge", "chili"],
        &["pleasant ridge chili"],
    ),
    (
        "Lafayette Coney Island",
        &["lafayette", "coney island"],
        &["lafayette coney island", "lafayette coney"],
    ),
    (
        "American Coney Island",
        &["american coney", "coney island"],
        &["american coney island", "american coney"],
    ),
    (
        "Leo's Coney Island",
        &["leo's", "coney island"],
        &["leo's coney island", "leos coney island"],
    ),
    (
        "National Coney Island",
        &["national coney", "coney island"],
        &["national coney island", "national coney"],
    ),
];

/// Static, ordered list of known brands. Iteration order is the tie-break
/// order used by brand matching.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BrandCatalog {
    entries: Vec<BrandEntry>,
}

impl BrandCatalog {
    pub fn new(entries: Vec<BrandEntry>) -> Result<Self, CatalogError> {
        let mut seen: Vec<String> = Vec::with_capacity(entries.len());
        let mut normalized = Vec::with_capacity(entries.len());
        for entry in entries {
            let entry = entry.normalized();
            if entry.canonical_name.is_empty() {
                return Err(CatalogError::EmptyName);
            }
            // Uniqueness is case-insensitive so "Skyline Chili" and
            // "SKYLINE CHILI" cannot both be loaded.
            let key = entry.canonical_name.to_lowercase();
            if seen.contains(&key) {
                return Err(CatalogError::DuplicateName(entry.canonical_name));
            }
            seen.push(key);
            normalized.push(entry);
        }
        Ok(Self { entries: normalized })
    }

    pub fn builtin() -> Self {
        let entries = DEFAULT_BRANDS
            .iter()
            .map(|(name, keywords, aliases)| BrandEntry::new(name, keywords.iter(), aliases.iter()))
            .collect();
        Self { entries }
    }

    pub fn entries(&self) -> &[BrandEntry] {
        &self.entries
    }

    pub fn get(&self, canonical_name: &str) -> Option<&BrandEntry> {
        self.entries
            .iter()
            .find(|e| e.canonical_name.eq_ignore_ascii_case(canonical_name))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Default for BrandCatalog {
    fn default() -> Self {
        Self::builtin()
    }
}
