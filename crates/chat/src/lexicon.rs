//! The column lexicon — a static legend mapping data-column abbreviations
//! to natural-language definitions.
//!
//! Match-data passages stored in the vector index use the terse column
//! abbreviations of the source tables (xG, PrgP, SoTA, ...). The lexicon is
//! rendered into the system prompt once so the model can read them. It is
//! assembled at process start and never mutated.

use std::path::Path;

/// The built-in lexicon asset, one `abbreviation,definition` pair per line.
/// Lines starting with `#` group entries by source table.
const BUILTIN_LEXICON: &str = include_str!("lexicon.csv");

/// A single lexicon entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LexiconEntry {
    /// Column abbreviation as it appears in the data (e.g. "xG").
    pub abbreviation: String,
    /// Natural-language definition.
    pub definition: String,
}

/// The immutable column lexicon.
///
/// Entries keep their source order; abbreviations reused across tables are
/// preserved as distinct entries since the legend is prompt text, not a
/// unique map.
#[derive(Debug, Clone)]
pub struct Lexicon {
    entries: Vec<LexiconEntry>,
}

impl Lexicon {
    /// The built-in lexicon shipped with the binary.
    pub fn builtin() -> Self {
        // The embedded asset is known-good; parse cannot fail on it.
        Self::parse(BUILTIN_LEXICON)
    }

    /// Parse lexicon entries from CSV-style text.
    ///
    /// Each non-empty, non-comment line is `abbreviation,definition`. The
    /// definition may be wrapped in double quotes when it contains commas.
    pub fn parse(text: &str) -> Self {
        let entries = text
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty() && !line.starts_with('#'))
            .filter_map(|line| {
                let (abbr, def) = line.split_once(',')?;
                let def = def.trim().trim_matches('"').trim();
                if abbr.is_empty() || def.is_empty() {
                    return None;
                }
                Some(LexiconEntry {
                    abbreviation: abbr.trim().to_string(),
                    definition: def.to_string(),
                })
            })
            .collect();

        Self { entries }
    }

    /// Load a lexicon from a CSV file on disk.
    pub fn load(path: &Path) -> std::io::Result<Self> {
        let text = std::fs::read_to_string(path)?;
        Ok(Self::parse(&text))
    }

    /// Look up the first definition for an abbreviation.
    pub fn get(&self, abbreviation: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|e| e.abbreviation == abbreviation)
            .map(|e| e.definition.as_str())
    }

    /// Number of entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the lexicon is empty.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// All entries in source order.
    pub fn entries(&self) -> &[LexiconEntry] {
        &self.entries
    }

    /// Render the legend block injected into the system prompt.
    pub fn render(&self) -> String {
        let mut out = String::from("[Legend — column definitions]\n");
        for entry in &self.entries {
            out.push_str(&entry.abbreviation);
            out.push_str(": ");
            out.push_str(&entry.definition);
            out.push('\n');
        }
        out
    }
}
