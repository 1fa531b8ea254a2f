//! Indicator strings and the pre-written narrative summaries keyed by them.
//!
//! Summaries live in `<dir>/<thematic>.json`, each a JSON object mapping an
//! indicator bitstring (`"1010"`) to text. Ten-question areas are looked up
//! as two five-bit halves in `<thematic>_part1.json` and `_part2.json`.
//! A missing file or key yields placeholder text, never an error. The
//! directory is read once, when [`SummaryLibrary::new`] runs.

use crate::core::catalog::{display_name, QuestionCatalog, ThematicAreaSpec};
use crate::domain::model::{AnswerRecord, QuestionId, ThematicScore, ThematicSummary};
use std::collections::{BTreeMap, HashMap};
use std::path::Path;

pub const SUMMARY_PENDING: &str = "Summary content will be available soon.";
pub const PATTERN_PENDING: &str = "Summary content for this response pattern will be available soon.";

/// Areas with exactly this many questions are split into two lookup halves.
pub const SPLIT_AREA_SIZE: usize = 10;

type SummaryTable = HashMap<String, String>;

/// `1` for each Yes, `0` for anything else (including unanswered), in catalog order.
pub fn indicator(answers: &BTreeMap<QuestionId, AnswerRecord>, area: &ThematicAreaSpec) -> String {
    area.question_ids
        .iter()
        .map(|id| match answers.get(id) {
            Some(record) if record.answer.is_yes() => '1',
            _ => '0',
        })
        .collect()
}

pub trait SummarySource: Send + Sync {
    fn lookup(&self, thematic: &str, indicator: &str) -> String;
}

/// Summary tables read from a directory when the library is built, so lookups
/// during the transform phase never touch the filesystem.
#[derive(Debug, Default)]
pub struct SummaryLibrary {
    tables: HashMap<String, SummaryTable>,
}

impl SummaryLibrary {
    pub fn new(dir: Option<impl AsRef<Path>>) -> Self {
        match dir {
            Some(dir) => Self {
                tables: load_dir(dir.as_ref()),
            },
            None => Self::default(),
        }
    }

    /// A library without files; every lookup returns placeholder text.
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn table_count(&self) -> usize {
        self.tables.len()
    }

    fn table(&self, file_name: &str) -> Option<&SummaryTable> {
        self.tables.get(file_name)
    }
}

/// Every `*.json` file in `dir`, keyed by file name.
fn load_dir(dir: &Path) -> HashMap<String, SummaryTable> {
    let entries = match std::fs::read_dir(dir) {
        Ok(entries) => entries,
        Err(e) => {
            tracing::warn!("⚠️ Cannot read summaries directory {}: {}", dir.display(), e);
            return HashMap::new();
        }
    };

    let tables: HashMap<String, SummaryTable> = entries
        .filter_map(|entry| entry.ok())
        .map(|entry| entry.path())
        .filter(|path| {
            path.extension()
                .and_then(|ext| ext.to_str())
                .is_some_and(|ext| ext.eq_ignore_ascii_case("json"))
        })
        .filter_map(|path| {
            let name = path.file_name()?.to_str()?.to_string();
            load_table(&path).map(|table| (name, table))
        })
        .collect();

    tracing::debug!("Loaded {} summary tables from {}", tables.len(), dir.display());
    tables
}

fn load_table(path: &Path) -> Option<SummaryTable> {
    let content = match std::fs::read_to_string(path) {
        Ok(content) => content,
        Err(e) => {
            tracing::warn!("⚠️ Cannot read summary file {}: {}", path.display(), e);
            return None;
        }
    };

    match serde_json::from_str::<SummaryTable>(&content) {
        Ok(table) => Some(table),
        Err(e) => {
            tracing::warn!("⚠️ Ignoring unreadable summary file {}: {}", path.display(), e);
            None
        }
    }
}

impl SummarySource for SummaryLibrary {
    fn lookup(&self, thematic: &str, indicator: &str) -> String {
        if indicator.len() == SPLIT_AREA_SIZE {
            let (first, second) = indicator.split_at(SPLIT_AREA_SIZE / 2);
            let parts: Vec<String> = [(1, first), (2, second)]
                .iter()
                .map(|(part, bits)| match self.table(&format!("{}_part{}.json", thematic, part)) {
                    Some(table) => table
                        .get(*bits)
                        .cloned()
                        .unwrap_or_else(|| PATTERN_PENDING.to_string()),
                    None => format!("Summary for part {} will be available soon.", part),
                })
                .collect();
            return parts.join(" ");
        }

        match self.table(&format!("{}.json", thematic)) {
            Some(table) => table
                .get(indicator)
                .cloned()
                .unwrap_or_else(|| PATTERN_PENDING.to_string()),
            None => SUMMARY_PENDING.to_string(),
        }
    }
}

/// One summary per catalog area, with `{country}` filled in when known.
pub fn build_summaries(
    catalog: &QuestionCatalog,
    answers: &BTreeMap<QuestionId, AnswerRecord>,
    scores: &[ThematicScore],
    source: &dyn SummarySource,
    country: Option<&str>,
) -> Vec<ThematicSummary> {
    catalog
        .areas()
        .iter()
        .map(|area| {
            let indicator = indicator(answers, area);
            let mut summary = source.lookup(&area.thematic, &indicator);
            if let Some(country) = country {
                summary = summary.replace("{country}", country);
            }

            let below_minimum = scores
                .iter()
                .find(|s| s.thematic == area.thematic)
                .map(|s| s.below_minimum())
                .unwrap_or(true);

            ThematicSummary {
                pillar: area.pillar.clone(),
                thematic: area.thematic.clone(),
                display_name: display_name(&area.thematic),
                indicator,
                summary,
                below_minimum,
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::parser::parse;
    use tempfile::TempDir;

    const SECTOR: &str = "3.3. Sector-specific risk reduction measures";

    #[test]
    fn test_indicator_treats_unanswered_as_no() {
        let catalog = QuestionCatalog::reference().unwrap();
        let parsed = parse("Q1,Yes,1;Q3,Unknown,1;Q4,Yes,0.5", &catalog).unwrap();
        let area = &catalog.areas()[0];
        assert_eq!(indicator(&parsed.answers, area), "1001");
    }

    #[test]
    fn test_missing_directory_gives_placeholder() {
        let library = SummaryLibrary::empty();
        assert_eq!(library.lookup("Risk identification", "1010"), SUMMARY_PENDING);
    }

    #[test]
    fn test_lookup_from_files() {
        let dir = TempDir::new().unwrap();
        std::fs::write(
            dir.path().join("Risk identification.json"),
            r#"{"1010": "{country} has partial risk information."}"#,
        )
        .unwrap();

        let library = SummaryLibrary::new(Some(dir.path()));
        assert_eq!(
            library.lookup("Risk identification", "1010"),
            "{country} has partial risk information."
        );
        assert_eq!(library.lookup("Risk identification", "1111"), PATTERN_PENDING);
    }

    #[test]
    fn test_ten_question_area_is_split() {
        let dir = TempDir::new().unwrap();
        std::fs::write(
            dir.path().join(format!("{}_part1.json", SECTOR)),
            r#"{"11000": "First half."}"#,
        )
        .unwrap();

        let library = SummaryLibrary::new(Some(dir.path()));
        let text = library.lookup(SECTOR, "1100000111");
        assert_eq!(text, "First half. Summary for part 2 will be available soon.");
    }

    #[test]
    fn test_malformed_file_is_ignored() {
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join("Risk identification.json"), "not json").unwrap();
        let library = SummaryLibrary::new(Some(dir.path()));
        assert_eq!(library.lookup("Risk identification", "0000"), SUMMARY_PENDING);
    }

    #[test]
    fn test_build_summaries_substitutes_country() {
        let dir = TempDir::new().unwrap();
        std::fs::write(
            dir.path().join("Resilient reconstruction.json"),
            r#"{"100": "{country} has a recovery framework."}"#,
        )
        .unwrap();

        let catalog = QuestionCatalog::reference().unwrap();
        let parsed = parse("Q45,Yes,1;Q46,No,1", &catalog).unwrap();
        let library = SummaryLibrary::new(Some(dir.path()));
        let summaries = build_summaries(&catalog, &parsed.answers, &parsed.scores, &library, Some("Chile"));

        assert_eq!(summaries.len(), 12);
        let last = summaries.last().unwrap();
        assert_eq!(last.indicator, "100");
        assert_eq!(last.summary, "Chile has a recovery framework.");
        assert!(!last.below_minimum);
        assert_eq!(summaries[0].display_name, "DRM policies and institutions");
        assert!(summaries[0].below_minimum);
    }

    #[test]
    fn test_directory_is_read_when_built() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("Risk identification.json");
        std::fs::write(&path, r#"{"1010": "Loaded up front."}"#).unwrap();
        std::fs::write(dir.path().join("notes.txt"), "ignored").unwrap();

        let library = SummaryLibrary::new(Some(dir.path()));
        assert_eq!(library.table_count(), 1);

        std::fs::remove_file(&path).unwrap();
        std::fs::write(dir.path().join("Early warning.json"), r#"{"1": "Too late."}"#).unwrap();
        assert_eq!(library.lookup("Risk identification", "1010"), "Loaded up front.");
        assert_eq!(library.lookup("Early warning", "1"), SUMMARY_PENDING);
    }
}
