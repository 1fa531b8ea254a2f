//! Question catalog: which questions belong to which thematic area and pillar.
//!
//! The catalog is declared as an ordered list of `{pillar, thematic, "Qa-Qb"}`
//! entries, expanded once at startup and then passed by reference to the parser,
//! aggregator and narrative lookup.

use crate::domain::model::QuestionId;
use crate::utils::error::{AssessmentError, Result};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use std::path::Path;

const RANGE_PATTERN: &str = r"^Q(\d+)(?:\s*-\s*Q(\d+))?$";

/// Reference deployment: six pillars, twelve thematic areas, Q1..Q47.
const REFERENCE_AREAS: [(&str, &str, &str); 12] = [
    ("1. Legal and Institutional DRM Framework", "1.1. DRM policies and institutions", "Q1-Q4"),
    (
        "1. Legal and Institutional DRM Framework",
        "1.2. Mainstreaming DRM into national and sectoral development plans",
        "Q5-Q6",
    ),
    ("2. Risk Identification", "Risk identification", "Q7-Q10"),
    ("3. Risk Reduction", "3.1. Territorial and urban planning", "Q11-Q14"),
    ("3. Risk Reduction", "3.2. Public investment at the central level", "Q15-Q17"),
    ("3. Risk Reduction", "3.3. Sector-specific risk reduction measures", "Q18-Q27"),
    ("4. Preparedness", "4.1. Early warning systems", "Q28-Q30"),
    ("4. Preparedness", "4.2. Emergency preparedness and response", "Q31-Q34"),
    ("4. Preparedness", "4.3. Adaptive social protection", "Q35-Q37"),
    ("5. Financial Protection", "5.1. Fiscal risk management", "Q38-Q41"),
    ("5. Financial Protection", "5.2. DRF strategies and instruments", "Q42-Q44"),
    ("6. Resilient Reconstruction", "Resilient reconstruction", "Q45-Q47"),
];

/// One declarative catalog entry, as written in TOML.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AreaDefinition {
    pub pillar: String,
    pub thematic: String,
    pub questions: String,
}

#[derive(Debug, Clone, Deserialize)]
struct CatalogFile {
    areas: Vec<AreaDefinition>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct QuestionSpec {
    pub id: QuestionId,
    pub pillar: String,
    pub thematic: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ThematicAreaSpec {
    pub pillar: String,
    pub thematic: String,
    pub question_ids: Vec<QuestionId>,
}

#[derive(Debug, Clone)]
pub struct QuestionCatalog {
    areas: Vec<ThematicAreaSpec>,
    pillars: Vec<String>,
    index: HashMap<QuestionId, usize>,
}

/// Expands `"Q1-Q4"` into `[Q1, Q2, Q3, Q4]`. A single id (`"Q5"`) is a range of one.
pub fn parse_question_range(range: &str) -> Result<Vec<QuestionId>> {
    let re = Regex::new(RANGE_PATTERN).map_err(|e| AssessmentError::configuration(e.to_string()))?;
    let trimmed = range.trim();
    let caps = re.captures(trimmed).ok_or_else(|| {
        AssessmentError::configuration(format!(
            "malformed question range '{}' (expected Q<start>-Q<end>)",
            range
        ))
    })?;

    let bound = |text: &str| -> Result<u32> {
        text.parse::<u32>()
            .ok()
            .filter(|n| *n > 0)
            .ok_or_else(|| {
                AssessmentError::configuration(format!(
                    "question range '{}' must use positive question numbers",
                    range
                ))
            })
    };

    let start = bound(&caps[1])?;
    let end = match caps.get(2) {
        Some(m) => bound(m.as_str())?,
        None => start,
    };

    if start > end {
        return Err(AssessmentError::configuration(format!(
            "question range '{}' ends before it starts",
            range
        )));
    }

    Ok((start..=end).filter_map(QuestionId::new).collect())
}

/// Strips leading outline numbering: `"1.1. DRM policies"` → `"DRM policies"`.
pub fn display_name(name: &str) -> String {
    let mut rest = name.trim_start();
    loop {
        let digits = rest.len() - rest.trim_start_matches(|c: char| c.is_ascii_digit()).len();
        if digits == 0 || !rest[digits..].starts_with('.') {
            break;
        }
        rest = rest[digits + 1..].trim_start();
    }
    rest.trim().to_string()
}

impl QuestionCatalog {
    pub fn from_definitions(definitions: &[AreaDefinition]) -> Result<Self> {
        if definitions.is_empty() {
            return Err(AssessmentError::configuration(
                "catalog defines no thematic areas",
            ));
        }

        let mut areas = Vec::with_capacity(definitions.len());
        let mut pillars: Vec<String> = Vec::new();
        let mut index = HashMap::new();
        let mut thematic_names = HashSet::new();

        for (area_idx, def) in definitions.iter().enumerate() {
            if def.pillar.trim().is_empty() || def.thematic.trim().is_empty() {
                return Err(AssessmentError::configuration(format!(
                    "area #{} needs both a pillar and a thematic name",
                    area_idx + 1
                )));
            }

            if !thematic_names.insert(def.thematic.clone()) {
                return Err(AssessmentError::configuration(format!(
                    "thematic area '{}' is declared twice",
                    def.thematic
                )));
            }

            // 同一支柱的主題必須相鄰，否則圖上的分組會被拆開
            match pillars.last() {
                Some(last) if *last == def.pillar => {}
                _ => {
                    if pillars.contains(&def.pillar) {
                        return Err(AssessmentError::configuration(format!(
                            "pillar '{}' is split by another pillar; keep its areas adjacent",
                            def.pillar
                        )));
                    }
                    pillars.push(def.pillar.clone());
                }
            }

            let question_ids = parse_question_range(&def.questions)?;
            for id in &question_ids {
                if let Some(previous) = index.insert(*id, area_idx) {
                    let other: &ThematicAreaSpec = &areas[previous];
                    return Err(AssessmentError::configuration(format!(
                        "{} is assigned to both '{}' and '{}'",
                        id, other.thematic, def.thematic
                    )));
                }
            }

            areas.push(ThematicAreaSpec {
                pillar: def.pillar.clone(),
                thematic: def.thematic.clone(),
                question_ids,
            });
        }

        let mut numbers: Vec<u32> = index.keys().map(|id| id.number()).collect();
        numbers.sort_unstable();
        for pair in numbers.windows(2) {
            if pair[1] != pair[0] + 1 {
                tracing::warn!(
                    "Catalog has no questions between Q{} and Q{}",
                    pair[0],
                    pair[1]
                );
            }
        }

        tracing::debug!(
            "Catalog built: {} pillars, {} areas, {} questions",
            pillars.len(),
            areas.len(),
            index.len()
        );

        Ok(Self {
            areas,
            pillars,
            index,
        })
    }

    pub fn reference() -> Result<Self> {
        let definitions: Vec<AreaDefinition> = REFERENCE_AREAS
            .iter()
            .map(|(pillar, thematic, questions)| AreaDefinition {
                pillar: pillar.to_string(),
                thematic: thematic.to_string(),
                questions: questions.to_string(),
            })
            .collect();
        Self::from_definitions(&definitions)
    }

    /// 從 TOML 字串載入題目目錄 (`[[areas]]` 清單)
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let file: CatalogFile = toml::from_str(content).map_err(|e| {
            AssessmentError::configuration(format!("catalog TOML parsing error: {}", e))
        })?;
        Self::from_definitions(&file.areas)
    }

    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path)?;
        Self::from_toml_str(&content)
    }

    /// Uses the file when given, the reference catalog otherwise.
    pub fn load(path: Option<&str>) -> Result<Self> {
        match path {
            Some(p) => {
                tracing::info!("📚 Loading question catalog from: {}", p);
                Self::from_file(p)
            }
            None => Self::reference(),
        }
    }

    pub fn areas(&self) -> &[ThematicAreaSpec] {
        &self.areas
    }

    /// Distinct pillar names in display order.
    pub fn pillars(&self) -> &[String] {
        &self.pillars
    }

    pub fn pillar_count(&self) -> usize {
        self.pillars.len()
    }

    pub fn question_count(&self) -> usize {
        self.index.len()
    }

    pub fn contains(&self, id: &QuestionId) -> bool {
        self.index.contains_key(id)
    }

    pub fn lookup(&self, id: &QuestionId) -> Option<&ThematicAreaSpec> {
        self.index.get(id).map(|&i| &self.areas[i])
    }

    pub fn area_index(&self, id: &QuestionId) -> Option<usize> {
        self.index.get(id).copied()
    }

    pub fn question(&self, id: &QuestionId) -> Option<QuestionSpec> {
        self.lookup(id).map(|area| QuestionSpec {
            id: *id,
            pillar: area.pillar.clone(),
            thematic: area.thematic.clone(),
        })
    }

    pub fn find_area(&self, thematic: &str) -> Option<&ThematicAreaSpec> {
        self.areas.iter().find(|a| a.thematic == thematic)
    }

    /// All questions, in catalog order.
    pub fn questions(&self) -> impl Iterator<Item = QuestionSpec> + '_ {
        self.areas.iter().flat_map(|area| {
            area.question_ids.iter().map(move |id| QuestionSpec {
                id: *id,
                pillar: area.pillar.clone(),
                thematic: area.thematic.clone(),
            })
        })
    }

    /// Paste-ready skeleton with every question answered `No` at weight 1.
    pub fn template(&self) -> String {
        self.questions()
            .map(|q| format!("{},No,1", q.id))
            .collect::<Vec<_>>()
            .join(";")
    }
}
