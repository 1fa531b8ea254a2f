//! Turns pasted `Question,Answer,Weight` entries into validated answer records.
//!
//! Parsing is all-or-nothing: the first bad entry aborts the batch with a
//! single descriptive error and nothing partial is returned.

use crate::core::aggregate::aggregate;
use crate::core::catalog::QuestionCatalog;
use crate::domain::model::{Answer, AnswerRecord, InputFormat, QuestionId, RawSubmission, ThematicScore};
use crate::utils::error::{AssessmentError, Result};
use std::collections::BTreeMap;

/// Field order of one entry, shared by the pasted-text and CSV front ends.
pub const ENTRY_SCHEMA: [&str; 3] = ["Question", "Answer", "Weight"];

#[derive(Debug, Clone, PartialEq)]
pub struct ParsedSubmission {
    /// One score per catalog area, in catalog order.
    pub scores: Vec<ThematicScore>,
    pub answers: BTreeMap<QuestionId, AnswerRecord>,
}

/// Parses `Q1,Yes,1;Q2,No,0.5;...` and aggregates it against the catalog.
pub fn parse(raw_text: &str, catalog: &QuestionCatalog) -> Result<ParsedSubmission> {
    let answers = parse_entries(raw_text, catalog)?;
    Ok(finish(answers, catalog))
}

pub fn parse_submission(submission: &RawSubmission, catalog: &QuestionCatalog) -> Result<ParsedSubmission> {
    let answers = match submission.format {
        InputFormat::Delimited => parse_entries(&submission.text, catalog)?,
        InputFormat::Csv => parse_csv(&submission.text, catalog)?,
    };
    Ok(finish(answers, catalog))
}

fn finish(answers: BTreeMap<QuestionId, AnswerRecord>, catalog: &QuestionCatalog) -> ParsedSubmission {
    let scores = aggregate(&answers, catalog);
    ParsedSubmission { scores, answers }
}

pub fn parse_entries(raw_text: &str, catalog: &QuestionCatalog) -> Result<BTreeMap<QuestionId, AnswerRecord>> {
    if raw_text.trim().is_empty() {
        return Err(AssessmentError::EmptyInput);
    }

    let mut answers = BTreeMap::new();
    for fragment in raw_text.split(';').map(str::trim).filter(|f| !f.is_empty()) {
        let fields: Vec<&str> = fragment.split(',').map(str::trim).collect();
        let record = parse_fields(&fields, fragment, catalog)?;
        insert_record(&mut answers, record);
    }

    // 只有分號也視為沒有資料
    if answers.is_empty() {
        return Err(AssessmentError::EmptyInput);
    }

    tracing::debug!("Parsed {} answer entries", answers.len());
    Ok(answers)
}

/// CSV front end: the header row must match [`ENTRY_SCHEMA`] (case-insensitive).
pub fn parse_csv(text: &str, catalog: &QuestionCatalog) -> Result<BTreeMap<QuestionId, AnswerRecord>> {
    if text.trim().is_empty() {
        return Err(AssessmentError::EmptyInput);
    }

    let mut reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .flexible(true)
        .from_reader(text.as_bytes());

    let headers = reader.headers()?.clone();
    let header_matches = headers.len() == ENTRY_SCHEMA.len()
        && headers
            .iter()
            .zip(ENTRY_SCHEMA.iter())
            .all(|(found, expected)| found.eq_ignore_ascii_case(expected));
    if !header_matches {
        return Err(AssessmentError::SchemaMismatch {
            expected: ENTRY_SCHEMA.join(","),
            found: headers.iter().collect::<Vec<_>>().join(","),
        });
    }

    let mut answers = BTreeMap::new();
    for row in reader.records() {
        let row = row?;
        let fields: Vec<&str> = row.iter().collect();
        if fields.iter().all(|f| f.is_empty()) {
            continue;
        }
        let entry = fields.join(",");
        let record = parse_fields(&fields, &entry, catalog)?;
        insert_record(&mut answers, record);
    }

    if answers.is_empty() {
        return Err(AssessmentError::EmptyInput);
    }

    tracing::debug!("Parsed {} CSV rows", answers.len());
    Ok(answers)
}

fn insert_record(answers: &mut BTreeMap<QuestionId, AnswerRecord>, record: AnswerRecord) {
    if answers.insert(record.question_id, record).is_some() {
        tracing::warn!("{} answered more than once; keeping the last entry", record.question_id);
    }
}

fn parse_fields(fields: &[&str], entry: &str, catalog: &QuestionCatalog) -> Result<AnswerRecord> {
    let [id_token, answer_token, weight_token] = fields else {
        return Err(AssessmentError::MalformedEntry {
            entry: entry.to_string(),
            expected: ENTRY_SCHEMA.join(","),
            found: fields.len(),
        });
    };

    let question_id = id_token
        .parse::<QuestionId>()
        .ok()
        .filter(|id| catalog.contains(id))
        .ok_or_else(|| AssessmentError::UnknownQuestion {
            id: id_token.to_string(),
        })?;

    let answer = answer_token
        .parse::<Answer>()
        .map_err(|_| AssessmentError::InvalidAnswer {
            id: question_id.to_string(),
            answer: answer_token.to_string(),
        })?;

    let weight = parse_weight(weight_token).map_err(|reason| AssessmentError::InvalidWeight {
        id: question_id.to_string(),
        weight: weight_token.to_string(),
        reason: reason.to_string(),
    })?;

    Ok(AnswerRecord {
        question_id,
        answer,
        weight,
    })
}

fn parse_weight(token: &str) -> std::result::Result<f64, &'static str> {
    let value = token.parse::<f64>().map_err(|_| "not a decimal number")?;
    if !(0.0..=1.0).contains(&value) {
        return Err("must be between 0 and 1");
    }
    Ok(value)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn catalog() -> QuestionCatalog {
        QuestionCatalog::reference().unwrap()
    }

    #[test]
    fn test_empty_input_is_rejected() {
        let catalog = catalog();
        assert!(matches!(parse("", &catalog), Err(AssessmentError::EmptyInput)));
        assert!(matches!(parse("   ", &catalog), Err(AssessmentError::EmptyInput)));
        assert!(matches!(parse(" ; ;", &catalog), Err(AssessmentError::EmptyInput)));
    }

    #[test]
    fn test_trailing_separator_and_whitespace_are_tolerated() {
        let answers = parse_entries(" Q1 , yes , 1 ; Q2,No,0.5; ", &catalog()).unwrap();
        assert_eq!(answers.len(), 2);
        let q1 = answers[&"Q1".parse().unwrap()];
        assert_eq!(q1.answer, Answer::Yes);
        assert_eq!(q1.weight, 1.0);
    }

    #[test]
    fn test_wrong_field_count_names_the_entry() {
        let err = parse("Q1,Yes,1;Q2,No", &catalog()).unwrap_err();
        match err {
            AssessmentError::MalformedEntry { entry, found, .. } => {
                assert_eq!(entry, "Q2,No");
                assert_eq!(found, 2);
            }
            other => panic!("unexpected error: {other:?}"),
        }
        assert!(matches!(
            parse("Q1,Yes,1,extra", &catalog()),
            Err(AssessmentError::MalformedEntry { found: 4, .. })
        ));
    }

    #[test]
    fn test_unknown_question() {
        assert!(matches!(
            parse("Q999,Yes,1", &catalog()),
            Err(AssessmentError::UnknownQuestion { id }) if id == "Q999"
        ));
        assert!(matches!(
            parse("X1,Yes,1", &catalog()),
            Err(AssessmentError::UnknownQuestion { .. })
        ));
    }

    #[test]
    fn test_invalid_answer() {
        assert!(matches!(
            parse("Q1,Maybe,0.5", &catalog()),
            Err(AssessmentError::InvalidAnswer { answer, .. }) if answer == "Maybe"
        ));
    }

    #[test]
    fn test_invalid_weight() {
        let catalog = catalog();
        assert!(matches!(parse("Q1,Yes,1.5", &catalog), Err(AssessmentError::InvalidWeight { .. })));
        assert!(matches!(parse("Q1,Yes,-0.1", &catalog), Err(AssessmentError::InvalidWeight { .. })));
        assert!(matches!(parse("Q1,Yes,heavy", &catalog), Err(AssessmentError::InvalidWeight { .. })));
        assert!(matches!(parse("Q1,Yes,NaN", &catalog), Err(AssessmentError::InvalidWeight { .. })));
        assert!(parse("Q1,Yes,0", &catalog).is_ok());
        assert!(parse("Q1,Yes,1", &catalog).is_ok());
    }

    #[test]
    fn test_first_violation_aborts_batch() {
        let err = parse("Q1,Yes,1;Q2,Perhaps,1;Q999,Yes,1", &catalog()).unwrap_err();
        assert!(matches!(err, AssessmentError::InvalidAnswer { .. }));
    }

    #[test]
    fn test_duplicate_question_keeps_last() {
        let answers = parse_entries("Q1,Yes,1;Q1,No,0.5", &catalog()).unwrap();
        assert_eq!(answers.len(), 1);
        assert_eq!(answers[&"Q1".parse().unwrap()].answer, Answer::No);
    }

    #[test]
    fn test_csv_front_end() {
        let text = "question,answer,weight\nQ1,Yes,1\nQ2,No,1\n,,\n";
        let answers = parse_csv(text, &catalog()).unwrap();
        assert_eq!(answers.len(), 2);
    }

    #[test]
    fn test_csv_header_is_checked() {
        let text = "Id,Answer,Weight\nQ1,Yes,1\n";
        assert!(matches!(
            parse_csv(text, &catalog()),
            Err(AssessmentError::SchemaMismatch { .. })
        ));
    }

    #[test]
    fn test_csv_rows_use_the_same_validation() {
        let text = "Question,Answer,Weight\nQ1,Yes,2\n";
        assert!(matches!(
            parse_csv(text, &catalog()),
            Err(AssessmentError::InvalidWeight { .. })
        ));
    }

    #[test]
    fn test_parse_is_pure() {
        let catalog = catalog();
        let text = "Q1,Yes,1;Q2,No,1;Q7,Yes,0.3;Q45,Unknown,1";
        let first = parse(text, &catalog).unwrap();
        let second = parse(text, &catalog).unwrap();
        assert_eq!(first, second);
    }
}
