use serde::{Deserialize, Serialize};

use crate::logger;
use crate::models::{AnswerKey, AttemptRecord, Cell, ExerciseRecord, Grid};

/// The fixed trailing block of every row: correct-index(es), hint,
/// correct-answer text, last-chosen-index, was-correct flag, elapsed-time.
pub const TRAILING_COLUMNS: usize = 6;

/// Prompt + at least one candidate + the trailing block.
pub const MIN_ROW_WIDTH: usize = TRAILING_COLUMNS + 2;

/// Whether the correct-index cell carries one answer or an ordered pair of
/// sub-answers. Selected at startup from the config, never per row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AnswerVariant {
    Single,
    Pair,
}

/// Decode a fetched grid into exercise records, one per data row, in row
/// order. Rows narrower than the fixed layout are skipped (and logged), not
/// fatal; malformed cells inside a wide-enough row decode to sentinels.
pub fn parse(grid: &Grid, variant: AnswerVariant) -> Vec<ExerciseRecord> {
    let mut records = Vec::with_capacity(grid.len());
    for (i, row) in grid.iter().enumerate() {
        match parse_row(i + 1, row, variant) {
            Some(record) => records.push(record),
            None => logger::log(&format!(
                "catalog: skipping row {} ({} columns, need at least {})",
                i + 1,
                row.len(),
                MIN_ROW_WIDTH
            )),
        }
    }
    records
}

fn parse_row(sheet_row: usize, row: &[Cell], variant: AnswerVariant) -> Option<ExerciseRecord> {
    if row.len() < MIN_ROW_WIDTH {
        return None;
    }
    let width = row.len();

    let prompt = row[0].display();
    // Candidate columns span everything between the prompt and the trailing
    // block. Only text cells count as candidates.
    let candidates: Vec<String> = row[1..width - TRAILING_COLUMNS]
        .iter()
        .filter_map(|c| c.as_str())
        .map(str::to_string)
        .collect();

    let key = decode_key(&row[width - 6], variant);
    let hint = row[width - 5].display();
    let correct_answer = row[width - 4].display();
    let last_attempt = decode_attempt(&row[width - 3], &row[width - 2], &row[width - 1]);

    Some(ExerciseRecord {
        sheet_row,
        prompt,
        candidates,
        key,
        hint,
        correct_answer,
        last_attempt,
    })
}

/// Decode the three outcome cells into a normalized attempt. The sheet
/// stores the chosen index 1-based; in memory it is the 0-based candidate
/// position, -1 when absent or unparsable.
pub fn decode_attempt(chosen: &Cell, correct: &Cell, elapsed: &Cell) -> AttemptRecord {
    let raw_chosen = decode_int(chosen);
    AttemptRecord {
        chosen_index: if raw_chosen >= 1 { raw_chosen - 1 } else { -1 },
        was_correct: decode_bool(correct),
        elapsed_millis: decode_millis(elapsed),
    }
}

fn decode_key(cell: &Cell, variant: AnswerVariant) -> AnswerKey {
    match variant {
        AnswerVariant::Single => AnswerKey::Single(decode_int(cell)),
        AnswerVariant::Pair => {
            let text = cell.display();
            let mut parts = text.split(',').map(|p| p.trim().parse::<i32>().unwrap_or(-1));
            let first = parts.next().unwrap_or(-1);
            let second = parts.next().unwrap_or(-1);
            AnswerKey::Pair(first, second)
        }
    }
}

/// Integer cell, -1 sentinel on anything unparsable.
fn decode_int(cell: &Cell) -> i32 {
    match cell {
        Cell::Number(n) if n.fract() == 0.0 => *n as i32,
        other => other.display().trim().parse::<i32>().unwrap_or(-1),
    }
}

/// Boolean cell. Sheets renders booleans as TRUE/FALSE; matching is
/// case-insensitive, anything else is false.
fn decode_bool(cell: &Cell) -> bool {
    match cell {
        Cell::Bool(b) => *b,
        other => other.display().trim().eq_ignore_ascii_case("true"),
    }
}

/// Elapsed-time cell, 0 sentinel on anything unparsable.
fn decode_millis(cell: &Cell) -> u64 {
    match cell {
        Cell::Number(n) if *n >= 0.0 => *n as u64,
        other => other.display().trim().parse::<u64>().unwrap_or(0),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn text_row(cells: &[&str]) -> Vec<Cell> {
        cells.iter().map(|c| Cell::from(*c)).collect()
    }

    #[test]
    fn test_parse_width_nine_scenario() {
        let grid = vec![text_row(&[
            "cat", "кот", "собака", "1", "a pet", "кот", "1", "TRUE", "2000",
        ])];
        let records = parse(&grid, AnswerVariant::Single);
        assert_eq!(records.len(), 1);

        let record = &records[0];
        assert_eq!(record.prompt, "cat");
        assert_eq!(record.candidates, vec!["кот", "собака"]);
        assert_eq!(record.key, AnswerKey::Single(1));
        assert_eq!(record.hint, "a pet");
        assert_eq!(record.correct_answer, "кот");
        assert_eq!(record.last_attempt.chosen_index, 0);
        assert!(record.last_attempt.was_correct);
        assert_eq!(record.last_attempt.elapsed_millis, 2000);
    }

    #[test]
    fn test_parse_preserves_row_order_one_record_per_row() {
        let grid = vec![
            text_row(&["a", "x", "0", "h", "x", "", "", ""]),
            text_row(&["b", "y", "0", "h", "y", "", "", ""]),
            text_row(&["c", "z", "0", "h", "z", "", "", ""]),
        ];
        let records = parse(&grid, AnswerVariant::Single);
        assert_eq!(records.len(), 3);
        assert_eq!(records[0].prompt, "a");
        assert_eq!(records[1].prompt, "b");
        assert_eq!(records[2].prompt, "c");
    }

    #[test]
    fn test_non_numeric_correct_index_decodes_to_sentinel() {
        let grid = vec![text_row(&[
            "cat", "кот", "собака", "oops", "a pet", "кот", "", "", "",
        ])];
        let records = parse(&grid, AnswerVariant::Single);
        assert_eq!(records.len(), 1, "malformed cell must not drop the row");
        assert_eq!(records[0].key, AnswerKey::Single(-1));
    }

    #[test]
    fn test_malformed_outcome_cells_decode_to_sentinels() {
        let grid = vec![text_row(&[
            "cat", "кот", "1", "hint", "кот", "abc", "yes", "soon",
        ])];
        let records = parse(&grid, AnswerVariant::Single);
        let attempt = records[0].last_attempt;
        assert_eq!(attempt.chosen_index, -1);
        assert!(!attempt.was_correct);
        assert_eq!(attempt.elapsed_millis, 0);
    }

    #[test]
    fn test_narrow_row_skipped_rest_loads() {
        let grid = vec![
            text_row(&["too", "narrow"]),
            text_row(&["cat", "кот", "0", "hint", "кот", "", "", ""]),
        ];
        let records = parse(&grid, AnswerVariant::Single);
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].prompt, "cat");
        // The surviving record still knows its real sheet row.
        assert_eq!(records[0].sheet_row, 2);
    }

    #[test]
    fn test_records_carry_sheet_rows() {
        let grid = vec![
            text_row(&["a", "x", "0", "h", "x", "", "", ""]),
            text_row(&["b", "y", "0", "h", "y", "", "", ""]),
        ];
        let records = parse(&grid, AnswerVariant::Single);
        assert_eq!(records[0].sheet_row, 1);
        assert_eq!(records[1].sheet_row, 2);
    }

    #[test]
    fn test_non_text_candidate_cells_dropped() {
        let row = vec![
            Cell::from("cat"),
            Cell::from("кот"),
            Cell::Number(7.0),
            Cell::from("собака"),
            Cell::from("1"),
            Cell::from("hint"),
            Cell::from("кот"),
            Cell::Empty,
            Cell::Empty,
            Cell::Empty,
        ];
        let records = parse(&vec![row], AnswerVariant::Single);
        assert_eq!(records[0].candidates, vec!["кот", "собака"]);
    }

    #[test]
    fn test_pair_key_decoding() {
        let grid = vec![text_row(&[
            "good morning", "доброе", "утро", "день", "0,1", "greeting", "доброе утро", "", "", "",
        ])];
        let records = parse(&grid, AnswerVariant::Pair);
        assert_eq!(records[0].key, AnswerKey::Pair(0, 1));
    }

    #[test]
    fn test_pair_key_malformed_halves() {
        let grid = vec![text_row(&[
            "p", "a", "b", "x,1", "h", "a b", "", "", "",
        ])];
        let records = parse(&grid, AnswerVariant::Pair);
        assert_eq!(records[0].key, AnswerKey::Pair(-1, 1));

        let grid = vec![text_row(&["p", "a", "b", "2", "h", "a b", "", "", ""])];
        let records = parse(&grid, AnswerVariant::Pair);
        assert_eq!(records[0].key, AnswerKey::Pair(2, -1));
    }

    #[test]
    fn test_numeric_cells_decode_without_text_roundtrip() {
        let row = vec![
            Cell::from("cat"),
            Cell::from("кот"),
            Cell::Number(1.0),
            Cell::from("hint"),
            Cell::from("кот"),
            Cell::Number(1.0),
            Cell::Bool(true),
            Cell::Number(2000.0),
        ];
        let records = parse(&vec![row], AnswerVariant::Single);
        let record = &records[0];
        assert_eq!(record.key, AnswerKey::Single(1));
        assert_eq!(record.last_attempt.chosen_index, 0);
        assert!(record.last_attempt.was_correct);
        assert_eq!(record.last_attempt.elapsed_millis, 2000);
    }

    #[test]
    fn test_one_based_chosen_normalizes_to_candidate_position() {
        // The sheet stores the chosen index 1-based; 0 or blank means no
        // attempt yet.
        let attempt = decode_attempt(&Cell::from("2"), &Cell::from("FALSE"), &Cell::from("500"));
        assert_eq!(attempt.chosen_index, 1);

        let attempt = decode_attempt(&Cell::from("0"), &Cell::Empty, &Cell::Empty);
        assert_eq!(attempt.chosen_index, -1);
    }
}
