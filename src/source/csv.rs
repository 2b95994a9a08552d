use async_trait::async_trait;

use crate::error::SourceError;
use crate::logger;
use crate::models::{Cell, Grid};
use crate::range;
use crate::source::{AnswerRecorder, Outcome, OutcomeEcho, TabularSource};

/// Published CSV export fetched by plain URL. The document carries a header
/// row naming its columns; records are keyed by header name and normalized
/// into the same positional layout the catalog expects, so the rest of the
/// app cannot tell the variants apart.
///
/// A published export is read-only: `record` always fails with a remote
/// error and the caller logs and moves on.
pub struct CsvSource {
    client: reqwest::Client,
    url: String,
}

/// Header names the export must carry. Candidate columns are every header
/// starting with `option`, kept in document order.
const PROMPT_HEADER: &str = "word";
const TRAILING_HEADERS: [&str; 6] = [
    "correct",
    "hint",
    "answer",
    "last_choice",
    "last_correct",
    "time_ms",
];

impl CsvSource {
    /// `url` may contain the literal `{sheet}` placeholder; it is replaced
    /// with the range's sheet name so each level can point at its own
    /// published export.
    pub fn new(url: String) -> Self {
        Self {
            client: reqwest::Client::new(),
            url,
        }
    }

    fn url_for(&self, range: &str) -> String {
        self.url.replace("{sheet}", range::sheet_of(range))
    }
}

#[async_trait]
impl TabularSource for CsvSource {
    async fn fetch(&self, range: &str) -> Result<Grid, SourceError> {
        let url = self.url_for(range);
        logger::log(&format!("csv: fetching {}", url));

        let response = self.client.get(&url).send().await?;
        let status = response.status();
        let text = response.text().await?;
        if !status.is_success() {
            return Err(SourceError::Remote(format!("{}: {}", status, text)));
        }

        normalize(&text)
    }
}

#[async_trait]
impl AnswerRecorder for CsvSource {
    async fn record(&self, outcome: &Outcome) -> Result<OutcomeEcho, SourceError> {
        logger::log(&format!(
            "csv: dropping record for row {} of {} (published export is read-only)",
            outcome.row, outcome.sheet
        ));
        Err(SourceError::Remote(
            "published CSV export is read-only".to_string(),
        ))
    }
}

struct HeaderMap {
    prompt: usize,
    candidates: Vec<usize>,
    trailing: [usize; 6],
}

fn header_map(headers: &[String]) -> Result<HeaderMap, SourceError> {
    let find = |name: &str| -> Result<usize, SourceError> {
        headers
            .iter()
            .position(|h| h.trim().eq_ignore_ascii_case(name))
            .ok_or_else(|| SourceError::Decode(format!("csv header missing column '{}'", name)))
    };

    let prompt = find(PROMPT_HEADER)?;
    let candidates: Vec<usize> = headers
        .iter()
        .enumerate()
        .filter(|(_, h)| h.trim().to_ascii_lowercase().starts_with("option"))
        .map(|(i, _)| i)
        .collect();
    if candidates.is_empty() {
        return Err(SourceError::Decode(
            "csv header has no option columns".to_string(),
        ));
    }

    let mut trailing = [0usize; 6];
    for (slot, name) in TRAILING_HEADERS.iter().enumerate() {
        trailing[slot] = find(name)?;
    }

    Ok(HeaderMap {
        prompt,
        candidates,
        trailing,
    })
}

/// Re-shape header-keyed records into the positional layout: prompt,
/// candidates, then the fixed trailing block. Empty fields become empty
/// cells so the catalog drops them from the candidate list.
fn normalize(text: &str) -> Result<Grid, SourceError> {
    let mut lines = text.lines().filter(|l| !l.trim().is_empty());
    let Some(header_line) = lines.next() else {
        return Ok(Vec::new());
    };
    let map = header_map(&split_csv_line(header_line))?;

    let mut grid = Vec::new();
    for line in lines {
        let fields = split_csv_line(line);
        let field = |i: usize| -> Cell {
            match fields.get(i) {
                Some(f) if !f.is_empty() => Cell::Text(f.clone()),
                _ => Cell::Empty,
            }
        };

        let mut row = Vec::with_capacity(2 + map.candidates.len() + map.trailing.len());
        row.push(field(map.prompt));
        for &i in &map.candidates {
            row.push(field(i));
        }
        for &i in &map.trailing {
            row.push(field(i));
        }
        grid.push(row);
    }
    Ok(grid)
}

/// Split one CSV line into fields, honoring double quotes and `""` escapes.
pub fn split_csv_line(line: &str) -> Vec<String> {
    let mut fields = Vec::new();
    let mut field = String::new();
    let mut in_quotes = false;
    let mut chars = line.chars().peekable();

    while let Some(c) = chars.next() {
        match c {
            '"' if !in_quotes => {
                in_quotes = true;
            }
            '"' if in_quotes => {
                if chars.peek() == Some(&'"') {
                    chars.next();
                    field.push('"');
                } else {
                    in_quotes = false;
                }
            }
            ',' if !in_quotes => {
                fields.push(std::mem::take(&mut field));
            }
            _ => {
                field.push(c);
            }
        }
    }

    fields.push(field);
    fields
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::{self, AnswerVariant};
    use crate::models::AnswerKey;

    #[test]
    fn test_split_csv_simple() {
        assert_eq!(split_csv_line("a,b,c"), vec!["a", "b", "c"]);
    }

    #[test]
    fn test_split_csv_with_quotes() {
        assert_eq!(split_csv_line("\"a\",\"b\""), vec!["a", "b"]);
    }

    #[test]
    fn test_split_csv_with_commas_in_field() {
        assert_eq!(
            split_csv_line("\"a, still a\",b"),
            vec!["a, still a", "b"]
        );
    }

    #[test]
    fn test_split_csv_with_escaped_quotes() {
        assert_eq!(
            split_csv_line("\"say \"\"hi\"\"\",b"),
            vec!["say \"hi\"", "b"]
        );
    }

    #[test]
    fn test_split_csv_empty_fields() {
        assert_eq!(split_csv_line(",,"), vec!["", "", ""]);
    }

    #[test]
    fn test_url_placeholder_substitution() {
        let source = CsvSource::new("https://host/pub?sheet={sheet}&output=csv".to_string());
        assert_eq!(
            source.url_for("Sheet3!A:L"),
            "https://host/pub?sheet=Sheet3&output=csv"
        );
    }

    #[test]
    fn test_normalize_reorders_by_header() {
        let text = "hint,word,option1,option2,correct,answer,last_choice,last_correct,time_ms\n\
                    a pet,cat,кот,собака,1,кот,1,TRUE,2000\n";
        let grid = normalize(text).unwrap();
        assert_eq!(grid.len(), 1);

        let records = catalog::parse(&grid, AnswerVariant::Single);
        assert_eq!(records.len(), 1);
        let record = &records[0];
        assert_eq!(record.prompt, "cat");
        assert_eq!(record.candidates, vec!["кот", "собака"]);
        assert_eq!(record.key, AnswerKey::Single(1));
        assert_eq!(record.hint, "a pet");
        assert_eq!(record.correct_answer, "кот");
        assert!(record.last_attempt.was_correct);
    }

    #[test]
    fn test_normalize_empty_option_fields_drop_out() {
        let text = "word,option1,option2,option3,correct,hint,answer,last_choice,last_correct,time_ms\n\
                    cat,кот,,собака,1,a pet,кот,,,\n";
        let grid = normalize(text).unwrap();
        let records = catalog::parse(&grid, AnswerVariant::Single);
        assert_eq!(records[0].candidates, vec!["кот", "собака"]);
        assert_eq!(records[0].last_attempt.chosen_index, -1);
    }

    #[test]
    fn test_normalize_missing_header_is_decode_error() {
        let text = "word,option1,hint,answer,last_choice,last_correct,time_ms\nx,y,h,y,,,\n";
        assert!(matches!(
            normalize(text),
            Err(SourceError::Decode(_))
        ));
    }

    #[test]
    fn test_normalize_blank_lines_skipped() {
        let text = "word,option1,correct,hint,answer,last_choice,last_correct,time_ms\n\
                    \n\
                    cat,кот,0,a pet,кот,,,\n\
                    \n";
        let grid = normalize(text).unwrap();
        assert_eq!(grid.len(), 1);
    }

    #[test]
    fn test_normalize_empty_document() {
        assert!(normalize("").unwrap().is_empty());
    }

    #[test]
    fn test_record_is_rejected_read_only() {
        let source = CsvSource::new("https://host/pub.csv".to_string());
        let outcome = Outcome {
            sheet: "Sheet1".to_string(),
            row: 1,
            chosen_index: 0,
            was_correct: true,
            elapsed_millis: 10,
        };
        let rt = tokio::runtime::Runtime::new().unwrap();
        let result = rt.block_on(source.record(&outcome));
        match result {
            Err(SourceError::Remote(msg)) => assert!(msg.contains("read-only")),
            other => panic!("expected remote error, got {:?}", other),
        }
    }
}
