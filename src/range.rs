//! A1-notation range addressing. Each level is one worksheet (`Sheet1`,
//! `Sheet2`, ...); a level's exercises live in the whole-column range A:L
//! and the three outcome columns of a row are J:L.

/// Leftmost and rightmost data columns of the fixed layout.
pub const FIRST_COLUMN: char = 'A';
pub const LAST_COLUMN: char = 'L';
/// First of the three writable outcome columns (chosen index, correctness,
/// elapsed time).
pub const OUTCOME_COLUMN: char = 'J';

/// Worksheet name for a level.
pub fn level_sheet(level: u32) -> String {
    format!("Sheet{}", level)
}

/// Whole-column read range for a worksheet, e.g. `Sheet3!A:L`.
pub fn full_range(sheet: &str) -> String {
    format!("{}!{}:{}", sheet, FIRST_COLUMN, LAST_COLUMN)
}

/// Write range for one row's outcome block, e.g. `Sheet3!J14:L14`.
/// `row` is the 1-based sheet row.
pub fn outcome_range(sheet: &str, row: usize) -> String {
    format!(
        "{}!{}{}:{}{}",
        sheet, OUTCOME_COLUMN, row, LAST_COLUMN, row
    )
}

/// Sheet name part of a range id (`Sheet3!A:L` -> `Sheet3`). A range with no
/// `!` addresses the whole range on the default sheet, so the id itself is
/// returned.
pub fn sheet_of(range: &str) -> &str {
    match range.split_once('!') {
        Some((sheet, _)) => sheet,
        None => range,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_level_sheet_names() {
        assert_eq!(level_sheet(1), "Sheet1");
        assert_eq!(level_sheet(12), "Sheet12");
    }

    #[test]
    fn test_full_range() {
        assert_eq!(full_range("Sheet2"), "Sheet2!A:L");
    }

    #[test]
    fn test_outcome_range_targets_trailing_block() {
        assert_eq!(outcome_range("Sheet1", 14), "Sheet1!J14:L14");
        assert_eq!(outcome_range("Sheet5", 1), "Sheet5!J1:L1");
    }

    #[test]
    fn test_sheet_of() {
        assert_eq!(sheet_of("Sheet3!A:L"), "Sheet3");
        assert_eq!(sheet_of("Sheet3!J14:L14"), "Sheet3");
        assert_eq!(sheet_of("Sheet3"), "Sheet3");
    }
}
