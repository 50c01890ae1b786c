use super::error::LoadError;
use super::model::SeasonRow;

/// Columns every input table must provide, in canonical order.
pub const REQUIRED_COLUMNS: [&str; 11] = [
    "season_end_year",
    "team",
    "position",
    "played",
    "won",
    "drawn",
    "lost",
    "gf",
    "ga",
    "gd",
    "points",
];

/// Trim surrounding whitespace and lowercase a header cell.
pub fn normalize_column_name(name: &str) -> String {
    name.trim().to_lowercase()
}

// ---------------------------------------------------------------------------
// ColumnIndex – header position of each required column
// ---------------------------------------------------------------------------

/// Position of each required column in a header row, resolved once per load.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ColumnIndex {
    pub season_end_year: usize,
    pub team: usize,
    pub position: usize,
    pub played: usize,
    pub won: usize,
    pub drawn: usize,
    pub lost: usize,
    pub gf: usize,
    pub ga: usize,
    pub gd: usize,
    pub points: usize,
}

impl ColumnIndex {
    /// Match already-normalized header names against [`REQUIRED_COLUMNS`].
    ///
    /// Every absent column is reported at once. A required name that occurs
    /// twice is rejected rather than silently picking one.
    pub fn resolve(headers: &[String]) -> Result<Self, LoadError> {
        let mut found = [None::<usize>; REQUIRED_COLUMNS.len()];

        for (pos, header) in headers.iter().enumerate() {
            let Some(slot) = REQUIRED_COLUMNS.iter().position(|c| *c == header.as_str()) else {
                continue;
            };
            if found[slot].is_some() {
                return Err(LoadError::AmbiguousColumn(header.clone()));
            }
            found[slot] = Some(pos);
        }

        let missing: Vec<String> = REQUIRED_COLUMNS
            .iter()
            .zip(found.iter())
            .filter(|(_, idx)| idx.is_none())
            .map(|(name, _)| name.to_string())
            .collect();
        if !missing.is_empty() {
            return Err(LoadError::MissingColumns(missing));
        }

        let at = |i: usize| found[i].unwrap_or_default();
        Ok(Self {
            season_end_year: at(0),
            team: at(1),
            position: at(2),
            played: at(3),
            won: at(4),
            drawn: at(5),
            lost: at(6),
            gf: at(7),
            ga: at(8),
            gd: at(9),
            points: at(10),
        })
    }

    /// Build a typed row from raw cell text. `row` is the 1-based data row
    /// used in error messages.
    pub fn build_row<S: AsRef<str>>(&self, cells: &[S], row: usize) -> Result<SeasonRow, LoadError> {
        let cell = |idx: usize| cells.get(idx).map(|c| c.as_ref()).unwrap_or("");

        Ok(SeasonRow {
            season_end_year: to_i32(cell(self.season_end_year), "season_end_year", row)?,
            team: cell(self.team).to_string(),
            position: to_u32(cell(self.position), "position", row)?,
            played: to_u32(cell(self.played), "played", row)?,
            won: to_u32(cell(self.won), "won", row)?,
            drawn: to_u32(cell(self.drawn), "drawn", row)?,
            lost: to_u32(cell(self.lost), "lost", row)?,
            gf: to_u32(cell(self.gf), "gf", row)?,
            ga: to_u32(cell(self.ga), "ga", row)?,
            gd: to_i32(cell(self.gd), "gd", row)?,
            points: to_u32(cell(self.points), "points", row)?,
        })
    }
}

// ---------------------------------------------------------------------------
// Integer coercion
// ---------------------------------------------------------------------------

/// Parse a whole number. Accepts `"2023"` and float renderings such as
/// `"2023.0"` (common from spreadsheets) but rejects `"2023.5"` and text.
pub fn parse_whole_number(raw: &str) -> Option<i64> {
    let s = raw.trim();
    if let Ok(i) = s.parse::<i64>() {
        return Some(i);
    }
    let f = s.parse::<f64>().ok()?;
    if f.is_finite() && f.fract() == 0.0 && f.abs() < i64::MAX as f64 {
        Some(f as i64)
    } else {
        None
    }
}

fn coercion_error(raw: &str, column: &str, row: usize) -> LoadError {
    LoadError::TypeCoercion {
        column: column.to_string(),
        row,
        value: raw.to_string(),
    }
}

fn to_i32(raw: &str, column: &str, row: usize) -> Result<i32, LoadError> {
    parse_whole_number(raw)
        .and_then(|v| i32::try_from(v).ok())
        .ok_or_else(|| coercion_error(raw, column, row))
}

fn to_u32(raw: &str, column: &str, row: usize) -> Result<u32, LoadError> {
    parse_whole_number(raw)
        .and_then(|v| u32::try_from(v).ok())
        .ok_or_else(|| coercion_error(raw, column, row))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn headers(names: &[&str]) -> Vec<String> {
        names.iter().map(|n| normalize_column_name(n)).collect()
    }

    #[test]
    fn normalizes_whitespace_and_case() {
        assert_eq!(normalize_column_name("  Season_End_Year "), "season_end_year");
        assert_eq!(normalize_column_name("GF"), "gf");
    }

    #[test]
    fn resolves_columns_in_any_order() {
        let mut names = REQUIRED_COLUMNS.to_vec();
        names.reverse();
        names.insert(3, "notes");
        let idx = ColumnIndex::resolve(&headers(&names)).unwrap();
        assert_eq!(idx.points, 0);
        assert_eq!(idx.season_end_year, 11);
    }

    #[test]
    fn reports_every_missing_column() {
        let err = ColumnIndex::resolve(&headers(&["team", "won", "points"])).unwrap_err();
        match err {
            LoadError::MissingColumns(missing) => assert_eq!(
                missing,
                vec!["season_end_year", "position", "played", "drawn", "lost", "gf", "ga", "gd"]
            ),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn duplicate_required_header_is_ambiguous() {
        let mut names = REQUIRED_COLUMNS.to_vec();
        names.push(" Team");
        let err = ColumnIndex::resolve(&headers(&names)).unwrap_err();
        assert!(matches!(err, LoadError::AmbiguousColumn(c) if c == "team"));
    }

    #[test]
    fn whole_number_parsing() {
        assert_eq!(parse_whole_number("2023"), Some(2023));
        assert_eq!(parse_whole_number(" 2023.0 "), Some(2023));
        assert_eq!(parse_whole_number("-4"), Some(-4));
        assert_eq!(parse_whole_number("2023.5"), None);
        assert_eq!(parse_whole_number("twenty"), None);
        assert_eq!(parse_whole_number(""), None);
        assert_eq!(parse_whole_number("NaN"), None);
    }

    #[test]
    fn build_row_rejects_negative_counts() {
        let idx = ColumnIndex::resolve(&headers(&REQUIRED_COLUMNS)).unwrap();
        let cells = ["2023", "A", "1", "-2", "2", "0", "0", "5", "1", "4", "6"];
        let err = idx.build_row(&cells[..], 1).unwrap_err();
        assert!(matches!(err, LoadError::TypeCoercion { ref column, row: 1, .. } if column == "played"));
    }

    #[test]
    fn build_row_allows_negative_goal_difference() {
        let idx = ColumnIndex::resolve(&headers(&REQUIRED_COLUMNS)).unwrap();
        let cells = ["2023", "B", "2", "2", "0", "0", "2", "1", "5", "-4", "0"];
        let row = idx.build_row(&cells[..], 2).unwrap();
        assert_eq!(row.gd, -4);
        assert_eq!(row.team, "B");
    }
}
