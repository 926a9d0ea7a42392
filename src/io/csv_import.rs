use std::path::Path;

use chrono::NaiveDate;

use crate::error::{Result, TimelineError};
use crate::model::{Item, ItemId};

/// Date formats tried in order; ISO first.
const DATE_FORMATS: &[&str] = &[
    "%Y-%m-%d", "%d/%m/%Y", "%m/%d/%Y", "%d-%m-%Y", "%d.%m.%Y", "%Y/%m/%d",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Column {
    Id,
    Name,
    Start,
    End,
}

/// Try parsing a date string with several common formats.
fn parse_date(s: &str) -> Option<NaiveDate> {
    let s = s.trim();
    DATE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(s, fmt).ok())
}

/// Detect delimiter by checking the first line for common separators.
fn detect_delimiter(first_line: &str) -> u8 {
    let semicolons = first_line.matches(';').count();
    let commas = first_line.matches(',').count();
    let tabs = first_line.matches('\t').count();

    if semicolons >= commas && semicolons >= tabs {
        b';'
    } else if tabs >= commas {
        b'\t'
    } else {
        b','
    }
}

/// Map a header to a column, ignoring case, spaces, hyphens and underscores.
fn header_to_column(header: &str) -> Option<Column> {
    let normalized = header.trim().to_lowercase().replace([' ', '-', '_'], "");
    match normalized.as_str() {
        "id" | "itemid" | "key" => Some(Column::Id),
        "name" | "item" | "itemname" | "task" | "label" | "title" => Some(Column::Name),
        "start" | "startdate" | "from" | "begin" => Some(Column::Start),
        "end" | "enddate" | "to" | "finish" | "due" => Some(Column::End),
        _ => None,
    }
}

/// Import items from a CSV file.
pub fn import_csv(path: &Path) -> Result<Vec<Item>> {
    let content = std::fs::read_to_string(path)?;
    parse_csv(&content)
}

/// Parse CSV text into items.
///
/// The delimiter is auto-detected. `name`, `start` and `end` columns are
/// required; ids fall back to the 1-based data row number. A row with an
/// unreadable date fails the whole import.
pub fn parse_csv(content: &str) -> Result<Vec<Item>> {
    let first_line = content.lines().next().unwrap_or("");
    let delimiter = detect_delimiter(first_line);

    let mut reader = csv::ReaderBuilder::new()
        .delimiter(delimiter)
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(content.as_bytes());

    let columns: Vec<Option<Column>> = reader.headers()?.iter().map(header_to_column).collect();

    let position = |col: Column| columns.iter().position(|c| *c == Some(col));
    let (name_at, start_at, end_at) = match (
        position(Column::Name),
        position(Column::Start),
        position(Column::End),
    ) {
        (Some(n), Some(s), Some(e)) => (n, s, e),
        _ => {
            let missing: Vec<&str> = [
                (Column::Name, "name"),
                (Column::Start, "start"),
                (Column::End, "end"),
            ]
            .iter()
            .filter(|(col, _)| position(*col).is_none())
            .map(|(_, label)| *label)
            .collect();
            return Err(TimelineError::MissingColumns(missing.join(", ")));
        }
    };
    let id_at = position(Column::Id);

    let mut items = Vec::new();
    for (index, record) in reader.records().enumerate() {
        let record = record?;
        let row = index + 1;
        let field = |at: usize| record.get(at).unwrap_or("");

        let id: ItemId = match id_at.map(field) {
            Some(raw) if !raw.is_empty() => raw.parse().map_err(|_| TimelineError::InvalidRow {
                row,
                reason: format!("invalid id '{raw}'"),
            })?,
            _ => row as ItemId,
        };

        let start = date_field(field(start_at), row)?;
        let end = date_field(field(end_at), row)?;
        let item = Item::new(id, field(name_at), start, end);
        item.validate()?;
        items.push(item);
    }

    tracing::info!(items = items.len(), "Imported CSV");
    Ok(items)
}

fn date_field(raw: &str, row: usize) -> Result<NaiveDate> {
    parse_date(raw).ok_or_else(|| {
        tracing::warn!(row, value = raw, "Unreadable date in CSV");
        TimelineError::InvalidDate {
            value: raw.to_string(),
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn semicolon_file_with_loose_headers() {
        let items = parse_csv(
            "Item Name;Start Date;End Date\n\
             Kickoff;01/02/2024;03/02/2024\n\
             Review;2024-02-05;2024-02-05\n",
        )
        .unwrap();
        assert_eq!(items.len(), 2);
        assert_eq!(items[0].id, 1);
        assert_eq!(items[0].name, "Kickoff");
        assert_eq!(items[0].start.to_string(), "2024-02-01");
        assert_eq!(items[1].id, 2);
        assert_eq!(items[1].span_days(), 0);
    }

    #[test]
    fn comma_file_with_ids() {
        let items = parse_csv("id,name,start,end\n7,A,2024-01-01,2024-01-02\n").unwrap();
        assert_eq!(items[0].id, 7);
    }

    #[test]
    fn missing_columns_are_named() {
        let err = parse_csv("name,from\nA,2024-01-01\n").unwrap_err();
        match err {
            TimelineError::MissingColumns(cols) => assert_eq!(cols, "end"),
            other => panic!("unexpected error {other:?}"),
        }
    }

    #[test]
    fn bad_date_fails_the_import() {
        let err = parse_csv("name;start;end\nA;2024-01-01;someday\n").unwrap_err();
        assert!(matches!(err, TimelineError::InvalidDate { ref value } if value == "someday"));
    }

    #[test]
    fn bad_id_names_the_row() {
        let err = parse_csv("id,name,start,end\nx1,A,2024-01-01,2024-01-02\n").unwrap_err();
        assert!(matches!(err, TimelineError::InvalidRow { row: 1, .. }));
    }

    #[test]
    fn reversed_dates_are_rejected() {
        let err = parse_csv("name,start,end\nA,2024-01-05,2024-01-01\n").unwrap_err();
        assert!(matches!(err, TimelineError::InvariantViolation(_)));
    }

    #[test]
    fn reads_from_disk() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("items.csv");
        std::fs::write(&path, "name\tstart\tend\nTabbed\t2024-03-01\t2024-03-04\n").unwrap();
        let items = import_csv(&path).unwrap();
        assert_eq!(items[0].name, "Tabbed");
    }
}
