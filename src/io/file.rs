use std::path::Path;

use serde::Deserialize;

use crate::error::Result;
use crate::model::{Item, ItemId};

/// On-disk shape of an item. Dates stay strings until validated so that a
/// malformed date surfaces as `InvalidDate` instead of a generic JSON error.
#[derive(Debug, Deserialize)]
struct RawItem {
    id: ItemId,
    name: String,
    start: String,
    end: String,
}

/// Load items from a JSON array of `{ id, name, start, end }` objects.
pub fn load_items(path: &Path) -> Result<Vec<Item>> {
    let json = std::fs::read_to_string(path)?;
    parse_items(&json)
}

/// Parse items from JSON text. Any invalid date fails the whole list.
pub fn parse_items(json: &str) -> Result<Vec<Item>> {
    let raw: Vec<RawItem> = serde_json::from_str(json)?;
    raw.into_iter()
        .map(|r| Item::parse(r.id, r.name, &r.start, &r.end))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::TimelineError;

    #[test]
    fn parses_item_list() {
        let items = parse_items(
            r#"[
                {"id": 1, "name": "First", "start": "2024-01-01", "end": "2024-01-05"},
                {"id": 2, "name": "Second", "start": "2024-01-03", "end": "2024-01-03"}
            ]"#,
        )
        .unwrap();
        assert_eq!(items.len(), 2);
        assert_eq!(items[1].name, "Second");
        assert_eq!(items[1].span_days(), 0);
    }

    #[test]
    fn bad_date_is_invalid_date_error() {
        let err = parse_items(
            r#"[{"id": 1, "name": "x", "start": "2024-02-30", "end": "2024-03-01"}]"#,
        )
        .unwrap_err();
        assert!(matches!(err, TimelineError::InvalidDate { ref value } if value == "2024-02-30"));
    }

    #[test]
    fn reversed_range_is_rejected() {
        let err = parse_items(
            r#"[{"id": 1, "name": "x", "start": "2024-03-05", "end": "2024-03-01"}]"#,
        )
        .unwrap_err();
        assert!(matches!(err, TimelineError::InvariantViolation(_)));
    }

    #[test]
    fn structural_errors_are_json_errors() {
        let err = parse_items(r#"{"id": 1}"#).unwrap_err();
        assert!(matches!(err, TimelineError::Json(_)));
    }

    #[test]
    fn loads_from_disk() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("items.json");
        std::fs::write(
            &path,
            r#"[{"id": 9, "name": "Disk", "start": "2024-05-01", "end": "2024-05-02"}]"#,
        )
        .unwrap();
        let items = load_items(&path).unwrap();
        assert_eq!(items[0].id, 9);

        let missing = load_items(&dir.path().join("missing.json")).unwrap_err();
        assert!(matches!(missing, TimelineError::Io(_)));
    }
}
