// Location list loading and validation
use crate::domain::location::Location;
use std::collections::HashSet;
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum LocationFileError {
    #[error("could not open location file {path}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid location JSON: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("location file contains no locations")]
    Empty,
    #[error("location #{index} has a blank id")]
    BlankId { index: usize },
    #[error("location id '{0}' appears more than once")]
    DuplicateId(String),
    #[error("location '{id}' has coordinates out of range ({lat}, {long})")]
    OutOfRange { id: String, lat: f64, long: f64 },
}

pub fn load_locations(path: impl AsRef<Path>) -> Result<Vec<Location>, LocationFileError> {
    let path = path.as_ref();
    let file = File::open(path).map_err(|source| LocationFileError::Io {
        path: path.display().to_string(),
        source,
    })?;
    read_locations(BufReader::new(file))
}

/// Parse a JSON array of `{ "id", "lat", "long" }` objects and validate it.
pub fn read_locations(reader: impl Read) -> Result<Vec<Location>, LocationFileError> {
    let locations: Vec<Location> = serde_json::from_reader(reader)?;

    if locations.is_empty() {
        return Err(LocationFileError::Empty);
    }

    let mut seen = HashSet::new();
    for (index, location) in locations.iter().enumerate() {
        if location.id.trim().is_empty() {
            return Err(LocationFileError::BlankId { index });
        }
        if !seen.insert(location.id.as_str()) {
            return Err(LocationFileError::DuplicateId(location.id.clone()));
        }
        if !location.has_valid_coordinates() {
            return Err(LocationFileError::OutOfRange {
                id: location.id.clone(),
                lat: location.lat,
                long: location.long,
            });
        }
    }

    Ok(locations)
}

/// Example document shown when the location file cannot be used.
pub fn location_file_example() -> &'static str {
    r#"[
  {
    "id": "tryvannstua",
    "lat": 59.9981362,
    "long": 10.6660856
  },
  {
    "id": "skrindo",
    "lat": 60.6605926,
    "long": 8.5740604
  }
]"#
}

#[cfg(test)]
mod tests {
    use super::*;

    fn read(json: &str) -> Result<Vec<Location>, LocationFileError> {
        read_locations(json.as_bytes())
    }

    #[test]
    fn test_read_locations() {
        let locations = read(location_file_example()).unwrap();
        assert_eq!(
            locations,
            vec![
                Location::new("tryvannstua", 59.9981362, 10.6660856),
                Location::new("skrindo", 60.6605926, 8.5740604),
            ]
        );
    }

    #[test]
    fn test_missing_id_is_rejected() {
        let json = r#"[{ "idx": "tryvannstua", "lat": 59.99, "long": 10.66 }]"#;
        assert!(matches!(read(json), Err(LocationFileError::Parse(_))));
    }

    #[test]
    fn test_invalid_syntax_is_rejected() {
        let json = r#"[{ "id": "tryvannstua" "lat": 59.99, "long": 10.66 }]"#;
        assert!(matches!(read(json), Err(LocationFileError::Parse(_))));
    }

    #[test]
    fn test_empty_list_is_rejected() {
        assert!(matches!(read("[]"), Err(LocationFileError::Empty)));
    }

    #[test]
    fn test_blank_id_is_rejected() {
        let json = r#"[{ "id": "a", "lat": 1, "long": 1 }, { "id": "  ", "lat": 1, "long": 1 }]"#;
        assert!(matches!(read(json), Err(LocationFileError::BlankId { index: 1 })));
    }

    #[test]
    fn test_duplicate_id_is_rejected() {
        let json = r#"[{ "id": "a", "lat": 1, "long": 1 }, { "id": "a", "lat": 2, "long": 2 }]"#;
        match read(json) {
            Err(LocationFileError::DuplicateId(id)) => assert_eq!(id, "a"),
            other => panic!("expected duplicate id error, got {other:?}"),
        }
    }

    #[test]
    fn test_out_of_range_coordinates_are_rejected() {
        let json = r#"[{ "id": "mars", "lat": 123.0, "long": 1 }]"#;
        assert!(matches!(read(json), Err(LocationFileError::OutOfRange { .. })));
    }

    #[test]
    fn test_missing_file_reports_path() {
        let err = load_locations("no/such/locations.json").unwrap_err();
        assert!(err.to_string().contains("no/such/locations.json"));
    }
}
