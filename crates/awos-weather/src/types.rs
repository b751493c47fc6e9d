use serde::{Deserialize, Serialize};

/// Expected JSON shape of the airport endpoint response, pinned per
/// deployment at client construction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ResponseShape {
    /// The body is a single airport object
    #[default]
    Object,
    /// The body is an array of airport objects; the first entry wins
    Array,
}

/// A single runway at an airport
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Runway {
    pub ident: String,
    #[serde(default)]
    pub heading_deg: Option<u16>,
    #[serde(default)]
    pub length_ft: Option<u32>,
    #[serde(default)]
    pub surface: Option<String>,
}

/// Airport metadata as served by the airport endpoint.
///
/// Fields beyond the identifier are optional; deployments differ in how
/// much they populate.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AirportRecord {
    pub icao: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub city: Option<String>,
    #[serde(default)]
    pub country: Option<String>,
    #[serde(default)]
    pub elevation_ft: Option<i32>,
    #[serde(default)]
    pub latitude: Option<f64>,
    #[serde(default)]
    pub longitude: Option<f64>,
    #[serde(default)]
    pub runways: Vec<Runway>,
}

impl AirportRecord {
    /// Display name for the UI, falling back to the identifier.
    pub fn display_name(&self) -> &str {
        self.name.as_deref().unwrap_or(&self.icao)
    }

    /// Look up a runway by its identifier (e.g. "09L").
    pub fn runway(&self, ident: &str) -> Option<&Runway> {
        self.runways.iter().find(|r| r.ident == ident)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_full_record_deserializes() {
        let record: AirportRecord = serde_json::from_str(
            r#"{
                "icao": "EGHI",
                "name": "Southampton",
                "city": "Southampton",
                "country": "GB",
                "elevation_ft": 44,
                "latitude": 50.95,
                "longitude": -1.3568,
                "runways": [
                    {"ident": "02", "heading_deg": 23, "length_ft": 5653, "surface": "asphalt"},
                    {"ident": "20", "heading_deg": 203, "length_ft": 5653, "surface": "asphalt"}
                ]
            }"#,
        )
        .unwrap();

        assert_eq!(record.icao, "EGHI");
        assert_eq!(record.display_name(), "Southampton");
        assert_eq!(record.runways.len(), 2);
        assert_eq!(record.runway("20").unwrap().heading_deg, Some(203));
        assert!(record.runway("27").is_none());
    }

    #[test]
    fn test_minimal_record_deserializes() {
        let record: AirportRecord = serde_json::from_str(r#"{"icao": "KJFK"}"#).unwrap();
        assert_eq!(record.icao, "KJFK");
        assert!(record.name.is_none());
        assert!(record.runways.is_empty());
        assert_eq!(record.display_name(), "KJFK");
    }

    #[test]
    fn test_missing_icao_is_an_error() {
        let result = serde_json::from_str::<AirportRecord>(r#"{"name": "Nowhere"}"#);
        assert!(result.is_err());
    }
}
