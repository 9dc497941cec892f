//! JSON shapes exchanged with the verification service.

use crate::constants::{UNKNOWN_LASTLINE, UNKNOWN_STREET};
use crate::types::InputRecord;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

/// One address in a request body. Blank fields are never serialized.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct WireAddress {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub input_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub street: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub street2: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub city: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub state: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub zipcode: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub plus4: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub urbanization: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub secondary: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub lastline: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub addressee: Option<String>,
}

fn present(value: &str) -> Option<String> {
    if value.trim().is_empty() {
        None
    } else {
        Some(value.to_string())
    }
}

impl WireAddress {
    /// Build the request object for a record, substituting placeholders for
    /// a missing street or a missing last line so the service does not reject
    /// the address outright.
    pub fn sanitize(record: &InputRecord) -> Self {
        let street = present(&record.street).or_else(|| Some(UNKNOWN_STREET.to_string()));

        let no_lastline_parts = [
            &record.zipcode,
            &record.city,
            &record.state,
            &record.lastline,
        ]
        .iter()
        .all(|value| value.trim().is_empty());
        let lastline = if no_lastline_parts {
            Some(UNKNOWN_LASTLINE.to_string())
        } else {
            present(&record.lastline)
        };

        WireAddress {
            input_id: present(&record.input_id),
            street,
            street2: present(&record.street2),
            city: present(&record.city),
            state: present(&record.state),
            zipcode: present(&record.zipcode),
            plus4: present(&record.plus4),
            urbanization: present(&record.urbanization),
            secondary: present(&record.secondary),
            lastline,
            addressee: present(&record.addressee),
        }
    }
}

pub fn sanitize_batch(batch: &[InputRecord]) -> Vec<WireAddress> {
    batch.iter().map(WireAddress::sanitize).collect()
}

/// Accept any JSON scalar as text. The service mixes strings, numbers and
/// booleans across these fields.
fn lenient_string<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(match value {
        None | Some(Value::Null) => None,
        Some(Value::String(s)) => Some(s),
        Some(Value::Bool(b)) => Some(b.to_string()),
        Some(Value::Number(n)) => Some(n.to_string()),
        Some(other) => Some(other.to_string()),
    })
}

/// One verified address from a response body.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Candidate {
    pub input_index: usize,
    #[serde(default, deserialize_with = "lenient_string")]
    pub input_id: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub addressee: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub delivery_line_1: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub delivery_line_2: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub delivery_point_barcode: Option<String>,
    #[serde(default)]
    pub components: Option<Components>,
    #[serde(default)]
    pub metadata: Option<Metadata>,
    #[serde(default)]
    pub analysis: Option<Analysis>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Components {
    #[serde(default, deserialize_with = "lenient_string")]
    pub urbanization: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub city_name: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub state_abbreviation: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub zipcode: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub plus4_code: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub pmb_designator: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub pmb_number: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub delivery_point: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub delivery_point_check_digit: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Metadata {
    #[serde(default, deserialize_with = "lenient_string")]
    pub record_type: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub zip_type: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub county_fips: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub county_name: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub carrier_route: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub congressional_district: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub building_default_indicator: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub rdi: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub elot_sequence: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub elot_sort: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub latitude: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub longitude: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub precision: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub time_zone: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub utc_offset: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub dst: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Analysis {
    #[serde(default, deserialize_with = "lenient_string")]
    pub dpv_match_code: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub dpv_footnotes: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub dpv_cmra: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub dpv_vacant: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub active: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub ews_match: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub footnotes: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub lacslink_code: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub lacslink_indicator: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub suitelink_match: Option<String>,
}

pub fn parse_candidates(body: &[u8]) -> serde_json::Result<Vec<Candidate>> {
    serde_json::from_slice(body)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn record() -> InputRecord {
        InputRecord {
            sequence: 1,
            fields: vec![],
            input_id: String::new(),
            street: "123 Main St".to_string(),
            street2: String::new(),
            city: "Anytown".to_string(),
            state: "CA".to_string(),
            zipcode: String::new(),
            plus4: String::new(),
            urbanization: String::new(),
            secondary: String::new(),
            lastline: String::new(),
            addressee: String::new(),
        }
    }

    #[test]
    fn test_blank_fields_are_omitted() {
        let wire = WireAddress::sanitize(&record());
        let value = serde_json::to_value(&wire).unwrap();
        assert_eq!(
            value,
            json!({"street": "123 Main St", "city": "Anytown", "state": "CA"})
        );
    }

    #[test]
    fn test_missing_street_gets_placeholder() {
        let mut input = record();
        input.street = "   ".to_string();
        let wire = WireAddress::sanitize(&input);
        assert_eq!(wire.street.as_deref(), Some(UNKNOWN_STREET));
    }

    #[test]
    fn test_missing_lastline_parts_get_placeholder() {
        let mut input = record();
        input.city.clear();
        input.state.clear();
        let wire = WireAddress::sanitize(&input);
        assert_eq!(wire.lastline.as_deref(), Some(UNKNOWN_LASTLINE));

        // any one of the four is enough to skip the placeholder
        input.zipcode = "90210".to_string();
        let wire = WireAddress::sanitize(&input);
        assert_eq!(wire.lastline, None);
    }

    #[test]
    fn test_sanitize_does_not_touch_the_record() {
        let mut input = record();
        input.street.clear();
        let before = input.clone();
        let _ = sanitize_batch(std::slice::from_ref(&input));
        assert_eq!(input, before);
    }

    #[test]
    fn test_candidates_accept_mixed_scalar_types() {
        let body = json!([{
            "input_index": 0,
            "delivery_line_1": "123 Main St",
            "analysis": {"dpv_match_code": "Y", "ews_match": false},
            "metadata": {"latitude": 34.0901, "utc_offset": -8, "dst": true, "rdi": null},
            "components": null
        }])
        .to_string();

        let candidates = parse_candidates(body.as_bytes()).unwrap();
        assert_eq!(candidates.len(), 1);
        let candidate = &candidates[0];
        assert_eq!(candidate.input_index, 0);
        assert!(candidate.components.is_none());
        let metadata = candidate.metadata.as_ref().unwrap();
        assert_eq!(metadata.latitude.as_deref(), Some("34.0901"));
        assert_eq!(metadata.utc_offset.as_deref(), Some("-8"));
        assert_eq!(metadata.dst.as_deref(), Some("true"));
        assert_eq!(metadata.rdi, None);
        let analysis = candidate.analysis.as_ref().unwrap();
        assert_eq!(analysis.ews_match.as_deref(), Some("false"));
    }

    #[test]
    fn test_candidates_reject_non_array_body() {
        assert!(parse_candidates(b"{\"message\": \"nope\"}").is_err());
    }
}
