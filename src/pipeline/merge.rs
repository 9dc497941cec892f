//! Reconciles a verification response with the batch that produced it.

use crate::constants::{
    DELIVERABLE_MATCH_CODES, UNKNOWN_LASTLINE, UNKNOWN_LASTLINE_ECHO, UNKNOWN_STREET,
};
use crate::error::{ListError, Result};
use crate::pipeline::wire::{Analysis, Candidate, Components, Metadata};
use crate::types::InputRecord;

/// Verification-derived columns of one output row. `Default` is the state of
/// a record the service returned nothing for: every column empty.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct VerifiedAddress {
    pub deliverable: String,
    pub firm_name: String,
    pub delivery_line_1: String,
    pub delivery_line_2: String,
    pub urbanization: String,
    pub city: String,
    pub state: String,
    pub full_zip_code: String,
    pub zip_code: String,
    pub plus4: String,
    pub pmb_unit: String,
    pub pmb_number: String,
    pub process_flag: String,
    pub footnotes: String,
    pub ews: String,
    pub county_fips: String,
    pub county_name: String,
    pub dpv_code: String,
    pub dpv_footnotes: String,
    pub cmra: String,
    pub vacant: String,
    pub active: String,
    pub default_flag: String,
    pub lacs_link_code: String,
    pub lacs_link_indicator: String,
    pub delivery_point: String,
    pub check_digit: String,
    pub delivery_point_barcode: String,
    pub carrier_route: String,
    pub record_type: String,
    pub zip_type: String,
    pub congressional_district: String,
    pub rdi: String,
    pub elot_sequence: String,
    pub elot_sort: String,
    pub suite_link_match: String,
    pub time_zone: String,
    pub utc_offset: String,
    pub dst: String,
    pub latitude: String,
    pub longitude: String,
    pub precision: String,
}

fn or_empty(value: &Option<String>) -> String {
    value.clone().unwrap_or_default()
}

fn or_default(value: &Option<String>, default: &str) -> String {
    match value {
        Some(v) if !v.is_empty() => v.clone(),
        _ => default.to_string(),
    }
}

/// Truthiness of a scalar rendered as text: empty, `false` and zero are false.
fn is_truthy(value: &Option<String>) -> bool {
    match value.as_deref() {
        None | Some("") | Some("false") => false,
        Some(v) => v.parse::<f64>().map(|n| n != 0.0).unwrap_or(true),
    }
}

fn flag(value: &Option<String>) -> String {
    if is_truthy(value) {
        "Y".to_string()
    } else {
        String::new()
    }
}

fn numeric_or_zero(value: &Option<String>) -> String {
    if is_truthy(value) {
        or_empty(value)
    } else {
        "0".to_string()
    }
}

/// Integer rendering of an offset such as `-5`, `-5.0` or `"-5"`.
fn integer_string(value: &Option<String>) -> String {
    value
        .as_deref()
        .and_then(|v| v.trim().parse::<f64>().ok())
        .filter(|n| n.is_finite())
        .map(|n| (n.trunc() as i64).to_string())
        .unwrap_or_else(|| "0".to_string())
}

impl VerifiedAddress {
    pub fn from_candidate(candidate: &Candidate) -> Self {
        let default_analysis = Analysis::default();
        let default_components = Components::default();
        let default_metadata = Metadata::default();
        let analysis = candidate.analysis.as_ref().unwrap_or(&default_analysis);
        let components = candidate.components.as_ref().unwrap_or(&default_components);
        let metadata = candidate.metadata.as_ref().unwrap_or(&default_metadata);

        let match_code = analysis.dpv_match_code.as_deref();
        let deliverable = match_code.is_some_and(|code| DELIVERABLE_MATCH_CODES.contains(&code))
            && analysis.dpv_vacant.as_deref() == Some("N")
            && analysis.active.as_deref() == Some("Y");

        let mut city = or_empty(&components.city_name);
        if city.eq_ignore_ascii_case(UNKNOWN_LASTLINE_ECHO) || city.eq_ignore_ascii_case(UNKNOWN_LASTLINE)
        {
            city.clear();
        }

        let mut delivery_line_1 = or_empty(&candidate.delivery_line_1);
        if delivery_line_1.eq_ignore_ascii_case(UNKNOWN_STREET) {
            delivery_line_1.clear();
        }

        let full_zip_code = match (&components.zipcode, &components.plus4_code) {
            (Some(zip), Some(plus4)) => format!("{}-{}", zip, plus4),
            _ => or_empty(&components.zipcode),
        };

        VerifiedAddress {
            deliverable: if deliverable { "Y".to_string() } else { String::new() },
            firm_name: or_empty(&candidate.addressee),
            delivery_line_1,
            delivery_line_2: or_empty(&candidate.delivery_line_2),
            urbanization: or_empty(&components.urbanization),
            city,
            state: or_empty(&components.state_abbreviation),
            full_zip_code,
            zip_code: or_empty(&components.zipcode),
            plus4: or_empty(&components.plus4_code),
            pmb_unit: or_empty(&components.pmb_designator),
            pmb_number: or_empty(&components.pmb_number),
            process_flag: if match_code.is_some_and(|code| !code.is_empty()) {
                "P".to_string()
            } else {
                "F".to_string()
            },
            footnotes: or_empty(&analysis.footnotes),
            ews: flag(&analysis.ews_match),
            county_fips: or_empty(&metadata.county_fips),
            county_name: or_empty(&metadata.county_name),
            dpv_code: or_empty(&analysis.dpv_match_code),
            dpv_footnotes: or_empty(&analysis.dpv_footnotes),
            cmra: or_empty(&analysis.dpv_cmra),
            vacant: or_empty(&analysis.dpv_vacant),
            active: or_empty(&analysis.active),
            default_flag: or_empty(&metadata.building_default_indicator),
            lacs_link_code: or_empty(&analysis.lacslink_code),
            lacs_link_indicator: or_empty(&analysis.lacslink_indicator),
            delivery_point: or_empty(&components.delivery_point),
            check_digit: or_empty(&components.delivery_point_check_digit),
            delivery_point_barcode: format!("/{}/", or_empty(&candidate.delivery_point_barcode)),
            carrier_route: or_empty(&metadata.carrier_route),
            record_type: or_empty(&metadata.record_type),
            zip_type: or_empty(&metadata.zip_type),
            congressional_district: or_empty(&metadata.congressional_district),
            rdi: or_default(&metadata.rdi, "None"),
            elot_sequence: or_empty(&metadata.elot_sequence),
            elot_sort: or_empty(&metadata.elot_sort),
            suite_link_match: flag(&analysis.suitelink_match),
            time_zone: or_empty(&metadata.time_zone),
            utc_offset: integer_string(&metadata.utc_offset),
            dst: flag(&metadata.dst),
            latitude: numeric_or_zero(&metadata.latitude),
            longitude: numeric_or_zero(&metadata.longitude),
            precision: or_empty(&metadata.precision),
        }
    }

    /// Computed columns in output order.
    pub fn columns(&self) -> [&str; 41] {
        [
            self.firm_name.as_str(),
            self.delivery_line_1.as_str(),
            self.delivery_line_2.as_str(),
            self.urbanization.as_str(),
            self.city.as_str(),
            self.state.as_str(),
            self.full_zip_code.as_str(),
            self.zip_code.as_str(),
            self.plus4.as_str(),
            self.pmb_unit.as_str(),
            self.pmb_number.as_str(),
            self.process_flag.as_str(),
            self.footnotes.as_str(),
            self.ews.as_str(),
            self.county_fips.as_str(),
            self.county_name.as_str(),
            self.dpv_code.as_str(),
            self.dpv_footnotes.as_str(),
            self.cmra.as_str(),
            self.vacant.as_str(),
            self.active.as_str(),
            self.default_flag.as_str(),
            self.lacs_link_code.as_str(),
            self.lacs_link_indicator.as_str(),
            self.delivery_point.as_str(),
            self.check_digit.as_str(),
            self.delivery_point_barcode.as_str(),
            self.carrier_route.as_str(),
            self.record_type.as_str(),
            self.zip_type.as_str(),
            self.congressional_district.as_str(),
            self.rdi.as_str(),
            self.elot_sequence.as_str(),
            self.elot_sort.as_str(),
            self.suite_link_match.as_str(),
            self.time_zone.as_str(),
            self.utc_offset.as_str(),
            self.dst.as_str(),
            self.latitude.as_str(),
            self.longitude.as_str(),
            self.precision.as_str(),
        ]
    }
}

/// Which of the classic list-processing buckets a row falls into.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Disposition {
    Mailable,
    Rejected,
    Duplicate,
}

/// A record ready for de-duplication and writing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputRecord {
    pub input: InputRecord,
    pub duplicate: String,
    pub verified: VerifiedAddress,
}

impl OutputRecord {
    pub fn unverified(input: InputRecord) -> Self {
        Self {
            input,
            duplicate: String::new(),
            verified: VerifiedAddress::default(),
        }
    }

    pub fn sequence(&self) -> u64 {
        self.input.sequence
    }

    pub fn is_duplicate(&self) -> bool {
        self.duplicate == "Y"
    }

    pub fn is_deliverable(&self) -> bool {
        self.verified.deliverable == "Y"
    }

    pub fn disposition(&self) -> Disposition {
        if self.is_duplicate() {
            Disposition::Duplicate
        } else if self.is_deliverable() {
            Disposition::Mailable
        } else {
            Disposition::Rejected
        }
    }
}

/// One output record per batch record, in batch order. Candidates are matched
/// by `input_index`; an index outside the batch means the response does not
/// belong to this request.
pub fn merge_batch(batch: &[InputRecord], candidates: Vec<Candidate>) -> Result<Vec<OutputRecord>> {
    let mut merged: Vec<OutputRecord> = batch.iter().cloned().map(OutputRecord::unverified).collect();

    for candidate in candidates {
        let index = candidate.input_index;
        let record = merged.get_mut(index).ok_or_else(|| {
            ListError::MalformedResponse(format!(
                "input_index {} is outside a batch of {} records",
                index,
                batch.len()
            ))
        })?;
        record.verified = VerifiedAddress::from_candidate(&candidate);
    }

    Ok(merged)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::wire::parse_candidates;
    use serde_json::json;

    fn input(sequence: u64) -> InputRecord {
        InputRecord {
            sequence,
            fields: vec![format!("{} Main St", sequence)],
            input_id: String::new(),
            street: format!("{} Main St", sequence),
            street2: String::new(),
            city: String::new(),
            state: String::new(),
            zipcode: "90210".to_string(),
            plus4: String::new(),
            urbanization: String::new(),
            secondary: String::new(),
            lastline: String::new(),
            addressee: String::new(),
        }
    }

    fn candidate(value: serde_json::Value) -> Candidate {
        let body = json!([value]).to_string();
        parse_candidates(body.as_bytes()).unwrap().remove(0)
    }

    #[test]
    fn test_full_candidate() {
        let verified = VerifiedAddress::from_candidate(&candidate(json!({
            "input_index": 0,
            "addressee": "Acme",
            "delivery_line_1": "123 Main St",
            "delivery_point_barcode": "902101234990",
            "components": {
                "city_name": "Beverly Hills",
                "state_abbreviation": "CA",
                "zipcode": "90210",
                "plus4_code": "1234"
            },
            "metadata": {
                "rdi": "Residential",
                "utc_offset": -8.0,
                "dst": true,
                "latitude": 34.09,
                "longitude": -118.41
            },
            "analysis": {
                "dpv_match_code": "Y",
                "dpv_vacant": "N",
                "active": "Y",
                "ews_match": false,
                "suitelink_match": true
            }
        })));

        assert_eq!(verified.deliverable, "Y");
        assert_eq!(verified.firm_name, "Acme");
        assert_eq!(verified.city, "Beverly Hills");
        assert_eq!(verified.full_zip_code, "90210-1234");
        assert_eq!(verified.zip_code, "90210");
        assert_eq!(verified.plus4, "1234");
        assert_eq!(verified.process_flag, "P");
        assert_eq!(verified.rdi, "Residential");
        assert_eq!(verified.utc_offset, "-8");
        assert_eq!(verified.dst, "Y");
        assert_eq!(verified.ews, "");
        assert_eq!(verified.suite_link_match, "Y");
        assert_eq!(verified.latitude, "34.09");
        assert_eq!(verified.longitude, "-118.41");
        assert_eq!(verified.delivery_point_barcode, "/902101234990/");
    }

    #[test]
    fn test_sparse_candidate_defaults() {
        let verified = VerifiedAddress::from_candidate(&candidate(json!({"input_index": 0})));
        assert_eq!(verified.deliverable, "");
        assert_eq!(verified.process_flag, "F");
        assert_eq!(verified.rdi, "None");
        assert_eq!(verified.utc_offset, "0");
        assert_eq!(verified.latitude, "0");
        assert_eq!(verified.full_zip_code, "");
        assert_eq!(verified.delivery_point_barcode, "//");
        assert_eq!(verified.city, "");
    }

    #[test]
    fn test_deliverable_requires_all_three_conditions() {
        let base = |code: &str, vacant: &str, active: &str| {
            VerifiedAddress::from_candidate(&candidate(json!({
                "input_index": 0,
                "analysis": {"dpv_match_code": code, "dpv_vacant": vacant, "active": active}
            })))
            .deliverable
        };
        assert_eq!(base("S", "N", "Y"), "Y");
        assert_eq!(base("D", "N", "Y"), "Y");
        assert_eq!(base("N", "N", "Y"), "");
        assert_eq!(base("Y", "Y", "Y"), "");
        assert_eq!(base("Y", "N", "N"), "");
    }

    #[test]
    fn test_placeholders_never_leak() {
        let verified = VerifiedAddress::from_candidate(&candidate(json!({
            "input_index": 0,
            "delivery_line_1": "<Unknown_Street>",
            "components": {"city_name": "Lastline Unknown"}
        })));
        assert_eq!(verified.delivery_line_1, "");
        assert_eq!(verified.city, "");
    }

    #[test]
    fn test_zip_without_plus4() {
        let verified = VerifiedAddress::from_candidate(&candidate(json!({
            "input_index": 0,
            "components": {"zipcode": "90210"}
        })));
        assert_eq!(verified.full_zip_code, "90210");
    }

    #[test]
    fn test_merge_matches_by_index_not_position() {
        let batch = vec![input(1), input(2), input(3)];
        let candidates = vec![
            candidate(json!({"input_index": 2, "delivery_line_1": "3 Main St"})),
            candidate(json!({"input_index": 0, "delivery_line_1": "1 Main St"})),
        ];

        let merged = merge_batch(&batch, candidates).unwrap();
        assert_eq!(merged.len(), 3);
        assert_eq!(merged[0].sequence(), 1);
        assert_eq!(merged[0].verified.delivery_line_1, "1 Main St");
        assert_eq!(merged[1].verified, VerifiedAddress::default());
        assert_eq!(merged[2].verified.delivery_line_1, "3 Main St");
        assert!(merged.iter().all(|r| r.duplicate.is_empty()));
    }

    #[test]
    fn test_merge_rejects_out_of_range_index() {
        let batch = vec![input(1)];
        let err = merge_batch(&batch, vec![candidate(json!({"input_index": 1}))]).unwrap_err();
        assert!(matches!(err, ListError::MalformedResponse(_)));
    }

    #[test]
    fn test_disposition() {
        let mut record = OutputRecord::unverified(input(1));
        assert_eq!(record.disposition(), Disposition::Rejected);
        record.verified.deliverable = "Y".to_string();
        assert_eq!(record.disposition(), Disposition::Mailable);
        record.duplicate = "Y".to_string();
        assert_eq!(record.disposition(), Disposition::Duplicate);
    }
}
