use crate::constants::{PROGRESS_INTERVAL, QUOTE, TAB};
use crate::types::{HeaderField, HeaderMap, InputRecord, SequenceGenerator};
use tracing::{info, warn};

/// Drop a trailing carriage return left over from CRLF files.
pub fn strip_line_ending(line: &str) -> &str {
    line.strip_suffix('\r').unwrap_or(line)
}

/// Trim a raw cell and remove one layer of surrounding double quotes.
pub fn clean_field(raw: &str) -> String {
    let trimmed = raw.trim();
    let unquoted = trimmed
        .strip_prefix(QUOTE)
        .and_then(|rest| rest.strip_suffix(QUOTE))
        .unwrap_or(trimmed);
    unquoted.trim().to_string()
}

/// Index-safe lookup of a recognized field. Unmapped fields are empty; a
/// mapped index past the end of the line is empty too, with a warning.
fn field_value(fields: &[String], headers: &HeaderMap, field: HeaderField) -> String {
    let Some(index) = headers.get(field) else {
        return String::new();
    };
    match fields.get(index) {
        Some(value) => value.clone(),
        None => {
            warn!(
                "Tried to access an invalid index in the line! Index: {} | FieldCount: {}",
                index,
                fields.len()
            );
            String::new()
        }
    }
}

/// Organization name, else full name, else "first last".
fn decide_addressee(fields: &[String], headers: &HeaderMap) -> String {
    let organization = field_value(fields, headers, HeaderField::OrganizationName);
    if !organization.is_empty() {
        return organization;
    }

    let full = field_value(fields, headers, HeaderField::FullName);
    if !full.is_empty() {
        return full;
    }

    let first = field_value(fields, headers, HeaderField::FirstName);
    let last = field_value(fields, headers, HeaderField::LastName);
    format!("{} {}", first, last).trim().to_string()
}

impl InputRecord {
    /// Parse one data line. Takes the next number from `sequences`.
    pub fn parse(line: &str, headers: &HeaderMap, sequences: &mut SequenceGenerator) -> Self {
        let fields: Vec<String> = strip_line_ending(line)
            .split(TAB)
            .map(clean_field)
            .collect();

        let sequence = sequences.next_sequence();
        if sequence % PROGRESS_INTERVAL == 0 {
            info!("Parsed {} records", sequence);
        }

        let value = |field| field_value(&fields, headers, field);
        let record = InputRecord {
            sequence,
            input_id: value(HeaderField::Id),
            street: value(HeaderField::Street1),
            street2: value(HeaderField::Street2),
            city: value(HeaderField::City),
            state: value(HeaderField::State),
            zipcode: value(HeaderField::ZipCode),
            plus4: value(HeaderField::Plus4Code),
            urbanization: value(HeaderField::Urbanization),
            secondary: value(HeaderField::Secondary),
            lastline: value(HeaderField::LastLine),
            addressee: decide_addressee(&fields, headers),
            fields,
        };
        crate::metrics::pipeline::record_parsed();
        record
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::header::identify_headers;

    fn headers(names: &[&str]) -> HeaderMap {
        let columns: Vec<String> = names.iter().map(|s| s.to_string()).collect();
        identify_headers(&columns).unwrap()
    }

    #[test]
    fn test_clean_field_unwraps_one_layer_of_quotes() {
        assert_eq!(clean_field("  \"123 Main St\"  "), "123 Main St");
        assert_eq!(clean_field("\"\"quoted\"\""), "\"quoted\"");
        assert_eq!(clean_field("\"unbalanced"), "\"unbalanced");
        assert_eq!(clean_field("   "), "");
    }

    #[test]
    fn test_parse_extracts_recognized_fields() {
        let headers = headers(&["Id", "Street1", "City", "State", "ZipCode", "Phone"]);
        let mut sequences = SequenceGenerator::new();
        let record = InputRecord::parse(
            "42\t \"123 Main St\" \tAnytown\tCA\t90210\t555-1212\r",
            &headers,
            &mut sequences,
        );

        assert_eq!(record.sequence, 1);
        assert_eq!(record.input_id, "42");
        assert_eq!(record.street, "123 Main St");
        assert_eq!(record.city, "Anytown");
        assert_eq!(record.state, "CA");
        assert_eq!(record.zipcode, "90210");
        assert_eq!(record.lastline, "");
        assert_eq!(record.fields.len(), 6);
        assert_eq!(record.fields[5], "555-1212");
    }

    #[test]
    fn test_sequence_increases_per_record() {
        let headers = headers(&["Street1", "ZipCode"]);
        let mut sequences = SequenceGenerator::new();
        let first = InputRecord::parse("1 A St\t11111", &headers, &mut sequences);
        let second = InputRecord::parse("2 B St\t22222", &headers, &mut sequences);
        assert_eq!((first.sequence, second.sequence), (1, 2));
    }

    #[test]
    fn test_short_line_yields_empty_values() {
        let headers = headers(&["Street1", "ZipCode", "Urbanization"]);
        let mut sequences = SequenceGenerator::new();
        let record = InputRecord::parse("1 A St", &headers, &mut sequences);
        assert_eq!(record.street, "1 A St");
        assert_eq!(record.zipcode, "");
        assert_eq!(record.urbanization, "");
    }

    #[test]
    fn test_addressee_priority() {
        let headers = headers(&[
            "Street1",
            "ZipCode",
            "OrganizationName",
            "FullName",
            "FirstName",
            "LastName",
        ]);
        let mut sequences = SequenceGenerator::new();

        let org = InputRecord::parse("s\tz\tAcme\tJane Doe\tJane\tDoe", &headers, &mut sequences);
        assert_eq!(org.addressee, "Acme");

        let full = InputRecord::parse("s\tz\t\tJane Doe\tJ\tD", &headers, &mut sequences);
        assert_eq!(full.addressee, "Jane Doe");

        let split = InputRecord::parse("s\tz\t\t\tJane\tDoe", &headers, &mut sequences);
        assert_eq!(split.addressee, "Jane Doe");

        let last_only = InputRecord::parse("s\tz\t\t\t\tDoe", &headers, &mut sequences);
        assert_eq!(last_only.addressee, "Doe");

        let none = InputRecord::parse("s\tz\t\t\t\t", &headers, &mut sequences);
        assert_eq!(none.addressee, "");
    }
}
