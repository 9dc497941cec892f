use crate::constants::{OUTPUT_PREFIX_COLUMNS, OUTPUT_TRAILER_COLUMNS, TAB};
use crate::error::Result;
use crate::pipeline::merge::OutputRecord;
use std::io::Write;

/// Header row: prefix columns, the input columns in brackets, then the
/// computed columns.
pub fn header_row(input_columns: &[String]) -> String {
    let bracketed = input_columns.iter().map(|column| format!("[{}]", column));
    OUTPUT_PREFIX_COLUMNS
        .iter()
        .map(|s| s.to_string())
        .chain(bracketed)
        .chain(OUTPUT_TRAILER_COLUMNS.iter().map(|s| s.to_string()))
        .collect::<Vec<_>>()
        .join(&TAB.to_string())
}

pub fn render_row(record: &OutputRecord) -> String {
    let sequence = record.sequence().to_string();
    let prefix = [
        sequence.as_str(),
        record.duplicate.as_str(),
        record.verified.deliverable.as_str(),
    ];
    prefix
        .into_iter()
        .chain(record.input.fields.iter().map(String::as_str))
        .chain(record.verified.columns())
        .collect::<Vec<_>>()
        .join(&TAB.to_string())
}

/// Append-only writer for the augmented list.
pub struct OutputWriter<W: Write> {
    inner: W,
    header_written: bool,
    rows_written: u64,
}

impl<W: Write> OutputWriter<W> {
    pub fn new(inner: W) -> Self {
        Self {
            inner,
            header_written: false,
            rows_written: 0,
        }
    }

    /// Writes the header row. Only the first call has any effect.
    pub fn write_header(&mut self, input_columns: &[String]) -> Result<()> {
        if self.header_written {
            return Ok(());
        }
        writeln!(self.inner, "{}", header_row(input_columns))?;
        self.header_written = true;
        Ok(())
    }

    pub fn write_record(&mut self, record: &OutputRecord) -> Result<()> {
        writeln!(self.inner, "{}", render_row(record))?;
        self.rows_written += 1;
        Ok(())
    }

    pub fn flush(&mut self) -> Result<()> {
        self.inner.flush()?;
        Ok(())
    }

    pub fn rows_written(&self) -> u64 {
        self.rows_written
    }

    pub fn into_inner(self) -> W {
        self.inner
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::merge::VerifiedAddress;
    use crate::types::InputRecord;

    fn output_record() -> OutputRecord {
        let input = InputRecord {
            sequence: 7,
            fields: vec!["123 Main St".to_string(), "90210".to_string()],
            input_id: String::new(),
            street: "123 Main St".to_string(),
            street2: String::new(),
            city: String::new(),
            state: String::new(),
            zipcode: "90210".to_string(),
            plus4: String::new(),
            urbanization: String::new(),
            secondary: String::new(),
            lastline: String::new(),
            addressee: String::new(),
        };
        let mut record = OutputRecord::unverified(input);
        record.duplicate = "Y".to_string();
        record.verified = VerifiedAddress {
            deliverable: "Y".to_string(),
            firm_name: "Acme".to_string(),
            precision: "Zip9".to_string(),
            ..VerifiedAddress::default()
        };
        record
    }

    #[test]
    fn test_header_row_layout() {
        let header = header_row(&["Street1".to_string(), "ZipCode".to_string()]);
        let columns: Vec<&str> = header.split('\t').collect();
        assert_eq!(columns.len(), 3 + 2 + 41);
        assert_eq!(&columns[..6], &["Sequence", "Duplicate", "Deliverable", "[Street1]", "[ZipCode]", "FirmName"]);
        assert_eq!(columns.last(), Some(&"Precision"));
    }

    #[test]
    fn test_row_layout_matches_header() {
        let row = render_row(&output_record());
        let cells: Vec<&str> = row.split('\t').collect();
        assert_eq!(cells.len(), 3 + 2 + 41);
        assert_eq!(&cells[..6], &["7", "Y", "Y", "123 Main St", "90210", "Acme"]);
        assert_eq!(cells.last(), Some(&"Zip9"));
    }

    #[test]
    fn test_header_written_once() {
        let mut writer = OutputWriter::new(Vec::new());
        let columns = vec!["Street1".to_string()];
        writer.write_header(&columns).unwrap();
        writer.write_header(&columns).unwrap();
        writer.write_record(&output_record()).unwrap();
        writer.flush().unwrap();

        assert_eq!(writer.rows_written(), 1);
        let text = String::from_utf8(writer.into_inner()).unwrap();
        assert_eq!(text.lines().count(), 2);
        assert!(text.starts_with("Sequence\t"));
        assert!(text.ends_with('\n'));
    }
}
