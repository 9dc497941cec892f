use std::collections::HashMap;

/// Input columns the pipeline understands. Any other column is carried
/// through to the output untouched but never sent to the service.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HeaderField {
    Id,
    FullName,
    FirstName,
    LastName,
    OrganizationName,
    Street1,
    Street2,
    Secondary,
    City,
    State,
    ZipCode,
    /// City, state and ZIP code in a single column
    LastLine,
    Plus4Code,
    Urbanization,
}

impl HeaderField {
    pub const ALL: [HeaderField; 14] = [
        HeaderField::Id,
        HeaderField::FullName,
        HeaderField::FirstName,
        HeaderField::LastName,
        HeaderField::OrganizationName,
        HeaderField::Street1,
        HeaderField::Street2,
        HeaderField::Secondary,
        HeaderField::City,
        HeaderField::State,
        HeaderField::ZipCode,
        HeaderField::LastLine,
        HeaderField::Plus4Code,
        HeaderField::Urbanization,
    ];

    /// Column name as it is documented for list authors.
    pub fn column_name(&self) -> &'static str {
        match self {
            HeaderField::Id => "Id",
            HeaderField::FullName => "FullName",
            HeaderField::FirstName => "FirstName",
            HeaderField::LastName => "LastName",
            HeaderField::OrganizationName => "OrganizationName",
            HeaderField::Street1 => "Street1",
            HeaderField::Street2 => "Street2",
            HeaderField::Secondary => "Secondary",
            HeaderField::City => "City",
            HeaderField::State => "State",
            HeaderField::ZipCode => "ZipCode",
            HeaderField::LastLine => "CityStateZipCode",
            HeaderField::Plus4Code => "Plus4Code",
            HeaderField::Urbanization => "Urbanization",
        }
    }

    /// Case-insensitive match of a raw header cell.
    pub fn from_column(raw: &str) -> Option<Self> {
        let name = raw.trim();
        Self::ALL
            .iter()
            .copied()
            .find(|field| field.column_name().eq_ignore_ascii_case(name))
    }
}

/// Recognized field → column index, built once from a validated header row.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HeaderMap {
    indices: HashMap<HeaderField, usize>,
}

impl HeaderMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, field: HeaderField, index: usize) {
        self.indices.insert(field, index);
    }

    pub fn get(&self, field: HeaderField) -> Option<usize> {
        self.indices.get(&field).copied()
    }

    pub fn contains(&self, field: HeaderField) -> bool {
        self.indices.contains_key(&field)
    }

    pub fn len(&self) -> usize {
        self.indices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.indices.is_empty()
    }
}

/// Hands out record sequence numbers, starting at 1, once per parsed line.
#[derive(Debug)]
pub struct SequenceGenerator {
    next: u64,
}

impl Default for SequenceGenerator {
    fn default() -> Self {
        Self::new()
    }
}

impl SequenceGenerator {
    pub fn new() -> Self {
        Self { next: 1 }
    }

    pub fn next_sequence(&mut self) -> u64 {
        let sequence = self.next;
        self.next += 1;
        sequence
    }

    /// How many sequence numbers have been handed out so far
    pub fn issued(&self) -> u64 {
        self.next - 1
    }
}

/// One data line of the input list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InputRecord {
    pub sequence: u64,
    /// Every column of the line, trimmed and quote-unwrapped, in file order
    pub fields: Vec<String>,
    pub input_id: String,
    pub street: String,
    pub street2: String,
    pub city: String,
    pub state: String,
    pub zipcode: String,
    pub plus4: String,
    pub urbanization: String,
    pub secondary: String,
    pub lastline: String,
    pub addressee: String,
}
