/// Shared literals for the list format, the wire protocol and the output layout.

pub const TAB: char = '\t';
pub const QUOTE: char = '"';

/// The verification service accepts at most this many addresses per request.
pub const MAX_BATCH_SIZE: usize = 100;

/// Emit a progress line every this many parsed records
pub const PROGRESS_INTERVAL: u64 = 1000;

pub const DEFAULT_API_URL: &str = "https://api.smartystreets.com/street-address";

// Request header asking the service to return addresses that fail
// delivery point validation instead of omitting them.
pub const INCLUDE_INVALID_HEADER: &str = "x-include-invalid";

pub const AUTH_ID_PARAM: &str = "auth-id";
pub const AUTH_TOKEN_PARAM: &str = "auth-token";

// Placeholders substituted for missing required fields. The service echoes
// them back (sometimes re-cased), so the merger must recognize both forms.
pub const UNKNOWN_STREET: &str = "<unknown_street>";
pub const UNKNOWN_LASTLINE: &str = "<lastline_unknown>";
pub const UNKNOWN_LASTLINE_ECHO: &str = "Lastline Unknown";

/// Joins the resolved-address fields into the duplicate key.
pub const DEDUP_DELIMITER: char = '\u{1f}';

/// Delivery point match codes the service considers confirmed.
pub const DELIVERABLE_MATCH_CODES: [&str; 3] = ["Y", "S", "D"];

/// Leading columns of every output row.
pub const OUTPUT_PREFIX_COLUMNS: [&str; 3] = ["Sequence", "Duplicate", "Deliverable"];

/// Computed columns appended after the echoed input columns.
pub const OUTPUT_TRAILER_COLUMNS: [&str; 41] = [
    "FirmName",
    "DeliveryLine1",
    "DeliveryLine2",
    "Urbanization",
    "City",
    "State",
    "FullZIPCode",
    "ZIPCode",
    "AddonCode",
    "PMBUnit",
    "PMBNumber",
    "ProcessFlag",
    "Footnotes",
    "EWS",
    "CountyFips",
    "CountyName",
    "DPVCode",
    "DPVFootnotes",
    "CMRA",
    "Vacant",
    "Active",
    "DefaultFlag",
    "LACSLinkCode",
    "LACSLinkInd",
    "DeliveryPoint",
    "CheckDigit",
    "DeliveryPointBarcode",
    "CarrierRoute",
    "RecordType",
    "ZIPType",
    "CongressionalDistrict",
    "RDI",
    "ELotSequence",
    "ELotSort",
    "SuiteLinkMatch",
    "TimeZone",
    "UTCOffset",
    "DST",
    "Latitude",
    "Longitude",
    "Precision",
];
