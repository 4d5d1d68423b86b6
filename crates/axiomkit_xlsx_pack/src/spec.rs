//! Shared XLSX package specification models and error types.

use std::collections::BTreeMap;
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

use crate::conf::C_SHEET_NAME_DEFAULT;

////////////////////////////////////////////////////////////////////////////////
// #region Errors

/// Errors raised by the package content generator and its collaborators.
#[derive(Debug, thiserror::Error)]
pub enum XlsxPackError {
    /// Row width differs from the header width.
    #[error(
        "Malformed row at index {row_idx}: expected {width_expected} cells, got {width_actual}."
    )]
    MalformedRow {
        /// Zero-based row index within the dataset (header is 0).
        row_idx: usize,
        /// Header width.
        width_expected: usize,
        /// Offending row width.
        width_actual: usize,
    },

    /// Text value resolved against a table that never collected it.
    #[error("Shared string was never collected: {0:?}")]
    UnknownString(String),

    /// Invalid writer configuration.
    #[error("Invalid configuration: {0}")]
    Configuration(String),

    /// Dataset has no header row.
    #[error("Dataset must contain at least a header row.")]
    EmptyDataset,

    /// Numeric literal is not a finite number.
    #[error("Invalid numeric literal: {0:?}")]
    InvalidNumber(String),

    /// DataFrame access or IPC decoding failure.
    #[error("DataFrame conversion failed: {0}")]
    DataFrame(String),

    /// Archiver-specific failure.
    #[error("Archive failed: {0}")]
    Archive(String),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// ZIP archive error.
    #[error("ZIP archive: {0}")]
    Zip(#[from] zip::result::ZipError),
}

/// Convenience alias used throughout the crate.
pub type Result<T> = std::result::Result<T, XlsxPackError>;

// #endregion
////////////////////////////////////////////////////////////////////////////////
// #region CellModel

/// One immutable cell value.
///
/// `Number` keeps the caller's numeric literal verbatim so the serialized
/// payload never changes precision or formatting.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum EnumCell {
    /// Numeric literal.
    Number(String),
    /// Text value, stored once per package in the shared-strings table.
    Text(String),
}

impl EnumCell {
    /// Numeric cell from a finite `f64` (shortest round-trip formatting).
    pub fn number(value: f64) -> Result<Self> {
        if !value.is_finite() {
            return Err(XlsxPackError::InvalidNumber(value.to_string()));
        }
        Ok(Self::Number(value.to_string()))
    }

    /// Numeric cell from caller-formatted literal text, kept as-is.
    pub fn number_literal(literal: impl Into<String>) -> Result<Self> {
        let c_literal = literal.into();
        if !if_valid_number_literal(&c_literal) {
            return Err(XlsxPackError::InvalidNumber(c_literal));
        }
        Ok(Self::Number(c_literal))
    }

    /// Text cell.
    pub fn text(value: impl Into<String>) -> Self {
        Self::Text(value.into())
    }

    /// Return text payload when this is a text cell.
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(val) => Some(val),
            Self::Number(_) => None,
        }
    }
}

impl From<&str> for EnumCell {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

impl From<String> for EnumCell {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

/// Whether `literal` is a finite number with no surrounding whitespace.
pub fn if_valid_number_literal(literal: &str) -> bool {
    literal.trim() == literal && literal.parse::<f64>().is_ok_and(f64::is_finite)
}

/// One ordered row of cells.
pub type TypeRow = Vec<EnumCell>;

/// Caller-owned dataset; the first row is the header.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SpecDataset {
    /// All rows, header first.
    pub rows: Vec<TypeRow>,
}

impl SpecDataset {
    /// Wrap rows (header first).
    pub fn new(rows: Vec<TypeRow>) -> Self {
        Self { rows }
    }

    /// Header row, if any.
    pub fn header(&self) -> Option<&TypeRow> {
        self.rows.first()
    }

    /// Data rows (everything after the header).
    pub fn data_rows(&self) -> &[TypeRow] {
        self.rows.get(1..).unwrap_or(&[])
    }

    /// Number of data rows.
    pub fn height_data(&self) -> usize {
        self.data_rows().len()
    }
}

/// Serialized cell form: `t` attribute plus `<v>` payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpecCellPayload {
    /// Cell type tag (`"n"` or `"s"`).
    pub type_tag: &'static str,
    /// Literal number text or shared-string index.
    pub payload: String,
}

/// One finalized shared-string entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpecSharedStringEntry {
    /// Exact string value.
    pub value: String,
    /// Number of text cells carrying this value in the chunk.
    pub frequency: usize,
    /// Zero-based index referenced by `t="s"` cells.
    pub index: usize,
}

// #endregion
////////////////////////////////////////////////////////////////////////////////
// #region WriteOptions

/// What to do when the data rows exceed `row_limit`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum EnumExceedStrategy {
    /// One independent package file per chunk, numbered from 1.
    #[default]
    Files,
}

impl EnumExceedStrategy {
    /// Canonical configuration string.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Files => "files",
        }
    }
}

impl FromStr for EnumExceedStrategy {
    type Err = XlsxPackError;

    fn from_str(value: &str) -> Result<Self> {
        match value {
            "files" => Ok(Self::Files),
            _ => Err(XlsxPackError::Configuration(format!(
                "exceed_strategy must be one of: 'files'; got {value:?}."
            ))),
        }
    }
}

impl fmt::Display for EnumExceedStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Replacement text for values that have no valid cell form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpecXlsxValuePolicy {
    /// Replacement text for missing value.
    pub missing_value_str: String,
    /// Replacement text for NaN.
    pub nan_str: String,
    /// Replacement text for positive infinity.
    pub posinf_str: String,
    /// Replacement text for negative infinity.
    pub neginf_str: String,
}

impl Default for SpecXlsxValuePolicy {
    fn default() -> Self {
        Self {
            missing_value_str: "NA".to_string(),
            nan_str: "NaN".to_string(),
            posinf_str: "Inf".to_string(),
            neginf_str: "-Inf".to_string(),
        }
    }
}

/// Writer-wide options controlling partitioning and package layout.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpecXlsxPackOptions {
    /// Maximum data rows per package; `None` means unbounded.
    pub row_limit: Option<usize>,
    /// Overflow behavior when `row_limit` splits the data.
    pub exceed_strategy: EnumExceedStrategy,
    /// Worksheet name written into every package.
    pub sheet_name: String,
    /// Maximum worker threads for chunk assembly; `None`/`1` is serial.
    pub num_workers_max: Option<usize>,
    /// Value conversion policy for DataFrame input.
    pub value_policy: SpecXlsxValuePolicy,
}

impl Default for SpecXlsxPackOptions {
    fn default() -> Self {
        Self {
            row_limit: None,
            exceed_strategy: EnumExceedStrategy::Files,
            sheet_name: C_SHEET_NAME_DEFAULT.to_string(),
            num_workers_max: None,
            value_policy: SpecXlsxValuePolicy::default(),
        }
    }
}

impl SpecXlsxPackOptions {
    /// Reject option combinations that cannot produce a package.
    pub fn validate(&self) -> Result<()> {
        if self.row_limit == Some(0) {
            return Err(XlsxPackError::Configuration(
                "row_limit must be >= 1 or None.".to_string(),
            ));
        }
        if self.num_workers_max == Some(0) {
            return Err(XlsxPackError::Configuration(
                "num_workers_max must be >= 1 or None.".to_string(),
            ));
        }
        Ok(())
    }
}

// #endregion
////////////////////////////////////////////////////////////////////////////////
// #region ChunkAndPackage

/// Header plus a bounded group of data rows destined for one package.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SpecChunk<'a> {
    /// One-based chunk number.
    pub chunk_idx: usize,
    /// Total number of chunks in this conversion.
    pub chunk_count: usize,
    /// Header row replicated into every chunk.
    pub header: &'a [EnumCell],
    /// Contiguous data rows of this chunk.
    pub rows_data: &'a [TypeRow],
    /// Inclusive data-row start (header excluded).
    pub row_start_inclusive: usize,
    /// Exclusive data-row end (header excluded).
    pub row_end_exclusive: usize,
}

impl<'a> SpecChunk<'a> {
    /// Header first, then data rows, in output order.
    pub fn iter_rows(&self) -> impl Iterator<Item = &'a [EnumCell]> + 'a {
        let header = self.header;
        let rows_data = self.rows_data;
        std::iter::once(header).chain(rows_data.iter().map(Vec::as_slice))
    }

    /// Number of data rows (header excluded).
    pub fn height_data(&self) -> usize {
        self.rows_data.len()
    }
}

/// In-memory package: named part blobs ready for an archiver.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpecPackage {
    /// Target file name without extension.
    pub file_name: String,
    /// Part bytes keyed by canonical in-package path.
    pub parts: BTreeMap<String, Vec<u8>>,
    /// Summary of what went into this package.
    pub slice: SpecPackageSlice,
}

impl SpecPackage {
    /// Bytes of one part.
    pub fn part(&self, path: &str) -> Option<&[u8]> {
        self.parts.get(path).map(Vec::as_slice)
    }

    /// Part decoded as UTF-8 text.
    pub fn part_text(&self, path: &str) -> Option<&str> {
        self.part(path)
            .and_then(|bytes| std::str::from_utf8(bytes).ok())
    }
}

// #endregion
////////////////////////////////////////////////////////////////////////////////
// #region ReportSpecification

/// Concrete package emitted by one write call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpecPackageSlice {
    /// Package file name without extension.
    pub file_name: String,
    /// Inclusive data-row start (header excluded).
    pub row_start_inclusive: usize,
    /// Exclusive data-row end (header excluded).
    pub row_end_exclusive: usize,
    /// Declared shared-string `count`.
    pub cnt_strings_total: usize,
    /// Declared shared-string `uniqueCount`.
    pub cnt_strings_unique: usize,
    /// Where the archiver put the package, once archived.
    pub path_out: Option<PathBuf>,
}

/// Per-write call report.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SpecXlsxPackReport {
    /// Packages produced by the write call, in chunk order.
    pub packages: Vec<SpecPackageSlice>,
    /// Non-fatal warnings.
    pub warnings: Vec<String>,
}

impl SpecXlsxPackReport {
    /// Add a warning message.
    pub fn warn(&mut self, msg: impl AsRef<str>) {
        log::warn!("{}", msg.as_ref());
        self.warnings.push(msg.as_ref().to_string());
    }

    /// Sum of data rows across all packages.
    pub fn height_data_total(&self) -> usize {
        self.packages
            .iter()
            .map(|pkg| pkg.row_end_exclusive - pkg.row_start_inclusive)
            .sum()
    }
}

// #endregion
////////////////////////////////////////////////////////////////////////////////
