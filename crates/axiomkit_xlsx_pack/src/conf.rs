//! XLSX package constants and default preset factories.

use crate::spec::SpecXlsxPackOptions;

/// Excel worksheet maximum row count.
pub const N_NROWS_EXCEL_MAX: usize = 1_048_576;
/// Excel worksheet maximum column count.
pub const N_NCOLS_EXCEL_MAX: usize = 16_384;
/// Excel sheet name maximum length.
pub const N_LEN_EXCEL_SHEET_NAME_MAX: usize = 31;
/// Characters not allowed in sheet names.
pub const TUP_EXCEL_ILLEGAL: [&str; 7] = ["*", ":", "?", "/", "\\", "[", "]"];

/// Sheet name used when the caller does not provide one.
pub const C_SHEET_NAME_DEFAULT: &str = "Sheet1";
/// File extension appended by archivers that produce a container file.
pub const C_EXT_XLSX: &str = "xlsx";

////////////////////////////////////////////////////////////////////////////////
// #region PackagePaths

/// Content-types manifest.
pub const C_PATH_CONTENT_TYPES: &str = "[Content_Types].xml";
/// Package-level relationships.
pub const C_PATH_ROOT_RELS: &str = "_rels/.rels";
/// Workbook descriptor.
pub const C_PATH_WORKBOOK: &str = "xl/workbook.xml";
/// Workbook-level relationships.
pub const C_PATH_WORKBOOK_RELS: &str = "xl/_rels/workbook.xml.rels";
/// Shared-strings table.
pub const C_PATH_SHARED_STRINGS: &str = "xl/sharedStrings.xml";
/// The single worksheet.
pub const C_PATH_WORKSHEET: &str = "xl/worksheets/sheet1.xml";

/// Every part path of one package, in archive write order.
pub const TUP_PACKAGE_PART_PATHS: [&str; 6] = [
    C_PATH_CONTENT_TYPES,
    C_PATH_ROOT_RELS,
    C_PATH_WORKBOOK,
    C_PATH_WORKBOOK_RELS,
    C_PATH_SHARED_STRINGS,
    C_PATH_WORKSHEET,
];

// #endregion
////////////////////////////////////////////////////////////////////////////////
// #region Namespaces

pub(crate) const C_XML_DECLARATION: &str =
    r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>"#;

pub(crate) const C_NS_CONTENT_TYPES: &str =
    "http://schemas.openxmlformats.org/package/2006/content-types";
pub(crate) const C_NS_PACKAGE_RELS: &str =
    "http://schemas.openxmlformats.org/package/2006/relationships";
pub(crate) const C_NS_SPREADSHEET_MAIN: &str =
    "http://schemas.openxmlformats.org/spreadsheetml/2006/main";
pub(crate) const C_NS_OFFICE_RELS: &str =
    "http://schemas.openxmlformats.org/officeDocument/2006/relationships";

pub(crate) const C_REL_TYPE_OFFICE_DOCUMENT: &str =
    "http://schemas.openxmlformats.org/officeDocument/2006/relationships/officeDocument";
pub(crate) const C_REL_TYPE_WORKSHEET: &str =
    "http://schemas.openxmlformats.org/officeDocument/2006/relationships/worksheet";
pub(crate) const C_REL_TYPE_SHARED_STRINGS: &str =
    "http://schemas.openxmlformats.org/officeDocument/2006/relationships/sharedStrings";

pub(crate) const C_CT_RELATIONSHIPS: &str =
    "application/vnd.openxmlformats-package.relationships+xml";
pub(crate) const C_CT_XML: &str = "application/xml";
pub(crate) const C_CT_WORKBOOK: &str =
    "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet.main+xml";
pub(crate) const C_CT_WORKSHEET: &str =
    "application/vnd.openxmlformats-officedocument.spreadsheetml.worksheet+xml";
pub(crate) const C_CT_SHARED_STRINGS: &str =
    "application/vnd.openxmlformats-officedocument.spreadsheetml.sharedStrings+xml";

// #endregion
////////////////////////////////////////////////////////////////////////////////

/// Build default pack options (unbounded row limit, `files` strategy).
pub fn derive_default_xlsx_pack_options() -> SpecXlsxPackOptions {
    SpecXlsxPackOptions::default()
}
