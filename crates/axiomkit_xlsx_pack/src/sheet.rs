//! Cell classification and worksheet XML rendering.

use std::fmt::Write as _;

use crate::conf::{C_NS_OFFICE_RELS, C_NS_SPREADSHEET_MAIN, C_XML_DECLARATION};
use crate::spec::{EnumCell, Result, SpecCellPayload, XlsxPackError, if_valid_number_literal};
use crate::strings::SharedStringTable;
use crate::util::{derive_cell_reference, derive_column_letter};

/// Type tag for numeric cells.
pub const C_CELL_TYPE_NUMBER: &str = "n";
/// Type tag for shared-string cells.
pub const C_CELL_TYPE_SHARED_STRING: &str = "s";

/// Classify one cell against a finalized table.
///
/// Numbers pass their literal through untouched once it parses as a finite
/// number; text resolves to its shared-string index.
pub fn classify_cell(cell: &EnumCell, table: &SharedStringTable) -> Result<SpecCellPayload> {
    match cell {
        EnumCell::Number(literal) if if_valid_number_literal(literal) => Ok(SpecCellPayload {
            type_tag: C_CELL_TYPE_NUMBER,
            payload: literal.clone(),
        }),
        EnumCell::Number(literal) => Err(XlsxPackError::InvalidNumber(literal.clone())),
        EnumCell::Text(value) => Ok(SpecCellPayload {
            type_tag: C_CELL_TYPE_SHARED_STRING,
            payload: table.resolve(value)?.to_string(),
        }),
    }
}

/// Render the full worksheet part for `rows` (header first).
///
/// Every row must match the width of the first row.
pub fn render_worksheet_xml<'r, I>(rows: I, table: &SharedStringTable) -> Result<String>
where
    I: IntoIterator<Item = &'r [EnumCell]>,
{
    let mut c_sheet_data = String::with_capacity(4096);
    let mut n_width: Option<usize> = None;
    let mut n_rows = 0usize;

    for (row_idx, row) in rows.into_iter().enumerate() {
        let n_width_expected = *n_width.get_or_insert(row.len());
        if row.len() != n_width_expected {
            return Err(XlsxPackError::MalformedRow {
                row_idx,
                width_expected: n_width_expected,
                width_actual: row.len(),
            });
        }
        write_row(&mut c_sheet_data, row_idx, row, table)?;
        n_rows += 1;
    }

    let mut out = String::with_capacity(c_sheet_data.len() + 512);
    out.push_str(C_XML_DECLARATION);
    out.push('\n');
    let _ = write!(
        out,
        r#"<worksheet xmlns="{C_NS_SPREADSHEET_MAIN}" xmlns:r="{C_NS_OFFICE_RELS}">"#
    );
    match n_width {
        Some(n_cols) if n_cols > 0 => {
            let _ = write!(
                out,
                r#"<dimension ref="A1:{}{n_rows}"/>"#,
                derive_column_letter(n_cols - 1)
            );
        }
        _ => out.push_str(r#"<dimension ref="A1"/>"#),
    }
    out.push_str("<sheetData>");
    out.push_str(&c_sheet_data);
    out.push_str("</sheetData></worksheet>");
    Ok(out)
}

fn write_row(
    out: &mut String,
    row_idx: usize,
    row: &[EnumCell],
    table: &SharedStringTable,
) -> Result<()> {
    let _ = write!(out, r#"<row r="{}">"#, row_idx + 1);
    for (col_idx, cell) in row.iter().enumerate() {
        let payload = classify_cell(cell, table)?;
        let _ = write!(
            out,
            r#"<c r="{}" t="{}"><v>{}</v></c>"#,
            derive_cell_reference(row_idx, col_idx),
            payload.type_tag,
            payload.payload
        );
    }
    out.push_str("</row>");
    Ok(())
}
