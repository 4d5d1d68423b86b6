//! Stateless helper utilities used by the XLSX package kernel.

use std::borrow::Cow;

use crate::conf::{
    C_SHEET_NAME_DEFAULT, N_LEN_EXCEL_SHEET_NAME_MAX, N_NCOLS_EXCEL_MAX, N_NROWS_EXCEL_MAX,
    TUP_EXCEL_ILLEGAL,
};
use crate::spec::{
    Result, SpecChunk, SpecDataset, SpecXlsxPackOptions, SpecXlsxPackReport, XlsxPackError,
};

////////////////////////////////////////////////////////////////////////////////
// #region XmlText

/// Escape text for XML element content and attribute values.
pub fn escape_xml_text(value: &str) -> Cow<'_, str> {
    quick_xml::escape::escape(value)
}

/// Whether `ch` cannot appear in an XML 1.0 document, even escaped.
pub fn if_xml_forbidden_char(ch: char) -> bool {
    matches!(
        ch,
        '\u{0}'..='\u{8}' | '\u{B}' | '\u{C}' | '\u{E}'..='\u{1F}' | '\u{FFFE}' | '\u{FFFF}'
    )
}

/// Escape cell text for a shared-string `<t>` element.
///
/// Characters XML cannot carry become OOXML `_xHHHH_` escapes, and a literal
/// `_x` is written as `_x005F_x` so readers do not decode it.
pub fn escape_cell_text(value: &str) -> Cow<'_, str> {
    if !value.contains("_x") && !value.chars().any(if_xml_forbidden_char) {
        return escape_xml_text(value);
    }

    let mut c_encoded = String::with_capacity(value.len() + 16);
    let mut iter_chars = value.chars().peekable();
    while let Some(ch) = iter_chars.next() {
        if ch == '_' && iter_chars.peek() == Some(&'x') {
            c_encoded.push_str("_x005F_");
        } else if if_xml_forbidden_char(ch) {
            c_encoded.push_str(&format!("_x{:04X}_", u32::from(ch)));
        } else {
            c_encoded.push(ch);
        }
    }
    Cow::Owned(escape_xml_text(&c_encoded).into_owned())
}

/// Whether `<t>` needs `xml:space="preserve"` to keep surrounding whitespace.
pub fn if_needs_space_preserve(value: &str) -> bool {
    value.starts_with(char::is_whitespace) || value.ends_with(char::is_whitespace)
}

/// Convert zero-based column index to Excel column letters (`0 -> A`, `26 -> AA`).
pub fn derive_column_letter(col_idx: usize) -> String {
    let mut l_chars = Vec::new();
    let mut n_rest = col_idx + 1;
    while n_rest > 0 {
        let n_rem = (n_rest - 1) % 26;
        l_chars.push(char::from(b'A' + n_rem as u8));
        n_rest = (n_rest - 1) / 26;
    }
    l_chars.iter().rev().collect()
}

/// Build `A1`-style reference from zero-based row/column indices.
pub fn derive_cell_reference(row_idx: usize, col_idx: usize) -> String {
    format!("{}{}", derive_column_letter(col_idx), row_idx + 1)
}

// #endregion
////////////////////////////////////////////////////////////////////////////////
// #region RowChunking

/// Generate `(row_start, row_len)` chunks for `n_rows_total`.
pub fn generate_row_chunks(n_rows_total: usize, size_rows_chunk: usize) -> Vec<(usize, usize)> {
    let mut l_chunks = Vec::new();
    let mut n_row_cursor = 0;
    while n_row_cursor < n_rows_total {
        let n_rows_per_chunk = usize::min(size_rows_chunk, n_rows_total - n_row_cursor);
        l_chunks.push((n_row_cursor, n_rows_per_chunk));
        n_row_cursor += n_rows_per_chunk;
    }
    l_chunks
}

/// Check every row against the header width before anything is emitted.
pub fn validate_row_widths(dataset: &SpecDataset) -> Result<usize> {
    let Some(header) = dataset.header() else {
        return Err(XlsxPackError::EmptyDataset);
    };
    let n_width = header.len();

    for (row_idx, row) in dataset.rows.iter().enumerate().skip(1) {
        if row.len() != n_width {
            return Err(XlsxPackError::MalformedRow {
                row_idx,
                width_expected: n_width,
                width_actual: row.len(),
            });
        }
    }
    Ok(n_width)
}

/// Split the dataset into header-prefixed chunks bounded by `row_limit`.
///
/// Unbounded options (or a header-only dataset) yield exactly one chunk.
/// Rows are validated up front so a malformed dataset yields no chunks at all.
pub fn plan_dataset_chunks<'a>(
    dataset: &'a SpecDataset,
    options: &SpecXlsxPackOptions,
    report: &mut SpecXlsxPackReport,
) -> Result<Vec<SpecChunk<'a>>> {
    options.validate()?;
    let n_width = validate_row_widths(dataset)?;
    let Some(header) = dataset.header() else {
        return Err(XlsxPackError::EmptyDataset);
    };
    let l_rows_data = dataset.data_rows();
    let n_height_data = l_rows_data.len();

    if n_width > N_NCOLS_EXCEL_MAX {
        report.warn(format!(
            "Excel limit overflow: {n_width} columns exceed the worksheet maximum of {N_NCOLS_EXCEL_MAX}."
        ));
    }

    let mut l_row_spans = match options.row_limit {
        Some(n_row_limit) => generate_row_chunks(n_height_data, n_row_limit),
        None => vec![(0, n_height_data)],
    };
    if l_row_spans.is_empty() {
        l_row_spans.push((0, 0));
    }

    let n_chunks_total = l_row_spans.len();
    let mut l_chunks = Vec::with_capacity(n_chunks_total);
    for (n_idx_chunk, (n_row_start, n_rows_len)) in l_row_spans.into_iter().enumerate() {
        let n_row_end = n_row_start + n_rows_len;
        if n_rows_len + 1 > N_NROWS_EXCEL_MAX {
            report.warn(format!(
                "Excel limit overflow: chunk {} holds {} rows (header included), above {N_NROWS_EXCEL_MAX}.",
                n_idx_chunk + 1,
                n_rows_len + 1
            ));
        }
        log::debug!(
            "planned chunk {}/{n_chunks_total}: data rows [{n_row_start}, {n_row_end})",
            n_idx_chunk + 1
        );
        l_chunks.push(SpecChunk {
            chunk_idx: n_idx_chunk + 1,
            chunk_count: n_chunks_total,
            header,
            rows_data: &l_rows_data[n_row_start..n_row_end],
            row_start_inclusive: n_row_start,
            row_end_exclusive: n_row_end,
        });
    }

    Ok(l_chunks)
}

// #endregion
////////////////////////////////////////////////////////////////////////////////
// #region Naming

/// Replace invalid chars and trim to valid Excel sheet name.
pub fn sanitize_sheet_name(name: &str, replace_to: &str) -> String {
    let mut c_name = name.to_string();
    for c_illegal in TUP_EXCEL_ILLEGAL {
        c_name = c_name.replace(c_illegal, replace_to);
    }
    c_name = c_name.replace(|ch: char| ch.is_control(), replace_to);
    c_name = c_name.trim().to_string();
    if c_name.is_empty() {
        c_name = C_SHEET_NAME_DEFAULT.to_string();
    }

    c_name.chars().take(N_LEN_EXCEL_SHEET_NAME_MAX).collect()
}

/// Package file name: base alone for one chunk, `base{n}` when split.
pub fn derive_package_file_name(base_name: &str, chunk: &SpecChunk<'_>) -> String {
    if chunk.chunk_count == 1 {
        base_name.to_string()
    } else {
        create_file_identifier(base_name, chunk.chunk_idx)
    }
}

/// Create suffixed file name (`base1`, `base2`, ...).
pub fn create_file_identifier(base_name: &str, part_idx_1based: usize) -> String {
    format!("{base_name}{part_idx_1based}")
}

/// Reject base names that cannot be used as a file name.
pub fn validate_base_name(base_name: &str) -> Result<()> {
    if base_name.trim().is_empty() {
        return Err(XlsxPackError::Configuration(
            "base_name must not be empty.".to_string(),
        ));
    }
    if base_name.contains(['/', '\\']) {
        return Err(XlsxPackError::Configuration(format!(
            "base_name must not contain path separators: {base_name:?}."
        )));
    }
    Ok(())
}

// #endregion
////////////////////////////////////////////////////////////////////////////////
