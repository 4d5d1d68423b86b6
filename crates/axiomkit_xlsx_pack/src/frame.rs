//! Polars DataFrame input: column names become the header row.

use std::io::Cursor;

use polars::prelude::{AnyValue, DataFrame, IpcReader, SerReader};

use crate::spec::{
    EnumCell, Result, SpecDataset, SpecXlsxValuePolicy, TypeRow, XlsxPackError,
};

/// Convert a DataFrame into a dataset whose header row is the column names.
pub fn derive_dataset_from_dataframe(
    df: &DataFrame,
    value_policy: &SpecXlsxValuePolicy,
) -> Result<SpecDataset> {
    let l_header: TypeRow = df
        .get_column_names_str()
        .into_iter()
        .map(EnumCell::text)
        .collect();

    let n_height = df.height();
    let l_cols = df.get_columns();
    let mut l_rows = Vec::with_capacity(n_height + 1);
    l_rows.push(l_header);

    for n_idx_row in 0..n_height {
        let mut l_row = Vec::with_capacity(l_cols.len());
        for col in l_cols {
            let value = col.get(n_idx_row).map_err(|err| {
                XlsxPackError::DataFrame(format!("Failed to access cell value: {err}"))
            })?;
            l_row.push(derive_cell_from_any_value(value, value_policy));
        }
        l_rows.push(l_row);
    }

    Ok(SpecDataset::new(l_rows))
}

/// Decode Polars IPC bytes and convert them into a dataset.
pub fn derive_dataset_from_ipc_bytes(
    v_ipc_df: &[u8],
    value_policy: &SpecXlsxValuePolicy,
) -> Result<SpecDataset> {
    let df = derive_dataframe_from_ipc_bytes(v_ipc_df)?;
    derive_dataset_from_dataframe(&df, value_policy)
}

fn derive_dataframe_from_ipc_bytes(v_ipc_df: &[u8]) -> Result<DataFrame> {
    IpcReader::new(Cursor::new(v_ipc_df)).finish().map_err(|err| {
        XlsxPackError::DataFrame(format!("Failed to read IPC DataFrame bytes: {err}"))
    })
}

/// Text replacement for `NaN`/`Inf`; `None` for finite values.
pub fn convert_nan_inf_to_str(x: f64, value_policy: &SpecXlsxValuePolicy) -> Option<String> {
    if x.is_nan() {
        return Some(value_policy.nan_str.clone());
    }
    if x.is_infinite() {
        return Some(if x.is_sign_positive() {
            value_policy.posinf_str.clone()
        } else {
            value_policy.neginf_str.clone()
        });
    }
    None
}

/// Float cell keeping the caller's `literal`; non-finite values become policy text.
pub fn derive_float_cell(
    x: f64,
    literal: String,
    value_policy: &SpecXlsxValuePolicy,
) -> EnumCell {
    match convert_nan_inf_to_str(x, value_policy) {
        Some(c_text) => EnumCell::Text(c_text),
        None => EnumCell::Number(literal),
    }
}

fn derive_cell_from_any_value(value: AnyValue<'_>, value_policy: &SpecXlsxValuePolicy) -> EnumCell {
    match value {
        AnyValue::Null => EnumCell::Text(value_policy.missing_value_str.clone()),
        AnyValue::String(val) => EnumCell::Text(val.to_string()),
        AnyValue::StringOwned(val) => EnumCell::Text(val.to_string()),
        AnyValue::Boolean(val) => EnumCell::Text(if val { "True" } else { "False" }.to_string()),
        AnyValue::UInt8(val) => EnumCell::Number(val.to_string()),
        AnyValue::UInt16(val) => EnumCell::Number(val.to_string()),
        AnyValue::UInt32(val) => EnumCell::Number(val.to_string()),
        AnyValue::UInt64(val) => EnumCell::Number(val.to_string()),
        AnyValue::Int8(val) => EnumCell::Number(val.to_string()),
        AnyValue::Int16(val) => EnumCell::Number(val.to_string()),
        AnyValue::Int32(val) => EnumCell::Number(val.to_string()),
        AnyValue::Int64(val) => EnumCell::Number(val.to_string()),
        AnyValue::Int128(val) => EnumCell::Number(val.to_string()),
        AnyValue::Float32(val) => derive_float_cell(val as f64, val.to_string(), value_policy),
        AnyValue::Float64(val) => derive_float_cell(val, val.to_string(), value_policy),
        _ => EnumCell::Text(value.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use polars::prelude::{Column, NamedFrom};

    use super::*;

    #[test]
    fn test_dataframe_header_and_value_mapping() {
        let df = DataFrame::new(vec![
            Column::new("x".into(), &[Some(1.5f64), None, Some(f64::NAN)]),
            Column::new("label".into(), &["a", "b", "c"]),
            Column::new("n".into(), &[1i64, 2, 3]),
        ])
        .unwrap();

        let dataset = derive_dataset_from_dataframe(&df, &SpecXlsxValuePolicy::default()).unwrap();

        assert_eq!(
            dataset.rows[0],
            vec![
                EnumCell::text("x"),
                EnumCell::text("label"),
                EnumCell::text("n")
            ]
        );
        assert_eq!(dataset.height_data(), 3);
        assert_eq!(dataset.rows[1][0], EnumCell::Number("1.5".into()));
        assert_eq!(dataset.rows[2][0], EnumCell::text("NA"));
        assert_eq!(dataset.rows[3][0], EnumCell::text("NaN"));
        assert_eq!(dataset.rows[1][1], EnumCell::text("a"));
        assert_eq!(dataset.rows[3][2], EnumCell::Number("3".into()));
    }

    #[test]
    fn test_derive_float_cell_keeps_literal() {
        let value_policy = SpecXlsxValuePolicy::default();
        assert_eq!(
            derive_float_cell(1e-7, "1e-07".to_string(), &value_policy),
            EnumCell::Number("1e-07".into())
        );
        assert_eq!(
            derive_float_cell(f64::NAN, "nan".to_string(), &value_policy),
            EnumCell::text("NaN")
        );
    }

    #[test]
    fn test_convert_nan_inf_to_str() {
        let value_policy = SpecXlsxValuePolicy::default();
        assert_eq!(
            convert_nan_inf_to_str(f64::INFINITY, &value_policy).as_deref(),
            Some("Inf")
        );
        assert_eq!(
            convert_nan_inf_to_str(f64::NEG_INFINITY, &value_policy).as_deref(),
            Some("-Inf")
        );
        assert_eq!(convert_nan_inf_to_str(0.5, &value_policy), None);
    }
}
