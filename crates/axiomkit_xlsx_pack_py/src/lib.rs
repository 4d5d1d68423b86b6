use std::path::PathBuf;

use axiomkit_xlsx_pack::frame::derive_float_cell;
use axiomkit_xlsx_pack::spec::{
    EnumCell, EnumExceedStrategy, SpecDataset, SpecPackageSlice, SpecXlsxPackOptions,
    SpecXlsxPackReport, SpecXlsxValuePolicy, TypeRow, XlsxPackError,
};
use axiomkit_xlsx_pack::{XlsxPackWriter as RsXlsxPackWriter, ZipArchiver};
use pyo3::exceptions::{PyOSError, PyRuntimeError, PyValueError};
use pyo3::prelude::*;
use pyo3::types::{PyAny, PyBool, PyDict, PyFloat, PyInt, PyList, PyString, PyTuple};

const N_BRIDGE_ABI_VERSION: u64 = 1;
const C_BRIDGE_CONTRACT_VERSION: &str = "axiomkit.xlsx.pack.v1";
const C_BRIDGE_TRANSPORT: &str = "python_rows|polars_ipc";

#[pyclass(name = "XlsxPackWriter")]
struct PyXlsxPackWriter {
    #[pyo3(get)]
    dir_out: String,
    #[pyo3(get)]
    base_name: String,
    inner: RsXlsxPackWriter<ZipArchiver>,
}

#[pymethods]
impl PyXlsxPackWriter {
    #[new]
    #[pyo3(signature = (
        dir_out,
        base_name,
        row_limit = None,
        exceed_strategy = "files",
        sheet_name = None,
        num_workers_max = None,
        value_policy = None
    ))]
    fn new(
        dir_out: String,
        base_name: String,
        row_limit: Option<usize>,
        exceed_strategy: &str,
        sheet_name: Option<String>,
        num_workers_max: Option<usize>,
        value_policy: Option<&Bound<'_, PyAny>>,
    ) -> PyResult<Self> {
        let mut options = SpecXlsxPackOptions {
            row_limit,
            exceed_strategy: exceed_strategy
                .parse::<EnumExceedStrategy>()
                .map_err(convert_pack_error_to_pyerr)?,
            num_workers_max,
            value_policy: parse_spec_xlsx_value_policy(value_policy)?,
            ..Default::default()
        };
        if let Some(c_sheet_name) = sheet_name {
            options.sheet_name = c_sheet_name;
        }

        let inner = RsXlsxPackWriter::new(
            ZipArchiver::new(PathBuf::from(&dir_out)),
            base_name.clone(),
            options,
        )
        .map_err(convert_pack_error_to_pyerr)?;

        Ok(Self {
            dir_out,
            base_name,
            inner,
        })
    }

    fn report(&self, py: Python<'_>) -> PyResult<Py<PyAny>> {
        let l_reports = self.inner.report();
        let mut l_report_obj = Vec::with_capacity(l_reports.len());
        for report in &l_reports {
            l_report_obj.push(create_report_object(py, report)?);
        }
        let tup_report = PyTuple::new(py, l_report_obj)?;
        Ok(tup_report.into_any().unbind())
    }

    /// Write rows given as a list of lists; the first row is the header.
    fn write_rows(&mut self, py: Python<'_>, rows: &Bound<'_, PyAny>) -> PyResult<Py<PyAny>> {
        let dataset = derive_dataset_from_py_rows(rows, &self.inner.options().value_policy)?;
        let inner = &mut self.inner;
        let report = py
            .allow_threads(|| inner.write_dataset(&dataset))
            .map_err(convert_pack_error_to_pyerr)?;
        Ok(create_report_object(py, &report)?.unbind())
    }

    /// Write one Polars DataFrame serialized as IPC bytes.
    fn write_ipc(&mut self, py: Python<'_>, ipc_df: &[u8]) -> PyResult<Py<PyAny>> {
        let inner = &mut self.inner;
        let report = py
            .allow_threads(|| inner.write_ipc_bytes(ipc_df))
            .map_err(convert_pack_error_to_pyerr)?;
        Ok(create_report_object(py, &report)?.unbind())
    }
}

fn convert_pack_error_to_pyerr(err: XlsxPackError) -> PyErr {
    match err {
        XlsxPackError::Io(_) => PyOSError::new_err(err.to_string()),
        XlsxPackError::Zip(_) | XlsxPackError::Archive(_) => PyRuntimeError::new_err(err.to_string()),
        _ => PyValueError::new_err(err.to_string()),
    }
}

fn create_report_object<'py>(
    py: Python<'py>,
    report: &SpecXlsxPackReport,
) -> PyResult<Bound<'py, PyAny>> {
    let mut l_package_obj = Vec::with_capacity(report.packages.len());
    for slice in &report.packages {
        l_package_obj.push(create_package_slice_object(py, slice)?);
    }

    let dict_report = PyDict::new(py);
    dict_report.set_item("packages", PyList::new(py, l_package_obj)?)?;
    dict_report.set_item("warnings", report.warnings.clone())?;
    Ok(dict_report.into_any())
}

fn create_package_slice_object<'py>(
    py: Python<'py>,
    slice: &SpecPackageSlice,
) -> PyResult<Bound<'py, PyDict>> {
    let dict_slice = PyDict::new(py);
    dict_slice.set_item("file_name", &slice.file_name)?;
    dict_slice.set_item("row_start_inclusive", slice.row_start_inclusive)?;
    dict_slice.set_item("row_end_exclusive", slice.row_end_exclusive)?;
    dict_slice.set_item("cnt_strings_total", slice.cnt_strings_total)?;
    dict_slice.set_item("cnt_strings_unique", slice.cnt_strings_unique)?;
    dict_slice.set_item(
        "path_out",
        slice
            .path_out
            .as_ref()
            .map(|path_out| path_out.to_string_lossy().into_owned()),
    )?;
    Ok(dict_slice)
}

fn derive_dataset_from_py_rows(
    rows: &Bound<'_, PyAny>,
    value_policy: &SpecXlsxValuePolicy,
) -> PyResult<SpecDataset> {
    let mut l_rows = Vec::new();
    for (n_idx_row, row) in rows.try_iter()?.enumerate() {
        let row = row?;
        let mut l_row: TypeRow = Vec::new();
        for value in row.try_iter()? {
            l_row.push(derive_cell_from_py_value(&value?, value_policy).map_err(|err| {
                PyValueError::new_err(format!("Invalid cell in row {n_idx_row}: {err}"))
            })?);
        }
        l_rows.push(l_row);
    }
    Ok(SpecDataset::new(l_rows))
}

fn derive_cell_from_py_value(
    value: &Bound<'_, PyAny>,
    value_policy: &SpecXlsxValuePolicy,
) -> PyResult<EnumCell> {
    if value.is_none() {
        return Ok(EnumCell::Text(value_policy.missing_value_str.clone()));
    }
    // `bool` is an `int` subclass; check it first.
    if let Ok(val) = value.downcast::<PyBool>() {
        let c_text = if val.is_true() { "True" } else { "False" };
        return Ok(EnumCell::text(c_text));
    }
    if value.is_instance_of::<PyInt>() {
        return Ok(EnumCell::Number(value.str()?.to_string()));
    }
    if value.is_instance_of::<PyFloat>() {
        // Keep Python's own repr (`1e-07`, `1e+300`) as the literal.
        let x = value.extract::<f64>()?;
        return Ok(derive_float_cell(x, value.str()?.to_string(), value_policy));
    }
    if let Ok(val) = value.downcast::<PyString>() {
        return Ok(EnumCell::Text(val.to_str()?.to_string()));
    }
    Err(PyValueError::new_err(format!(
        "Unsupported cell type: {}",
        value.get_type().name()?
    )))
}

fn parse_spec_xlsx_value_policy(obj: Option<&Bound<'_, PyAny>>) -> PyResult<SpecXlsxValuePolicy> {
    let mut policy = SpecXlsxValuePolicy::default();
    let Some(obj) = obj else {
        return Ok(policy);
    };
    if obj.is_none() {
        return Ok(policy);
    }

    if let Some(v) = extract_optional_attr::<String>(obj, "missing_value_str")? {
        policy.missing_value_str = v;
    }
    if let Some(v) = extract_optional_attr::<String>(obj, "nan_str")? {
        policy.nan_str = v;
    }
    if let Some(v) = extract_optional_attr::<String>(obj, "posinf_str")? {
        policy.posinf_str = v;
    }
    if let Some(v) = extract_optional_attr::<String>(obj, "neginf_str")? {
        policy.neginf_str = v;
    }
    Ok(policy)
}

fn extract_optional_attr<T>(obj: &Bound<'_, PyAny>, attr: &str) -> PyResult<Option<T>>
where
    for<'a> T: FromPyObject<'a>,
{
    if !obj.hasattr(attr)? {
        return Ok(None);
    }
    let val = obj.getattr(attr)?;
    if val.is_none() {
        return Ok(None);
    }
    Ok(Some(val.extract::<T>()?))
}

#[pymodule]
fn _axiomkit_xlsx_pack_rs(_py: Python<'_>, module: &Bound<'_, PyModule>) -> PyResult<()> {
    module.add_class::<PyXlsxPackWriter>()?;
    module.add("__bridge_abi__", N_BRIDGE_ABI_VERSION)?;
    module.add("__bridge_contract__", C_BRIDGE_CONTRACT_VERSION)?;
    module.add("__bridge_transport__", C_BRIDGE_TRANSPORT)?;
    Ok(())
}
