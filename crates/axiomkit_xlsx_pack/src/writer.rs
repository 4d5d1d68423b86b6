//! XLSX package writer kernel: partition, assemble, archive.

use polars::prelude::DataFrame;
use rayon::ThreadPoolBuilder;
use rayon::prelude::*;

use crate::archive::Archiver;
use crate::frame::{derive_dataset_from_dataframe, derive_dataset_from_ipc_bytes};
use crate::package::assemble_package;
use crate::spec::{
    Result, SpecChunk, SpecDataset, SpecPackage, SpecXlsxPackOptions, SpecXlsxPackReport,
};
use crate::util::{
    derive_package_file_name, plan_dataset_chunks, sanitize_sheet_name, validate_base_name,
};

/// Convert a dataset into packages, in chunk order, without any I/O.
///
/// Either every chunk assembles or the whole call fails.
pub fn convert_dataset_to_packages(
    dataset: &SpecDataset,
    base_name: &str,
    options: &SpecXlsxPackOptions,
) -> Result<Vec<SpecPackage>> {
    let mut report = SpecXlsxPackReport::default();
    assemble_packages(dataset, base_name, options, &mut report)
}

fn assemble_packages(
    dataset: &SpecDataset,
    base_name: &str,
    options: &SpecXlsxPackOptions,
    report: &mut SpecXlsxPackReport,
) -> Result<Vec<SpecPackage>> {
    validate_base_name(base_name)?;
    let l_chunks = plan_dataset_chunks(dataset, options, report)?;
    let c_sheet_name = sanitize_sheet_name(&options.sheet_name, "_");
    if c_sheet_name != options.sheet_name {
        report.warn(format!(
            "Sheet name {:?} sanitized to {c_sheet_name:?}.",
            options.sheet_name
        ));
    }

    let build_one = |chunk: &SpecChunk<'_>| {
        assemble_package(
            chunk,
            &derive_package_file_name(base_name, chunk),
            &c_sheet_name,
        )
    };

    let n_workers_max = calculate_worker_limit(options.num_workers_max, l_chunks.len());
    if n_workers_max <= 1 {
        return l_chunks.iter().map(build_one).collect();
    }

    let thread_pool = ThreadPoolBuilder::new().num_threads(n_workers_max).build();
    let Ok(thread_pool) = thread_pool else {
        report.warn(format!(
            "Failed to initialize thread pool (workers={n_workers_max}); fallback to serial assembly."
        ));
        return l_chunks.iter().map(build_one).collect();
    };

    // `collect` on an indexed parallel iterator keeps chunk order.
    thread_pool.install(|| l_chunks.par_iter().map(build_one).collect())
}

fn calculate_worker_limit(num_workers_max: Option<usize>, n_chunks: usize) -> usize {
    usize::max(1, usize::min(num_workers_max.unwrap_or(1), n_chunks))
}

/// Stateful writer bound to an archiver, a base file name, and options.
pub struct XlsxPackWriter<A: Archiver> {
    archiver: A,
    base_name: String,
    options: SpecXlsxPackOptions,
    l_reports: Vec<SpecXlsxPackReport>,
}

impl<A: Archiver> XlsxPackWriter<A> {
    /// Create writer; options are validated up front.
    pub fn new(
        archiver: A,
        base_name: impl Into<String>,
        options: SpecXlsxPackOptions,
    ) -> Result<Self> {
        let base_name = base_name.into();
        validate_base_name(&base_name)?;
        options.validate()?;
        Ok(Self {
            archiver,
            base_name,
            options,
            l_reports: Vec::new(),
        })
    }

    /// Base file name used for every package.
    pub fn base_name(&self) -> &str {
        &self.base_name
    }

    /// Active options.
    pub fn options(&self) -> &SpecXlsxPackOptions {
        &self.options
    }

    /// Return immutable snapshot of per-call write reports.
    pub fn report(&self) -> Vec<SpecXlsxPackReport> {
        self.l_reports.clone()
    }

    /// Borrow the archiver.
    pub fn archiver(&self) -> &A {
        &self.archiver
    }

    /// Release the archiver.
    pub fn into_archiver(self) -> A {
        self.archiver
    }

    /// Partition, assemble and archive one dataset.
    ///
    /// Every package is assembled before the first one is archived, so a
    /// malformed dataset never leaves partial output behind.
    pub fn write_dataset(&mut self, dataset: &SpecDataset) -> Result<SpecXlsxPackReport> {
        let mut report = SpecXlsxPackReport::default();
        let l_packages = assemble_packages(dataset, &self.base_name, &self.options, &mut report)?;

        for mut package in l_packages {
            let path_out = self.archiver.archive(&package)?;
            package.slice.path_out = Some(path_out);
            report.packages.push(package.slice);
        }

        log::info!(
            "wrote {} package(s) for {:?}: data rows={}",
            report.packages.len(),
            self.base_name,
            report.height_data_total()
        );
        self.l_reports.push(report.clone());
        Ok(report)
    }

    /// Write one in-memory DataFrame (column names become the header row).
    pub fn write_dataframe(&mut self, df: &DataFrame) -> Result<SpecXlsxPackReport> {
        let dataset = derive_dataset_from_dataframe(df, &self.options.value_policy)?;
        self.write_dataset(&dataset)
    }

    /// Write one DataFrame from Polars IPC bytes.
    pub fn write_ipc_bytes(&mut self, v_ipc_df: &[u8]) -> Result<SpecXlsxPackReport> {
        let dataset = derive_dataset_from_ipc_bytes(v_ipc_df, &self.options.value_policy)?;
        self.write_dataset(&dataset)
    }
}
