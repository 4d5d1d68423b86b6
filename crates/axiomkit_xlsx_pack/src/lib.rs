//! `axiomkit_xlsx_pack` v1:
//! Rust-side XLSX package content generator.
//!
//! Turns a header-first table of numbers and text into one or more minimal
//! single-sheet `.xlsx` packages, splitting rows across packages when a row
//! limit is set.
//!
//! Architecture:
//! - `conf`    : constants, part paths, and default presets
//! - `spec`    : specs/models/options and the error type
//! - `util`    : pure helper functions (chunk planning, naming, XML text)
//! - `strings` : per-package shared-string table (collect, then finalize)
//! - `sheet`   : cell classification and worksheet XML
//! - `package` : per-chunk assembly of every package part
//! - `archive` : archivers (zip file, part tree, in-memory)
//! - `frame`   : Polars DataFrame / IPC input
//! - `writer`  : orchestration kernel
pub mod archive;
pub mod conf;
pub mod frame;
pub mod package;
pub mod sheet;
pub mod spec;
pub mod strings;
pub mod util;
pub mod writer;

pub use archive::{Archiver, DirectoryArchiver, MemoryArchiver, ZipArchiver, derive_zip_bytes};
pub use conf::{
    C_PATH_CONTENT_TYPES, C_PATH_ROOT_RELS, C_PATH_SHARED_STRINGS, C_PATH_WORKBOOK,
    C_PATH_WORKBOOK_RELS, C_PATH_WORKSHEET, N_LEN_EXCEL_SHEET_NAME_MAX, N_NCOLS_EXCEL_MAX,
    N_NROWS_EXCEL_MAX, TUP_EXCEL_ILLEGAL, TUP_PACKAGE_PART_PATHS,
    derive_default_xlsx_pack_options,
};
pub use frame::{convert_nan_inf_to_str, derive_dataset_from_dataframe, derive_dataset_from_ipc_bytes};
pub use package::assemble_package;
pub use sheet::{classify_cell, render_worksheet_xml};
pub use spec::{
    EnumCell, EnumExceedStrategy, Result, SpecCellPayload, SpecChunk, SpecDataset, SpecPackage,
    SpecPackageSlice, SpecSharedStringEntry, SpecXlsxPackOptions, SpecXlsxPackReport,
    SpecXlsxValuePolicy, TypeRow, XlsxPackError,
};
pub use strings::{SharedStringTable, SharedStringTableBuilder};
pub use util::{derive_column_letter, plan_dataset_chunks, sanitize_sheet_name};
pub use writer::{XlsxPackWriter, convert_dataset_to_packages};
