//! Archivers: turn an in-memory package into its on-disk (or in-memory) form.

use std::fs;
use std::io::{Cursor, Write};
use std::path::{Path, PathBuf};

use zip::CompressionMethod;
use zip::write::SimpleFileOptions;

use crate::conf::{C_EXT_XLSX, TUP_PACKAGE_PART_PATHS};
use crate::spec::{Result, SpecPackage, XlsxPackError};

/// Collaborator that receives each finished package.
pub trait Archiver {
    /// Persist `package` and return where it went.
    fn archive(&mut self, package: &SpecPackage) -> Result<PathBuf>;
}

////////////////////////////////////////////////////////////////////////////////
// #region ZipArchiver

/// Writes `{dir_out}/{file_name}.xlsx`.
#[derive(Debug, Clone)]
pub struct ZipArchiver {
    path_dir_out: PathBuf,
}

impl ZipArchiver {
    /// Archiver rooted at `dir_out` (created on first use).
    pub fn new(dir_out: impl AsRef<Path>) -> Self {
        Self {
            path_dir_out: dir_out.as_ref().to_path_buf(),
        }
    }

    /// Output directory.
    pub fn dir_out(&self) -> &Path {
        &self.path_dir_out
    }
}

impl Archiver for ZipArchiver {
    fn archive(&mut self, package: &SpecPackage) -> Result<PathBuf> {
        fs::create_dir_all(&self.path_dir_out)?;
        let path_file_out = self
            .path_dir_out
            .join(format!("{}.{C_EXT_XLSX}", package.file_name));
        let v_bytes = derive_zip_bytes(package)?;
        fs::write(&path_file_out, v_bytes)?;
        log::info!("archived package: {}", path_file_out.display());
        Ok(path_file_out)
    }
}

/// Compress a package into `.xlsx` bytes.
///
/// Known parts are written first in canonical order (content types leading),
/// then any remaining parts by path. Timestamps are fixed, so identical
/// packages give identical bytes.
pub fn derive_zip_bytes(package: &SpecPackage) -> Result<Vec<u8>> {
    let mut zip = zip::ZipWriter::new(Cursor::new(Vec::new()));
    let options = SimpleFileOptions::default()
        .compression_method(CompressionMethod::Deflated)
        .last_modified_time(zip::DateTime::default());

    let iter_paths_known = TUP_PACKAGE_PART_PATHS
        .iter()
        .copied()
        .filter(|c_path| package.parts.contains_key(*c_path));
    let iter_paths_extra = package
        .parts
        .keys()
        .map(String::as_str)
        .filter(|c_path| !TUP_PACKAGE_PART_PATHS.contains(c_path));

    for c_path in iter_paths_known.chain(iter_paths_extra) {
        let Some(v_bytes) = package.parts.get(c_path) else {
            continue;
        };
        zip.start_file(c_path, options)?;
        zip.write_all(v_bytes)?;
    }

    Ok(zip.finish()?.into_inner())
}

// #endregion
////////////////////////////////////////////////////////////////////////////////
// #region DirectoryArchiver

/// Writes the uncompressed part tree to `{dir_out}/{file_name}/...`.
#[derive(Debug, Clone)]
pub struct DirectoryArchiver {
    path_dir_out: PathBuf,
}

impl DirectoryArchiver {
    /// Archiver rooted at `dir_out` (created on first use).
    pub fn new(dir_out: impl AsRef<Path>) -> Self {
        Self {
            path_dir_out: dir_out.as_ref().to_path_buf(),
        }
    }
}

impl Archiver for DirectoryArchiver {
    fn archive(&mut self, package: &SpecPackage) -> Result<PathBuf> {
        let path_dir_package = self.path_dir_out.join(&package.file_name);
        for (c_path, v_bytes) in &package.parts {
            if c_path.split('/').any(|seg| seg == ".." || seg.is_empty()) {
                return Err(XlsxPackError::Archive(format!(
                    "Unsafe part path in package {:?}: {c_path:?}",
                    package.file_name
                )));
            }
            let path_file_part = path_dir_package.join(c_path);
            if let Some(path_parent) = path_file_part.parent() {
                fs::create_dir_all(path_parent)?;
            }
            fs::write(&path_file_part, v_bytes)?;
        }
        log::info!("staged package: {}", path_dir_package.display());
        Ok(path_dir_package)
    }
}

// #endregion
////////////////////////////////////////////////////////////////////////////////
// #region MemoryArchiver

/// Keeps packages in memory; the returned path is the bare file name.
#[derive(Debug, Clone, Default)]
pub struct MemoryArchiver {
    l_packages: Vec<SpecPackage>,
}

impl MemoryArchiver {
    /// Empty archiver.
    pub fn new() -> Self {
        Self::default()
    }

    /// Packages received so far, in archive order.
    pub fn packages(&self) -> &[SpecPackage] {
        &self.l_packages
    }

    /// Take ownership of the collected packages.
    pub fn into_packages(self) -> Vec<SpecPackage> {
        self.l_packages
    }
}

impl Archiver for MemoryArchiver {
    fn archive(&mut self, package: &SpecPackage) -> Result<PathBuf> {
        self.l_packages.push(package.clone());
        Ok(PathBuf::from(&package.file_name))
    }
}

// #endregion
////////////////////////////////////////////////////////////////////////////////
