//! Per-chunk package assembly: the fixed set of XML parts, built in memory.

use std::collections::BTreeMap;
use std::fmt::Write as _;

use crate::conf::{
    C_CT_RELATIONSHIPS, C_CT_SHARED_STRINGS, C_CT_WORKBOOK, C_CT_WORKSHEET, C_CT_XML,
    C_NS_CONTENT_TYPES, C_NS_OFFICE_RELS, C_NS_PACKAGE_RELS, C_NS_SPREADSHEET_MAIN,
    C_PATH_CONTENT_TYPES, C_PATH_ROOT_RELS, C_PATH_SHARED_STRINGS, C_PATH_WORKBOOK,
    C_PATH_WORKBOOK_RELS, C_PATH_WORKSHEET, C_REL_TYPE_OFFICE_DOCUMENT,
    C_REL_TYPE_SHARED_STRINGS, C_REL_TYPE_WORKSHEET, C_XML_DECLARATION,
};
use crate::sheet::render_worksheet_xml;
use crate::spec::{Result, SpecChunk, SpecPackage, SpecPackageSlice};
use crate::strings::SharedStringTable;
use crate::util::{escape_cell_text, escape_xml_text, if_needs_space_preserve};

/// Build every part of one package from one chunk.
///
/// The shared-string table is computed from this chunk alone; nothing is
/// carried over from other chunks.
pub fn assemble_package(
    chunk: &SpecChunk<'_>,
    file_name: &str,
    sheet_name: &str,
) -> Result<SpecPackage> {
    let table = SharedStringTable::from_chunk(chunk);
    let c_worksheet_xml = render_worksheet_xml(chunk.iter_rows(), &table)?;

    let mut dict_parts = BTreeMap::new();
    dict_parts.insert(
        C_PATH_CONTENT_TYPES.to_string(),
        render_content_types_xml().into_bytes(),
    );
    dict_parts.insert(
        C_PATH_ROOT_RELS.to_string(),
        render_root_rels_xml().into_bytes(),
    );
    dict_parts.insert(
        C_PATH_WORKBOOK.to_string(),
        render_workbook_xml(sheet_name).into_bytes(),
    );
    dict_parts.insert(
        C_PATH_WORKBOOK_RELS.to_string(),
        render_workbook_rels_xml().into_bytes(),
    );
    dict_parts.insert(
        C_PATH_SHARED_STRINGS.to_string(),
        render_shared_strings_xml(&table).into_bytes(),
    );
    dict_parts.insert(C_PATH_WORKSHEET.to_string(), c_worksheet_xml.into_bytes());

    log::debug!(
        "assembled package {file_name:?}: rows={} strings={}/{}",
        chunk.height_data() + 1,
        table.total_occurrences(),
        table.unique_count()
    );

    Ok(SpecPackage {
        file_name: file_name.to_string(),
        parts: dict_parts,
        slice: SpecPackageSlice {
            file_name: file_name.to_string(),
            row_start_inclusive: chunk.row_start_inclusive,
            row_end_exclusive: chunk.row_end_exclusive,
            cnt_strings_total: table.total_occurrences(),
            cnt_strings_unique: table.unique_count(),
            path_out: None,
        },
    })
}

/// `[Content_Types].xml`.
pub fn render_content_types_xml() -> String {
    let mut out = String::with_capacity(1024);
    out.push_str(C_XML_DECLARATION);
    out.push('\n');
    let _ = write!(out, r#"<Types xmlns="{C_NS_CONTENT_TYPES}">"#);
    let _ = write!(
        out,
        r#"<Default Extension="rels" ContentType="{C_CT_RELATIONSHIPS}"/>"#
    );
    let _ = write!(out, r#"<Default Extension="xml" ContentType="{C_CT_XML}"/>"#);
    for (c_path, c_content_type) in [
        (C_PATH_WORKBOOK, C_CT_WORKBOOK),
        (C_PATH_WORKSHEET, C_CT_WORKSHEET),
        (C_PATH_SHARED_STRINGS, C_CT_SHARED_STRINGS),
    ] {
        let _ = write!(
            out,
            r#"<Override PartName="/{c_path}" ContentType="{c_content_type}"/>"#
        );
    }
    out.push_str("</Types>");
    out
}

/// `_rels/.rels`.
pub fn render_root_rels_xml() -> String {
    let mut out = String::with_capacity(512);
    out.push_str(C_XML_DECLARATION);
    out.push('\n');
    let _ = write!(
        out,
        r#"<Relationships xmlns="{C_NS_PACKAGE_RELS}"><Relationship Id="rId1" Type="{C_REL_TYPE_OFFICE_DOCUMENT}" Target="{C_PATH_WORKBOOK}"/></Relationships>"#
    );
    out
}

/// `xl/workbook.xml` with a single sheet.
pub fn render_workbook_xml(sheet_name: &str) -> String {
    let mut out = String::with_capacity(512);
    out.push_str(C_XML_DECLARATION);
    out.push('\n');
    let _ = write!(
        out,
        r#"<workbook xmlns="{C_NS_SPREADSHEET_MAIN}" xmlns:r="{C_NS_OFFICE_RELS}"><sheets><sheet name="{}" sheetId="1" r:id="rId1"/></sheets></workbook>"#,
        escape_xml_text(sheet_name)
    );
    out
}

/// `xl/_rels/workbook.xml.rels`.
pub fn render_workbook_rels_xml() -> String {
    let mut out = String::with_capacity(512);
    out.push_str(C_XML_DECLARATION);
    out.push('\n');
    let _ = write!(
        out,
        r#"<Relationships xmlns="{C_NS_PACKAGE_RELS}"><Relationship Id="rId1" Type="{C_REL_TYPE_WORKSHEET}" Target="worksheets/sheet1.xml"/><Relationship Id="rId2" Type="{C_REL_TYPE_SHARED_STRINGS}" Target="sharedStrings.xml"/></Relationships>"#
    );
    out
}

/// `xl/sharedStrings.xml` with declared `count` and `uniqueCount`.
pub fn render_shared_strings_xml(table: &SharedStringTable) -> String {
    let mut out = String::with_capacity(256 + table.unique_count() * 16);
    out.push_str(C_XML_DECLARATION);
    out.push('\n');
    let _ = write!(
        out,
        r#"<sst xmlns="{C_NS_SPREADSHEET_MAIN}" count="{}" uniqueCount="{}">"#,
        table.total_occurrences(),
        table.unique_count()
    );
    for value in table.ordered_entries() {
        if if_needs_space_preserve(value) {
            out.push_str(r#"<si><t xml:space="preserve">"#);
        } else {
            out.push_str("<si><t>");
        }
        out.push_str(&escape_cell_text(value));
        out.push_str("</t></si>");
    }
    out.push_str("</sst>");
    out
}
