use std::fs::File;
use std::io::Read;
use std::path::Path;

use axiomkit_xlsx_pack::{
    C_PATH_CONTENT_TYPES, C_PATH_SHARED_STRINGS, C_PATH_WORKSHEET, EnumCell, SpecDataset,
    SpecXlsxPackOptions, TUP_PACKAGE_PART_PATHS, XlsxPackError, XlsxPackWriter, ZipArchiver,
    convert_dataset_to_packages, derive_default_xlsx_pack_options, derive_zip_bytes,
};
use pretty_assertions::assert_eq;

fn row(a: f64, b: &str) -> Vec<EnumCell> {
    vec![EnumCell::number(a).unwrap(), EnumCell::text(b)]
}

fn header() -> Vec<EnumCell> {
    vec![EnumCell::text("A"), EnumCell::text("B")]
}

fn read_part(path_xlsx: &Path, c_part: &str) -> String {
    let mut archive = zip::ZipArchive::new(File::open(path_xlsx).unwrap()).unwrap();
    let mut c_text = String::new();
    archive
        .by_name(c_part)
        .unwrap()
        .read_to_string(&mut c_text)
        .unwrap();
    c_text
}

fn extract_shared_strings(xml: &str) -> Vec<String> {
    xml.split("<si><t>")
        .skip(1)
        .map(|seg| seg.split("</t></si>").next().unwrap().to_string())
        .collect()
}

fn extract_sheet_rows(xml: &str) -> Vec<String> {
    xml.split("<row ")
        .skip(1)
        .map(|seg| {
            let c_row = seg.split("</row>").next().unwrap();
            format!("<row {c_row}</row>")
        })
        .collect()
}

#[test]
fn test_single_package_orders_strings_by_frequency() {
    let dataset = SpecDataset::new(vec![
        header(),
        row(1.1, "TEST1"),
        row(1.2, "TEST2"),
        row(1.3, "TEST1"),
    ]);
    let tmp = tempfile::tempdir().unwrap();
    let mut writer = XlsxPackWriter::new(
        ZipArchiver::new(tmp.path()),
        "out",
        SpecXlsxPackOptions::default(),
    )
    .unwrap();

    let report = writer.write_dataset(&dataset).unwrap();
    assert_eq!(report.packages.len(), 1);
    let slice = &report.packages[0];
    assert_eq!(slice.file_name, "out");
    assert_eq!((slice.cnt_strings_total, slice.cnt_strings_unique), (5, 4));

    let path_xlsx = tmp.path().join("out.xlsx");
    assert_eq!(slice.path_out.as_deref(), Some(path_xlsx.as_path()));

    let sst = read_part(&path_xlsx, C_PATH_SHARED_STRINGS);
    assert!(sst.contains(r#"count="5" uniqueCount="4""#));
    assert_eq!(
        extract_shared_strings(&sst),
        vec!["TEST1", "A", "B", "TEST2"]
    );

    let sheet = read_part(&path_xlsx, C_PATH_WORKSHEET);
    assert!(sheet.contains(
        r#"<row r="1"><c r="A1" t="s"><v>1</v></c><c r="B1" t="s"><v>2</v></c></row>"#
    ));
    assert!(sheet.contains(
        r#"<row r="2"><c r="A2" t="n"><v>1.1</v></c><c r="B2" t="s"><v>0</v></c></row>"#
    ));
    assert!(sheet.contains(
        r#"<row r="3"><c r="A3" t="n"><v>1.2</v></c><c r="B3" t="s"><v>3</v></c></row>"#
    ));
    assert!(sheet.contains(
        r#"<row r="4"><c r="A4" t="n"><v>1.3</v></c><c r="B4" t="s"><v>0</v></c></row>"#
    ));

    let archive = zip::ZipArchive::new(File::open(&path_xlsx).unwrap()).unwrap();
    let mut l_names: Vec<&str> = archive.file_names().collect();
    l_names.sort();
    let mut l_expected = TUP_PACKAGE_PART_PATHS.to_vec();
    l_expected.sort();
    assert_eq!(l_names, l_expected);
}

#[test]
fn test_row_limit_splits_into_numbered_files_with_local_tables() {
    let dataset = SpecDataset::new(vec![
        header(),
        row(1.1, "TEST1"),
        row(1.2, "TEST2"),
        row(1.3, "TEST1"),
        row(1.4, "TEST1"),
        row(1.5, "TEST1"),
    ]);
    let tmp = tempfile::tempdir().unwrap();
    let mut writer = XlsxPackWriter::new(
        ZipArchiver::new(tmp.path()),
        "out",
        SpecXlsxPackOptions {
            row_limit: Some(2),
            exceed_strategy: "files".parse().unwrap(),
            ..Default::default()
        },
    )
    .unwrap();

    let report = writer.write_dataset(&dataset).unwrap();
    let l_summary: Vec<_> = report
        .packages
        .iter()
        .map(|slice| {
            (
                slice.file_name.as_str(),
                slice.row_start_inclusive,
                slice.row_end_exclusive,
                slice.cnt_strings_total,
                slice.cnt_strings_unique,
            )
        })
        .collect();
    assert_eq!(
        l_summary,
        vec![
            ("out1", 0, 2, 4, 4),
            ("out2", 2, 4, 4, 3),
            ("out3", 4, 5, 3, 3),
        ]
    );

    // Every chunk repeats the header and carries only its own strings.
    let read_package = |c_name: &str| {
        let path_xlsx = tmp.path().join(format!("{c_name}.xlsx"));
        (
            extract_shared_strings(&read_part(&path_xlsx, C_PATH_SHARED_STRINGS)),
            extract_sheet_rows(&read_part(&path_xlsx, C_PATH_WORKSHEET)),
        )
    };

    let (l_strings_1, l_rows_1) = read_package("out1");
    assert_eq!(l_strings_1, vec!["A", "B", "TEST1", "TEST2"]);
    assert_eq!(
        l_rows_1,
        vec![
            r#"<row r="1"><c r="A1" t="s"><v>0</v></c><c r="B1" t="s"><v>1</v></c></row>"#,
            r#"<row r="2"><c r="A2" t="n"><v>1.1</v></c><c r="B2" t="s"><v>2</v></c></row>"#,
            r#"<row r="3"><c r="A3" t="n"><v>1.2</v></c><c r="B3" t="s"><v>3</v></c></row>"#,
        ]
    );

    let (l_strings_2, l_rows_2) = read_package("out2");
    assert_eq!(l_strings_2, vec!["TEST1", "A", "B"]);
    assert_eq!(
        l_rows_2,
        vec![
            r#"<row r="1"><c r="A1" t="s"><v>1</v></c><c r="B1" t="s"><v>2</v></c></row>"#,
            r#"<row r="2"><c r="A2" t="n"><v>1.3</v></c><c r="B2" t="s"><v>0</v></c></row>"#,
            r#"<row r="3"><c r="A3" t="n"><v>1.4</v></c><c r="B3" t="s"><v>0</v></c></row>"#,
        ]
    );

    let (l_strings_3, l_rows_3) = read_package("out3");
    assert_eq!(l_strings_3, vec!["A", "B", "TEST1"]);
    assert_eq!(
        l_rows_3,
        vec![
            r#"<row r="1"><c r="A1" t="s"><v>0</v></c><c r="B1" t="s"><v>1</v></c></row>"#,
            r#"<row r="2"><c r="A2" t="n"><v>1.5</v></c><c r="B2" t="s"><v>2</v></c></row>"#,
        ]
    );
    assert!(!tmp.path().join("out.xlsx").exists());
}

#[test]
fn test_width_mismatch_fails_without_output() {
    let dataset = SpecDataset::new(vec![
        header(),
        row(1.1, "TEST1"),
        vec![EnumCell::number(1.2).unwrap()],
        row(1.3, "TEST1"),
    ]);
    let tmp = tempfile::tempdir().unwrap();
    let path_dir_out = tmp.path().join("out_dir");
    let mut writer = XlsxPackWriter::new(
        ZipArchiver::new(&path_dir_out),
        "out",
        SpecXlsxPackOptions {
            row_limit: Some(1),
            ..Default::default()
        },
    )
    .unwrap();

    let err = writer.write_dataset(&dataset).unwrap_err();
    assert!(matches!(
        err,
        XlsxPackError::MalformedRow {
            row_idx: 2,
            width_expected: 2,
            width_actual: 1
        }
    ));
    assert!(!path_dir_out.exists());
    assert!(writer.report().is_empty());
}

#[test]
fn test_identical_input_gives_identical_archives() {
    let dataset = SpecDataset::new(vec![
        header(),
        row(0.5, "x & y"),
        row(2.0, " lead"),
        row(3.25, "x & y"),
    ]);
    let options = SpecXlsxPackOptions {
        row_limit: Some(2),
        ..Default::default()
    };

    let l_first = convert_dataset_to_packages(&dataset, "d", &options).unwrap();
    let l_second = convert_dataset_to_packages(&dataset, "d", &options).unwrap();
    assert_eq!(l_first, l_second);
    for (first, second) in l_first.iter().zip(&l_second) {
        assert_eq!(
            derive_zip_bytes(first).unwrap(),
            derive_zip_bytes(second).unwrap()
        );
    }

    let sst = l_first[0].part_text(C_PATH_SHARED_STRINGS).unwrap();
    assert!(sst.contains("<si><t>x &amp; y</t></si>"));
    assert!(sst.contains(r#"<si><t xml:space="preserve"> lead</t></si>"#));
    let sst = l_first[1].part_text(C_PATH_SHARED_STRINGS).unwrap();
    assert!(sst.contains(r#"count="3" uniqueCount="3""#));
    assert!(l_first[0].part_text(C_PATH_CONTENT_TYPES).is_some());
}

#[test]
fn test_unknown_exceed_strategy_is_a_configuration_error() {
    let err = "sheets"
        .parse::<axiomkit_xlsx_pack::EnumExceedStrategy>()
        .unwrap_err();
    assert!(matches!(err, XlsxPackError::Configuration(_)));
}

#[test]
fn test_invalid_number_literal_fails_without_output() {
    let dataset = SpecDataset::new(vec![
        header(),
        row(1.1, "TEST1"),
        vec![
            EnumCell::Number("1</v></c><c>".to_string()),
            EnumCell::text("TEST2"),
        ],
    ]);
    let tmp = tempfile::tempdir().unwrap();
    let path_dir_out = tmp.path().join("out_dir");
    let mut writer = XlsxPackWriter::new(
        ZipArchiver::new(&path_dir_out),
        "out",
        SpecXlsxPackOptions::default(),
    )
    .unwrap();
    assert_eq!(writer.archiver().dir_out(), path_dir_out.as_path());

    let err = writer.write_dataset(&dataset).unwrap_err();
    assert!(matches!(err, XlsxPackError::InvalidNumber(_)));
    assert!(!path_dir_out.exists());
}

#[test]
fn test_exponent_literals_are_kept_verbatim() {
    let dataset = SpecDataset::new(vec![
        header(),
        vec![
            EnumCell::number_literal("1e-07").unwrap(),
            EnumCell::text("small"),
        ],
        vec![
            EnumCell::number_literal("1e+300").unwrap(),
            EnumCell::text("large"),
        ],
    ]);
    let l_packages =
        convert_dataset_to_packages(&dataset, "e", &derive_default_xlsx_pack_options()).unwrap();

    let sheet = l_packages[0].part_text(C_PATH_WORKSHEET).unwrap();
    assert!(sheet.contains(r#"<c r="A2" t="n"><v>1e-07</v></c>"#));
    assert!(sheet.contains(r#"<c r="A3" t="n"><v>1e+300</v></c>"#));
}
