//! End-to-end export tests against the in-memory store

use ntds_export::{
    ColumnDescriptor, ColumnType, CodePage, ExportError, ExportFormat, Exporter, MemoryStore,
    MemoryValue,
};
use tempfile::tempdir;

fn unicode(id: u32, name: &str, column_type: ColumnType) -> ColumnDescriptor {
    ColumnDescriptor::new(id, name, column_type).with_code_page(CodePage::Unicode)
}

/// A small store shaped like a real one: parent id, text, binary and the
/// unreadable link column
fn sample_store() -> MemoryStore {
    let mut store = MemoryStore::new();
    store.add_table(
        "datatable",
        vec![
            ColumnDescriptor::new(1, "DNT_col", ColumnType::Long),
            ColumnDescriptor::new(2, "PDNT_col", ColumnType::Long),
            unicode(3, "ATTm3", ColumnType::LongText),
            ColumnDescriptor::new(4, "ATTk589914", ColumnType::LongBinary),
            ColumnDescriptor::new(5, "ATTq131091", ColumnType::LongLong),
        ],
    );
    store.push_row(
        "datatable",
        vec![
            MemoryValue::I32(1),
            MemoryValue::Absent,
            MemoryValue::Absent,
            MemoryValue::Absent,
            MemoryValue::Absent,
        ],
    );
    store.push_row(
        "datatable",
        vec![
            MemoryValue::I32(2),
            MemoryValue::I32(1),
            MemoryValue::unicode("Administrator\0\0\0"),
            MemoryValue::Binary(vec![0xab, 0x00, 0xff]),
            MemoryValue::I64(-1),
        ],
    );

    store.add_table(
        "link_table",
        vec![
            ColumnDescriptor::new(1, "link_DNT", ColumnType::Long),
            ColumnDescriptor::new(2, "backlink_DNT", ColumnType::Long),
            ColumnDescriptor::new(3, "link_data_v2", ColumnType::LongBinary),
            ColumnDescriptor::new(4, "link_base", ColumnType::Long),
        ],
    );
    store.push_row(
        "link_table",
        vec![
            MemoryValue::I32(2),
            MemoryValue::I32(3),
            MemoryValue::Binary(vec![1, 2, 3]),
            MemoryValue::I32(0),
        ],
    );
    store
}

#[test]
fn test_scenario_int_text_blob() {
    let mut store = MemoryStore::new();
    store.add_table(
        "datatable",
        vec![
            ColumnDescriptor::new(1, "id", ColumnType::Long),
            unicode(2, "name", ColumnType::Text),
            ColumnDescriptor::new(3, "blob", ColumnType::Binary),
        ],
    );
    store.push_row(
        "datatable",
        vec![
            MemoryValue::I32(5),
            MemoryValue::unicode("A\u{0}\u{0}"),
            MemoryValue::Binary(vec![0xDE, 0xAD]),
        ],
    );
    store.add_table("link_table", vec![ColumnDescriptor::new(1, "link_DNT", ColumnType::Long)]);

    let dir = tempdir().unwrap();
    let exporter = Exporter::new(&store).unwrap();

    exporter.export_tabular(dir.path()).unwrap();
    let content = std::fs::read_to_string(dir.path().join("datatable.csv")).unwrap();
    assert_eq!(content, "id\tname\tblob\n5\tA\tdead\n");

    exporter.export_document(dir.path()).unwrap();
    let json: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(dir.path().join("ntds.json")).unwrap())
            .unwrap();
    assert_eq!(
        json["datatable"][0],
        serde_json::json!({"id": "5", "name": "A", "blob": "dead"})
    );
    assert_eq!(json["linktable"], serde_json::json!([]));
}

#[test]
fn test_tabular_cell_counts_match_schema() {
    let store = sample_store();
    let dir = tempdir().unwrap();
    let exporter = Exporter::new(&store).unwrap();
    let summary = exporter.export_tabular(dir.path()).unwrap();

    assert_eq!(summary.tables[0].rows, 2);
    assert_eq!(summary.tables[1].rows, 1);
    assert_eq!(summary.outputs.len(), 2);

    for (file, columns) in [("datatable.csv", 5), ("linktable.csv", 4)] {
        let content = std::fs::read_to_string(dir.path().join(file)).unwrap();
        assert!(content.ends_with('\n'));
        for line in content.lines() {
            assert_eq!(line.split('\t').count(), columns, "{file}: {line:?}");
        }
    }

    let data = std::fs::read_to_string(dir.path().join("datatable.csv")).unwrap();
    let lines: Vec<&str> = data.lines().collect();
    assert_eq!(lines[0], "DNT_col\tPDNT_col\tATTm3\tATTk589914\tATTq131091");
    assert_eq!(lines[1], "1\t0\t\t\t");
    assert_eq!(lines[2], "2\t1\tAdministrator\tab00ff\t-1");

    let links = std::fs::read_to_string(dir.path().join("linktable.csv")).unwrap();
    assert_eq!(links, "link_DNT\tbacklink_DNT\tlink_data_v2\tlink_base\n2\t3\t\t0\n");
    assert_eq!(summary.stats.bytes_written, (data.len() + links.len()) as u64);
}

#[test]
fn test_document_omits_empty_fields() {
    let store = sample_store();
    let dir = tempdir().unwrap();
    let summary = Exporter::new(&store)
        .unwrap()
        .export_document(dir.path())
        .unwrap();
    assert_eq!(summary.outputs, vec![dir.path().join("ntds.json")]);

    let text = std::fs::read_to_string(dir.path().join("ntds.json")).unwrap();
    assert!(!text.contains("\"\""));
    assert!(text.starts_with("{\n  \"datatable\": ["));

    let json: serde_json::Value = serde_json::from_str(&text).unwrap();
    assert_eq!(json["datatable"][0], serde_json::json!({"DNT_col": "1", "PDNT_col": "0"}));
    assert_eq!(json["datatable"][1]["ATTm3"], "Administrator");
    assert_eq!(
        json["linktable"][0],
        serde_json::json!({"link_DNT": "2", "backlink_DNT": "3", "link_base": "0"})
    );

    // Field order follows the schema, not the alphabet
    let first = text.find("\"DNT_col\"").unwrap();
    let second = text.find("\"PDNT_col\"").unwrap();
    assert!(first < second);
    assert_eq!(summary.stats.rows, 3);
    assert_eq!(summary.stats.fields, 2 + 5 + 3);
}

#[test]
fn test_nil_parent_id_renders_zero_in_both_modes() {
    let mut store = MemoryStore::new();
    store.add_table(
        "datatable",
        vec![
            ColumnDescriptor::new(1, "PDNT_col", ColumnType::Long),
            ColumnDescriptor::new(2, "DNT_col", ColumnType::Long),
        ],
    );
    store.push_row("datatable", vec![MemoryValue::Nil, MemoryValue::I32(2)]);
    store.add_table("link_table", vec![ColumnDescriptor::new(1, "link_DNT", ColumnType::Long)]);

    let dir = tempdir().unwrap();
    let exporter = Exporter::new(&store).unwrap();
    exporter.export(ExportFormat::Csv, dir.path()).unwrap();
    exporter.export(ExportFormat::Json, dir.path()).unwrap();

    let csv = std::fs::read_to_string(dir.path().join("datatable.csv")).unwrap();
    assert_eq!(csv, "PDNT_col\tDNT_col\n0\t2\n");
    let json: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(dir.path().join("ntds.json")).unwrap())
            .unwrap();
    assert_eq!(json["datatable"][0]["PDNT_col"], "0");
}

#[test]
fn test_binary_columns_render_lowercase_hex() {
    let store = sample_store();
    let dir = tempdir().unwrap();
    Exporter::new(&store)
        .unwrap()
        .export_tabular(dir.path())
        .unwrap();

    let data = std::fs::read_to_string(dir.path().join("datatable.csv")).unwrap();
    for line in data.lines().skip(1) {
        let cell = line.split('\t').nth(3).unwrap();
        assert_eq!(cell.len() % 2, 0);
        assert!(cell.chars().all(|c| matches!(c, '0'..='9' | 'a'..='f')));
    }
    assert!(data.contains("ab00ff"));
}

#[test]
fn test_export_is_idempotent() {
    let store = sample_store();
    let first = tempdir().unwrap();
    let second = tempdir().unwrap();
    let exporter = Exporter::new(&store).unwrap();

    for dir in [&first, &second] {
        exporter.export_tabular(dir.path()).unwrap();
        exporter.export_document(dir.path()).unwrap();
    }

    for file in ["datatable.csv", "linktable.csv", "ntds.json"] {
        let a = std::fs::read(first.path().join(file)).unwrap();
        let b = std::fs::read(second.path().join(file)).unwrap();
        assert_eq!(a, b, "{file} differs between runs");
    }
}

#[test]
fn test_missing_table_fails_before_output() {
    let mut store = MemoryStore::new();
    store.add_table("datatable", vec![ColumnDescriptor::new(1, "DNT_col", ColumnType::Long)]);

    match Exporter::new(&store) {
        Err(ExportError::SchemaUnavailable { table, .. }) => assert_eq!(table, "link_table"),
        Err(e) => panic!("unexpected error {e}"),
        Ok(_) => panic!("expected SchemaUnavailable"),
    }
}

#[test]
fn test_table_without_columns_exports_header_only() {
    let mut store = MemoryStore::new();
    store.add_table("datatable", vec![ColumnDescriptor::new(1, "DNT_col", ColumnType::Long)]);
    store.push_row("datatable", vec![MemoryValue::I32(1)]);
    store.add_table("link_table", Vec::new());

    let dir = tempdir().unwrap();
    let exporter = Exporter::new(&store).unwrap();
    assert!(exporter.link_table_schema().is_empty());

    let summary = exporter.export_tabular(dir.path()).unwrap();
    assert_eq!(summary.tables[1].rows, 0);
    let links = std::fs::read_to_string(dir.path().join("linktable.csv")).unwrap();
    assert_eq!(links, "\n");

    exporter.export_document(dir.path()).unwrap();
    let json: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(dir.path().join("ntds.json")).unwrap())
            .unwrap();
    assert_eq!(json["datatable"][0], serde_json::json!({"DNT_col": "1"}));
    assert_eq!(json["linktable"], serde_json::json!([]));
}

#[test]
fn test_unsupported_column_aborts_export() {
    let mut store = sample_store();
    store.add_table(
        "link_table",
        vec![
            ColumnDescriptor::new(1, "link_DNT", ColumnType::Long),
            ColumnDescriptor::new(9, "link_slv", ColumnType::Unsupported(13)),
        ],
    );
    store.push_row("link_table", vec![MemoryValue::I32(1), MemoryValue::Absent]);

    let dir = tempdir().unwrap();
    let err = Exporter::new(&store)
        .unwrap()
        .export_document(dir.path())
        .unwrap_err();
    match err {
        ExportError::UnsupportedColumnType { column, column_id, tag } => {
            assert_eq!(column, "link_slv");
            assert_eq!(column_id, 9);
            assert_eq!(tag, 13);
        }
        other => panic!("unexpected error {other}"),
    }
    assert!(!dir.path().join("ntds.json").exists());
}
