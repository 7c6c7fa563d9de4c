//! End-to-end: real 7z archive, CSV parsing and file-backed history

use pocf_core::prelude::*;
use pocf_test_utils::{init_tracing, sample_header, sample_rows};
use std::fs;
use std::path::Path;

fn config_in(root: &Path) -> PocfConfig {
    PocfConfig::new()
        .with_extract_dir(root.join("loaded"))
        .with_created_manifest_dir(root.join("manifests"))
        .with_history_path(root.join("state").join("history.json"))
        .with_preview_rows(5)
}

#[tokio::test]
async fn save_and_reopen_from_disk() {
    init_tracing();
    let dir = tempfile::tempdir().unwrap();
    let vendor = dir.path().join("vendor.csv");
    let mut csv = String::from("SKU,Desc,Dept\n");
    for i in 0..50 {
        csv.push_str(&format!("{i},item {i},7\n"));
    }
    fs::write(&vendor, csv).unwrap();
    let vendor = vendor.to_string_lossy().into_owned();
    let archive = dir.path().join("orders").join("spring.pocf");

    let mut ctl = PersistenceController::from_config(config_in(dir.path())).unwrap();
    ctl.replace_header(sample_header());
    assert_eq!(ctl.attach_paths([vendor.clone()]), 1);

    let state = ctl.request_parse(&vendor).await.unwrap();
    let ParseState::Parsed(parsed) = state else {
        panic!("expected parsed, got {state:?}");
    };
    assert_eq!(parsed.rows.len(), 5);
    assert_eq!(parsed.total_rows, 50);

    ctl.set_mapping(&vendor, TemplateField::ItemNumber, "SKU").unwrap();
    ctl.set_mapping(&vendor, TemplateField::Description, "Desc").unwrap();
    ctl.set_mapping(&vendor, TemplateField::Department, "Dept").unwrap();
    ctl.replace_created_manifest(sample_rows());

    ctl.save_to_file(&archive).await.unwrap();
    assert!(archive.is_file());
    assert!(ctl.is_archive_path(&archive));

    // A fresh controller sees the same history and can reopen the file
    let mut reopened = PersistenceController::from_config(config_in(dir.path())).unwrap();
    let history = reopened.history().load_all().await.unwrap().to_vec();
    assert_eq!(history.len(), 1);
    assert_eq!(history[0].file_path, archive);
    assert_eq!(history[0].po_number, 42);

    reopened.load_from_file(&archive).await.unwrap();
    let doc = reopened.document();
    assert_eq!(doc.header(), &sample_header());
    assert_eq!(doc.files().len(), 2);
    assert!(doc.files().iter().all(AttachedFile::is_manifest));

    // Paths now point into the extraction directory
    let extracted = &doc.files()[0];
    assert_eq!(extracted.filename, "vendor.csv");
    assert!(Path::new(&extracted.path).starts_with(dir.path().join("loaded")));
    assert!(Path::new(&extracted.path).is_file());

    let restored = doc.mappings().get(&extracted.path).unwrap();
    assert_eq!(restored.column_for(TemplateField::ItemNumber), Some("SKU"));
    assert!(restored.missing_required().is_empty());

    // The exported item table is a real CSV with the template header
    let created = &doc.files()[1];
    assert!(created.filename.starts_with("created_manifest_"));
    let text = fs::read_to_string(&created.path).unwrap();
    assert!(text.starts_with("Item Number,UPC,Description"));
    assert_eq!(text.lines().count(), 3);

    // Extracted copies parse like the source files
    let extracted_path = extracted.path.clone();
    let state = reopened.request_parse(&extracted_path).await.unwrap();
    assert!(matches!(state, ParseState::Parsed(p) if p.total_rows == 50));
    assert!(!reopened.has_unsaved_changes());
}

#[tokio::test]
async fn same_named_manifests_keep_their_own_data_and_mapping() {
    init_tracing();
    let dir = tempfile::tempdir().unwrap();
    let mut paths = Vec::new();
    for (folder, body) in [("a", "SKU\n1\n"), ("b", "ITEM\n2\n")] {
        let path = dir.path().join(folder).join("vendor.csv");
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(&path, body).unwrap();
        paths.push(path.to_string_lossy().into_owned());
    }
    let archive = dir.path().join("twins.pocf");

    let mut ctl = PersistenceController::from_config(config_in(dir.path())).unwrap();
    ctl.replace_header(sample_header());
    assert_eq!(ctl.attach_paths(paths.clone()), 2);
    ctl.set_mapping(&paths[0], TemplateField::ItemNumber, "SKU").unwrap();
    ctl.set_mapping(&paths[1], TemplateField::ItemNumber, "ITEM").unwrap();
    ctl.save_to_file(&archive).await.unwrap();

    ctl.new_document();
    ctl.load_from_file(&archive).await.unwrap();
    let doc = ctl.document();
    assert_eq!(doc.files().len(), 2);
    assert_eq!(doc.mappings().len(), 2);

    let mut seen = Vec::new();
    for file in doc.files() {
        assert_eq!(file.filename, "vendor.csv");
        let column = doc
            .mappings()
            .get(&file.path)
            .unwrap()
            .column_for(TemplateField::ItemNumber)
            .unwrap()
            .to_string();
        let header = fs::read_to_string(&file.path)
            .unwrap()
            .lines()
            .next()
            .unwrap()
            .to_string();
        assert_eq!(column, header);
        seen.push(column);
    }
    assert_eq!(seen, vec!["SKU", "ITEM"]);
}

#[tokio::test]
async fn unreadable_archive_is_a_load_failure() {
    init_tracing();
    let dir = tempfile::tempdir().unwrap();
    let bogus = dir.path().join("bogus.pocf");
    fs::write(&bogus, b"not an archive").unwrap();

    let mut ctl = PersistenceController::from_config(config_in(dir.path())).unwrap();
    ctl.replace_header(sample_header().with_po_number(7));

    let err = ctl.load_from_file(&bogus).await.unwrap_err();
    assert!(matches!(err, PocfError::LoadFailed { .. }));
    assert_eq!(ctl.document().header().po_number, 7);
}

#[tokio::test]
async fn corrupt_history_file_reads_as_empty() {
    init_tracing();
    let dir = tempfile::tempdir().unwrap();
    let config = config_in(dir.path());
    fs::create_dir_all(config.history_path.parent().unwrap()).unwrap();
    fs::write(&config.history_path, "[{\"broken\":").unwrap();

    let mut ctl = PersistenceController::from_config(config.clone()).unwrap();
    assert!(ctl.history().load_all().await.unwrap().is_empty());
    assert!(!config.history_path.exists());
}
