mod common;

use common::synthetic_sheet::SheetSpec;
use grade_grid::batch::{collect_image_paths, grade_paths, grade_paths_with, BatchSummary};
use grade_grid::image::io::save_gray_png;
use grade_grid::report::{
    apply_ground_truth, load_ground_truth, write_csv_report, write_json_report,
};
use grade_grid::{GradeParams, GradeReader, MarkStatus, NoFiducial, PageError, PageResult};
use std::fs;
use std::path::PathBuf;
use std::sync::atomic::{AtomicUsize, Ordering};

fn write_sheets(dir: &std::path::Path) -> Vec<PathBuf> {
    let sheets = [
        ("a_graded.png", SheetSpec::marked(12, 1)),
        ("b_blank.png", SheetSpec::default()),
        ("c_graded.png", SheetSpec::marked(4, 3)),
    ];
    sheets
        .iter()
        .map(|(name, spec)| {
            let path = dir.join(name);
            save_gray_png(&spec.render_gray(), &path).expect("write sheet");
            path
        })
        .collect()
}

#[test]
fn batch_reports_every_page_in_order() {
    common::init_logging();
    let dir = tempfile::tempdir().unwrap();
    write_sheets(dir.path());
    fs::write(dir.path().join("readme.txt"), "not an image").unwrap();

    let mut inputs = vec![dir.path().to_path_buf()];
    inputs.push(dir.path().join("missing.png"));
    let paths = collect_image_paths(&inputs).unwrap();
    assert_eq!(paths.len(), 4);

    let reader = GradeReader::with_locator(GradeParams::default(), NoFiducial).unwrap();
    let results = grade_paths(&reader, &paths);
    let names: Vec<&str> = results.iter().map(|r| r.filename.as_str()).collect();
    assert_eq!(
        names,
        vec!["a_graded.png", "b_blank.png", "c_graded.png", "missing.png"]
    );
    assert_eq!(results[0].note_detected, Some(12.25));
    assert_eq!(results[1].status_int, MarkStatus::NoMark);
    assert_eq!(results[1].error, Some(PageError::NoReliableNote));
    assert_eq!(results[2].note_detected, Some(4.75));
    assert_eq!(results[3].error, Some(PageError::ImageNotFound));
    assert_eq!(results[3].status_int, MarkStatus::NotProcessed);

    let truth_path = dir.path().join("truth.json");
    fs::write(
        &truth_path,
        r#"{ "a_graded.png": 12.25, "b_blank.png": 8.0, "c_graded.png": 5.0 }"#,
    )
    .unwrap();
    let results = apply_ground_truth(results, &load_ground_truth(&truth_path).unwrap());
    assert_eq!(results[0].correct, Some(true));
    assert_eq!(results[1].correct, None);
    assert_eq!(results[2].correct, Some(false));

    let summary = BatchSummary::from_results(&results);
    assert_eq!(summary.total, 4);
    assert_eq!(summary.graded, 2);
    assert_eq!(summary.failed, 2);
    assert_eq!(summary.accuracy(), Some(0.5));

    let out = dir.path().join("out");
    let csv_path = out.join("grades.csv");
    let json_path = out.join("grades.json");
    write_csv_report(&csv_path, &results).unwrap();
    write_json_report(&json_path, &results).unwrap();

    let csv = fs::read_to_string(&csv_path).unwrap();
    let rows: Vec<&str> = csv.lines().collect();
    assert_eq!(rows.len(), 5);
    assert!(rows[0].starts_with("filename,valid_grid,status_int"));
    assert_eq!(
        rows[1],
        "a_graded.png,true,single_candidate,single_candidate,12,1,12.25,,12.25,true"
    );
    assert!(rows[4].starts_with("missing.png,false,not_processed,not_processed,"));

    let back: Vec<PageResult> =
        serde_json::from_str(&fs::read_to_string(&json_path).unwrap()).unwrap();
    assert_eq!(back, results);
}

#[test]
fn trace_sink_sees_every_page() {
    let dir = tempfile::tempdir().unwrap();
    let paths = write_sheets(dir.path());
    let reader = GradeReader::with_locator(GradeParams::default(), NoFiducial).unwrap();

    let seen = AtomicUsize::new(0);
    let results = grade_paths_with(&reader, &paths, |_, detailed| {
        assert!(detailed.trace.mask.is_some());
        assert_eq!(detailed.trace.sections.len(), 2);
        seen.fetch_add(1, Ordering::SeqCst);
        Ok(())
    });
    assert_eq!(seen.load(Ordering::SeqCst), 3);
    assert_eq!(results.len(), 3);
}
