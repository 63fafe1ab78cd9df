// End-to-end: metric table on disk -> report document and markdown file
use edge_bench::{read_table, BenchError, MetricKind, ReportConfig, ReportGenerator, TableSchema};
use std::fs;

const TABLE: &str = "frame,fps,cpu,ram,temp,detections
1,30.0,10.0,40.0,50.0,2
2,28.0,12.0,41.0,50.5,1
3,32.0,11.0,40.5,51.0,3
";

#[test]
fn test_table_to_report() {
    let dir = tempfile::tempdir().unwrap();
    let csv_path = dir.path().join("yolo11n.csv");
    fs::write(&csv_path, TABLE).unwrap();

    let table = read_table(&csv_path).unwrap();
    assert_eq!(table.schema, TableSchema::Full);

    let generator = ReportGenerator::new(ReportConfig::new().with_model_name("yolo11n")).unwrap();
    let report_path = dir.path().join("yolo11n_report.md");
    let doc = generator.generate(&table.records, &report_path).unwrap();

    assert_eq!(doc.summary.record_count, 3);
    assert_eq!(doc.summary.fps.avg, 30.0);
    assert_eq!(doc.summary.fps.min, 28.0);
    assert_eq!(doc.summary.fps.max, 32.0);
    assert_eq!(doc.summary.total_detections, Some(6));

    let md = fs::read_to_string(&report_path).unwrap();
    assert_eq!(md, doc.to_markdown());
    assert!(md.contains("| **Average FPS** | 30.00 |"));
    assert!(md.contains("| **Min FPS** | 28.00 |"));
    assert!(md.contains("| **Max FPS** | 32.00 |"));
    assert!(md.contains("| **Total Detections** | 6 |"));
    for title in [
        "## FPS Over Time",
        "## CPU Usage Over Time",
        "## RAM Usage Over Time",
        "## Temperature Over Time",
        "## Detections Per Frame",
    ] {
        assert!(md.contains(title), "missing section {}", title);
    }

    let fps_chart = &doc.section(MetricKind::Fps).unwrap().chart;
    assert_eq!(fps_chart.lines().count(), 10 + 3);
    assert!(fps_chart.text.ends_with("      Frame: 0 → 3\n"));
}

#[test]
fn test_quantized_table_to_report() {
    let dir = tempfile::tempdir().unwrap();
    let csv_path = dir.path().join("yolo8n_tflite.csv");
    fs::write(
        &csv_path,
        "frame,fps,cpu,ram,temp\n1,11.5,97.0,30.0,62.0\n2,12.5,96.0,30.5,62.5\n",
    )
    .unwrap();

    let table = read_table(&csv_path).unwrap();
    let generator = ReportGenerator::new(ReportConfig::new().with_model_name("yolo8n")).unwrap();
    let doc = generator
        .generate(&table.records, &dir.path().join("yolo8n_report.md"))
        .unwrap();

    assert_eq!(doc.summary.fps.avg, 12.0);
    assert_eq!(doc.sections.len(), 4);
    assert!(doc.summary.total_detections.is_none());
}

#[test]
fn test_header_only_table_is_empty_input() {
    let dir = tempfile::tempdir().unwrap();
    let csv_path = dir.path().join("empty.csv");
    fs::write(&csv_path, "frame,fps,cpu,ram,temp,detections\n").unwrap();

    let table = read_table(&csv_path).unwrap();
    let generator = ReportGenerator::new(ReportConfig::new()).unwrap();
    let result = generator.generate(&table.records, &dir.path().join("empty_report.md"));
    assert!(matches!(result, Err(BenchError::EmptyInput)));
}
