//! Metric table codec
//!
//! Reads and writes the flat CSV tables produced by benchmark runs. The header
//! decides the schema: `frame,fps,cpu,ram,temp,detections` for full-model runs
//! or `frame,fps,cpu,ram,temp` for quantized-model runs. Column order in the
//! input is free; only the names matter.

use crate::types::{BenchError, MetricRecord, Result, TableSchema};
use std::fs::{self, File};
use std::io::{Read, Write};
use std::path::{Path, PathBuf};
use std::str::FromStr;

/// A parsed metric table
#[derive(Debug, Clone, PartialEq)]
pub struct MetricTable {
    pub schema: TableSchema,
    pub records: Vec<MetricRecord>,
}

/// Positions of the known columns within a header
struct ColumnMap {
    frame: usize,
    fps: usize,
    cpu: usize,
    ram: usize,
    temp: usize,
    detections: Option<usize>,
}

impl ColumnMap {
    fn from_header(header: &csv::StringRecord) -> Result<Self> {
        let find = |name: &'static str| header.iter().position(|h| h.trim() == name);
        let require = |name: &'static str| find(name).ok_or(BenchError::MissingColumn(name));

        Ok(Self {
            frame: require("frame")?,
            fps: require("fps")?,
            cpu: require("cpu")?,
            ram: require("ram")?,
            temp: require("temp")?,
            detections: find("detections"),
        })
    }

    fn schema(&self) -> TableSchema {
        if self.detections.is_some() {
            TableSchema::Full
        } else {
            TableSchema::Quantized
        }
    }
}

impl MetricTable {
    /// Read a metric table from a CSV file
    pub fn read(path: &Path) -> Result<Self> {
        log::info!("Reading metric table: {:?}", path);
        let file = File::open(path)?;
        let table = Self::from_reader(file)?;
        log::debug!(
            "Read {} records ({} schema) from {:?}",
            table.records.len(),
            table.schema,
            path
        );
        Ok(table)
    }

    /// Parse a metric table from any reader
    ///
    /// # Errors
    /// * `BenchError::MissingColumn` if a required column is absent
    /// * `BenchError::Parse` if a field is not a valid (finite) number
    pub fn from_reader<R: Read>(reader: R) -> Result<Self> {
        let mut rdr = csv::ReaderBuilder::new()
            .has_headers(true)
            .trim(csv::Trim::All)
            .from_reader(reader);

        let columns = ColumnMap::from_header(rdr.headers()?)?;
        let schema = columns.schema();

        let mut records = Vec::new();
        for row in rdr.records() {
            let row = row?;
            let line = row.position().map(|p| p.line()).unwrap_or(0);

            records.push(MetricRecord {
                frame: field(&row, columns.frame, "frame", line)?,
                fps: number(&row, columns.fps, "fps", line)?,
                cpu: number(&row, columns.cpu, "cpu", line)?,
                ram: number(&row, columns.ram, "ram", line)?,
                temp: number(&row, columns.temp, "temp", line)?,
                detections: match columns.detections {
                    Some(idx) => Some(field(&row, idx, "detections", line)?),
                    None => None,
                },
            });
        }

        Ok(Self { schema, records })
    }
}

/// Parse one field of a row
fn field<T: FromStr>(row: &csv::StringRecord, idx: usize, column: &'static str, line: u64) -> Result<T> {
    let raw = row.get(idx).unwrap_or("");
    raw.parse().map_err(|_| BenchError::Parse {
        line,
        column,
        value: raw.to_string(),
    })
}

/// Parse a measurement column; `inf` and `NaN` are rejected
fn number(row: &csv::StringRecord, idx: usize, column: &'static str, line: u64) -> Result<f64> {
    let value: f64 = field(row, idx, column, line)?;
    if !value.is_finite() {
        return Err(BenchError::Parse {
            line,
            column,
            value: row.get(idx).unwrap_or("").to_string(),
        });
    }
    Ok(value)
}

/// Convenience wrapper around [`MetricTable::read`]
pub fn read_table(path: &Path) -> Result<MetricTable> {
    MetricTable::read(path)
}

/// Row-at-a-time writer for a benchmark's metric table
///
/// Every row is flushed as soon as it is written, so an interrupted run still
/// leaves a complete table of the frames it processed.
pub struct MetricWriter<W: Write> {
    writer: csv::Writer<W>,
    schema: TableSchema,
    rows: usize,
}

impl MetricWriter<File> {
    /// Create the table file (and its parent directory) and write the header
    pub fn create(path: &Path, schema: TableSchema) -> Result<Self> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }
        log::debug!("Creating metric table {:?} ({})", path, schema);
        Self::new(File::create(path)?, schema)
    }
}

impl<W: Write> MetricWriter<W> {
    /// Wrap a writer and emit the header for `schema`
    pub fn new(inner: W, schema: TableSchema) -> Result<Self> {
        let mut writer = csv::Writer::from_writer(inner);
        writer.write_record(schema.columns())?;
        writer.flush()?;
        Ok(Self {
            writer,
            schema,
            rows: 0,
        })
    }

    /// Append one record
    ///
    /// Quantized tables ignore the detection count; full tables record a
    /// missing count as 0.
    pub fn write(&mut self, record: &MetricRecord) -> Result<()> {
        let mut fields = vec![
            record.frame.to_string(),
            record.fps.to_string(),
            record.cpu.to_string(),
            record.ram.to_string(),
            record.temp.to_string(),
        ];
        if self.schema == TableSchema::Full {
            fields.push(record.detections.unwrap_or(0).to_string());
        }

        self.writer.write_record(&fields)?;
        self.writer.flush()?;
        self.rows += 1;
        Ok(())
    }

    /// Number of data rows written so far
    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn schema(&self) -> TableSchema {
        self.schema
    }

    /// Flush and return the underlying writer
    pub fn into_inner(self) -> Result<W> {
        self.writer
            .into_inner()
            .map_err(|e| BenchError::IoError(e.into_error()))
    }
}

/// Table path for a run: `{dir}/{model}.csv`, or `{dir}/{model}_tflite.csv`
/// for quantized-model runs
pub fn table_path(dir: &Path, model_name: &str, schema: TableSchema) -> PathBuf {
    match schema {
        TableSchema::Full => dir.join(format!("{}.csv", model_name)),
        TableSchema::Quantized => dir.join(format!("{}_tflite.csv", model_name)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const FULL: &str = "frame,fps,cpu,ram,temp,detections\n\
                        1,30.0,10.0,40.0,50.0,2\n\
                        2,28.0,12.0,41.0,50.5,1\n\
                        3,32.0,11.0,40.5,51.0,3\n";

    #[test]
    fn test_read_full_table() {
        let table = MetricTable::from_reader(FULL.as_bytes()).unwrap();
        assert_eq!(table.schema, TableSchema::Full);
        assert_eq!(table.records.len(), 3);
        assert_eq!(table.records[1].fps, 28.0);
        assert_eq!(table.records[2].detections, Some(3));
        assert_eq!(table.records[2].frame, 3);
    }

    #[test]
    fn test_read_quantized_table_any_order() {
        let data = "fps,frame,temp,ram,cpu\n12.5,1,47.2,33.0,80.1\n";
        let table = MetricTable::from_reader(data.as_bytes()).unwrap();
        assert_eq!(table.schema, TableSchema::Quantized);
        assert_eq!(table.records[0].fps, 12.5);
        assert_eq!(table.records[0].cpu, 80.1);
        assert_eq!(table.records[0].detections, None);
    }

    #[test]
    fn test_header_only_table() {
        let table = MetricTable::from_reader("frame,fps,cpu,ram,temp\n".as_bytes()).unwrap();
        assert!(table.records.is_empty());
    }

    #[test]
    fn test_missing_column() {
        let data = "frame,fps,cpu,ram\n1,30.0,10.0,40.0\n";
        let err = MetricTable::from_reader(data.as_bytes()).unwrap_err();
        assert!(matches!(err, BenchError::MissingColumn("temp")));
    }

    #[test]
    fn test_malformed_field() {
        let data = "frame,fps,cpu,ram,temp\n1,30.0,10.0,40.0,50.0\n2,fast,10.0,40.0,50.0\n";
        match MetricTable::from_reader(data.as_bytes()) {
            Err(BenchError::Parse { line, column, value }) => {
                assert_eq!(line, 3);
                assert_eq!(column, "fps");
                assert_eq!(value, "fast");
            }
            other => panic!("expected parse error, got {:?}", other),
        }
    }

    #[test]
    fn test_non_finite_field() {
        let data = "frame,fps,cpu,ram,temp\n1,30.0,10.0,40.0,50.0\n2,inf,10.0,40.0,50.0\n";
        match MetricTable::from_reader(data.as_bytes()) {
            Err(BenchError::Parse { line, column, value }) => {
                assert_eq!(line, 3);
                assert_eq!(column, "fps");
                assert_eq!(value, "inf");
            }
            other => panic!("expected parse error, got {:?}", other),
        }

        let data = "frame,fps,cpu,ram,temp\n1,30.0,10.0,40.0,NaN\n";
        assert!(matches!(
            MetricTable::from_reader(data.as_bytes()),
            Err(BenchError::Parse { line: 2, column: "temp", .. })
        ));

        let data = "frame,fps,cpu,ram,temp\n1,30.0,-infinity,40.0,50.0\n";
        assert!(matches!(
            MetricTable::from_reader(data.as_bytes()),
            Err(BenchError::Parse { column: "cpu", .. })
        ));
    }

    #[test]
    fn test_writer_output() {
        let mut writer = MetricWriter::new(Vec::new(), TableSchema::Full).unwrap();
        writer
            .write(&MetricRecord {
                frame: 1,
                fps: 30.5,
                cpu: 10.0,
                ram: 40.0,
                temp: 50.0,
                detections: Some(2),
            })
            .unwrap();
        assert_eq!(writer.rows(), 1);

        let bytes = writer.into_inner().unwrap();
        let text = String::from_utf8(bytes).unwrap();
        assert_eq!(text, "frame,fps,cpu,ram,temp,detections\n1,30.5,10,40,50,2\n");
    }

    #[test]
    fn test_create_makes_parent_dir() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("logs").join("yolo8n_tflite.csv");

        let mut writer = MetricWriter::create(&path, TableSchema::Quantized).unwrap();
        writer
            .write(&MetricRecord {
                frame: 1,
                fps: 9.0,
                cpu: 95.0,
                ram: 30.0,
                temp: 61.2,
                detections: None,
            })
            .unwrap();
        drop(writer);

        let table = read_table(&path).unwrap();
        assert_eq!(table.schema, TableSchema::Quantized);
        assert_eq!(table.records[0].temp, 61.2);
    }

    #[test]
    fn test_table_path() {
        let dir = Path::new("logs");
        assert_eq!(table_path(dir, "yolo11n", TableSchema::Full), PathBuf::from("logs/yolo11n.csv"));
        assert_eq!(
            table_path(dir, "yolo8n", TableSchema::Quantized),
            PathBuf::from("logs/yolo8n_tflite.csv")
        );
    }
}
