//! Summary statistics over a run's metric records

use crate::types::{BenchError, MetricKind, MetricRecord, Result, TableSchema};
use serde::Serialize;

/// Minimum, maximum and arithmetic mean of one metric
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct MetricSummary {
    pub min: f64,
    pub max: f64,
    pub avg: f64,
}

impl MetricSummary {
    /// Summarize a non-empty slice of values
    ///
    /// Returns `None` for an empty slice.
    pub fn from_values(values: &[f64]) -> Option<Self> {
        if values.is_empty() {
            return None;
        }

        let (min, max, sum) = values.iter().fold(
            (f64::INFINITY, f64::NEG_INFINITY, 0.0),
            |(min, max, sum), &v| (min.min(v), max.max(v), sum + v),
        );

        Some(Self {
            min,
            max,
            avg: sum / values.len() as f64,
        })
    }
}

/// Aggregate statistics for a benchmark run
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Summary {
    pub record_count: usize,
    pub schema: TableSchema,
    pub fps: MetricSummary,
    pub cpu: MetricSummary,
    pub ram: MetricSummary,
    pub temp: MetricSummary,
    /// Present only for full-schema runs
    pub detections: Option<MetricSummary>,
    pub total_detections: Option<u64>,
}

impl Summary {
    /// Compute statistics for a run
    ///
    /// # Errors
    /// * `BenchError::EmptyInput` if `records` is empty
    /// * `BenchError::SchemaMismatch` if records mix full and quantized rows
    pub fn from_records(records: &[MetricRecord]) -> Result<Self> {
        let schema = check_schema(records)?;

        let column = |kind: MetricKind| -> MetricSummary {
            let values = metric_values(records, kind);
            // Non-empty input was checked above
            MetricSummary::from_values(&values).unwrap_or(MetricSummary {
                min: 0.0,
                max: 0.0,
                avg: 0.0,
            })
        };

        let (detections, total_detections) = match schema {
            TableSchema::Full => {
                let values = metric_values(records, MetricKind::Detections);
                let total = records
                    .iter()
                    .filter_map(|r| r.detections)
                    .map(u64::from)
                    .sum();
                (MetricSummary::from_values(&values), Some(total))
            }
            TableSchema::Quantized => (None, None),
        };

        Ok(Self {
            record_count: records.len(),
            schema,
            fps: column(MetricKind::Fps),
            cpu: column(MetricKind::Cpu),
            ram: column(MetricKind::Ram),
            temp: column(MetricKind::Temperature),
            detections,
            total_detections,
        })
    }

    /// Summary for one metric
    pub fn metric(&self, kind: MetricKind) -> Option<&MetricSummary> {
        match kind {
            MetricKind::Fps => Some(&self.fps),
            MetricKind::Cpu => Some(&self.cpu),
            MetricKind::Ram => Some(&self.ram),
            MetricKind::Temperature => Some(&self.temp),
            MetricKind::Detections => self.detections.as_ref(),
        }
    }
}

/// Collect one metric column in frame order
pub fn metric_values(records: &[MetricRecord], kind: MetricKind) -> Vec<f64> {
    records.iter().filter_map(|r| r.value(kind)).collect()
}

/// Determine the shared schema of a record set
pub(crate) fn check_schema(records: &[MetricRecord]) -> Result<TableSchema> {
    let first = records.first().ok_or(BenchError::EmptyInput)?;
    let expected = first.schema();

    if let Some(odd) = records.iter().find(|r| r.schema() != expected) {
        return Err(BenchError::SchemaMismatch {
            expected,
            found: odd.schema(),
            frame: odd.frame,
        });
    }

    Ok(expected)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rec(frame: u64, fps: f64, detections: Option<u32>) -> MetricRecord {
        MetricRecord {
            frame,
            fps,
            cpu: 10.0 + frame as f64,
            ram: 40.0,
            temp: 50.0,
            detections,
        }
    }

    #[test]
    fn test_metric_summary() {
        let summary = MetricSummary::from_values(&[28.0, 30.0, 32.0]).unwrap();
        assert_eq!(summary.min, 28.0);
        assert_eq!(summary.max, 32.0);
        assert_eq!(summary.avg, 30.0);

        assert!(MetricSummary::from_values(&[]).is_none());
    }

    #[test]
    fn test_summary_full_schema() {
        let records = vec![rec(1, 30.0, Some(2)), rec(2, 28.0, Some(1)), rec(3, 32.0, Some(3))];
        let summary = Summary::from_records(&records).unwrap();

        assert_eq!(summary.record_count, 3);
        assert_eq!(summary.schema, TableSchema::Full);
        assert_eq!(summary.fps.avg, 30.0);
        assert_eq!(summary.cpu.min, 11.0);
        assert_eq!(summary.cpu.max, 13.0);
        assert_eq!(summary.total_detections, Some(6));
        assert_eq!(summary.detections.unwrap().max, 3.0);
    }

    #[test]
    fn test_summary_quantized_schema() {
        let records = vec![rec(1, 12.0, None), rec(2, 14.0, None)];
        let summary = Summary::from_records(&records).unwrap();

        assert_eq!(summary.schema, TableSchema::Quantized);
        assert_eq!(summary.fps.avg, 13.0);
        assert!(summary.detections.is_none());
        assert!(summary.total_detections.is_none());
        assert!(summary.metric(MetricKind::Detections).is_none());
    }

    #[test]
    fn test_summary_rejects_empty_and_mixed() {
        assert!(matches!(Summary::from_records(&[]), Err(BenchError::EmptyInput)));

        let mixed = vec![rec(1, 30.0, Some(1)), rec(2, 30.0, None)];
        match Summary::from_records(&mixed) {
            Err(BenchError::SchemaMismatch { frame, .. }) => assert_eq!(frame, 2),
            other => panic!("expected schema mismatch, got {:?}", other),
        }
    }
}
