//! Recorder writing metric streams to TFRecord files.
use a2c_core::record::{MetricKind, Recorder, ReportId, StreamId};
use log::{info, warn};
use std::path::Path;
use tensorboard_rs::summary_writer::SummaryWriter;

/// Writes each point of a metric stream as a scalar summary.
///
/// The tag of a stream is `report/stream`, so tensorboard groups the streams
/// of a report together. Points with negative steps are written at step 0.
pub struct TensorboardRecorder {
    writer: SummaryWriter,
    reports: Vec<String>,
    tags: Vec<String>,
}

impl TensorboardRecorder {
    /// Construct a [`TensorboardRecorder`].
    ///
    /// TFRecord will be stored in `logdir`.
    pub fn new<P: AsRef<Path>>(logdir: P) -> Self {
        info!("Tensorboard logdir: {:?}", logdir.as_ref());
        Self {
            writer: SummaryWriter::new(logdir),
            reports: vec![],
            tags: vec![],
        }
    }

    /// Flushes buffered summaries to the file.
    pub fn flush(&mut self) {
        self.writer.flush();
    }
}

impl Recorder for TensorboardRecorder {
    fn create_report(&mut self, name: &str) -> ReportId {
        self.reports.push(name.to_string());
        ReportId(self.reports.len() - 1)
    }

    /// Tensorboard has no notion of a stream kind; every stream is a scalar plot.
    fn create_metric_stream(
        &mut self,
        name: &str,
        _kind: MetricKind,
        report: ReportId,
    ) -> StreamId {
        let tag = match self.reports.get(report.0) {
            Some(report) => format!("{}/{}", report, name),
            None => name.to_string(),
        };
        self.tags.push(tag);
        StreamId(self.tags.len() - 1)
    }

    fn write(&mut self, stream: StreamId, step: i64, value: f32) {
        match self.tags.get(stream.0) {
            Some(tag) => self.writer.add_scalar(tag, value, step.max(0) as usize),
            None => warn!("Unknown stream {:?}", stream),
        }
    }
}
