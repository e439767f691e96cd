use serde::{Deserialize, Serialize};

/// Handle of a report created by [`Recorder::create_report`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct ReportId(pub usize);

/// Handle of a metric stream created by [`Recorder::create_metric_stream`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct StreamId(pub usize);

/// How the points of a stream are meant to be displayed.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Deserialize, Serialize)]
pub enum MetricKind {
    /// Points joined by a line.
    Line,

    /// Unconnected points.
    Scatter,
}

/// Destination of the metrics emitted by an agent.
///
/// Handles are only meaningful for the recorder that issued them.
pub trait Recorder {
    /// Creates a report, a named group of streams.
    fn create_report(&mut self, name: &str) -> ReportId;

    /// Creates a metric stream in `report`.
    fn create_metric_stream(&mut self, name: &str, kind: MetricKind, report: ReportId)
        -> StreamId;

    /// Appends the point `(step, value)` to `stream`.
    fn write(&mut self, stream: StreamId, step: i64, value: f32);
}

impl<T: Recorder + ?Sized> Recorder for Box<T> {
    fn create_report(&mut self, name: &str) -> ReportId {
        (**self).create_report(name)
    }

    fn create_metric_stream(
        &mut self,
        name: &str,
        kind: MetricKind,
        report: ReportId,
    ) -> StreamId {
        (**self).create_metric_stream(name, kind, report)
    }

    fn write(&mut self, stream: StreamId, step: i64, value: f32) {
        (**self).write(stream, step, value)
    }
}
