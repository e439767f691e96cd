use super::{MetricKind, Recorder, ReportId, StreamId};
use std::{cell::RefCell, rc::Rc};

#[derive(Debug)]
struct Stream {
    name: String,
    kind: MetricKind,
    report: ReportId,
    points: Vec<(i64, f32)>,
}

#[derive(Debug, Default)]
struct Inner {
    reports: Vec<String>,
    streams: Vec<Stream>,
}

/// A recorder keeping every point in memory.
///
/// Clones share the same buffer, so a clone can be handed to an agent while
/// another is kept for inspection.
#[derive(Clone, Debug, Default)]
pub struct BufferedRecorder {
    inner: Rc<RefCell<Inner>>,
}

impl BufferedRecorder {
    /// Constructs an empty recorder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Names of the reports in creation order.
    pub fn reports(&self) -> Vec<String> {
        self.inner.borrow().reports.clone()
    }

    /// Names of the streams of a report in creation order.
    pub fn streams(&self, report: &str) -> Vec<String> {
        let inner = self.inner.borrow();
        match inner.reports.iter().position(|r| r == report) {
            Some(ix) => inner
                .streams
                .iter()
                .filter(|s| s.report == ReportId(ix))
                .map(|s| s.name.clone())
                .collect(),
            None => vec![],
        }
    }

    /// Kind of a stream, `None` if it does not exist.
    pub fn kind(&self, report: &str, stream: &str) -> Option<MetricKind> {
        self.find(report, stream)
            .map(|ix| self.inner.borrow().streams[ix].kind)
    }

    /// Points of a stream, `None` if it does not exist.
    ///
    /// If several reports share a name, the first one is searched.
    pub fn points(&self, report: &str, stream: &str) -> Option<Vec<(i64, f32)>> {
        self.find(report, stream)
            .map(|ix| self.inner.borrow().streams[ix].points.clone())
    }

    fn find(&self, report: &str, stream: &str) -> Option<usize> {
        let inner = self.inner.borrow();
        let report = ReportId(inner.reports.iter().position(|r| r == report)?);
        inner
            .streams
            .iter()
            .position(|s| s.report == report && s.name == stream)
    }
}

impl Recorder for BufferedRecorder {
    fn create_report(&mut self, name: &str) -> ReportId {
        let mut inner = self.inner.borrow_mut();
        inner.reports.push(name.to_string());
        ReportId(inner.reports.len() - 1)
    }

    fn create_metric_stream(
        &mut self,
        name: &str,
        kind: MetricKind,
        report: ReportId,
    ) -> StreamId {
        let mut inner = self.inner.borrow_mut();
        inner.streams.push(Stream {
            name: name.to_string(),
            kind,
            report,
            points: vec![],
        });
        StreamId(inner.streams.len() - 1)
    }

    /// Points written to an unknown stream are dropped.
    fn write(&mut self, stream: StreamId, step: i64, value: f32) {
        if let Some(s) = self.inner.borrow_mut().streams.get_mut(stream.0) {
            s.points.push((step, value));
        }
    }
}
