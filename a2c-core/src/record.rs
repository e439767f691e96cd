//! Training records and the reporting sink.
//!
//! Two ways of getting numbers out of an agent live here:
//!
//! * [`Record`] is a bag of named values returned by a training call or an
//!   episode of [`Trainer`](crate::Trainer). The caller decides what to do with it.
//! * [`Recorder`] is a sink the agent writes into while it runs. A sink is
//!   organized in reports, each holding named metric streams of
//!   `(step, value)` points.
//!
//! ```rust
//! use a2c_core::record::{BufferedRecorder, MetricKind, Recorder};
//!
//! let mut recorder = BufferedRecorder::new();
//! let report = recorder.create_report("actor");
//! let stream = recorder.create_metric_stream("loss", MetricKind::Line, report);
//! recorder.write(stream, 1, 0.5);
//!
//! assert_eq!(recorder.points("actor", "loss"), Some(vec![(1, 0.5)]));
//! ```
mod base;
mod buffered_recorder;
mod null_recorder;
mod recorder;

pub use base::{Record, RecordValue};
pub use buffered_recorder::BufferedRecorder;
pub use null_recorder::NullRecorder;
pub use recorder::{MetricKind, Recorder, ReportId, StreamId};
