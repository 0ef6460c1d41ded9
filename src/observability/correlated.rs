//! Trace-correlated request logging.
//!
//! Each call writes exactly one JSON object, terminated by a newline, to the
//! configured writer (stdout in production). Records carry the trace and span
//! ids of the span they were emitted under so log pipelines can join them to
//! the exported trace without any extra lookup.

use std::io::Write;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use opentelemetry::trace::{SpanId, TraceId};
use serde::Serialize;
use serde_json::{Map, Value};
use tracing_subscriber::fmt::writer::BoxMakeWriter;
use tracing_subscriber::fmt::MakeWriter;

use crate::observability::tracing::TraceIds;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Severity {
    Debug,
    Info,
    Warn,
    Error,
}

/// One emitted record.
#[derive(Debug, Clone, Serialize)]
pub struct LogRecord {
    pub time: DateTime<Utc>,
    pub level: Severity,
    pub msg: String,
    pub trace_id: String,
    pub span_id: String,
    #[serde(flatten)]
    pub attributes: Map<String, Value>,
}

/// Factory for per-request logger handles.
#[derive(Clone)]
pub struct CorrelatedLogger {
    writer: Arc<BoxMakeWriter>,
}

impl CorrelatedLogger {
    pub fn stdout() -> Self {
        Self::with_writer(std::io::stdout)
    }

    pub fn with_writer<W>(make_writer: W) -> Self
    where
        W: for<'a> MakeWriter<'a> + Send + Sync + 'static,
    {
        Self {
            writer: Arc::new(BoxMakeWriter::new(make_writer)),
        }
    }

    /// Handle whose records are tagged with the given trace and span.
    pub fn with_context(&self, trace_id: TraceId, span_id: SpanId) -> LoggerHandle {
        LoggerHandle {
            writer: Arc::clone(&self.writer),
            trace_id: trace_id.to_string(),
            span_id: span_id.to_string(),
        }
    }

    pub fn for_ids(&self, ids: TraceIds) -> LoggerHandle {
        self.with_context(ids.trace_id, ids.span_id)
    }
}

impl Default for CorrelatedLogger {
    fn default() -> Self {
        Self::stdout()
    }
}

/// Logger bound to one trace/span pair.
pub struct LoggerHandle {
    writer: Arc<BoxMakeWriter>,
    trace_id: String,
    span_id: String,
}

impl LoggerHandle {
    pub fn trace_id(&self) -> &str {
        &self.trace_id
    }

    pub fn span_id(&self) -> &str {
        &self.span_id
    }

    /// Write one record synchronously.
    ///
    /// Write failures are reported on the diagnostic log and otherwise dropped.
    pub fn log<I, K>(&self, level: Severity, msg: &str, attributes: I)
    where
        I: IntoIterator<Item = (K, Value)>,
        K: Into<String>,
    {
        let record = LogRecord {
            time: Utc::now(),
            level,
            msg: msg.to_string(),
            trace_id: self.trace_id.clone(),
            span_id: self.span_id.clone(),
            attributes: attributes.into_iter().map(|(k, v)| (k.into(), v)).collect(),
        };

        if let Err(error) = self.write(&record) {
            tracing::warn!(%error, trace_id = %self.trace_id, "Failed to write log record");
        }
    }

    fn write(&self, record: &LogRecord) -> std::io::Result<()> {
        let mut line = serde_json::to_vec(record)?;
        line.push(b'\n');

        let mut writer = self.writer.make_writer();
        writer.write_all(&line)?;
        writer.flush()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    #[derive(Clone, Default)]
    struct Captured(Arc<Mutex<Vec<u8>>>);

    impl Write for Captured {
        fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    fn lines(captured: &Captured) -> Vec<Value> {
        let bytes = captured.0.lock().unwrap().clone();
        String::from_utf8(bytes)
            .unwrap()
            .lines()
            .map(|line| serde_json::from_str(line).unwrap())
            .collect()
    }

    #[test]
    fn record_carries_ids_and_attributes() {
        let captured = Captured::default();
        let sink = captured.clone();
        let logger = CorrelatedLogger::with_writer(move || sink.clone());

        let trace_id = TraceId::from_hex("4bf92f3577b34da6a3ce929d0e0e4736").unwrap();
        let span_id = SpanId::from_hex("00f067aa0ba902b7").unwrap();
        logger.with_context(trace_id, span_id).log(
            Severity::Error,
            "request failed",
            [("latency_ms", Value::from(50u64)), ("status", Value::from(500))],
        );

        let records = lines(&captured);
        assert_eq!(records.len(), 1);
        let record = &records[0];
        assert_eq!(record["level"], "ERROR");
        assert_eq!(record["msg"], "request failed");
        assert_eq!(record["trace_id"], "4bf92f3577b34da6a3ce929d0e0e4736");
        assert_eq!(record["span_id"], "00f067aa0ba902b7");
        assert_eq!(record["latency_ms"], 50);
        assert_eq!(record["status"], 500);
        assert!(record["time"].as_str().unwrap().ends_with('Z'));
    }

    #[test]
    fn each_call_is_one_line() {
        let captured = Captured::default();
        let sink = captured.clone();
        let logger = CorrelatedLogger::with_writer(move || sink.clone());
        let handle = logger.with_context(
            TraceId::from_hex("00000000000000000000000000000001").unwrap(),
            SpanId::from_hex("0000000000000002").unwrap(),
        );

        handle.log(Severity::Info, "first", Vec::<(String, Value)>::new());
        handle.log(Severity::Warn, "second", [("k", Value::from("v"))]);

        let records = lines(&captured);
        assert_eq!(records.len(), 2);
        assert_eq!(records[0]["level"], "INFO");
        assert_eq!(records[1]["level"], "WARN");
        assert_eq!(records[1]["k"], "v");
        assert_eq!(records[0]["trace_id"], "00000000000000000000000000000001");
    }
}
