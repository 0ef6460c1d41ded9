//! Shared utilities for integration tests.

#![allow(dead_code)]

use std::io::Write;
use std::net::SocketAddr;
use std::sync::{Arc, Mutex};

use opentelemetry::trace::SpanId;
use opentelemetry_sdk::metrics::data::ResourceMetrics;
use opentelemetry_sdk::metrics::{InMemoryMetricExporter, PeriodicReader, SdkMeterProvider};
use opentelemetry_sdk::trace::{InMemorySpanExporter, SdkTracerProvider, SpanData};
use sample_app::lifecycle::Shutdown;
use sample_app::observability::CorrelatedLogger;
use sample_app::work::{WorkRng, SIMULATE_WORK_BOUND_MS};
use sample_app::{HttpServer, Telemetry};
use serde_json::Value;
use tokio::net::TcpListener;

/// Telemetry whose spans are exported synchronously into memory.
///
/// Metrics are kept in memory too and only exported on [`TestTelemetry::collect_metrics`].
pub struct TestTelemetry {
    pub telemetry: Arc<Telemetry>,
    pub spans: InMemorySpanExporter,
    pub metrics: InMemoryMetricExporter,
    meter_provider: SdkMeterProvider,
}

impl TestTelemetry {
    pub fn new() -> Self {
        let spans = InMemorySpanExporter::default();
        let tracer_provider = SdkTracerProvider::builder()
            .with_simple_exporter(spans.clone())
            .build();

        let metrics = InMemoryMetricExporter::default();
        let meter_provider = SdkMeterProvider::builder()
            .with_reader(PeriodicReader::builder(metrics.clone()).build())
            .build();

        let telemetry = Telemetry::from_providers(tracer_provider, meter_provider.clone());
        Self {
            telemetry: Arc::new(telemetry),
            spans,
            metrics,
            meter_provider,
        }
    }

    /// Flush the meter provider and return the latest cumulative export.
    pub fn collect_metrics(&self) -> ResourceMetrics {
        self.meter_provider.force_flush().unwrap();
        self.metrics
            .get_finished_metrics()
            .unwrap()
            .pop()
            .expect("no metrics exported")
    }

    pub fn finished(&self) -> Vec<SpanData> {
        self.spans.get_finished_spans().unwrap()
    }

    pub fn span(&self, name: &str) -> SpanData {
        self.finished()
            .into_iter()
            .find(|span| span.name == name)
            .unwrap_or_else(|| panic!("no span named {name}"))
    }
}

/// Correlated-log sink that keeps every written byte.
#[derive(Clone, Default)]
pub struct CapturedLogs(Arc<Mutex<Vec<u8>>>);

impl CapturedLogs {
    pub fn logger(&self) -> CorrelatedLogger {
        let sink = self.clone();
        CorrelatedLogger::with_writer(move || sink.clone())
    }

    pub fn records(&self) -> Vec<Value> {
        let bytes = self.0.lock().unwrap().clone();
        String::from_utf8(bytes)
            .unwrap()
            .lines()
            .map(|line| serde_json::from_str(line).unwrap())
            .collect()
    }
}

impl Write for CapturedLogs {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        self.0.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> std::io::Result<()> {
        Ok(())
    }
}

/// Random source replaying fixed draws.
pub struct Scripted {
    pub latency_ms: u64,
    pub cache_ms: u64,
    pub outcome: f64,
}

impl Scripted {
    pub fn failing(latency_ms: u64) -> Self {
        Self { latency_ms, cache_ms: 0, outcome: 0.05 }
    }

    pub fn passing(latency_ms: u64) -> Self {
        Self { latency_ms, cache_ms: 0, outcome: 0.75 }
    }
}

impl WorkRng for Scripted {
    fn millis_below(&self, bound_ms: u64) -> u64 {
        if bound_ms == SIMULATE_WORK_BOUND_MS {
            self.latency_ms
        } else {
            self.cache_ms
        }
    }

    fn unit(&self) -> f64 {
        self.outcome
    }
}

/// Duration a finished span was open.
pub fn open_for(span: &SpanData) -> std::time::Duration {
    span.end_time.duration_since(span.start_time).unwrap()
}

pub fn is_root(span: &SpanData) -> bool {
    span.parent_span_id == SpanId::INVALID
}

/// Serve `server` on an ephemeral port until `shutdown` fires.
pub async fn spawn_server(server: HttpServer, shutdown: &Shutdown) -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let stop = shutdown.subscribe();
    tokio::spawn(async move {
        let _ = server.run(listener, stop).await;
    });
    addr
}
