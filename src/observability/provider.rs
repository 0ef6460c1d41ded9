//! Telemetry provider lifecycle.
//!
//! # Responsibilities
//! - Build the OTLP/gRPC span and metric exporters for one collector endpoint
//! - Wrap them in a batch span processor and a periodic metric reader
//! - Hand out the tracer, metric instruments and propagator used by request handling
//! - Drain both pipelines once, within a deadline, at shutdown
//!
//! # Design Decisions
//! - Startup is fail-fast: an exporter that cannot be built aborts the process
//! - Providers are owned by `Telemetry`, never registered as globals
//! - Shutdown runs on a blocking task; the SDK flush calls block their thread

use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use axum::http::HeaderMap;
use opentelemetry::metrics::MeterProvider as _;
use opentelemetry::propagation::TextMapPropagator;
use opentelemetry::trace::TracerProvider as _;
use opentelemetry::Context;
use opentelemetry_otlp::{ExporterBuildError, MetricExporter, SpanExporter, WithExportConfig};
use opentelemetry_sdk::error::OTelSdkError;
use opentelemetry_sdk::metrics::{PeriodicReader, SdkMeterProvider};
use opentelemetry_sdk::propagation::TraceContextPropagator;
use opentelemetry_sdk::trace::{BatchConfigBuilder, BatchSpanProcessor, SdkTracer, SdkTracerProvider};

use crate::config::TelemetryConfig;
use crate::observability::metrics::{HttpServerMetrics, WorkMetrics};
use crate::observability::resource::ServiceResource;
use crate::observability::tracing::HeaderExtractor;

/// Instrumentation scope name for spans and instruments created by this crate.
const INSTRUMENTATION_SCOPE: &str = "sample-app";

#[derive(Debug, thiserror::Error)]
pub enum TelemetryError {
    #[error("failed to build OTLP {signal} exporter for `{endpoint}`: {source}")]
    Exporter {
        signal: &'static str,
        endpoint: String,
        #[source]
        source: ExporterBuildError,
    },

    #[error("trace pipeline shutdown failed: {0}")]
    TraceShutdown(#[source] OTelSdkError),

    #[error("metric pipeline shutdown failed: {0}")]
    MetricShutdown(#[source] OTelSdkError),

    #[error("telemetry shutdown did not finish within {0:?}")]
    ShutdownTimeout(Duration),

    #[error("telemetry shutdown task failed: {0}")]
    ShutdownTask(#[from] tokio::task::JoinError),
}

/// Owner of the tracer and meter providers for the life of the process.
pub struct Telemetry {
    tracer_provider: SdkTracerProvider,
    meter_provider: SdkMeterProvider,
    tracer: SdkTracer,
    propagator: TraceContextPropagator,
    http_metrics: HttpServerMetrics,
    work_metrics: WorkMetrics,
    shut_down: AtomicBool,
}

impl Telemetry {
    /// Build both OTLP pipelines against `config.collector_endpoint`.
    pub fn init(resource: &ServiceResource, config: &TelemetryConfig) -> Result<Self, TelemetryError> {
        let endpoint = collector_uri(&config.collector_endpoint);
        let sdk_resource = resource.to_resource();

        let span_exporter = SpanExporter::builder()
            .with_tonic()
            .with_endpoint(endpoint.clone())
            .build()
            .map_err(|source| TelemetryError::Exporter {
                signal: "trace",
                endpoint: endpoint.clone(),
                source,
            })?;

        let metric_exporter = MetricExporter::builder()
            .with_tonic()
            .with_endpoint(endpoint.clone())
            .build()
            .map_err(|source| TelemetryError::Exporter {
                signal: "metric",
                endpoint: endpoint.clone(),
                source,
            })?;

        let batch_config = BatchConfigBuilder::default()
            .with_scheduled_delay(config.batch_scheduled_delay())
            .with_max_queue_size(config.batch_max_queue_size)
            .with_max_export_batch_size(config.batch_max_export_batch_size)
            .build();
        let span_processor = BatchSpanProcessor::builder(span_exporter)
            .with_batch_config(batch_config)
            .build();

        let tracer_provider = SdkTracerProvider::builder()
            .with_resource(sdk_resource.clone())
            .with_span_processor(span_processor)
            .build();

        let reader = PeriodicReader::builder(metric_exporter)
            .with_interval(config.metric_export_interval())
            .build();

        let meter_provider = SdkMeterProvider::builder()
            .with_resource(sdk_resource)
            .with_reader(reader)
            .build();

        tracing::info!(
            endpoint = %endpoint,
            service_name = resource.service_name(),
            service_version = resource.service_version(),
            metric_interval_secs = config.metric_export_interval_secs,
            "Telemetry pipelines initialized"
        );

        Ok(Self::from_providers(tracer_provider, meter_provider))
    }

    /// Wrap already-built providers, e.g. ones backed by in-memory exporters.
    pub fn from_providers(tracer_provider: SdkTracerProvider, meter_provider: SdkMeterProvider) -> Self {
        let tracer = tracer_provider.tracer(INSTRUMENTATION_SCOPE);
        let meter = meter_provider.meter(INSTRUMENTATION_SCOPE);

        Self {
            http_metrics: HttpServerMetrics::new(&meter),
            work_metrics: WorkMetrics::new(&meter),
            tracer_provider,
            meter_provider,
            tracer,
            propagator: TraceContextPropagator::new(),
            shut_down: AtomicBool::new(false),
        }
    }

    pub fn tracer(&self) -> &SdkTracer {
        &self.tracer
    }

    pub fn http_metrics(&self) -> &HttpServerMetrics {
        &self.http_metrics
    }

    pub fn work_metrics(&self) -> &WorkMetrics {
        &self.work_metrics
    }

    /// Parent context for a new server span, read from W3C `traceparent`/`tracestate`.
    ///
    /// Returns an empty context when the headers carry no valid remote span.
    pub fn extract_parent(&self, headers: &HeaderMap) -> Context {
        self.propagator
            .extract_with_context(&Context::new(), &HeaderExtractor(headers))
    }

    pub fn is_shut_down(&self) -> bool {
        self.shut_down.load(Ordering::Acquire)
    }

    /// Flush and close both pipelines, waiting at most `deadline`.
    ///
    /// Only the first call does any work; later calls return `Ok(())`.
    pub async fn shutdown(&self, deadline: Duration) -> Result<(), TelemetryError> {
        if self.shut_down.swap(true, Ordering::AcqRel) {
            tracing::debug!("Telemetry already shut down");
            return Ok(());
        }

        let tracer_provider = self.tracer_provider.clone();
        let meter_provider = self.meter_provider.clone();
        let drain = tokio::task::spawn_blocking(move || {
            let traces = tracer_provider.shutdown();
            let metrics = meter_provider.shutdown();
            (traces, metrics)
        });

        let (traces, metrics) = tokio::time::timeout(deadline, drain)
            .await
            .map_err(|_| TelemetryError::ShutdownTimeout(deadline))??;

        traces.map_err(TelemetryError::TraceShutdown)?;
        metrics.map_err(TelemetryError::MetricShutdown)?;

        tracing::info!("Telemetry pipelines flushed and closed");
        Ok(())
    }
}

/// gRPC URI for a collector address; a bare `host:port` is dialled over plaintext HTTP/2.
fn collector_uri(endpoint: &str) -> String {
    let endpoint = endpoint.trim();
    if endpoint.contains("://") {
        endpoint.to_string()
    } else {
        format!("http://{endpoint}")
    }
}
