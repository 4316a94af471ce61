//! Tracing subscriber and optional OpenTelemetry span export.

use opentelemetry::trace::TracerProvider as _;
use opentelemetry_otlp::WithExportConfig;
use opentelemetry_sdk::Resource;
use opentelemetry_sdk::trace::SdkTracerProvider;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, fmt};

use crate::error::AppError;

const SERVICE_NAME: &str = "taleweaver-api";

/// Handle on the installed tracing pipeline. Call [`Telemetry::shutdown`]
/// before exiting so buffered spans are flushed.
#[derive(Debug)]
pub struct Telemetry {
    provider: Option<SdkTracerProvider>,
}

impl Telemetry {
    /// Flushes and stops span export, if it was enabled.
    pub fn shutdown(self) {
        let Some(provider) = self.provider else {
            return;
        };
        if let Err(e) = provider.shutdown() {
            tracing::warn!(error = %e, "failed to flush spans");
        }
    }
}

/// Installs JSON logging filtered by `RUST_LOG` (default `info`), and span
/// export to `otlp_endpoint` over gRPC when one is given.
///
/// # Errors
///
/// Returns `AppError::Telemetry` if the exporter cannot be built or a global
/// subscriber is already installed.
pub fn init(otlp_endpoint: Option<&str>) -> Result<Telemetry, AppError> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    let provider = otlp_endpoint.map(tracer_provider).transpose()?;
    let otel_layer = provider
        .as_ref()
        .map(|provider| tracing_opentelemetry::layer().with_tracer(provider.tracer(SERVICE_NAME)));

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().json())
        .with(otel_layer)
        .try_init()
        .map_err(|e| AppError::Telemetry(e.to_string()))?;

    if let Some(endpoint) = otlp_endpoint {
        tracing::info!(endpoint, "exporting spans over OTLP");
    }
    Ok(Telemetry { provider })
}

fn tracer_provider(endpoint: &str) -> Result<SdkTracerProvider, AppError> {
    let exporter = opentelemetry_otlp::SpanExporter::builder()
        .with_tonic()
        .with_endpoint(endpoint)
        .build()
        .map_err(|e| AppError::Telemetry(e.to_string()))?;

    Ok(SdkTracerProvider::builder()
        .with_batch_exporter(exporter)
        .with_resource(Resource::builder().with_service_name(SERVICE_NAME).build())
        .build())
}
