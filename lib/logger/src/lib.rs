use anyhow::Context;
use osprey_client::entities::logger::{LogConfig, StdioLogMode};
use tracing::level_filters::LevelFilter;
use tracing_opentelemetry::OpenTelemetryLayer;
use tracing_subscriber::{
  Registry, layer::SubscriberExt, util::SubscriberInitExt,
};

mod otel;

pub fn init(config: &LogConfig) -> anyhow::Result<()> {
  let log_level: tracing::Level = config.level.into();

  let registry =
    Registry::default().with(LevelFilter::from(log_level));

  // The otel layer is optional on every stdio mode. Hold the tracer
  // and build the layer per-arm so its subscriber type can be inferred
  // independently for each registry shape.
  let otel_tracer = (!config.otlp_endpoint.is_empty()).then(|| {
    otel::tracer(
      &config.otlp_endpoint,
      config.opentelemetry_service_name.clone(),
    )
  });

  match config.stdio {
    StdioLogMode::Standard if config.pretty => registry
      .with(
        tracing_subscriber::fmt::layer()
          .pretty()
          .with_file(false)
          .with_line_number(false),
      )
      .with(otel_tracer.clone().map(OpenTelemetryLayer::new))
      .try_init(),
    StdioLogMode::Standard => registry
      .with(
        tracing_subscriber::fmt::layer()
          .with_file(false)
          .with_line_number(false),
      )
      .with(otel_tracer.clone().map(OpenTelemetryLayer::new))
      .try_init(),
    StdioLogMode::Json => registry
      .with(tracing_subscriber::fmt::layer().json())
      .with(otel_tracer.clone().map(OpenTelemetryLayer::new))
      .try_init(),
    StdioLogMode::None => {
      if otel_tracer.is_none() {
        return Ok(());
      }
      registry
        .with(otel_tracer.map(OpenTelemetryLayer::new))
        .try_init()
    }
  }
  .context("failed to init logger")
}
