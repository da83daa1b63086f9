use std::{collections::HashMap, time::Duration};

use color_eyre::{eyre::Context, Result};
use opentelemetry_otlp::WithExportConfig;
use sentry::ClientInitGuard;
use tracing_opentelemetry::OpenTelemetryLayer;
use tracing_subscriber::{prelude::*, EnvFilter, Registry};
use tracing_tree::HierarchicalLayer;

const DEFAULT_RUST_LOG: &str = "warn,family_fork=trace,db=debug,tower_http=debug";

pub fn setup_sentry() -> Option<ClientInitGuard> {
    let release_name = sentry::release_name!().unwrap_or_else(|| "dev".into());

    if let Ok(sentry_dsn) = std::env::var("SENTRY_DSN") {
        println!("Sentry enabled");

        Some(sentry::init((
            sentry_dsn,
            sentry::ClientOptions {
                traces_sample_rate: 0.5,
                release: Some(release_name),
                ..Default::default()
            },
        )))
    } else {
        println!("Sentry not configured in this environment");

        None
    }
}

/// Stdout tree logging, plus OTLP export when `OTEL_EXPORTER_OTLP_ENDPOINT` is set.
pub fn setup_tracing() -> Result<()> {
    let rust_log = std::env::var("RUST_LOG").unwrap_or_else(|_| DEFAULT_RUST_LOG.into());

    let env_filter = EnvFilter::builder()
        .parse(&rust_log)
        .wrap_err_with(|| format!("Couldn't create env filter from {rust_log}"))?;

    let opentelemetry_layer = if let Ok(endpoint) = std::env::var("OTEL_EXPORTER_OTLP_ENDPOINT") {
        let headers = std::env::var("OTEL_EXPORTER_OTLP_HEADERS")
            .map(|raw| parse_otlp_headers(&raw))
            .unwrap_or_default();

        let tracer = opentelemetry_otlp::new_pipeline()
            .tracing()
            .with_exporter(
                opentelemetry_otlp::new_exporter()
                    .http()
                    .with_endpoint(endpoint)
                    .with_timeout(Duration::from_secs(3))
                    .with_headers(headers),
            )
            .install_batch(opentelemetry_sdk::runtime::Tokio)?;

        println!("OTLP layer configured");

        Some(OpenTelemetryLayer::new(tracer))
    } else {
        println!("Skipping OTLP layer");

        None
    };

    let hierarchical = HierarchicalLayer::default()
        .with_writer(std::io::stdout)
        .with_indent_lines(true)
        .with_indent_amount(2)
        .with_thread_names(true)
        .with_thread_ids(true)
        .with_verbose_exit(true)
        .with_verbose_entry(true)
        .with_targets(true);

    Registry::default()
        .with(hierarchical)
        .with(opentelemetry_layer)
        .with(sentry_tracing::layer())
        .with(env_filter)
        .try_init()?;

    Ok(())
}

/// `key1=value1,key2=value2`, the format of `OTEL_EXPORTER_OTLP_HEADERS`.
fn parse_otlp_headers(raw: &str) -> HashMap<String, String> {
    raw.split(',')
        .filter_map(|pair| {
            let (key, value) = pair.split_once('=')?;
            let key = key.trim();
            (!key.is_empty()).then(|| (key.to_string(), value.trim().to_string()))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_otlp_headers() {
        let headers = parse_otlp_headers("x-team=abc, x-dataset = family-fork,broken");

        assert_eq!(headers.len(), 2);
        assert_eq!(headers["x-team"], "abc");
        assert_eq!(headers["x-dataset"], "family-fork");
    }
}
