use opentelemetry_otlp::WithExportConfig;
use tracing::subscriber::set_global_default;
use tracing_bunyan_formatter::{BunyanFormattingLayer, JsonStorageLayer};
use tracing_log::LogTracer;
use tracing_subscriber::{fmt::MakeWriter, layer::SubscriberExt, EnvFilter, Registry};

const HONEYCOMB_ENDPOINT: &str = "api.honeycomb.io:443";

pub struct HoneycombConfig {
    pub team: String,
    pub dataset: String,
}

impl HoneycombConfig {
    /// Take the Honeycomb settings out of the config, if a team key was given.
    pub fn from_config(config: &mut crate::config::Config) -> Option<HoneycombConfig> {
        let team = config.honeycomb_team.take()?;
        Some(HoneycombConfig {
            team,
            dataset: std::mem::take(&mut config.honeycomb_dataset),
        })
    }
}

/// Install the global subscriber: `LOG` filtering, bunyan JSON to `console_sink`, and span
/// export to Honeycomb when configured.
pub fn configure<W>(
    name: impl Into<String>,
    console_sink: W,
    honeycomb_config: Option<HoneycombConfig>,
) -> Result<(), anyhow::Error>
where
    W: for<'a> MakeWriter<'a> + 'static + Send + Sync,
{
    LogTracer::builder()
        .with_max_level(log::LevelFilter::Debug)
        .init()?;

    let env_filter = EnvFilter::try_from_env("LOG").unwrap_or_else(|_| EnvFilter::new("info"));

    let formatting_layer = BunyanFormattingLayer::new(name.into(), console_sink);
    let subscriber = Registry::default()
        .with(env_filter)
        .with(JsonStorageLayer)
        .with(formatting_layer);

    match honeycomb_config {
        Some(honeycomb_config) => {
            let mut oltp_meta = tonic::metadata::MetadataMap::new();
            oltp_meta.insert("x-honeycomb-team", honeycomb_config.team.parse()?);

            let exporter = opentelemetry_otlp::new_exporter()
                .tonic()
                .with_endpoint(HONEYCOMB_ENDPOINT)
                .with_metadata(oltp_meta);

            let oltp = opentelemetry_otlp::new_pipeline()
                .tracing()
                .with_trace_config(opentelemetry::sdk::trace::config().with_resource(
                    opentelemetry::sdk::Resource::new(vec![opentelemetry::KeyValue::new(
                        "service.name",
                        honeycomb_config.dataset,
                    )]),
                ))
                .with_exporter(exporter)
                .install_batch(opentelemetry::runtime::TokioCurrentThread)?;
            let telemetry = tracing_opentelemetry::layer().with_tracer(oltp);

            set_global_default(subscriber.with(telemetry))?;
        }
        None => set_global_default(subscriber)?,
    }

    Ok(())
}

pub fn teardown() {
    opentelemetry::global::shutdown_tracer_provider();
}
