use clap::ValueEnum;
use tracing::{Level, Subscriber};
use tracing_subscriber::{
    fmt::{self, MakeWriter},
    layer::SubscriberExt,
    registry::LookupSpan,
    util::SubscriberInitExt,
    EnvFilter, Layer,
};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum LogFormat {
    /// `LEVEL message`, for interactive use
    #[default]
    Cli,
    /// Timestamp, thread name, level and target on every line
    Service,
}

pub fn service_layer<S, W>(writer: W) -> impl Layer<S> + Send + Sync + 'static
where
    S: Subscriber + for<'a> LookupSpan<'a>,
    W: for<'w> MakeWriter<'w> + Send + Sync + 'static,
{
    fmt::layer()
        .with_thread_names(true)
        .with_target(true)
        .with_ansi(false)
        .with_writer(writer)
}

pub fn cli_layer<S, W>(writer: W) -> impl Layer<S> + Send + Sync + 'static
where
    S: Subscriber + for<'a> LookupSpan<'a>,
    W: for<'w> MakeWriter<'w> + Send + Sync + 'static,
{
    fmt::layer()
        .without_time()
        .with_target(false)
        .with_writer(writer)
}

/// Installs the process-wide subscriber. Must be called once, at start up.
pub fn init(format: LogFormat) {
    let env_filter = EnvFilter::builder()
        .with_default_directive(Level::INFO.into())
        .with_env_var("RUST_LOG")
        .from_env_lossy();

    match format {
        LogFormat::Service => tracing_subscriber::registry()
            .with(service_layer(std::io::stdout))
            .with(env_filter)
            .init(),
        LogFormat::Cli => tracing_subscriber::registry()
            .with(cli_layer(std::io::stdout))
            .with(env_filter)
            .init(),
    }
}
