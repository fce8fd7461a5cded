// 📝 Logging - explicit tracing dispatch built from configuration
//
// Nothing here installs a global subscriber. Callers get a `Dispatch` and
// pass it to the job, which runs with it as the scoped default.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs::OpenOptions;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::Dispatch;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::{fmt, EnvFilter, Layer, Registry};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    /// `timestamp LEVEL target: message fields`
    #[default]
    Full,
    /// Shorter single-line form
    Compact,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LogConfig {
    /// Log file, opened in append mode. `None` disables file output.
    pub file: Option<PathBuf>,
    /// `EnvFilter` directive, e.g. `debug` or `info,vendor_summary=debug`
    pub level: String,
    pub format: LogFormat,
    /// Also log to stderr
    pub stderr: bool,
}

impl Default for LogConfig {
    fn default() -> Self {
        LogConfig {
            file: Some(PathBuf::from("logs/vendor_summary.log")),
            level: "debug".to_string(),
            format: LogFormat::Full,
            stderr: false,
        }
    }
}

type BoxedLayer = Box<dyn Layer<Registry> + Send + Sync>;

fn format_layer<W>(format: LogFormat, writer: W, ansi: bool) -> BoxedLayer
where
    W: for<'w> fmt::MakeWriter<'w> + Send + Sync + 'static,
{
    let layer = fmt::layer().with_writer(writer).with_ansi(ansi);
    match format {
        LogFormat::Full => layer.boxed(),
        LogFormat::Compact => layer.compact().boxed(),
    }
}

/// Build a dispatch handle for `config`
pub fn build_dispatch(config: &LogConfig) -> Result<Dispatch> {
    let filter = EnvFilter::try_new(&config.level)
        .with_context(|| format!("Invalid log level directive: {:?}", config.level))?;

    let mut layers: Vec<BoxedLayer> = Vec::new();

    if let Some(path) = &config.file {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Cannot create log directory {}", parent.display()))?;
        }

        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(path)
            .with_context(|| format!("Cannot open log file {}", path.display()))?;

        layers.push(format_layer(config.format, Arc::new(file), false));
    }

    if config.stderr {
        layers.push(format_layer(config.format, std::io::stderr, true));
    }

    let subscriber = Registry::default().with(layers).with(filter);

    Ok(Dispatch::new(subscriber))
}
