// Copyright 2025 MaidSafe.net limited.
//
// This SAFE Network Software is licensed to you under The General Public License (GPL), version 3.
// Unless required by applicable law or agreed to in writing, the SAFE Network Software distributed
// under the GPL Licence is distributed on an "AS IS" BASIS, WITHOUT WARRANTIES OR CONDITIONS OF ANY
// KIND, either express or implied. Please review the Licences for the specific language governing
// permissions and limitations relating to use of the SAFE Network Software.


use crate::error::{Error, Result};
use crate::{LogFormat, LogOutputDest};
use std::collections::BTreeMap;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_core::Level;
use tracing_subscriber::filter::Targets;
use tracing_subscriber::fmt::writer::BoxMakeWriter;
use tracing_subscriber::fmt::TestWriter;
use tracing_subscriber::{fmt as tracing_fmt, Layer, Registry};

/// Environment variable overriding the default logging targets.
pub(crate) const SKY_LOG_ENV: &str = "SKY_LOG";

const ALL_SKY_LOGS: &str = "all";
const VERBOSE_SKY_LOGS: &str = "v";

/// Crates enabled by the `all` and `v` keywords.
const SKY_CRATES: [&str; 4] = ["skydb", "sky_protocol", "sky_logging", "test_utils"];

const LOG_FILE_NAME: &str = "skydb.log";

/// Where the `fmt` output goes.
pub(crate) enum LogWriter {
    Dest(LogOutputDest),
    /// Captured by the test harness.
    Test,
}

#[derive(Default)]
pub(crate) struct TracingLayers {
    pub(crate) layers: Vec<Box<dyn Layer<Registry> + Send + Sync>>,
    pub(crate) log_appender_guard: Option<WorkerGuard>,
}

impl TracingLayers {
    /// Adds the `fmt` layer, filtered by `SKY_LOG` when set or by `default_logging_targets` otherwise.
    pub(crate) fn fmt_layer(
        &mut self,
        default_logging_targets: Vec<(String, Level)>,
        writer: LogWriter,
        format: LogFormat,
        print_updates_to_stdout: bool,
    ) -> Result<()> {
        let make_writer = match writer {
            LogWriter::Dest(LogOutputDest::Stdout) => BoxMakeWriter::new(std::io::stdout),
            LogWriter::Dest(LogOutputDest::Stderr) => BoxMakeWriter::new(std::io::stderr),
            LogWriter::Dest(LogOutputDest::Path(dir)) => {
                std::fs::create_dir_all(&dir)?;
                if print_updates_to_stdout {
                    println!("Logging to directory: {dir:?}");
                }
                let file_appender = tracing_appender::rolling::never(dir, LOG_FILE_NAME);
                let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);
                self.log_appender_guard = Some(guard);
                BoxMakeWriter::new(non_blocking)
            }
            LogWriter::Test => BoxMakeWriter::new(TestWriter::new()),
        };

        let targets = match std::env::var(SKY_LOG_ENV) {
            Ok(sky_log_val) => {
                if print_updates_to_stdout {
                    println!("Using {SKY_LOG_ENV}={sky_log_val}");
                }
                get_logging_targets(&sky_log_val)?
            }
            Err(_) => default_logging_targets,
        };
        let target_filters = Targets::new().with_targets(targets);

        let layer = match format {
            LogFormat::Json => tracing_fmt::layer()
                .json()
                .flatten_event(true)
                .with_writer(make_writer)
                .with_filter(target_filters)
                .boxed(),
            LogFormat::Default => tracing_fmt::layer()
                .with_ansi(false)
                .with_target(true)
                .with_writer(make_writer)
                .with_filter(target_filters)
                .boxed(),
        };
        self.layers.push(layer);
        Ok(())
    }
}

/// Parses a `SKY_LOG` value such as `all,skydb=info` into logging targets.
///
/// `all` turns on TRACE for every SkyDB crate and `v` turns on DEBUG. Explicit
/// `crate=level` pairs take precedence over the keywords, and a crate listed
/// without a level logs at TRACE.
pub(crate) fn get_logging_targets(logging_env_value: &str) -> Result<Vec<(String, Level)>> {
    let mut explicit_targets = BTreeMap::new();
    let mut keyword_level = None;

    for crate_log_level in logging_env_value.split(',').map(str::trim) {
        match crate_log_level {
            "" => continue,
            ALL_SKY_LOGS => keyword_level = Some(Level::TRACE),
            VERBOSE_SKY_LOGS => {
                keyword_level.get_or_insert(Level::DEBUG);
            }
            _ => {
                let mut split = crate_log_level.splitn(2, '=');
                let crate_name = split.next().unwrap_or_default();
                let log_level = match split.next() {
                    Some(level) => get_log_level_from_str(level)?,
                    None => Level::TRACE,
                };
                explicit_targets.insert(crate_name.to_string(), log_level);
            }
        }
    }

    let mut targets: BTreeMap<String, Level> = match keyword_level {
        Some(level) => SKY_CRATES
            .iter()
            .map(|name| (name.to_string(), level))
            .collect(),
        None => BTreeMap::new(),
    };
    targets.extend(explicit_targets);
    Ok(targets.into_iter().collect())
}

fn get_log_level_from_str(log_level: &str) -> Result<Level> {
    match log_level.to_lowercase().as_str() {
        "error" | "1" => Ok(Level::ERROR),
        "warn" | "2" => Ok(Level::WARN),
        "info" | "3" => Ok(Level::INFO),
        "debug" | "4" => Ok(Level::DEBUG),
        "trace" | "5" => Ok(Level::TRACE),
        other => Err(Error::LoggingConfiguration(format!(
            "Log level {other:?} is not supported, use error, warn, info, debug or trace"
        ))),
    }
}
