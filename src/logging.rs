//! Log context built once at startup and handed to `tracing` as a [`Dispatch`].
//!
//! Nothing here installs a global subscriber, callers scope the dispatch with
//! [`tracing::dispatcher::with_default`].

use std::fmt;
use std::io;
use std::str::FromStr;

use chrono::Local;
use clap::ValueEnum;
use tracing::{Dispatch, Event, Level, Subscriber};
use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::fmt::format::{self, FormatEvent, FormatFields};
use tracing_subscriber::fmt::{FmtContext, MakeWriter};
use tracing_subscriber::registry::LookupSpan;

const TIME_FORMAT: &str = "%d.%m.%y %H:%M:%S";

/// Numeric log levels accepted on the command line.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LogLevel {
    NotSet,   // 0
    Debug,    // 10
    Info,     // 20
    Warning,  // 30
    Error,    // 40
    Critical, // 50
}

impl FromStr for LogLevel {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "0" => Ok(LogLevel::NotSet),
            "10" => Ok(LogLevel::Debug),
            "20" => Ok(LogLevel::Info),
            "30" => Ok(LogLevel::Warning),
            "40" => Ok(LogLevel::Error),
            "50" => Ok(LogLevel::Critical),
            other => Err(format!("log level must be 0, 10, 20, 30, 40 or 50, got '{}'", other)),
        }
    }
}

impl LogLevel {
    /// Nothing is ever logged as critical, so that level silences the log.
    pub fn filter(self) -> LevelFilter {
        match self {
            LogLevel::NotSet => LevelFilter::TRACE,
            LogLevel::Debug => LevelFilter::DEBUG,
            LogLevel::Info => LevelFilter::INFO,
            LogLevel::Warning => LevelFilter::WARN,
            LogLevel::Error => LevelFilter::ERROR,
            LogLevel::Critical => LevelFilter::OFF,
        }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, ValueEnum)]
pub enum LogFormat {
    /// ` timestamp :: logger :: LEVEL :: message`
    #[default]
    Text,
    /// one json object per event
    Json,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct LogConfig {
    pub level: LogLevel,
    pub format: LogFormat,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self { level: LogLevel::Info, format: LogFormat::Text }
    }
}

impl LogConfig {

    /// dispatch writing to standard error
    pub fn dispatch(&self) -> Dispatch {
        self.dispatch_to(io::stderr)
    }

    pub fn dispatch_to<W>(&self, writer: W) -> Dispatch
    where
        W: for<'w> MakeWriter<'w> + Send + Sync + 'static,
    {
        let builder = tracing_subscriber::fmt()
            .with_max_level(self.level.filter())
            .with_ansi(false)
            .with_writer(writer);

        match self.format {
            LogFormat::Text => Dispatch::new(builder.event_format(LineFormat).finish()),
            LogFormat::Json => Dispatch::new(builder.json().finish()),
        }
    }
}

/// Formats events as ` 19.10.26 14:03:59 :: word2vec_sim::corpus :: INFO     :: message`.
pub struct LineFormat;

fn level_name(level: &Level) -> &'static str {
    match *level {
        Level::TRACE => "TRACE",
        Level::DEBUG => "DEBUG",
        Level::INFO => "INFO",
        Level::WARN => "WARNING",
        Level::ERROR => "ERROR",
    }
}

impl<S, N> FormatEvent<S, N> for LineFormat
where
    S: Subscriber + for<'a> LookupSpan<'a>,
    N: for<'a> FormatFields<'a> + 'static,
{
    fn format_event(&self, ctx: &FmtContext<'_, S, N>, mut writer: format::Writer<'_>, event: &Event<'_>) -> fmt::Result {
        let meta = event.metadata();
        write!(
            writer,
            " {} :: {} :: {:<8} :: ",
            Local::now().format(TIME_FORMAT),
            meta.target(),
            level_name(meta.level())
        )?;
        ctx.field_format().format_fields(writer.by_ref(), event)?;
        writeln!(writer)
    }
}
