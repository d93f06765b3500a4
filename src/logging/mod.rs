mod caller;
mod formatters;
mod level;
mod logger;
mod macros;
mod sinks;

use std::fmt;

pub use caller::Caller;
pub use formatters::DefaultFormatter;
pub use level::Level;
pub use logger::{Config, Logger};
pub use sinks::{FileSink, NullSink, StderrSink, StdoutSink, WriterSink};

/// One message on its way to a sink.
#[derive(Debug, Clone)]
pub struct Record {
    pub level: Level,
    pub caller: Caller,
    pub message: String,
    pub time: chrono::DateTime<chrono::Local>,
}

pub trait LogFormatter: Sync + Send {
    fn format(&self, record: &Record) -> String;
}

/// A destination for formatted lines. A sink only sees complete lines and
/// appends the terminator itself.
pub trait LogSink: fmt::Debug + Sync + Send {
    fn write_line(&self, line: &str) -> eyre::Result<()>;
    fn flush(&self) -> eyre::Result<()>;
}
