//! Leveled logging with one sink per severity.
//!
//! A [`Logger`] routes `fatal`, `error`, `warn`, `info` and `trace` lines to
//! independently chosen destinations. Every line looks like
//!
//! ```text
//!  [14:03:27] my_app::server::accept (info): value=42
//! ```
//!
//! Messages use printf-style templates (see [`sprintf`]); a template that does
//! not match its arguments still logs, with an inline `%!` marker where the
//! mismatch happened.

mod logging;
mod printf;

pub use logging::{
    Caller, Config, DefaultFormatter, FileSink, Level, LogFormatter, LogSink, Logger, NullSink,
    Record, StderrSink, StdoutSink, WriterSink,
};
pub use printf::{sprintf, Arg};
