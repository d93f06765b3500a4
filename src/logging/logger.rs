use std::{cell::Cell, io::Write, sync::Arc};

use eyre::Context;
use log::{LevelFilter, Log};

use super::{
    formatters::DefaultFormatter,
    sinks::{NullSink, StdoutSink, WriterSink},
    Caller, Level, LogFormatter, LogSink, Record,
};
use crate::printf::{sprintf, Arg};

#[derive(Debug, Clone)]
pub struct Config {
    /// chrono strftime pattern for the bracketed timestamp.
    pub datetime_format: String,
    pub use_ansi: bool,
    /// Reserved, never consulted.
    pub count_lines: bool,
    /// Reserved, never consulted.
    pub count_chars: bool,
}

impl Config {
    pub fn new() -> Self {
        Self {
            datetime_format: "%H:%M:%S".to_string(),
            use_ansi: false,
            count_lines: false,
            count_chars: false,
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::new()
    }
}

/// Routes each severity to its own sink.
///
/// Every level starts out discarded. Configuration calls take `&mut self` and
/// return it, so they chain:
///
/// ```
/// use sinklog::Logger;
///
/// let mut logger = Logger::new();
/// logger.set_sinks_to_stdout().discard_trace();
/// logger.info("listening on port %d", &[8080.into()]);
/// ```
///
/// # Caller identifiers
///
/// The methods (`logger.info(...)`) attribute a line to its `file:line` call
/// site through `#[track_caller]`. Only the macros (`sinklog::info!(logger, ...)`)
/// report the name of the enclosing function, e.g. `my_app::server::accept`.
///
/// # Fatal
///
/// [`Logger::fatal`] writes its line and then panics with that line as the
/// payload. This ends the current thread (or the process, under
/// `panic = "abort"`) unless a caller intercepts it with
/// [`std::panic::catch_unwind`].
pub struct Logger {
    sinks: [Arc<dyn LogSink>; 5],
    formatter: Box<dyn LogFormatter>,
    config: Config,
}

macro_rules! level_configuration {
    ($($level:ident => $set:ident, $stdout:ident, $discard:ident;)*) => {
        $(
            #[doc = concat!("Sends `", stringify!($level), "` lines to `writer`.")]
            pub fn $set(&mut self, writer: impl Write + Send + 'static) -> &mut Self {
                self.set_sink(Level::$level, Arc::new(WriterSink::new(writer)))
            }

            #[doc = concat!("Sends `", stringify!($level), "` lines to standard output.")]
            pub fn $stdout(&mut self) -> &mut Self {
                self.to_stdout(Level::$level)
            }

            #[doc = concat!("Drops `", stringify!($level), "` lines.")]
            pub fn $discard(&mut self) -> &mut Self {
                self.discard(Level::$level)
            }
        )*
    };
}

macro_rules! level_operations {
    ($($level:ident => $name:ident;)*) => {
        $(
            #[doc = concat!("Writes a `", stringify!($name), "` line attributed to the call site.")]
            #[track_caller]
            pub fn $name(&self, template: &str, args: &[Arg<'_>]) {
                self.log(Level::$level, &Caller::here(), template, args)
            }
        )*
    };
}

impl Logger {
    pub fn new() -> Self {
        Self::with_config(Config::new())
    }

    pub fn with_config(config: Config) -> Self {
        let discard: Arc<dyn LogSink> = Arc::new(NullSink::new());
        Self {
            sinks: std::array::from_fn(|_| discard.clone()),
            formatter: Box::new(DefaultFormatter::new(config.clone())),
            config,
        }
    }

    pub fn with_formatter(mut self, formatter: impl LogFormatter + 'static) -> Self {
        self.formatter = Box::new(formatter);
        self
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn sink(&self, level: Level) -> &Arc<dyn LogSink> {
        &self.sinks[level.index()]
    }

    pub fn set_sink(&mut self, level: Level, sink: Arc<dyn LogSink>) -> &mut Self {
        self.sinks[level.index()] = sink;
        self
    }

    /// Binds one sink to every level.
    pub fn set_all_sinks(&mut self, sink: Arc<dyn LogSink>) -> &mut Self {
        for level in Level::ALL {
            self.set_sink(level, sink.clone());
        }
        self
    }

    /// Shares `writer` between every level.
    pub fn set_all_sinks_to(&mut self, writer: impl Write + Send + 'static) -> &mut Self {
        self.set_all_sinks(Arc::new(WriterSink::new(writer)))
    }

    pub fn set_sinks_to_stdout(&mut self) -> &mut Self {
        self.set_all_sinks(Arc::new(StdoutSink::new()))
    }

    pub fn discard_all(&mut self) -> &mut Self {
        self.set_all_sinks(Arc::new(NullSink::new()))
    }

    pub fn set_level_sink_to(
        &mut self,
        level: Level,
        writer: impl Write + Send + 'static,
    ) -> &mut Self {
        self.set_sink(level, Arc::new(WriterSink::new(writer)))
    }

    pub fn to_stdout(&mut self, level: Level) -> &mut Self {
        self.set_sink(level, Arc::new(StdoutSink::new()))
    }

    pub fn discard(&mut self, level: Level) -> &mut Self {
        self.set_sink(level, Arc::new(NullSink::new()))
    }

    level_configuration! {
        Fatal => set_fatal_sink, fatal_to_stdout, discard_fatal;
        Error => set_error_sink, error_to_stdout, discard_error;
        Warn => set_warn_sink, warn_to_stdout, discard_warn;
        Info => set_info_sink, info_to_stdout, discard_info;
        Trace => set_trace_sink, trace_to_stdout, discard_trace;
    }

    level_operations! {
        Error => error;
        Warn => warn;
        Info => info;
        Trace => trace;
    }

    /// Writes a `fatal` line attributed to the call site, then panics with it.
    #[track_caller]
    pub fn fatal(&self, template: &str, args: &[Arg<'_>]) -> ! {
        self.fatal_from(&Caller::here(), template, args)
    }

    /// Writes a `fatal` line attributed to `caller`, then panics with it.
    pub fn fatal_from(&self, caller: &Caller, template: &str, args: &[Arg<'_>]) -> ! {
        let line = self.compose(Level::Fatal, caller, sprintf(template, args));
        if let Err(err) = self.sink(Level::Fatal).write_line(&line) {
            report_write_failure(Level::Fatal, &err);
        }
        std::panic::panic_any(line)
    }

    /// Formats and writes one line. A sink failure is reported through
    /// `tracing` and otherwise dropped.
    pub fn log(&self, level: Level, caller: &Caller, template: &str, args: &[Arg<'_>]) {
        if let Err(err) = self.try_log(level, caller, template, args) {
            report_write_failure(level, &err);
        }
    }

    /// Like [`Logger::log`], but hands the sink failure back to the caller.
    pub fn try_log(
        &self,
        level: Level,
        caller: &Caller,
        template: &str,
        args: &[Arg<'_>],
    ) -> eyre::Result<()> {
        if level == Level::Fatal {
            self.fatal_from(caller, template, args);
        }
        self.emit(level, caller, sprintf(template, args))
    }

    pub fn flush(&self) -> eyre::Result<()> {
        for (index, sink) in self.sinks.iter().enumerate() {
            let already_flushed = self.sinks[..index]
                .iter()
                .any(|other| Arc::ptr_eq(other, sink));
            if !already_flushed {
                sink.flush()?;
            }
        }
        Ok(())
    }

    /// Installs this logger behind the `log` facade.
    pub fn init(self) -> eyre::Result<()> {
        log::set_max_level(LevelFilter::Trace);
        log::set_boxed_logger(Box::new(self)).context("Failed registering boxed logger")?;

        Ok(())
    }

    fn emit(&self, level: Level, caller: &Caller, message: String) -> eyre::Result<()> {
        let line = self.compose(level, caller, message);
        self.sink(level).write_line(&line)
    }

    fn compose(&self, level: Level, caller: &Caller, message: String) -> String {
        self.formatter.format(&Record {
            level,
            caller: caller.clone(),
            message,
            time: chrono::Local::now(),
        })
    }
}

impl Default for Logger {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for Logger {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut debug = f.debug_struct("Logger");
        for level in Level::ALL {
            debug.field(level.as_str(), self.sink(level));
        }
        debug.field("config", &self.config).finish()
    }
}

fn report_write_failure(level: Level, err: &eyre::Report) {
    tracing::warn!(%level, error = %err, "failed writing log line");
}

thread_local! {
    static IN_FACADE: Cell<bool> = const { Cell::new(false) };
}

/// Held while a facade record is being written. Our own `tracing` diagnostics
/// can come back through `log` (when `tracing`'s `log` feature is on); those
/// nested records are dropped so a failing sink is reported once.
struct FacadeGuard;

impl FacadeGuard {
    fn enter() -> Option<Self> {
        if IN_FACADE.with(|active| active.replace(true)) {
            None
        } else {
            Some(FacadeGuard)
        }
    }
}

impl Drop for FacadeGuard {
    fn drop(&mut self) {
        IN_FACADE.with(|active| active.set(false));
    }
}

impl Log for Logger {
    fn enabled(&self, _metadata: &log::Metadata) -> bool {
        true
    }

    fn log(&self, record: &log::Record) {
        let Some(_guard) = FacadeGuard::enter() else {
            return;
        };

        let level = Level::from(record.level());
        let caller = Caller::named(record.module_path().unwrap_or(record.target()));

        if let Err(err) = self.emit(level, &caller, record.args().to_string()) {
            report_write_failure(level, &err);
        }
    }

    fn flush(&self) {
        let Some(_guard) = FacadeGuard::enter() else {
            return;
        };

        if let Err(err) = Logger::flush(self) {
            tracing::warn!(error = %err, "failed flushing log sinks");
        }
    }
}
