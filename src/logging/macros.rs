//! Leveled logging macros.
//!
//! Unlike the `Logger` methods, which attribute a line to its `file:line`
//! call site, the macros attribute it to the enclosing function:
//!
//! ```
//! let mut logger = sinklog::Logger::new();
//! logger.info_to_stdout();
//! sinklog::info!(logger, "value=%d", 42);
//! // prints " [14:03:27] rust_out::main (info): value=42"
//! ```

#[doc(hidden)]
#[macro_export]
macro_rules! __log {
    ($logger:expr, $level:expr, $template:expr $(, $arg:expr)* $(,)?) => {
        $logger.log(
            $level,
            &$crate::caller!(),
            $template,
            &[$($crate::Arg::from($arg)),*],
        )
    };
}

/// Writes a fatal line, then panics with it.
#[macro_export]
macro_rules! fatal {
    ($logger:expr, $template:expr $(, $arg:expr)* $(,)?) => {
        $logger.fatal_from(
            &$crate::caller!(),
            $template,
            &[$($crate::Arg::from($arg)),*],
        )
    };
}

#[macro_export]
macro_rules! error {
    ($logger:expr, $($rest:tt)+) => {
        $crate::__log!($logger, $crate::Level::Error, $($rest)+)
    };
}

#[macro_export]
macro_rules! warn {
    ($logger:expr, $($rest:tt)+) => {
        $crate::__log!($logger, $crate::Level::Warn, $($rest)+)
    };
}

#[macro_export]
macro_rules! info {
    ($logger:expr, $($rest:tt)+) => {
        $crate::__log!($logger, $crate::Level::Info, $($rest)+)
    };
}

#[macro_export]
macro_rules! trace {
    ($logger:expr, $($rest:tt)+) => {
        $crate::__log!($logger, $crate::Level::Trace, $($rest)+)
    };
}
