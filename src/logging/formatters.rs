use yansi::{Paint, Painted};

use super::{logger::Config, Level, LogFormatter, Record};

/// Renders ` [HH:MM:SS] <caller> (<level>): <message>`.
pub struct DefaultFormatter {
    config: Config,
}

impl DefaultFormatter {
    pub fn new(config: Config) -> Self {
        Self { config }
    }

    fn timestamp(&self, record: &Record) -> String {
        record
            .time
            .format(&self.config.datetime_format)
            .to_string()
    }

    fn format_level(&self, level: Level) -> String {
        if !self.config.use_ansi {
            return level.as_str().to_string();
        }

        let tag: Painted<&str> = match level {
            Level::Fatal => level.as_str().magenta().bold(),
            Level::Error => level.as_str().red(),
            Level::Warn => level.as_str().yellow(),
            Level::Info => level.as_str().green(),
            Level::Trace => level.as_str().dim(),
        };
        tag.whenever(yansi::Condition::ALWAYS).to_string()
    }
}

impl LogFormatter for DefaultFormatter {
    fn format(&self, record: &Record) -> String {
        format!(
            " [{}] {} ({}): {}",
            self.timestamp(record),
            record.caller,
            self.format_level(record.level),
            record.message,
        )
    }
}
