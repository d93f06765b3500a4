use std::{
    fmt,
    fs::File,
    io::{LineWriter, Write},
    path::{Path, PathBuf},
    sync::Mutex,
};

use eyre::Context;

use super::LogSink;

/// Drops every line. Every level starts out bound to one of these.
#[derive(Debug, Default)]
pub struct NullSink {}

impl NullSink {
    pub fn new() -> Self {
        Self {}
    }
}

impl LogSink for NullSink {
    fn write_line(&self, _line: &str) -> eyre::Result<()> {
        Ok(())
    }

    fn flush(&self) -> eyre::Result<()> {
        Ok(())
    }
}

#[derive(Debug)]
pub struct StdoutSink {
    handle: std::io::Stdout,
}

impl StdoutSink {
    pub fn new() -> Self {
        Self {
            handle: std::io::stdout(),
        }
    }
}

impl Default for StdoutSink {
    fn default() -> Self {
        Self::new()
    }
}

impl LogSink for StdoutSink {
    fn write_line(&self, line: &str) -> eyre::Result<()> {
        let mut writer = self.handle.lock();

        writeln!(writer, "{}", line)?;
        writer.flush().context("Can't flush stdout")
    }

    fn flush(&self) -> eyre::Result<()> {
        self.handle.lock().flush().context("Can't flush stdout")
    }
}

#[derive(Debug)]
pub struct StderrSink {
    handle: std::io::Stderr,
}

impl StderrSink {
    pub fn new() -> Self {
        Self {
            handle: std::io::stderr(),
        }
    }
}

impl Default for StderrSink {
    fn default() -> Self {
        Self::new()
    }
}

impl LogSink for StderrSink {
    fn write_line(&self, line: &str) -> eyre::Result<()> {
        let mut writer = self.handle.lock();

        writeln!(writer, "{}", line)?;
        writer.flush().context("Can't flush stderr")
    }

    fn flush(&self) -> eyre::Result<()> {
        self.handle.lock().flush().context("Can't flush stderr")
    }
}

/// Adapts any caller-owned writer: an in-memory buffer, a socket, a pipe.
///
/// Each line goes out in a single locked `writeln!`, so lines from different
/// threads never interleave within the writer.
pub struct WriterSink<W: Write + Send> {
    writer: Mutex<W>,
}

impl<W: Write + Send> WriterSink<W> {
    pub fn new(writer: W) -> Self {
        Self {
            writer: Mutex::new(writer),
        }
    }

    pub fn into_inner(self) -> eyre::Result<W> {
        self.writer
            .into_inner()
            .map_err(|e| eyre::eyre!(e.to_string()))
    }
}

impl<W: Write + Send> fmt::Debug for WriterSink<W> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WriterSink")
            .field("writer", &std::any::type_name::<W>())
            .finish()
    }
}

impl<W: Write + Send> LogSink for WriterSink<W> {
    fn write_line(&self, line: &str) -> eyre::Result<()> {
        let mut writer = self.writer.lock().map_err(|e| eyre::eyre!(e.to_string()))?;
        writeln!(writer, "{}", line).context("Failed writing log line")
    }

    fn flush(&self) -> eyre::Result<()> {
        let mut writer = self.writer.lock().map_err(|e| eyre::eyre!(e.to_string()))?;
        writer.flush().context("Can't flush writer")
    }
}

/// Appends lines to a file, creating it when missing.
pub struct FileSink {
    file: Mutex<LineWriter<File>>,
    file_path: PathBuf,
}

impl FileSink {
    pub fn new(path: impl AsRef<Path>) -> eyre::Result<Self> {
        let path = path.as_ref();
        let file = std::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(path)
            .with_context(|| format!("Failed opening or creating log file {}", path.display()))?;

        tracing::debug!(path = %path.display(), "opened log file");

        Ok(Self {
            file: Mutex::new(LineWriter::new(file)),
            file_path: path.to_path_buf(),
        })
    }

    pub fn path(&self) -> &Path {
        &self.file_path
    }
}

impl fmt::Debug for FileSink {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FileSink")
            .field("file_path", &self.file_path)
            .finish()
    }
}

impl LogSink for FileSink {
    fn write_line(&self, line: &str) -> eyre::Result<()> {
        let mut file = self.file.lock().map_err(|e| eyre::eyre!(e.to_string()))?;
        writeln!(file, "{}", line)?;
        file.flush().context("Can't flush file")
    }

    fn flush(&self) -> eyre::Result<()> {
        let mut file = self.file.lock().map_err(|e| eyre::eyre!(e.to_string()))?;
        file.flush().context("Can't flush file")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct BrokenPipe;

    impl Write for BrokenPipe {
        fn write(&mut self, _buf: &[u8]) -> std::io::Result<usize> {
            Err(std::io::ErrorKind::BrokenPipe.into())
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn writer_sink_terminates_lines() {
        let sink = WriterSink::new(Vec::new());
        sink.write_line("first").unwrap();
        sink.write_line("second").unwrap();

        let written = sink.into_inner().unwrap();
        assert_eq!(String::from_utf8(written).unwrap(), "first\nsecond\n");
    }

    #[test]
    fn writer_sink_surfaces_write_errors() {
        let sink = WriterSink::new(BrokenPipe);
        assert!(sink.write_line("lost").is_err());
    }

    #[test]
    fn stdout_sink_writes_and_flushes() {
        let sink = StdoutSink::new();
        assert!(sink.write_line(" [00:00:00] sinks::tests (info): stdout").is_ok());
        assert!(sink.flush().is_ok());
    }

    #[test]
    fn null_sink_accepts_everything() {
        let sink = NullSink::new();
        assert!(sink.write_line("ignored").is_ok());
        assert!(sink.flush().is_ok());
    }

    #[test]
    fn file_sink_appends() {
        let path = std::env::temp_dir().join(format!("sinklog-{}.log", uuid::Uuid::new_v4()));

        {
            let sink = FileSink::new(&path).unwrap();
            assert_eq!(sink.path(), path.as_path());
            sink.write_line("one").unwrap();
        }
        {
            let sink = FileSink::new(&path).unwrap();
            sink.write_line("two").unwrap();
        }

        let contents = std::fs::read_to_string(&path).unwrap();
        std::fs::remove_file(&path).unwrap();
        assert_eq!(contents, "one\ntwo\n");
    }

    #[test]
    fn file_sink_reports_unopenable_path() {
        let path = std::env::temp_dir()
            .join(format!("sinklog-missing-{}", uuid::Uuid::new_v4()))
            .join("app.log");
        let err = FileSink::new(&path).unwrap_err();
        assert!(err.to_string().contains("Failed opening or creating log file"));
    }
}
