//! Shared helpers for the integration tests.

use std::{
    io::{self, Write},
    sync::{Arc, Mutex},
};

/// Captures everything written to it.
#[derive(Clone, Default)]
pub struct TestWriter {
    buffer: Arc<Mutex<Vec<u8>>>,
}

impl TestWriter {
    pub fn output(&self) -> String {
        String::from_utf8_lossy(&self.buffer.lock().unwrap()).to_string()
    }
}

impl Write for TestWriter {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.buffer
            .lock()
            .map_err(|_| io::Error::other("Mutex poisoned"))?
            .extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

/// Checks the ` [HH:MM:SS] ` prefix of every line and returns the rest.
pub fn strip_time(output: &str) -> Vec<String> {
    output
        .lines()
        .map(|line| {
            let (time, rest) = line
                .strip_prefix(" [")
                .and_then(|line| line.split_once("] "))
                .unwrap_or_else(|| panic!("no timestamp in {:?}", line));
            let fields: Vec<&str> = time.split(':').collect();
            assert_eq!(fields.len(), 3, "bad timestamp {:?}", time);
            for field in fields {
                assert_eq!(field.len(), 2, "bad timestamp {:?}", time);
                assert!(field.chars().all(|c| c.is_ascii_digit()));
            }
            rest.to_string()
        })
        .collect()
}
