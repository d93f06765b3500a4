// `tracing` is built with its `log` feature for tests, so the warning emitted
// for a failed write is itself forwarded to the installed logger.

mod common;

use std::io::{self, Write};

use common::{strip_time, TestWriter};
use sinklog::Logger;

struct Closed;

impl Write for Closed {
    fn write(&mut self, _buf: &[u8]) -> io::Result<usize> {
        Err(io::ErrorKind::BrokenPipe.into())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

#[test]
fn failing_sink_behind_facade_reports_once() {
    let infos = TestWriter::default();
    let mut logger = Logger::new();
    logger.set_warn_sink(Closed).set_info_sink(infos.clone());
    logger.init().unwrap();

    log::warn!("disk full");
    log::info!("still running");

    assert_eq!(
        strip_time(&infos.output()),
        ["facade_failure (info): still running"]
    );
}
