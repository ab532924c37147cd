// src/syslog_sink.rs
//! The system log interface from spec.md §6: a thin wrapper over the `cron` syslog facility,
//! used by the spawner to report what the parent process can observe about a spawn (it cannot
//! see the child's eventual exit status; see spec.md §5).

use std::io;

use syslog::{BasicLogger, Facility, Formatter3164};

/// A handle to the local syslog daemon, logging under the `cron` facility.
pub struct SyslogSink {
    logger: BasicLogger,
}

impl SyslogSink {
    /// Connect to the local syslog daemon.
    ///
    /// # Errors
    ///
    /// Propagates any `io::Error` from establishing the syslog connection.
    pub fn new() -> io::Result<Self> {
        let formatter = Formatter3164 {
            facility: Facility::LOG_CRON,
            hostname: None,
            process: "rincron".into(),
            pid: std::process::id(),
        };
        let logger = syslog::unix(formatter)
            .map_err(|err| io::Error::new(io::ErrorKind::Other, err.to_string()))?;
        Ok(Self {
            logger: BasicLogger::new(logger),
        })
    }

    /// Log an informational record.
    pub fn notice(&mut self, message: &str) {
        self.log(log::Level::Info, message);
    }

    /// Log an error record.
    pub fn err(&mut self, message: &str) {
        self.log(log::Level::Error, message);
    }

    fn log(&mut self, level: log::Level, message: &str) {
        use log::Log;

        self.logger.log(
            &log::Record::builder()
                .level(level)
                .args(format_args!("{}", message))
                .build(),
        );
    }
}
