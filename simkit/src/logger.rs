use log::{LevelFilter, Log, Metadata, Record};

use crate::error::Result;

/// Trace flags collected from the command line.
#[derive(Debug, Default, Clone, Copy)]
pub struct Flags {
    /// `-v`: print the operations
    pub verbose: bool,
    /// `-q`: print the queues as well
    pub queue: bool,
}

impl Flags {
    pub fn level(&self) -> LevelFilter {
        if self.queue {
            LevelFilter::Trace
        } else if self.verbose {
            LevelFilter::Debug
        } else {
            LevelFilter::Warn
        }
    }
}

struct TraceLogger {
    level: LevelFilter,
}

impl Log for TraceLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= self.level
    }

    fn log(&self, record: &Record) {
        if !self.enabled(record.metadata()) {
            return;
        }
        match record.level() {
            log::Level::Error | log::Level::Warn => {
                eprintln!("{}: {}", record.level(), record.args())
            }
            _ => eprintln!("{}", record.args()),
        }
    }

    fn flush(&self) {}
}

/// Installs the stderr logger. Call once, from `main`.
pub fn init(flags: Flags) -> Result<()> {
    let level = flags.level();
    log::set_boxed_logger(Box::new(TraceLogger { level }))?;
    log::set_max_level(level);
    Ok(())
}
