use crossbeam::channel::{Receiver, Sender, unbounded};
use log::{Level, LevelFilter, Metadata, Record, SetLoggerError};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogMessage {
  pub level: Level,
  pub target: String,
  pub message: String,
}

impl std::fmt::Display for LogMessage {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    write!(f, "[{:<5} {}] {}", self.level, self.target, self.message)
  }
}

/// `log` backend that forwards records over a channel, so the shell can print
/// them between command outputs instead of interleaving with the prompt.
pub struct ChannelLogger {
  sender: Sender<LogMessage>,
  level: LevelFilter,
}

impl log::Log for ChannelLogger {
  fn enabled(&self, metadata: &Metadata) -> bool {
    metadata.level() <= self.level
  }

  fn log(&self, record: &Record) {
    if self.enabled(record.metadata()) {
      // Receiver gone means the shell is shutting down.
      let _ = self.sender.try_send(LogMessage {
        level: record.level(),
        target: record.target().to_string(),
        message: format!("{}", record.args()),
      });
    }
  }

  fn flush(&self) {}
}

impl ChannelLogger {
  pub fn new(sender: Sender<LogMessage>, level: LevelFilter) -> Self {
    Self { sender, level }
  }

  pub fn with_receiver(level: LevelFilter) -> (Self, Receiver<LogMessage>) {
    let (sender, receiver) = unbounded();
    (Self::new(sender, level), receiver)
  }

  /// Install as the global logger.
  pub fn install(self) -> Result<(), SetLoggerError> {
    let level = self.level;
    log::set_boxed_logger(Box::new(self))?;
    log::set_max_level(level);
    Ok(())
  }
}
