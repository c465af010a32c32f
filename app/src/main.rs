use std::env;

use log::LevelFilter;
use rustyline::{error::ReadlineError, Editor};

use rusty_cli::{ChannelLogger, Shell};
use rusty_events::{Config, UnregisterMode};

/// `RUSTY_EVENTS_UNREGISTER=remove` makes `off` remove listeners.
/// `RUSTY_EVENTS_LOG=<level>` sets the log level; `trace` also traces every invocation.
fn config_from(unregister: Option<String>, log_level: Option<String>) -> (Config, LevelFilter) {
  let mut config = Config::default();
  if let Some(mode) = unregister {
    if mode.eq_ignore_ascii_case("remove") {
      config.unregister = UnregisterMode::Remove;
    }
  }
  let level = log_level
    .and_then(|level| level.parse::<LevelFilter>().ok())
    .unwrap_or(LevelFilter::Info);
  config.trace_dispatch = level == LevelFilter::Trace;
  (config, level)
}

fn main() {
  let (config, level) = config_from(
    env::var("RUSTY_EVENTS_UNREGISTER").ok(),
    env::var("RUSTY_EVENTS_LOG").ok(),
  );
  let (logger, log_recv) = ChannelLogger::with_receiver(level);
  if let Err(err) = logger.install() {
    eprintln!("logging disabled: {}", err);
  }

  let mut shell = Shell::new(config);
  let mut editor = Editor::<()>::new();
  println!("rusty-events ({} mode), type `help` for commands", config.unregister);

  while shell.is_running() {
    match editor.readline("events> ") {
      Ok(line) => {
        if line.trim().is_empty() {
          continue;
        }
        editor.add_history_entry(line.as_str());
        match shell.handle_line(&line) {
          Ok(out) => out.iter().for_each(|l| println!("{}", l)),
          Err(err) => {
            shell.take_received().iter().for_each(|l| println!("{}", l));
            eprintln!("error: {}", err);
          }
        }
        // Flush whatever the bus logged while handling the line
        for msg in log_recv.try_iter() {
          println!("{}", msg);
        }
      }
      Err(ReadlineError::Interrupted) | Err(ReadlineError::Eof) => break,
      Err(err) => {
        eprintln!("error: {}", err);
        break;
      }
    }
  }
}
