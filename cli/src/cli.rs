use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

use rusty_events::{Callback, Config, EventBus, ListenerError, NamedScope, Scope};
use serde_json::Value;

use crate::command::{ANONYMOUS, Command, CommandError};

const HELP: &str = "\
on <type> [label] [args...]      register a listener (label `-` = anonymous)
fail <type> <message...>         register a listener that always fails
off <type> [label]               look up a listener (removes it in remove mode)
emit <type> [params] [args...]   dispatch an event
list                             describe every listener
exit                             leave the shell";

/// The callback and scope behind one label. Reused on every `on` with that
/// label, so `off` can find it again.
struct Handle {
  callback: Callback,
  scope: Option<Rc<dyn Scope>>,
}

/// Command interpreter driving one shared bus.
pub struct Shell {
  bus: Rc<EventBus>,
  running: bool,
  handles: HashMap<String, Handle>,
  received: Rc<RefCell<Vec<String>>>,
}

impl Shell {
  pub fn new(config: Config) -> Self {
    Self::with_bus(Rc::new(EventBus::with_config(config)))
  }

  pub fn with_bus(bus: Rc<EventBus>) -> Self {
    Self {
      bus,
      running: true,
      handles: HashMap::new(),
      received: Rc::new(RefCell::new(Vec::new())),
    }
  }

  pub fn bus(&self) -> &Rc<EventBus> {
    &self.bus
  }

  pub fn is_running(&self) -> bool {
    self.running
  }

  /// Lines recorded by listeners that have not been returned yet. A failed
  /// `emit` leaves the lines of the listeners that ran before the failure here.
  pub fn take_received(&self) -> Vec<String> {
    std::mem::take(&mut *self.received.borrow_mut())
  }

  pub fn handle_line(&mut self, line: &str) -> Result<Vec<String>, CommandError> {
    let command = Command::parse(line)?;
    self.handle_command(command)
  }

  pub fn handle_command(&mut self, command: Command) -> Result<Vec<String>, CommandError> {
    let mut out = Vec::new();
    match command {
      Command::On { event_type, label, args } => {
        let handle = self.handle(&label);
        let (callback, scope) = (handle.callback.clone(), handle.scope.clone());
        self.bus.register(event_type.clone(), callback, scope, args);
        out.push(format!("{} listening for \"{event_type}\"", display_label(&label)));
      }
      Command::Fail { event_type, message } => {
        let callback = Callback::new(move |_| Err(ListenerError::new(message.clone())));
        self.bus.register(event_type.clone(), callback, Some(NamedScope::shared("failing")), Vec::new());
        out.push(format!("failing listening for \"{event_type}\""));
      }
      Command::Off { event_type, label } => {
        let found = match label {
          None => self.bus.unregister(&event_type, None, None),
          Some(label) => match self.handles.get(&label) {
            Some(handle) => self.bus.unregister(&event_type, Some(&handle.callback), handle.scope.as_ref()),
            None => false,
          },
        };
        out.push(found.to_string());
      }
      Command::Emit { event_type, parameters, args } => {
        self.bus.dispatch(&event_type, parameters, &args)?;
        out.extend(self.take_received());
      }
      Command::List => {
        let report = self.bus.describe_listeners();
        if report.is_empty() {
          out.push("no listeners".to_string());
        } else {
          out.extend(report.lines().map(str::to_string));
        }
      }
      Command::Help => out.extend(HELP.lines().map(str::to_string)),
      Command::Exit => self.running = false,
    }
    Ok(out)
  }

  fn handle(&mut self, label: &str) -> &Handle {
    let received = Rc::clone(&self.received);
    self.handles.entry(label.to_string()).or_insert_with(|| {
      let scope = (label != ANONYMOUS).then(|| NamedScope::shared(label));
      let callback = Callback::infallible(move |inv| {
        let who = inv.scope().and_then(|s| s.class_name()).unwrap_or("anonymous");
        received.borrow_mut().push(format!("{who} <- {}", Value::Array(inv.positional())));
      });
      Handle { callback, scope }
    })
  }
}

fn display_label(label: &str) -> &str {
  if label == ANONYMOUS { "anonymous" } else { label }
}
