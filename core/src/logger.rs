use chrono::{Local, Utc};
use serde_json::json;
use std::cell::RefCell;
use std::rc::Rc;

#[derive(Clone, Debug)]
enum Sink {
    Stdio,
    Off,
    Buffer(Rc<RefCell<String>>),
}

#[derive(Clone, Debug)]
pub struct Logger {
    rid: u64,
    sink: Sink,
}

impl Logger {
    /// Creates a `Logger` that writes JSONL to stdout (info) and stderr (warn, error).
    ///
    /// # Panics
    ///
    /// Panics if `rid` is zero.
    #[must_use]
    pub fn new(rid: u64) -> Self {
        assert!(rid > 0, "Logger rid must be non-zero");
        Self { rid, sink: Sink::Stdio }
    }

    /// A logger that drops every entry.
    #[must_use]
    pub fn disabled() -> Self {
        Self { rid: 1, sink: Sink::Off }
    }

    /// Captures entries into `buffer` instead of the process streams.
    #[must_use]
    pub fn new_for_test(rid: u64, buffer: Option<Rc<RefCell<String>>>) -> Self {
        assert!(rid > 0, "Logger rid must be non-zero");
        let sink = match buffer {
            Some(buf) => Sink::Buffer(buf),
            None => Sink::Off,
        };
        Self { rid, sink }
    }

    pub fn info(&self, subsystem: &str, action: &str, message: &str) {
        self.emit("info", subsystem, action, message);
    }

    pub fn warn(&self, subsystem: &str, action: &str, message: &str) {
        self.emit("warn", subsystem, action, message);
    }

    pub fn error(&self, subsystem: &str, action: &str, message: &str) {
        self.emit("error", subsystem, action, message);
    }

    fn emit(&self, level: &str, subsystem: &str, action: &str, message: &str) {
        if matches!(self.sink, Sink::Off) {
            return;
        }

        let log_entry = json!({
            "ts": Utc::now().to_rfc3339(),
            "level": level,
            "rid": self.rid,
            "subsystem": subsystem,
            "action": action,
            "msg": message,
        });

        match &self.sink {
            Sink::Buffer(buf) => {
                let mut buf = buf.borrow_mut();
                buf.push_str(&log_entry.to_string());
                buf.push('\n');
            }
            Sink::Stdio if level == "info" => println!("{log_entry}"),
            Sink::Stdio => eprintln!("{log_entry}"),
            Sink::Off => {}
        }
    }
}

/// Request id for one run: wall-clock millis mixed with the pid, never zero.
pub fn new_rid() -> u64 {
    let rid = (Local::now().timestamp_millis() as u64) ^ u64::from(std::process::id());
    rid.max(1)
}
