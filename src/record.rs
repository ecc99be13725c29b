//! The audit record: one intercepted call, captured for the sink.

use std::collections::BTreeMap;
use std::fmt;

use chrono::{DateTime, Local};

use crate::value::CallArgs;

/// A description of one intercepted operation call.
///
/// Records are ephemeral: a wrapper captures one at call time, hands it to
/// the [`AuditSink`](crate::sink::AuditSink), and drops it. Arguments are
/// snapshotted as strings at capture time, so later mutation of the
/// underlying values cannot change what was recorded.
///
/// # Examples
///
/// ```
/// use call_audit::{AuditRecord, CallArgs};
///
/// let args = CallArgs::new().arg("Tesla").named_arg("doors", 4);
/// let record = AuditRecord::capture("start", &args);
///
/// assert_eq!(record.operation(), "start");
/// assert_eq!(record.message(), "call: start, args: [Tesla], named: {doors: 4}");
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct AuditRecord {
    operation: String,
    positional: Vec<String>,
    named: BTreeMap<String, String>,
    timestamp: DateTime<Local>,
}

impl AuditRecord {
    /// Captures a record for `operation` with the given arguments,
    /// timestamped now.
    pub fn capture(operation: impl Into<String>, args: &CallArgs) -> Self {
        Self {
            operation: operation.into(),
            positional: args.positional().iter().map(ToString::to_string).collect(),
            named: args
                .named()
                .iter()
                .map(|(k, v)| (k.clone(), v.to_string()))
                .collect(),
            timestamp: Local::now(),
        }
    }

    /// The name of the intercepted operation.
    pub fn operation(&self) -> &str {
        &self.operation
    }

    /// The positional arguments, stringified in call order.
    pub fn positional(&self) -> &[String] {
        &self.positional
    }

    /// The named arguments, stringified and sorted by name.
    pub fn named(&self) -> &BTreeMap<String, String> {
        &self.named
    }

    /// The moment the call was intercepted.
    pub fn timestamp(&self) -> DateTime<Local> {
        self.timestamp
    }

    /// Renders the record into the message part of an audit line.
    pub fn message(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for AuditRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "call: {}, args: [", self.operation)?;
        for (i, arg) in self.positional.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{}", arg)?;
        }
        write!(f, "], named: {{")?;
        for (i, (name, value)) in self.named.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{}: {}", name, value)?;
        }
        write!(f, "}}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn capture_snapshots_arguments_as_strings() {
        let args = CallArgs::new().arg("Tesla").arg(4).named_arg("color", "red");
        let record = AuditRecord::capture("start", &args);

        assert_eq!(record.operation(), "start");
        assert_eq!(record.positional(), ["Tesla", "4"]);
        assert_eq!(record.named().get("color").map(String::as_str), Some("red"));
    }

    #[test]
    fn message_lists_arguments_in_order() {
        let args = CallArgs::new()
            .arg("a")
            .arg(1)
            .named_arg("z", "last")
            .named_arg("b", "first");
        let record = AuditRecord::capture("op", &args);

        // Named arguments render sorted by name.
        assert_eq!(
            record.message(),
            "call: op, args: [a, 1], named: {b: first, z: last}"
        );
    }

    #[test]
    fn message_with_no_arguments_stays_wellformed() {
        let record = AuditRecord::capture("stop", &CallArgs::new());
        assert_eq!(record.message(), "call: stop, args: [], named: {}");
    }

    #[test]
    fn display_matches_message() {
        let record = AuditRecord::capture("go", &CallArgs::new().arg(true));
        assert_eq!(record.to_string(), record.message());
    }
}
