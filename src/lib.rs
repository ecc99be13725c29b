//! Call interception and audit logging for class-style operation tables.
//!
//! This crate attaches call auditing to arbitrary class definitions as a
//! cross-cutting behavior: a definition supplies only a name, its bases,
//! and an operation table, and receives back an equivalent definition
//! whose eligible operations report every invocation to an audit sink
//! before running. Recording is governed by one process-wide switch that
//! can be flipped at any time, including between invocations on existing
//! instances.
//!
//! # Core Types
//!
//! - [`ClassDef`]: a class as an explicit (name, bases, operation table)
//! - [`audit_class`] / [`Auditor`]: the interceptor producing audited
//!   definitions, and the facade owning the switch and sink
//! - [`AuditSwitch`]: the shared enable/disable flag
//! - [`AuditRecord`]: one intercepted call, captured for the sink
//! - [`sink::AuditSink`]: the fan-out writer behind pluggable
//!   [`sink::Destination`]s (file, console, memory)
//! - [`ConsoleMirror`]: tees console output into the audit file
//!
//! # Examples
//!
//! ```
//! use call_audit::sink::{AuditSink, MemoryDestination};
//! use call_audit::{Auditor, CallArgs, ClassDef, Value};
//!
//! let memory = MemoryDestination::new();
//! let auditor = Auditor::new(AuditSink::new().with_destination(memory.clone()));
//!
//! // Any class definition can be audited; it opts in once, not per call.
//! let vehicle = auditor.audit_class(
//!     ClassDef::new("Vehicle")
//!         .constructor(|fields, args| {
//!             fields.set("model", args.value(0).cloned().unwrap_or(Value::Unit));
//!             Ok(Value::Unit)
//!         })
//!         .operation("start", |_fields, _args| Ok(Value::Unit)),
//! )?;
//!
//! let mut car = vehicle.instantiate(&CallArgs::new().arg("Tesla"))?;
//! car.call("start", &CallArgs::new())?;
//!
//! assert_eq!(memory.len(), 2); // constructor + start
//! assert!(memory.lines()[1].contains("call: start"));
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod class;
mod error;
mod interceptor;
mod mirror;
mod record;
pub mod sink;
mod switch;
mod value;

pub use class::{is_reserved, ClassDef, Fields, Instance, Operation, DISPLAY, INIT};
pub use error::{CallError, WrapError};
pub use interceptor::{audit_class, AuditPolicy, Auditor};
pub use mirror::ConsoleMirror;
pub use record::AuditRecord;
pub use switch::AuditSwitch;
pub use value::{CallArgs, Value};
