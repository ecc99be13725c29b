//! The call-audit interceptor.
//!
//! [`audit_class`] takes a class definition and returns an equivalent
//! definition whose eligible operations are wrapped: each invocation
//! first reports itself to the audit sink (subject to the shared
//! [`AuditSwitch`]) and then runs the original body unchanged. The
//! [`Auditor`] facade bundles the switch, the shared sink, and a default
//! policy behind the `enable_auditing` / `disable_auditing` surface.

use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;

use crate::class::{is_reserved, ClassDef, Operation};
use crate::error::WrapError;
use crate::record::AuditRecord;
use crate::sink::{AuditLevel, AuditSink, SinkError};
use crate::switch::AuditSwitch;

/// Which operations of a definition receive call interception.
///
/// The reference behavior this crate descends from was inconsistent about
/// reserved protocol operations, so the choice is an explicit parameter
/// rather than a silent default:
///
/// - [`SkipReserved`](AuditPolicy::SkipReserved) (the default) wraps
///   every operation except the reserved display hook. Constructors are
///   wrapped: their arguments are usually wanted in the trail, while
///   auditing the display hook would write a line on every render.
/// - [`All`](AuditPolicy::All) wraps every operation unconditionally,
///   reserved hooks included.
/// - [`Only`](AuditPolicy::Only) wraps exactly the listed operations and
///   nothing else.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuditPolicy {
    /// Wrap every operation, reserved hooks included.
    All,
    /// Wrap every operation except reserved protocol hooks.
    SkipReserved,
    /// Wrap exactly the listed operations.
    Only(BTreeSet<String>),
}

impl AuditPolicy {
    /// Builds an [`Only`](AuditPolicy::Only) policy from operation names.
    ///
    /// # Examples
    ///
    /// ```
    /// use call_audit::AuditPolicy;
    ///
    /// let policy = AuditPolicy::only(["start", "stop"]);
    /// assert!(matches!(policy, AuditPolicy::Only(_)));
    /// ```
    pub fn only<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        AuditPolicy::Only(names.into_iter().map(Into::into).collect())
    }

    fn selects(&self, name: &str) -> bool {
        match self {
            AuditPolicy::All => true,
            AuditPolicy::SkipReserved => !is_reserved(name),
            AuditPolicy::Only(names) => names.contains(name),
        }
    }
}

impl Default for AuditPolicy {
    fn default() -> Self {
        AuditPolicy::SkipReserved
    }
}

/// Transforms a class definition into its audited equivalent.
///
/// The returned definition keeps the same name, the same bases, and the
/// same observable behavior; every operation in its own table that the
/// policy selects is replaced by a wrapper with an identical signature.
/// Base definitions are left as the bases define them — audit the bases
/// first and compose if inherited operations should be recorded too.
///
/// Each wrapped invocation, while the switch is enabled, captures an
/// [`AuditRecord`] and hands it to the sink *before* the original body
/// runs; a sink failure propagates to the caller and the body does not
/// run. While the switch is disabled no record is produced and the body
/// runs normally — the switch governs auditing only, never execution.
///
/// # Errors
///
/// Returns a [`WrapError`] if the table contains an empty operation name
/// or an `Only` policy names an operation the definition does not have.
/// Nothing is wrapped partially.
///
/// # Examples
///
/// ```
/// use std::sync::Arc;
/// use call_audit::sink::{AuditSink, MemoryDestination};
/// use call_audit::{audit_class, AuditPolicy, AuditSwitch, CallArgs, ClassDef, Value};
///
/// let memory = MemoryDestination::new();
/// let sink = Arc::new(AuditSink::new().with_destination(memory.clone()));
/// let switch = AuditSwitch::default();
///
/// let vehicle = ClassDef::new("Vehicle")
///     .operation("start", |_fields, _args| Ok(Value::Unit));
/// let audited = audit_class(vehicle, &AuditPolicy::default(), switch, sink)?;
///
/// let mut car = audited.instantiate(&CallArgs::new())?;
/// car.call("start", &CallArgs::new())?;
///
/// assert_eq!(memory.len(), 1);
/// assert!(memory.lines()[0].contains("call: start"));
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// ```
pub fn audit_class(
    def: ClassDef,
    policy: &AuditPolicy,
    switch: AuditSwitch,
    sink: Arc<AuditSink>,
) -> Result<ClassDef, WrapError> {
    let (name, bases, operations) = def.into_parts();

    if operations.keys().any(|op| op.is_empty()) {
        return Err(WrapError::EmptyOperationName { class: name });
    }

    if let AuditPolicy::Only(selected) = policy {
        for wanted in selected {
            if !operations.contains_key(wanted) {
                return Err(WrapError::UnknownOperation {
                    class: name,
                    operation: wanted.clone(),
                });
            }
        }
    }

    let mut wrapped = BTreeMap::new();
    for (op_name, body) in operations {
        if policy.selects(&op_name) {
            tracing::debug!(class = %name, operation = %op_name, "wrapping operation for auditing");
            let wrapper = wrap_operation(&op_name, body, switch.clone(), sink.clone());
            wrapped.insert(op_name, wrapper);
        } else {
            wrapped.insert(op_name, body);
        }
    }

    Ok(ClassDef::from_parts(name, bases, wrapped))
}

fn wrap_operation(
    name: &str,
    inner: Operation,
    switch: AuditSwitch,
    sink: Arc<AuditSink>,
) -> Operation {
    let op_name = name.to_string();
    Arc::new(move |fields, args| {
        if switch.is_enabled() {
            let record = AuditRecord::capture(op_name.as_str(), args);
            sink.record(&record)?;
        }
        inner(fields, args)
    })
}

/// The auditing facade: one switch, one shared sink, one default policy.
///
/// An `Auditor` is the explicit shared-state accessor for the
/// process-wide toggle — every class it wraps captures clones of the same
/// switch handle and sink, so `enable_auditing` / `disable_auditing` take
/// effect immediately for all audited classes and all existing instances.
///
/// # Examples
///
/// ```
/// use call_audit::sink::{AuditSink, MemoryDestination};
/// use call_audit::{Auditor, CallArgs, ClassDef, Value};
///
/// let memory = MemoryDestination::new();
/// let auditor = Auditor::new(AuditSink::new().with_destination(memory.clone()));
///
/// let vehicle = auditor.audit_class(
///     ClassDef::new("Vehicle").operation("start", |_fields, _args| Ok(Value::Unit)),
/// )?;
/// let mut car = vehicle.instantiate(&CallArgs::new())?;
///
/// car.call("start", &CallArgs::new())?;
/// assert_eq!(memory.len(), 1);
///
/// auditor.disable_auditing()?; // records the toggle itself
/// car.call("start", &CallArgs::new())?;
/// assert_eq!(memory.len(), 2); // no record for the disabled call
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// ```
#[derive(Debug)]
pub struct Auditor {
    switch: AuditSwitch,
    sink: Arc<AuditSink>,
    policy: AuditPolicy,
}

impl Auditor {
    /// Creates an auditor around the given sink, with auditing enabled
    /// and the default [`AuditPolicy::SkipReserved`] policy.
    pub fn new(sink: AuditSink) -> Self {
        Self {
            switch: AuditSwitch::default(),
            sink: Arc::new(sink),
            policy: AuditPolicy::default(),
        }
    }

    /// Replaces the default policy used by [`audit_class`](Self::audit_class).
    pub fn with_policy(mut self, policy: AuditPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// A clone of the switch handle shared with every wrapped class.
    pub fn switch(&self) -> AuditSwitch {
        self.switch.clone()
    }

    /// The shared sink handle.
    pub fn sink(&self) -> Arc<AuditSink> {
        self.sink.clone()
    }

    /// Returns the current state of the auditing flag.
    pub fn is_auditing_enabled(&self) -> bool {
        self.switch.is_enabled()
    }

    /// Turns auditing on for every class this auditor has wrapped, then
    /// records the toggle as an informational line.
    ///
    /// Idempotent: enabling while already enabled only adds the
    /// informational record.
    ///
    /// # Errors
    ///
    /// Returns the sink's error if the informational line cannot be
    /// written.
    pub fn enable_auditing(&self) -> Result<(), SinkError> {
        self.switch.enable();
        tracing::info!(target: "call_audit", enabled = true, "auditing enabled");
        self.sink.record_message(AuditLevel::Info, "auditing enabled")
    }

    /// Records the toggle as an informational line, then turns auditing
    /// off — in that order, so the disable event itself lands in the log.
    ///
    /// Idempotent: disabling while already disabled only adds the
    /// informational record.
    ///
    /// # Errors
    ///
    /// Returns the sink's error if the informational line cannot be
    /// written; the switch still flips off.
    pub fn disable_auditing(&self) -> Result<(), SinkError> {
        let recorded = self.sink.record_message(AuditLevel::Info, "auditing disabled");
        tracing::info!(target: "call_audit", enabled = false, "auditing disabled");
        self.switch.disable();
        recorded
    }

    /// Wraps a class definition with this auditor's default policy.
    ///
    /// # Errors
    ///
    /// See [`audit_class`].
    pub fn audit_class(&self, def: ClassDef) -> Result<ClassDef, WrapError> {
        self.audit_class_with(def, &self.policy)
    }

    /// Wraps a class definition with an explicit policy.
    ///
    /// # Errors
    ///
    /// See [`audit_class`].
    pub fn audit_class_with(
        &self,
        def: ClassDef,
        policy: &AuditPolicy,
    ) -> Result<ClassDef, WrapError> {
        audit_class(def, policy, self.switch.clone(), self.sink.clone())
    }
}
