use std::fmt;

use crate::sink::SinkError;

/// Error returned by an operation call on an audited (or plain) class.
///
/// The three variants are deliberately kept apart so callers can tell a
/// failure of the auditing machinery from a failure of the operation
/// itself:
///
/// - [`CallError::Sink`]: the audit line could not be durably written.
///   The wrapped operation did not run.
/// - [`CallError::UnknownOperation`]: the name resolved to nothing in the
///   class's operation table or any of its bases.
/// - [`CallError::Operation`]: the operation's own error, carried through
///   untranslated — the boxed value is the original error and can be
///   downcast to its concrete type.
#[derive(Debug)]
pub enum CallError {
    /// The audit sink could not record the call.
    Sink(SinkError),
    /// The named operation does not exist on the class or its bases.
    UnknownOperation {
        /// Name of the class the call was dispatched on.
        class: String,
        /// The operation name that failed to resolve.
        operation: String,
    },
    /// The wrapped operation itself failed.
    Operation(Box<dyn std::error::Error + Send + Sync>),
}

impl CallError {
    /// Wraps an operation's own error without altering it.
    ///
    /// # Examples
    ///
    /// ```
    /// use call_audit::CallError;
    /// use std::io;
    ///
    /// let err = CallError::operation(io::Error::new(io::ErrorKind::Other, "engine stalled"));
    /// assert!(matches!(err, CallError::Operation(_)));
    /// ```
    pub fn operation(err: impl std::error::Error + Send + Sync + 'static) -> Self {
        CallError::Operation(Box::new(err))
    }
}

impl fmt::Display for CallError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CallError::Sink(e) => write!(f, "audit sink failure: {}", e),
            CallError::UnknownOperation { class, operation } => {
                write!(f, "no operation '{}' on class '{}'", operation, class)
            }
            CallError::Operation(e) => write!(f, "operation failure: {}", e),
        }
    }
}

impl std::error::Error for CallError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            CallError::Sink(e) => Some(e),
            CallError::UnknownOperation { .. } => None,
            CallError::Operation(e) => Some(e.as_ref()),
        }
    }
}

impl From<SinkError> for CallError {
    fn from(e: SinkError) -> Self {
        CallError::Sink(e)
    }
}

/// Error raised while transforming a class definition into its audited
/// equivalent.
///
/// Wrap failures are fatal to constructing the audited class and surface
/// immediately from [`audit_class`](crate::audit_class); nothing is
/// wrapped partially.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WrapError {
    /// The operation table contains an empty name, which cannot be
    /// dispatched or rendered into an audit line.
    EmptyOperationName {
        /// Name of the class being wrapped.
        class: String,
    },
    /// An `Only` policy listed an operation the definition does not have.
    UnknownOperation {
        /// Name of the class being wrapped.
        class: String,
        /// The operation the policy asked for.
        operation: String,
    },
}

impl fmt::Display for WrapError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            WrapError::EmptyOperationName { class } => {
                write!(f, "class '{}' has an operation with an empty name", class)
            }
            WrapError::UnknownOperation { class, operation } => {
                write!(
                    f,
                    "audit policy names operation '{}' which class '{}' does not define",
                    operation, class
                )
            }
        }
    }
}

impl std::error::Error for WrapError {}
