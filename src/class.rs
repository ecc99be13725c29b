//! Class definitions as explicit operation tables.
//!
//! A collaborator that wants auditing supplies only a name, a set of base
//! definitions, and a mapping from operation name to operation body — and
//! receives back an equivalent definition with its eligible operations
//! wrapped. Nothing here depends on the interceptor's internals; a
//! [`ClassDef`] is usable entirely on its own.

use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use crate::error::CallError;
use crate::value::{CallArgs, Value};

/// The operation name reserved for constructors.
///
/// The constructor runs during [`ClassDef::instantiate`] and participates
/// in auditing like any other operation: its arguments are usually the
/// most interesting thing in a trail.
pub const INIT: &str = "init";

/// The operation name reserved for the string-conversion hook.
///
/// The hook runs implicitly whenever an [`Instance`] is formatted with
/// `Display`, so the default audit policy leaves it unwrapped — recording
/// it would write a line on every render.
pub const DISPLAY: &str = "display";

/// Returns `true` for operation names the class runtime invokes
/// implicitly rather than through an explicit call.
///
/// Only the [`DISPLAY`] hook qualifies; constructors are explicit calls
/// made through [`ClassDef::instantiate`].
pub fn is_reserved(name: &str) -> bool {
    name == DISPLAY
}

/// An operation body: takes the instance's fields and the call arguments,
/// produces a value or a [`CallError`].
pub type Operation =
    Arc<dyn Fn(&mut Fields, &CallArgs) -> Result<Value, CallError> + Send + Sync>;

/// The named state of one instance.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Fields {
    values: BTreeMap<String, Value>,
}

impl Fields {
    /// Creates an empty field map.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets a field, replacing any earlier value.
    pub fn set(&mut self, name: impl Into<String>, value: impl Into<Value>) {
        self.values.insert(name.into(), value.into());
    }

    /// Returns a field's value, if set.
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.values.get(name)
    }

    /// Removes a field, returning its value if it was set.
    pub fn remove(&mut self, name: &str) -> Option<Value> {
        self.values.remove(name)
    }

    /// Number of fields currently set.
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Returns `true` if no fields are set.
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

/// A class definition: a name, base definitions, and an operation table.
///
/// Definitions are built with a chaining API and are cheap to clone (the
/// operation bodies are shared). Operation lookup searches the
/// definition's own table first, then the bases depth-first in
/// declaration order.
///
/// # Examples
///
/// ```
/// use call_audit::{CallArgs, ClassDef, Value};
///
/// let vehicle = ClassDef::new("Vehicle")
///     .constructor(|fields, args| {
///         let model = args.value(0).cloned().unwrap_or(Value::Unit);
///         fields.set("model", model);
///         Ok(Value::Unit)
///     })
///     .operation("start", |fields, _args| {
///         let model = fields.get("model").cloned().unwrap_or(Value::Unit);
///         Ok(Value::Str(format!("{} started", model)))
///     });
///
/// let mut car = vehicle.instantiate(&CallArgs::new().arg("Tesla"))?;
/// let out = car.call("start", &CallArgs::new())?;
/// assert_eq!(out.as_str(), Some("Tesla started"));
/// # Ok::<(), call_audit::CallError>(())
/// ```
#[derive(Clone)]
pub struct ClassDef {
    name: String,
    bases: Vec<ClassDef>,
    operations: BTreeMap<String, Operation>,
}

impl ClassDef {
    /// Creates a definition with the given name and no operations.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            bases: Vec::new(),
            operations: BTreeMap::new(),
        }
    }

    /// Adds a base definition. Bases are searched for operations the
    /// definition does not supply itself, in the order they were added.
    pub fn with_base(mut self, base: ClassDef) -> Self {
        self.bases.push(base);
        self
    }

    /// Adds an operation. A repeated name replaces the earlier body.
    pub fn operation<F>(mut self, name: impl Into<String>, body: F) -> Self
    where
        F: Fn(&mut Fields, &CallArgs) -> Result<Value, CallError> + Send + Sync + 'static,
    {
        self.operations.insert(name.into(), Arc::new(body));
        self
    }

    /// Adds the constructor, an operation named [`INIT`].
    pub fn constructor<F>(self, body: F) -> Self
    where
        F: Fn(&mut Fields, &CallArgs) -> Result<Value, CallError> + Send + Sync + 'static,
    {
        self.operation(INIT, body)
    }

    /// The class name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The base definitions in declaration order.
    pub fn bases(&self) -> &[ClassDef] {
        &self.bases
    }

    /// The names in the definition's own operation table, sorted.
    pub fn operation_names(&self) -> impl Iterator<Item = &str> {
        self.operations.keys().map(String::as_str)
    }

    /// Returns `true` if the definition's own table contains `name`.
    pub fn has_operation(&self, name: &str) -> bool {
        self.operations.contains_key(name)
    }

    /// Resolves an operation: own table first, then bases depth-first.
    pub fn resolve(&self, name: &str) -> Option<&Operation> {
        if let Some(op) = self.operations.get(name) {
            return Some(op);
        }
        self.bases.iter().find_map(|base| base.resolve(name))
    }

    /// Constructs an instance, running the [`INIT`] operation if present.
    ///
    /// # Errors
    ///
    /// Propagates whatever the constructor returns, untranslated.
    pub fn instantiate(&self, args: &CallArgs) -> Result<Instance, CallError> {
        let mut fields = Fields::new();
        if let Some(init) = self.resolve(INIT).cloned() {
            init(&mut fields, args)?;
        }
        Ok(Instance {
            class: self.clone(),
            fields,
        })
    }

    pub(crate) fn into_parts(self) -> (String, Vec<ClassDef>, BTreeMap<String, Operation>) {
        (self.name, self.bases, self.operations)
    }

    pub(crate) fn from_parts(
        name: String,
        bases: Vec<ClassDef>,
        operations: BTreeMap<String, Operation>,
    ) -> Self {
        Self {
            name,
            bases,
            operations,
        }
    }
}

impl fmt::Debug for ClassDef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClassDef")
            .field("name", &self.name)
            .field(
                "bases",
                &self.bases.iter().map(ClassDef::name).collect::<Vec<_>>(),
            )
            .field(
                "operations",
                &self.operations.keys().collect::<Vec<_>>(),
            )
            .finish()
    }
}

/// One constructed object of a [`ClassDef`].
///
/// Instances hold their class (so wrapped operations stay wrapped for the
/// instance's whole lifetime) and a [`Fields`] map of named state.
pub struct Instance {
    class: ClassDef,
    fields: Fields,
}

impl Instance {
    /// The name of the class this instance was constructed from.
    pub fn class_name(&self) -> &str {
        self.class.name()
    }

    /// Dispatches an operation call on this instance.
    ///
    /// # Errors
    ///
    /// [`CallError::UnknownOperation`] if the name resolves to nothing;
    /// otherwise whatever the operation (or its audit wrapper) returns.
    pub fn call(&mut self, operation: &str, args: &CallArgs) -> Result<Value, CallError> {
        let body = self.class.resolve(operation).cloned().ok_or_else(|| {
            CallError::UnknownOperation {
                class: self.class.name().to_string(),
                operation: operation.to_string(),
            }
        })?;
        body(&mut self.fields, args)
    }

    /// Reads a field of the instance's state.
    pub fn field(&self, name: &str) -> Option<&Value> {
        self.fields.get(name)
    }

    /// The instance's full field map.
    pub fn fields(&self) -> &Fields {
        &self.fields
    }
}

impl fmt::Display for Instance {
    /// Renders via the [`DISPLAY`] hook when the class defines one,
    /// falling back to `<Name instance>`.
    ///
    /// The hook runs against a copy of the fields; an erroring hook falls
    /// back rather than aborting formatting.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(hook) = self.class.resolve(DISPLAY).cloned() {
            let mut fields = self.fields.clone();
            if let Ok(rendered) = hook(&mut fields, &CallArgs::new()) {
                return write!(f, "{}", rendered);
            }
        }
        write!(f, "<{} instance>", self.class.name())
    }
}

impl fmt::Debug for Instance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Instance")
            .field("class", &self.class.name())
            .field("fields", &self.fields)
            .finish()
    }
}
