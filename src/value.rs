//! Dynamic value model for constraint evaluation.
//!
//! Constraints are evaluated against heterogeneous, possibly-nested values:
//! scalars, strings, byte buffers, durations, lists, multi-rank arrays,
//! keyed maps, and reference-semantics objects. Since the comparisons are
//! decided at runtime, values are modeled as a single `Value` enum rather
//! than a generic parameter.

use std::cell::RefCell;
use std::collections::BTreeMap;
use std::fmt;
use std::rc::Rc;
use std::time::Duration;

use rust_decimal::Decimal;

/// Maximum number of elements rendered before a collection is clipped.
const DISPLAY_CLIP: usize = 10;

/// A runtime value that constraints can be applied to.
#[derive(Clone)]
pub enum Value {
    Null,
    Bool(bool),
    Int(i64),
    UInt(u64),
    Float(f64),
    Decimal(Decimal),
    Char(char),
    Str(String),
    /// Byte-oriented content, compared by length then by offset.
    Bytes(Vec<u8>),
    Duration(Duration),
    /// Ordered collection. Nesting lists of different lengths models
    /// jagged arrays.
    List(Vec<Value>),
    /// Multi-rank array with a fixed shape.
    Array(ArrayValue),
    /// Keyed collection, insertion-ordered. Keys may be any value.
    Map(Vec<(Value, Value)>),
    /// Shared, possibly-cyclic object with named fields.
    Object(ObjectRef),
}

/// A multi-rank array: row-major elements plus the dimension sizes.
#[derive(Clone)]
pub struct ArrayValue {
    pub shape: Vec<usize>,
    pub elems: Vec<Value>,
}

impl ArrayValue {
    /// Create an array from a shape and row-major elements.
    ///
    /// The element count must equal the product of the dimensions.
    pub fn new(shape: Vec<usize>, elems: Vec<Value>) -> Self {
        debug_assert_eq!(shape.iter().product::<usize>(), elems.len());
        Self { shape, elems }
    }

    pub fn rank(&self) -> usize {
        self.shape.len()
    }

    /// Convert a flat (row-major) index into per-dimension indices.
    pub fn indices_of(&self, mut flat: usize) -> Vec<usize> {
        let mut indices = vec![0; self.shape.len()];
        for dim in (0..self.shape.len()).rev() {
            let size = self.shape[dim].max(1);
            indices[dim] = flat % size;
            flat /= size;
        }
        indices
    }
}

/// Custom equality operation carried by an object.
pub type EqualityFn = Rc<dyn Fn(&Value, &Value) -> bool>;

/// Shared handle to an object value. Cloning shares the underlying data,
/// so field graphs may be cyclic.
pub type ObjectRef = Rc<ObjectData>;

/// Named-field object with a declared type and optional custom equality.
pub struct ObjectData {
    /// Declared type name, used by type constraints and diagnostics.
    pub type_name: String,
    /// Names of base types and interfaces, outermost first.
    pub ancestry: Vec<String>,
    /// Named fields. Interior mutability allows cycles to be built after
    /// construction; evaluation never mutates fields.
    pub fields: RefCell<BTreeMap<String, Value>>,
    /// Custom equality operation. When present, structural comparison
    /// delegates to it instead of recursing into fields.
    pub equals: Option<EqualityFn>,
}

impl ObjectData {
    pub fn new(type_name: impl Into<String>) -> ObjectRef {
        Rc::new(Self {
            type_name: type_name.into(),
            ancestry: Vec::new(),
            fields: RefCell::new(BTreeMap::new()),
            equals: None,
        })
    }

    pub fn with_fields<I, K>(type_name: impl Into<String>, fields: I) -> ObjectRef
    where
        I: IntoIterator<Item = (K, Value)>,
        K: Into<String>,
    {
        Rc::new(Self {
            type_name: type_name.into(),
            ancestry: Vec::new(),
            fields: RefCell::new(fields.into_iter().map(|(k, v)| (k.into(), v)).collect()),
            equals: None,
        })
    }

    pub fn with_ancestry<I, K>(type_name: impl Into<String>, ancestry: I) -> ObjectRef
    where
        I: IntoIterator<Item = K>,
        K: Into<String>,
    {
        Rc::new(Self {
            type_name: type_name.into(),
            ancestry: ancestry.into_iter().map(Into::into).collect(),
            fields: RefCell::new(BTreeMap::new()),
            equals: None,
        })
    }

    pub fn with_equals(
        type_name: impl Into<String>,
        equals: impl Fn(&Value, &Value) -> bool + 'static,
    ) -> ObjectRef {
        Rc::new(Self {
            type_name: type_name.into(),
            ancestry: Vec::new(),
            fields: RefCell::new(BTreeMap::new()),
            equals: Some(Rc::new(equals)),
        })
    }
}

impl fmt::Debug for ObjectData {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let field_names: Vec<String> = self.fields.borrow().keys().cloned().collect();
        f.debug_struct("ObjectData")
            .field("type_name", &self.type_name)
            .field("ancestry", &self.ancestry)
            .field("fields", &field_names)
            .field("equals", &self.equals.is_some())
            .finish()
    }
}

impl Value {
    /// Short name of the value's runtime kind.
    pub fn kind(&self) -> &'static str {
        match self {
            Value::Null => "null",
            Value::Bool(_) => "bool",
            Value::Int(_) => "int",
            Value::UInt(_) => "uint",
            Value::Float(_) => "float",
            Value::Decimal(_) => "decimal",
            Value::Char(_) => "char",
            Value::Str(_) => "string",
            Value::Bytes(_) => "bytes",
            Value::Duration(_) => "duration",
            Value::List(_) => "list",
            Value::Array(_) => "array",
            Value::Map(_) => "map",
            Value::Object(_) => "object",
        }
    }

    /// Runtime type name: the declared name for objects, the kind otherwise.
    pub fn type_name(&self) -> &str {
        match self {
            Value::Object(obj) => &obj.type_name,
            other => other.kind(),
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    pub fn is_numeric(&self) -> bool {
        matches!(
            self,
            Value::Int(_) | Value::UInt(_) | Value::Float(_) | Value::Decimal(_)
        )
    }

    /// The elements of an ordered sequence (list or array), if this is one.
    pub fn seq_elems(&self) -> Option<&[Value]> {
        match self {
            Value::List(items) => Some(items),
            Value::Array(arr) => Some(&arr.elems),
            _ => None,
        }
    }

    /// Build a rank-2 array from equal-length rows.
    pub fn array2<T: Into<Value>>(rows: Vec<Vec<T>>) -> Value {
        let height = rows.len();
        let width = rows.first().map(|r| r.len()).unwrap_or(0);
        let elems = rows
            .into_iter()
            .flat_map(|row| row.into_iter().map(Into::into))
            .collect();
        Value::Array(ArrayValue::new(vec![height, width], elems))
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => write!(f, "null"),
            Value::Bool(b) => write!(f, "{}", b),
            Value::Int(n) => write!(f, "{}", n),
            Value::UInt(n) => write!(f, "{}", n),
            Value::Float(x) => write!(f, "{:?}", x),
            Value::Decimal(d) => write!(f, "{}", d),
            Value::Char(c) => write!(f, "'{}'", c),
            Value::Str(s) => write!(f, "\"{}\"", s),
            Value::Bytes(b) => write!(f, "<{} bytes>", b.len()),
            Value::Duration(d) => write!(f, "{:?}", d),
            Value::List(items) => {
                write!(f, "[")?;
                write_clipped(f, items)?;
                write!(f, "]")
            }
            Value::Array(arr) => {
                let dims: Vec<String> = arr.shape.iter().map(|d| d.to_string()).collect();
                write!(f, "array({})[", dims.join("x"))?;
                write_clipped(f, &arr.elems)?;
                write!(f, "]")
            }
            Value::Map(entries) => {
                write!(f, "{{")?;
                for (i, (k, v)) in entries.iter().take(DISPLAY_CLIP).enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}: {}", k, v)?;
                }
                if entries.len() > DISPLAY_CLIP {
                    write!(f, ", ...")?;
                }
                write!(f, "}}")
            }
            // Field graphs may be cyclic, so objects render as their type only.
            Value::Object(obj) => write!(f, "<{}>", obj.type_name),
        }
    }
}

impl fmt::Debug for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(self, f)
    }
}

fn write_clipped(f: &mut fmt::Formatter<'_>, items: &[Value]) -> fmt::Result {
    for (i, item) in items.iter().take(DISPLAY_CLIP).enumerate() {
        if i > 0 {
            write!(f, ", ")?;
        }
        write!(f, "{}", item)?;
    }
    if items.len() > DISPLAY_CLIP {
        write!(f, ", ...")?;
    }
    Ok(())
}

// =============================================================================
// Conversions
// =============================================================================

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Value::Bool(v)
    }
}

impl From<i32> for Value {
    fn from(v: i32) -> Self {
        Value::Int(v as i64)
    }
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Value::Int(v)
    }
}

impl From<u32> for Value {
    fn from(v: u32) -> Self {
        Value::UInt(v as u64)
    }
}

impl From<u64> for Value {
    fn from(v: u64) -> Self {
        Value::UInt(v)
    }
}

impl From<f32> for Value {
    fn from(v: f32) -> Self {
        Value::Float(v as f64)
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Value::Float(v)
    }
}

impl From<Decimal> for Value {
    fn from(v: Decimal) -> Self {
        Value::Decimal(v)
    }
}

impl From<char> for Value {
    fn from(v: char) -> Self {
        Value::Char(v)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::Str(v.to_string())
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Value::Str(v)
    }
}

impl From<Duration> for Value {
    fn from(v: Duration) -> Self {
        Value::Duration(v)
    }
}

impl From<ObjectRef> for Value {
    fn from(v: ObjectRef) -> Self {
        Value::Object(v)
    }
}

impl<T: Into<Value>> From<Vec<T>> for Value {
    fn from(items: Vec<T>) -> Self {
        Value::List(items.into_iter().map(Into::into).collect())
    }
}

impl From<serde_json::Value> for Value {
    fn from(v: serde_json::Value) -> Self {
        match v {
            serde_json::Value::Null => Value::Null,
            serde_json::Value::Bool(b) => Value::Bool(b),
            serde_json::Value::Number(n) => {
                if let Some(i) = n.as_i64() {
                    Value::Int(i)
                } else if let Some(u) = n.as_u64() {
                    Value::UInt(u)
                } else {
                    Value::Float(n.as_f64().unwrap_or(f64::NAN))
                }
            }
            serde_json::Value::String(s) => Value::Str(s),
            serde_json::Value::Array(items) => {
                Value::List(items.into_iter().map(Into::into).collect())
            }
            serde_json::Value::Object(entries) => Value::Map(
                entries
                    .into_iter()
                    .map(|(k, v)| (Value::Str(k), Value::from(v)))
                    .collect(),
            ),
        }
    }
}

// =============================================================================
// Actual-value providers
// =============================================================================

/// A deferred actual value: invoked once per evaluation attempt. `Err`
/// carries a thrown error value, which the throws constraint captures as
/// data and every other constraint treats as a usage error.
pub type ProviderFn = Rc<dyn Fn() -> Result<Value, Value>>;

/// The actual value a constraint is applied to: either a plain value or a
/// zero-argument provider.
#[derive(Clone)]
pub enum Actual {
    Value(Value),
    Provider(ProviderFn),
}

impl Actual {
    /// Wrap a plain value.
    pub fn of(value: impl Into<Value>) -> Self {
        Actual::Value(value.into())
    }

    /// Wrap a provider function. The function is invoked once per
    /// evaluation attempt; an `Err` is a thrown error value.
    pub fn from_fn(f: impl Fn() -> Result<Value, Value> + 'static) -> Self {
        Actual::Provider(Rc::new(f))
    }

    /// Resolve to a value, surfacing any thrown error as `Err`.
    pub fn resolve(&self) -> Result<Value, Value> {
        match self {
            Actual::Value(v) => Ok(v.clone()),
            Actual::Provider(f) => f(),
        }
    }

    pub fn is_provider(&self) -> bool {
        matches!(self, Actual::Provider(_))
    }
}

impl fmt::Debug for Actual {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Actual::Value(v) => write!(f, "Actual::Value({})", v),
            Actual::Provider(_) => write!(f, "Actual::Provider(..)"),
        }
    }
}

/// Description of a type used by the type-test constraints: a name plus
/// the names of its base types, so assignability can be checked in both
/// directions without a runtime type registry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TypeSpec {
    pub name: String,
    pub ancestry: Vec<String>,
}

impl TypeSpec {
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ancestry: Vec::new(),
        }
    }

    pub fn with_ancestry<I, K>(name: impl Into<String>, ancestry: I) -> Self
    where
        I: IntoIterator<Item = K>,
        K: Into<String>,
    {
        Self {
            name: name.into(),
            ancestry: ancestry.into_iter().map(Into::into).collect(),
        }
    }
}

impl From<&str> for TypeSpec {
    fn from(name: &str) -> Self {
        TypeSpec::named(name)
    }
}
