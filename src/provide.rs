//! Values and the providers producing them
//!
//! * A [Value] is a dynamically typed, cheaply clonable payload. Resolution never looks inside it:
//!   the target callable downcasts it when it consumes its arguments.
//! * The [Provide] trait indicates that a struct can produce a [Value] on demand.
//! * A [Provider] is either a plain value, handed out as-is on every resolution,
//!   or a shared producer, invoked again on every resolution.

use std::any::{type_name, Any};
use std::fmt;
use std::sync::Arc;

use once_cell::sync::OnceCell;

use crate::resolve::InjectError;

/// Boxed error raised by a fallible producer
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Dynamically typed argument value
#[derive(Clone)]
pub struct Value {
    inner: Arc<dyn Any + Send + Sync>,
    type_name: &'static str,
}

impl Value {
    pub fn new<T: Any + Send + Sync>(data: T) -> Self {
        Self {
            inner: Arc::new(data),
            type_name: type_name::<T>(),
        }
    }

    /// Borrow the content if it has the requested type
    pub fn downcast_ref<T: Any>(&self) -> Option<&T> {
        (*self.inner).downcast_ref::<T>()
    }

    /// Clone the content out if it has the requested type
    pub fn get<T: Any + Clone>(&self) -> Option<T> {
        self.downcast_ref::<T>().cloned()
    }

    pub fn is<T: Any>(&self) -> bool {
        (*self.inner).is::<T>()
    }

    /// Name of the stored type, for diagnostics only
    pub fn type_name(&self) -> &'static str {
        self.type_name
    }

    /// Check if both values share the same allocation
    pub fn ptr_eq(&self, other: &Value) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }
}

impl fmt::Debug for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Value<{}>", self.type_name)
    }
}

/// Produce a fresh value on demand
///
/// Implementors are invoked once per resolution of a parameter they provide,
/// they are free to memoize (see [CachedProvider]).
pub trait Provide: Send + Sync {
    fn provide(&self) -> Result<Value, BoxError>;
}

/// Producer backed by an infallible closure
pub struct FnProvider<F>(F);

impl<F> FnProvider<F> {
    pub fn new(f: F) -> Self {
        Self(f)
    }
}

impl<F, T> Provide for FnProvider<F>
where
    F: Fn() -> T + Send + Sync,
    T: Any + Send + Sync,
{
    fn provide(&self) -> Result<Value, BoxError> {
        Ok(Value::new((self.0)()))
    }
}

/// Producer backed by a fallible closure, its errors are forwarded untouched
pub struct TryFnProvider<F>(F);

impl<F> TryFnProvider<F> {
    pub fn new(f: F) -> Self {
        Self(f)
    }
}

impl<F, T, E> Provide for TryFnProvider<F>
where
    F: Fn() -> Result<T, E> + Send + Sync,
    T: Any + Send + Sync,
    E: Into<BoxError>,
{
    fn provide(&self) -> Result<Value, BoxError> {
        (self.0)().map(Value::new).map_err(Into::into)
    }
}

/// Producer calling its closure on first use only, then cloning the stored value
pub struct CachedProvider<F> {
    init: F,
    cell: OnceCell<Value>,
}

impl<F> CachedProvider<F> {
    pub fn new(init: F) -> Self {
        Self {
            init,
            cell: OnceCell::new(),
        }
    }
}

impl<F, T> Provide for CachedProvider<F>
where
    F: Fn() -> T + Send + Sync,
    T: Any + Send + Sync,
{
    fn provide(&self) -> Result<Value, BoxError> {
        Ok(self.cell.get_or_init(|| Value::new((self.init)())).clone())
    }
}

/// Source of an injectable argument
#[derive(Clone)]
pub enum Provider {
    /// Literal value, returned verbatim
    Value(Value),
    /// Zero-argument producer, invoked on every resolution
    Producer(Arc<dyn Provide>),
}

impl Provider {
    pub fn value<T: Any + Send + Sync>(data: T) -> Self {
        Provider::Value(Value::new(data))
    }

    pub fn producer<F, T>(f: F) -> Self
    where
        F: Fn() -> T + Send + Sync + 'static,
        T: Any + Send + Sync,
    {
        Provider::Producer(Arc::new(FnProvider(f)))
    }

    pub fn try_producer<F, T, E>(f: F) -> Self
    where
        F: Fn() -> Result<T, E> + Send + Sync + 'static,
        T: Any + Send + Sync,
        E: Into<BoxError>,
    {
        Provider::Producer(Arc::new(TryFnProvider(f)))
    }

    /// Producer evaluated lazily on first resolution, then shared
    pub fn cached<F, T>(f: F) -> Self
    where
        F: Fn() -> T + Send + Sync + 'static,
        T: Any + Send + Sync,
    {
        Provider::Producer(Arc::new(CachedProvider::new(f)))
    }

    pub fn is_producer(&self) -> bool {
        matches!(self, Provider::Producer(_))
    }

    /// Obtain the value for the parameter `name`.
    ///
    /// Producer failures are reported with their original error as source.
    pub(crate) fn resolve(&self, name: &str) -> Result<Value, InjectError> {
        match self {
            Provider::Value(v) => Ok(v.clone()),
            Provider::Producer(p) => p.provide().map_err(|source| InjectError::Provider {
                name: name.to_string(),
                source,
            }),
        }
    }
}

impl From<Value> for Provider {
    fn from(value: Value) -> Self {
        Provider::Value(value)
    }
}

impl From<Arc<dyn Provide>> for Provider {
    fn from(producer: Arc<dyn Provide>) -> Self {
        Provider::Producer(producer)
    }
}

impl fmt::Debug for Provider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Provider::Value(v) => f.debug_tuple("Value").field(v).finish(),
            Provider::Producer(_) => f.write_str("Producer(..)"),
        }
    }
}
