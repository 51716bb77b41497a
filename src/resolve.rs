//! Argument resolution
//!
//! The resolution walks the declared parameters of a target callable in declaration order and
//! classifies each of them according to the source of its value:
//!
//! * [Source::Keyword]: an explicit keyword argument with the same name exists.
//! * [Source::Provided]: a provider is registered under the (possibly remapped) name.
//! * [Source::Positional]: the next unused explicit positional argument.
//!
//! The positional cursor only moves on positional parameters, positional arguments thus land in the
//! right slot even when injected or keyword parameters sit between them.
//!
//! Two policies are available:
//!
//! * [ResolutionPolicy::Strict] fails on parameters without value and on unused positional arguments.
//! * [ResolutionPolicy::Permissive] takes no positional argument at all: parameters without keyword
//!   argument or provider are silently omitted.

use std::any::{type_name, Any};
use std::collections::HashMap;

use thiserror::Error;
use tracing::{debug, trace};

use crate::provide::{BoxError, Value};
use crate::registry::ProviderLookup;

/// Errors triggered while resolving or consuming arguments
#[derive(Error, Debug)]
pub enum InjectError {
    #[error("Argument `{name}` not provided")]
    MissingArgument { name: String },
    #[error("Unused positional arguments: {supplied} supplied, only {consumed} consumed")]
    UnconsumedPositionalArguments { supplied: usize, consumed: usize },
    /// A producer failed. Its own error is kept as `source`:
    /// use `source.downcast_ref` to recover it.
    #[error("Provider for argument `{name}` failed")]
    Provider {
        name: String,
        #[source]
        source: BoxError,
    },
    #[error("Argument `{name}` holds a {found}, expected {expected}")]
    TypeMismatch {
        name: String,
        expected: &'static str,
        found: &'static str,
    },
    #[error("Signature declares {found} parameters, the callable takes {expected}")]
    ArityMismatch { expected: usize, found: usize },
    #[error("No resolved argument named `{name}`")]
    UnknownParameter { name: String },
    #[error("Parameter `{name}` is declared more than once")]
    DuplicateParameter { name: String },
}

/// Ordered list of the parameter names declared by a target callable.
///
/// Only names are recorded. Default values stay the concern of the target: the strict policy
/// requires every parameter, the permissive one leaves missing parameters for the target to fill.
///
/// A name declared twice makes every resolution fail with [InjectError::DuplicateParameter],
/// use [Signature::try_new] to catch it when building the signature.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Signature {
    params: Vec<String>,
    duplicate: Option<String>,
}

impl Signature {
    pub fn new<I, S>(params: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let params: Vec<String> = params.into_iter().map(Into::into).collect();
        let duplicate = params
            .iter()
            .enumerate()
            .find(|(idx, p)| params[..*idx].contains(*p))
            .map(|(_, p)| p.clone());
        Self { params, duplicate }
    }

    /// Build a signature, rejecting names declared more than once
    pub fn try_new<I, S>(params: I) -> Result<Self, InjectError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let signature = Self::new(params);
        signature.check()?;
        Ok(signature)
    }

    /// First name declared more than once, if any
    pub fn duplicate(&self) -> Option<&str> {
        self.duplicate.as_deref()
    }

    pub(crate) fn check(&self) -> Result<(), InjectError> {
        match &self.duplicate {
            Some(name) => Err(InjectError::DuplicateParameter { name: name.clone() }),
            None => Ok(()),
        }
    }

    /// Parameter names in declaration order
    pub fn params(&self) -> impl Iterator<Item = &str> {
        self.params.iter().map(String::as_str)
    }

    pub fn contains(&self, param: &str) -> bool {
        self.params.iter().any(|p| p == param)
    }

    pub fn len(&self) -> usize {
        self.params.len()
    }

    pub fn is_empty(&self) -> bool {
        self.params.is_empty()
    }
}

impl<S: Into<String>> FromIterator<S> for Signature {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        Self::new(iter)
    }
}

/// Build a [Signature] from a list of parameter identifiers.
///
/// ```
/// let sig = lazybind::signature!(db, user_id, verbose);
/// assert_eq!(sig.params().collect::<Vec<_>>(), ["db", "user_id", "verbose"]);
/// ```
#[macro_export]
macro_rules! signature {
    ($($param: ident),* $(,)?) => {{
        let params: &[&str] = &[$(stringify!($param)),*];
        $crate::Signature::new(params.iter().copied())
    }};
}

/// Translate declared parameter names into provider names.
///
/// Names without entry are looked up unchanged.
#[derive(Clone, Debug, Default)]
pub struct Remapping(HashMap<String, String>);

impl Remapping {
    pub fn new() -> Self {
        Self::default()
    }

    /// Look up the provider of `param` under `provider_name`
    pub fn with(mut self, param: impl Into<String>, provider_name: impl Into<String>) -> Self {
        self.insert(param, provider_name);
        self
    }

    pub fn insert(&mut self, param: impl Into<String>, provider_name: impl Into<String>) {
        self.0.insert(param.into(), provider_name.into());
    }

    /// Provider name used for a declared parameter
    pub fn lookup_name<'a>(&'a self, param: &'a str) -> &'a str {
        self.0.get(param).map_or(param, String::as_str)
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for Remapping {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self(
            iter.into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        )
    }
}

/// Explicit arguments given at the call site
#[derive(Clone, Debug, Default)]
pub struct CallArgs {
    positional: Vec<Value>,
    keyword: HashMap<String, Value>,
}

impl CallArgs {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a positional argument
    pub fn arg<T: Any + Send + Sync>(self, data: T) -> Self {
        self.arg_value(Value::new(data))
    }

    pub fn arg_value(mut self, value: Value) -> Self {
        self.positional.push(value);
        self
    }

    /// Set a keyword argument, replacing a previous one with the same name
    pub fn kwarg<T: Any + Send + Sync>(self, name: impl Into<String>, data: T) -> Self {
        self.kwarg_value(name, Value::new(data))
    }

    pub fn kwarg_value(mut self, name: impl Into<String>, value: Value) -> Self {
        self.keyword.insert(name.into(), value);
        self
    }

    pub fn positional(&self) -> &[Value] {
        &self.positional
    }

    pub fn keyword(&self, name: &str) -> Option<&Value> {
        self.keyword.get(name)
    }
}

/// Origin of a resolved argument
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Source {
    Keyword,
    Positional,
    Provided,
}

/// A declared parameter with its value
#[derive(Clone, Debug)]
pub struct ResolvedArg {
    pub name: String,
    pub value: Value,
    pub source: Source,
}

/// Final arguments for a call, in declaration order and addressable by name
#[derive(Clone, Debug, Default)]
pub struct ResolvedArgs {
    entries: Vec<ResolvedArg>,
}

impl ResolvedArgs {
    fn with_capacity(capacity: usize) -> Self {
        Self {
            entries: Vec::with_capacity(capacity),
        }
    }

    fn push(&mut self, name: &str, value: Value, source: Source) {
        trace!(param = name, ?source, "argument resolved");
        self.entries.push(ResolvedArg {
            name: name.to_string(),
            value,
            source,
        });
    }

    fn entry(&self, name: &str) -> Option<&ResolvedArg> {
        self.entries.iter().find(|e| e.name == name)
    }

    pub fn get(&self, name: &str) -> Option<&Value> {
        self.entry(name).map(|e| &e.value)
    }

    /// Extract a clone of the argument `name` with the expected type
    pub fn get_as<T: Any + Clone>(&self, name: &str) -> Result<T, InjectError> {
        let value = self.get(name).ok_or_else(|| InjectError::UnknownParameter {
            name: name.to_string(),
        })?;
        downcast(name, value)
    }

    pub fn source(&self, name: &str) -> Option<Source> {
        self.entry(name).map(|e| e.source)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.entry(name).is_some()
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|e| e.name.as_str())
    }

    pub fn iter(&self) -> std::slice::Iter<'_, ResolvedArg> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Values in declaration order
    pub fn into_values(self) -> Vec<Value> {
        self.entries.into_iter().map(|e| e.value).collect()
    }

    pub fn into_map(self) -> HashMap<String, Value> {
        self.entries.into_iter().map(|e| (e.name, e.value)).collect()
    }
}

impl IntoIterator for ResolvedArgs {
    type Item = ResolvedArg;
    type IntoIter = std::vec::IntoIter<ResolvedArg>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.into_iter()
    }
}

pub(crate) fn downcast<T: Any + Clone>(name: &str, value: &Value) -> Result<T, InjectError> {
    value.get::<T>().ok_or_else(|| InjectError::TypeMismatch {
        name: name.to_string(),
        expected: type_name::<T>(),
        found: value.type_name(),
    })
}

/// How to handle parameters without value and unused positional arguments
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum ResolutionPolicy {
    /// Every parameter must be resolved and every positional argument consumed
    #[default]
    Strict,
    /// Only keyword arguments and providers are used, other parameters are omitted
    Permissive,
}

/// Assemble the arguments of a call from explicit arguments and providers
pub struct ArgumentResolver<'a, L: ?Sized> {
    providers: &'a L,
    remapping: Option<&'a Remapping>,
    policy: ResolutionPolicy,
}

impl<'a, L: ProviderLookup + ?Sized> ArgumentResolver<'a, L> {
    pub fn new(providers: &'a L) -> Self {
        Self {
            providers,
            remapping: None,
            policy: ResolutionPolicy::default(),
        }
    }

    pub fn with_remapping(mut self, remapping: &'a Remapping) -> Self {
        self.remapping = Some(remapping);
        self
    }

    pub fn with_policy(mut self, policy: ResolutionPolicy) -> Self {
        self.policy = policy;
        self
    }

    fn lookup_name<'p>(&'p self, param: &'p str) -> &'p str {
        match self.remapping {
            Some(remapping) => remapping.lookup_name(param),
            None => param,
        }
    }

    /// Resolve all declared parameters of `signature`.
    ///
    /// Providers are invoked once for each parameter they resolve, their failures abort the resolution.
    pub fn resolve(
        &self,
        signature: &Signature,
        args: CallArgs,
    ) -> Result<ResolvedArgs, InjectError> {
        signature.check()?;
        let CallArgs {
            positional,
            mut keyword,
        } = args;
        let strict = self.policy == ResolutionPolicy::Strict;
        let supplied = positional.len();
        let mut positional = positional.into_iter();
        let mut resolved = ResolvedArgs::with_capacity(signature.len());

        for param in signature.params() {
            if let Some(value) = keyword.remove(param) {
                resolved.push(param, value, Source::Keyword);
                continue;
            }

            if let Some(provider) = self.providers.lookup(self.lookup_name(param)) {
                let value = provider.resolve(param)?;
                resolved.push(param, value, Source::Provided);
                continue;
            }

            if !strict {
                debug!(param, "no keyword argument or provider, parameter omitted");
                continue;
            }

            match positional.next() {
                Some(value) => resolved.push(param, value, Source::Positional),
                None => {
                    return Err(InjectError::MissingArgument {
                        name: param.to_string(),
                    })
                }
            }
        }

        if !keyword.is_empty() {
            debug!(
                ignored = ?keyword.keys().collect::<Vec<_>>(),
                "keyword arguments match no declared parameter"
            );
        }

        let leftover = positional.len();
        if leftover > 0 {
            if strict {
                return Err(InjectError::UnconsumedPositionalArguments {
                    supplied,
                    consumed: supplied - leftover,
                });
            }
            debug!(leftover, "positional arguments ignored");
        }

        Ok(resolved)
    }
}
