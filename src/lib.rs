//! Lazy argument injection by parameter name.
//!
//! Wrap a function with a set of named providers: the wrapper accepts positional and keyword
//! arguments and supplies the missing ones from the providers.
//!
//! # Simple use case
//!
//! ```
//! use lazybind::{signature, Binder, CallArgs, InjectError, Provider, ProviderRegistry};
//!
//! # fn main() -> Result<(), InjectError> {
//! // Providers are plain values or zero-argument producers
//! let registry = ProviderRegistry::new()
//!     .with("greeting", Provider::value(String::from("Hello")))
//!     .with("name", Provider::producer(|| String::from("world")));
//!
//! // Declare the parameter names of the target function
//! let greet = Binder::typed(
//!     registry,
//!     signature!(greeting, name, punctuation),
//!     |greeting: String, name: String, punctuation: char| format!("{greeting} {name}{punctuation}"),
//! )?;
//!
//! // Only the parameter without provider takes a positional argument
//! assert_eq!(greet.call(CallArgs::new().arg('!'))?, "Hello world!");
//!
//! // Keyword arguments win over providers
//! let args = CallArgs::new().arg('?').kwarg("name", String::from("you"));
//! assert_eq!(greet.call(args)?, "Hello you?");
//! # Ok(())
//! # }
//! ```
//!
//! # Mechanism
//!
//! Rust functions carry no parameter names at runtime, the target is thus described by an explicit
//! [Signature], built once when the function is bound.
//!
//! * A [Provider] is either a literal [Value] or a producer implementing [Provide], invoked on each resolution.
//! * The [ProviderRegistry] maps names to providers. The [SharedRegistry] handle lets binders see
//!   registrations made after their creation.
//! * The [ArgumentResolver] walks the declared parameters in order and takes each value from a keyword
//!   argument, a provider (after optional [Remapping] of its name), or the next positional argument.
//! * The [Binder] resolves with the strict policy and calls the target.
//! * [CommonArguments] resolves with the permissive policy and leaves the call to the caller.
//!
//! The registry holds no lock across provider invocations, but its content may change between two
//! resolutions if it is shared with other threads: serialize registrations if this matters.

mod compose;
mod inject;
mod provide;
mod registry;
mod resolve;

pub use compose::{compose_left, compose_right};
pub use inject::{Binder, Callable, CommonArguments, FromArgs};
pub use provide::{BoxError, CachedProvider, FnProvider, Provide, Provider, TryFnProvider, Value};
pub use registry::{ProviderLookup, ProviderRegistry, SharedRegistry};
pub use resolve::{
    ArgumentResolver, CallArgs, InjectError, Remapping, ResolutionPolicy, ResolvedArg,
    ResolvedArgs, Signature, Source,
};
