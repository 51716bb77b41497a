use std::any::Any;
use std::sync::Arc;

use tracing::instrument;

use crate::provide::{Provide, Provider, Value};
use crate::registry::{ProviderRegistry, SharedRegistry};
use crate::resolve::{
    downcast, ArgumentResolver, CallArgs, InjectError, Remapping, ResolutionPolicy, ResolvedArgs,
    Signature,
};

type Target<R> = Box<dyn Fn(ResolvedArgs) -> Result<R, InjectError>>;

/// Wrap a callable to inject the arguments its caller does not give.
///
/// The registry is shared and not copied: providers registered after the creation of the binder
/// are used by the next call. The remapping is fixed at construction.
pub struct Binder<R> {
    registry: SharedRegistry,
    remapping: Remapping,
    signature: Signature,
    target: Target<R>,
}

impl<R: 'static> Binder<R> {
    /// Bind a callable consuming the resolved arguments by name
    pub fn new<F>(registry: impl Into<SharedRegistry>, signature: Signature, target: F) -> Self
    where
        F: Fn(ResolvedArgs) -> R + 'static,
    {
        Self {
            registry: registry.into(),
            remapping: Remapping::default(),
            signature,
            target: Box::new(move |args: ResolvedArgs| Ok(target(args))),
        }
    }

    /// Bind a plain function, its arguments are extracted in declaration order.
    ///
    /// The signature must name exactly one parameter per function argument.
    pub fn typed<F, I>(
        registry: impl Into<SharedRegistry>,
        signature: Signature,
        target: F,
    ) -> Result<Self, InjectError>
    where
        F: Callable<I, R> + 'static,
        I: FromArgs,
    {
        signature.check()?;
        if I::ARITY != signature.len() {
            return Err(InjectError::ArityMismatch {
                expected: I::ARITY,
                found: signature.len(),
            });
        }
        Ok(Self {
            registry: registry.into(),
            remapping: Remapping::default(),
            signature,
            target: Box::new(move |args: ResolvedArgs| Ok(target.call(I::from_args(&args)?))),
        })
    }

    pub fn with_remapping(mut self, remapping: Remapping) -> Self {
        self.remapping = remapping;
        self
    }

    /// Live handle on the providers used by this binder
    pub fn registry(&self) -> &SharedRegistry {
        &self.registry
    }

    /// Add or override a provider for the next calls
    pub fn register(&self, name: impl Into<String>, provider: impl Into<Provider>) {
        self.registry.register(name, provider);
    }

    pub fn signature(&self) -> &Signature {
        &self.signature
    }

    pub fn remapping(&self) -> &Remapping {
        &self.remapping
    }

    /// Resolve the arguments of a call without calling the target
    pub fn resolve(&self, args: CallArgs) -> Result<ResolvedArgs, InjectError> {
        ArgumentResolver::new(&self.registry)
            .with_remapping(&self.remapping)
            .with_policy(ResolutionPolicy::Strict)
            .resolve(&self.signature, args)
    }

    /// Call the target after injecting the missing arguments
    #[instrument(level = "debug", skip_all, fields(params = self.signature.len()))]
    pub fn call(&self, args: CallArgs) -> Result<R, InjectError> {
        let resolved = self.resolve(args)?;
        (self.target)(resolved)
    }
}

/// Collection of lazily evaluated arguments, without call wrapping.
///
/// Only producers can be registered. Overrides are taken by keyword only: positional values are
/// ignored. Parameters without override or provider are left out of the result and must be
/// handled by the caller.
#[derive(Clone, Debug, Default)]
pub struct CommonArguments {
    registry: ProviderRegistry,
}

impl CommonArguments {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add or override a producer
    pub fn register<F, T>(&mut self, name: impl Into<String>, producer: F)
    where
        F: Fn() -> T + Send + Sync + 'static,
        T: Any + Send + Sync,
    {
        self.registry.register(name, Provider::producer(producer));
    }

    /// Add or override a custom [Provide] implementation
    pub fn register_provider(&mut self, name: impl Into<String>, producer: Arc<dyn Provide>) {
        self.registry.register(name, producer);
    }

    /// Chained variant of [CommonArguments::register]
    pub fn with<F, T>(mut self, name: impl Into<String>, producer: F) -> Self
    where
        F: Fn() -> T + Send + Sync + 'static,
        T: Any + Send + Sync,
    {
        self.register(name, producer);
        self
    }

    pub fn contains(&self, name: &str) -> bool {
        self.registry.contains(name)
    }

    /// Resolve the arguments available for `signature`, by name
    pub fn get_kwargs(
        &self,
        signature: &Signature,
        remapping: &Remapping,
        overrides: CallArgs,
    ) -> Result<ResolvedArgs, InjectError> {
        ArgumentResolver::new(&self.registry)
            .with_remapping(remapping)
            .with_policy(ResolutionPolicy::Permissive)
            .resolve(signature, overrides)
    }

    /// Resolve the arguments available for `signature`, in declaration order
    pub fn get_args(
        &self,
        signature: &Signature,
        remapping: &Remapping,
        overrides: CallArgs,
    ) -> Result<Vec<Value>, InjectError> {
        Ok(self
            .get_kwargs(signature, remapping, overrides)?
            .into_values())
    }
}

/*
 * Typed targets: call plain functions with up to 10 parameters, using a tuple to
 * wrap their arguments in a single type.
 */

/// A Callable has a ```call``` function with a single argument and a single return type.
///
/// This trait is implemented for all functions with up to 10 arguments, using a tuple to
/// wrap them all in a single type.
pub trait Callable<Args, Ret> {
    fn call(&self, args: Args) -> Ret;
}

/// Tuple of arguments extracted from [ResolvedArgs] in declaration order
pub trait FromArgs: Sized {
    const ARITY: usize;
    fn from_args(args: &ResolvedArgs) -> Result<Self, InjectError>;
}

macro_rules! callable_tuple ({ $($param:ident)* } => {
    impl<Func, Ret, $($param,)*> Callable<($($param,)*), Ret> for Func
    where
        Func: Fn($($param),*) -> Ret,
    {
        #[inline]
        #[allow(non_snake_case)]
        fn call(&self, ($($param,)*): ($($param,)*)) -> Ret {
            (self)($($param,)*)
        }
    }

    #[allow(unused_mut, unused_variables, clippy::unused_unit)]
    impl<$($param: Any + Clone,)*> FromArgs for ($($param,)*) {
        const ARITY: usize = <[&str]>::len(&[$(stringify!($param)),*]);

        fn from_args(args: &ResolvedArgs) -> Result<Self, InjectError> {
            let mut entries = args.iter();
            Ok(($(
                {
                    let entry = entries.next().ok_or(InjectError::ArityMismatch {
                        expected: Self::ARITY,
                        found: args.len(),
                    })?;
                    downcast::<$param>(&entry.name, &entry.value)?
                },
            )*))
        }
    }
});

callable_tuple! {}
callable_tuple! { A }
callable_tuple! { A B }
callable_tuple! { A B C }
callable_tuple! { A B C D }
callable_tuple! { A B C D E }
callable_tuple! { A B C D E F }
callable_tuple! { A B C D E F G }
callable_tuple! { A B C D E F G H }
callable_tuple! { A B C D E F G H I }
callable_tuple! { A B C D E F G H I J }
