//! Function composition helpers

/// Compose functions from left to right.
///
/// So that `compose_left([f, g, h])(x) == h(g(f(x)))`. An empty sequence yields the identity.
pub fn compose_left<T, I>(funcs: I) -> impl Fn(T) -> T
where
    I: IntoIterator<Item = Box<dyn Fn(T) -> T>>,
{
    let funcs: Vec<_> = funcs.into_iter().collect();
    move |x| funcs.iter().fold(x, |v, f| f(v))
}

/// Compose functions from right to left.
///
/// So that `compose_right([f, g, h])(x) == f(g(h(x)))`. An empty sequence yields the identity.
pub fn compose_right<T, I>(funcs: I) -> impl Fn(T) -> T
where
    I: IntoIterator<Item = Box<dyn Fn(T) -> T>>,
{
    let funcs: Vec<_> = funcs.into_iter().collect();
    move |x| funcs.iter().rev().fold(x, |v, f| f(v))
}
