//! Parallel helpers with feature-gated implementations
//!
//! With the `native` feature the work is spread over rayon's pool; without it
//! the same closures run sequentially. Each unit of work owns its own
//! accumulator, so results do not depend on which variant is compiled in.

/// Check if parallel processing is available
#[cfg(feature = "native")]
pub fn is_parallel_available() -> bool {
    true
}

/// Check if parallel processing is available
#[cfg(not(feature = "native"))]
pub fn is_parallel_available() -> bool {
    false
}

/// Parallel map over `0..count`, results in index order
#[cfg(feature = "native")]
pub fn parallel_map_indexed<U, F>(count: usize, f: F) -> Vec<U>
where
    U: Send,
    F: Fn(usize) -> U + Sync + Send,
{
    use rayon::prelude::*;
    (0..count).into_par_iter().map(f).collect()
}

/// Sequential map with index (fallback)
#[cfg(not(feature = "native"))]
pub fn parallel_map_indexed<U, F>(count: usize, f: F) -> Vec<U>
where
    F: Fn(usize) -> U,
{
    (0..count).map(f).collect()
}

/// Apply `f` to every element of a mutable slice, in parallel
#[cfg(feature = "native")]
pub fn parallel_for_each_mut<T, E, F>(data: &mut [T], f: F) -> Result<(), E>
where
    T: Send,
    E: Send,
    F: Fn(usize, &mut T) -> Result<(), E> + Sync + Send,
{
    use rayon::prelude::*;
    data.par_iter_mut()
        .enumerate()
        .try_for_each(|(i, item)| f(i, item))
}

/// Sequential for_each over a mutable slice (fallback)
#[cfg(not(feature = "native"))]
pub fn parallel_for_each_mut<T, E, F>(data: &mut [T], f: F) -> Result<(), E>
where
    F: Fn(usize, &mut T) -> Result<(), E>,
{
    data.iter_mut().enumerate().try_for_each(|(i, item)| f(i, item))
}
