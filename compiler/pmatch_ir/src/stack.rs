//! Stack growth for deeply nested patterns.
//!
//! Validation, lowering and execution recurse once per pattern node. Machine
//! generated patterns can nest deep enough to exhaust the default stack, so
//! each recursive entry point goes through [`ensure_sufficient_stack`].

/// Remaining stack below which we grow (100KB).
const RED_ZONE: usize = 100 * 1024;

/// Size of each newly allocated stack segment (1MB).
const STACK_PER_RECURSION: usize = 1024 * 1024;

/// Run `f`, first growing the stack if less than the red zone remains.
#[inline]
#[cfg(not(target_arch = "wasm32"))]
pub fn ensure_sufficient_stack<R>(f: impl FnOnce() -> R) -> R {
    stacker::maybe_grow(RED_ZONE, STACK_PER_RECURSION, f)
}

/// WASM manages its own stack.
#[inline]
#[cfg(target_arch = "wasm32")]
pub fn ensure_sufficient_stack<R>(f: impl FnOnce() -> R) -> R {
    f()
}
