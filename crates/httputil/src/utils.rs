//! Internal helper macros.

/// Returns early with `Err($error)` when `$predicate` does not hold.
///
/// Works like `assert!`, but for validation that must surface as an error instead of a panic.
///
/// ```ignore
/// ensure!((100..=599).contains(&code), StatusError::out_of_range(code));
/// ```
macro_rules! ensure {
    ($predicate:expr, $error:expr) => {
        if !$predicate {
            return Err($error);
        }
    };
}

pub(crate) use ensure;
