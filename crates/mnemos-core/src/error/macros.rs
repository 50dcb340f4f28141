//! Error macros for mnemos

/// Macro for returning a record validation error
#[macro_export]
macro_rules! bail_invalid {
    ($field:expr, $reason:expr) => {
        return Err($crate::error::MnemosError::validation($field, $reason))
    };
}

/// Macro for returning an invariant violation
#[macro_export]
macro_rules! bail_invariant {
    ($($arg:tt)*) => {
        return Err($crate::error::MnemosError::invariant(format!($($arg)*)))
    };
}
