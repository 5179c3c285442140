//! Shorthands for building [`crate::error::TranslateError`] values.

/// Builds a [`crate::error::TranslateError`] from a kind, a static description and an optional
/// owned detail.
#[macro_export]
macro_rules! translate_error {
    ($kind:expr, $desc:expr $(,)?) => {
        $crate::error::TranslateError::from(($kind, $desc))
    };
    ($kind:expr, $desc:expr, $detail:expr $(,)?) => {
        $crate::error::TranslateError::from(($kind, $desc, $detail))
    };
}

/// Returns early with a [`crate::error::TranslateError`] built by [`translate_error!`].
#[macro_export]
macro_rules! bail {
    ($($arg:tt)+) => {
        return ::core::result::Result::Err($crate::translate_error!($($arg)+))
    };
}
