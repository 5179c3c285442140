//! Classified translation failures.
//!
//! A [`TranslateError`] is either one failure, tagged with an [`ErrorKind`] and the place it was
//! raised, or the failures of several rows of one batch gathered by
//! [`crate::translator::collect_mutations`].

use std::borrow::Cow;
use std::error;
use std::fmt;
use std::panic::Location;
use std::sync::Arc;

use crate::codec::CodecError;

/// Result type of every translation operation.
pub type TranslateResult<T> = Result<T, TranslateError>;

/// What went wrong while translating a change event.
#[derive(PartialEq, Eq, Copy, Clone, Debug, Hash)]
#[non_exhaustive]
pub enum ErrorKind {
    /// A row payload is not a valid encoding or does not have the expected shape.
    DecodeCorruption,
    /// A payload disagrees with the table metadata it is read against.
    SchemaInconsistency,
    /// A row has to be located but the table or payload offers no identity columns.
    MissingIdentity,
    /// The event asks for something no translator supports.
    UnsupportedOperation,
    /// A schema change statement could not be parsed.
    UnderlyingParseFailure,
    /// No translator is registered for the requested dialect.
    UnknownDialect,
    /// The registry was asked to do something its current contents forbid.
    InvalidState,
    Unknown,
}

/// A translation failure.
#[derive(Debug, Clone)]
pub struct TranslateError {
    repr: ErrorRepr,
}

#[derive(Debug, Clone)]
enum ErrorRepr {
    Single(Box<Failure>),
    /// Failures of the rows of one batch, in row order.
    Batch(Vec<TranslateError>),
}

#[derive(Debug, Clone)]
struct Failure {
    kind: ErrorKind,
    description: &'static str,
    detail: Option<Cow<'static, str>>,
    source: Option<Arc<dyn error::Error + Send + Sync>>,
    location: &'static Location<'static>,
}

impl TranslateError {
    #[track_caller]
    fn single(
        kind: ErrorKind,
        description: &'static str,
        detail: Option<Cow<'static, str>>,
        source: Option<Arc<dyn error::Error + Send + Sync>>,
    ) -> Self {
        TranslateError {
            repr: ErrorRepr::Single(Box::new(Failure {
                kind,
                description,
                detail,
                source,
                location: Location::caller(),
            })),
        }
    }

    /// Returns the kind of this error, or of the first row of a batch.
    pub fn kind(&self) -> ErrorKind {
        match &self.repr {
            ErrorRepr::Single(failure) => failure.kind,
            ErrorRepr::Batch(errors) => errors
                .first()
                .map(TranslateError::kind)
                .unwrap_or(ErrorKind::Unknown),
        }
    }

    /// Returns the kind of every failure, flattening batches.
    pub fn kinds(&self) -> Vec<ErrorKind> {
        match &self.repr {
            ErrorRepr::Single(failure) => vec![failure.kind],
            ErrorRepr::Batch(errors) => errors.iter().flat_map(TranslateError::kinds).collect(),
        }
    }

    /// Returns the dynamic detail, or the first one found in a batch.
    pub fn detail(&self) -> Option<&str> {
        match &self.repr {
            ErrorRepr::Single(failure) => failure.detail.as_deref(),
            ErrorRepr::Batch(errors) => errors.iter().find_map(TranslateError::detail),
        }
    }

    /// Replaces the detail of a single failure. Batches are returned unchanged.
    pub fn with_detail(mut self, detail: impl Into<Cow<'static, str>>) -> Self {
        if let ErrorRepr::Single(failure) = &mut self.repr {
            failure.detail = Some(detail.into());
        }
        self
    }

    /// Attaches the error that caused a single failure. Batches are returned unchanged.
    pub fn with_source<E>(mut self, source: E) -> Self
    where
        E: error::Error + Send + Sync + 'static,
    {
        if let ErrorRepr::Single(failure) = &mut self.repr {
            failure.source = Some(Arc::new(source));
        }
        self
    }
}

impl fmt::Display for TranslateError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.repr {
            ErrorRepr::Single(failure) => {
                write!(f, "[{:?}] {}", failure.kind, failure.description)?;
                if let Some(detail) = &failure.detail {
                    write!(f, ": {detail}")?;
                }
                write!(
                    f,
                    " (at {}:{})",
                    failure.location.file(),
                    failure.location.line()
                )
            }
            ErrorRepr::Batch(errors) => {
                write!(f, "{} rows failed to translate", errors.len())?;
                for (row, error) in errors.iter().enumerate() {
                    write!(f, "\n  {row}: {error}")?;
                }
                Ok(())
            }
        }
    }
}

impl error::Error for TranslateError {
    fn source(&self) -> Option<&(dyn error::Error + 'static)> {
        match &self.repr {
            ErrorRepr::Single(failure) => failure
                .source
                .as_deref()
                .map(|source| source as &(dyn error::Error + 'static)),
            ErrorRepr::Batch(errors) => errors
                .first()
                .map(|error| error as &(dyn error::Error + 'static)),
        }
    }
}

impl From<(ErrorKind, &'static str)> for TranslateError {
    #[track_caller]
    fn from((kind, description): (ErrorKind, &'static str)) -> TranslateError {
        TranslateError::single(kind, description, None, None)
    }
}

impl<D> From<(ErrorKind, &'static str, D)> for TranslateError
where
    D: Into<Cow<'static, str>>,
{
    #[track_caller]
    fn from((kind, description, detail): (ErrorKind, &'static str, D)) -> TranslateError {
        TranslateError::single(kind, description, Some(detail.into()), None)
    }
}

/// Gathers row failures into one error. A single failure is returned as is.
impl<E> From<Vec<E>> for TranslateError
where
    E: Into<TranslateError>,
{
    fn from(errors: Vec<E>) -> TranslateError {
        let mut errors: Vec<TranslateError> = errors.into_iter().map(Into::into).collect();

        match errors.pop() {
            Some(error) if errors.is_empty() => error,
            Some(error) => {
                errors.push(error);
                TranslateError {
                    repr: ErrorRepr::Batch(errors),
                }
            }
            None => TranslateError {
                repr: ErrorRepr::Batch(errors),
            },
        }
    }
}

impl From<CodecError> for TranslateError {
    #[track_caller]
    fn from(err: CodecError) -> TranslateError {
        let detail = err.to_string();
        TranslateError::single(
            ErrorKind::DecodeCorruption,
            "Row payload could not be decoded",
            Some(Cow::Owned(detail)),
            Some(Arc::new(err)),
        )
    }
}

impl From<sqlparser::parser::ParserError> for TranslateError {
    #[track_caller]
    fn from(err: sqlparser::parser::ParserError) -> TranslateError {
        let detail = err.to_string();
        TranslateError::single(
            ErrorKind::UnderlyingParseFailure,
            "Statement could not be parsed",
            Some(Cow::Owned(detail)),
            Some(Arc::new(err)),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::translate_error;

    #[test]
    fn single_row_batch_is_flattened() {
        let err = TranslateError::from(vec![translate_error!(
            ErrorKind::MissingIdentity,
            "Missing identity"
        )]);

        assert_eq!(err.kind(), ErrorKind::MissingIdentity);
        assert!(!err.to_string().contains("rows failed"));
    }

    #[test]
    fn batch_keeps_every_row_failure() {
        let err = TranslateError::from(vec![
            translate_error!(ErrorKind::DecodeCorruption, "Corrupted row", "row 0"),
            translate_error!(ErrorKind::SchemaInconsistency, "Unknown column", "row 3"),
        ]);

        assert_eq!(err.kind(), ErrorKind::DecodeCorruption);
        assert_eq!(
            err.kinds(),
            vec![ErrorKind::DecodeCorruption, ErrorKind::SchemaInconsistency]
        );
        assert_eq!(err.detail(), Some("row 0"));

        let rendered = err.to_string();
        assert!(rendered.starts_with("2 rows failed to translate\n  0: [DecodeCorruption]"));
        assert!(rendered.contains("\n  1: [SchemaInconsistency] Unknown column: row 3"));
    }

    #[test]
    fn codec_errors_keep_their_source() {
        let err = TranslateError::from(CodecError::InvalidFlag(0xfe));

        assert_eq!(err.kind(), ErrorKind::DecodeCorruption);
        assert_eq!(err.detail(), Some("invalid value flag 0xfe"));

        let source = error::Error::source(&err).unwrap();
        assert_eq!(source.to_string(), "invalid value flag 0xfe");
    }

    #[test]
    fn with_detail_replaces_detail_and_keeps_source() {
        let err = TranslateError::from(CodecError::Truncated("int")).with_detail("Table s.t");

        assert_eq!(err.detail(), Some("Table s.t"));
        assert!(error::Error::source(&err).is_some());
    }

    #[test]
    fn display_names_kind_detail_and_location() {
        let err = translate_error!(
            ErrorKind::UnknownDialect,
            "Translator not registered",
            "dialect `oracle`".to_string()
        );

        let rendered = err.to_string();
        assert!(rendered.starts_with(
            "[UnknownDialect] Translator not registered: dialect `oracle` (at "
        ));
        assert!(rendered.contains("error.rs:"));
    }
}
