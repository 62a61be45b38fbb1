//! Error types for the arbor core library.
//!
//! Defines the top-level error enum exposed by the orchestration API, the
//! `define_error_codes!` macro every module uses to attach stable
//! machine-readable codes to its errors, and a convenient result alias.

use thiserror::Error;

use crate::{
    builder::ExecutionStrategy, hierarchy::ClassificationError, matrix::MatrixError,
    zhang::TreeDistanceError,
};

macro_rules! define_error_codes {
    (
        $(#[$enum_meta:meta])*
        enum $CodeTy:ident for $ErrTy:ident {
            $(
                $(#[$variant_meta:meta])*
                $CodeVariant:ident => $ErrVariant:ident
                    $( { $($pattern:tt)* } )?
                    $( ( $($tuple:tt)* ) )?
                    => $code:expr
            ),+ $(,)?
        }
    ) => {
        $(#[$enum_meta])*
        #[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
        #[non_exhaustive]
        pub enum $CodeTy {
            $(
                $(#[$variant_meta])*
                $CodeVariant,
            )+
        }

        impl $CodeTy {
            /// Return the stable machine-readable representation of this error code.
            #[must_use]
            pub const fn as_str(self) -> &'static str {
                match self {
                    $(Self::$CodeVariant => $code,)+
                }
            }
        }

        impl ::std::fmt::Display for $CodeTy {
            fn fmt(&self, f: &mut ::std::fmt::Formatter<'_>) -> ::std::fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl $ErrTy {
            #[doc = concat!(
                "Retrieve the stable [`",
                stringify!($CodeTy),
                "`] for this error."
            )]
            #[must_use]
            pub const fn code(&self) -> $CodeTy {
                match self {
                    $(
                        Self::$ErrVariant $( { $($pattern)* } )? $( ( $($tuple)* ) )?
                            => $CodeTy::$CodeVariant,
                    )+
                }
            }
        }
    };
}

pub(crate) use define_error_codes;

/// Raised when a name does not match any variant of a selector enum such as
/// [`crate::SimilarityMeasure`], [`crate::Linkage`] or [`crate::LocalCost`].
#[derive(Clone, Debug, Eq, Error, PartialEq)]
#[error("unknown {kind} `{provided}`; expected one of: {expected}")]
pub struct UnknownVariant {
    kind: &'static str,
    provided: String,
    expected: String,
}

impl UnknownVariant {
    pub(crate) fn new(kind: &'static str, provided: &str, names: &[&str]) -> Self {
        Self {
            kind,
            provided: provided.to_owned(),
            expected: names.join(", "),
        }
    }

    /// The selector that rejected the name, e.g. `"linkage"`.
    #[must_use]
    pub fn kind(&self) -> &'static str {
        self.kind
    }

    /// The rejected input.
    #[must_use]
    pub fn provided(&self) -> &str {
        &self.provided
    }
}

/// Error type produced when configuring or running [`crate::Classifier`].
#[non_exhaustive]
#[derive(Clone, Debug, Error, PartialEq)]
pub enum ArborError {
    /// The requested number of classes must be at least one.
    #[error("class count must be at least 1 (got {got})")]
    InvalidClassCount {
        /// The rejected class count.
        got: usize,
    },
    /// Distance thresholds must be finite and non-negative.
    #[error("threshold must be a finite value >= 0 (got {got})")]
    InvalidThreshold {
        /// The rejected threshold.
        got: f64,
    },
    /// No trees were supplied to the classifier.
    #[error("at least one tree is required")]
    EmptyInput,
    /// The requested execution strategy is unavailable in the current build.
    #[error("the requested execution strategy {requested:?} is not available in this build")]
    BackendUnavailable {
        /// Strategy that could not be satisfied by the current build.
        requested: ExecutionStrategy,
    },
    /// Computing the distance between two input trees failed.
    #[error("distance between trees {left} and {right} failed: {error}")]
    PairDistance {
        /// Position of the first tree in the input list.
        left: usize,
        /// Position of the second tree in the input list.
        right: usize,
        #[source]
        /// Failure reported by the edit-distance engine.
        error: TreeDistanceError,
    },
    /// A supplied distance matrix was malformed.
    #[error(transparent)]
    Matrix(#[from] MatrixError),
    /// Classification rejected its inputs.
    #[error(transparent)]
    Classification(#[from] ClassificationError),
}

define_error_codes! {
    /// Stable codes describing [`ArborError`] variants.
    enum ArborErrorCode for ArborError {
        /// The requested number of classes must be at least one.
        InvalidClassCount => InvalidClassCount { .. } => "ARBOR_INVALID_CLASS_COUNT",
        /// Distance thresholds must be finite and non-negative.
        InvalidThreshold => InvalidThreshold { .. } => "ARBOR_INVALID_THRESHOLD",
        /// No trees were supplied to the classifier.
        EmptyInput => EmptyInput => "ARBOR_EMPTY_INPUT",
        /// The requested execution strategy is unavailable in the current build.
        BackendUnavailable => BackendUnavailable { .. } => "ARBOR_BACKEND_UNAVAILABLE",
        /// Computing the distance between two input trees failed.
        PairDistanceFailure => PairDistance { .. } => "ARBOR_PAIR_DISTANCE_FAILURE",
        /// A supplied distance matrix was malformed.
        MatrixFailure => Matrix(..) => "ARBOR_MATRIX_FAILURE",
        /// Classification rejected its inputs.
        ClassificationFailure => Classification(..) => "ARBOR_CLASSIFICATION_FAILURE",
    }
}

impl ArborError {
    /// Retrieve the code of the underlying error when this error wraps one
    /// from a lower layer.
    #[must_use]
    pub fn source_code(&self) -> Option<&'static str> {
        match self {
            Self::PairDistance { error, .. } => Some(error.code().as_str()),
            Self::Matrix(error) => Some(error.code().as_str()),
            Self::Classification(error) => Some(error.code().as_str()),
            _ => None,
        }
    }
}

/// Convenient alias for results returned by the core API.
pub type Result<T> = core::result::Result<T, ArborError>;
