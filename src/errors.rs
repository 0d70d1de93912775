//! Error types for the scaffolding pipeline.

use std::fmt;

use thiserror::Error;

/// Top-level error for everything the CLI can surface.
#[derive(Debug, Error)]
pub enum ForgeError {
    /// Persisted config is malformed: not JSON, or missing required keys.
    #[error("Config error: {0}")]
    ConfigShape(String),

    /// Well-formed but semantically invalid config, ABI shape problems
    /// and cross-reference failures included.
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// Acquisition-layer failure while fetching an ABI. Messages are
    /// sanitized upstream and propagated opaquely here.
    #[error("ABI fetch failed: {0}")]
    AbiFetch(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Machine-stable codes for validation failures. The code is part of the
/// error's contract: tests and callers match on it, messages are for humans.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValidationCode {
    MissingField,
    UnsupportedVersion,
    UnknownNetwork,
    InvalidAddress,
    InvalidMappingsMode,
    InvalidComplexity,
    VersionTooLow,
    TierViolation,
    DuplicateName,
    DuplicateAddress,
    InvalidCallHandler,
    InvalidRelationType,
    CrossReference,
    AbiShape,
    DerivedFieldMissing,
    NoAddressParam,
}

impl ValidationCode {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::MissingField => "missing-field",
            Self::UnsupportedVersion => "unsupported-version",
            Self::UnknownNetwork => "unknown-network",
            Self::InvalidAddress => "invalid-address",
            Self::InvalidMappingsMode => "invalid-mappings-mode",
            Self::InvalidComplexity => "invalid-complexity",
            Self::VersionTooLow => "version-too-low",
            Self::TierViolation => "tier-violation",
            Self::DuplicateName => "duplicate-name",
            Self::DuplicateAddress => "duplicate-address",
            Self::InvalidCallHandler => "invalid-call-handler",
            Self::InvalidRelationType => "invalid-relation-type",
            Self::CrossReference => "cross-reference",
            Self::AbiShape => "abi-shape",
            Self::DerivedFieldMissing => "derived-field-missing",
            Self::NoAddressParam => "no-address-param",
        }
    }
}

impl fmt::Display for ValidationCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single validation failure: stable code, offending field path
/// (e.g. `contracts[1].address`), human-readable message.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("{code}: {path}: {message}")]
pub struct ValidationError {
    pub code: ValidationCode,
    pub path: String,
    pub message: String,
}

impl ValidationError {
    pub fn new(
        code: ValidationCode,
        path: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self {
            code,
            path: path.into(),
            message: message.into(),
        }
    }

    /// Re-anchor the field path under a parent, for errors raised while
    /// processing a named sub-document (e.g. one contract's ABI).
    pub fn nested_under(mut self, parent: &str) -> Self {
        self.path = format!("{}.{}", parent, self.path);
        self
    }
}
