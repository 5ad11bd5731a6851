//! Error types for the mg-core crate.
//!
//! Each concern gets its own enum:
//!
//! - [`PropertyError`] - reading, writing, and constructing model instances
//! - [`RegistryError`] - declaring and looking up model types
//! - [`ConfigError`] - loading configuration files
//!
//! [`Error`] wraps all three, and every error reports an [`ErrorKind`] so
//! callers can branch on the failure without matching message text.

use camino::Utf8PathBuf;

/// The category of a failure, shared by every error type in this crate.
///
/// # Examples
///
/// ```
/// use mg_core::{ErrorKind, PropertyError};
///
/// let error = PropertyError::unknown("Plot", "widht");
/// assert_eq!(error.kind(), ErrorKind::UnknownProperty);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[non_exhaustive]
pub enum ErrorKind {
    /// A property name absent from the type's merged descriptor map.
    UnknownProperty,
    /// A value (or a declared default) failed validation.
    InvalidValue,
    /// A computed property has no getter.
    NotReadable,
    /// A computed property has no setter.
    NotWritable,
    /// A singular accessor matched more than one candidate.
    AmbiguousSelection,
    /// An abstract model type was instantiated.
    AbstractInstantiation,
    /// A type declaration conflicts with the registry's contents.
    RegistryConflict,
    /// A type name was looked up but never declared.
    Lookup,
    /// Configuration could not be loaded or is invalid.
    Config,
}

/// Errors raised by the property protocol of a model instance.
///
/// All of these abort the operation that raised them; a failed write
/// never leaves the instance's attributes altered.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PropertyError {
    /// The property is not declared on the model type.
    #[error("unknown property '{property}' on {model}")]
    UnknownProperty {
        /// The model type name.
        model: String,
        /// The requested property name.
        property: String,
    },

    /// A written value was rejected by the property's value type.
    #[error("invalid value for {model}.{property}: {reason}")]
    InvalidValue {
        /// The model type name.
        model: String,
        /// The property being written.
        property: String,
        /// Why validation failed.
        reason: String,
    },

    /// A declared or generated default failed validation.
    ///
    /// This is a defect in the type declaration rather than in the caller.
    #[error("invalid default for {model}.{property}: {reason}")]
    InvalidDefault {
        /// The model type name.
        model: String,
        /// The property whose default is broken.
        property: String,
        /// Why validation failed.
        reason: String,
    },

    /// The computed property has no getter.
    #[error("property {model}.{property} is write-only")]
    NotReadable {
        /// The model type name.
        model: String,
        /// The property being read.
        property: String,
    },

    /// The computed property has no setter.
    #[error("property {model}.{property} is read-only")]
    NotWritable {
        /// The model type name.
        model: String,
        /// The property being written.
        property: String,
    },

    /// A singular accessor found several matches.
    #[error("{matches} candidates on {model} match; use '{plural}' to get all of them")]
    AmbiguousSelection {
        /// The model type name of the container.
        model: String,
        /// How many candidates matched.
        matches: usize,
        /// The plural accessor that returns every match.
        plural: String,
    },

    /// Abstract model types cannot be instantiated.
    #[error("cannot instantiate abstract model type {0}")]
    AbstractInstantiation(String),
}

impl PropertyError {
    /// Creates a new [`PropertyError::UnknownProperty`] error.
    #[inline]
    pub fn unknown(model: impl Into<String>, property: impl Into<String>) -> Self {
        Self::UnknownProperty {
            model: model.into(),
            property: property.into(),
        }
    }

    /// Creates a new [`PropertyError::InvalidValue`] error.
    #[inline]
    pub fn invalid(
        model: impl Into<String>,
        property: impl Into<String>,
        reason: impl Into<String>,
    ) -> Self {
        Self::InvalidValue {
            model: model.into(),
            property: property.into(),
            reason: reason.into(),
        }
    }

    /// Creates a new [`PropertyError::InvalidDefault`] error.
    #[inline]
    pub fn invalid_default(
        model: impl Into<String>,
        property: impl Into<String>,
        reason: impl Into<String>,
    ) -> Self {
        Self::InvalidDefault {
            model: model.into(),
            property: property.into(),
            reason: reason.into(),
        }
    }

    /// Returns the category of this error.
    #[must_use]
    pub const fn kind(&self) -> ErrorKind {
        match self {
            Self::UnknownProperty { .. } => ErrorKind::UnknownProperty,
            Self::InvalidValue { .. } | Self::InvalidDefault { .. } => ErrorKind::InvalidValue,
            Self::NotReadable { .. } => ErrorKind::NotReadable,
            Self::NotWritable { .. } => ErrorKind::NotWritable,
            Self::AmbiguousSelection { .. } => ErrorKind::AmbiguousSelection,
            Self::AbstractInstantiation(_) => ErrorKind::AbstractInstantiation,
        }
    }

    /// Returns `true` if the error points at a broken type declaration
    /// rather than at the caller's input.
    #[inline]
    #[must_use]
    pub const fn is_configuration_defect(&self) -> bool {
        matches!(self, Self::InvalidDefault { .. })
    }

    /// Returns the property name associated with this error, if any.
    #[must_use]
    pub fn property(&self) -> Option<&str> {
        match self {
            Self::UnknownProperty { property, .. }
            | Self::InvalidValue { property, .. }
            | Self::InvalidDefault { property, .. }
            | Self::NotReadable { property, .. }
            | Self::NotWritable { property, .. } => Some(property),
            Self::AmbiguousSelection { .. } | Self::AbstractInstantiation(_) => None,
        }
    }
}

/// Errors raised while declaring or looking up model types.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RegistryError {
    /// A type with this name is already registered.
    #[error("model type {0} is already declared")]
    DuplicateType(String),

    /// No type with this name is registered.
    #[error("unknown model type {0}")]
    UnknownType(String),

    /// A listed parent has not been declared yet.
    #[error("model type {model} lists unknown parent {parent}")]
    UnknownParent {
        /// The type being declared.
        model: String,
        /// The missing parent.
        parent: String,
    },

    /// An abstract type was declared below a concrete parent.
    #[error("abstract model type {model} cannot inherit from concrete type {parent}")]
    AbstractConflict {
        /// The type being declared.
        model: String,
        /// The concrete parent.
        parent: String,
    },

    /// A transformer targets a property that no parent or earlier entry declares.
    #[error("model type {model} transforms {property}, which is not declared by any parent")]
    MissingTransformTarget {
        /// The type being declared.
        model: String,
        /// The missing property.
        property: String,
    },

    /// A transformer rejected the descriptor it was applied to.
    #[error("cannot transform {model}.{property}: {reason}")]
    InvalidOverride {
        /// The type being declared.
        model: String,
        /// The transformed property.
        property: String,
        /// Why the transformer failed.
        reason: String,
    },

    /// A constant default does not satisfy its own value type.
    #[error("invalid default for {model}.{property}: {reason}")]
    InvalidDefault {
        /// The type being declared.
        model: String,
        /// The property whose default is broken.
        property: String,
        /// Why validation failed.
        reason: String,
    },
}

impl RegistryError {
    /// Returns the category of this error.
    #[must_use]
    pub const fn kind(&self) -> ErrorKind {
        match self {
            Self::UnknownType(_) => ErrorKind::Lookup,
            Self::DuplicateType(_)
            | Self::UnknownParent { .. }
            | Self::AbstractConflict { .. }
            | Self::MissingTransformTarget { .. }
            | Self::InvalidOverride { .. } => ErrorKind::RegistryConflict,
            Self::InvalidDefault { .. } => ErrorKind::InvalidValue,
        }
    }
}

/// Errors that can occur during configuration loading and validation.
///
/// # Examples
///
/// ```
/// use mg_core::ConfigError;
/// use camino::Utf8PathBuf;
///
/// let error = ConfigError::MissingFile(Utf8PathBuf::from("/etc/modelgraph.json"));
/// assert!(error.to_string().contains("/etc/modelgraph.json"));
/// ```
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// The configuration file does not exist.
    #[error("configuration file not found: {0}")]
    MissingFile(Utf8PathBuf),

    /// An I/O error occurred while reading configuration.
    #[error("failed to read configuration: {0}")]
    Io(#[from] std::io::Error),

    /// Failed to parse the configuration file.
    #[error("failed to parse configuration: {0}")]
    Parse(#[from] serde_json::Error),
}

/// Any error produced by this crate.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// A property protocol failure.
    #[error(transparent)]
    Property(#[from] PropertyError),

    /// A registry failure.
    #[error(transparent)]
    Registry(#[from] RegistryError),

    /// A configuration failure.
    #[error(transparent)]
    Config(#[from] ConfigError),
}

impl Error {
    /// Returns the category of this error.
    #[must_use]
    pub const fn kind(&self) -> ErrorKind {
        match self {
            Self::Property(e) => e.kind(),
            Self::Registry(e) => e.kind(),
            Self::Config(_) => ErrorKind::Config,
        }
    }
}

/// A [`Result`](std::result::Result) defaulting to this crate's [`Error`].
pub type Result<T, E = Error> = std::result::Result<T, E>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unknown_property_display() {
        let error = PropertyError::unknown("Plot", "widht");
        let msg = error.to_string();
        assert!(msg.contains("Plot"));
        assert!(msg.contains("widht"));
        assert_eq!(error.property(), Some("widht"));
    }

    #[test]
    fn test_invalid_default_is_configuration_defect() {
        let error = PropertyError::invalid_default("Range1d", "start", "expected Float");
        assert!(error.is_configuration_defect());
        assert_eq!(error.kind(), ErrorKind::InvalidValue);

        let error = PropertyError::invalid("Range1d", "start", "expected Float");
        assert!(!error.is_configuration_defect());
    }

    #[test]
    fn test_ambiguous_selection_names_plural() {
        let error = PropertyError::AmbiguousSelection {
            model: "Plot".to_owned(),
            matches: 2,
            plural: "xaxes".to_owned(),
        };
        assert!(error.to_string().contains("'xaxes'"));
        assert_eq!(error.kind(), ErrorKind::AmbiguousSelection);
        assert!(error.property().is_none());
    }

    #[test]
    fn test_registry_error_kinds() {
        assert_eq!(
            RegistryError::UnknownType("Foo".to_owned()).kind(),
            ErrorKind::Lookup
        );
        let conflict = RegistryError::AbstractConflict {
            model: "Base".to_owned(),
            parent: "Concrete".to_owned(),
        };
        assert_eq!(conflict.kind(), ErrorKind::RegistryConflict);
        assert!(conflict.to_string().contains("Concrete"));
    }

    #[test]
    fn test_error_wraps_kinds() {
        let error: Error = PropertyError::AbstractInstantiation("Range".to_owned()).into();
        assert_eq!(error.kind(), ErrorKind::AbstractInstantiation);

        let error: Error = ConfigError::MissingFile("modelgraph.json".into()).into();
        assert_eq!(error.kind(), ErrorKind::Config);
        assert!(error.to_string().contains("modelgraph.json"));
    }
}
