use std::fmt;

use crate::core::errors::{BackupError, Result};

/// Which secrets a backup run includes.
///
/// Exactly one mode is active. Constructed only through
/// [`Selector::from_parts`], which enforces the mutual exclusion.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Selector {
    /// A single secret, matched by `metadata.name`.
    Name(String),
    /// All secrets carrying the label `key=value`.
    Label { key: String, value: String },
}

impl Selector {
    /// Build a selector from the three optional inputs.
    ///
    /// Without a name, both label key and value are required. With a name,
    /// neither label field may be set. Empty strings count as unset.
    pub fn from_parts(
        name: Option<&str>,
        label_key: Option<&str>,
        label_value: Option<&str>,
    ) -> Result<Self> {
        let name = non_empty(name);
        let key = non_empty(label_key);
        let value = non_empty(label_value);

        match (name, key, value) {
            (Some(name), None, None) => Ok(Self::Name(name.to_string())),
            (None, Some(key), Some(value)) => Ok(Self::Label {
                key: key.to_string(),
                value: value.to_string(),
            }),
            (Some(_), _, _) => Err(BackupError::ConfigInvalid {
                detail: "SECRET_NAME cannot be combined with LABEL_KEY or LABEL_VALUE".into(),
            }),
            (None, None, None) => Err(BackupError::ConfigInvalid {
                detail: "no secret selector given".into(),
            }),
            (None, _, _) => Err(BackupError::ConfigInvalid {
                detail: "LABEL_KEY and LABEL_VALUE must be provided together".into(),
            }),
        }
    }

    /// Token identifying this selector inside artifact names.
    ///
    /// Label selectors become `<key>-<value>` with path separators replaced
    /// by `_`, so the token is safe as a file name and as an object key.
    pub fn identity(&self) -> String {
        match self {
            Self::Name(name) => name.clone(),
            Self::Label { key, value } => format!("{key}-{value}").replace(['/', '\\'], "_"),
        }
    }
}

impl fmt::Display for Selector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Name(name) => write!(f, "metadata.name={name}"),
            Self::Label { key, value } => write!(f, "{key}={value}"),
        }
    }
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.filter(|v| !v.is_empty())
}
