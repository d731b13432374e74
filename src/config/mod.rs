//! Per-command configuration and option resolution.
//!
//! Every command takes an immutable options value built by functional update over its
//! `Default` (for example `SortOptions { by_length: true, ..Default::default() }`) plus a
//! list of named overrides (`key=value`, as given with `--set`). [`resolve`] applies the
//! overrides, normalizes implied options and validates the result before any partition work
//! is scheduled. Pipelines only accept a [`Resolved`] value, so an unvalidated configuration
//! can never reach the engine.
//!
//! ## Shared options
//!
//! | Key          | Default      | Meaning                                        |
//! |--------------|--------------|------------------------------------------------|
//! | `seq_type`   | `auto`       | Sequence alphabet (`dna`, `rna`, `protein`, …) |
//! | `line_width` | `60`         | FASTA line width, 0 disables wrapping          |
//! | `id_regexp`  | `^(\S+)\s?`  | Identifier pattern, needs one capture group    |
//! | `id_ncbi`    | `false`      | Use the NCBI `\|id\|` identifier pattern       |
//! | `quiet`      | `false`      | Suppress informational output                  |

use std::fmt::Display;
use std::ops::Deref;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::core::types::SeqType;
use crate::parsing::id::IdParser;
use crate::utils::validation::check_capture_group;

pub mod options;

pub use options::*;

/// Default identifier pattern: the first whitespace-delimited word
pub const DEFAULT_ID_REGEXP: &str = r"^(\S+)\s?";

/// Identifier pattern for NCBI-style headers such as `gi|110645304|ref|NC_002516.2| desc`
pub const NCBI_ID_REGEXP: &str = r"\|([^\|]+)\| ";

pub const DEFAULT_LINE_WIDTH: usize = 60;

/// Invalid configuration, raised before any partition is scheduled
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConfigError {
    #[error("{command}: invalid value for '{field}': {reason}")]
    InvalidValue {
        command: &'static str,
        field: String,
        reason: String,
    },

    #[error("{command}: options {} are mutually exclusive", .fields.join(", "))]
    MutuallyExclusive {
        command: &'static str,
        fields: Vec<&'static str>,
    },

    #[error("{command}: '{field}' requires '{required}'")]
    Requires {
        command: &'static str,
        field: &'static str,
        required: &'static str,
    },

    #[error("{command}: missing required option '{field}'")]
    Missing {
        command: &'static str,
        field: &'static str,
    },

    #[error("{command}: unknown option '{field}'")]
    UnknownField { command: &'static str, field: String },

    #[error("{command}: range start {start} is after end {end}")]
    InvertedRange {
        command: &'static str,
        start: i64,
        end: i64,
    },
}

impl ConfigError {
    /// Name of the offending option
    #[must_use]
    pub fn field(&self) -> &str {
        match self {
            Self::InvalidValue { field, .. } | Self::UnknownField { field, .. } => field.as_str(),
            Self::MutuallyExclusive { fields, .. } => fields.first().copied().unwrap_or_default(),
            Self::Requires { field, .. } | Self::Missing { field, .. } => *field,
            Self::InvertedRange { .. } => "range",
        }
    }

    pub(crate) fn invalid(
        command: &'static str,
        field: impl Into<String>,
        reason: impl Display,
    ) -> Self {
        Self::InvalidValue {
            command,
            field: field.into(),
            reason: reason.to_string(),
        }
    }
}

/// Parse an override value, naming the field on failure
pub(crate) fn parse_value<T>(command: &'static str, field: &str, value: &str) -> Result<T, ConfigError>
where
    T: FromStr,
    T::Err: Display,
{
    value
        .trim()
        .parse()
        .map_err(|e| ConfigError::invalid(command, field, e))
}

/// Options shared by every command
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KitConfig {
    pub seq_type: SeqType,
    pub line_width: usize,
    pub id_regexp: String,
    pub id_ncbi: bool,
    pub quiet: bool,
}

impl Default for KitConfig {
    fn default() -> Self {
        Self {
            seq_type: SeqType::Auto,
            line_width: DEFAULT_LINE_WIDTH,
            id_regexp: DEFAULT_ID_REGEXP.to_string(),
            id_ncbi: false,
            quiet: false,
        }
    }
}

impl KitConfig {
    /// Apply one override; `Ok(false)` if `key` is not a shared option.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::InvalidValue` if the value does not parse.
    pub fn apply_override(
        &mut self,
        command: &'static str,
        key: &str,
        value: &str,
    ) -> Result<bool, ConfigError> {
        match key {
            "seq_type" => self.seq_type = parse_value(command, key, value)?,
            "line_width" => self.line_width = parse_value(command, key, value)?,
            "id_regexp" => self.id_regexp = value.to_string(),
            "id_ncbi" => self.id_ncbi = parse_value(command, key, value)?,
            "quiet" => self.quiet = parse_value(command, key, value)?,
            _ => return Ok(false),
        }
        Ok(true)
    }

    pub fn normalize(&mut self) {
        if self.id_ncbi {
            self.id_regexp = NCBI_ID_REGEXP.to_string();
        }
    }

    /// # Errors
    ///
    /// Returns `ConfigError::InvalidValue` naming `id_regexp` if the pattern does not
    /// compile or has no capture group.
    pub fn validate(&self, command: &'static str) -> Result<(), ConfigError> {
        check_capture_group(&self.id_regexp).map_err(|e| ConfigError::invalid(command, "id_regexp", e))
    }

    /// Identifier parser for this configuration
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::InvalidValue` for `command` if `id_regexp` does not compile.
    pub fn id_parser(&self, command: &'static str) -> Result<IdParser, ConfigError> {
        IdParser::new(&self.id_regexp).map_err(|e| ConfigError::invalid(command, "id_regexp", e))
    }
}

/// Named `key=value` overrides, applied in order
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Overrides(Vec<(String, String)>);

impl Overrides {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.0.push((key.into(), value.into()));
        self
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl FromIterator<(String, String)> for Overrides {
    fn from_iter<I: IntoIterator<Item = (String, String)>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

/// Parse a `key=value` override (clap value parser for `--set`)
///
/// # Errors
///
/// Returns an error message if there is no `=` or the key is empty.
pub fn parse_override(s: &str) -> Result<(String, String), String> {
    match s.split_once('=') {
        Some((key, value)) if !key.trim().is_empty() => {
            Ok((key.trim().replace('-', "_"), value.to_string()))
        }
        _ => Err(format!("invalid override '{s}', expected key=value")),
    }
}

/// Configuration of a single command
pub trait CommandOptions: Clone + Serialize {
    /// Command name used in error messages and logs
    const COMMAND: &'static str;

    fn kit(&self) -> &KitConfig;

    fn kit_mut(&mut self) -> &mut KitConfig;

    /// Apply one override to a command-specific field; `Ok(false)` if there is no such field.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::InvalidValue` if the value does not parse.
    fn set_field(&mut self, key: &str, value: &str) -> Result<bool, ConfigError>;

    /// Fill in options implied by others
    fn normalize(&mut self) {}

    /// # Errors
    ///
    /// Returns a `ConfigError` naming the offending field.
    fn validate(&self) -> Result<(), ConfigError>;

    /// Stable serialized form of the options, as shipped to partition workers
    fn options_blob(&self) -> String {
        serde_json::to_string(self).unwrap_or_default()
    }
}

/// A validated, fully defaulted configuration
#[derive(Debug, Clone, PartialEq)]
pub struct Resolved<O>(O);

impl<O> Resolved<O> {
    pub fn into_inner(self) -> O {
        self.0
    }
}

impl<O> Deref for Resolved<O> {
    type Target = O;

    fn deref(&self) -> &O {
        &self.0
    }
}

/// Apply overrides to `options`, then normalize and validate.
///
/// Overrides are matched against the command's own fields first and the shared
/// [`KitConfig`] second; `-` and `_` are interchangeable in keys.
///
/// # Errors
///
/// Returns `ConfigError::UnknownField` for a key neither accepts, or any error raised by
/// parsing a value or validating the combination.
pub fn resolve<O: CommandOptions>(
    mut options: O,
    overrides: &Overrides,
) -> Result<Resolved<O>, ConfigError> {
    for (key, value) in overrides.iter() {
        let key = key.trim().replace('-', "_");
        if !options.set_field(&key, value)?
            && !options.kit_mut().apply_override(O::COMMAND, &key, value)?
        {
            return Err(ConfigError::UnknownField {
                command: O::COMMAND,
                field: key,
            });
        }
    }

    options.kit_mut().normalize();
    options.normalize();
    options.kit().validate(O::COMMAND)?;
    options.validate()?;

    debug!(command = O::COMMAND, options = %options.options_blob(), "Resolved options");
    Ok(Resolved(options))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_override() {
        assert_eq!(
            parse_override("by-seq=true").unwrap(),
            ("by_seq".to_string(), "true".to_string())
        );
        assert_eq!(
            parse_override("separator=a=b").unwrap(),
            ("separator".to_string(), "a=b".to_string())
        );
        assert!(parse_override("novalue").is_err());
        assert!(parse_override("=1").is_err());
    }

    #[test]
    fn test_resolve_applies_shared_and_command_overrides() {
        let overrides = Overrides::new()
            .with("line_width", "0")
            .with("by-seq", "true");
        let resolved = resolve(RmDupOptions::default(), &overrides).unwrap();
        assert_eq!(resolved.kit.line_width, 0);
        assert!(resolved.by_seq);
    }

    #[test]
    fn test_resolve_rejects_unknown_key() {
        let overrides = Overrides::new().with("colour", "blue");
        let err = resolve(HeadOptions::default(), &overrides).unwrap_err();
        assert!(matches!(err, ConfigError::UnknownField { .. }));
        assert_eq!(err.field(), "colour");
    }

    #[test]
    fn test_resolve_rejects_unparsable_value() {
        let overrides = Overrides::new().with("number", "ten");
        let err = resolve(HeadOptions::default(), &overrides).unwrap_err();
        assert_eq!(err.field(), "number");
    }

    #[test]
    fn test_ncbi_mode_replaces_id_regexp() {
        let overrides = Overrides::new().with("id_ncbi", "true");
        let resolved = resolve(HeadOptions::default(), &overrides).unwrap();
        assert_eq!(resolved.kit.id_regexp, NCBI_ID_REGEXP);
    }

    #[test]
    fn test_id_regexp_needs_capture_group() {
        let overrides = Overrides::new().with("id_regexp", r"^\S+");
        let err = resolve(HeadOptions::default(), &overrides).unwrap_err();
        assert_eq!(err.field(), "id_regexp");

        let overrides = Overrides::new().with("id_regexp", "([a-z");
        assert!(resolve(HeadOptions::default(), &overrides).is_err());
    }

    #[test]
    fn test_id_parser_errors_name_the_command() {
        let kit = KitConfig {
            id_regexp: "([a-z".to_string(),
            ..KitConfig::default()
        };
        let err = kit.id_parser("rmdup").unwrap_err();
        assert!(err.to_string().starts_with("rmdup: invalid value for 'id_regexp'"));
    }

    #[test]
    fn test_options_blob_is_stable() {
        let blob = HeadOptions::default().options_blob();
        assert!(blob.starts_with(r#"{"kit":{"seq_type":"auto","line_width":60"#));
        assert!(blob.ends_with(r#""number":10}"#));
    }
}
