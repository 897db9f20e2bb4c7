//! Declarative action inputs.
//!
//! Inputs arrive as strings (CLI flags or `INPUT_*` variables). This module
//! turns them into typed values once, at startup, so the actions never re-check
//! optional fields:
//! - [`parse_bool`] for flag-like inputs
//! - [`DependencyBlock`] for the per-OS `ubuntu`/`macos`/`windows` blocks
//! - [`DependencySpec`] lists for `github`
//! - [`parse_docker_images`] for the `docker-images` list

mod deps;

pub use deps::*;

use serde::de::DeserializeOwned;
use thiserror::Error;

/// Errors in declarative inputs.
#[derive(Debug, Error)]
pub enum InputError {
  /// The input value is outside the accepted set.
  #[error("invalid value '{value}' for input '{name}': expected {expected}")]
  InvalidValue {
    name: String,
    value: String,
    expected: String,
  },

  /// A required input is empty.
  #[error("input '{name}' is required")]
  Missing { name: String },

  /// A structured input is not valid YAML or has unexpected fields.
  #[error("failed to parse input '{name}': {source}")]
  Yaml {
    name: String,
    #[source]
    source: serde_yaml::Error,
  },

  /// A dependency entry is not of the form `owner/name`.
  #[error("invalid dependency path '{path}': expected 'owner/name'")]
  DependencyPath { path: String },
}

/// Parse the boolean input `name`.
///
/// Accepts `true/yes/on/y/1` and `false/no/off/n/0` in any case; an empty
/// value is `false`.
pub fn parse_bool(name: &str, value: &str) -> Result<bool, InputError> {
  match value.trim().to_ascii_lowercase().as_str() {
    "true" | "yes" | "on" | "y" | "1" => Ok(true),
    "" | "false" | "no" | "off" | "n" | "0" => Ok(false),
    _ => Err(InputError::InvalidValue {
      name: name.to_string(),
      value: value.to_string(),
      expected: "true or false".to_string(),
    }),
  }
}

/// Return `value` unless it is blank, in which case the input is missing.
pub fn required(name: &str, value: &str) -> Result<String, InputError> {
  let value = value.trim();
  if value.is_empty() {
    return Err(InputError::Missing { name: name.to_string() });
  }
  Ok(value.to_string())
}

/// Parse a YAML input, treating a blank or `null` document as `T::default()`.
pub(crate) fn parse_yaml<T>(name: &str, source: &str) -> Result<T, InputError>
where
  T: DeserializeOwned + Default,
{
  if source.trim().is_empty() {
    return Ok(T::default());
  }
  let value: Option<T> = serde_yaml::from_str(source).map_err(|source| InputError::Yaml {
    name: name.to_string(),
    source,
  })?;
  Ok(value.unwrap_or_default())
}

/// Parse the `docker-images` input: a YAML list of image names.
pub fn parse_docker_images(source: &str) -> Result<Vec<String>, InputError> {
  parse_yaml("docker-images", source)
}
