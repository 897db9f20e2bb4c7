//! Reading and rewriting `conanfile.py`.

use std::path::Path;

use tracing::debug;

use crate::error::ActionError;

pub const RECIPE_FILE: &str = "conanfile.py";

/// Version declared in the recipe as `    version = "<v>"`.
pub fn extract_version(recipe: &str) -> Option<String> {
  recipe.lines().find_map(|line| {
    line
      .strip_prefix("    version = \"")
      .and_then(|rest| rest.strip_suffix('"'))
      .map(str::to_string)
  })
}

/// Point every `<repository>/<stable>` and `<repository>/<dev>` requirement
/// at `<repository>/<channel>`.
pub fn rewrite_channel(recipe: &str, repository: &str, stable: &str, dev: &str, channel: &str) -> String {
  let target = format!("{}/{}", repository, channel);
  [stable, dev]
    .iter()
    .filter(|from| **from != channel)
    .fold(recipe.to_string(), |text, from| {
      text.replace(&format!("{}/{}", repository, from), &target)
    })
}

/// Read the recipe in `dir`.
pub async fn read(dir: &Path) -> Result<String, ActionError> {
  let path = dir.join(RECIPE_FILE);
  tokio::fs::read_to_string(&path)
    .await
    .map_err(|e| ActionError::io(&path, e))
}

/// Rewrite the recipe in `dir` in place; returns whether it changed.
pub async fn rewrite_file(
  dir: &Path,
  repository: &str,
  stable: &str,
  dev: &str,
  channel: &str,
) -> Result<bool, ActionError> {
  let path = dir.join(RECIPE_FILE);
  let recipe = read(dir).await?;
  let rewritten = rewrite_channel(&recipe, repository, stable, dev, channel);
  if rewritten == recipe {
    return Ok(false);
  }
  debug!(path = %path.display(), channel, "rewriting recipe channel");
  tokio::fs::write(&path, rewritten)
    .await
    .map_err(|e| ActionError::io(&path, e))?;
  Ok(true)
}
