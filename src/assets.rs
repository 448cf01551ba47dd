//! Embedded default assets
//!
//! The default `config.yaml` is compiled into the binary so the tool runs
//! without any files next to it. An external config replaces it entirely.

use rust_embed::RustEmbed;

/// Embedded default config
#[derive(RustEmbed)]
#[folder = "."]
#[include = "config.yaml"]
struct EmbeddedConfig;

/// File name of the embedded config
pub const CONFIG_FILE_NAME: &str = "config.yaml";

/// The embedded default configuration as text, if it is valid UTF-8.
pub fn embedded_config() -> Option<String> {
    let file = EmbeddedConfig::get(CONFIG_FILE_NAME)?;
    String::from_utf8(file.data.into_owned()).ok()
}
