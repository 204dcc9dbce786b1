use std::path::Path;
use std::path::PathBuf;

use serde::Deserialize;

use crate::TmplError;
use crate::TmplResult;

/// Supported config file locations in discovery order (highest precedence
/// first).
pub const CONFIG_FILE_CANDIDATES: [&str; 3] =
	["tmplgen.toml", ".tmplgen.toml", ".config/tmplgen.toml"];

/// Default name of the marker tag: `<tmpl>` ... `</tmpl>`.
pub const DEFAULT_TAG: &str = "tmpl";

/// Default token replaced by the zero-based row index.
pub const DEFAULT_INDEX_TOKEN: &str = "i_";

/// Configuration loaded from a `tmplgen.toml` file.
///
/// ```toml
/// tag = "tmpl"
/// index_token = "i_"
///
/// [output]
/// template_marker = "tmpl"
/// generated_marker = "g"
/// default_extension = "cs"
/// bom = "preserve"
/// ```
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub struct TmplConfig {
	/// Name of the marker tag.
	#[serde(default = "default_tag")]
	pub tag: String,
	/// Token replaced by the row index in template blocks.
	#[serde(default = "default_index_token")]
	pub index_token: String,
	/// Output file naming and encoding.
	#[serde(default)]
	pub output: OutputConfig,
}

/// Controls where generated files go and how they are encoded.
///
/// Output paths are derived from the input file name:
///
/// - `Settings.tmpl.cs` → `Settings.cs` (the template marker is dropped)
/// - `Settings.cs` → `Settings.g.cs` (the generated marker is inserted)
/// - `Settings` → `Settings.cs` (the default extension is appended)
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub struct OutputConfig {
	#[serde(default = "default_template_marker")]
	pub template_marker: String,
	#[serde(default = "default_generated_marker")]
	pub generated_marker: String,
	#[serde(default = "default_extension")]
	pub default_extension: String,
	#[serde(default)]
	pub bom: BomPolicy,
}

/// Whether generated files start with a UTF-8 byte order mark.
#[derive(Debug, Clone, Copy, Default, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum BomPolicy {
	/// Write a BOM when the template has one.
	#[default]
	Preserve,
	/// Always write a BOM.
	Always,
	/// Never write a BOM.
	Never,
}

impl BomPolicy {
	pub fn writes_bom(self, template_has_bom: bool) -> bool {
		match self {
			Self::Preserve => template_has_bom,
			Self::Always => true,
			Self::Never => false,
		}
	}
}

fn default_tag() -> String {
	DEFAULT_TAG.to_string()
}

fn default_index_token() -> String {
	DEFAULT_INDEX_TOKEN.to_string()
}

fn default_template_marker() -> String {
	"tmpl".to_string()
}

fn default_generated_marker() -> String {
	"g".to_string()
}

fn default_extension() -> String {
	"cs".to_string()
}

impl Default for TmplConfig {
	fn default() -> Self {
		Self {
			tag: default_tag(),
			index_token: default_index_token(),
			output: OutputConfig::default(),
		}
	}
}

impl Default for OutputConfig {
	fn default() -> Self {
		Self {
			template_marker: default_template_marker(),
			generated_marker: default_generated_marker(),
			default_extension: default_extension(),
			bom: BomPolicy::default(),
		}
	}
}

impl TmplConfig {
	/// Resolve the config path from known discovery candidates.
	#[must_use]
	pub fn resolve_path(root: &Path) -> Option<PathBuf> {
		CONFIG_FILE_CANDIDATES
			.iter()
			.map(|candidate| root.join(candidate))
			.find(|path| path.is_file())
	}

	/// Load the config from the first discovered config file at `root`.
	/// Returns `None` if there is no config file.
	pub fn load(root: &Path) -> TmplResult<Option<TmplConfig>> {
		let Some(config_path) = Self::resolve_path(root) else {
			return Ok(None);
		};

		Self::load_file(&config_path).map(Some)
	}

	/// Load the config from an explicit path.
	pub fn load_file(path: &Path) -> TmplResult<TmplConfig> {
		let content = std::fs::read_to_string(path)?;
		Self::from_toml(&content)
	}

	/// Parse and validate a config from TOML text.
	pub fn from_toml(content: &str) -> TmplResult<TmplConfig> {
		let config: TmplConfig =
			toml::from_str(content).map_err(|e| TmplError::ConfigParse(e.to_string()))?;
		config.validate()
	}

	fn validate(self) -> TmplResult<Self> {
		let tag_is_name = self
			.tag
			.chars()
			.next()
			.is_some_and(|ch| ch.is_ascii_alphabetic() || ch == '_')
			&& self
				.tag
				.chars()
				.all(|ch| ch.is_ascii_alphanumeric() || matches!(ch, '_' | '-' | '.' | ':'));
		if !tag_is_name {
			return Err(TmplError::ConfigParse(format!(
				"`tag` must be a tag name, got `{}`",
				self.tag
			)));
		}

		if self.index_token.trim().is_empty() {
			return Err(TmplError::ConfigParse(
				"`index_token` must not be empty".to_string(),
			));
		}

		if self.output.default_extension.is_empty() {
			return Err(TmplError::ConfigParse(
				"`output.default_extension` must not be empty".to_string(),
			));
		}

		Ok(self)
	}
}
