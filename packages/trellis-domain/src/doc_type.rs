use serde::{Deserialize, Serialize};

/// Document categories recognized by the ingest pipeline. Unknown inputs
/// normalize to [`DocumentType::GeneralDoc`] rather than failing the request.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DocumentType {
	ApiDoc,
	TechDoc,
	CodeLogicDoc,
	#[default]
	GeneralDoc,
}
impl DocumentType {
	/// Normalizes a raw type tag: upper-cased, dashes mapped to underscores,
	/// then matched against the accepted aliases.
	pub fn parse(raw: &str) -> Self {
		let normalized = raw.trim().to_ascii_uppercase().replace('-', "_");

		match normalized.as_str() {
			"API" | "API_DOC" => Self::ApiDoc,
			"TECH" | "TECH_DOC" => Self::TechDoc,
			"CODE" | "CODE_LOGIC" | "CODE_LOGIC_DOC" => Self::CodeLogicDoc,
			_ => Self::GeneralDoc,
		}
	}

	pub fn as_str(&self) -> &'static str {
		match self {
			Self::ApiDoc => "API_DOC",
			Self::TechDoc => "TECH_DOC",
			Self::CodeLogicDoc => "CODE_LOGIC_DOC",
			Self::GeneralDoc => "GENERAL_DOC",
		}
	}
}
