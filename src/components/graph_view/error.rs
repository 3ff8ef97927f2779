use thiserror::Error;

/// Failures the export action reports to whoever wired it.
#[derive(Debug, Error)]
pub enum ExportError {
	#[error("no download capability on this platform")]
	Unavailable,
	#[error("failed to serialize the rendered svg: {0}")]
	Serialize(String),
	#[error("platform download call failed: {0}")]
	Platform(String),
}

#[derive(Debug, Error)]
pub enum PayloadError {
	#[error("invalid json: {0}")]
	Json(#[from] serde_json::Error),
	#[error("invalid setting `{field}`: {reason}")]
	Setting { field: &'static str, reason: String },
}
