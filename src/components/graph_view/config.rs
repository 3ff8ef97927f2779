use serde::Deserialize;

use super::error::PayloadError;

/// Fill colors handed out to labels that have no explicit style rule.
/// The base `node` grey is left out so inferred labels stand apart from unstyled nodes.
pub const DEFAULT_PALETTE: &[&str] = &[
	"#F25A29", "#AD62CE", "#30B6AF", "#FCC940", "#4356C0", "#FF6C7C", "#A2CF81", "#F79235",
	"#785CC7", "#D05E7C", "#3BA3D0",
];

/// Rules every style sheet starts with, before any per-label rule.
pub const BASE_STYLE: &str = "
    node {
      diameter: 40px;
      color: #DFE1E3;
      border-color: #D4D6D7;
      border-width: 2px;
      text-color-internal: #000000;
      text-color-external: #000000;
      caption: '{name}';
      font-size: 12px;
    }
    relationship {
      color: #4356C0;
      shaft-width: 3px;
      font-size: 9px;
      padding: 3px;
      text-color-external: #000000;
      text-color-internal: #FFFFFF;
    }\n";

/// Tunables of one visualization instance.
#[derive(Clone, Debug, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ViewConfig {
	pub palette: Vec<String>,
	pub base_style: String,
	/// Caption values longer than this many characters are cut.
	pub caption_limit: usize,
	pub caption_ellipsis: String,
	pub min_scale: f64,
	pub max_scale: f64,
	pub wheel_zoom_in: f64,
	pub wheel_zoom_out: f64,
	pub layout: LayoutConfig,
}

impl Default for ViewConfig {
	fn default() -> Self {
		Self {
			palette: DEFAULT_PALETTE.iter().map(|c| c.to_string()).collect(),
			base_style: BASE_STYLE.to_string(),
			caption_limit: 30,
			caption_ellipsis: " ...".to_string(),
			min_scale: 0.2,
			max_scale: 8.0,
			wheel_zoom_in: 1.1,
			wheel_zoom_out: 0.9,
			layout: LayoutConfig::default(),
		}
	}
}

impl ViewConfig {
	/// Parse host-provided overrides; absent fields keep their defaults.
	pub fn from_json(raw: &str) -> Result<Self, PayloadError> {
		let config: Self = serde_json::from_str(raw)?;
		config.validate()?;
		Ok(config)
	}

	/// Reject settings the zoom behavior cannot work with.
	pub fn validate(&self) -> Result<(), PayloadError> {
		let invalid = |field, reason: String| Err(PayloadError::Setting { field, reason });
		for (field, value) in [
			("minScale", self.min_scale),
			("maxScale", self.max_scale),
			("wheelZoomIn", self.wheel_zoom_in),
			("wheelZoomOut", self.wheel_zoom_out),
		] {
			if !(value.is_finite() && value > 0.0) {
				return invalid(field, format!("{value} is not a positive number"));
			}
		}
		if self.min_scale > self.max_scale {
			return invalid(
				"minScale",
				format!("{} is above maxScale {}", self.min_scale, self.max_scale),
			);
		}
		Ok(())
	}

	pub fn clamp_scale(&self, k: f64) -> f64 {
		k.max(self.min_scale).min(self.max_scale)
	}
}

/// Force simulation settings, mirrored onto `force_graph::SimulationParameters`.
#[derive(Clone, Debug, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct LayoutConfig {
	pub force_charge: f32,
	pub force_spring: f32,
	pub force_max: f32,
	pub node_speed: f32,
	pub damping_factor: f32,
	pub node_mass: f32,
	/// Radius of the circle nodes are seeded on before the simulation runs.
	pub seed_radius: f64,
	pub ticks: usize,
	pub tick_dt: f32,
}

impl Default for LayoutConfig {
	fn default() -> Self {
		Self {
			force_charge: 150.0,
			force_spring: 0.05,
			force_max: 100.0,
			node_speed: 3000.0,
			damping_factor: 0.9,
			node_mass: 10.0,
			seed_radius: 100.0,
			ticks: 300,
			tick_dt: 0.016,
		}
	}
}

impl LayoutConfig {
	pub fn simulation_parameters(&self) -> force_graph::SimulationParameters {
		force_graph::SimulationParameters {
			force_charge: self.force_charge,
			force_spring: self.force_spring,
			force_max: self.force_max,
			node_speed: self.node_speed,
			damping_factor: self.damping_factor,
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn overrides_keep_unlisted_defaults() {
		let config = ViewConfig::from_json(r#"{"captionLimit": 12, "layout": {"ticks": 5}}"#)
			.expect("valid config");
		assert_eq!(config.caption_limit, 12);
		assert_eq!(config.layout.ticks, 5);
		assert_eq!(config.layout.node_mass, 10.0);
		assert_eq!(config.palette.len(), DEFAULT_PALETTE.len());
	}

	#[test]
	fn scale_is_clamped_to_extent() {
		let config = ViewConfig::default();
		assert_eq!(config.clamp_scale(100.0), 8.0);
		assert_eq!(config.clamp_scale(0.01), 0.2);
		assert_eq!(config.clamp_scale(1.5), 1.5);
	}

	#[test]
	fn inverted_scale_extent_is_rejected() {
		let err = ViewConfig::from_json(r#"{"minScale": 4, "maxScale": 2}"#).unwrap_err();
		assert!(matches!(err, PayloadError::Setting { field: "minScale", .. }));
		let err = ViewConfig::from_json(r#"{"wheelZoomIn": 0}"#).unwrap_err();
		assert!(matches!(err, PayloadError::Setting { field: "wheelZoomIn", .. }));
	}

	#[test]
	fn clamping_never_panics_on_a_hand_built_extent() {
		let config = ViewConfig {
			min_scale: 4.0,
			max_scale: 2.0,
			..ViewConfig::default()
		};
		assert_eq!(config.clamp_scale(3.0), 2.0);
		let config = ViewConfig {
			min_scale: f64::NAN,
			..ViewConfig::default()
		};
		assert_eq!(config.clamp_scale(100.0), 8.0);
	}
}
