//! Viewer configuration embedded in the host page.

use log::{info, warn};
use serde::Deserialize;
use wasm_bindgen::JsCast;
use web_sys::{HtmlScriptElement, Window};

use crate::components::force_graph::LayoutParams;
use crate::pace::AUTO_RENDER_THRESHOLD;

/// Id of the optional `<script type="application/json">` element holding overrides.
pub const CONFIG_ELEMENT_ID: &str = "viewer-config";

/// Deployment settings of the viewer. Every field is optional in the JSON.
#[derive(Clone, Debug, Deserialize, PartialEq)]
#[serde(default)]
pub struct ViewerConfig {
	/// Prefix of every API path, with trailing slash.
	pub api_base: String,
	/// Graphs with at least this many nodes wait for confirmation before rendering.
	pub auto_render_threshold: usize,
	/// Upper end of the link strength slider.
	pub strength_slider_max: u32,
	/// Initial slider position.
	pub strength_slider_default: u32,
	/// Name passed to [`Theme::by_name`](crate::components::force_graph::Theme::by_name).
	pub theme: String,
	/// Force parameters of the layout.
	pub layout: LayoutParams,
}

impl Default for ViewerConfig {
	fn default() -> Self {
		Self {
			api_base: "/api/".into(),
			auto_render_threshold: AUTO_RENDER_THRESHOLD,
			strength_slider_max: 100,
			strength_slider_default: 50,
			theme: "default".into(),
			layout: LayoutParams::default(),
		}
	}
}

impl ViewerConfig {
	/// Parses a JSON object; absent fields keep their defaults.
	pub fn from_json(text: &str) -> Result<Self, serde_json::Error> {
		serde_json::from_str(text)
	}

	/// Initial slider position, never beyond the maximum.
	pub fn initial_strength(&self) -> u32 {
		self.strength_slider_default.min(self.strength_slider_max)
	}

	/// Reads overrides from the page, falling back to defaults.
	pub fn load() -> Self {
		let Some(text) = config_text() else {
			return Self::default();
		};
		match Self::from_json(&text) {
			Ok(config) => {
				info!("loaded viewer config, api base {}", config.api_base);
				config
			}
			Err(e) => {
				warn!("ignoring invalid viewer config: {}", e);
				Self::default()
			}
		}
	}
}

fn config_text() -> Option<String> {
	let window: Window = web_sys::window()?;
	let document = window.document()?;
	let element = document.get_element_by_id(CONFIG_ELEMENT_ID)?;
	let script: HtmlScriptElement = element.dyn_into().ok()?;
	script.text().ok()
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn defaults() {
		let config = ViewerConfig::default();
		assert_eq!(config.api_base, "/api/");
		assert_eq!(config.auto_render_threshold, 100);
		assert_eq!(config.initial_strength(), 50);
		assert_eq!(config.layout.collide_radius, 20.0);
		assert_eq!(config.layout.link_distance, 30.0);
	}

	#[test]
	fn partial_overrides_keep_other_defaults() {
		let config = ViewerConfig::from_json(
			r#"{
				"api_base": "https://pace.example/api/",
				"layout": {"charge": 80.0},
				"strength_slider_default": 500
			}"#,
		)
		.unwrap();
		assert_eq!(config.api_base, "https://pace.example/api/");
		assert_eq!(config.layout.charge, 80.0);
		assert_eq!(config.layout.alpha_min, 0.001);
		assert_eq!(config.strength_slider_max, 100);
		assert_eq!(config.initial_strength(), 100);
	}

	#[test]
	fn empty_object_is_default() {
		assert_eq!(ViewerConfig::from_json("{}").unwrap(), ViewerConfig::default());
	}

	#[test]
	fn malformed_json_is_an_error() {
		assert!(ViewerConfig::from_json("{\"api_base\": 3}").is_err());
		assert!(ViewerConfig::from_json("not json").is_err());
	}
}
