//! domset-graph: interactive viewer for dominating-set instances and solutions.
//!
//! Parses PACE graph and solution files, derives which selected node covers
//! which, and draws the instance as a force-directed layout coloured by that
//! coverage. Runs in the browser as a client-side leptos app.

use leptos::prelude::*;
use leptos_meta::*;
use log::{Level, info};

pub mod api;
pub mod cache;
pub mod components;
pub mod config;
pub mod domset;
pub mod pace;
pub mod pages;
pub mod params;
pub mod session;

pub use components::force_graph::{ForceGraphCanvas, ForceLayoutEngine, GraphView};
pub use config::ViewerConfig;
pub use pages::InstancePage;
pub use params::{InputValidationError, PageParams};
pub use session::Session;

/// Initialize logging and panic hooks for the WASM target.
pub fn init_logging() {
	let _ = console_log::init_with_level(Level::Debug);
	console_error_panic_hook::set_once();
	info!("domset-graph: logging initialized");
}

/// Reads configuration and page parameters, then shows the instance page.
///
/// A missing or malformed instance id is reported and sends the user back to `/`.
#[component]
pub fn App() -> impl IntoView {
	provide_meta_context();

	let config = ViewerConfig::load();
	let data_theme = if config.theme == "paper" { "light" } else { "dark" };
	let page = match PageParams::from_location() {
		Ok(page) => {
			page.rejected.iter().for_each(params::report);
			Some(page)
		}
		Err(err) => {
			params::report(&err);
			None
		}
	};

	view! {
		<Html attr:lang="en" attr:dir="ltr" attr:data-theme=data_theme />
		<Title text="Dominating Set Instance" />
		<Meta charset="UTF-8" />
		<Meta name="viewport" content="width=device-width, initial-scale=1.0" />

		{page.map(move |page| view! { <InstancePage params=page config=config /> })}
	}
}
