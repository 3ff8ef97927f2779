use leptos::prelude::*;
use log::warn;

use crate::components::graph_view::GraphVisualization;
use crate::components::graph_view::types::GraphPayload;

const SAMPLE_STYLE: &str = "red/darkred:Person(name), green:Book(title)";

const SAMPLE_GRAPH: &str = r#"{
	"nodes": [
		{"id": 1, "labels": ["Person"], "name": "Ada Lovelace", "born": 1815},
		{"id": 2, "labels": ["Person"], "name": "Charles Babbage", "born": 1791},
		{"id": 3, "labels": ["Book"], "title": "Sketch of the Analytical Engine Invented by Charles Babbage"},
		{"id": 4, "labels": ["Machine"], "model": "Analytical Engine", "year": 1837},
		{"id": 5, "labels": ["Machine"], "model": "Difference Engine", "year": 1822},
		{"id": 6, "labels": ["Place"], "city": "London"}
	],
	"links": [
		{"id": 10, "start": 1, "end": 3, "type": "WROTE"},
		{"id": 11, "start": 3, "end": 4, "type": "DESCRIBES"},
		{"id": 12, "start": 2, "end": 4, "type": "DESIGNED"},
		{"id": 13, "start": 2, "end": 5, "type": "DESIGNED"},
		{"id": 14, "start": 1, "end": 2, "type": "CORRESPONDED_WITH", "letters": 100},
		{"id": 15, "start": 1, "end": 6, "type": "LIVED_IN"},
		{"id": 16, "start": 2, "end": 6, "type": "LIVED_IN"}
	]
}"#;

fn sample_data() -> GraphPayload {
	GraphPayload::from_json(SAMPLE_GRAPH).unwrap_or_else(|err| {
		warn!("sample graph did not parse: {err}");
		GraphPayload::default()
	})
}

/// Default Home Page
#[component]
pub fn Home() -> impl IntoView {
	let graph_data = Signal::derive(sample_data);
	let expanded = RwSignal::new(false);

	view! {
		<ErrorBoundary fallback=|errors| {
			view! {
				<h1>"Uh oh! Something went wrong!"</h1>

				<p>"Errors: "</p>
				<ul>
					{move || {
						errors
							.get()
							.into_iter()
							.map(|(_, e)| view! { <li>{e.to_string()}</li> })
							.collect_view()
					}}
				</ul>
			}
		}>

			<div class="gist">
				<h1>"Analytical Engine"</h1>
				<p class="subtitle">"Hold Shift or Alt to zoom and pan the graph."</p>
				<button on:click=move |_| expanded.update(|e| *e = !*e)>
					{move || if expanded.get() { "Contract" } else { "Expand" }}
				</button>
				<div style=move || {
					format!("height: {}px; border: 1px solid #D4D6D7;", if expanded.get() { 720 } else { 420 })
				}>
					<GraphVisualization
						id="gist-graph"
						data=graph_data
						style_config=SAMPLE_STYLE
						expanded=expanded
					/>
				</div>
			</div>
		</ErrorBoundary>
	}
}
