use netmap_core::NetworkGraph;

const TEMPLATE: &str = include_str!("../templates/graph.html");
const PLACEHOLDER: &str = "{{GRAPH_DATA}}";

/// Renders a graph as a self-contained HTML page.
pub(crate) fn html(graph: &NetworkGraph) -> Result<String, serde_json::Error> {
    let json = serde_json::to_string(graph)?;
    Ok(TEMPLATE.replacen(PLACEHOLDER, &escape_script(&json), 1))
}

/// Keeps JSON from closing the `<script>` element that embeds it. `<\/` decodes to `</`.
fn escape_script(json: &str) -> String {
    json.replace("</", "<\\/")
}
