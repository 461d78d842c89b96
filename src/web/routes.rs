//! HTTP routes for the web viewer
//!
//! Provides API endpoints for graph data and the rendered graph pages.

use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{Path, State},
    http::StatusCode,
    response::{Html, IntoResponse, Response},
    routing::get,
};
use serde::Serialize;

use super::server::AppState;
use crate::graph::Projection;
use crate::naming::escape_html;
use crate::writer::render_html;

/// Node and link counts of one projection
#[derive(Serialize)]
struct ProjectionSize {
    nodes: usize,
    links: usize,
}

impl From<&Projection> for ProjectionSize {
    fn from(projection: &Projection) -> Self {
        Self {
            nodes: projection.nodes.len(),
            links: projection.links.len(),
        }
    }
}

/// Entry in the graph listing
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct GraphSummary {
    data_name: String,
    lines_processed: usize,
    failures: usize,
    #[serde(rename = "sourceClass")]
    source_class: ProjectionSize,
    #[serde(rename = "sourceClass-targetClass")]
    source_and_target_class: ProjectionSize,
}

/// Create API routes
pub fn api_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/api/health", get(health_check))
        .route("/api/graphs", get(list_graphs))
        .route("/data/{name}", get(get_data))
}

/// Create HTML page routes
pub fn page_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/", get(index_html))
        .route("/graphs/{name}", get(graph_html))
}

fn not_found(name: &str) -> Response {
    (
        StatusCode::NOT_FOUND,
        Json(serde_json::json!({"error": format!("Graph '{}' not found", name)})),
    )
        .into_response()
}

/// GET /api/health - Health check endpoint
async fn health_check() -> &'static str {
    "ok"
}

/// GET /api/graphs - Lists the available graphs
async fn list_graphs(State(state): State<Arc<AppState>>) -> Json<Vec<GraphSummary>> {
    let summaries = state
        .graphs
        .values()
        .map(|g| GraphSummary {
            data_name: g.data_name.clone(),
            lines_processed: g.lines_processed,
            failures: g.failures.len(),
            source_class: (&g.data.source_class).into(),
            source_and_target_class: (&g.data.source_and_target_class).into(),
        })
        .collect();
    Json(summaries)
}

/// GET /data/{name} - Returns the graph data for one report
async fn get_data(State(state): State<Arc<AppState>>, Path(name): Path<String>) -> Response {
    match state.graphs.get(&name) {
        Some(graph) => Json(graph).into_response(),
        None => not_found(&name),
    }
}

/// GET /graphs/{name} - Renders one graph
async fn graph_html(State(state): State<Arc<AppState>>, Path(name): Path<String>) -> Response {
    let Some(graph) = state.graphs.get(&name) else {
        return not_found(&name);
    };

    match render_html(&state.template, &graph.data) {
        Ok(html) => Html(html).into_response(),
        Err(e) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(serde_json::json!({"error": e.to_string()})),
        )
            .into_response(),
    }
}

/// GET / - Index of all graphs
async fn index_html(State(state): State<Arc<AppState>>) -> Html<String> {
    let items: String = state
        .graphs
        .values()
        .map(|g| {
            let name = escape_html(&g.data_name);
            format!(
                "<li><a href=\"/graphs/{}\">{}</a> ({} rows)</li>",
                name, name, g.lines_processed
            )
        })
        .collect();

    Html(format!(
        "<!DOCTYPE html><html><head><meta charset=\"utf-8\"><title>Jarviz Graphs</title></head>\
         <body><h1>Jarviz Graphs</h1><ul>{}</ul></body></html>",
        items
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::GraphOptions;
    use crate::processor::process_reader;

    const LINE: &str = r#"{"applicationName":"cart","artifactGroup":"g","artifactId":"a","sourceClass":"S","sourceMethod":"s","targetClass":"x.T","targetMethod":"t"}"#;

    fn state() -> Arc<AppState> {
        let graph = process_reader("shop", LINE.as_bytes(), GraphOptions::default()).unwrap();
        Arc::new(AppState::new(
            vec![graph],
            "<script>window.data = {{{JARVIZ_DATA}}};</script>".to_string(),
        ))
    }

    async fn body_string(response: Response) -> String {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        String::from_utf8(bytes.to_vec()).unwrap()
    }

    #[tokio::test]
    async fn test_health() {
        assert_eq!(health_check().await, "ok");
    }

    #[tokio::test]
    async fn test_list_graphs() {
        let Json(list) = list_graphs(State(state())).await;
        assert_eq!(list.len(), 1);
        assert_eq!(list[0].data_name, "shop");
        assert_eq!(list[0].lines_processed, 1);
        assert_eq!(list[0].source_class.nodes, 2);
        assert_eq!(list[0].source_and_target_class.nodes, 2);
        assert_eq!(list[0].source_and_target_class.links, 1);

        let json = serde_json::to_value(&list[0]).unwrap();
        assert_eq!(json["sourceClass"]["links"], 1);
        assert_eq!(json["sourceClass-targetClass"]["nodes"], 2);
    }

    #[tokio::test]
    async fn test_get_data() {
        let response = get_data(State(state()), Path("shop".to_string())).await;
        assert_eq!(response.status(), StatusCode::OK);
        let json: serde_json::Value = serde_json::from_str(&body_string(response).await).unwrap();
        assert_eq!(json["dataName"], "shop");
        assert_eq!(json["data"]["sourceClass"]["links"][0]["source"], "g_a");
    }

    #[tokio::test]
    async fn test_unknown_graph() {
        let response = get_data(State(state()), Path("missing".to_string())).await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        let response = graph_html(State(state()), Path("missing".to_string())).await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_graph_page_embeds_data() {
        let response = graph_html(State(state()), Path("shop".to_string())).await;
        assert_eq!(response.status(), StatusCode::OK);
        let html = body_string(response).await;
        assert!(html.starts_with("<script>window.data = {\"sourceClass\""));
    }

    #[tokio::test]
    async fn test_index_links_graphs() {
        let Html(html) = index_html(State(state())).await;
        assert!(html.contains("<a href=\"/graphs/shop\">shop</a>"));
    }
}
