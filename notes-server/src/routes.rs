//! HTTP routes
//!
//! Write routes validate the body against the collection schema before the
//! store is touched. List routes turn the recognized query parameters that
//! are present into an equality filter. A repeated parameter keeps its last
//! value.

use axum::{
    extract::{
        rejection::{JsonRejection, QueryRejection},
        Query, State,
    },
    routing::get,
    Json, Router,
};
use notes_core::schema::{self, CollectionSchema};
use notes_core::Filter;
use serde::Serialize;
use serde_json::{Map, Value};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::info;

use crate::diagnostics::{self, DiagnosticsReport};
use crate::error::{ApiError, Result};
use crate::store::DocumentStore;

/// Application state shared by all handlers
#[derive(Clone, Debug)]
pub struct AppState {
    pub store: DocumentStore,
}

impl AppState {
    pub fn new(store: DocumentStore) -> Self {
        AppState { store }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Language {
    pub code: &'static str,
    pub name: &'static str,
}

pub const SUPPORTED_LANGUAGES: [Language; 4] = [
    Language { code: "en", name: "English" },
    Language { code: "de", name: "Deutsch" },
    Language { code: "es", name: "Español" },
    Language { code: "fr", name: "Français" },
];

#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub message: &'static str,
}

#[derive(Debug, Serialize)]
pub struct LanguagesResponse {
    pub languages: &'static [Language],
}

#[derive(Debug, Serialize)]
pub struct CreatedResponse {
    pub id: String,
}

#[derive(Debug, Serialize)]
pub struct ItemsResponse {
    pub items: Vec<Map<String, Value>>,
}

/// Raw query pairs in request order
type QueryPairs = Vec<(String, String)>;

#[derive(Debug, Default, PartialEq, Eq)]
pub struct ContextQuery {
    pub language: Option<String>,
}

impl ContextQuery {
    fn from_pairs(pairs: &[(String, String)]) -> Self {
        ContextQuery {
            language: last_value(pairs, "language"),
        }
    }
}

#[derive(Debug, Default, PartialEq, Eq)]
pub struct NoteQuery {
    pub context_id: Option<String>,
    pub language: Option<String>,
}

impl NoteQuery {
    fn from_pairs(pairs: &[(String, String)]) -> Self {
        NoteQuery {
            context_id: last_value(pairs, "context_id"),
            language: last_value(pairs, "language"),
        }
    }
}

/// Build the application router
pub fn router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/", get(read_root))
        .route("/api/languages", get(get_languages))
        .route("/api/contexts", get(list_contexts).post(create_context))
        .route("/api/notes", get(list_notes).post(create_note))
        .route("/test", get(test_database))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn read_root() -> Json<MessageResponse> {
    Json(MessageResponse {
        message: "Learning Notes API is running",
    })
}

async fn get_languages() -> Json<LanguagesResponse> {
    Json(LanguagesResponse {
        languages: &SUPPORTED_LANGUAGES,
    })
}

async fn create_context(
    State(state): State<AppState>,
    payload: std::result::Result<Json<Value>, JsonRejection>,
) -> Result<Json<CreatedResponse>> {
    create_in(&state, &schema::context_schema(), payload)
}

async fn list_contexts(
    State(state): State<AppState>,
    pairs: std::result::Result<Query<QueryPairs>, QueryRejection>,
) -> Result<Json<ItemsResponse>> {
    let query = ContextQuery::from_pairs(&query_pairs(pairs)?);
    let mut filter = Filter::new();
    add_condition(&mut filter, "language", query.language);
    list_in(&state, schema::CONTEXT, &filter)
}

async fn create_note(
    State(state): State<AppState>,
    payload: std::result::Result<Json<Value>, JsonRejection>,
) -> Result<Json<CreatedResponse>> {
    create_in(&state, &schema::note_schema(), payload)
}

async fn list_notes(
    State(state): State<AppState>,
    pairs: std::result::Result<Query<QueryPairs>, QueryRejection>,
) -> Result<Json<ItemsResponse>> {
    let query = NoteQuery::from_pairs(&query_pairs(pairs)?);
    let mut filter = Filter::new();
    add_condition(&mut filter, "context_id", query.context_id);
    add_condition(&mut filter, "language", query.language);
    list_in(&state, schema::NOTE, &filter)
}

async fn test_database(State(state): State<AppState>) -> Json<DiagnosticsReport> {
    Json(diagnostics::probe(&state.store, |key| std::env::var(key).ok()))
}

fn create_in(
    state: &AppState,
    schema: &CollectionSchema,
    payload: std::result::Result<Json<Value>, JsonRejection>,
) -> Result<Json<CreatedResponse>> {
    let Json(body) = payload.map_err(|e| ApiError::InvalidJson(e.body_text()))?;
    let record = schema.validate(&body)?;
    let id = state.store.create_document(schema.collection, record)?;
    info!(collection = schema.collection, %id, "created");
    Ok(Json(CreatedResponse { id }))
}

fn list_in(state: &AppState, collection: &str, filter: &Filter) -> Result<Json<ItemsResponse>> {
    let items = state.store.get_documents(collection, filter)?;
    Ok(Json(ItemsResponse { items }))
}

fn query_pairs(pairs: std::result::Result<Query<QueryPairs>, QueryRejection>) -> Result<QueryPairs> {
    let Query(pairs) = pairs.map_err(|e| ApiError::InvalidQuery(e.body_text()))?;
    Ok(pairs)
}

fn last_value(pairs: &[(String, String)], key: &str) -> Option<String> {
    pairs
        .iter()
        .rev()
        .find(|(k, _)| k == key)
        .map(|(_, v)| v.clone())
}

/// Absent and empty parameters do not filter
fn add_condition(filter: &mut Filter, field: &str, value: Option<String>) {
    if let Some(value) = value.filter(|v| !v.is_empty()) {
        filter.insert(field, value);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_add_condition_skips_absent_and_empty() {
        let mut filter = Filter::new();
        add_condition(&mut filter, "language", None);
        add_condition(&mut filter, "context_id", Some(String::new()));
        assert!(filter.is_empty());

        add_condition(&mut filter, "language", Some("de".to_string()));
        assert_eq!(filter.len(), 1);
        assert_eq!(filter.get("language"), Some(&Value::from("de")));
    }

    #[test]
    fn test_repeated_parameter_keeps_last_value() {
        let pairs = vec![
            ("language".to_string(), "de".to_string()),
            ("context_id".to_string(), "c1".to_string()),
            ("language".to_string(), "en".to_string()),
        ];
        assert_eq!(
            NoteQuery::from_pairs(&pairs),
            NoteQuery {
                context_id: Some("c1".to_string()),
                language: Some("en".to_string()),
            }
        );
        assert_eq!(ContextQuery::from_pairs(&[]), ContextQuery::default());
    }

    #[test]
    fn test_language_table_order() {
        let codes: Vec<_> = SUPPORTED_LANGUAGES.iter().map(|l| l.code).collect();
        assert_eq!(codes, vec!["en", "de", "es", "fr"]);
    }
}
