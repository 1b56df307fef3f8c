use axum::{
    extract::{Query, State},
    response::Json,
};
use serde::Deserialize;
use std::sync::Arc;

use crate::form::catalog::LanguageEntry;
use crate::state::AppState;

#[derive(Debug, Default, Deserialize)]
pub struct VoicesQuery {
    /// Only return this language (BCP-47 code)
    pub language: Option<String>,
}

pub type VoicesResponse = Vec<LanguageEntry>;

/// List the voice catalog the form offers.
///
/// `?language=fr-FR` narrows the result to one language; an unknown code gives
/// an empty list.
pub async fn list_voices(
    State(state): State<Arc<AppState>>,
    Query(query): Query<VoicesQuery>,
) -> Json<VoicesResponse> {
    let languages = state.catalog.languages();
    let entries = match query.language.as_deref() {
        Some(code) => languages
            .iter()
            .filter(|language| language.code == code)
            .cloned()
            .collect(),
        None => languages.to_vec(),
    };

    tracing::debug!(languages = entries.len(), "Listing voice catalog");
    Json(entries)
}
