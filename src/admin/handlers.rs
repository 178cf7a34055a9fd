use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};

use crate::admin::AdminState;
use crate::registry::RegistryError;

#[derive(Debug, Serialize, Deserialize)]
pub struct SystemStatus {
    pub version: String,
    pub status: String,
    pub aliases: usize,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct AliasStatus {
    pub alias: String,
    pub servlet_name: String,
    pub service_id: i64,
    pub ranking: i32,
    pub context: String,
}

#[derive(Debug, Deserialize)]
pub struct AliasQuery {
    pub alias: String,
}

pub async fn get_status(State(state): State<AdminState>) -> Json<SystemStatus> {
    Json(SystemStatus {
        version: env!("CARGO_PKG_VERSION").to_string(),
        status: "operational".to_string(),
        aliases: state.registry.len(),
    })
}

pub async fn list_aliases(State(state): State<AdminState>) -> Json<Vec<AliasStatus>> {
    let statuses = state
        .registry
        .entries()
        .into_iter()
        .map(|(alias, descriptor)| AliasStatus {
            alias,
            servlet_name: descriptor.info().name.clone(),
            service_id: descriptor.info().service_id,
            ranking: descriptor.ranking(),
            context: descriptor.context().name().to_string(),
        })
        .collect();

    Json(statuses)
}

pub async fn unregister_alias(
    State(state): State<AdminState>,
    Query(query): Query<AliasQuery>,
) -> Response {
    match state.registry.unregister(&query.alias) {
        Ok(_) => {
            tracing::info!(alias = %query.alias, "Alias unregistered via admin API");
            Json(serde_json::json!({ "unregistered": query.alias })).into_response()
        }
        Err(e) => {
            let status = match e {
                RegistryError::AliasNotFound(_) => StatusCode::NOT_FOUND,
                RegistryError::InvalidArgument(_) => StatusCode::BAD_REQUEST,
                RegistryError::DuplicateAlias(_) => StatusCode::CONFLICT,
                RegistryError::Install(_) => StatusCode::INTERNAL_SERVER_ERROR,
            };
            (status, Json(serde_json::json!({ "error": e.to_string() }))).into_response()
        }
    }
}
