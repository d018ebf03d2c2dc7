use std::sync::Arc;

use axum::{extract::State, routing, Json, Router};

use crate::{
    models::{ApiHealth, ApiServiceInfo},
    ApiInfo, HealthFlags,
};

#[derive(Debug)]
struct MetaState {
    info: ApiInfo,
    health: HealthFlags,
}

pub fn router(info: ApiInfo, health: HealthFlags) -> Router<()> {
    Router::new()
        .route("/", routing::get(root))
        .route("/health", routing::get(health_check))
        .with_state(Arc::new(MetaState { info, health }))
}

async fn root(state: State<Arc<MetaState>>) -> Json<ApiServiceInfo> {
    Json(ApiServiceInfo {
        service: state.info.title.clone(),
        version: state.info.version.clone(),
        status: "healthy",
    })
}

async fn health_check(state: State<Arc<MetaState>>) -> Json<ApiHealth<HealthFlags>> {
    Json(ApiHealth {
        status: "healthy",
        flags: state.health,
    })
}
