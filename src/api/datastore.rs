//! Admin snapshot of the whole store.

use axum::extract::State;

use super::{error, success, ApiResult};
use crate::models::{Datastore, RevisionInfo};
use crate::AppState;

/// GET /api/admin/datastore - Every collection, normalised, at one revision.
pub async fn get_datastore(State(state): State<AppState>) -> ApiResult<Datastore> {
    match state.repo.get_datastore().await {
        Ok(snapshot) => {
            let revision_id = snapshot.revision_id;
            tracing::debug!(
                products = snapshot.products.len(),
                kits = snapshot.kits.len(),
                quotes = snapshot.quotes.len(),
                messages = snapshot.messages.len(),
                "datastore snapshot"
            );
            success(snapshot, revision_id)
        }
        Err(e) => error(e, 0),
    }
}

/// GET /api/admin/datastore/revision - Cheap change polling for the console.
pub async fn get_revision(State(state): State<AppState>) -> ApiResult<RevisionInfo> {
    match state.repo.get_revision_info().await {
        Ok(info) => {
            let revision_id = info.revision_id;
            success(info, revision_id)
        }
        Err(e) => error(e, 0),
    }
}
