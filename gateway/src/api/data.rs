use axum::extract::State;
use backends::Snapshot;
use dispatch::ResourceClass;

use crate::auth::Caller;
use crate::envelope::Envelope;
use crate::errors::ApiError;
use crate::state::AppState;

pub async fn load_data(
    State(state): State<AppState>,
    Caller(principal): Caller,
) -> Result<Envelope<Snapshot>, ApiError> {
    let operations = state.operations();
    let dispatched = state
        .run(
            &operations.load_snapshot,
            &principal,
            &ResourceClass::tasks(),
            &(),
        )
        .await?;
    Ok(Envelope::success(dispatched))
}
