use std::{fmt, sync::Arc};

use rama::{
    Service,
    error::OpaqueError,
    http::{Request, Response, body::util::BodyExt as _},
    telemetry::tracing,
};

use crate::config::RequestSpec;

use super::{CancelSignal, Tally, WorkerId};

/// Replay `request` using `client` until `cancel` fires.
///
/// Every failure is counted, never returned. Cancellation is only observed
/// in between attempts, an in-flight attempt is always completed
/// (bounded by the timeout of the client).
pub async fn run_worker<S>(
    id: WorkerId,
    client: S,
    request: Arc<RequestSpec>,
    cancel: CancelSignal,
    fire_and_forget: bool,
) -> Tally
where
    S: Service<Request, Output = Response, Error: fmt::Display + Send>,
{
    tracing::debug!(worker = %id, "worker started");

    let mut tally = Tally::default();

    while !cancel.is_fired() {
        match attempt(&client, &request, fire_and_forget).await {
            Ok(body_size) => tally.record_success(body_size),
            Err(err) => {
                tracing::trace!(worker = %id, "request attempt failed: {err}");
                tally.record_failure();
            }
        }

        // no backoff, but do not starve the deadline timer
        // when the target fails without ever awaiting i/o
        tokio::task::consume_budget().await;
    }

    let tally = tally.finalize();
    tracing::debug!(
        worker = %id,
        succeeded = tally.succeeded,
        failed = tally.failed,
        bytes_read = tally.bytes_read,
        "worker finished",
    );
    tally
}

/// A single request attempt, returning the amount of body bytes read.
async fn attempt<S>(
    client: &S,
    request: &RequestSpec,
    fire_and_forget: bool,
) -> Result<u64, OpaqueError>
where
    S: Service<Request, Output = Response, Error: fmt::Display + Send>,
{
    let resp = client
        .serve(request.to_request())
        .await
        .map_err(|err| OpaqueError::from_display(format!("send request: {err}")))?;

    if fire_and_forget {
        return Ok(0);
    }

    let body = resp
        .into_body()
        .collect()
        .await
        .map_err(|err| OpaqueError::from_display(format!("read response body: {err}")))?;

    Ok(body.to_bytes().len() as u64)
}
