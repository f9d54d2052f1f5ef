use crate::{
    models::{
        DebugLog, PaymentErrorBody, PaymentRecord, PaymentRecorded, PaymentRequest, PaymentStatus,
    },
    routes::AppState,
};
use axum::{
    body::Bytes,
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use chrono::Utc;
use serde::Deserialize;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentQuery {
    pub user_fid: Option<String>,
}

fn failure(status: StatusCode, body: PaymentErrorBody) -> Response {
    (status, Json(body)).into_response()
}

/// GET /api/prompts/:id/payments?userFid=
pub async fn payment_status(
    State(state): State<AppState>,
    Path(prompt_id): Path<String>,
    Query(query): Query<PaymentQuery>,
) -> Response {
    let Some(user_fid) = query.user_fid.filter(|fid| !fid.trim().is_empty()) else {
        tracing::warn!("[Payment API] Missing userFid in GET request");
        return failure(
            StatusCode::BAD_REQUEST,
            PaymentErrorBody {
                error: "User FID required".to_string(),
                stack: None,
                input: None,
                debug_log: DebugLog {
                    error: Some("Missing userFid parameter".to_string()),
                    prompt_id: Some(prompt_id),
                    ..DebugLog::now()
                },
            },
        );
    };
    let user_fid = user_fid.trim().to_string();

    tracing::debug!("[Payment API] Checking payment status: prompt={} fid={}", prompt_id, user_fid);

    let lookup = futures::future::try_join(
        state.ledger.has_paid(&prompt_id, &user_fid),
        state.ledger.total_paid(&prompt_id),
    )
    .await;

    match lookup {
        Ok((has_paid, total_paid)) => {
            tracing::info!(
                "[Payment API] Payment status for prompt {} fid {}: paid={} total={}",
                prompt_id,
                user_fid,
                has_paid,
                total_paid
            );

            Json(PaymentStatus {
                has_paid,
                total_paid,
                debug_log: DebugLog {
                    user_fid: Some(user_fid),
                    prompt_id: Some(prompt_id),
                    has_paid: Some(has_paid),
                    total_paid: Some(total_paid),
                    ..DebugLog::now()
                },
            })
            .into_response()
        }
        Err(e) => {
            tracing::error!("[Payment API] Error checking payment status: {:?}", e);
            failure(
                StatusCode::INTERNAL_SERVER_ERROR,
                PaymentErrorBody {
                    error: "Failed to check payment status".to_string(),
                    stack: None,
                    input: None,
                    debug_log: DebugLog {
                        error: Some(e.to_string()),
                        user_fid: Some(user_fid),
                        prompt_id: Some(prompt_id),
                        ..DebugLog::now()
                    },
                },
            )
        }
    }
}

/// POST /api/prompts/:id/payments
pub async fn record_payment(
    State(state): State<AppState>,
    Path(prompt_id): Path<String>,
    body: Bytes,
) -> Response {
    // Unparseable bodies are reported as missing fields.
    let request = PaymentRequest::from_body(&body);

    let Some(payment) = request.validate() else {
        tracing::warn!(
            "[Payment API] Missing required fields: wallet={} fid={} tx={}",
            request.wallet_address.is_some(),
            request.user_fid.is_some(),
            request.tx_hash.is_some()
        );
        return failure(
            StatusCode::BAD_REQUEST,
            PaymentErrorBody {
                error: "Missing required fields".to_string(),
                stack: None,
                input: None,
                debug_log: DebugLog {
                    error: Some("Missing required fields".to_string()),
                    received: Some(request.echo()),
                    ..DebugLog::now()
                },
            },
        );
    };

    tracing::info!(
        "[Payment API] Recording payment: prompt={} fid={} wallet={} tx={}",
        prompt_id,
        payment.user_fid,
        payment.wallet_address,
        payment.tx_hash
    );

    let record = PaymentRecord {
        user_address: payment.wallet_address.clone(),
        tx_hash: payment.tx_hash.clone(),
        timestamp: Utc::now().timestamp_millis(),
    };

    let outcome = match state
        .ledger
        .record_payment(&prompt_id, &payment.user_fid, &record)
        .await
    {
        Ok(outcome) => outcome,
        Err(e) => {
            tracing::error!("[Payment API] Error recording payment: {:?}", e);
            let stack = format!("{:?}", e);
            return failure(
                StatusCode::INTERNAL_SERVER_ERROR,
                PaymentErrorBody {
                    error: "Failed to record payment".to_string(),
                    stack: Some(stack.clone()),
                    input: Some(request.echo()),
                    debug_log: DebugLog {
                        error: Some(e.to_string()),
                        stack: Some(stack),
                        prompt_id: Some(prompt_id),
                        ..DebugLog::now()
                    },
                },
            );
        }
    };

    if !outcome.newly_recorded {
        tracing::info!(
            "[Payment API] Payment already recorded: prompt={} fid={}",
            prompt_id,
            payment.user_fid
        );
        return Json(PaymentRecorded {
            message: "Payment already recorded".to_string(),
            has_paid: true,
            total_paid: outcome.total_paid,
            debug_log: DebugLog {
                user_fid: Some(payment.user_fid),
                prompt_id: Some(prompt_id),
                status: Some("already_paid".to_string()),
                total_paid: Some(outcome.total_paid),
                ..DebugLog::now()
            },
        })
        .into_response();
    }

    tracing::info!(
        "[Payment API] Payment recorded: prompt={} fid={} total={}",
        prompt_id,
        payment.user_fid,
        outcome.total_paid
    );

    Json(PaymentRecorded {
        message: "Payment recorded successfully".to_string(),
        has_paid: true,
        total_paid: outcome.total_paid,
        debug_log: DebugLog {
            user_fid: Some(payment.user_fid),
            prompt_id: Some(prompt_id),
            wallet_address: Some(payment.wallet_address),
            tx_hash: Some(payment.tx_hash),
            total_paid: Some(outcome.total_paid),
            ..DebugLog::now()
        },
    })
    .into_response()
}
