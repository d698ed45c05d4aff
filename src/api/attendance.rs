use actix_web::{HttpResponse, Responder, web};
use chrono::{Local, NaiveDateTime};
use serde::Deserialize;
use utoipa::ToSchema;

use crate::engine::processor::{ProcessOutcome, ToilService};

#[derive(Deserialize, ToSchema)]
pub struct CheckInRequest {
    #[schema(example = 1000)]
    pub employee_id: u64,
    /// Timestamp of the check-in; defaults to the server's current time.
    #[schema(example = "2026-03-02T09:00:00", format = "date-time", value_type = Option<String>)]
    pub at: Option<NaiveDateTime>,
}

#[derive(Deserialize, ToSchema)]
pub struct CheckOutRequest {
    #[schema(example = 1000)]
    pub employee_id: u64,
    /// Timestamp of the check-out; defaults to the server's current time.
    #[schema(example = "2026-03-02T17:30:00", format = "date-time", value_type = Option<String>)]
    pub at: Option<NaiveDateTime>,
}

/// Check-in endpoint
#[utoipa::path(
    post,
    path = "/api/v1/attendance/check-in",
    request_body = CheckInRequest,
    responses(
        (status = 200, description = "Checked in successfully", body = Object, example = json!({
            "message": "Checked in successfully",
            "interval_id": 1
        })),
        (status = 400, description = "Already checked in today", body = Object, example = json!({
            "message": "already checked in today"
        })),
        (status = 500, description = "Internal server error")
    ),
    tag = "Attendance"
)]
pub async fn check_in(
    svc: web::Data<ToilService>,
    body: web::Json<CheckInRequest>,
) -> actix_web::Result<impl Responder> {
    let at = body.at.unwrap_or_else(|| Local::now().naive_local());
    let interval = svc.check_in(body.employee_id, at)?;

    Ok(HttpResponse::Ok().json(serde_json::json!({
        "message": "Checked in successfully",
        "interval_id": interval.id
    })))
}

/// Check-out endpoint. Finalizing the interval runs the TOIL pipeline, so
/// the response reports whether the shift earned credit.
#[utoipa::path(
    put,
    path = "/api/v1/attendance/check-out",
    request_body = CheckOutRequest,
    responses(
        (status = 200, description = "Checked out successfully", body = Object, example = json!({
            "message": "Checked out successfully",
            "toil": { "credited": true, "hours_earned": 1.5, "reason": "overtime" }
        })),
        (status = 400, description = "No active check-in found for today", body = Object, example = json!({
            "message": "no active check-in found for today"
        })),
        (status = 500, description = "Internal server error")
    ),
    tag = "Attendance"
)]
pub async fn check_out(
    svc: web::Data<ToilService>,
    body: web::Json<CheckOutRequest>,
) -> actix_web::Result<impl Responder> {
    let at = body.at.unwrap_or_else(|| Local::now().naive_local());
    let (_, outcome) = svc.check_out(body.employee_id, at)?;

    let toil = match outcome {
        ProcessOutcome::Credited {
            entry_id,
            hours_earned,
            reason,
        } => serde_json::json!({
            "credited": true,
            "entry_id": entry_id,
            "hours_earned": hours_earned,
            "reason": reason.to_string()
        }),
        ProcessOutcome::NotEligible => serde_json::json!({ "credited": false }),
        ProcessOutcome::AlreadyProcessed { entry_id } => serde_json::json!({
            "credited": false,
            "entry_id": entry_id
        }),
    };

    Ok(HttpResponse::Ok().json(serde_json::json!({
        "message": "Checked out successfully",
        "toil": toil
    })))
}
