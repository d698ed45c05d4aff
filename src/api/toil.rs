use actix_web::{HttpResponse, Responder, web};
use chrono::{Local, NaiveDate};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

use crate::engine::processor::ToilService;
use crate::model::toil_entry::ToilEntry;

#[derive(Deserialize, IntoParams)]
pub struct BalanceQuery {
    /// Warning horizon in days; defaults to the configured policy value.
    pub horizon_days: Option<i64>,
    /// Evaluation date; defaults to today.
    pub as_of: Option<NaiveDate>,
}

#[derive(Serialize, ToSchema)]
pub struct BalanceResponse {
    #[schema(example = 1000)]
    pub employee_id: u64,
    #[schema(example = "2026-03-02", format = "date", value_type = String)]
    pub as_of: NaiveDate,
    #[schema(example = 6.5)]
    pub total_hours: f64,
    #[schema(example = 2.0)]
    pub expiring_hours: f64,
    #[schema(example = "2026-03-22", format = "date", value_type = Option<String>)]
    pub expiring_on: Option<NaiveDate>,
}

#[derive(Deserialize, ToSchema)]
pub struct UseToilRequest {
    #[schema(example = 1000)]
    pub employee_id: u64,
    #[schema(example = 4.0)]
    pub hours: f64,
}

#[derive(Deserialize, ToSchema)]
pub struct ExpireRequest {
    /// Sweep cutoff date; defaults to today.
    #[schema(example = "2026-03-22", format = "date", value_type = Option<String>)]
    pub as_of: Option<NaiveDate>,
}

#[derive(Deserialize, ToSchema)]
pub struct AddHolidayRequest {
    #[schema(example = "2026-12-25", format = "date", value_type = String)]
    pub date: NaiveDate,
}

#[derive(Serialize, ToSchema)]
pub struct EntryResponse {
    #[schema(example = 1)]
    pub id: u64,
    #[schema(example = 1000)]
    pub employee_id: u64,
    #[schema(example = 6.0)]
    pub hours_earned: f64,
    #[schema(example = 2.0)]
    pub hours_used: f64,
    #[schema(example = 4.0)]
    pub hours_remaining: f64,
    #[schema(example = "2026-03-07", format = "date", value_type = String)]
    pub earned_on: NaiveDate,
    #[schema(example = "2026-03-28", format = "date", value_type = String)]
    pub expires_on: NaiveDate,
    pub expired: bool,
    #[schema(example = 12)]
    pub source_interval_id: u64,
    #[schema(example = "weekend on 2026-03-07 (6.00h of 6.00h worked)")]
    pub note: String,
}

impl From<ToilEntry> for EntryResponse {
    fn from(entry: ToilEntry) -> Self {
        Self {
            hours_remaining: entry.hours_remaining(),
            id: entry.id,
            employee_id: entry.employee_id,
            hours_earned: entry.hours_earned,
            hours_used: entry.hours_used,
            earned_on: entry.earned_on,
            expires_on: entry.expires_on,
            expired: entry.expired,
            source_interval_id: entry.source_interval_id,
            note: entry.note,
        }
    }
}

/// TOIL balance for one employee
#[utoipa::path(
    get,
    path = "/api/v1/toil/balance/{employee_id}",
    params(
        ("employee_id" = u64, Path, description = "Employee ID"),
        BalanceQuery
    ),
    responses(
        (status = 200, description = "Balance summary", body = BalanceResponse),
        (status = 500, description = "Internal server error")
    ),
    tag = "TOIL"
)]
pub async fn get_balance(
    svc: web::Data<ToilService>,
    path: web::Path<u64>,
    query: web::Query<BalanceQuery>,
) -> actix_web::Result<impl Responder> {
    let employee_id = path.into_inner();
    let as_of = query.as_of.unwrap_or_else(|| Local::now().date_naive());
    let summary = svc.get_user_toil_balance(employee_id, as_of, query.horizon_days);

    Ok(HttpResponse::Ok().json(BalanceResponse {
        employee_id,
        as_of,
        total_hours: summary.total_hours,
        expiring_hours: summary.expiring_hours,
        expiring_on: summary.expiring_on,
    }))
}

/// Spend TOIL hours
#[utoipa::path(
    post,
    path = "/api/v1/toil/use",
    request_body = UseToilRequest,
    responses(
        (status = 200, description = "Hours deducted", body = Object, example = json!({
            "message": "TOIL hours deducted",
            "hours_deducted": 4.0,
            "available_hours": 1.0
        })),
        (status = 400, description = "Invalid amount or insufficient balance", body = Object, example = json!({
            "message": "insufficient TOIL balance",
            "available_hours": 3.0
        })),
        (status = 500, description = "Internal server error")
    ),
    tag = "TOIL"
)]
pub async fn use_hours(
    svc: web::Data<ToilService>,
    body: web::Json<UseToilRequest>,
) -> actix_web::Result<impl Responder> {
    let outcome = svc.use_toil_hours(body.employee_id, body.hours)?;

    if !outcome.success {
        // Expected business outcome, distinguishable from an invalid amount
        // by message and payload.
        return Ok(HttpResponse::BadRequest().json(serde_json::json!({
            "message": "insufficient TOIL balance",
            "available_hours": outcome.available_hours
        })));
    }

    Ok(HttpResponse::Ok().json(serde_json::json!({
        "message": "TOIL hours deducted",
        "hours_deducted": outcome.hours_deducted,
        "available_hours": outcome.available_hours
    })))
}

/// Expire lapsed TOIL credit (scheduler hook)
#[utoipa::path(
    post,
    path = "/api/v1/toil/expire",
    request_body = ExpireRequest,
    responses(
        (status = 200, description = "Sweep finished", body = Object, example = json!({
            "message": "Expiry sweep finished",
            "expired_count": 2
        })),
        (status = 500, description = "Internal server error")
    ),
    tag = "TOIL"
)]
pub async fn expire(
    svc: web::Data<ToilService>,
    body: web::Json<ExpireRequest>,
) -> actix_web::Result<impl Responder> {
    let as_of = body.as_of.unwrap_or_else(|| Local::now().date_naive());
    let expired_count = svc.expire_old_toil(as_of);

    Ok(HttpResponse::Ok().json(serde_json::json!({
        "message": "Expiry sweep finished",
        "expired_count": expired_count
    })))
}

/// Ledger entries for one employee
#[utoipa::path(
    get,
    path = "/api/v1/toil/entries/{employee_id}",
    params(("employee_id" = u64, Path, description = "Employee ID")),
    responses(
        (status = 200, description = "All ledger entries, earned-date order", body = [EntryResponse]),
        (status = 500, description = "Internal server error")
    ),
    tag = "TOIL"
)]
pub async fn list_entries(
    svc: web::Data<ToilService>,
    path: web::Path<u64>,
) -> actix_web::Result<impl Responder> {
    let entries: Vec<EntryResponse> = svc
        .list_entries(path.into_inner())
        .into_iter()
        .map(EntryResponse::from)
        .collect();
    Ok(HttpResponse::Ok().json(entries))
}

/// List holiday calendar dates
#[utoipa::path(
    get,
    path = "/api/v1/holiday",
    responses(
        (status = 200, description = "Known holiday dates", body = [String])
    ),
    tag = "Holiday"
)]
pub async fn list_holidays(svc: web::Data<ToilService>) -> actix_web::Result<impl Responder> {
    Ok(HttpResponse::Ok().json(svc.calendar().days()))
}

/// Add a holiday date
#[utoipa::path(
    post,
    path = "/api/v1/holiday",
    request_body = AddHolidayRequest,
    responses(
        (status = 200, description = "Holiday added", body = Object, example = json!({
            "message": "Holiday added"
        })),
        (status = 400, description = "Date is already a holiday", body = Object, example = json!({
            "message": "Date is already a holiday"
        }))
    ),
    tag = "Holiday"
)]
pub async fn add_holiday(
    svc: web::Data<ToilService>,
    body: web::Json<AddHolidayRequest>,
) -> actix_web::Result<impl Responder> {
    if !svc.calendar().add(body.date) {
        return Ok(HttpResponse::BadRequest().json(serde_json::json!({
            "message": "Date is already a holiday"
        })));
    }
    tracing::info!(date = %body.date, "holiday added to calendar");
    Ok(HttpResponse::Ok().json(serde_json::json!({
        "message": "Holiday added"
    })))
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use actix_web::{App, test, web::Data};

    use super::*;
    use crate::config::ToilPolicy;
    use crate::model::holiday::FixedHolidayCalendar;
    use crate::store::MemoryStore;

    fn service_data() -> Data<ToilService> {
        Data::new(ToilService::new(
            Arc::new(MemoryStore::new()),
            Arc::new(FixedHolidayCalendar::default()),
            ToilPolicy::default(),
        ))
    }

    #[actix_web::test]
    async fn saturday_shift_shows_up_in_balance() {
        let svc = service_data();
        let app = test::init_service(
            App::new()
                .app_data(svc.clone())
                .route(
                    "/attendance/check-in",
                    actix_web::web::post().to(crate::api::attendance::check_in),
                )
                .route(
                    "/attendance/check-out",
                    actix_web::web::put().to(crate::api::attendance::check_out),
                )
                .route(
                    "/toil/balance/{employee_id}",
                    actix_web::web::get().to(get_balance),
                ),
        )
        .await;

        let req = test::TestRequest::post()
            .uri("/attendance/check-in")
            .set_json(serde_json::json!({
                "employee_id": 7,
                "at": "2026-03-07T09:00:00"
            }))
            .to_request();
        assert!(test::call_service(&app, req).await.status().is_success());

        let req = test::TestRequest::put()
            .uri("/attendance/check-out")
            .set_json(serde_json::json!({
                "employee_id": 7,
                "at": "2026-03-07T15:00:00"
            }))
            .to_request();
        let body: serde_json::Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body["toil"]["credited"], true);
        assert_eq!(body["toil"]["hours_earned"], 6.0);

        let req = test::TestRequest::get()
            .uri("/toil/balance/7?as_of=2026-03-07")
            .to_request();
        let body: serde_json::Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body["total_hours"], 6.0);
        assert_eq!(body["employee_id"], 7);
    }

    #[actix_web::test]
    async fn insufficient_balance_is_a_bad_request_with_details() {
        let svc = service_data();
        let app = test::init_service(
            App::new()
                .app_data(svc.clone())
                .route("/toil/use", actix_web::web::post().to(use_hours)),
        )
        .await;

        let req = test::TestRequest::post()
            .uri("/toil/use")
            .set_json(serde_json::json!({ "employee_id": 7, "hours": 2.0 }))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), 400);
        let body: serde_json::Value = test::read_body_json(resp).await;
        assert_eq!(body["message"], "insufficient TOIL balance");
        assert_eq!(body["available_hours"], 0.0);
    }
}
