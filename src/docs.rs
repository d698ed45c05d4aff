use crate::api::attendance::{CheckInRequest, CheckOutRequest};
use crate::api::toil::{
    AddHolidayRequest, BalanceResponse, EntryResponse, ExpireRequest, UseToilRequest,
};
use utoipa::OpenApi;

#[derive(OpenApi)]
#[openapi(
    info(
        title = "HRM TOIL Engine API",
        version = "1.0.0",
        description = r#"
## TOIL Accrual & Ledger Engine

This API powers the **Time Off In Lieu (TOIL)** subsystem of an HRM system.

### 🔹 Key Features
- **Attendance Intake**
  - Daily check-in and check-out; check-out triggers TOIL classification
- **TOIL Ledger**
  - Dated, expiring credit entries earned from overtime, weekend, and holiday work
- **Balances**
  - Total available hours plus credit expiring within a warning window
- **Consumption**
  - All-or-nothing deduction, draining the soonest-expiring credit first
- **Expiry**
  - Idempotent sweep that retires lapsed credit (scheduler hook)

### 📦 Response Format
- JSON-based RESTful responses

---
Built with **Rust**, **Actix Web**, and **Utoipa**.
"#,
    ),
    paths(
        crate::api::attendance::check_in,
        crate::api::attendance::check_out,

        crate::api::toil::get_balance,
        crate::api::toil::use_hours,
        crate::api::toil::expire,
        crate::api::toil::list_entries,
        crate::api::toil::list_holidays,
        crate::api::toil::add_holiday
    ),
    components(
        schemas(
            CheckInRequest,
            CheckOutRequest,
            BalanceResponse,
            UseToilRequest,
            ExpireRequest,
            EntryResponse,
            AddHolidayRequest
        )
    ),
    tags(
        (name = "Attendance", description = "Attendance intake APIs"),
        (name = "TOIL", description = "TOIL ledger, balance, and consumption APIs"),
        (name = "Holiday", description = "Holiday calendar APIs"),
    )
)]
pub struct ApiDoc;
