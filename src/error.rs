use actix_web::HttpResponse;
use actix_web::http::StatusCode;
use derive_more::Display;

/// Engine-level error taxonomy. Insufficient balance is deliberately NOT an
/// error; it is a reported business outcome (see `engine::consumption`).
#[derive(Debug, Display, Clone, PartialEq)]
pub enum ToilError {
    #[display(fmt = "check-out must be after check-in")]
    InvalidInterval,

    #[display(fmt = "invalid TOIL amount: {:.2} hours", _0)]
    InvalidAmount(f64),

    #[display(
        fmt = "deducting {:.2}h exceeds the {:.2}h remaining on entry {}",
        hours,
        remaining,
        entry_id
    )]
    OverDeduction {
        entry_id: u64,
        hours: f64,
        remaining: f64,
    },

    #[display(fmt = "attendance interval {} already produced a ledger entry", _0)]
    DuplicateSourceInterval(u64),

    #[display(fmt = "unknown ledger entry {}", _0)]
    UnknownEntry(u64),

    #[display(fmt = "unknown attendance interval {}", _0)]
    UnknownInterval(u64),

    #[display(fmt = "attendance interval {} has no check-out yet", _0)]
    IntervalOpen(u64),

    #[display(fmt = "already checked in today")]
    AlreadyCheckedIn,

    #[display(fmt = "no active check-in found for today")]
    NotCheckedIn,
}

impl std::error::Error for ToilError {}

impl actix_web::ResponseError for ToilError {
    fn status_code(&self) -> StatusCode {
        match self {
            ToilError::InvalidInterval
            | ToilError::InvalidAmount(_)
            | ToilError::AlreadyCheckedIn
            | ToilError::NotCheckedIn => StatusCode::BAD_REQUEST,
            ToilError::UnknownEntry(_) | ToilError::UnknownInterval(_) => StatusCode::NOT_FOUND,
            ToilError::DuplicateSourceInterval(_) | ToilError::IntervalOpen(_) => {
                StatusCode::CONFLICT
            }
            // Over-deduction means the consumption arithmetic is broken, not
            // that the caller did anything wrong.
            ToilError::OverDeduction { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        HttpResponse::build(self.status_code()).json(serde_json::json!({
            "message": self.to_string()
        }))
    }
}
