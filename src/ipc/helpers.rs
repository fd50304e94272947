use crate::exchange::parse_date;
use crate::ipc::error::err;
use crate::roster::RosterError;
use chrono::{Local, NaiveDate};
use serde_json::{json, Value};

pub struct HandlerErr {
    pub code: &'static str,
    pub message: String,
    pub details: Option<Value>,
}

impl HandlerErr {
    pub fn bad_params(message: impl Into<String>) -> Self {
        HandlerErr {
            code: "bad_params",
            message: message.into(),
            details: None,
        }
    }

    pub fn io(e: anyhow::Error) -> Self {
        HandlerErr {
            code: "io_failed",
            message: format!("{:#}", e),
            details: None,
        }
    }

    pub fn internal(e: impl std::fmt::Display) -> Self {
        HandlerErr {
            code: "internal",
            message: e.to_string(),
            details: None,
        }
    }

    pub fn response(self, id: &str) -> Value {
        err(id, self.code, self.message, self.details)
    }
}

impl From<RosterError> for HandlerErr {
    fn from(e: RosterError) -> Self {
        let details = match &e {
            RosterError::Validation { field } => Some(json!({ "field": field })),
            RosterError::IndexOutOfRange { index, len } => {
                Some(json!({ "index": index, "len": len }))
            }
            RosterError::Parse { line, .. } => Some(json!({ "line": line })),
            RosterError::NotFound { .. } => None,
        };
        HandlerErr {
            code: e.code(),
            message: e.to_string(),
            details,
        }
    }
}

pub fn get_required_str(params: &Value, key: &str) -> Result<String, HandlerErr> {
    params
        .get(key)
        .and_then(|v| v.as_str())
        .map(|s| s.to_string())
        .ok_or_else(|| HandlerErr::bad_params(format!("missing {}", key)))
}

pub fn get_optional_str(params: &Value, key: &str) -> Option<String> {
    params
        .get(key)
        .and_then(|v| v.as_str())
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
}

pub fn get_required_bool(params: &Value, key: &str) -> Result<bool, HandlerErr> {
    params
        .get(key)
        .and_then(|v| v.as_bool())
        .ok_or_else(|| HandlerErr::bad_params(format!("{} must be boolean", key)))
}

pub fn get_required_date(params: &Value, key: &str) -> Result<NaiveDate, HandlerErr> {
    let raw = get_required_str(params, key)?;
    parse_date(&raw).ok_or_else(|| HandlerErr::bad_params(format!("{} must be YYYY-MM-DD", key)))
}

/// Amounts are finite and non-negative. A missing optional amount is zero.
pub fn get_amount(params: &Value, key: &str, required: bool) -> Result<f64, HandlerErr> {
    let Some(v) = params.get(key).filter(|v| !v.is_null()) else {
        if required {
            return Err(HandlerErr::bad_params(format!("missing {}", key)));
        }
        return Ok(0.0);
    };
    let n = v
        .as_f64()
        .ok_or_else(|| HandlerErr::bad_params(format!("{} must be a number", key)))?;
    if !n.is_finite() || n < 0.0 {
        return Err(HandlerErr::bad_params(format!(
            "{} must be a non-negative number",
            key
        )));
    }
    Ok(n)
}

/// `params.today` when given, otherwise the local calendar date.
pub fn get_today(params: &Value) -> Result<NaiveDate, HandlerErr> {
    match get_optional_str(params, "today") {
        Some(raw) => {
            parse_date(&raw).ok_or_else(|| HandlerErr::bad_params("today must be YYYY-MM-DD"))
        }
        None => Ok(Local::now().date_naive()),
    }
}
