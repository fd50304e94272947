use crate::ipc::error::ok;
use crate::ipc::helpers::{get_amount, get_optional_str, get_required_date, HandlerErr};
use crate::ipc::types::{AppState, Request};
use serde_json::{json, Value};

/// `studentId` targets one record exactly; `name` keeps the first-match rule.
fn handle_payments_update(state: &mut AppState, req: &Request) -> Result<Value, HandlerErr> {
    let amount = get_amount(&req.params, "amount", true)?;
    let due = get_required_date(&req.params, "nextPaymentDue")?;

    let index = if let Some(id) = get_optional_str(&req.params, "studentId") {
        state.roster.update_payment_by_id(&id, amount, due)?
    } else {
        let name = req
            .params
            .get("name")
            .and_then(|v| v.as_str())
            .ok_or_else(|| HandlerErr::bad_params("missing studentId or name"))?;
        state.roster.update_payment(name, amount, due)?
    };

    let student = &state.roster.export()[index];
    log::info!(
        "payment updated for {:?}: {} due {}",
        student.name,
        amount,
        due
    );
    Ok(json!({
        "studentId": student.id,
        "index": index
    }))
}

pub fn try_handle(state: &mut AppState, req: &Request) -> Option<Value> {
    let result = match req.method.as_str() {
        "payments.update" => handle_payments_update(state, req),
        _ => return None,
    };
    Some(match result {
        Ok(v) => ok(&req.id, v),
        Err(e) => e.response(&req.id),
    })
}
