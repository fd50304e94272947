use crate::calc::roster_rows;
use crate::ipc::error::ok;
use crate::ipc::helpers::{get_amount, get_optional_str, get_required_date, get_today, HandlerErr};
use crate::ipc::types::{AppState, Request};
use crate::roster::RosterError;
use serde_json::{json, Value};

fn handle_students_list(state: &mut AppState, req: &Request) -> Result<Value, HandlerErr> {
    let today = get_today(&req.params)?;
    let rows = roster_rows(state.roster.export(), today, state.settings.due_soon_days);
    let rows = serde_json::to_value(rows).map_err(HandlerErr::internal)?;
    Ok(json!({
        "today": today.to_string(),
        "students": rows,
        "names": state.roster.names()
    }))
}

fn handle_students_create(state: &mut AppState, req: &Request) -> Result<Value, HandlerErr> {
    // A missing name is the same validation failure as a blank one.
    let name = req
        .params
        .get("name")
        .and_then(|v| v.as_str())
        .unwrap_or_default()
        .to_string();
    if name.trim().is_empty() {
        return Err(RosterError::Validation { field: "name" }.into());
    }
    let phone = get_optional_str(&req.params, "phone").unwrap_or_default();
    let due = get_required_date(&req.params, "nextPaymentDue")?;
    let amount = get_amount(&req.params, "lastPaymentAmount", false)?;

    let student = state.roster.add(&name, &phone, due, amount)?;
    let student_id = student.id.clone();
    log::info!("added student {:?}", student.name);
    Ok(json!({
        "studentId": student_id,
        "index": state.roster.len() - 1
    }))
}

pub fn try_handle(state: &mut AppState, req: &Request) -> Option<Value> {
    let result = match req.method.as_str() {
        "students.list" => handle_students_list(state, req),
        "students.create" => handle_students_create(state, req),
        _ => return None,
    };
    Some(match result {
        Ok(v) => ok(&req.id, v),
        Err(e) => e.response(&req.id),
    })
}
