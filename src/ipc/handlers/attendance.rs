use crate::ipc::error::ok;
use crate::ipc::helpers::{get_optional_str, get_required_bool, HandlerErr};
use crate::ipc::types::{AppState, Request};
use serde_json::{json, Value};

fn handle_attendance_set(state: &mut AppState, req: &Request) -> Result<Value, HandlerErr> {
    let present = get_required_bool(&req.params, "present")?;

    let index = if let Some(id) = get_optional_str(&req.params, "studentId") {
        state.roster.set_attendance_by_id(&id, present)?
    } else {
        let raw = req
            .params
            .get("index")
            .ok_or_else(|| HandlerErr::bad_params("missing index or studentId"))?;
        let index = raw
            .as_u64()
            .ok_or_else(|| HandlerErr::bad_params("index must be a non-negative integer"))?;
        let index = usize::try_from(index)
            .map_err(|_| HandlerErr::bad_params("index is too large"))?;
        state.roster.set_attendance(index, present)?;
        index
    };

    Ok(json!({
        "index": index,
        "attendance": present
    }))
}

pub fn try_handle(state: &mut AppState, req: &Request) -> Option<Value> {
    let result = match req.method.as_str() {
        "attendance.set" => handle_attendance_set(state, req),
        _ => return None,
    };
    Some(match result {
        Ok(v) => ok(&req.id, v),
        Err(e) => e.response(&req.id),
    })
}
