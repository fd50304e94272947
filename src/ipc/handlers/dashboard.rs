use crate::calc::{dashboard, dashboard_within, format_amount, DUE_SOON_DAYS};
use crate::ipc::error::ok;
use crate::ipc::helpers::{get_today, HandlerErr};
use crate::ipc::types::{AppState, Request};
use serde_json::{json, Value};

fn handle_dashboard_get(state: &mut AppState, req: &Request) -> Result<Value, HandlerErr> {
    let today = get_today(&req.params)?;
    let roster = state.roster.export();
    let d = match state.settings.due_soon_days {
        DUE_SOON_DAYS => dashboard(roster, today),
        days => dashboard_within(roster, today, days),
    };
    let mut result = serde_json::to_value(d).map_err(HandlerErr::internal)?;
    result["today"] = json!(today.to_string());
    result["okCount"] = json!(d.ok_count());
    result["totalCollectedDisplay"] =
        json!(format_amount(&state.settings.currency_symbol, d.total_collected));
    Ok(result)
}

pub fn try_handle(state: &mut AppState, req: &Request) -> Option<Value> {
    let result = match req.method.as_str() {
        "dashboard.get" => handle_dashboard_get(state, req),
        _ => return None,
    };
    Some(match result {
        Ok(v) => ok(&req.id, v),
        Err(e) => e.response(&req.id),
    })
}
