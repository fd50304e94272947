use crate::ipc::error::{err, ok};
use crate::ipc::types::{AppState, Request};
use serde_json::json;

fn settings_json(state: &AppState) -> serde_json::Value {
    serde_json::to_value(&state.settings).unwrap_or_else(|_| json!({}))
}

fn handle_setup_get(state: &mut AppState, req: &Request) -> serde_json::Value {
    ok(&req.id, settings_json(state))
}

fn handle_setup_update(state: &mut AppState, req: &Request) -> serde_json::Value {
    let Some(patch_obj) = req.params.get("patch").and_then(|v| v.as_object()) else {
        return err(&req.id, "bad_params", "patch must be an object", None);
    };
    if let Err(msg) = state.settings.merge_patch(patch_obj) {
        return err(&req.id, "bad_params", msg, None);
    }
    if let Some(workspace) = state.workspace.as_ref() {
        if let Err(e) = state.settings.save(workspace) {
            return err(&req.id, "io_failed", format!("{:#}", e), None);
        }
    }
    ok(&req.id, settings_json(state))
}

pub fn try_handle(state: &mut AppState, req: &Request) -> Option<serde_json::Value> {
    match req.method.as_str() {
        "setup.get" => Some(handle_setup_get(state, req)),
        "setup.update" => Some(handle_setup_update(state, req)),
        _ => None,
    }
}
