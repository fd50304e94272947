use crate::exchange::{
    export_csv, import_csv, read_text_file, write_text_file, ROSTER_FILE_NAME,
};
use crate::ipc::error::ok;
use crate::ipc::helpers::{get_optional_str, HandlerErr};
use crate::ipc::types::{AppState, Request};
use serde_json::{json, Value};
use std::path::{Path, PathBuf};

fn workspace_roster_path(state: &AppState) -> Result<PathBuf, HandlerErr> {
    state
        .workspace
        .as_ref()
        .map(|w| w.join(ROSTER_FILE_NAME))
        .ok_or(HandlerErr {
            code: "no_workspace",
            message: "select a workspace first".to_string(),
            details: None,
        })
}

fn write_roster(state: &AppState, path: &Path) -> Result<usize, HandlerErr> {
    let csv = export_csv(state.roster.export());
    write_text_file(path, &csv).map_err(HandlerErr::io)?;
    let rows = state.roster.len();
    log::info!("exported {} students to {}", rows, path.display());
    Ok(rows)
}

/// Parses first and swaps the roster only once the whole file is accepted.
fn replace_roster(state: &mut AppState, text: &str) -> Result<usize, HandlerErr> {
    let students = import_csv(text)?;
    let rows = students.len();
    state.roster.replace_all(students);
    Ok(rows)
}

fn handle_export_csv(state: &mut AppState, req: &Request) -> Result<Value, HandlerErr> {
    let csv = export_csv(state.roster.export());
    let mut result = json!({
        "csv": csv,
        "rowsExported": state.roster.len()
    });
    if let Some(out_path) = get_optional_str(&req.params, "outPath") {
        write_roster(state, Path::new(&out_path))?;
        result["path"] = json!(out_path);
    }
    Ok(result)
}

fn handle_import_csv(state: &mut AppState, req: &Request) -> Result<Value, HandlerErr> {
    let text = if let Some(csv) = req.params.get("csv").and_then(|v| v.as_str()) {
        csv.to_string()
    } else if let Some(in_path) = get_optional_str(&req.params, "inPath") {
        read_text_file(Path::new(&in_path)).map_err(HandlerErr::io)?
    } else {
        return Err(HandlerErr::bad_params("missing csv or inPath"));
    };
    let rows = replace_roster(state, &text)?;
    log::info!("imported {} students", rows);
    Ok(json!({ "rowsImported": rows }))
}

fn handle_roster_save(state: &mut AppState, _req: &Request) -> Result<Value, HandlerErr> {
    let path = workspace_roster_path(state)?;
    let rows = write_roster(state, &path)?;
    Ok(json!({
        "path": path.to_string_lossy(),
        "rowsExported": rows
    }))
}

fn handle_roster_load(state: &mut AppState, _req: &Request) -> Result<Value, HandlerErr> {
    let path = workspace_roster_path(state)?;
    let text = read_text_file(&path).map_err(HandlerErr::io)?;
    let rows = replace_roster(state, &text)?;
    log::info!("loaded {} students from {}", rows, path.display());
    Ok(json!({
        "path": path.to_string_lossy(),
        "rowsImported": rows
    }))
}

pub fn try_handle(state: &mut AppState, req: &Request) -> Option<Value> {
    let result = match req.method.as_str() {
        "roster.exportCsv" => handle_export_csv(state, req),
        "roster.importCsv" => handle_import_csv(state, req),
        "roster.save" => handle_roster_save(state, req),
        "roster.load" => handle_roster_load(state, req),
        _ => return None,
    };
    Some(match result {
        Ok(v) => ok(&req.id, v),
        Err(e) => e.response(&req.id),
    })
}
