use serde_json::json;
use std::io::{BufRead, BufReader, Write};
use std::path::PathBuf;
use std::process::{Child, ChildStdin, ChildStdout, Command, Stdio};
use std::time::{SystemTime, UNIX_EPOCH};

const HEADER: &str = "Name,Phone,Next Payment Due,Attendance,Last Payment Amount";

fn temp_dir(prefix: &str) -> PathBuf {
    let p = std::env::temp_dir().join(format!(
        "{}-{}",
        prefix,
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .expect("clock")
            .as_nanos()
    ));
    std::fs::create_dir_all(&p).expect("create temp dir");
    p
}

fn spawn_sidecar() -> (Child, ChildStdin, BufReader<ChildStdout>) {
    let exe = env!("CARGO_BIN_EXE_tutord");
    let mut child = Command::new(exe)
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::null())
        .spawn()
        .expect("spawn tutord");
    let stdin = child.stdin.take().expect("child stdin");
    let stdout = child.stdout.take().expect("child stdout");
    (child, stdin, BufReader::new(stdout))
}

fn request(
    stdin: &mut ChildStdin,
    reader: &mut BufReader<ChildStdout>,
    id: &str,
    method: &str,
    params: serde_json::Value,
) -> serde_json::Value {
    let payload = json!({
        "id": id,
        "method": method,
        "params": params,
    });
    writeln!(stdin, "{}", payload).expect("write request");
    stdin.flush().expect("flush request");

    let mut line = String::new();
    reader.read_line(&mut line).expect("read response line");
    let value: serde_json::Value = serde_json::from_str(line.trim()).expect("parse response json");
    assert_eq!(value.get("id").and_then(|v| v.as_str()), Some(id));
    value
}

fn request_ok(
    stdin: &mut ChildStdin,
    reader: &mut BufReader<ChildStdout>,
    id: &str,
    method: &str,
    params: serde_json::Value,
) -> serde_json::Value {
    let value = request(stdin, reader, id, method, params);
    assert!(
        value.get("ok").and_then(|v| v.as_bool()).unwrap_or(false),
        "{} failed: {}",
        method,
        value
    );
    value.get("result").cloned().unwrap_or_else(|| json!({}))
}

/// The five CSV-visible fields of each listed student.
fn records(listed: &serde_json::Value) -> Vec<serde_json::Value> {
    listed["students"]
        .as_array()
        .cloned()
        .unwrap_or_default()
        .into_iter()
        .map(|s| {
            json!([
                s["name"],
                s["phone"],
                s["nextPaymentDue"],
                s["attendance"],
                s["lastPaymentAmount"].as_f64()
            ])
        })
        .collect()
}

fn seed(stdin: &mut ChildStdin, reader: &mut BufReader<ChildStdout>) {
    for (i, (name, phone, due, amount)) in [
        ("Ana", "555-1234", "2024-05-09", 50.0),
        ("Ben, Jr.", "", "2024-05-12", 30.5),
        ("Cara \"CJ\"", "555-9999", "2024-05-20", 20.0),
    ]
    .into_iter()
    .enumerate()
    {
        request_ok(
            stdin,
            reader,
            &format!("seed-{}", i),
            "students.create",
            json!({ "name": name, "phone": phone, "nextPaymentDue": due, "lastPaymentAmount": amount }),
        );
    }
    request_ok(
        stdin,
        reader,
        "seed-att",
        "attendance.set",
        json!({ "index": 1, "present": true }),
    );
}

#[test]
fn export_then_import_restores_the_same_roster() {
    let (_child, mut stdin, mut reader) = spawn_sidecar();
    seed(&mut stdin, &mut reader);
    let before = request_ok(&mut stdin, &mut reader, "1", "students.list", json!({}));

    let exported = request_ok(&mut stdin, &mut reader, "2", "roster.exportCsv", json!({}));
    let csv = exported["csv"].as_str().expect("csv").to_string();
    assert_eq!(exported["rowsExported"], json!(3));
    assert_eq!(csv.lines().next(), Some(HEADER));
    assert!(csv.contains("\"Ben, Jr.\",,2024-05-12,True,30.5"));
    assert!(csv.contains("Ana,555-1234,2024-05-09,False,50.0"));

    let imported = request_ok(
        &mut stdin,
        &mut reader,
        "3",
        "roster.importCsv",
        json!({ "csv": csv }),
    );
    assert_eq!(imported["rowsImported"], json!(3));

    let after = request_ok(&mut stdin, &mut reader, "4", "students.list", json!({}));
    assert_eq!(records(&before), records(&after));
}

#[test]
fn unparsable_import_keeps_the_current_roster() {
    let (_child, mut stdin, mut reader) = spawn_sidecar();
    seed(&mut stdin, &mut reader);
    let before = request_ok(&mut stdin, &mut reader, "1", "students.list", json!({}));

    let bad_inputs = [
        String::new(),
        format!("{}\n\"Dee,1,2024-01-01,False,1\n", HEADER),
        format!("{}\nDee,1,someday,False,1\n", HEADER),
    ];
    for (i, text) in bad_inputs.iter().enumerate() {
        let resp = request(
            &mut stdin,
            &mut reader,
            &format!("bad-{}", i),
            "roster.importCsv",
            json!({ "csv": text }),
        );
        assert_eq!(resp["ok"], json!(false));
        assert_eq!(resp["error"]["code"], json!("parse_failed"), "{}", text);
    }

    let after = request_ok(&mut stdin, &mut reader, "2", "students.list", json!({}));
    assert_eq!(records(&before), records(&after));
}

#[test]
fn workspace_save_and_load_use_students_csv() {
    let workspace = temp_dir("tutord-save-load");

    let (_child, mut stdin, mut reader) = spawn_sidecar();
    let no_ws = request(&mut stdin, &mut reader, "0", "roster.save", json!({}));
    assert_eq!(no_ws["error"]["code"], json!("no_workspace"));

    request_ok(
        &mut stdin,
        &mut reader,
        "1",
        "workspace.select",
        json!({ "path": workspace.to_string_lossy() }),
    );
    seed(&mut stdin, &mut reader);
    let saved = request_ok(&mut stdin, &mut reader, "2", "roster.save", json!({}));
    assert_eq!(saved["rowsExported"], json!(3));
    let on_disk = std::fs::read_to_string(workspace.join("students.csv")).expect("students.csv");
    assert!(on_disk.starts_with(HEADER));

    request_ok(
        &mut stdin,
        &mut reader,
        "3",
        "setup.update",
        json!({ "patch": { "currencySymbol": "€" } }),
    );

    // A second session picks up both the saved roster and settings.
    let (_child2, mut stdin2, mut reader2) = spawn_sidecar();
    let selected = request_ok(
        &mut stdin2,
        &mut reader2,
        "1",
        "workspace.select",
        json!({ "path": workspace.to_string_lossy() }),
    );
    assert_eq!(selected["settingsLoaded"], json!(true));
    let loaded = request_ok(&mut stdin2, &mut reader2, "2", "roster.load", json!({}));
    assert_eq!(loaded["rowsImported"], json!(3));

    let a = request_ok(&mut stdin, &mut reader, "4", "students.list", json!({}));
    let b = request_ok(&mut stdin2, &mut reader2, "3", "students.list", json!({}));
    assert_eq!(records(&a), records(&b));

    let d = request_ok(
        &mut stdin2,
        &mut reader2,
        "4",
        "dashboard.get",
        json!({ "today": "2024-05-10" }),
    );
    assert_eq!(d["totalCollectedDisplay"], json!("€100.5"));

    let _ = std::fs::remove_dir_all(workspace);
}
