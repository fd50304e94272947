use serde_json::json;
use std::io::{BufRead, BufReader, Write};
use std::path::PathBuf;
use std::process::{Child, ChildStdin, ChildStdout, Command, Stdio};
use std::time::{SystemTime, UNIX_EPOCH};

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

fn send_line(stdin: &mut ChildStdin, reader: &mut BufReader<ChildStdout>, line: &str) -> serde_json::Value {
    writeln!(stdin, "{}", line).expect("write request");
    stdin.flush().expect("flush request");
    let mut out = String::new();
    reader.read_line(&mut out).expect("read response line");
    serde_json::from_str(out.trim()).expect("parse response json")
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
    let value = send_line(stdin, reader, &payload.to_string());
    assert_eq!(value.get("id").and_then(|v| v.as_str()), Some(id));
    if value.get("ok").and_then(|v| v.as_bool()) == Some(false) {
        let code = value
            .get("error")
            .and_then(|e| e.get("code"))
            .and_then(|v| v.as_str())
            .unwrap_or("unknown");
        assert_ne!(
            code, "not_implemented",
            "unexpected unknown method for {}",
            method
        );
    }
    value
}

#[test]
fn router_dispatch_smoke_covers_handler_families() {
    let workspace = temp_dir("tutord-router-smoke");
    let csv_out = workspace.join("smoke-export.csv");

    let (mut child, mut stdin, mut reader) = spawn_sidecar();

    let health = request(&mut stdin, &mut reader, "1", "health", json!({}));
    assert_eq!(health["ok"], json!(true));
    assert_eq!(health["result"]["studentCount"], json!(0));

    let calls = vec![
        ("2", "workspace.select", json!({ "path": workspace.to_string_lossy() })),
        (
            "3",
            "students.create",
            json!({ "name": "Ana", "phone": "555-1234", "nextPaymentDue": "2024-05-09", "lastPaymentAmount": 50 }),
        ),
        ("4", "students.list", json!({ "today": "2024-05-10" })),
        (
            "5",
            "payments.update",
            json!({ "name": "Ana", "amount": 75, "nextPaymentDue": "2024-05-15" }),
        ),
        ("6", "attendance.set", json!({ "index": 0, "present": true })),
        ("7", "dashboard.get", json!({ "today": "2024-05-10" })),
        ("8", "roster.exportCsv", json!({ "outPath": csv_out.to_string_lossy() })),
        ("9", "roster.importCsv", json!({ "inPath": csv_out.to_string_lossy() })),
        ("10", "roster.save", json!({})),
        ("11", "roster.load", json!({})),
        ("12", "setup.get", json!({})),
        ("13", "setup.update", json!({ "patch": { "currencySymbol": "€" } })),
    ];
    for (id, method, params) in calls {
        let resp = request(&mut stdin, &mut reader, id, method, params);
        assert_eq!(resp["ok"], json!(true), "{} failed: {}", method, resp);
    }

    // Sent raw: `request` refuses not_implemented replies.
    let unknown = send_line(
        &mut stdin,
        &mut reader,
        &json!({ "id": "14", "method": "students.delete", "params": {} }).to_string(),
    );
    assert_eq!(unknown["id"], json!("14"));
    assert_eq!(unknown["ok"], json!(false));
    assert_eq!(unknown["error"]["code"], json!("not_implemented"));

    let bad = send_line(&mut stdin, &mut reader, "{not json");
    assert_eq!(bad["ok"], json!(false));
    assert_eq!(bad["error"]["code"], json!("bad_json"));

    // The session survives both failures.
    let health = request(&mut stdin, &mut reader, "15", "health", json!({}));
    assert_eq!(health["result"]["studentCount"], json!(1));

    drop(stdin);
    let _ = child.wait();
    let _ = std::fs::remove_dir_all(workspace);
}
