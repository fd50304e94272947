use crate::calc::decimal_text;
use crate::roster::{RosterError, Student};
use anyhow::Context;
use chrono::NaiveDate;
use std::collections::HashMap;
use std::path::Path;

pub const CSV_HEADER: [&str; 5] = [
    "Name",
    "Phone",
    "Next Payment Due",
    "Attendance",
    "Last Payment Amount",
];
pub const ROSTER_FILE_NAME: &str = "students.csv";

const DATE_FORMAT: &str = "%Y-%m-%d";

pub fn csv_quote(s: &str) -> String {
    if s.contains(',') || s.contains('"') || s.contains('\n') || s.contains('\r') {
        format!("\"{}\"", s.replace('"', "\"\""))
    } else {
        s.to_string()
    }
}

pub fn export_csv(students: &[Student]) -> String {
    let mut csv = CSV_HEADER.join(",");
    csv.push('\n');
    for s in students {
        csv.push_str(&format!(
            "{},{},{},{},{}\n",
            csv_quote(&s.name),
            csv_quote(&s.phone),
            s.next_payment_due.format(DATE_FORMAT),
            if s.attendance { "True" } else { "False" },
            decimal_text(s.last_payment_amount)
        ));
    }
    csv
}

struct CsvRecord {
    line_no: usize,
    fields: Vec<String>,
}

/// Splits text into records. Quoted fields may span lines; blank lines are dropped.
fn parse_csv_records(text: &str) -> Result<Vec<CsvRecord>, RosterError> {
    let text = text.strip_prefix('\u{feff}').unwrap_or(text);
    let mut out = Vec::new();
    let mut fields: Vec<String> = Vec::new();
    let mut buf = String::new();
    let mut in_quotes = false;
    let mut line_no = 1usize;
    let mut record_line = 1usize;
    let mut chars = text.chars().peekable();

    while let Some(ch) = chars.next() {
        if in_quotes {
            match ch {
                '"' if chars.peek() == Some(&'"') => {
                    buf.push('"');
                    chars.next();
                }
                '"' => in_quotes = false,
                '\n' => {
                    line_no += 1;
                    buf.push(ch);
                }
                _ => buf.push(ch),
            }
            continue;
        }
        match ch {
            '"' => in_quotes = true,
            ',' => fields.push(std::mem::take(&mut buf)),
            '\r' if chars.peek() == Some(&'\n') => {}
            '\n' | '\r' => {
                fields.push(std::mem::take(&mut buf));
                push_record(&mut out, record_line, std::mem::take(&mut fields));
                line_no += 1;
                record_line = line_no;
            }
            _ => buf.push(ch),
        }
    }
    if in_quotes {
        return Err(RosterError::Parse {
            line: record_line,
            message: "unterminated quoted field".to_string(),
        });
    }
    if !buf.is_empty() || !fields.is_empty() {
        fields.push(buf);
        push_record(&mut out, record_line, fields);
    }
    Ok(out)
}

fn push_record(out: &mut Vec<CsvRecord>, line_no: usize, fields: Vec<String>) {
    if fields.iter().all(|f| f.trim().is_empty()) {
        return;
    }
    out.push(CsvRecord { line_no, fields });
}

fn parse_boolish(s: &str) -> Option<bool> {
    match s.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "y" => Some(true),
        "0" | "false" | "no" | "n" => Some(false),
        _ => None,
    }
}

/// Accepts `YYYY-MM-DD`, optionally followed by a time part (`2024-05-01 00:00:00`).
pub fn parse_date(s: &str) -> Option<NaiveDate> {
    let t = s.trim();
    let date_part = t.split(|c: char| c == ' ' || c == 'T').next().unwrap_or(t);
    NaiveDate::parse_from_str(date_part, DATE_FORMAT).ok()
}

struct ColumnMap {
    name: Option<usize>,
    phone: Option<usize>,
    due: Option<usize>,
    attendance: Option<usize>,
    amount: Option<usize>,
}

impl ColumnMap {
    fn from_header(header: &[String]) -> Self {
        let idx: HashMap<String, usize> = header
            .iter()
            .enumerate()
            .map(|(i, h)| (h.trim().to_ascii_lowercase(), i))
            .collect();
        // Positions are only trusted when no header name is recognised at all.
        let any_named = CSV_HEADER
            .iter()
            .any(|h| idx.contains_key(&h.to_ascii_lowercase()));
        let pick = |pos: usize| -> Option<usize> {
            if any_named {
                idx.get(&CSV_HEADER[pos].to_ascii_lowercase()).copied()
            } else if pos < header.len() {
                Some(pos)
            } else {
                None
            }
        };
        ColumnMap {
            name: pick(0),
            phone: pick(1),
            due: pick(2),
            attendance: pick(3),
            amount: pick(4),
        }
    }
}

fn cell<'a>(fields: &'a [String], col: Option<usize>) -> Option<&'a str> {
    col.and_then(|c| fields.get(c))
        .map(|s| s.trim())
        .filter(|s| !s.is_empty())
}

/// Parses roster CSV into fresh records. Nothing is applied on failure.
pub fn import_csv(text: &str) -> Result<Vec<Student>, RosterError> {
    let records = parse_csv_records(text)?;
    let Some((header, rows)) = records.split_first() else {
        return Err(RosterError::Parse {
            line: 1,
            message: "no header row".to_string(),
        });
    };
    let cols = ColumnMap::from_header(&header.fields);

    let mut students = Vec::with_capacity(rows.len());
    for rec in rows {
        let line = rec.line_no;
        let f = &rec.fields;

        let name = cell(f, cols.name).unwrap_or_default().to_string();
        let phone = cell(f, cols.phone).unwrap_or_default().to_string();
        let due_raw = cell(f, cols.due).ok_or_else(|| RosterError::Parse {
            line,
            message: "missing Next Payment Due".to_string(),
        })?;
        let next_payment_due = parse_date(due_raw).ok_or_else(|| RosterError::Parse {
            line,
            message: format!("invalid date {:?}", due_raw),
        })?;
        let attendance = match cell(f, cols.attendance) {
            None => false,
            Some(raw) => parse_boolish(raw).ok_or_else(|| RosterError::Parse {
                line,
                message: format!("invalid attendance {:?}", raw),
            })?,
        };
        let last_payment_amount = match cell(f, cols.amount) {
            None => 0.0,
            Some(raw) => raw
                .parse::<f64>()
                .ok()
                .filter(|v| v.is_finite())
                .ok_or_else(|| RosterError::Parse {
                    line,
                    message: format!("invalid amount {:?}", raw),
                })?,
        };

        students.push(Student::new(
            name,
            phone,
            next_payment_due,
            attendance,
            last_payment_amount,
        ));
    }
    Ok(students)
}

pub fn write_text_file(path: &Path, contents: &str) -> anyhow::Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("failed to create directory {}", parent.to_string_lossy()))?;
    }
    std::fs::write(path, contents)
        .with_context(|| format!("failed to write {}", path.to_string_lossy()))?;
    Ok(())
}

pub fn read_text_file(path: &Path) -> anyhow::Result<String> {
    std::fs::read_to_string(path)
        .with_context(|| format!("failed to read {}", path.to_string_lossy()))
}
