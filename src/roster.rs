use chrono::NaiveDate;
use serde::Serialize;
use thiserror::Error;
use uuid::Uuid;

#[derive(Debug, Error, Clone, PartialEq)]
pub enum RosterError {
    /// A required field was empty on add.
    #[error("{field} is required")]
    Validation { field: &'static str },

    #[error("no student matches {key}")]
    NotFound { key: String },

    #[error("row {index} is out of range (roster has {len} students)")]
    IndexOutOfRange { index: usize, len: usize },

    /// Import text could not be read as a roster table.
    #[error("parse error at line {line}: {message}")]
    Parse { line: usize, message: String },
}

impl RosterError {
    pub fn code(&self) -> &'static str {
        match self {
            RosterError::Validation { .. } => "validation_failed",
            RosterError::NotFound { .. } => "not_found",
            RosterError::IndexOutOfRange { .. } => "index_out_of_range",
            RosterError::Parse { .. } => "parse_failed",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Student {
    pub id: String,
    pub name: String,
    pub phone: String,
    pub next_payment_due: NaiveDate,
    pub attendance: bool,
    pub last_payment_amount: f64,
}

impl Student {
    pub fn new(
        name: impl Into<String>,
        phone: impl Into<String>,
        next_payment_due: NaiveDate,
        attendance: bool,
        last_payment_amount: f64,
    ) -> Self {
        Student {
            id: Uuid::new_v4().to_string(),
            name: name.into(),
            phone: phone.into(),
            next_payment_due,
            attendance,
            last_payment_amount,
        }
    }
}

/// The session's roster. Insertion order is display order; names may repeat.
#[derive(Debug, Default)]
pub struct RosterStore {
    students: Vec<Student>,
}

impl RosterStore {
    pub fn add(
        &mut self,
        name: &str,
        phone: &str,
        due_date: NaiveDate,
        payment_amount: f64,
    ) -> Result<&Student, RosterError> {
        let name = name.trim();
        if name.is_empty() {
            return Err(RosterError::Validation { field: "name" });
        }
        self.students
            .push(Student::new(name, phone.trim(), due_date, false, payment_amount));
        Ok(&self.students[self.students.len() - 1])
    }

    /// Updates the first student whose name equals `name`. Later duplicates are untouched.
    pub fn update_payment(
        &mut self,
        name: &str,
        amount: f64,
        due_date: NaiveDate,
    ) -> Result<usize, RosterError> {
        let index = self
            .students
            .iter()
            .position(|s| s.name == name)
            .ok_or_else(|| RosterError::NotFound {
                key: format!("name {:?}", name),
            })?;
        self.apply_payment(index, amount, due_date);
        Ok(index)
    }

    pub fn update_payment_by_id(
        &mut self,
        id: &str,
        amount: f64,
        due_date: NaiveDate,
    ) -> Result<usize, RosterError> {
        let index = self.position_of_id(id)?;
        self.apply_payment(index, amount, due_date);
        Ok(index)
    }

    fn apply_payment(&mut self, index: usize, amount: f64, due_date: NaiveDate) {
        let s = &mut self.students[index];
        s.last_payment_amount = amount;
        s.next_payment_due = due_date;
    }

    pub fn set_attendance(&mut self, index: usize, present: bool) -> Result<(), RosterError> {
        let len = self.students.len();
        let s = self
            .students
            .get_mut(index)
            .ok_or(RosterError::IndexOutOfRange { index, len })?;
        s.attendance = present;
        Ok(())
    }

    pub fn set_attendance_by_id(&mut self, id: &str, present: bool) -> Result<usize, RosterError> {
        let index = self.position_of_id(id)?;
        self.students[index].attendance = present;
        Ok(index)
    }

    fn position_of_id(&self, id: &str) -> Result<usize, RosterError> {
        self.students
            .iter()
            .position(|s| s.id == id)
            .ok_or_else(|| RosterError::NotFound {
                key: format!("id {:?}", id),
            })
    }

    /// Replaces the whole roster. No validation happens here; import parsing owns that.
    pub fn replace_all(&mut self, records: Vec<Student>) {
        self.students = records;
    }

    pub fn export(&self) -> &[Student] {
        &self.students
    }

    pub fn names(&self) -> Vec<&str> {
        self.students.iter().map(|s| s.name.as_str()).collect()
    }

    pub fn len(&self) -> usize {
        self.students.len()
    }

    #[allow(dead_code)]
    pub fn is_empty(&self) -> bool {
        self.students.is_empty()
    }
}
