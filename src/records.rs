//! Line-oriented `STUDENT` / `HALL` records text.
//!
//! ```text
//! STUDENT,S001,Imraan,CSE,5,3,Math
//! HALL,Hall-101,10,2
//! ```
//!
//! Fields are split on `,` without quoting and trimmed. Numbers that fail to
//! parse take the defaults below, as do a zero semester or year. There is no
//! escaping, so export refuses a field holding `,`, a line break, or
//! surrounding whitespace rather than write a line that reads back wrong.

use crate::data::{AllocationInput, HallRecord, StudentRecord};
use crate::error::{RecordParseError, RecordWriteError};
use log::{debug, warn};

pub const DEFAULT_SEMESTER: u32 = 1;
pub const DEFAULT_YEAR: u32 = 2025;
pub const DEFAULT_ROWS: i32 = 5;
pub const DEFAULT_COLS: i32 = 6;

const STUDENT_TAG: &str = "STUDENT";
const HALL_TAG: &str = "HALL";

/// Everything read from a records text, plus the lines that were skipped.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParsedRecords {
    pub students: Vec<StudentRecord>,
    pub halls: Vec<HallRecord>,
    pub skipped: Vec<RecordParseError>,
}

impl ParsedRecords {
    /// Every parsed record, unfiltered. Repeated keys are left for
    /// `allocate` to report.
    pub fn into_input(self) -> AllocationInput {
        AllocationInput {
            students: self.students,
            halls: self.halls,
        }
    }
}

fn parse_or<T: std::str::FromStr>(field: &str, default: T) -> T {
    field.trim().parse().unwrap_or(default)
}

fn parse_positive(field: &str, default: u32) -> u32 {
    field
        .trim()
        .parse()
        .ok()
        .filter(|&n| n > 0)
        .unwrap_or(default)
}

fn parse_line(fields: &[&str]) -> Result<Record, String> {
    let tag = fields[0].to_uppercase();
    match tag.as_str() {
        STUDENT_TAG if fields.len() >= 7 => {
            if fields[1].is_empty() {
                return Err("student roll is empty".to_string());
            }
            Ok(Record::Student(StudentRecord {
                roll: fields[1].to_string(),
                name: fields[2].to_string(),
                branch: fields[3].to_string(),
                semester: parse_positive(fields[4], DEFAULT_SEMESTER),
                year: parse_positive(fields[5], DEFAULT_YEAR),
                subject: fields[6].to_string(),
            }))
        }
        HALL_TAG if fields.len() >= 4 => {
            if fields[1].is_empty() {
                return Err("hall id is empty".to_string());
            }
            Ok(Record::Hall(HallRecord {
                hall_id: fields[1].to_string(),
                rows: parse_or(fields[2], DEFAULT_ROWS),
                cols: parse_or(fields[3], DEFAULT_COLS),
            }))
        }
        STUDENT_TAG | HALL_TAG => Err(format!(
            "{} record has only {} fields",
            tag,
            fields.len()
        )),
        _ => Err(format!("unknown record type '{}'", fields[0])),
    }
}

enum Record {
    Student(StudentRecord),
    Hall(HallRecord),
}

/// Reads every record it can. Bad lines are collected, never fatal.
pub fn parse_records(text: &str) -> ParsedRecords {
    let mut parsed = ParsedRecords::default();
    for (index, line) in text.lines().enumerate() {
        if line.trim().is_empty() {
            continue;
        }
        let fields: Vec<&str> = line.split(',').map(str::trim).collect();
        match parse_line(&fields) {
            Ok(Record::Student(student)) => parsed.students.push(student),
            Ok(Record::Hall(hall)) => parsed.halls.push(hall),
            Err(reason) => {
                let error = RecordParseError::new(index + 1, reason);
                warn!("Skipping record at {}", error);
                parsed.skipped.push(error);
            }
        }
    }
    debug!(
        "Parsed {} students and {} halls, skipped {} lines.",
        parsed.students.len(),
        parsed.halls.len(),
        parsed.skipped.len()
    );
    parsed
}

fn check_field(key: &str, name: &'static str, value: &str) -> Result<(), RecordWriteError> {
    if value.contains([',', '\n', '\r']) || value.trim() != value {
        return Err(RecordWriteError::new(key, name, value));
    }
    Ok(())
}

pub fn student_line(student: &StudentRecord) -> Result<String, RecordWriteError> {
    for (name, value) in [
        ("roll", &student.roll),
        ("name", &student.name),
        ("branch", &student.branch),
        ("subject", &student.subject),
    ] {
        check_field(&student.roll, name, value)?;
    }
    Ok(format!(
        "{},{},{},{},{},{},{}",
        STUDENT_TAG,
        student.roll,
        student.name,
        student.branch,
        student.semester,
        student.year,
        student.subject
    ))
}

pub fn hall_line(hall: &HallRecord) -> Result<String, RecordWriteError> {
    check_field(&hall.hall_id, "hallId", &hall.hall_id)?;
    Ok(format!(
        "{},{},{},{}",
        HALL_TAG, hall.hall_id, hall.rows, hall.cols
    ))
}

/// Students first, then halls, one record per line.
///
/// Fails on the first field that would not survive [`parse_records`].
pub fn write_records(
    students: &[StudentRecord],
    halls: &[HallRecord],
) -> Result<String, RecordWriteError> {
    let lines = students
        .iter()
        .map(student_line)
        .chain(halls.iter().map(hall_line))
        .collect::<Result<Vec<String>, RecordWriteError>>()?;
    let mut text = lines.join("\n");
    if !text.is_empty() {
        text.push('\n');
    }
    Ok(text)
}
