use crate::data::{AllocationInput, HallRecord, StudentRecord};
use crate::error::RosterError;
use crate::records::ParsedRecords;
use log::{debug, info};

/// Caller-owned store of students and halls.
///
/// Roll codes and hall codes are unique within a roster. Order is kept
/// as entered; hall order decides which hall fills first.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Roster {
    students: Vec<StudentRecord>,
    halls: Vec<HallRecord>,
}

/// Outcome of importing parsed records into a roster.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ImportSummary {
    pub students_added: usize,
    pub halls_added: usize,
    pub rejected: Vec<RosterError>,
}

impl Roster {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn students(&self) -> &[StudentRecord] {
        &self.students
    }

    pub fn halls(&self) -> &[HallRecord] {
        &self.halls
    }

    pub fn student(&self, roll: &str) -> Option<&StudentRecord> {
        self.students.iter().find(|s| s.roll == roll)
    }

    pub fn hall(&self, hall_id: &str) -> Option<&HallRecord> {
        self.halls.iter().find(|h| h.hall_id == hall_id)
    }

    fn student_index(&self, roll: &str) -> Option<usize> {
        self.students.iter().position(|s| s.roll == roll)
    }

    fn hall_index(&self, hall_id: &str) -> Option<usize> {
        self.halls.iter().position(|h| h.hall_id == hall_id)
    }

    /// Appends a student, returning its index.
    pub fn add_student(&mut self, student: StudentRecord) -> Result<usize, RosterError> {
        let index = self.students.len();
        self.insert_student(index, student)?;
        Ok(index)
    }

    /// Inserts at `index`, clamped to the end of the list.
    pub fn insert_student(
        &mut self,
        index: usize,
        student: StudentRecord,
    ) -> Result<(), RosterError> {
        if student.roll.is_empty() {
            return Err(RosterError::EmptyRoll);
        }
        if self.student_index(&student.roll).is_some() {
            return Err(RosterError::DuplicateRoll(student.roll));
        }
        debug!("Adding student {}", student);
        let index = index.min(self.students.len());
        self.students.insert(index, student);
        Ok(())
    }

    /// Replaces the record with the same roll, returning the old one.
    pub fn update_student(&mut self, student: StudentRecord) -> Result<StudentRecord, RosterError> {
        let index = self
            .student_index(&student.roll)
            .ok_or_else(|| RosterError::UnknownRoll(student.roll.clone()))?;
        debug!("Updating student {}", student);
        Ok(std::mem::replace(&mut self.students[index], student))
    }

    pub fn remove_student(&mut self, roll: &str) -> Result<(usize, StudentRecord), RosterError> {
        let index = self
            .student_index(roll)
            .ok_or_else(|| RosterError::UnknownRoll(roll.to_string()))?;
        debug!("Removing student {}", roll);
        Ok((index, self.students.remove(index)))
    }

    /// Copies a student under the roll `<roll>_copy`.
    pub fn duplicate_student(&mut self, roll: &str) -> Result<StudentRecord, RosterError> {
        let original = self
            .student(roll)
            .ok_or_else(|| RosterError::UnknownRoll(roll.to_string()))?;
        let copy = StudentRecord {
            roll: format!("{}_copy", original.roll),
            ..original.clone()
        };
        self.add_student(copy.clone())?;
        Ok(copy)
    }

    pub fn add_hall(&mut self, hall: HallRecord) -> Result<usize, RosterError> {
        let index = self.halls.len();
        self.insert_hall(index, hall)?;
        Ok(index)
    }

    /// Dimensions are not checked here; allocation reports unusable halls.
    pub fn insert_hall(&mut self, index: usize, hall: HallRecord) -> Result<(), RosterError> {
        if hall.hall_id.is_empty() {
            return Err(RosterError::EmptyHallId);
        }
        if self.hall_index(&hall.hall_id).is_some() {
            return Err(RosterError::DuplicateHall(hall.hall_id));
        }
        debug!("Adding hall {}", hall);
        let index = index.min(self.halls.len());
        self.halls.insert(index, hall);
        Ok(())
    }

    pub fn remove_hall(&mut self, hall_id: &str) -> Result<(usize, HallRecord), RosterError> {
        let index = self
            .hall_index(hall_id)
            .ok_or_else(|| RosterError::UnknownHall(hall_id.to_string()))?;
        debug!("Removing hall {}", hall_id);
        Ok((index, self.halls.remove(index)))
    }

    /// Case-insensitive substring search over every student field.
    pub fn search(&self, query: &str) -> Vec<&StudentRecord> {
        let query = query.trim().to_lowercase();
        if query.is_empty() {
            return self.students.iter().collect();
        }
        self.students
            .iter()
            .filter(|s| {
                [
                    s.roll.to_lowercase(),
                    s.name.to_lowercase(),
                    s.branch.to_lowercase(),
                    s.semester.to_string(),
                    s.year.to_string(),
                    s.subject.to_lowercase(),
                ]
                .iter()
                .any(|field| field.contains(&query))
            })
            .collect()
    }

    /// Adds every parsed record it can; rejected ones are listed, not fatal.
    pub fn import(&mut self, records: ParsedRecords) -> ImportSummary {
        let mut summary = ImportSummary::default();
        for student in records.students {
            match self.add_student(student) {
                Ok(_) => summary.students_added += 1,
                Err(e) => summary.rejected.push(e),
            }
        }
        for hall in records.halls {
            match self.add_hall(hall) {
                Ok(_) => summary.halls_added += 1,
                Err(e) => summary.rejected.push(e),
            }
        }
        info!(
            "Imported {} students, {} halls ({} rejected).",
            summary.students_added,
            summary.halls_added,
            summary.rejected.len()
        );
        summary
    }

    pub fn allocation_input(&self) -> AllocationInput {
        AllocationInput {
            students: self.students.clone(),
            halls: self.halls.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::records::parse_records;

    fn student(roll: &str, name: &str, subject: &str) -> StudentRecord {
        StudentRecord::new(roll, name, "CSE", 5, 3, subject)
    }

    #[test]
    fn rejects_duplicate_and_empty_keys() {
        let mut roster = Roster::new();
        roster.add_student(student("S1", "Imraan", "Math")).unwrap();

        assert_eq!(
            roster.add_student(student("S1", "Other", "Physics")),
            Err(RosterError::DuplicateRoll("S1".to_string()))
        );
        assert_eq!(
            roster.add_student(student("", "Nobody", "Math")),
            Err(RosterError::EmptyRoll)
        );

        roster.add_hall(HallRecord::new("H1", 2, 2)).unwrap();
        assert_eq!(
            roster.add_hall(HallRecord::new("H1", 3, 3)),
            Err(RosterError::DuplicateHall("H1".to_string()))
        );
        assert_eq!(
            roster.add_hall(HallRecord::new("", 3, 3)),
            Err(RosterError::EmptyHallId)
        );
        assert_eq!(roster.students().len(), 1);
        assert_eq!(roster.halls().len(), 1);
    }

    #[test]
    fn update_replaces_under_same_roll() {
        let mut roster = Roster::new();
        roster.add_student(student("S1", "Imraan", "Math")).unwrap();

        let before = roster.update_student(student("S1", "Imraan", "Physics")).unwrap();
        assert_eq!(before.subject, "Math");
        assert_eq!(roster.student("S1").unwrap().subject, "Physics");
        assert_eq!(
            roster.update_student(student("S9", "X", "Math")),
            Err(RosterError::UnknownRoll("S9".to_string()))
        );
    }

    #[test]
    fn remove_reports_index() {
        let mut roster = Roster::new();
        roster.add_student(student("S1", "A", "Math")).unwrap();
        roster.add_student(student("S2", "B", "Math")).unwrap();

        let (index, removed) = roster.remove_student("S2").unwrap();
        assert_eq!(index, 1);
        assert_eq!(removed.roll, "S2");
        assert!(roster.remove_student("S2").is_err());
    }

    #[test]
    fn duplicate_appends_copy_suffix() {
        let mut roster = Roster::new();
        roster.add_student(student("S1", "Imraan", "Math")).unwrap();

        let copy = roster.duplicate_student("S1").unwrap();
        assert_eq!(copy.roll, "S1_copy");
        assert_eq!(copy.name, "Imraan");
        assert_eq!(roster.students().len(), 2);
        // a second copy would collide
        assert_eq!(
            roster.duplicate_student("S1"),
            Err(RosterError::DuplicateRoll("S1_copy".to_string()))
        );
    }

    #[test]
    fn search_matches_any_field_ignoring_case() {
        let mut roster = Roster::new();
        roster.add_student(student("S001", "Imraan", "Math")).unwrap();
        roster.add_student(student("S002", "Rahul", "Physics")).unwrap();

        let hits: Vec<_> = roster.search("rAh").iter().map(|s| s.roll.as_str()).collect();
        assert_eq!(hits, vec!["S002"]);
        assert_eq!(roster.search("cse").len(), 2);
        assert_eq!(roster.search("  ").len(), 2);
        assert!(roster.search("chemistry").is_empty());
    }

    #[test]
    fn import_collects_rejections() {
        let mut roster = Roster::new();
        roster.add_hall(HallRecord::new("H1", 2, 2)).unwrap();
        let parsed = parse_records(
            "STUDENT,S1,A,CSE,5,3,Math\nSTUDENT,S1,B,ECE,5,3,Physics\nHALL,H1,4,4\nHALL,H2,3,3",
        );

        let summary = roster.import(parsed);
        assert_eq!(summary.students_added, 1);
        assert_eq!(summary.halls_added, 1);
        assert_eq!(
            summary.rejected,
            vec![
                RosterError::DuplicateRoll("S1".to_string()),
                RosterError::DuplicateHall("H1".to_string()),
            ]
        );
        let input = roster.allocation_input();
        assert_eq!(input.students.len(), 1);
        assert_eq!(input.halls.len(), 2);
    }
}
