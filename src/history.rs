//! Undo/redo for roster edits.
//!
//! Every edit carries enough to build its inverse, so undo is just applying
//! `edit.inverse()`. Allocation never goes through here.

use crate::data::{HallRecord, StudentRecord};
use crate::error::RosterError;
use crate::roster::Roster;
use log::debug;
use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Edit {
    InsertStudent { index: usize, student: StudentRecord },
    RemoveStudent { index: usize, student: StudentRecord },
    ReplaceStudent { before: StudentRecord, after: StudentRecord },
    InsertHall { index: usize, hall: HallRecord },
    RemoveHall { index: usize, hall: HallRecord },
}

impl Edit {
    /// Appends `student` at the end of the roster.
    pub fn add_student(roster: &Roster, student: StudentRecord) -> Self {
        Edit::InsertStudent {
            index: roster.students().len(),
            student,
        }
    }

    pub fn remove_student(roster: &Roster, roll: &str) -> Result<Self, RosterError> {
        let index = roster
            .students()
            .iter()
            .position(|s| s.roll == roll)
            .ok_or_else(|| RosterError::UnknownRoll(roll.to_string()))?;
        Ok(Edit::RemoveStudent {
            index,
            student: roster.students()[index].clone(),
        })
    }

    pub fn update_student(roster: &Roster, after: StudentRecord) -> Result<Self, RosterError> {
        let before = roster
            .student(&after.roll)
            .cloned()
            .ok_or_else(|| RosterError::UnknownRoll(after.roll.clone()))?;
        Ok(Edit::ReplaceStudent { before, after })
    }

    pub fn add_hall(roster: &Roster, hall: HallRecord) -> Self {
        Edit::InsertHall {
            index: roster.halls().len(),
            hall,
        }
    }

    pub fn remove_hall(roster: &Roster, hall_id: &str) -> Result<Self, RosterError> {
        let index = roster
            .halls()
            .iter()
            .position(|h| h.hall_id == hall_id)
            .ok_or_else(|| RosterError::UnknownHall(hall_id.to_string()))?;
        Ok(Edit::RemoveHall {
            index,
            hall: roster.halls()[index].clone(),
        })
    }

    pub fn inverse(&self) -> Edit {
        match self.clone() {
            Edit::InsertStudent { index, student } => Edit::RemoveStudent { index, student },
            Edit::RemoveStudent { index, student } => Edit::InsertStudent { index, student },
            Edit::ReplaceStudent { before, after } => Edit::ReplaceStudent {
                before: after,
                after: before,
            },
            Edit::InsertHall { index, hall } => Edit::RemoveHall { index, hall },
            Edit::RemoveHall { index, hall } => Edit::InsertHall { index, hall },
        }
    }

    pub fn apply(&self, roster: &mut Roster) -> Result<(), RosterError> {
        match self {
            Edit::InsertStudent { index, student } => {
                roster.insert_student(*index, student.clone())
            }
            Edit::RemoveStudent { student, .. } => {
                roster.remove_student(&student.roll).map(|_| ())
            }
            Edit::ReplaceStudent { after, .. } => roster.update_student(after.clone()).map(|_| ()),
            Edit::InsertHall { index, hall } => roster.insert_hall(*index, hall.clone()),
            Edit::RemoveHall { hall, .. } => roster.remove_hall(&hall.hall_id).map(|_| ()),
        }
    }
}

impl fmt::Display for Edit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Edit::InsertStudent { student, .. } => write!(f, "add student {}", student.roll),
            Edit::RemoveStudent { student, .. } => write!(f, "delete student {}", student.roll),
            Edit::ReplaceStudent { after, .. } => write!(f, "edit student {}", after.roll),
            Edit::InsertHall { hall, .. } => write!(f, "add hall {}", hall.hall_id),
            Edit::RemoveHall { hall, .. } => write!(f, "delete hall {}", hall.hall_id),
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct History {
    undo: Vec<Edit>,
    redo: Vec<Edit>,
}

impl History {
    pub fn new() -> Self {
        Self::default()
    }

    /// Applies `edit` and makes it the newest undoable step.
    /// A failed edit leaves both the roster and the history untouched.
    pub fn apply(&mut self, roster: &mut Roster, edit: Edit) -> Result<(), RosterError> {
        edit.apply(roster)?;
        debug!("Applied {}", edit);
        self.undo.push(edit);
        self.redo.clear();
        Ok(())
    }

    /// Reverts the newest edit. `Ok(None)` when there is nothing to undo.
    pub fn undo(&mut self, roster: &mut Roster) -> Result<Option<Edit>, RosterError> {
        let Some(edit) = self.undo.pop() else {
            return Ok(None);
        };
        if let Err(e) = edit.inverse().apply(roster) {
            self.undo.push(edit);
            return Err(e);
        }
        debug!("Undid {}", edit);
        self.redo.push(edit.clone());
        Ok(Some(edit))
    }

    /// Re-applies the newest undone edit. `Ok(None)` when there is nothing to redo.
    pub fn redo(&mut self, roster: &mut Roster) -> Result<Option<Edit>, RosterError> {
        let Some(edit) = self.redo.pop() else {
            return Ok(None);
        };
        if let Err(e) = edit.apply(roster) {
            self.redo.push(edit);
            return Err(e);
        }
        debug!("Redid {}", edit);
        self.undo.push(edit.clone());
        Ok(Some(edit))
    }

    pub fn can_undo(&self) -> bool {
        !self.undo.is_empty()
    }

    pub fn can_redo(&self) -> bool {
        !self.redo.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn student(roll: &str, subject: &str) -> StudentRecord {
        StudentRecord::new(roll, "Name", "CSE", 5, 3, subject)
    }

    fn hall_ids(roster: &Roster) -> Vec<&str> {
        roster.halls().iter().map(|h| h.hall_id.as_str()).collect()
    }

    #[test]
    fn undo_then_redo_add() {
        let mut roster = Roster::new();
        let mut history = History::new();

        let edit = Edit::add_student(&roster, student("S1", "Math"));
        history.apply(&mut roster, edit).unwrap();
        assert_eq!(roster.students().len(), 1);

        history.undo(&mut roster).unwrap();
        assert!(roster.students().is_empty());
        assert!(history.can_redo());

        history.redo(&mut roster).unwrap();
        assert_eq!(roster.student("S1").map(|s| s.subject.as_str()), Some("Math"));
        assert!(!history.can_redo());
    }

    #[test]
    fn undo_edit_restores_previous_record() {
        let mut roster = Roster::new();
        roster.add_student(student("S1", "Math")).unwrap();
        let mut history = History::new();

        let edit = Edit::update_student(&roster, student("S1", "Physics")).unwrap();
        history.apply(&mut roster, edit).unwrap();
        assert_eq!(roster.student("S1").unwrap().subject, "Physics");

        history.undo(&mut roster).unwrap();
        assert_eq!(roster.student("S1").unwrap().subject, "Math");

        history.redo(&mut roster).unwrap();
        assert_eq!(roster.student("S1").unwrap().subject, "Physics");
    }

    #[test]
    fn undo_remove_hall_keeps_hall_order() {
        let mut roster = Roster::new();
        for id in ["H1", "H2", "H3"] {
            roster.add_hall(HallRecord::new(id, 2, 2)).unwrap();
        }
        let mut history = History::new();

        let edit = Edit::remove_hall(&roster, "H2").unwrap();
        history.apply(&mut roster, edit).unwrap();
        assert_eq!(hall_ids(&roster), vec!["H1", "H3"]);

        history.undo(&mut roster).unwrap();
        assert_eq!(hall_ids(&roster), vec!["H1", "H2", "H3"]);
    }

    #[test]
    fn new_edit_clears_redo() {
        let mut roster = Roster::new();
        let mut history = History::new();

        let edit = Edit::add_student(&roster, student("S1", "Math"));
        history.apply(&mut roster, edit).unwrap();
        history.undo(&mut roster).unwrap();

        let edit = Edit::add_student(&roster, student("S2", "Math"));
        history.apply(&mut roster, edit).unwrap();
        assert!(!history.can_redo());
        assert_eq!(history.redo(&mut roster), Ok(None));
    }

    #[test]
    fn failed_edit_is_not_recorded() {
        let mut roster = Roster::new();
        roster.add_student(student("S1", "Math")).unwrap();
        let mut history = History::new();

        let edit = Edit::add_student(&roster, student("S1", "Physics"));
        assert_eq!(
            history.apply(&mut roster, edit),
            Err(RosterError::DuplicateRoll("S1".to_string()))
        );
        assert!(!history.can_undo());
        assert_eq!(history.undo(&mut roster), Ok(None));
    }
}
