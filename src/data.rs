use crate::error::ConfigurationError;
use itertools::Itertools;
use serde::{Deserialize, Serialize};
use std::fmt;

// Type aliases for clarity
pub type Roll = String;
pub type HallId = String;

/// A single exam-taker. The roll code is the primary key.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StudentRecord {
    pub roll: Roll,
    pub name: String,
    pub branch: String,
    pub semester: u32,
    pub year: u32,
    pub subject: String,
}

impl StudentRecord {
    pub fn new(
        roll: impl Into<Roll>,
        name: impl Into<String>,
        branch: impl Into<String>,
        semester: u32,
        year: u32,
        subject: impl Into<String>,
    ) -> Self {
        Self {
            roll: roll.into(),
            name: name.into(),
            branch: branch.into(),
            semester,
            year,
            subject: subject.into(),
        }
    }
}

impl fmt::Display for StudentRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} - {}", self.roll, self.name)
    }
}

/// A physical exam room laid out as a `rows x cols` grid of seats.
///
/// Dimensions are signed so that bad input can be reported instead of
/// rejected at deserialization time.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HallRecord {
    pub hall_id: HallId,
    pub rows: i32,
    pub cols: i32,
}

impl HallRecord {
    pub fn new(hall_id: impl Into<HallId>, rows: i32, cols: i32) -> Self {
        Self {
            hall_id: hall_id.into(),
            rows,
            cols,
        }
    }

    pub fn has_valid_dimensions(&self) -> bool {
        self.rows > 0 && self.cols > 0
    }

    /// Grid shape with negative dimensions clamped to zero.
    pub fn shape(&self) -> (usize, usize) {
        (self.rows.max(0) as usize, self.cols.max(0) as usize)
    }

    pub fn capacity(&self) -> usize {
        let (rows, cols) = self.shape();
        rows * cols
    }
}

impl fmt::Display for HallRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({}x{})", self.hall_id, self.rows, self.cols)
    }
}

/// The complete input for one allocation run.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AllocationInput {
    #[serde(default)]
    pub students: Vec<StudentRecord>,
    #[serde(default)]
    pub halls: Vec<HallRecord>,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SeatPosition {
    pub hall_id: HallId,
    pub row: usize,
    pub col: usize,
}

impl fmt::Display for SeatPosition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}[{},{}]", self.hall_id, self.row, self.col)
    }
}

/// Which constraint tier admitted the student placed in a seat.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, PartialOrd, Ord)]
#[serde(rename_all = "camelCase")]
pub enum PlacementTier {
    /// Branch and subject both differ from every placed neighbor.
    Hard,
    /// Only the subject differs.
    Soft,
    /// No constraint held.
    Fallback,
}

impl PlacementTier {
    /// Whether `candidate` may sit next to `neighbor` under this tier.
    pub fn permits(self, candidate: &StudentRecord, neighbor: &StudentRecord) -> bool {
        match self {
            PlacementTier::Hard => {
                candidate.branch != neighbor.branch && candidate.subject != neighbor.subject
            }
            PlacementTier::Soft => candidate.subject != neighbor.subject,
            PlacementTier::Fallback => true,
        }
    }

    pub fn is_relaxed(self) -> bool {
        self != PlacementTier::Hard
    }
}

impl fmt::Display for PlacementTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            PlacementTier::Hard => "hard",
            PlacementTier::Soft => "soft",
            PlacementTier::Fallback => "fallback",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum Neighbor {
    Left,
    Above,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum SharedAttribute {
    Branch,
    Subject,
}

/// A neighbor that shares an attribute with the seated student.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Violation {
    pub neighbor: Neighbor,
    pub attribute: SharedAttribute,
    pub neighbor_roll: Roll,
}

impl fmt::Display for Violation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let neighbor = match self.neighbor {
            Neighbor::Left => "left",
            Neighbor::Above => "above",
        };
        let attribute = match self.attribute {
            SharedAttribute::Branch => "branch",
            SharedAttribute::Subject => "subject",
        };
        write!(f, "same {} as {} neighbor {}", attribute, neighbor, self.neighbor_roll)
    }
}

/// Audit entry for a seat filled below the hard tier.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Relaxation {
    pub seat: SeatPosition,
    pub roll: Roll,
    pub tier: PlacementTier,
    pub violations: Vec<Violation>,
}

impl fmt::Display for Relaxation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "[{}] {} placed at {} despite {}",
            self.tier,
            self.roll,
            self.seat,
            self.violations.iter().join(", ")
        )
    }
}

/// Seating for one hall. `seats` is always exactly `rows x cols`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HallGrid {
    pub hall_id: HallId,
    pub rows: usize,
    pub cols: usize,
    pub seats: Vec<Vec<Option<StudentRecord>>>,
}

impl HallGrid {
    pub fn empty(hall: &HallRecord) -> Self {
        let (rows, cols) = hall.shape();
        Self {
            hall_id: hall.hall_id.clone(),
            rows,
            cols,
            seats: vec![vec![None; cols]; rows],
        }
    }

    pub fn get(&self, row: usize, col: usize) -> Option<&StudentRecord> {
        self.seats.get(row)?.get(col)?.as_ref()
    }

    pub fn capacity(&self) -> usize {
        self.rows * self.cols
    }

    /// Placed students with their coordinates, row-major.
    pub fn placed(&self) -> impl Iterator<Item = (usize, usize, &StudentRecord)> {
        self.seats.iter().enumerate().flat_map(|(row, line)| {
            line.iter()
                .enumerate()
                .filter_map(move |(col, seat)| seat.as_ref().map(|s| (row, col, s)))
        })
    }

    pub fn placed_count(&self) -> usize {
        self.placed().count()
    }
}

impl fmt::Display for HallGrid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Hall: {} ({}x{})", self.hall_id, self.rows, self.cols)?;
        let width = self
            .placed()
            .map(|(_, _, s)| s.roll.len())
            .max()
            .unwrap_or(0)
            .max("Empty".len());
        for line in &self.seats {
            let cells = line
                .iter()
                .map(|seat| {
                    let label = seat.as_ref().map_or("Empty", |s| s.roll.as_str());
                    format!("{:<width$}", label, width = width)
                })
                .join(" | ");
            writeln!(f, "{}", cells.trim_end())?;
        }
        Ok(())
    }
}

/// The final output of an allocation run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AllocationResult {
    pub grids: Vec<HallGrid>,
    pub unplaced: Vec<StudentRecord>,
    pub relaxations: Vec<Relaxation>,
    pub configuration_errors: Vec<ConfigurationError>,
}

impl AllocationResult {
    pub fn grid(&self, hall_id: &str) -> Option<&HallGrid> {
        self.grids.iter().find(|g| g.hall_id == hall_id)
    }

    pub fn placed_count(&self) -> usize {
        self.grids.iter().map(HallGrid::placed_count).sum()
    }

    pub fn total_seats(&self) -> usize {
        self.grids.iter().map(HallGrid::capacity).sum()
    }

    pub fn seat_of(&self, roll: &str) -> Option<SeatPosition> {
        self.grids.iter().find_map(|grid| {
            grid.placed()
                .find(|(_, _, s)| s.roll == roll)
                .map(|(row, col, _)| SeatPosition {
                    hall_id: grid.hall_id.clone(),
                    row,
                    col,
                })
        })
    }

    /// Students seated in a hall, row-major. Empty for unknown halls.
    pub fn students_in_hall(&self, hall_id: &str) -> Vec<&StudentRecord> {
        self.grid(hall_id)
            .map(|grid| grid.placed().map(|(_, _, s)| s).collect())
            .unwrap_or_default()
    }

    pub fn summary(&self) -> AllocationSummary {
        AllocationSummary::from_result(self)
    }
}

/// Headline numbers of an allocation run.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AllocationSummary {
    pub total_students: usize,
    pub placed: usize,
    pub unplaced: usize,
    pub total_seats: usize,
    pub occupancy: f64,
    pub soft_relaxations: usize,
    pub fallback_relaxations: usize,
    pub excluded_halls: usize,
}

impl AllocationSummary {
    pub fn from_result(result: &AllocationResult) -> Self {
        let placed = result.placed_count();
        let total_seats = result.total_seats();
        let counts = result.relaxations.iter().counts_by(|r| r.tier);
        Self {
            total_students: placed + result.unplaced.len(),
            placed,
            unplaced: result.unplaced.len(),
            total_seats,
            occupancy: if total_seats == 0 {
                0.0
            } else {
                placed as f64 / total_seats as f64
            },
            soft_relaxations: counts.get(&PlacementTier::Soft).copied().unwrap_or(0),
            fallback_relaxations: counts.get(&PlacementTier::Fallback).copied().unwrap_or(0),
            excluded_halls: result.configuration_errors.len(),
        }
    }
}

impl fmt::Display for AllocationSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "placed {}/{} students in {} seats ({:.1}% occupancy), {} unplaced, {} soft and {} fallback relaxations, {} halls excluded",
            self.placed,
            self.total_students,
            self.total_seats,
            self.occupancy * 100.0,
            self.unplaced,
            self.soft_relaxations,
            self.fallback_relaxations,
            self.excluded_halls
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn student(roll: &str, branch: &str, subject: &str) -> StudentRecord {
        StudentRecord::new(roll, "Name", branch, 5, 3, subject)
    }

    #[test]
    fn tiers_permit_progressively_more() {
        let a = student("S1", "CSE", "Math");
        let same_branch = student("S2", "CSE", "Physics");
        let same_subject = student("S3", "ECE", "Math");
        let different = student("S4", "ECE", "Physics");

        assert!(PlacementTier::Hard.permits(&different, &a));
        assert!(!PlacementTier::Hard.permits(&same_branch, &a));
        assert!(!PlacementTier::Hard.permits(&same_subject, &a));

        assert!(PlacementTier::Soft.permits(&same_branch, &a));
        assert!(!PlacementTier::Soft.permits(&same_subject, &a));

        assert!(PlacementTier::Fallback.permits(&same_subject, &a));
    }

    #[test]
    fn grid_shape_follows_hall_and_clamps_negatives() {
        let grid = HallGrid::empty(&HallRecord::new("H1", 3, 2));
        assert_eq!(grid.seats.len(), 3);
        assert!(grid.seats.iter().all(|row| row.len() == 2));
        assert_eq!(grid.capacity(), 6);

        let degenerate = HallRecord::new("H2", -1, 4);
        assert_eq!(degenerate.capacity(), 0);
        assert!(!degenerate.has_valid_dimensions());
        assert_eq!(HallGrid::empty(&degenerate).seats.len(), 0);
    }

    #[test]
    fn chart_prints_rolls_and_empty_seats() {
        let mut grid = HallGrid::empty(&HallRecord::new("H1", 1, 2));
        grid.seats[0][0] = Some(student("S001", "CSE", "Math"));
        let chart = grid.to_string();
        assert_eq!(chart, "Hall: H1 (1x2)\nS001  | Empty\n");
    }

    #[test]
    fn summary_handles_no_seats() {
        let result = AllocationResult {
            unplaced: vec![student("S1", "CSE", "Math")],
            ..Default::default()
        };
        let summary = result.summary();
        assert_eq!(summary.total_students, 1);
        assert_eq!(summary.total_seats, 0);
        assert_eq!(summary.occupancy, 0.0);
    }

    #[test]
    fn relaxation_message_lists_violations() {
        let relaxation = Relaxation {
            seat: SeatPosition {
                hall_id: "H1".to_string(),
                row: 0,
                col: 1,
            },
            roll: "S2".to_string(),
            tier: PlacementTier::Fallback,
            violations: vec![Violation {
                neighbor: Neighbor::Left,
                attribute: SharedAttribute::Subject,
                neighbor_roll: "S1".to_string(),
            }],
        };
        assert_eq!(
            relaxation.to_string(),
            "[fallback] S2 placed at H1[0,1] despite same subject as left neighbor S1"
        );
    }
}
