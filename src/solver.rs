use crate::data::{
    AllocationInput, AllocationResult, HallGrid, HallRecord, Neighbor, PlacementTier, Relaxation,
    SeatPosition, SharedAttribute, StudentRecord, Violation,
};
use crate::error::{ConfigurationError, DataIntegrityError};
use crate::ranking::rank;
use itertools::Itertools;
use log::{debug, info, trace, warn};
use std::collections::{HashSet, VecDeque};
use std::time::Instant;

/// Validates the input, ranks the roster and seats it hall by hall.
///
/// Duplicate roll codes abort the run. Halls with non-positive dimensions or
/// a repeated hall code are left out and reported in
/// `configuration_errors`.
pub fn allocate(input: &AllocationInput) -> Result<AllocationResult, DataIntegrityError> {
    let start_time = Instant::now();
    info!(
        "Allocating {} students across {} halls...",
        input.students.len(),
        input.halls.len()
    );

    check_unique_rolls(&input.students)?;
    let (halls, configuration_errors) = usable_halls(&input.halls);
    for error in &configuration_errors {
        warn!("Excluding hall from placement: {}", error);
    }

    let ranked = rank(input.students.clone());
    let mut result = place(ranked, &halls);
    result.configuration_errors = configuration_errors;

    let duration = start_time.elapsed();
    info!("Allocation finished in {:.2?}: {}", duration, result.summary());
    Ok(result)
}

fn check_unique_rolls(students: &[StudentRecord]) -> Result<(), DataIntegrityError> {
    let duplicates: Vec<String> = students
        .iter()
        .map(|s| s.roll.as_str())
        .duplicates()
        .sorted()
        .map(str::to_string)
        .collect();
    if duplicates.is_empty() {
        Ok(())
    } else {
        Err(DataIntegrityError::new(duplicates))
    }
}

// the first usable hall with a given code wins; unusable halls claim no code
fn usable_halls(halls: &[HallRecord]) -> (Vec<HallRecord>, Vec<ConfigurationError>) {
    let mut seen = HashSet::new();
    let mut usable = Vec::with_capacity(halls.len());
    let mut errors = Vec::new();
    for hall in halls {
        if !hall.has_valid_dimensions() {
            errors.push(ConfigurationError::InvalidDimensions {
                hall_id: hall.hall_id.clone(),
                rows: hall.rows,
                cols: hall.cols,
            });
        } else if !seen.insert(hall.hall_id.as_str()) {
            errors.push(ConfigurationError::DuplicateHall {
                hall_id: hall.hall_id.clone(),
            });
        } else {
            usable.push(hall.clone());
        }
    }
    (usable, errors)
}

/// Already seated students next to the seat being filled.
#[derive(Debug, Clone, Copy, Default)]
struct Neighbors<'a> {
    left: Option<&'a StudentRecord>,
    above: Option<&'a StudentRecord>,
}

impl<'a> Neighbors<'a> {
    fn of(seats: &'a [Vec<Option<StudentRecord>>], row: usize, col: usize) -> Self {
        Self {
            left: col
                .checked_sub(1)
                .and_then(|c| seats[row][c].as_ref()),
            above: row
                .checked_sub(1)
                .and_then(|r| seats[r][col].as_ref()),
        }
    }

    fn iter(&self) -> impl Iterator<Item = (Neighbor, &'a StudentRecord)> {
        [(Neighbor::Left, self.left), (Neighbor::Above, self.above)]
            .into_iter()
            .filter_map(|(side, student)| student.map(|s| (side, s)))
    }

    fn admit(&self, candidate: &StudentRecord, tier: PlacementTier) -> bool {
        self.iter().all(|(_, neighbor)| tier.permits(candidate, neighbor))
    }

    fn violations(&self, student: &StudentRecord) -> Vec<Violation> {
        let mut violations = Vec::new();
        for (side, neighbor) in self.iter() {
            if neighbor.branch == student.branch {
                violations.push(Violation {
                    neighbor: side,
                    attribute: SharedAttribute::Branch,
                    neighbor_roll: neighbor.roll.clone(),
                });
            }
            if neighbor.subject == student.subject {
                violations.push(Violation {
                    neighbor: side,
                    attribute: SharedAttribute::Subject,
                    neighbor_roll: neighbor.roll.clone(),
                });
            }
        }
        violations
    }
}

/// Picks the queue index of the student for the next seat.
///
/// Each tier scans the whole queue head-first before the next, weaker tier
/// is tried. Returns `None` only when the queue is empty.
fn select_candidate(
    queue: &VecDeque<StudentRecord>,
    neighbors: &Neighbors<'_>,
) -> Option<(usize, PlacementTier)> {
    if queue.is_empty() {
        return None;
    }
    [PlacementTier::Hard, PlacementTier::Soft]
        .into_iter()
        .find_map(|tier| {
            queue
                .iter()
                .position(|candidate| neighbors.admit(candidate, tier))
                .map(|index| (index, tier))
        })
        .or(Some((0, PlacementTier::Fallback)))
}

/// Seats ranked students into halls, in hall order, each hall row-major.
///
/// Every seat is filled while students remain; the weakest tier needed is
/// recorded as a relaxation. Students left over once all seats are taken are
/// returned in `unplaced`, still in ranked order.
pub fn place(ranked: Vec<StudentRecord>, halls: &[HallRecord]) -> AllocationResult {
    let mut queue: VecDeque<StudentRecord> = ranked.into();
    let mut grids = Vec::with_capacity(halls.len());
    let mut relaxations = Vec::new();

    for hall in halls {
        let mut grid = HallGrid::empty(hall);
        trace!(
            "Filling hall {} with {} seats, {} students waiting.",
            hall.hall_id,
            grid.capacity(),
            queue.len()
        );

        'fill: for row in 0..grid.rows {
            for col in 0..grid.cols {
                let neighbors = Neighbors::of(&grid.seats, row, col);
                let Some((index, tier)) = select_candidate(&queue, &neighbors) else {
                    break 'fill;
                };
                let Some(student) = queue.remove(index) else {
                    break 'fill;
                };

                if tier.is_relaxed() {
                    let relaxation = Relaxation {
                        seat: SeatPosition {
                            hall_id: hall.hall_id.clone(),
                            row,
                            col,
                        },
                        roll: student.roll.clone(),
                        tier,
                        violations: neighbors.violations(&student),
                    };
                    trace!("{}", relaxation);
                    relaxations.push(relaxation);
                }
                grid.seats[row][col] = Some(student);
            }
        }

        debug!(
            "Hall {} seated {}/{}.",
            grid.hall_id,
            grid.placed_count(),
            grid.capacity()
        );
        grids.push(grid);
    }

    if !queue.is_empty() {
        warn!(
            "{} students could not be seated: capacity exhausted.",
            queue.len()
        );
    }

    // build the final output
    AllocationResult {
        grids,
        unplaced: queue.into(),
        relaxations,
        configuration_errors: Vec::new(),
    }
}
