use crate::data::StudentRecord;
use itertools::Itertools;
use log::debug;
use std::collections::VecDeque;

fn rank_key(student: &StudentRecord) -> (&str, &str, &str) {
    (
        student.subject.as_str(),
        student.branch.as_str(),
        student.roll.as_str(),
    )
}

/// Orders students for placement.
///
/// Students are sorted by `(subject, branch, roll)` and then dealt out one
/// subject at a time in rotation, so consecutive entries rarely share a
/// subject. The output depends only on the input multiset, not its order.
pub fn rank(students: Vec<StudentRecord>) -> Vec<StudentRecord> {
    let total = students.len();

    // subject groups, in subject order
    let mut groups: Vec<VecDeque<StudentRecord>> = Vec::new();
    for student in students
        .into_iter()
        .sorted_by(|a, b| rank_key(a).cmp(&rank_key(b)))
    {
        match groups.last_mut() {
            Some(group) if group.back().is_some_and(|last| last.subject == student.subject) => {
                group.push_back(student)
            }
            _ => groups.push(VecDeque::from([student])),
        }
    }
    debug!(
        "Ranking {} students across {} subject groups.",
        total,
        groups.len()
    );

    // round robin
    let mut ranked = Vec::with_capacity(total);
    while ranked.len() < total {
        for group in groups.iter_mut() {
            if let Some(student) = group.pop_front() {
                ranked.push(student);
            }
        }
    }
    ranked
}
