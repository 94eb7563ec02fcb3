use std::fmt::Write;

use itertools::Itertools;

use crate::data::{Assignment, Conflict, Session};
use crate::ingest::{teacher_options, unique_course_names};

const DAY_ORDER: [&str; 6] = [
    "Monday",
    "Tuesday",
    "Wednesday",
    "Thursday",
    "Friday",
    "Saturday",
];

/// Groups assignments by the leading token of their time slot, in first-seen
/// order of days and of assignments within a day.
pub fn group_by_day(assignments: &[Assignment]) -> Vec<(String, Vec<&Assignment>)> {
    let mut days: Vec<(String, Vec<&Assignment>)> = Vec::new();
    for assignment in assignments {
        let day = assignment
            .time_slot
            .split_whitespace()
            .next()
            .unwrap_or_default();
        match days.iter_mut().find(|(d, _)| d == day) {
            Some((_, entries)) => entries.push(assignment),
            None => days.push((day.to_string(), vec![assignment])),
        }
    }
    days
}

/// The weekly schedule, Monday through Saturday, followed by any other day
/// labels the timetable used.
pub fn render_schedule(assignments: &[Assignment]) -> String {
    let grouped = group_by_day(assignments);
    let extra_days = grouped
        .iter()
        .map(|(day, _)| day.as_str())
        .filter(|day| !DAY_ORDER.contains(day));
    let mut output = String::new();

    let _ = writeln!(output, "--- Final Weekly Schedule ---");
    for day in DAY_ORDER.into_iter().chain(extra_days) {
        let _ = writeln!(output, "\n--- {} ---", day);
        match grouped.iter().find(|(d, _)| d == day) {
            Some((_, entries)) => {
                for (idx, assignment) in entries.iter().enumerate() {
                    let _ = writeln!(
                        output,
                        "{}) {} at {} -> Teacher: {}",
                        idx + 1,
                        assignment.course_name,
                        assignment.time_slot,
                        assignment.teacher_name
                    );
                }
            }
            None => {
                let _ = writeln!(output, "No classes scheduled.");
            }
        }
    }
    output
}

pub fn render_conflicts(conflicts: &[Conflict]) -> String {
    let mut output = String::new();
    if conflicts.is_empty() {
        let _ = writeln!(output, "No scheduling conflicts detected.");
        return output;
    }

    let _ = writeln!(output, "Conflicts detected during scheduling:");
    for conflict in conflicts {
        let _ = match conflict {
            Conflict::PreferredUnavailable {
                course,
                preferred_teacher,
                alternatives,
                message,
            } => {
                let alternatives = if alternatives.is_empty() {
                    "No alternatives available".to_string()
                } else {
                    alternatives.iter().join(", ")
                };
                writeln!(
                    output,
                    "- For course '{}': Preferred teacher '{}' could not be assigned. {} Alternatives: {}.",
                    course, preferred_teacher, message, alternatives
                )
            }
            Conflict::NoTeachersAvailable { course, message } => {
                writeln!(output, "- For course '{}': {}", course, message)
            }
            Conflict::InvalidData {
                entity,
                missing_fields,
            } => writeln!(
                output,
                "- {} missing fields: {}",
                entity,
                missing_fields.join(", ")
            ),
            Conflict::SystemError { message } => {
                writeln!(output, "- Scheduling failed: {}", message)
            }
        };
    }
    output
}

/// Every course in the timetable with the teachers recorded for it.
pub fn render_courses(sessions: &[Session]) -> String {
    let mut output = String::new();
    let _ = writeln!(output, "Available courses:");
    for (idx, course) in unique_course_names(sessions).iter().enumerate() {
        let teachers = teacher_options(sessions, course);
        let _ = writeln!(
            output,
            "{}. {} (teachers: {})",
            idx + 1,
            course,
            teachers.iter().join(", ")
        );
    }
    output
}
