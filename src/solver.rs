use crate::availability::AvailabilityIndex;
use crate::config::{Backend, SolverConfig};
use crate::conflicts::{Analysis, GroupAnalysis, analyze};
use crate::data::{
    Assignment, SchedulingInput, Session, SessionRecord, SolveResult, SolveStatus, Teacher,
    TeacherName, TeacherRecord,
};
use crate::grouping::group_sessions;
use crate::model;
use crate::validate::{validate, validate_input};
use log::{debug, info, warn};
use std::cmp::Reverse;
use std::fmt;
use std::time::Instant;

/// Failures past the pre-check. All of them surface as a `SystemError`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SolveError {
    TimeLimitExceeded,
    NoSolution(String),
    InvalidSolution(String),
}

impl fmt::Display for SolveError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SolveError::TimeLimitExceeded => write!(f, "time limit exceeded"),
            SolveError::NoSolution(message) => write!(f, "{}", message),
            SolveError::InvalidSolution(message) => {
                write!(f, "Solver returned an invalid assignment: {}", message)
            }
        }
    }
}

impl std::error::Error for SolveError {}

/// Solves a request payload, including the check for missing collections.
pub fn solve_input(input: &SchedulingInput, config: &SolverConfig) -> SolveResult {
    match validate_input(input) {
        Ok(validated) => solve_validated(&validated.sessions, &validated.teachers, config),
        Err(conflicts) => SolveResult::infeasible(conflicts),
    }
}

/// Assigns one teacher to every session, preferring each course's recorded
/// teacher. Never fails: every problem is reported through the result.
pub fn solve(
    sessions: &[SessionRecord],
    teachers: &[TeacherRecord],
    config: &SolverConfig,
) -> SolveResult {
    match validate(sessions, teachers) {
        Ok(validated) => solve_validated(&validated.sessions, &validated.teachers, config),
        Err(conflicts) => SolveResult::infeasible(conflicts),
    }
}

pub fn solve_validated(
    sessions: &[Session],
    teachers: &[Teacher],
    config: &SolverConfig,
) -> SolveResult {
    let start_time = Instant::now();
    let deadline = config
        .time_limit
        .and_then(|limit| start_time.checked_add(limit));
    info!(
        "Solving {} sessions with {} teachers using the {:?} backend",
        sessions.len(),
        teachers.len(),
        config.backend
    );

    let index = AvailabilityIndex::build(sessions, teachers);
    let groups = group_sessions(sessions);
    let analysis = analyze(sessions, &index, &groups);
    for conflict in &analysis.conflicts {
        debug!("{}", conflict);
    }

    if analysis.is_hard_infeasible() {
        info!("Pre-check found course groups without any assignable teacher");
        return SolveResult::infeasible(analysis.conflicts);
    }

    let chosen = match config.backend {
        Backend::Decomposed => resolve_groups(sessions, &analysis, deadline),
        Backend::Ilp => {
            model::solve_model(sessions, teachers, &index, &analysis, config.time_limit)
        }
    };
    let chosen = match chosen {
        Ok(chosen) => chosen,
        Err(e) => {
            warn!("Solve failed: {}", e);
            return SolveResult::error(e.to_string(), analysis.conflicts);
        }
    };

    let result = assemble(sessions, analysis, &chosen);
    info!(
        "Solved in {:.2?}: {} of {} sessions with their preferred teacher ({:?})",
        start_time.elapsed(),
        result.preferred_count(),
        result.assignments.len(),
        result.status
    );
    result
}

/// Closed-form optimum: groups share no decision variables, so each one takes
/// the candidate matching the most of its sessions' preferences.
fn resolve_groups(
    sessions: &[Session],
    analysis: &Analysis,
    deadline: Option<Instant>,
) -> Result<Vec<TeacherName>, SolveError> {
    analysis
        .groups
        .iter()
        .map(|group| {
            if deadline.is_some_and(|d| Instant::now() >= d) {
                return Err(SolveError::TimeLimitExceeded);
            }
            pick_teacher(sessions, group).ok_or_else(|| {
                SolveError::NoSolution(format!(
                    "No feasible solution found for course {}",
                    group.group.id
                ))
            })
        })
        .collect()
}

// Most matches wins; ties go to the group's own preference, then to the lowest
// name since candidates iterate in name order and min_by_key keeps the first.
fn pick_teacher(sessions: &[Session], group: &GroupAnalysis) -> Option<TeacherName> {
    let teacher = group.candidates.iter().min_by_key(|candidate| {
        (
            Reverse(group.matches(sessions, candidate)),
            **candidate != group.preferred,
        )
    })?;
    debug!("Course '{}' -> {}", group.group.id, teacher);
    Some(teacher.clone())
}

fn assemble(sessions: &[Session], analysis: Analysis, chosen: &[TeacherName]) -> SolveResult {
    let mut teacher_of: Vec<Option<&TeacherName>> = vec![None; sessions.len()];
    for (group, teacher) in analysis.groups.iter().zip(chosen) {
        for &i in &group.group.members {
            teacher_of[i] = Some(teacher);
        }
    }

    let assignments: Option<Vec<Assignment>> = sessions
        .iter()
        .zip(&teacher_of)
        .map(|(session, teacher)| {
            teacher.map(|teacher| Assignment {
                course_name: session.course_name.clone(),
                teacher_name: teacher.clone(),
                time_slot: session.time_slot.clone(),
                preferred: *teacher == session.preferred_teacher,
            })
        })
        .collect();
    let Some(assignments) = assignments else {
        return SolveResult::error(
            "Solver left sessions without a teacher",
            analysis.conflicts,
        );
    };

    let achieved = assignments.iter().filter(|a| a.preferred).count();
    let status = if achieved >= analysis.preferred_upper_bound(sessions) {
        SolveStatus::Optimal
    } else {
        SolveStatus::Feasible
    };

    SolveResult {
        feasible: true,
        assignments,
        conflicts: analysis.conflicts,
        status,
    }
}
