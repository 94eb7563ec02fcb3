use crate::availability::AvailabilityIndex;
use crate::data::{Conflict, Session, TeacherName};
use crate::grouping::CourseGroup;
use itertools::Itertools;
use log::{debug, trace};
use std::collections::BTreeSet;

/// What the pre-check learned about one course group.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GroupAnalysis {
    pub group: CourseGroup,
    /// Teachers already recorded for this course who are free for every
    /// session of the group. Sorted, so iteration order is stable.
    pub candidates: BTreeSet<TeacherName>,
    /// Preference of the group's first session.
    pub preferred: TeacherName,
}

impl GroupAnalysis {
    pub fn is_hard_infeasible(&self) -> bool {
        self.candidates.is_empty()
    }

    /// Sessions of this group that would be matched if `teacher` taught it.
    pub fn matches(&self, sessions: &[Session], teacher: &str) -> usize {
        self.group
            .members
            .iter()
            .filter(|&&i| sessions[i].preferred_teacher == teacher)
            .count()
    }

    /// Best preferred-match count any candidate can reach for this group.
    pub fn best_matches(&self, sessions: &[Session]) -> usize {
        self.candidates
            .iter()
            .map(|c| self.matches(sessions, c))
            .max()
            .unwrap_or(0)
    }
}

#[derive(Debug, Clone, Default)]
pub struct Analysis {
    pub groups: Vec<GroupAnalysis>,
    pub conflicts: Vec<Conflict>,
}

impl Analysis {
    /// A single group without candidates vetoes the whole solve.
    pub fn is_hard_infeasible(&self) -> bool {
        self.groups.iter().any(GroupAnalysis::is_hard_infeasible)
    }

    /// Upper bound on the objective given the candidate sets.
    pub fn preferred_upper_bound(&self, sessions: &[Session]) -> usize {
        self.groups.iter().map(|g| g.best_matches(sessions)).sum()
    }
}

/// Runs the feasibility pre-check over every group, in group order.
pub fn analyze(
    sessions: &[Session],
    index: &AvailabilityIndex,
    groups: &[CourseGroup],
) -> Analysis {
    let mut analysis = Analysis::default();

    for group in groups {
        let first = &sessions[group.representative()];
        let default_teachers: BTreeSet<TeacherName> = group
            .members
            .iter()
            .map(|&i| sessions[i].preferred_teacher.clone())
            .collect();
        let intersection = index.intersection(&group.members);
        let candidates: BTreeSet<TeacherName> =
            default_teachers.intersection(&intersection).cloned().collect();

        trace!(
            "Course '{}': default teachers {:?}, intersection {:?}, candidates {:?}",
            group.id, default_teachers, intersection, candidates
        );

        let preferred = first.preferred_teacher.clone();
        if candidates.is_empty() {
            debug!("Course '{}' has no assignable teacher", group.id);
            analysis.conflicts.push(Conflict::NoTeachersAvailable {
                course: first.course_name.clone(),
                message: format!(
                    "No teachers available for {} (ID: {}) across all sessions.",
                    first.course_name, group.id
                ),
            });
        } else if !candidates.contains(&preferred) {
            let alternatives: Vec<TeacherName> = candidates.iter().cloned().collect();
            analysis.conflicts.push(Conflict::PreferredUnavailable {
                course: first.course_name.clone(),
                preferred_teacher: preferred.clone(),
                message: format!(
                    "Preferred teacher {} not available for {} (ID: {}). Alternatives: {}.",
                    preferred,
                    first.course_name,
                    group.id,
                    alternatives.iter().join(", ")
                ),
                alternatives,
            });
        }

        analysis.groups.push(GroupAnalysis {
            group: group.clone(),
            candidates,
            preferred,
        });
    }

    analysis
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::Teacher;
    use crate::grouping::group_sessions;

    fn run(sessions: &[Session], teachers: &[Teacher]) -> Analysis {
        let index = AvailabilityIndex::build(sessions, teachers);
        let groups = group_sessions(sessions);
        analyze(sessions, &index, &groups)
    }

    #[test]
    fn candidates_exclude_unrelated_available_teachers() {
        let sessions = vec![Session::new("Bio_1", "Bio", "Ada", "Monday 9-10")];
        let teachers = vec![
            Teacher::new("Ada", ["Monday 9-10"]),
            Teacher::new("Zed", ["Monday 9-10"]),
        ];
        let analysis = run(&sessions, &teachers);
        assert!(analysis.conflicts.is_empty());
        assert_eq!(
            analysis.groups[0].candidates.iter().collect::<Vec<_>>(),
            vec!["Ada"]
        );
    }

    #[test]
    fn preferred_missing_a_slot_yields_sorted_alternatives() {
        let sessions = vec![
            Session::new("Bio_1", "Bio", "Ada", "Monday 9-10"),
            Session::new("Bio_1", "Bio", "Grace", "Wednesday 9-10"),
            Session::new("Bio_1", "Bio", "Bob", "Friday 9-10"),
        ];
        let all = ["Monday 9-10", "Wednesday 9-10", "Friday 9-10"];
        let teachers = vec![
            Teacher::new("Ada", ["Monday 9-10"]),
            Teacher::new("Grace", all),
            Teacher::new("Bob", all),
        ];
        let analysis = run(&sessions, &teachers);
        assert!(!analysis.is_hard_infeasible());
        match &analysis.conflicts[..] {
            [Conflict::PreferredUnavailable {
                preferred_teacher,
                alternatives,
                message,
                ..
            }] => {
                assert_eq!(preferred_teacher, "Ada");
                assert_eq!(alternatives, &["Bob", "Grace"]);
                assert_eq!(
                    message,
                    "Preferred teacher Ada not available for Bio (ID: Bio_1). Alternatives: Bob, Grace."
                );
            }
            other => panic!("unexpected conflicts {other:?}"),
        }
    }

    #[test]
    fn empty_candidates_mark_the_group_hard_infeasible() {
        let sessions = vec![Session::new("Bio_1", "Bio", "Ada", "Monday 9-10")];
        let teachers = vec![Teacher::new("Ada", ["Tuesday 9-10"])];
        let analysis = run(&sessions, &teachers);
        assert!(analysis.is_hard_infeasible());
        assert_eq!(
            analysis.conflicts,
            vec![Conflict::NoTeachersAvailable {
                course: "Bio".to_string(),
                message: "No teachers available for Bio (ID: Bio_1) across all sessions."
                    .to_string(),
            }]
        );
    }

    #[test]
    fn upper_bound_counts_disagreeing_preferences() {
        let sessions = vec![
            Session::new("Bio_1", "Bio", "Ada", "Monday 9-10"),
            Session::new("Bio_1", "Bio", "Grace", "Monday 9-10"),
            Session::new("Bio_1", "Bio", "Grace", "Monday 9-10"),
        ];
        let teachers = vec![
            Teacher::new("Ada", ["Monday 9-10"]),
            Teacher::new("Grace", ["Monday 9-10"]),
        ];
        let analysis = run(&sessions, &teachers);
        assert_eq!(analysis.preferred_upper_bound(&sessions), 2);
    }
}
