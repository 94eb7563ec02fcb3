use crate::data::{Session, Teacher, TeacherName};
use log::trace;
use std::collections::BTreeSet;

/// Teachers free at each session's slot, indexed like the session list.
///
/// Built once per solve and shared by the conflict analysis and the model so
/// both see exactly the same availability.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AvailabilityIndex {
    per_session: Vec<BTreeSet<TeacherName>>,
}

impl AvailabilityIndex {
    pub fn build(sessions: &[Session], teachers: &[Teacher]) -> Self {
        let per_session = sessions
            .iter()
            .enumerate()
            .map(|(i, session)| {
                let available: BTreeSet<TeacherName> = teachers
                    .iter()
                    .filter(|t| t.is_available(&session.time_slot))
                    .map(|t| t.name.clone())
                    .collect();
                trace!(
                    "Session {} ({} at {}): available teachers {:?}",
                    i, session.id, session.time_slot, available
                );
                available
            })
            .collect();
        Self { per_session }
    }

    pub fn available(&self, session: usize) -> &BTreeSet<TeacherName> {
        &self.per_session[session]
    }

    pub fn is_available(&self, session: usize, teacher: &str) -> bool {
        self.per_session[session].contains(teacher)
    }

    /// Teachers free at every one of the given sessions.
    pub fn intersection(&self, sessions: &[usize]) -> BTreeSet<TeacherName> {
        let mut iter = sessions.iter();
        let Some(first) = iter.next() else {
            return BTreeSet::new();
        };
        iter.fold(self.available(*first).clone(), |acc, &i| {
            acc.intersection(&self.per_session[i]).cloned().collect()
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sessions() -> Vec<Session> {
        vec![
            Session::new("Algebra_1", "Algebra", "Ada", "Monday 9-10"),
            Session::new("Algebra_1", "Algebra", "Ada", "Wednesday 9-10"),
        ]
    }

    #[test]
    fn lists_teachers_covering_the_slot() {
        let teachers = vec![
            Teacher::new("Ada", ["Monday 9-10"]),
            Teacher::new("Grace", ["Monday 9-10", "Wednesday 9-10"]),
        ];
        let index = AvailabilityIndex::build(&sessions(), &teachers);
        assert!(index.is_available(0, "Ada"));
        assert!(!index.is_available(1, "Ada"));
        assert_eq!(
            index.available(1).iter().collect::<Vec<_>>(),
            vec!["Grace"]
        );
    }

    #[test]
    fn intersection_narrows_across_sessions() {
        let teachers = vec![
            Teacher::new("Ada", ["Monday 9-10"]),
            Teacher::new("Grace", ["Monday 9-10", "Wednesday 9-10"]),
        ];
        let index = AvailabilityIndex::build(&sessions(), &teachers);
        let common = index.intersection(&[0, 1]);
        assert_eq!(common.into_iter().collect::<Vec<_>>(), vec!["Grace"]);
        assert!(index.intersection(&[]).is_empty());
    }
}
