use crate::data::{SectionId, Session};
use log::trace;
use std::collections::HashMap;

/// Sessions of one course section; they must all get the same teacher.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CourseGroup {
    pub id: SectionId,
    /// Session indices in input order. Never empty.
    pub members: Vec<usize>,
}

impl CourseGroup {
    /// The session whose preference speaks for the whole group.
    pub fn representative(&self) -> usize {
        self.members[0]
    }
}

/// Partitions sessions by section id, keeping first-seen order of groups and
/// of members inside each group.
pub fn group_sessions(sessions: &[Session]) -> Vec<CourseGroup> {
    let mut groups: Vec<CourseGroup> = Vec::new();
    let mut position: HashMap<&str, usize> = HashMap::new();

    for (i, session) in sessions.iter().enumerate() {
        match position.get(session.id.as_str()) {
            Some(&g) => groups[g].members.push(i),
            None => {
                position.insert(session.id.as_str(), groups.len());
                groups.push(CourseGroup {
                    id: session.id.clone(),
                    members: vec![i],
                });
            }
        }
    }

    for group in &groups {
        trace!("Course '{}': sessions {:?}", group.id, group.members);
    }
    groups
}
