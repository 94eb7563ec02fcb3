use crate::data::{Session, TeacherName};
use log::{debug, warn};
use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

/// A chosen course and the teacher the student would like for it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Preference {
    pub course_name: String,
    pub teacher: TeacherName,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsePreferenceError(String);

impl fmt::Display for ParsePreferenceError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "expected \"<Course Name>=<Teacher>\", got \"{}\"",
            self.0
        )
    }
}

impl std::error::Error for ParsePreferenceError {}

impl FromStr for Preference {
    type Err = ParsePreferenceError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (course, teacher) = s
            .split_once('=')
            .ok_or_else(|| ParsePreferenceError(s.to_string()))?;
        let (course, teacher) = (course.trim(), teacher.trim());
        if course.is_empty() || teacher.is_empty() {
            return Err(ParsePreferenceError(s.to_string()));
        }
        Ok(Preference {
            course_name: course.to_string(),
            teacher: teacher.to_string(),
        })
    }
}

/// Keeps only the sessions of selected courses and sets their preferred
/// teacher to the one chosen. Course names match case-insensitively; a later
/// preference for the same course replaces an earlier one.
pub fn apply_preferences(sessions: Vec<Session>, preferences: &[Preference]) -> Vec<Session> {
    let chosen: HashMap<String, &TeacherName> = preferences
        .iter()
        .map(|p| (p.course_name.to_lowercase(), &p.teacher))
        .collect();

    let selected: Vec<Session> = sessions
        .into_iter()
        .filter_map(|mut session| {
            let teacher = chosen.get(&session.course_name.trim().to_lowercase())?;
            session.preferred_teacher = (*teacher).clone();
            Some(session)
        })
        .collect();

    for preference in preferences {
        let wanted = preference.course_name.to_lowercase();
        let known = selected
            .iter()
            .any(|s| s.course_name.trim().to_lowercase() == wanted);
        if !known {
            warn!("No sessions found for course '{}'", preference.course_name);
        }
    }
    debug!(
        "{} sessions selected for {} courses",
        selected.len(),
        chosen.len()
    );
    selected
}
