use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;

// Type aliases for clarity
pub type SectionId = String;
pub type TeacherName = String;
pub type TimeSlot = String;

/// A course session as handed over by ingestion or the HTTP layer.
///
/// Every field is optional here; [`crate::validate`] turns records into
/// [`Session`] values and reports the ones that are incomplete.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionRecord {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<SectionId>,
    #[serde(
        default,
        alias = "name",
        alias = "course_name",
        skip_serializing_if = "Option::is_none"
    )]
    pub course_name: Option<String>,
    #[serde(
        default,
        alias = "preferred_teacher",
        skip_serializing_if = "Option::is_none"
    )]
    pub preferred_teacher: Option<TeacherName>,
    #[serde(default, alias = "time_slot", skip_serializing_if = "Option::is_none")]
    pub time_slot: Option<TimeSlot>,
}

/// A teacher with the slots they are free to teach, before validation.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TeacherRecord {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<TeacherName>,
    #[serde(
        default,
        alias = "available_slots",
        skip_serializing_if = "Option::is_none"
    )]
    pub available_slots: Option<BTreeSet<TimeSlot>>,
}

/// The complete input for one solve, as posted to the server.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SchedulingInput {
    #[serde(default)]
    pub courses: Option<Vec<SessionRecord>>,
    #[serde(default)]
    pub teachers: Option<Vec<TeacherRecord>>,
}

/// One meeting of a course section. Sessions sharing an `id` are recurring
/// meetings of the same section and must be taught by the same teacher.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    pub id: SectionId,
    pub course_name: String,
    pub preferred_teacher: TeacherName,
    pub time_slot: TimeSlot,
}

impl Session {
    pub fn new(
        id: impl Into<SectionId>,
        course_name: impl Into<String>,
        preferred_teacher: impl Into<TeacherName>,
        time_slot: impl Into<TimeSlot>,
    ) -> Self {
        Self {
            id: id.into(),
            course_name: course_name.into(),
            preferred_teacher: preferred_teacher.into(),
            time_slot: time_slot.into(),
        }
    }
}

impl From<Session> for SessionRecord {
    fn from(session: Session) -> Self {
        Self {
            id: Some(session.id),
            course_name: Some(session.course_name),
            preferred_teacher: Some(session.preferred_teacher),
            time_slot: Some(session.time_slot),
        }
    }
}

/// A teacher; names are the natural key, so `id` and `name` normally agree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Teacher {
    pub id: String,
    pub name: TeacherName,
    pub available_slots: BTreeSet<TimeSlot>,
}

impl Teacher {
    pub fn new<I, S>(name: impl Into<TeacherName>, slots: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<TimeSlot>,
    {
        let name = name.into();
        Self {
            id: name.clone(),
            name,
            available_slots: slots.into_iter().map(Into::into).collect(),
        }
    }

    pub fn is_available(&self, slot: &str) -> bool {
        self.available_slots.contains(slot)
    }
}

impl From<Teacher> for TeacherRecord {
    fn from(teacher: Teacher) -> Self {
        Self {
            id: Some(teacher.id),
            name: Some(teacher.name),
            available_slots: Some(teacher.available_slots),
        }
    }
}

/// Represents a single staffed session in the final result.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Assignment {
    pub course_name: String,
    pub teacher_name: TeacherName,
    pub time_slot: TimeSlot,
    pub preferred: bool,
}

/// Why a solve could not honour a preference, or could not run at all.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum Conflict {
    #[serde(rename_all = "camelCase")]
    InvalidData {
        entity: String,
        missing_fields: Vec<String>,
    },
    NoTeachersAvailable {
        course: String,
        message: String,
    },
    #[serde(rename_all = "camelCase")]
    PreferredUnavailable {
        course: String,
        preferred_teacher: TeacherName,
        alternatives: Vec<TeacherName>,
        message: String,
    },
    SystemError {
        message: String,
    },
}

impl Conflict {
    pub fn system_error(message: impl Into<String>) -> Self {
        Conflict::SystemError {
            message: message.into(),
        }
    }
}

impl fmt::Display for Conflict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Conflict::InvalidData {
                entity,
                missing_fields,
            } => write!(
                f,
                "[Invalid Data] {} missing fields: {}",
                entity,
                missing_fields.join(", ")
            ),
            Conflict::NoTeachersAvailable { message, .. } => {
                write!(f, "[No Teachers Available] {}", message)
            }
            Conflict::PreferredUnavailable { message, .. } => {
                write!(f, "[Preferred Unavailable] {}", message)
            }
            Conflict::SystemError { message } => write!(f, "[System Error] {}", message),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SolveStatus {
    /// The assignment provably maximises preferred-teacher matches.
    Optimal,
    /// A valid assignment, but the search stopped before proving optimality.
    Feasible,
    Infeasible,
    Error,
}

/// The final output of the solver.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SolveResult {
    pub feasible: bool,
    pub assignments: Vec<Assignment>,
    pub conflicts: Vec<Conflict>,
    pub status: SolveStatus,
}

impl SolveResult {
    pub fn infeasible(conflicts: Vec<Conflict>) -> Self {
        Self {
            feasible: false,
            assignments: Vec::new(),
            conflicts,
            status: SolveStatus::Infeasible,
        }
    }

    /// An internal failure; `conflicts` already gathered are kept ahead of it.
    pub fn error(message: impl Into<String>, mut conflicts: Vec<Conflict>) -> Self {
        conflicts.push(Conflict::system_error(message));
        Self {
            feasible: false,
            assignments: Vec::new(),
            conflicts,
            status: SolveStatus::Error,
        }
    }

    pub fn preferred_count(&self) -> usize {
        self.assignments.iter().filter(|a| a.preferred).count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn session_record_accepts_camel_case_and_name_alias() {
        let record: SessionRecord = serde_json::from_str(
            r#"{"id":"Calculus_101","name":"Calculus","preferredTeacher":"Ada","timeSlot":"Monday 9-10"}"#,
        )
        .unwrap();
        assert_eq!(record.course_name.as_deref(), Some("Calculus"));
        assert_eq!(record.time_slot.as_deref(), Some("Monday 9-10"));
    }

    #[test]
    fn snake_case_payloads_are_accepted() {
        let input: SchedulingInput = serde_json::from_str(
            r#"{
                "courses": [
                    {"id": "Calculus_101", "name": "Calculus", "preferred_teacher": "Ada", "time_slot": "Monday 9-10"},
                    {"id": "Calculus_101", "course_name": "Calculus", "preferred_teacher": "Ada", "time_slot": "Tuesday 9-10"}
                ],
                "teachers": [{"id": "Ada", "name": "Ada", "available_slots": ["Monday 9-10"]}]
            }"#,
        )
        .unwrap();
        let courses = input.courses.unwrap();
        assert_eq!(courses[0].preferred_teacher.as_deref(), Some("Ada"));
        assert_eq!(courses[0].time_slot.as_deref(), Some("Monday 9-10"));
        assert_eq!(courses[1].course_name.as_deref(), Some("Calculus"));
        let teacher = &input.teachers.unwrap()[0];
        assert!(teacher.available_slots.as_ref().unwrap().contains("Monday 9-10"));
    }

    #[test]
    fn missing_fields_deserialize_as_none() {
        let record: TeacherRecord = serde_json::from_str(r#"{"id":"Ada","name":"Ada"}"#).unwrap();
        assert!(record.available_slots.is_none());
    }

    #[test]
    fn conflicts_are_tagged_by_kind() {
        let conflict = Conflict::PreferredUnavailable {
            course: "Calculus".to_string(),
            preferred_teacher: "Ada".to_string(),
            alternatives: vec!["Grace".to_string()],
            message: "msg".to_string(),
        };
        let value = serde_json::to_value(&conflict).unwrap();
        assert_eq!(value["type"], "preferredUnavailable");
        assert_eq!(value["preferredTeacher"], "Ada");
    }

    #[test]
    fn status_serializes_lowercase() {
        assert_eq!(
            serde_json::to_string(&SolveStatus::Optimal).unwrap(),
            "\"optimal\""
        );
    }
}
