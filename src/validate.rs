use crate::data::{Conflict, SchedulingInput, Session, SessionRecord, Teacher, TeacherRecord};
use log::debug;

/// Records that passed validation, in input order.
#[derive(Debug, Clone, Default)]
pub struct Validated {
    pub sessions: Vec<Session>,
    pub teachers: Vec<Teacher>,
}

/// Checks the top-level collections of a request before the records themselves.
pub fn validate_input(input: &SchedulingInput) -> Result<Validated, Vec<Conflict>> {
    let (Some(courses), Some(teachers)) = (&input.courses, &input.teachers) else {
        let missing_fields = [
            ("courses", input.courses.is_none()),
            ("teachers", input.teachers.is_none()),
        ]
        .into_iter()
        .filter(|(_, missing)| *missing)
        .map(|(field, _)| field.to_string())
        .collect();
        return Err(vec![Conflict::InvalidData {
            entity: "input".to_string(),
            missing_fields,
        }]);
    };
    validate(courses, teachers)
}

/// Returns one `InvalidData` conflict per incomplete record, sessions first.
/// Nothing is returned as validated unless every record is complete.
pub fn validate(
    sessions: &[SessionRecord],
    teachers: &[TeacherRecord],
) -> Result<Validated, Vec<Conflict>> {
    let mut conflicts = Vec::new();
    let mut validated = Validated::default();

    for record in sessions {
        match session_from_record(record) {
            Ok(session) => validated.sessions.push(session),
            Err(conflict) => conflicts.push(conflict),
        }
    }
    for record in teachers {
        match teacher_from_record(record) {
            Ok(teacher) => validated.teachers.push(teacher),
            Err(conflict) => conflicts.push(conflict),
        }
    }

    if conflicts.is_empty() {
        Ok(validated)
    } else {
        debug!("{} malformed records rejected", conflicts.len());
        Err(conflicts)
    }
}

fn session_from_record(record: &SessionRecord) -> Result<Session, Conflict> {
    match (
        &record.id,
        &record.course_name,
        &record.preferred_teacher,
        &record.time_slot,
    ) {
        (Some(id), Some(course_name), Some(preferred_teacher), Some(time_slot)) => {
            Ok(Session::new(
                id.as_str(),
                course_name.as_str(),
                preferred_teacher.as_str(),
                time_slot.as_str(),
            ))
        }
        _ => Err(Conflict::InvalidData {
            entity: entity_label("Course", record.course_name.as_deref()),
            missing_fields: missing(&[
                ("id", record.id.is_none()),
                ("courseName", record.course_name.is_none()),
                ("preferredTeacher", record.preferred_teacher.is_none()),
                ("timeSlot", record.time_slot.is_none()),
            ]),
        }),
    }
}

fn teacher_from_record(record: &TeacherRecord) -> Result<Teacher, Conflict> {
    match (&record.id, &record.name, &record.available_slots) {
        (Some(id), Some(name), Some(slots)) => Ok(Teacher {
            id: id.clone(),
            name: name.clone(),
            available_slots: slots.clone(),
        }),
        _ => Err(Conflict::InvalidData {
            entity: entity_label("Teacher", record.name.as_deref()),
            missing_fields: missing(&[
                ("id", record.id.is_none()),
                ("name", record.name.is_none()),
                ("availableSlots", record.available_slots.is_none()),
            ]),
        }),
    }
}

fn entity_label(kind: &str, name: Option<&str>) -> String {
    format!("{} {}", kind, name.unwrap_or("Unknown"))
}

fn missing(fields: &[(&str, bool)]) -> Vec<String> {
    fields
        .iter()
        .filter(|(_, is_missing)| *is_missing)
        .map(|(field, _)| field.to_string())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn complete_session() -> SessionRecord {
        Session::new("Calculus_101", "Calculus", "Ada", "Monday 9-10").into()
    }

    #[test]
    fn complete_records_pass() {
        let teachers = vec![Teacher::new("Ada", ["Monday 9-10"]).into()];
        let validated = validate(&[complete_session()], &teachers).unwrap();
        assert_eq!(validated.sessions.len(), 1);
        assert_eq!(validated.teachers[0].name, "Ada");
    }

    #[test]
    fn teacher_without_slots_is_reported() {
        let teacher = TeacherRecord {
            id: Some("Ada".to_string()),
            name: Some("Ada".to_string()),
            available_slots: None,
        };
        let conflicts = validate(&[complete_session()], &[teacher]).unwrap_err();
        assert_eq!(
            conflicts,
            vec![Conflict::InvalidData {
                entity: "Teacher Ada".to_string(),
                missing_fields: vec!["availableSlots".to_string()],
            }]
        );
    }

    #[test]
    fn every_malformed_record_is_listed_in_order() {
        let broken_session = SessionRecord {
            id: Some("X_1".to_string()),
            ..Default::default()
        };
        let broken_teacher = TeacherRecord::default();
        let conflicts = validate(&[broken_session], &[broken_teacher]).unwrap_err();
        assert_eq!(conflicts.len(), 2);
        match &conflicts[0] {
            Conflict::InvalidData {
                entity,
                missing_fields,
            } => {
                assert_eq!(entity, "Course Unknown");
                assert_eq!(
                    missing_fields,
                    &["courseName", "preferredTeacher", "timeSlot"]
                );
            }
            other => panic!("unexpected conflict {other:?}"),
        }
        match &conflicts[1] {
            Conflict::InvalidData { entity, .. } => assert_eq!(entity, "Teacher Unknown"),
            other => panic!("unexpected conflict {other:?}"),
        }
    }

    #[test]
    fn missing_collections_are_reported_once() {
        let input = SchedulingInput {
            courses: Some(vec![]),
            teachers: None,
        };
        let conflicts = validate_input(&input).unwrap_err();
        assert_eq!(
            conflicts,
            vec![Conflict::InvalidData {
                entity: "input".to_string(),
                missing_fields: vec!["teachers".to_string()],
            }]
        );
    }
}
