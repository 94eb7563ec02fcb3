use crate::data::{Session, Teacher, TeacherName};
use anyhow::Context;
use log::{debug, info};
use serde::Deserialize;
use std::collections::{BTreeSet, HashMap};
use std::io::Read;
use std::path::Path;

const COURTESY_TITLES: [&str; 5] = ["Dr.", "Prof.", "Mr.", "Ms.", "Mrs."];

/// Sessions and teachers recovered from one timetable sheet.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Timetable {
    pub sessions: Vec<Session>,
    /// In order of first appearance; each teacher is available exactly at the
    /// slots the sheet lists them for.
    pub teachers: Vec<Teacher>,
}

// Header aliases cover the older export layout of the same sheet.
#[derive(Debug, Deserialize)]
struct TimetableRow {
    #[serde(rename = "Course Name", default)]
    course_name: Option<String>,
    #[serde(rename = "Class Code", alias = "UMS ClassNo.", default)]
    class_code: Option<String>,
    #[serde(rename = "Day", default)]
    day: Option<String>,
    #[serde(rename = "Time", alias = "Timings", default)]
    time: Option<String>,
    #[serde(rename = "Teacher", default)]
    teacher: Option<String>,
}

pub fn read_timetable(path: &Path) -> anyhow::Result<Timetable> {
    let reader = csv::Reader::from_path(path)
        .with_context(|| format!("failed to open timetable {}", path.display()))?;
    let timetable = parse_timetable(reader)
        .with_context(|| format!("failed to read timetable {}", path.display()))?;
    info!(
        "Loaded {} sessions and {} teachers from {}",
        timetable.sessions.len(),
        timetable.teachers.len(),
        path.display()
    );
    Ok(timetable)
}

/// Builds sessions from timetable rows, skipping rows with a blank required cell.
pub fn parse_timetable<R: Read>(mut reader: csv::Reader<R>) -> anyhow::Result<Timetable> {
    let mut timetable = Timetable::default();
    let mut teacher_position: HashMap<TeacherName, usize> = HashMap::new();
    let mut skipped = 0usize;

    for result in reader.deserialize::<TimetableRow>() {
        let row = result.map_err(|e| {
            let line = e
                .position()
                .map(|pos| pos.line().to_string())
                .unwrap_or_else(|| "?".to_string());
            anyhow::Error::new(e).context(format!("malformed timetable line {}", line))
        })?;
        let (Some(course_name), Some(class_code), Some(day), Some(time), Some(teacher)) = (
            non_blank(row.course_name),
            non_blank(row.class_code),
            non_blank(row.day),
            non_blank(row.time),
            non_blank(row.teacher).map(|t| clean_teacher_name(&t)),
        ) else {
            skipped += 1;
            continue;
        };
        if teacher.is_empty() {
            skipped += 1;
            continue;
        }

        let time_slot = format!("{} {}", day, time);
        let id = format!("{}_{}", course_name, class_code);
        timetable.sessions.push(Session::new(
            id,
            course_name,
            teacher.as_str(),
            time_slot.as_str(),
        ));

        match teacher_position.get(&teacher) {
            Some(&position) => {
                timetable.teachers[position]
                    .available_slots
                    .insert(time_slot);
            }
            None => {
                teacher_position.insert(teacher.clone(), timetable.teachers.len());
                timetable.teachers.push(Teacher::new(teacher, [time_slot]));
            }
        }
    }

    if skipped > 0 {
        debug!("Skipped {} timetable rows with missing values", skipped);
    }
    Ok(timetable)
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// Drops one leading courtesy title such as `Dr.` from a teacher's name.
pub fn clean_teacher_name(name: &str) -> String {
    let name = name.trim();
    COURTESY_TITLES
        .iter()
        .find_map(|title| name.strip_prefix(title))
        .unwrap_or(name)
        .trim()
        .to_string()
}

/// Sorted, de-duplicated course names.
pub fn unique_course_names(sessions: &[Session]) -> Vec<String> {
    sessions
        .iter()
        .map(|s| s.course_name.trim().to_string())
        .filter(|name| !name.is_empty())
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}

/// Teachers the sheet records for a course, matched case-insensitively.
pub fn teacher_options(sessions: &[Session], course_name: &str) -> Vec<TeacherName> {
    let wanted = course_name.trim().to_lowercase();
    sessions
        .iter()
        .filter(|s| s.course_name.trim().to_lowercase() == wanted)
        .map(|s| s.preferred_teacher.clone())
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(data: &str) -> Timetable {
        parse_timetable(csv::Reader::from_reader(data.as_bytes())).unwrap()
    }

    #[test]
    fn rows_become_sessions_and_teacher_availability() {
        let timetable = parse(
            "Course Name,Program,Class Code,Day,Time,Teacher\n\
             Calculus,BSCS,98577,Monday,09:00-10:30,Dr. Ada Lovelace\n\
             Calculus,BSCS,98577,Wednesday,09:00-10:30,Dr. Ada Lovelace\n\
             Physics,BSEE,98568,Monday,11:00-12:30,Ms. Grace Hopper\n",
        );
        assert_eq!(timetable.sessions.len(), 3);
        assert_eq!(
            timetable.sessions[0],
            Session::new("Calculus_98577", "Calculus", "Ada Lovelace", "Monday 09:00-10:30")
        );
        assert_eq!(timetable.teachers.len(), 2);
        assert_eq!(timetable.teachers[0].name, "Ada Lovelace");
        assert_eq!(
            timetable.teachers[0]
                .available_slots
                .iter()
                .collect::<Vec<_>>(),
            vec!["Monday 09:00-10:30", "Wednesday 09:00-10:30"]
        );
    }

    #[test]
    fn incomplete_rows_are_skipped() {
        let timetable = parse(
            "Course Name,Class Code,Day,Time,Teacher\n\
             Calculus,98577,Monday,09:00-10:30,\n\
             ,98577,Monday,09:00-10:30,Ada\n\
             Physics,98568,Monday,11:00-12:30,Grace\n",
        );
        assert_eq!(timetable.sessions.len(), 1);
        assert_eq!(timetable.sessions[0].course_name, "Physics");
    }

    #[test]
    fn malformed_records_report_their_file_line() {
        let err = parse_timetable(csv::Reader::from_reader(
            "Course Name,Class Code,Day,Time,Teacher\n\
             Calculus,98577,Monday,09:00-10:30,Ada\n\
             Physics,98568,Monday,11:00-12:30,Grace,extra\n"
                .as_bytes(),
        ))
        .unwrap_err();
        assert!(
            format!("{:#}", err).contains("malformed timetable line 3"),
            "{:#}",
            err
        );
    }

    #[test]
    fn legacy_headers_are_accepted() {
        let timetable = parse(
            "Course Name,Class & Program,UMS ClassNo.,Day,Timings,Teacher\n\
             Calculus,BSCS-2,98577,Tuesday,14:00-15:30,Prof. Alan Turing\n",
        );
        assert_eq!(timetable.sessions[0].id, "Calculus_98577");
        assert_eq!(timetable.sessions[0].time_slot, "Tuesday 14:00-15:30");
        assert_eq!(timetable.sessions[0].preferred_teacher, "Alan Turing");
    }

    #[test]
    fn courtesy_titles_are_removed_once() {
        assert_eq!(clean_teacher_name("Mrs. Marie Curie"), "Marie Curie");
        assert_eq!(clean_teacher_name("  Mr.Edward Teller "), "Edward Teller");
        assert_eq!(clean_teacher_name("Drake Ramoray"), "Drake Ramoray");
    }

    #[test]
    fn course_listing_and_teacher_options() {
        let sessions = vec![
            Session::new("Physics_2", "Physics", "Grace", "Monday 9-10"),
            Session::new("Calculus_1", "Calculus", "Ada", "Monday 9-10"),
            Session::new("Physics_1", "physics", "Alan", "Tuesday 9-10"),
            Session::new("Physics_2", "Physics", "Grace", "Friday 9-10"),
        ];
        assert_eq!(
            unique_course_names(&sessions),
            vec!["Calculus", "Physics", "physics"]
        );
        assert_eq!(teacher_options(&sessions, "PHYSICS"), vec!["Alan", "Grace"]);
    }
}
