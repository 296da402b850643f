//! Id-keyed lookups over one snapshot. Construction fails on dangling
//! references: an inconsistent snapshot fails the whole operation
//! instead of being silently skipped.

use std::collections::HashMap;
use thiserror::Error;
use types::{
    Class, ClassId, Room, Snapshot, Student, StudentId, Subject, SubjectId, SubjectRule, Teacher,
    TeacherId,
};

#[derive(Debug, Error)]
pub enum SnapshotError {
    #[error("snapshot references unknown class {0}")]
    UnknownClass(ClassId),
    #[error("snapshot references unknown subject {0}")]
    UnknownSubject(SubjectId),
    #[error("snapshot references unknown teacher {0}")]
    UnknownTeacher(TeacherId),
    #[error("snapshot references unknown room {0}")]
    UnknownRoom(types::RoomId),
    #[error("snapshot references unknown student {0}")]
    UnknownStudent(StudentId),
    #[error("invalid school config: {0}")]
    Config(String),
}

pub struct SnapshotIndex<'a> {
    snap: &'a Snapshot,
    classes: HashMap<&'a str, &'a Class>,
    subjects: HashMap<&'a str, &'a Subject>,
    teachers: HashMap<&'a str, &'a Teacher>,
    rooms: HashMap<&'a str, &'a Room>,
    students: HashMap<&'a str, &'a Student>,
    requirements: HashMap<(&'a str, &'a str), u32>,
    rules: HashMap<&'a str, &'a SubjectRule>,
}

impl<'a> SnapshotIndex<'a> {
    pub fn build(snap: &'a Snapshot) -> Result<Self, SnapshotError> {
        let cfg = &snap.config;
        if cfg.session_minutes == 0 {
            return Err(SnapshotError::Config("session_minutes is zero".into()));
        }
        if cfg.day_start >= cfg.day_end {
            return Err(SnapshotError::Config(
                "day_start is not before day_end".into(),
            ));
        }
        if cfg.school_days.is_empty() {
            return Err(SnapshotError::Config("school_days is empty".into()));
        }

        let classes: HashMap<_, _> = snap.classes.iter().map(|c| (c.id.0.as_str(), c)).collect();
        let subjects: HashMap<_, _> = snap.subjects.iter().map(|s| (s.id.0.as_str(), s)).collect();
        let teachers: HashMap<_, _> = snap.teachers.iter().map(|t| (t.id.0.as_str(), t)).collect();
        let rooms: HashMap<_, _> = snap.rooms.iter().map(|r| (r.id.0.as_str(), r)).collect();
        let students: HashMap<_, _> = snap.students.iter().map(|s| (s.id.0.as_str(), s)).collect();

        for c in &snap.classes {
            if let Some(room) = &c.home_room {
                if !rooms.contains_key(room.0.as_str()) {
                    return Err(SnapshotError::UnknownRoom(room.clone()));
                }
            }
        }
        for t in &snap.teachers {
            for s in &t.subjects {
                if !subjects.contains_key(s.0.as_str()) {
                    return Err(SnapshotError::UnknownSubject(s.clone()));
                }
            }
        }
        for st in &snap.students {
            if !classes.contains_key(st.class_id.0.as_str()) {
                return Err(SnapshotError::UnknownClass(st.class_id.clone()));
            }
            for s in &st.electives {
                if !subjects.contains_key(s.0.as_str()) {
                    return Err(SnapshotError::UnknownSubject(s.clone()));
                }
            }
        }
        for a in &snap.assignments {
            if !teachers.contains_key(a.teacher_id.0.as_str()) {
                return Err(SnapshotError::UnknownTeacher(a.teacher_id.clone()));
            }
            if !subjects.contains_key(a.subject_id.0.as_str()) {
                return Err(SnapshotError::UnknownSubject(a.subject_id.clone()));
            }
            for c in &a.class_ids {
                if !classes.contains_key(c.0.as_str()) {
                    return Err(SnapshotError::UnknownClass(c.clone()));
                }
            }
        }
        for c in &snap.constraints {
            if !teachers.contains_key(c.teacher_id.0.as_str()) {
                return Err(SnapshotError::UnknownTeacher(c.teacher_id.clone()));
            }
        }

        let mut requirements = HashMap::new();
        for r in &snap.requirements {
            if !classes.contains_key(r.class_id.0.as_str()) {
                return Err(SnapshotError::UnknownClass(r.class_id.clone()));
            }
            if !subjects.contains_key(r.subject_id.0.as_str()) {
                return Err(SnapshotError::UnknownSubject(r.subject_id.clone()));
            }
            requirements.insert(
                (r.class_id.0.as_str(), r.subject_id.0.as_str()),
                r.hours_per_week,
            );
        }

        let mut rules = HashMap::new();
        for rule in &snap.subject_rules {
            if !subjects.contains_key(rule.subject_id.0.as_str()) {
                return Err(SnapshotError::UnknownSubject(rule.subject_id.clone()));
            }
            for room in &rule.allowed_rooms {
                if !rooms.contains_key(room.0.as_str()) {
                    return Err(SnapshotError::UnknownRoom(room.clone()));
                }
            }
            rules.insert(rule.subject_id.0.as_str(), rule);
        }

        Ok(Self {
            snap,
            classes,
            subjects,
            teachers,
            rooms,
            students,
            requirements,
            rules,
        })
    }

    pub fn snapshot(&self) -> &'a Snapshot {
        self.snap
    }

    pub fn class(&self, id: &ClassId) -> Result<&'a Class, SnapshotError> {
        self.classes
            .get(id.0.as_str())
            .copied()
            .ok_or_else(|| SnapshotError::UnknownClass(id.clone()))
    }

    pub fn subject(&self, id: &SubjectId) -> Result<&'a Subject, SnapshotError> {
        self.subjects
            .get(id.0.as_str())
            .copied()
            .ok_or_else(|| SnapshotError::UnknownSubject(id.clone()))
    }

    pub fn teacher(&self, id: &TeacherId) -> Result<&'a Teacher, SnapshotError> {
        self.teachers
            .get(id.0.as_str())
            .copied()
            .ok_or_else(|| SnapshotError::UnknownTeacher(id.clone()))
    }

    pub fn student(&self, id: &StudentId) -> Result<&'a Student, SnapshotError> {
        self.students
            .get(id.0.as_str())
            .copied()
            .ok_or_else(|| SnapshotError::UnknownStudent(id.clone()))
    }

    pub fn subject_rule(&self, id: &SubjectId) -> Option<&'a SubjectRule> {
        self.rules.get(id.0.as_str()).copied()
    }

    /// Required weekly hours for (class, subject): the explicit
    /// requirement, or the subject's default.
    pub fn required_hours(&self, class: &ClassId, subject: &Subject) -> u32 {
        self.requirements
            .get(&(class.0.as_str(), subject.id.0.as_str()))
            .copied()
            .unwrap_or(subject.default_hours)
    }

    /// Sum of required weekly hours across all non-elective subjects.
    pub fn weekly_load(&self, class: &ClassId) -> u32 {
        self.snap
            .subjects
            .iter()
            .filter(|s| !s.elective)
            .map(|s| self.required_hours(class, s))
            .sum()
    }

    /// The teacher covering `subject` for `class`, if assigned.
    pub fn teacher_for(&self, subject: &SubjectId, class: &ClassId) -> Option<&'a TeacherId> {
        self.snap
            .assignments
            .iter()
            .find(|a| a.subject_id == *subject && a.class_ids.contains(class))
            .map(|a| &a.teacher_id)
    }

    /// The teacher covering an elective, regardless of class membership.
    pub fn teacher_for_elective(&self, subject: &SubjectId) -> Option<&'a TeacherId> {
        self.snap
            .assignments
            .iter()
            .find(|a| a.subject_id == *subject)
            .map(|a| &a.teacher_id)
    }

    /// Classes a teacher covers for `subject`.
    pub fn classes_for(&self, teacher: &TeacherId, subject: &SubjectId) -> Vec<&'a ClassId> {
        self.snap
            .assignments
            .iter()
            .filter(|a| a.teacher_id == *teacher && a.subject_id == *subject)
            .flat_map(|a| a.class_ids.iter())
            .collect()
    }

    /// Students enrolled in an elective, in snapshot order.
    pub fn enrolled(&self, subject: &SubjectId) -> Vec<&'a Student> {
        self.snap
            .students
            .iter()
            .filter(|s| s.electives.contains(subject))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use types::*;

    fn snapshot() -> Snapshot {
        Snapshot {
            config: SchoolConfig {
                day_start: TimeOfDay(480),
                day_end: TimeOfDay(960),
                session_minutes: 60,
                school_days: vec![DayOfWeek::Mon, DayOfWeek::Tue],
            },
            grades: vec![],
            classes: vec![
                Class {
                    id: ClassId("c1".into()),
                    name: "6A".into(),
                    grade: None,
                    capacity: 30,
                    home_room: None,
                },
                Class {
                    id: ClassId("c2".into()),
                    name: "6B".into(),
                    grade: None,
                    capacity: 30,
                    home_room: None,
                },
            ],
            subjects: vec![
                Subject {
                    id: SubjectId("math".into()),
                    name: "Mathematics".into(),
                    default_hours: 4,
                    coefficient: 0,
                    elective: false,
                },
                Subject {
                    id: SubjectId("esp".into()),
                    name: "Spanish".into(),
                    default_hours: 2,
                    coefficient: 0,
                    elective: true,
                },
            ],
            teachers: vec![Teacher {
                id: TeacherId("t1".into()),
                name: "Ada".into(),
                subjects: vec![SubjectId("math".into())],
            }],
            rooms: vec![Room {
                id: RoomId("r1".into()),
                name: "101".into(),
                capacity: 30,
            }],
            students: vec![Student {
                id: StudentId("s1".into()),
                name: "Mia".into(),
                class_id: ClassId("c1".into()),
                electives: vec![SubjectId("esp".into())],
            }],
            requirements: vec![LessonRequirement {
                class_id: ClassId("c1".into()),
                subject_id: SubjectId("math".into()),
                hours_per_week: 6,
            }],
            assignments: vec![TeacherAssignment {
                teacher_id: TeacherId("t1".into()),
                subject_id: SubjectId("math".into()),
                class_ids: vec![ClassId("c1".into())],
            }],
            constraints: vec![],
            subject_rules: vec![],
        }
    }

    #[test]
    fn requirement_overrides_default_hours() {
        let snap = snapshot();
        let idx = SnapshotIndex::build(&snap).unwrap();
        let math = idx.subject(&SubjectId("math".into())).unwrap();
        assert_eq!(idx.required_hours(&ClassId("c1".into()), math), 6);
        assert_eq!(idx.required_hours(&ClassId("c2".into()), math), 4);
        // electives never count toward the class load
        assert_eq!(idx.weekly_load(&ClassId("c1".into())), 6);
    }

    #[test]
    fn assignment_resolution() {
        let snap = snapshot();
        let idx = SnapshotIndex::build(&snap).unwrap();
        assert_eq!(
            idx.teacher_for(&SubjectId("math".into()), &ClassId("c1".into())),
            Some(&TeacherId("t1".into()))
        );
        assert_eq!(
            idx.teacher_for(&SubjectId("math".into()), &ClassId("c2".into())),
            None
        );
        assert_eq!(idx.enrolled(&SubjectId("esp".into())).len(), 1);
    }

    #[test]
    fn dangling_assignment_is_fatal() {
        let mut snap = snapshot();
        snap.assignments.push(TeacherAssignment {
            teacher_id: TeacherId("ghost".into()),
            subject_id: SubjectId("math".into()),
            class_ids: vec![],
        });
        assert!(matches!(
            SnapshotIndex::build(&snap),
            Err(SnapshotError::UnknownTeacher(_))
        ));
    }

    #[test]
    fn empty_grid_is_fatal() {
        let mut snap = snapshot();
        snap.config.school_days.clear();
        assert!(matches!(
            SnapshotIndex::build(&snap),
            Err(SnapshotError::Config(_))
        ));
    }
}
