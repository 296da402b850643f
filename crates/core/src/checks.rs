//! Conflict predicates shared by the bulk generator and the editor.
//! Every busy test reduces to one half-open interval overlap.

use types::{
    ClassId, DayOfWeek, Lesson, Room, RoomId, Student, TeacherConstraint, TeacherId, TimeOfDay,
};

/// Half-open interval overlap: [a_start, a_end) against [b_start, b_end).
pub fn overlaps(a_start: TimeOfDay, a_end: TimeOfDay, b_start: TimeOfDay, b_end: TimeOfDay) -> bool {
    a_start < b_end && a_end > b_start
}

fn lesson_overlaps(l: &Lesson, day: DayOfWeek, start: TimeOfDay, end: TimeOfDay) -> bool {
    l.day == day && overlaps(l.start, l.end, start, end)
}

/// First unavailability window of `teacher` that overlaps the slot.
pub fn blocking_constraint<'a>(
    constraints: &'a [TeacherConstraint],
    teacher: &TeacherId,
    day: DayOfWeek,
    start: TimeOfDay,
    end: TimeOfDay,
) -> Option<&'a TeacherConstraint> {
    constraints
        .iter()
        .find(|c| c.teacher_id == *teacher && c.day == day && overlaps(start, end, c.start, c.end))
}

pub fn teacher_busy(
    lessons: &[Lesson],
    teacher: &TeacherId,
    day: DayOfWeek,
    start: TimeOfDay,
    end: TimeOfDay,
) -> bool {
    lessons
        .iter()
        .any(|l| l.teacher_id == *teacher && lesson_overlaps(l, day, start, end))
}

pub fn class_busy(
    lessons: &[Lesson],
    class: &ClassId,
    day: DayOfWeek,
    start: TimeOfDay,
    end: TimeOfDay,
) -> bool {
    lessons
        .iter()
        .any(|l| l.owner.class_id() == Some(class) && lesson_overlaps(l, day, start, end))
}

/// An unassigned room occupies nothing.
pub fn room_busy(
    lessons: &[Lesson],
    room: &RoomId,
    day: DayOfWeek,
    start: TimeOfDay,
    end: TimeOfDay,
) -> bool {
    lessons
        .iter()
        .any(|l| l.room_id.as_ref() == Some(room) && lesson_overlaps(l, day, start, end))
}

/// A student is busy when their home class meets or when any elective
/// group they belong to meets.
pub fn student_busy(
    lessons: &[Lesson],
    student: &Student,
    day: DayOfWeek,
    start: TimeOfDay,
    end: TimeOfDay,
) -> bool {
    lessons.iter().any(|l| {
        (l.owner.class_id() == Some(&student.class_id) || l.owner.contains_student(&student.id))
            && lesson_overlaps(l, day, start, end)
    })
}

/// Rooms free in the window. A non-empty whitelist restricts the result
/// to its members; the caller treats an empty restricted result as a
/// hard failure for the slot.
pub fn free_rooms<'a>(
    rooms: &'a [Room],
    lessons: &[Lesson],
    day: DayOfWeek,
    start: TimeOfDay,
    end: TimeOfDay,
    whitelist: &[RoomId],
) -> Vec<&'a Room> {
    rooms
        .iter()
        .filter(|r| whitelist.is_empty() || whitelist.contains(&r.id))
        .filter(|r| !room_busy(lessons, &r.id, day, start, end))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use types::{LessonOwner, StudentId, SubjectId};

    fn lesson(id: i64, day: DayOfWeek, start: u16, end: u16) -> Lesson {
        Lesson {
            id,
            day,
            start: TimeOfDay(start),
            end: TimeOfDay(end),
            subject_id: SubjectId("math".into()),
            teacher_id: TeacherId("t1".into()),
            room_id: Some(RoomId("r1".into())),
            owner: LessonOwner::Class {
                class_id: ClassId("c1".into()),
            },
        }
    }

    #[test]
    fn overlap_is_half_open() {
        let t = TimeOfDay;
        assert!(overlaps(t(480), t(540), t(500), t(520)));
        assert!(overlaps(t(480), t(540), t(520), t(600)));
        // touching endpoints do not overlap
        assert!(!overlaps(t(480), t(540), t(540), t(600)));
        assert!(!overlaps(t(540), t(600), t(480), t(540)));
    }

    #[test]
    fn busy_checks_filter_by_day_and_key() {
        let lessons = vec![lesson(1, DayOfWeek::Mon, 480, 540)];
        let (s, e) = (TimeOfDay(500), TimeOfDay(560));
        assert!(teacher_busy(&lessons, &TeacherId("t1".into()), DayOfWeek::Mon, s, e));
        assert!(!teacher_busy(&lessons, &TeacherId("t1".into()), DayOfWeek::Tue, s, e));
        assert!(!teacher_busy(&lessons, &TeacherId("t2".into()), DayOfWeek::Mon, s, e));
        assert!(class_busy(&lessons, &ClassId("c1".into()), DayOfWeek::Mon, s, e));
        assert!(!class_busy(&lessons, &ClassId("c2".into()), DayOfWeek::Mon, s, e));
        assert!(room_busy(&lessons, &RoomId("r1".into()), DayOfWeek::Mon, s, e));
    }

    #[test]
    fn unassigned_room_occupies_nothing() {
        let mut l = lesson(1, DayOfWeek::Mon, 480, 540);
        l.room_id = None;
        let lessons = vec![l];
        assert!(!room_busy(
            &lessons,
            &RoomId("r1".into()),
            DayOfWeek::Mon,
            TimeOfDay(480),
            TimeOfDay(540)
        ));
    }

    #[test]
    fn student_busy_sees_home_class_and_groups() {
        let student = Student {
            id: StudentId("s1".into()),
            name: "Mia".into(),
            class_id: ClassId("c1".into()),
            electives: vec![],
        };
        let mut group = lesson(2, DayOfWeek::Tue, 480, 540);
        group.owner = LessonOwner::Group {
            label: "esp-1".into(),
            student_ids: vec![StudentId("s1".into())],
        };
        let lessons = vec![lesson(1, DayOfWeek::Mon, 480, 540), group];
        let (s, e) = (TimeOfDay(480), TimeOfDay(540));
        assert!(student_busy(&lessons, &student, DayOfWeek::Mon, s, e));
        assert!(student_busy(&lessons, &student, DayOfWeek::Tue, s, e));
        assert!(!student_busy(&lessons, &student, DayOfWeek::Wed, s, e));
    }

    #[test]
    fn free_rooms_respects_the_whitelist() {
        let rooms = vec![
            Room {
                id: RoomId("r1".into()),
                name: "101".into(),
                capacity: 30,
            },
            Room {
                id: RoomId("r2".into()),
                name: "102".into(),
                capacity: 30,
            },
        ];
        let lessons = vec![lesson(1, DayOfWeek::Mon, 480, 540)];
        let (s, e) = (TimeOfDay(480), TimeOfDay(540));

        let any = free_rooms(&rooms, &lessons, DayOfWeek::Mon, s, e, &[]);
        assert_eq!(any.iter().map(|r| r.id.0.as_str()).collect::<Vec<_>>(), ["r2"]);

        let only_r1 = free_rooms(&rooms, &lessons, DayOfWeek::Mon, s, e, &[RoomId("r1".into())]);
        assert!(only_r1.is_empty());

        let free_day = free_rooms(&rooms, &lessons, DayOfWeek::Tue, s, e, &[RoomId("r1".into())]);
        assert_eq!(free_day.len(), 1);
    }

    #[test]
    fn constraint_evaluator_matches_teacher_day_and_window() {
        let constraints = vec![TeacherConstraint {
            teacher_id: TeacherId("t1".into()),
            day: DayOfWeek::Mon,
            start: TimeOfDay(480),
            end: TimeOfDay(600),
            description: Some("clinic".into()),
        }];
        let hit = blocking_constraint(
            &constraints,
            &TeacherId("t1".into()),
            DayOfWeek::Mon,
            TimeOfDay(540),
            TimeOfDay(620),
        );
        assert!(hit.is_some());
        assert!(blocking_constraint(
            &constraints,
            &TeacherId("t1".into()),
            DayOfWeek::Tue,
            TimeOfDay(540),
            TimeOfDay(620)
        )
        .is_none());
        assert!(blocking_constraint(
            &constraints,
            &TeacherId("t1".into()),
            DayOfWeek::Mon,
            TimeOfDay(600),
            TimeOfDay(660)
        )
        .is_none());
    }
}
