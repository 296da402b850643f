//! Interactive placement, move and delete for one editing session.
//! Validates exactly the requested slot with the same predicates the
//! bulk generator uses; never searches for alternatives. Conflicts come
//! back as [`Outcome::Rejected`] values, not errors. The engine does no
//! I/O: persisting accepted lessons is the caller's job, as is
//! serializing mutations (one in flight per workbench).

use timetable_core::{checks, slots, SnapshotError, SnapshotIndex};
use tracing::debug;
use types::{
    DayOfWeek, Lesson, LessonOwner, Rejection, Snapshot, SubjectId, TeacherId, TimeOfDay,
    ViewContext,
};

#[derive(Clone, Debug, PartialEq)]
pub enum Outcome {
    Accepted(Lesson),
    Rejected(Rejection),
}

/// One schedule under interactive edit: the immutable snapshot plus the
/// mutable lesson list.
pub struct Workbench {
    snapshot: Snapshot,
    lessons: Vec<Lesson>,
    next_id: i64,
}

impl Workbench {
    /// Fails on an inconsistent snapshot; a workbench never starts from
    /// dangling references.
    pub fn new(snapshot: Snapshot, lessons: Vec<Lesson>) -> Result<Self, SnapshotError> {
        SnapshotIndex::build(&snapshot)?;
        let next_id = lessons.iter().map(|l| l.id).max().unwrap_or(0).max(0) + 1;
        Ok(Self {
            snapshot,
            lessons,
            next_id,
        })
    }

    pub fn snapshot(&self) -> &Snapshot {
        &self.snapshot
    }

    pub fn lessons(&self) -> &[Lesson] {
        &self.lessons
    }

    pub fn try_place(
        &mut self,
        subject_id: &SubjectId,
        day: DayOfWeek,
        start: TimeOfDay,
        view: &ViewContext,
    ) -> Result<Outcome, SnapshotError> {
        let idx = SnapshotIndex::build(&self.snapshot)?;
        idx.subject(subject_id)?;

        let (class_id, teacher_id) = match view {
            ViewContext::Class { class_id } => {
                idx.class(class_id)?;
                match idx.teacher_for(subject_id, class_id) {
                    Some(t) => (class_id.clone(), t.clone()),
                    None => return Ok(Outcome::Rejected(Rejection::NoTeacherAssigned)),
                }
            }
            ViewContext::Teacher { teacher_id } => {
                idx.teacher(teacher_id)?;
                let mut classes = idx.classes_for(teacher_id, subject_id);
                classes.sort_by(|a, b| a.0.cmp(&b.0));
                classes.dedup();
                match classes.as_slice() {
                    [] => return Ok(Outcome::Rejected(Rejection::NoTeacherAssigned)),
                    [only] => ((*only).clone(), teacher_id.clone()),
                    _ => return Ok(Outcome::Rejected(Rejection::AmbiguousClass)),
                }
            }
        };

        let session = self.snapshot.config.session_minutes;
        let Some(end) = self.window_end(day, start, session) else {
            return Ok(Outcome::Rejected(Rejection::OutsideSchoolDay));
        };

        let owner = LessonOwner::Class { class_id };
        if let Some(r) = self.occupant_conflict(&idx, &owner, day, start, end)? {
            return Ok(Outcome::Rejected(r));
        }
        if let Some(r) = self.slot_rejection(&idx, &teacher_id, subject_id, day, start, end) {
            return Ok(Outcome::Rejected(r));
        }

        let whitelist = idx
            .subject_rule(subject_id)
            .map(|r| r.allowed_rooms.as_slice())
            .unwrap_or(&[]);
        let rooms = checks::free_rooms(&self.snapshot.rooms, &self.lessons, day, start, end, whitelist);
        if !whitelist.is_empty() && rooms.is_empty() {
            return Ok(Outcome::Rejected(Rejection::RoomUnavailable));
        }
        let room_id = rooms.first().map(|r| r.id.clone());

        let lesson = Lesson {
            id: self.next_id,
            day,
            start,
            end,
            subject_id: subject_id.clone(),
            teacher_id,
            room_id,
            owner,
        };
        self.next_id += 1;
        debug!(lesson = lesson.id, %day, %start, "placed");
        self.lessons.push(lesson.clone());
        Ok(Outcome::Accepted(lesson))
    }

    /// Re-validates occupancy, constraints, time preference and the kept
    /// room at the destination. The room assignment itself never changes
    /// on a move; the lesson keeps its original duration.
    pub fn try_move(
        &mut self,
        lesson_id: i64,
        day: DayOfWeek,
        start: TimeOfDay,
    ) -> Result<Outcome, SnapshotError> {
        let idx = SnapshotIndex::build(&self.snapshot)?;
        let Some(pos) = self.lessons.iter().position(|l| l.id == lesson_id) else {
            return Ok(Outcome::Rejected(Rejection::UnknownLesson { lesson_id }));
        };
        let duration = self.lessons[pos].duration_minutes();
        let Some(end) = self.window_end(day, start, duration) else {
            return Ok(Outcome::Rejected(Rejection::OutsideSchoolDay));
        };

        // the lesson itself must not count against its destination
        let moved = self.lessons.remove(pos);
        let verdict = self.move_conflict(&idx, &moved, day, start, end);
        match verdict {
            Err(e) => {
                self.lessons.insert(pos, moved);
                Err(e)
            }
            Ok(Some(r)) => {
                self.lessons.insert(pos, moved);
                Ok(Outcome::Rejected(r))
            }
            Ok(None) => {
                let mut updated = moved;
                updated.day = day;
                updated.start = start;
                updated.end = end;
                debug!(lesson = updated.id, %day, %start, "moved");
                self.lessons.insert(pos, updated.clone());
                Ok(Outcome::Accepted(updated))
            }
        }
    }

    /// Unconditional and idempotent: removing a lesson cannot create a
    /// conflict.
    pub fn try_delete(&mut self, lesson_id: i64) {
        self.lessons.retain(|l| l.id != lesson_id);
    }

    fn window_end(&self, day: DayOfWeek, start: TimeOfDay, minutes: u16) -> Option<TimeOfDay> {
        let cfg = &self.snapshot.config;
        if !slots::school_days(cfg).contains(&day) {
            return None;
        }
        let end = start.plus_minutes(minutes)?;
        (start >= cfg.day_start && end <= cfg.day_end).then_some(end)
    }

    fn occupant_conflict(
        &self,
        idx: &SnapshotIndex,
        owner: &LessonOwner,
        day: DayOfWeek,
        start: TimeOfDay,
        end: TimeOfDay,
    ) -> Result<Option<Rejection>, SnapshotError> {
        match owner {
            LessonOwner::Class { class_id } => Ok(checks::class_busy(
                &self.lessons,
                class_id,
                day,
                start,
                end,
            )
            .then_some(Rejection::ClassBusy)),
            LessonOwner::Group { student_ids, .. } => {
                for sid in student_ids {
                    let student = idx.student(sid)?;
                    if checks::student_busy(&self.lessons, student, day, start, end) {
                        return Ok(Some(Rejection::StudentBusy));
                    }
                }
                Ok(None)
            }
        }
    }

    fn slot_rejection(
        &self,
        idx: &SnapshotIndex,
        teacher_id: &TeacherId,
        subject_id: &SubjectId,
        day: DayOfWeek,
        start: TimeOfDay,
        end: TimeOfDay,
    ) -> Option<Rejection> {
        if checks::teacher_busy(&self.lessons, teacher_id, day, start, end) {
            return Some(Rejection::TeacherBusy);
        }
        if let Some(c) =
            checks::blocking_constraint(&self.snapshot.constraints, teacher_id, day, start, end)
        {
            return Some(Rejection::TeacherUnavailable {
                description: c.description.clone(),
            });
        }
        if let Some(rule) = idx.subject_rule(subject_id) {
            if !rule.day_part.permits(start) {
                return Some(Rejection::TimePreference {
                    required: rule.day_part,
                });
            }
        }
        None
    }

    fn move_conflict(
        &self,
        idx: &SnapshotIndex,
        lesson: &Lesson,
        day: DayOfWeek,
        start: TimeOfDay,
        end: TimeOfDay,
    ) -> Result<Option<Rejection>, SnapshotError> {
        if let Some(r) = self.occupant_conflict(idx, &lesson.owner, day, start, end)? {
            return Ok(Some(r));
        }
        if let Some(r) =
            self.slot_rejection(idx, &lesson.teacher_id, &lesson.subject_id, day, start, end)
        {
            return Ok(Some(r));
        }
        if let Some(room) = &lesson.room_id {
            if checks::room_busy(&self.lessons, room, day, start, end) {
                return Ok(Some(Rejection::RoomUnavailable));
            }
        }
        Ok(None)
    }
}
