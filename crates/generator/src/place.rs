//! Greedy first-fit slot search. Days and per-day start times are
//! visited in seeded shuffled order; the first (day, slot, room) that
//! survives every check wins and is never revisited.

use rand::seq::SliceRandom;
use rand_chacha::ChaCha8Rng;
use timetable_core::{checks, slots, SnapshotIndex};
use types::{
    ClassId, DayOfWeek, Lesson, LessonOwner, RoomId, Student, StudentId, Subject, SubjectId,
    TeacherId, TimeOfDay,
};

pub(crate) struct SearchCtx<'a> {
    pub idx: &'a SnapshotIndex<'a>,
    pub days: &'a [DayOfWeek],
    pub slots: &'a [TimeOfDay],
    pub session_minutes: u16,
}

fn search(
    ctx: &SearchCtx,
    subject: &Subject,
    teacher_id: &TeacherId,
    lessons: &[Lesson],
    rng: &mut ChaCha8Rng,
    skip_day: &dyn Fn(DayOfWeek) -> bool,
    occupant_busy: &dyn Fn(DayOfWeek, TimeOfDay, TimeOfDay) -> bool,
) -> Option<(DayOfWeek, TimeOfDay, TimeOfDay, Option<RoomId>)> {
    let snap = ctx.idx.snapshot();
    let rule = ctx.idx.subject_rule(&subject.id);
    let whitelist: &[RoomId] = rule.map(|r| r.allowed_rooms.as_slice()).unwrap_or(&[]);
    let day_part = rule.map(|r| r.day_part).unwrap_or_default();

    let mut days = ctx.days.to_vec();
    days.shuffle(rng);
    for day in days {
        if skip_day(day) {
            continue;
        }
        let mut starts = ctx.slots.to_vec();
        starts.shuffle(rng);
        for start in starts {
            let Some(end) = start.plus_minutes(ctx.session_minutes) else {
                continue;
            };
            if !day_part.permits(start) {
                continue;
            }
            if occupant_busy(day, start, end) {
                continue;
            }
            if checks::teacher_busy(lessons, teacher_id, day, start, end) {
                continue;
            }
            if checks::blocking_constraint(&snap.constraints, teacher_id, day, start, end).is_some()
            {
                continue;
            }
            let rooms = checks::free_rooms(&snap.rooms, lessons, day, start, end, whitelist);
            if !whitelist.is_empty() && rooms.is_empty() {
                continue;
            }
            let room_id = rooms.first().map(|r| r.id.clone());
            return Some((day, start, end, room_id));
        }
    }
    None
}

/// Same (class, subject) already on this day or a neighboring
/// configured school day. Keeps a subject spread across the week.
fn subject_on_or_adjacent(
    days: &[DayOfWeek],
    lessons: &[Lesson],
    class_id: &ClassId,
    subject_id: &SubjectId,
    day: DayOfWeek,
) -> bool {
    let (prev, next) = slots::adjacent_days(days, day);
    [prev, Some(day), next].into_iter().flatten().any(|d| {
        lessons.iter().any(|l| {
            l.day == d && l.subject_id == *subject_id && l.owner.class_id() == Some(class_id)
        })
    })
}

pub(crate) fn place_for_class(
    ctx: &SearchCtx,
    class_id: &ClassId,
    subject: &Subject,
    teacher_id: &TeacherId,
    lessons: &[Lesson],
    rng: &mut ChaCha8Rng,
) -> Option<Lesson> {
    let skip = |day| subject_on_or_adjacent(ctx.days, lessons, class_id, &subject.id, day);
    let busy = |day, s, e| checks::class_busy(lessons, class_id, day, s, e);
    let (day, start, end, room_id) = search(ctx, subject, teacher_id, lessons, rng, &skip, &busy)?;
    Some(Lesson {
        id: 0,
        day,
        start,
        end,
        subject_id: subject.id.clone(),
        teacher_id: teacher_id.clone(),
        room_id,
        owner: LessonOwner::Class {
            class_id: class_id.clone(),
        },
    })
}

/// Elective variant: the busy check walks every member student's
/// schedule (home class plus any other group they belong to) instead
/// of one class.
pub(crate) fn place_for_group(
    ctx: &SearchCtx,
    label: &str,
    members: &[&Student],
    subject: &Subject,
    teacher_id: &TeacherId,
    lessons: &[Lesson],
    rng: &mut ChaCha8Rng,
) -> Option<Lesson> {
    let skip = |_day: DayOfWeek| false;
    let busy = |day, s, e| {
        members
            .iter()
            .any(|st| checks::student_busy(lessons, st, day, s, e))
    };
    let (day, start, end, room_id) = search(ctx, subject, teacher_id, lessons, rng, &skip, &busy)?;
    let student_ids: Vec<StudentId> = members.iter().map(|s| s.id.clone()).collect();
    Some(Lesson {
        id: 0,
        day,
        start,
        end,
        subject_id: subject.id.clone(),
        teacher_id: teacher_id.clone(),
        room_id,
        owner: LessonOwner::Group {
            label: label.to_string(),
            student_ids,
        },
    })
}
