pub mod checks;
pub mod index;
pub mod slots;

use async_trait::async_trait;
use thiserror::Error;

pub use index::{SnapshotError, SnapshotIndex};
pub use types::{
    GenerateOutcome, GenerateParams, GenerateRequest, Lesson, LessonOwner, Snapshot, TimeOfDay,
};

#[derive(Debug, Error)]
pub enum ValidationError {
    #[error("invalid snapshot: {0}")]
    Msg(String),
}

pub fn validate(snap: &Snapshot) -> Result<(), ValidationError> {
    let mut errors: Vec<String> = Vec::new();

    let cfg = &snap.config;
    if cfg.session_minutes == 0 {
        errors.push("session_minutes is zero".into());
    }
    if cfg.day_start >= cfg.day_end {
        errors.push(format!(
            "day_start {} is not before day_end {}",
            cfg.day_start, cfg.day_end
        ));
    }
    if cfg.school_days.is_empty() {
        errors.push("school_days is empty".into());
    }

    fn chk_unique<I: ToString>(name: &str, ids: impl Iterator<Item = I>, errors: &mut Vec<String>) {
        use std::collections::HashSet;
        let mut seen = HashSet::new();
        for id in ids {
            let s = id.to_string();
            if !seen.insert(s.clone()) {
                errors.push(format!("duplicate {name} id: {s}"));
            }
        }
    }
    chk_unique("class", snap.classes.iter().map(|x| &x.id.0), &mut errors);
    chk_unique("subject", snap.subjects.iter().map(|x| &x.id.0), &mut errors);
    chk_unique(
        "teacher",
        snap.teachers.iter().map(|x| &x.id.0),
        &mut errors,
    );
    chk_unique("room", snap.rooms.iter().map(|x| &x.id.0), &mut errors);
    chk_unique(
        "student",
        snap.students.iter().map(|x| &x.id.0),
        &mut errors,
    );
    chk_unique("grade", snap.grades.iter().map(|x| &x.id.0), &mut errors);
    chk_unique(
        "school day",
        snap.config.school_days.iter().map(|d| d.to_string()),
        &mut errors,
    );

    use std::collections::HashSet;
    let classes: HashSet<_> = snap.classes.iter().map(|c| &c.id.0).collect();
    let subjects: HashSet<_> = snap.subjects.iter().map(|s| &s.id.0).collect();
    let teachers: HashSet<_> = snap.teachers.iter().map(|t| &t.id.0).collect();
    let rooms: HashSet<_> = snap.rooms.iter().map(|r| &r.id.0).collect();

    for c in &snap.classes {
        if let Some(room) = &c.home_room {
            if !rooms.contains(&room.0) {
                errors.push(format!(
                    "class {} references missing home room {}",
                    c.id.0, room.0
                ));
            }
        }
    }

    for t in &snap.teachers {
        for s in &t.subjects {
            if !subjects.contains(&s.0) {
                errors.push(format!(
                    "teacher {} references missing subject {}",
                    t.id.0, s.0
                ));
            }
        }
    }

    for st in &snap.students {
        if !classes.contains(&st.class_id.0) {
            errors.push(format!(
                "student {} references missing class {}",
                st.id.0, st.class_id.0
            ));
        }
        for s in &st.electives {
            if !subjects.contains(&s.0) {
                errors.push(format!(
                    "student {} references missing subject {}",
                    st.id.0, s.0
                ));
            }
        }
    }

    for r in &snap.requirements {
        if !classes.contains(&r.class_id.0) {
            errors.push(format!("requirement references missing class {}", r.class_id.0));
        }
        if !subjects.contains(&r.subject_id.0) {
            errors.push(format!(
                "requirement references missing subject {}",
                r.subject_id.0
            ));
        }
    }

    for a in &snap.assignments {
        if !teachers.contains(&a.teacher_id.0) {
            errors.push(format!(
                "assignment references missing teacher {}",
                a.teacher_id.0
            ));
        }
        if !subjects.contains(&a.subject_id.0) {
            errors.push(format!(
                "assignment references missing subject {}",
                a.subject_id.0
            ));
        }
        for c in &a.class_ids {
            if !classes.contains(&c.0) {
                errors.push(format!("assignment references missing class {}", c.0));
            }
        }
    }

    for c in &snap.constraints {
        if !teachers.contains(&c.teacher_id.0) {
            errors.push(format!(
                "constraint references missing teacher {}",
                c.teacher_id.0
            ));
        }
        if c.start >= c.end {
            errors.push(format!(
                "constraint for teacher {} has empty window {}..{}",
                c.teacher_id.0, c.start, c.end
            ));
        }
    }

    for r in &snap.subject_rules {
        if !subjects.contains(&r.subject_id.0) {
            errors.push(format!(
                "subject rule references missing subject {}",
                r.subject_id.0
            ));
        }
        for room in &r.allowed_rooms {
            if !rooms.contains(&room.0) {
                errors.push(format!("subject rule references missing room {}", room.0));
            }
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(ValidationError::Msg(errors.join("; ")))
    }
}

/// Bulk schedule producer. The greedy engine is one implementation; a
/// backtracking or propagation strategy can sit behind the same trait.
#[async_trait]
pub trait Generator: Send + Sync + 'static {
    async fn generate(&self, req: GenerateRequest) -> anyhow::Result<GenerateOutcome>;
}
