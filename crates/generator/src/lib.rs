//! Bulk timetable generation: randomized greedy placement over the
//! configured week, one lesson-unit at a time, no backtracking. A poor
//! early placement can starve later units; failures surface as
//! diagnostics and the partial schedule is still returned.

mod place;

use async_trait::async_trait;
use rand_chacha::rand_core::SeedableRng;
use rand_chacha::ChaCha8Rng;
use rand::seq::SliceRandom;
use timetable_core::{slots, Generator, SnapshotError, SnapshotIndex};
use tracing::info;
use types::{
    Class, Diagnostic, DiagnosticReason, GenerateOutcome, GenerateParams, GenerateRequest, Lesson,
    Snapshot, Subject, TeacherId,
};

use place::SearchCtx;

pub const ELECTIVE_GROUP_CAPACITY: usize = 30;
pub const ELECTIVE_WEEKLY_SESSIONS: u32 = 2;

/// Placed-lesson accumulator for one generation pass. Bulk lessons get
/// synthetic negative ids since nothing is persisted yet.
pub struct Board {
    lessons: Vec<Lesson>,
    next_id: i64,
}

impl Board {
    pub fn new() -> Self {
        Self {
            lessons: Vec::new(),
            next_id: -1,
        }
    }

    pub fn lessons(&self) -> &[Lesson] {
        &self.lessons
    }

    pub fn push(&mut self, mut lesson: Lesson) -> i64 {
        let id = self.next_id;
        lesson.id = id;
        self.next_id -= 1;
        self.lessons.push(lesson);
        id
    }

    pub fn into_lessons(self) -> Vec<Lesson> {
        self.lessons
    }
}

impl Default for Board {
    fn default() -> Self {
        Self::new()
    }
}

pub struct GreedyGenerator;

impl GreedyGenerator {
    pub fn new() -> Self {
        Self
    }
}

impl Default for GreedyGenerator {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Generator for GreedyGenerator {
    async fn generate(&self, req: GenerateRequest) -> anyhow::Result<GenerateOutcome> {
        Ok(generate_schedule(&req.snapshot, &req.params)?)
    }
}

pub fn generate_schedule(
    snap: &Snapshot,
    params: &GenerateParams,
) -> Result<GenerateOutcome, SnapshotError> {
    let idx = SnapshotIndex::build(snap)?;
    let days = slots::school_days(&snap.config);
    let grid = slots::slot_starts(&snap.config);
    let ctx = SearchCtx {
        idx: &idx,
        days: &days,
        slots: &grid,
        session_minutes: snap.config.session_minutes,
    };
    let mut rng = ChaCha8Rng::seed_from_u64(params.seed);
    let mut board = Board::new();
    let mut unplaced: Vec<Diagnostic> = Vec::new();

    // heaviest classes first: they have the least slack
    let mut classes: Vec<&Class> = snap.classes.iter().collect();
    classes.sort_by(|a, b| idx.weekly_load(&b.id).cmp(&idx.weekly_load(&a.id)));

    for class in classes {
        let mut units: Vec<(&Subject, TeacherId)> = Vec::new();
        for subject in snap.subjects.iter().filter(|s| !s.elective) {
            let hours = idx.required_hours(&class.id, subject);
            if hours == 0 {
                continue;
            }
            match idx.teacher_for(&subject.id, &class.id) {
                Some(teacher) => units.extend((0..hours).map(|_| (subject, teacher.clone()))),
                None => unplaced.extend((0..hours).map(|_| Diagnostic {
                    subject_id: subject.id.clone(),
                    class_id: Some(class.id.clone()),
                    group: None,
                    teacher_id: None,
                    reason: DiagnosticReason::NoTeacherAssigned,
                })),
            }
        }
        // interleave the class's subjects instead of placing them block by block
        units.shuffle(&mut rng);
        for (subject, teacher_id) in units {
            match place::place_for_class(&ctx, &class.id, subject, &teacher_id, board.lessons(), &mut rng)
            {
                Some(lesson) => {
                    board.push(lesson);
                }
                None => unplaced.push(Diagnostic {
                    subject_id: subject.id.clone(),
                    class_id: Some(class.id.clone()),
                    group: None,
                    teacher_id: Some(teacher_id),
                    reason: DiagnosticReason::NoCompatibleSlot,
                }),
            }
        }
    }

    for subject in snap.subjects.iter().filter(|s| s.elective) {
        let enrolled = idx.enrolled(&subject.id);
        if enrolled.is_empty() {
            continue;
        }
        let teacher = idx.teacher_for_elective(&subject.id);
        for (gi, members) in enrolled.chunks(ELECTIVE_GROUP_CAPACITY).enumerate() {
            let label = format!("{}-{}", subject.name, gi + 1);
            let Some(teacher_id) = teacher else {
                unplaced.extend((0..ELECTIVE_WEEKLY_SESSIONS).map(|_| Diagnostic {
                    subject_id: subject.id.clone(),
                    class_id: None,
                    group: Some(label.clone()),
                    teacher_id: None,
                    reason: DiagnosticReason::NoTeacherAssigned,
                }));
                continue;
            };
            for _ in 0..ELECTIVE_WEEKLY_SESSIONS {
                match place::place_for_group(
                    &ctx,
                    &label,
                    members,
                    subject,
                    teacher_id,
                    board.lessons(),
                    &mut rng,
                ) {
                    Some(lesson) => {
                        board.push(lesson);
                    }
                    None => unplaced.push(Diagnostic {
                        subject_id: subject.id.clone(),
                        class_id: None,
                        group: Some(label.clone()),
                        teacher_id: Some(teacher_id.clone()),
                        reason: DiagnosticReason::NoCompatibleSlot,
                    }),
                }
            }
        }
    }

    info!(
        placed = board.lessons().len(),
        unplaced = unplaced.len(),
        seed = params.seed,
        "generation finished"
    );
    let stats = serde_json::json!({
        "method": "greedy",
        "seed": params.seed,
        "placed": board.lessons().len(),
        "unplaced": unplaced.len(),
        "classes": snap.classes.len(),
        "slots_per_day": grid.len(),
    });
    Ok(GenerateOutcome {
        lessons: board.into_lessons(),
        unplaced,
        stats,
    })
}
