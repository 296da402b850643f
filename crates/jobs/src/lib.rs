use parking_lot::RwLock;
use std::collections::HashMap;
use timetable_core::Generator;
use tracing::error;
use types::{GenerateOutcome, GenerateRequest};
use utoipa::ToSchema;
use uuid::Uuid;

#[derive(Clone, Debug, serde::Serialize, serde::Deserialize, ToSchema)]
pub struct JobId(pub String);

/// A schedule with diagnostics is still `Done`: partial placement is a
/// normal outcome, not a failure.
#[derive(Clone, Debug, serde::Serialize, serde::Deserialize, ToSchema)]
#[serde(tag = "status")]
pub enum JobStatus {
    Queued,
    Running,
    Done { outcome: GenerateOutcome },
    Failed { message: String },
}

#[derive(Clone)]
pub struct InMemJobs<G: Generator> {
    inner: std::sync::Arc<RwLock<HashMap<String, JobStatus>>>,
    generator: std::sync::Arc<G>,
}

impl<G: Generator> InMemJobs<G> {
    pub fn new(generator: G) -> Self {
        Self {
            inner: Default::default(),
            generator: std::sync::Arc::new(generator),
        }
    }

    pub fn enqueue(&self, req: GenerateRequest) -> JobId {
        let id = Uuid::new_v4().to_string();
        self.inner.write().insert(id.clone(), JobStatus::Queued);

        let map = self.inner.clone();
        let generator = self.generator.clone();
        let id_for_task = id.clone();

        tokio::spawn(async move {
            {
                let mut w = map.write();
                w.insert(id_for_task.clone(), JobStatus::Running);
            }
            match generator.generate(req).await {
                Ok(outcome) => {
                    map.write()
                        .insert(id_for_task, JobStatus::Done { outcome });
                }
                Err(e) => {
                    error!(?e, "generation job failed");
                    map.write().insert(
                        id_for_task,
                        JobStatus::Failed {
                            message: e.to_string(),
                        },
                    );
                }
            }
        });

        JobId(id)
    }

    pub fn get(&self, id: &str) -> Option<JobStatus> {
        self.inner.read().get(id).cloned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use generator::GreedyGenerator;
    use types::*;

    fn request() -> GenerateRequest {
        GenerateRequest {
            snapshot: Snapshot {
                config: SchoolConfig {
                    day_start: TimeOfDay(8 * 60),
                    day_end: TimeOfDay(14 * 60),
                    session_minutes: 60,
                    school_days: vec![
                        DayOfWeek::Mon,
                        DayOfWeek::Tue,
                        DayOfWeek::Wed,
                        DayOfWeek::Thu,
                        DayOfWeek::Fri,
                    ],
                },
                grades: vec![],
                classes: vec![Class {
                    id: ClassId("c1".into()),
                    name: "6A".into(),
                    grade: None,
                    capacity: 30,
                    home_room: None,
                }],
                subjects: vec![Subject {
                    id: SubjectId("math".into()),
                    name: "Mathematics".into(),
                    default_hours: 2,
                    coefficient: 0,
                    elective: false,
                }],
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
                students: vec![],
                requirements: vec![],
                assignments: vec![TeacherAssignment {
                    teacher_id: TeacherId("t1".into()),
                    subject_id: SubjectId("math".into()),
                    class_ids: vec![ClassId("c1".into())],
                }],
                constraints: vec![],
                subject_rules: vec![],
            },
            params: GenerateParams { seed: 5 },
        }
    }

    #[tokio::test]
    async fn job_runs_to_done() {
        let jobs = InMemJobs::new(GreedyGenerator::new());
        let id = jobs.enqueue(request());

        let mut waited = 0u32;
        loop {
            match jobs.get(&id.0) {
                Some(JobStatus::Done { outcome }) => {
                    assert_eq!(outcome.lessons.len(), 2);
                    assert!(outcome.unplaced.is_empty());
                    break;
                }
                Some(JobStatus::Failed { message }) => panic!("job failed: {message}"),
                _ => {
                    waited += 1;
                    assert!(waited < 200, "job never finished");
                    tokio::time::sleep(std::time::Duration::from_millis(10)).await;
                }
            }
        }
    }

    #[test]
    fn unknown_job_is_none() {
        let jobs = InMemJobs::new(GreedyGenerator::new());
        assert!(jobs.get("nope").is_none());
    }
}
