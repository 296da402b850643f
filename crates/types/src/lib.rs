use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;
use utoipa::ToSchema;

macro_rules! id_newtype {
    ($name:ident) => {
        #[derive(
            Clone, Debug, Serialize, Deserialize, ToSchema, JsonSchema, Eq, PartialEq, Hash,
        )]
        #[serde(transparent)]
        pub struct $name(pub String);

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                self.0.fmt(f)
            }
        }
    };
}
id_newtype!(ClassId);
id_newtype!(SubjectId);
id_newtype!(TeacherId);
id_newtype!(RoomId);
id_newtype!(StudentId);
id_newtype!(GradeId);

#[derive(
    Clone, Copy, Debug, Serialize, Deserialize, ToSchema, JsonSchema, Eq, PartialEq, Hash, Ord,
    PartialOrd,
)]
#[serde(rename_all = "lowercase")]
pub enum DayOfWeek {
    Mon,
    Tue,
    Wed,
    Thu,
    Fri,
    Sat,
    Sun,
}

impl DayOfWeek {
    pub const ORDER: [DayOfWeek; 7] = [
        DayOfWeek::Mon,
        DayOfWeek::Tue,
        DayOfWeek::Wed,
        DayOfWeek::Thu,
        DayOfWeek::Fri,
        DayOfWeek::Sat,
        DayOfWeek::Sun,
    ];

    /// Position in canonical Monday-first week order.
    pub fn index(self) -> usize {
        self as usize
    }
}

impl fmt::Display for DayOfWeek {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            DayOfWeek::Mon => "mon",
            DayOfWeek::Tue => "tue",
            DayOfWeek::Wed => "wed",
            DayOfWeek::Thu => "thu",
            DayOfWeek::Fri => "fri",
            DayOfWeek::Sat => "sat",
            DayOfWeek::Sun => "sun",
        };
        s.fmt(f)
    }
}

/// Minutes since midnight, rendered as "HH:MM".
#[derive(
    Clone, Copy, Debug, Serialize, Deserialize, ToSchema, JsonSchema, Eq, PartialEq, Hash, Ord,
    PartialOrd,
)]
#[serde(transparent)]
pub struct TimeOfDay(pub u16);

pub const MINUTES_PER_DAY: u16 = 24 * 60;
pub const NOON: TimeOfDay = TimeOfDay(12 * 60);

impl TimeOfDay {
    pub fn from_minutes(minutes: u16) -> Option<Self> {
        (minutes < MINUTES_PER_DAY).then_some(Self(minutes))
    }

    pub fn minutes(self) -> u16 {
        self.0
    }

    pub fn plus_minutes(self, minutes: u16) -> Option<Self> {
        Self::from_minutes(self.0.checked_add(minutes)?)
    }

    pub fn minutes_until(self, later: TimeOfDay) -> u16 {
        later.0.saturating_sub(self.0)
    }
}

impl fmt::Display for TimeOfDay {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:02}:{:02}", self.0 / 60, self.0 % 60)
    }
}

#[derive(Clone, Debug, Error, Eq, PartialEq)]
#[error("invalid time of day: {0}")]
pub struct ParseTimeError(pub String);

impl FromStr for TimeOfDay {
    type Err = ParseTimeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let bad = || ParseTimeError(s.to_string());
        let (h, m) = s.split_once(':').ok_or_else(bad)?;
        let h: u16 = h.parse().map_err(|_| bad())?;
        let m: u16 = m.parse().map_err(|_| bad())?;
        if h >= 24 || m >= 60 {
            return Err(bad());
        }
        Ok(TimeOfDay(h * 60 + m))
    }
}

#[derive(
    Clone, Copy, Debug, Serialize, Deserialize, ToSchema, JsonSchema, Eq, PartialEq, Default,
)]
#[serde(rename_all = "lowercase")]
pub enum DayPart {
    Am,
    Pm,
    #[default]
    Any,
}

impl DayPart {
    /// AM lessons must start before noon, PM lessons at or after it.
    pub fn permits(self, start: TimeOfDay) -> bool {
        match self {
            DayPart::Am => start < NOON,
            DayPart::Pm => start >= NOON,
            DayPart::Any => true,
        }
    }
}

#[derive(Clone, Debug, Serialize, Deserialize, ToSchema, JsonSchema)]
pub struct SchoolConfig {
    pub day_start: TimeOfDay,
    pub day_end: TimeOfDay,
    pub session_minutes: u16,
    pub school_days: Vec<DayOfWeek>,
}

#[derive(Clone, Debug, Serialize, Deserialize, ToSchema, JsonSchema)]
pub struct Grade {
    pub id: GradeId,
    pub name: String,
}

#[derive(Clone, Debug, Serialize, Deserialize, ToSchema, JsonSchema)]
pub struct Class {
    pub id: ClassId,
    pub name: String,
    #[serde(default)]
    pub grade: Option<GradeId>,
    pub capacity: u32,
    #[serde(default)]
    pub home_room: Option<RoomId>,
}

#[derive(Clone, Debug, Serialize, Deserialize, ToSchema, JsonSchema)]
pub struct Subject {
    pub id: SubjectId,
    pub name: String,
    pub default_hours: u32,
    #[serde(default)]
    pub coefficient: u32,
    #[serde(default)]
    pub elective: bool,
}

#[derive(Clone, Debug, Serialize, Deserialize, ToSchema, JsonSchema)]
pub struct Teacher {
    pub id: TeacherId,
    pub name: String,
    #[serde(default)]
    pub subjects: Vec<SubjectId>,
}

#[derive(Clone, Debug, Serialize, Deserialize, ToSchema, JsonSchema)]
pub struct Room {
    pub id: RoomId,
    pub name: String,
    pub capacity: u32,
}

#[derive(Clone, Debug, Serialize, Deserialize, ToSchema, JsonSchema)]
pub struct Student {
    pub id: StudentId,
    pub name: String,
    pub class_id: ClassId,
    #[serde(default)]
    pub electives: Vec<SubjectId>,
}

#[derive(Clone, Debug, Serialize, Deserialize, ToSchema, JsonSchema)]
pub struct LessonRequirement {
    pub class_id: ClassId,
    pub subject_id: SubjectId,
    pub hours_per_week: u32,
}

#[derive(Clone, Debug, Serialize, Deserialize, ToSchema, JsonSchema)]
pub struct TeacherAssignment {
    pub teacher_id: TeacherId,
    pub subject_id: SubjectId,
    #[serde(default)]
    pub class_ids: Vec<ClassId>,
}

/// A window in which the teacher must not be scheduled.
#[derive(Clone, Debug, Serialize, Deserialize, ToSchema, JsonSchema)]
pub struct TeacherConstraint {
    pub teacher_id: TeacherId,
    pub day: DayOfWeek,
    pub start: TimeOfDay,
    pub end: TimeOfDay,
    #[serde(default)]
    pub description: Option<String>,
}

#[derive(Clone, Debug, Serialize, Deserialize, ToSchema, JsonSchema)]
pub struct SubjectRule {
    pub subject_id: SubjectId,
    /// Empty means any room is acceptable.
    #[serde(default)]
    pub allowed_rooms: Vec<RoomId>,
    #[serde(default)]
    pub day_part: DayPart,
}

/// Immutable reference data for one generation or editing session.
#[derive(Clone, Debug, Serialize, Deserialize, ToSchema, JsonSchema)]
pub struct Snapshot {
    pub config: SchoolConfig,
    #[serde(default)]
    pub grades: Vec<Grade>,
    pub classes: Vec<Class>,
    pub subjects: Vec<Subject>,
    pub teachers: Vec<Teacher>,
    pub rooms: Vec<Room>,
    #[serde(default)]
    pub students: Vec<Student>,
    #[serde(default)]
    pub requirements: Vec<LessonRequirement>,
    #[serde(default)]
    pub assignments: Vec<TeacherAssignment>,
    #[serde(default)]
    pub constraints: Vec<TeacherConstraint>,
    #[serde(default)]
    pub subject_rules: Vec<SubjectRule>,
}

#[derive(Clone, Debug, Serialize, Deserialize, ToSchema, JsonSchema, Eq, PartialEq)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum LessonOwner {
    Class {
        class_id: ClassId,
    },
    Group {
        label: String,
        student_ids: Vec<StudentId>,
    },
}

impl LessonOwner {
    pub fn class_id(&self) -> Option<&ClassId> {
        match self {
            LessonOwner::Class { class_id } => Some(class_id),
            LessonOwner::Group { .. } => None,
        }
    }

    pub fn contains_student(&self, id: &StudentId) -> bool {
        match self {
            LessonOwner::Class { .. } => false,
            LessonOwner::Group { student_ids, .. } => student_ids.contains(id),
        }
    }
}

/// One scheduled occurrence of a subject. Bulk generation assigns
/// synthetic negative ids; persisted lessons carry store-issued ids.
#[derive(Clone, Debug, Serialize, Deserialize, ToSchema, JsonSchema, Eq, PartialEq)]
pub struct Lesson {
    pub id: i64,
    pub day: DayOfWeek,
    pub start: TimeOfDay,
    pub end: TimeOfDay,
    pub subject_id: SubjectId,
    pub teacher_id: TeacherId,
    #[serde(default)]
    pub room_id: Option<RoomId>,
    pub owner: LessonOwner,
}

impl Lesson {
    pub fn duration_minutes(&self) -> u16 {
        self.start.minutes_until(self.end)
    }
}

#[derive(Clone, Copy, Debug, Serialize, Deserialize, ToSchema, JsonSchema, Eq, PartialEq, Error)]
#[serde(rename_all = "snake_case")]
pub enum DiagnosticReason {
    #[error("no teacher assigned")]
    NoTeacherAssigned,
    #[error("no compatible slot found")]
    NoCompatibleSlot,
}

/// Why one required lesson-unit could not be placed.
#[derive(Clone, Debug, Serialize, Deserialize, ToSchema, JsonSchema, Eq, PartialEq)]
pub struct Diagnostic {
    pub subject_id: SubjectId,
    #[serde(default)]
    pub class_id: Option<ClassId>,
    #[serde(default)]
    pub group: Option<String>,
    #[serde(default)]
    pub teacher_id: Option<TeacherId>,
    pub reason: DiagnosticReason,
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (&self.class_id, &self.group) {
            (Some(c), _) => write!(f, "{} for class {}: {}", self.subject_id, c, self.reason),
            (None, Some(g)) => write!(f, "{} group {}: {}", self.subject_id, g, self.reason),
            (None, None) => write!(f, "{}: {}", self.subject_id, self.reason),
        }
    }
}

#[derive(Clone, Debug, Serialize, Deserialize, ToSchema, JsonSchema)]
pub struct GenerateParams {
    pub seed: u64,
}

#[derive(Clone, Debug, Serialize, Deserialize, ToSchema, JsonSchema)]
pub struct GenerateRequest {
    pub snapshot: Snapshot,
    pub params: GenerateParams,
}

#[derive(Clone, Debug, Serialize, Deserialize, ToSchema, JsonSchema)]
pub struct GenerateOutcome {
    pub lessons: Vec<Lesson>,
    pub unplaced: Vec<Diagnostic>,
    pub stats: serde_json::Value,
}

/// User-facing refusal of a single interactive edit. Conflicts are
/// expected outcomes, not faults.
#[derive(Clone, Debug, Serialize, Deserialize, ToSchema, JsonSchema, Eq, PartialEq, Error)]
#[serde(tag = "reason", rename_all = "snake_case")]
pub enum Rejection {
    #[error("teacher is already scheduled in that slot")]
    TeacherBusy,
    #[error("class is already scheduled in that slot")]
    ClassBusy,
    #[error("a student of the group is already scheduled in that slot")]
    StudentBusy,
    #[error("teacher is unavailable in that slot")]
    TeacherUnavailable {
        #[serde(default)]
        description: Option<String>,
    },
    #[error("subject must be scheduled in the {required:?} part of the day")]
    TimePreference { required: DayPart },
    #[error("no allowed room is free in that slot")]
    RoomUnavailable,
    #[error("no teacher is assigned to this subject for this class")]
    NoTeacherAssigned,
    #[error("teacher covers several classes for this subject; pick a class view")]
    AmbiguousClass,
    #[error("slot falls outside the configured school day")]
    OutsideSchoolDay,
    #[error("no lesson with id {lesson_id}")]
    UnknownLesson { lesson_id: i64 },
}

/// Which calendar the editor is placing from.
#[derive(Clone, Debug, Serialize, Deserialize, ToSchema, JsonSchema, Eq, PartialEq)]
#[serde(tag = "view", rename_all = "lowercase")]
pub enum ViewContext {
    Class { class_id: ClassId },
    Teacher { teacher_id: TeacherId },
}
