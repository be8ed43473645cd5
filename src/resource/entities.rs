//! Entity descriptions: drafts, request bodies and validation per resource.

use serde::Serialize;

use super::validation::{self, ValidationError};
use super::{
    DraftField, Entity, FormDraft, Outcome, ResourceEvent, ResourceKind, ResourceManager,
    Resources,
};
use crate::api::types::{date_format, Course, Evaluation, GradeRecord, Student, Teacher};

// ============================================================================
// Course
// ============================================================================

#[derive(Debug, Clone, Default, PartialEq)]
pub struct CourseDraft {
    pub name: String,
    pub description: String,
    pub remedial_course_id: Option<String>,
}

impl FormDraft for CourseDraft {
    const FIELDS: &'static [DraftField] = &[
        DraftField::Name,
        DraftField::Description,
        DraftField::RemedialCourse,
    ];

    fn get(&self, field: DraftField) -> Option<&str> {
        match field {
            DraftField::Name => Some(&self.name),
            DraftField::Description => Some(&self.description),
            DraftField::RemedialCourse => self.remedial_course_id.as_deref(),
            _ => None,
        }
    }

    fn set(&mut self, field: DraftField, value: String) -> bool {
        match field {
            DraftField::Name => self.name = value,
            DraftField::Description => self.description = value,
            DraftField::RemedialCourse => {
                self.remedial_course_id = Some(value).filter(|v| !v.is_empty())
            }
            _ => return false,
        }
        true
    }
}

#[derive(Debug, Serialize)]
pub struct CoursePayload {
    #[serde(rename = "nome")]
    name: String,
    #[serde(rename = "descricao")]
    description: String,
    #[serde(rename = "idCursoReforco")]
    remedial_course_id: Option<String>,
}

impl Entity for Course {
    const KIND: ResourceKind = ResourceKind::Course;
    type Draft = CourseDraft;
    type Payload = CoursePayload;

    fn id(&self) -> &str {
        &self.id
    }

    fn label(&self) -> String {
        self.name.clone()
    }

    fn to_draft(&self) -> CourseDraft {
        CourseDraft {
            name: self.name.clone(),
            description: self.description.clone(),
            remedial_course_id: self.remedial_course_id.clone(),
        }
    }

    fn payload(draft: &CourseDraft, editing_id: Option<&str>) -> Result<CoursePayload, ValidationError> {
        let name = validation::required(DraftField::Name, &draft.name)?;
        let description = validation::bounded_text(DraftField::Description, &draft.description)?;
        if editing_id.is_some() && draft.remedial_course_id.as_deref() == editing_id {
            return Err(ValidationError::SelfReference);
        }

        Ok(CoursePayload {
            name,
            description,
            remedial_course_id: draft.remedial_course_id.clone(),
        })
    }

    fn manager(resources: &Resources) -> &ResourceManager<Self> {
        &resources.courses
    }

    fn manager_mut(resources: &mut Resources) -> &mut ResourceManager<Self> {
        &mut resources.courses
    }

    fn event(outcome: Outcome<Self>) -> ResourceEvent {
        ResourceEvent::Course(outcome)
    }
}

// ============================================================================
// Evaluation
// ============================================================================

#[derive(Debug, Clone, Default, PartialEq)]
pub struct EvaluationDraft {
    pub name: String,
    pub description: String,
    pub course_id: String,
    /// As typed, `YYYY-MM-DD`.
    pub date: String,
}

impl FormDraft for EvaluationDraft {
    const FIELDS: &'static [DraftField] = &[
        DraftField::Name,
        DraftField::Description,
        DraftField::Course,
        DraftField::Date,
    ];

    fn get(&self, field: DraftField) -> Option<&str> {
        match field {
            DraftField::Name => Some(&self.name),
            DraftField::Description => Some(&self.description),
            DraftField::Course => Some(&self.course_id),
            DraftField::Date => Some(&self.date),
            _ => None,
        }
    }

    fn set(&mut self, field: DraftField, value: String) -> bool {
        match field {
            DraftField::Name => self.name = value,
            DraftField::Description => self.description = value,
            DraftField::Course => self.course_id = value,
            DraftField::Date => self.date = value,
            _ => return false,
        }
        true
    }
}

#[derive(Debug, Serialize)]
pub struct EvaluationPayload {
    #[serde(rename = "nome")]
    name: String,
    #[serde(rename = "descricao")]
    description: String,
    #[serde(rename = "idCurso")]
    course_id: String,
    #[serde(rename = "data", with = "date_format")]
    date: chrono::NaiveDate,
}

impl Entity for Evaluation {
    const KIND: ResourceKind = ResourceKind::Evaluation;
    type Draft = EvaluationDraft;
    type Payload = EvaluationPayload;

    fn id(&self) -> &str {
        &self.id
    }

    fn label(&self) -> String {
        match self.date {
            Some(date) => format!("{} ({})", self.name, date.format("%d/%m/%Y")),
            None => self.name.clone(),
        }
    }

    fn to_draft(&self) -> EvaluationDraft {
        EvaluationDraft {
            name: self.name.clone(),
            description: self.description.clone(),
            course_id: self.course_id.clone(),
            date: self
                .date
                .map(|date| date.format("%Y-%m-%d").to_string())
                .unwrap_or_default(),
        }
    }

    fn payload(draft: &EvaluationDraft, _editing_id: Option<&str>) -> Result<EvaluationPayload, ValidationError> {
        Ok(EvaluationPayload {
            name: validation::required(DraftField::Name, &draft.name)?,
            description: validation::bounded_text(DraftField::Description, &draft.description)?,
            course_id: validation::required(DraftField::Course, &draft.course_id)?,
            date: validation::date(&draft.date)?,
        })
    }

    fn manager(resources: &Resources) -> &ResourceManager<Self> {
        &resources.evaluations
    }

    fn manager_mut(resources: &mut Resources) -> &mut ResourceManager<Self> {
        &mut resources.evaluations
    }

    fn event(outcome: Outcome<Self>) -> ResourceEvent {
        ResourceEvent::Evaluation(outcome)
    }
}

// ============================================================================
// Student / Teacher
// ============================================================================

/// Draft for either kind of account.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AccountDraft {
    pub name: String,
    /// Blank on edit keeps the current password.
    pub password: String,
}

impl FormDraft for AccountDraft {
    const FIELDS: &'static [DraftField] = &[DraftField::Name, DraftField::Password];

    fn get(&self, field: DraftField) -> Option<&str> {
        match field {
            DraftField::Name => Some(&self.name),
            DraftField::Password => Some(&self.password),
            _ => None,
        }
    }

    fn set(&mut self, field: DraftField, value: String) -> bool {
        match field {
            DraftField::Name => self.name = value,
            DraftField::Password => self.password = value,
            _ => return false,
        }
        true
    }
}

#[derive(Debug, Serialize)]
pub struct AccountPayload {
    #[serde(rename = "nome")]
    name: String,
    #[serde(rename = "senha", skip_serializing_if = "Option::is_none")]
    password: Option<String>,
}

fn account_payload(draft: &AccountDraft, editing_id: Option<&str>) -> Result<AccountPayload, ValidationError> {
    let name = validation::required(DraftField::Name, &draft.name)?;
    let password = if editing_id.is_some() && draft.password.is_empty() {
        None
    } else {
        Some(validation::password(&draft.password)?)
    };
    Ok(AccountPayload { name, password })
}

impl Entity for Student {
    const KIND: ResourceKind = ResourceKind::Student;
    type Draft = AccountDraft;
    type Payload = AccountPayload;

    fn id(&self) -> &str {
        &self.id
    }

    fn label(&self) -> String {
        self.name.clone()
    }

    fn to_draft(&self) -> AccountDraft {
        AccountDraft {
            name: self.name.clone(),
            password: String::new(),
        }
    }

    fn payload(draft: &AccountDraft, editing_id: Option<&str>) -> Result<AccountPayload, ValidationError> {
        account_payload(draft, editing_id)
    }

    fn manager(resources: &Resources) -> &ResourceManager<Self> {
        &resources.students
    }

    fn manager_mut(resources: &mut Resources) -> &mut ResourceManager<Self> {
        &mut resources.students
    }

    fn event(outcome: Outcome<Self>) -> ResourceEvent {
        ResourceEvent::Student(outcome)
    }
}

impl Entity for Teacher {
    const KIND: ResourceKind = ResourceKind::Teacher;
    type Draft = AccountDraft;
    type Payload = AccountPayload;

    fn id(&self) -> &str {
        &self.id
    }

    fn label(&self) -> String {
        self.name.clone()
    }

    fn to_draft(&self) -> AccountDraft {
        AccountDraft {
            name: self.name.clone(),
            password: String::new(),
        }
    }

    fn payload(draft: &AccountDraft, editing_id: Option<&str>) -> Result<AccountPayload, ValidationError> {
        account_payload(draft, editing_id)
    }

    fn manager(resources: &Resources) -> &ResourceManager<Self> {
        &resources.teachers
    }

    fn manager_mut(resources: &mut Resources) -> &mut ResourceManager<Self> {
        &mut resources.teachers
    }

    fn event(outcome: Outcome<Self>) -> ResourceEvent {
        ResourceEvent::Teacher(outcome)
    }
}

// ============================================================================
// Grade record
// ============================================================================

#[derive(Debug, Clone, Default, PartialEq)]
pub struct GradeRecordDraft {
    pub evaluation_id: String,
    pub student_id: String,
    /// As typed; `7.5` and `7,5` are both accepted.
    pub score: String,
    pub notes: String,
}

impl FormDraft for GradeRecordDraft {
    const FIELDS: &'static [DraftField] = &[
        DraftField::Evaluation,
        DraftField::Student,
        DraftField::Score,
        DraftField::Notes,
    ];

    fn get(&self, field: DraftField) -> Option<&str> {
        match field {
            DraftField::Evaluation => Some(&self.evaluation_id),
            DraftField::Student => Some(&self.student_id),
            DraftField::Score => Some(&self.score),
            DraftField::Notes => Some(&self.notes),
            _ => None,
        }
    }

    fn set(&mut self, field: DraftField, value: String) -> bool {
        match field {
            DraftField::Evaluation => self.evaluation_id = value,
            DraftField::Student => self.student_id = value,
            DraftField::Score => self.score = value,
            DraftField::Notes => self.notes = value,
            _ => return false,
        }
        true
    }
}

#[derive(Debug, Serialize)]
pub struct GradeRecordPayload {
    #[serde(rename = "idAvaliacao")]
    evaluation_id: String,
    #[serde(rename = "idAluno")]
    student_id: String,
    #[serde(rename = "nota")]
    score: f64,
    #[serde(rename = "observacao")]
    notes: String,
}

impl Entity for GradeRecord {
    const KIND: ResourceKind = ResourceKind::GradeRecord;
    type Draft = GradeRecordDraft;
    type Payload = GradeRecordPayload;

    fn id(&self) -> &str {
        &self.id
    }

    fn label(&self) -> String {
        format!("{:.1}", self.score)
    }

    fn to_draft(&self) -> GradeRecordDraft {
        GradeRecordDraft {
            evaluation_id: self.evaluation_id.clone(),
            student_id: self.student_id.clone(),
            score: format!("{:.1}", self.score),
            notes: self.notes.clone(),
        }
    }

    fn payload(draft: &GradeRecordDraft, _editing_id: Option<&str>) -> Result<GradeRecordPayload, ValidationError> {
        Ok(GradeRecordPayload {
            evaluation_id: validation::required(DraftField::Evaluation, &draft.evaluation_id)?,
            student_id: validation::required(DraftField::Student, &draft.student_id)?,
            score: validation::score(&draft.score)?,
            notes: validation::bounded_text(DraftField::Notes, &draft.notes)?,
        })
    }

    fn manager(resources: &Resources) -> &ResourceManager<Self> {
        &resources.grade_records
    }

    fn manager_mut(resources: &mut Resources) -> &mut ResourceManager<Self> {
        &mut resources.grade_records
    }

    fn event(outcome: Outcome<Self>) -> ResourceEvent {
        ResourceEvent::GradeRecord(outcome)
    }
}
