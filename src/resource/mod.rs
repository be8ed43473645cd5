//! Generic CRUD state for every entity the API manages.
//!
//! One [`ResourceManager`] exists per entity type. They all share the same
//! lifecycle (list, search, create/edit draft, save, confirmed delete,
//! reconciliation by full re-fetch); only the endpoint and the entity shape
//! vary, and those are described by the [`Entity`] trait.

mod entities;
mod manager;
pub mod validation;

use std::fmt;

use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::api::types::{Course, Evaluation, GradeRecord, Student, Teacher};
use crate::api::ApiError;

pub use entities::{AccountDraft, CourseDraft, EvaluationDraft, GradeRecordDraft};
pub use manager::{
    FormChange, MutationApplied, ListApplied, Mutation, Removal, ResourceManager, SaveTarget,
    Ticket,
};
pub use validation::ValidationError;

/// The entity types with a CRUD endpoint family.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ResourceKind {
    Course,
    Evaluation,
    Student,
    Teacher,
    GradeRecord,
}

impl ResourceKind {
    pub const ALL: [ResourceKind; 5] = [
        ResourceKind::Course,
        ResourceKind::Evaluation,
        ResourceKind::Student,
        ResourceKind::Teacher,
        ResourceKind::GradeRecord,
    ];

    /// Collection segment under `/api/`.
    pub fn collection(&self) -> &'static str {
        match self {
            ResourceKind::Course => "cursos",
            ResourceKind::Evaluation => "avaliacoes",
            ResourceKind::Student => "alunos",
            ResourceKind::Teacher => "professores",
            ResourceKind::GradeRecord => "avaliacoes-alunos",
        }
    }

    /// Singular name shown to users.
    pub fn noun(&self) -> &'static str {
        match self {
            ResourceKind::Course => "Curso",
            ResourceKind::Evaluation => "Avaliação",
            ResourceKind::Student => "Aluno",
            ResourceKind::Teacher => "Professor",
            ResourceKind::GradeRecord => "Nota",
        }
    }

    /// Lowercase plural shown in list titles and errors.
    pub fn plural(&self) -> &'static str {
        match self {
            ResourceKind::Course => "cursos",
            ResourceKind::Evaluation => "avaliações",
            ResourceKind::Student => "alunos",
            ResourceKind::Teacher => "professores",
            ResourceKind::GradeRecord => "notas",
        }
    }

    fn is_feminine(&self) -> bool {
        matches!(self, ResourceKind::Evaluation | ResourceKind::GradeRecord)
    }

    /// Pick the word form agreeing with the noun's gender.
    pub fn agree(&self, masculine: &'static str, feminine: &'static str) -> &'static str {
        if self.is_feminine() {
            feminine
        } else {
            masculine
        }
    }

    pub fn created_message(&self) -> String {
        format!("{} {} com sucesso!", self.noun(), self.agree("criado", "criada"))
    }

    pub fn updated_message(&self) -> String {
        format!("{} {} com sucesso!", self.noun(), self.agree("atualizado", "atualizada"))
    }

    pub fn removed_message(&self) -> String {
        format!("{} {} com sucesso!", self.noun(), self.agree("excluído", "excluída"))
    }

    pub fn load_failed_message(&self) -> String {
        format!("Erro ao carregar {}", self.plural())
    }

    pub fn save_failed_message(&self) -> String {
        format!("Erro ao salvar {}", self.noun().to_lowercase())
    }

    pub fn remove_failed_message(&self) -> String {
        format!("Erro ao excluir {}", self.noun().to_lowercase())
    }

    /// Resources whose rows feed this resource's form choices.
    pub fn joins(&self) -> &'static [ResourceKind] {
        match self {
            ResourceKind::Evaluation => &[ResourceKind::Course],
            ResourceKind::GradeRecord => &[ResourceKind::Evaluation, ResourceKind::Student],
            // Remedial course choices come from the course list already on screen.
            ResourceKind::Course | ResourceKind::Student | ResourceKind::Teacher => &[],
        }
    }
}

impl fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.collection())
    }
}

/// Fetch state of a resource's list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ResourceStatus {
    #[default]
    Idle,
    Loading,
    Loaded,
    Errored,
}

/// Form fields a draft may expose.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DraftField {
    Name,
    Description,
    RemedialCourse,
    Course,
    Date,
    Evaluation,
    Student,
    Score,
    Notes,
    Password,
}

impl DraftField {
    /// Label shown next to the input.
    pub fn label(&self) -> &'static str {
        match self {
            DraftField::Name => "Nome",
            DraftField::Description => "Descrição",
            DraftField::RemedialCourse => "Curso de reforço",
            DraftField::Course => "Curso",
            DraftField::Date => "Data",
            DraftField::Evaluation => "Avaliação",
            DraftField::Student => "Aluno",
            DraftField::Score => "Nota",
            DraftField::Notes => "Observação",
            DraftField::Password => "Senha",
        }
    }

    /// The resource whose rows are the choices of a foreign-key field.
    pub fn choices(&self) -> Option<ResourceKind> {
        match self {
            DraftField::RemedialCourse | DraftField::Course => Some(ResourceKind::Course),
            DraftField::Evaluation => Some(ResourceKind::Evaluation),
            DraftField::Student => Some(ResourceKind::Student),
            _ => None,
        }
    }

    /// Whether the input masks what is typed.
    pub fn is_secret(&self) -> bool {
        matches!(self, DraftField::Password)
    }
}

/// An in-progress create/edit form value.
///
/// Fields hold what the user typed; parsing happens in [`Entity::payload`].
pub trait FormDraft: Default + Clone + fmt::Debug + PartialEq + Send + 'static {
    /// Fields in display order.
    const FIELDS: &'static [DraftField];

    fn get(&self, field: DraftField) -> Option<&str>;

    /// Set a field; returns false if the draft has no such field.
    fn set(&mut self, field: DraftField, value: String) -> bool;
}

/// An entity type with a CRUD endpoint family.
pub trait Entity: Clone + fmt::Debug + DeserializeOwned + Send + Sync + 'static {
    const KIND: ResourceKind;

    type Draft: FormDraft;
    type Payload: Serialize + fmt::Debug + Send + Sync + 'static;

    fn id(&self) -> &str;

    /// Text identifying the row in lists and choices.
    fn label(&self) -> String;

    /// Seed an edit draft from an existing row.
    fn to_draft(&self) -> Self::Draft;

    /// Validate a draft and build the request body.
    ///
    /// `editing_id` is the id being updated, `None` on create.
    fn payload(draft: &Self::Draft, editing_id: Option<&str>)
        -> Result<Self::Payload, ValidationError>;

    fn manager(resources: &Resources) -> &ResourceManager<Self>;

    fn manager_mut(resources: &mut Resources) -> &mut ResourceManager<Self>;

    /// Tag an outcome with its resource so it can cross the task channel.
    fn event(outcome: Outcome<Self>) -> ResourceEvent;
}

/// Result of a background resource operation.
#[derive(Debug)]
pub enum Outcome<E: Entity> {
    Listed {
        ticket: Ticket,
        result: Result<Vec<E>, ApiError>,
    },
    Saved {
        ticket: Ticket,
        target: SaveTarget,
        result: Result<(), ApiError>,
    },
    Removed {
        ticket: Ticket,
        id: String,
        result: Result<(), ApiError>,
    },
    /// The post-mutation delay elapsed; time to re-fetch.
    ReconcileDue { ticket: Ticket },
}

/// An [`Outcome`] tagged with its entity type.
#[derive(Debug)]
pub enum ResourceEvent {
    Course(Outcome<Course>),
    Evaluation(Outcome<Evaluation>),
    Student(Outcome<Student>),
    Teacher(Outcome<Teacher>),
    GradeRecord(Outcome<GradeRecord>),
}

/// Every resource manager, owned by the application root.
#[derive(Debug, Default)]
pub struct Resources {
    pub courses: ResourceManager<Course>,
    pub evaluations: ResourceManager<Evaluation>,
    pub students: ResourceManager<Student>,
    pub teachers: ResourceManager<Teacher>,
    pub grade_records: ResourceManager<GradeRecord>,
}

impl Resources {
    /// Drop every cache and draft; used on logout.
    pub fn reset_all(&mut self) {
        self.courses.reset();
        self.evaluations.reset();
        self.students.reset();
        self.teachers.reset();
        self.grade_records.reset();
    }

    /// Detach one resource from the screen; late results are discarded.
    pub fn unmount(&mut self, kind: ResourceKind) {
        match kind {
            ResourceKind::Course => self.courses.unmount(),
            ResourceKind::Evaluation => self.evaluations.unmount(),
            ResourceKind::Student => self.students.unmount(),
            ResourceKind::Teacher => self.teachers.unmount(),
            ResourceKind::GradeRecord => self.grade_records.unmount(),
        }
    }

    /// `(id, label)` pairs for a foreign-key dropdown.
    pub fn choices(&self, kind: ResourceKind) -> Vec<(String, String)> {
        match kind {
            ResourceKind::Course => self.courses.choices(),
            ResourceKind::Evaluation => self.evaluations.choices(),
            ResourceKind::Student => self.students.choices(),
            ResourceKind::Teacher => self.teachers.choices(),
            ResourceKind::GradeRecord => self.grade_records.choices(),
        }
    }

    /// Label of the row `id` in `kind`, if cached.
    pub fn label_of(&self, kind: ResourceKind, id: &str) -> Option<String> {
        self.choices(kind)
            .into_iter()
            .find(|(candidate, _)| candidate == id)
            .map(|(_, label)| label)
    }
}
