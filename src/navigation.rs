//! Page state and the transitions between pages.
//!
//! There is no history stack. Every move is one of a few named transitions,
//! and each is only valid from specific pages and for a specific role.
//! A destination that is not reachable lands on [`Page::NotFound`].

use std::fmt;

use thiserror::Error;
use tracing::{debug, warn};

use crate::api::types::Role;
use crate::resource::ResourceKind;

/// Every screen of the client.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Page {
    #[default]
    Login,
    Register(Role),
    StudentHome,
    TeacherHome,
    RemedialEvaluations,
    AllEvaluations,
    ManageCourses,
    ManageEvaluations,
    ManageGradeRecords,
    ManageStudents,
    ManageTeachers,
    NotFound,
}

impl Page {
    /// Dashboard of a role.
    pub fn home(role: Role) -> Page {
        match role {
            Role::Student => Page::StudentHome,
            Role::Teacher => Page::TeacherHome,
        }
    }

    pub fn title(&self) -> &'static str {
        match self {
            Page::Login => "Entrar",
            Page::Register(Role::Student) => "Cadastro de aluno",
            Page::Register(Role::Teacher) => "Cadastro de professor",
            Page::StudentHome => "Painel do aluno",
            Page::TeacherHome => "Painel do professor",
            Page::RemedialEvaluations => "Avaliações com reforço",
            Page::AllEvaluations => "Todas as avaliações",
            Page::ManageCourses => "Gerenciar cursos",
            Page::ManageEvaluations => "Gerenciar avaliações",
            Page::ManageGradeRecords => "Gerenciar notas",
            Page::ManageStudents => "Gerenciar alunos",
            Page::ManageTeachers => "Gerenciar professores",
            Page::NotFound => "Página não encontrada",
        }
    }

    /// Role a page is restricted to; `None` for the public pages.
    pub fn required_role(&self) -> Option<Role> {
        match self {
            Page::Login | Page::Register(_) | Page::NotFound => None,
            Page::StudentHome | Page::RemedialEvaluations | Page::AllEvaluations => {
                Some(Role::Student)
            }
            Page::TeacherHome
            | Page::ManageCourses
            | Page::ManageEvaluations
            | Page::ManageGradeRecords
            | Page::ManageStudents
            | Page::ManageTeachers => Some(Role::Teacher),
        }
    }

    /// The dashboard a sub-page returns to.
    pub fn parent(&self) -> Option<Page> {
        match self {
            Page::RemedialEvaluations | Page::AllEvaluations => Some(Page::StudentHome),
            Page::ManageCourses
            | Page::ManageEvaluations
            | Page::ManageGradeRecords
            | Page::ManageStudents
            | Page::ManageTeachers => Some(Page::TeacherHome),
            _ => None,
        }
    }

    /// Sub-pages listed on a dashboard, in menu order.
    pub fn children(&self) -> &'static [Page] {
        match self {
            Page::StudentHome => &[Page::RemedialEvaluations, Page::AllEvaluations],
            Page::TeacherHome => &[
                Page::ManageCourses,
                Page::ManageEvaluations,
                Page::ManageGradeRecords,
                Page::ManageStudents,
                Page::ManageTeachers,
            ],
            _ => &[],
        }
    }

    /// The resource a management page lists.
    pub fn managed_resource(&self) -> Option<ResourceKind> {
        match self {
            Page::ManageCourses => Some(ResourceKind::Course),
            Page::ManageEvaluations => Some(ResourceKind::Evaluation),
            Page::ManageGradeRecords => Some(ResourceKind::GradeRecord),
            Page::ManageStudents => Some(ResourceKind::Student),
            Page::ManageTeachers => Some(ResourceKind::Teacher),
            _ => None,
        }
    }

    /// Resources whose state survives while this page is shown: the managed
    /// one plus the ones its form draws choices from.
    pub fn mounted_resources(&self) -> &'static [ResourceKind] {
        match self {
            Page::ManageCourses => &[ResourceKind::Course],
            Page::ManageEvaluations => &[ResourceKind::Evaluation, ResourceKind::Course],
            Page::ManageGradeRecords => &[
                ResourceKind::GradeRecord,
                ResourceKind::Evaluation,
                ResourceKind::Student,
            ],
            Page::ManageStudents => &[ResourceKind::Student],
            Page::ManageTeachers => &[ResourceKind::Teacher],
            _ => &[],
        }
    }

    pub fn mounts(&self, kind: ResourceKind) -> bool {
        self.mounted_resources().contains(&kind)
    }

    /// Whether the page shows the signed-in student's records.
    pub fn shows_student_records(&self) -> bool {
        matches!(self, Page::RemedialEvaluations | Page::AllEvaluations)
    }
}

impl fmt::Display for Page {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.title())
    }
}

/// Why a transition was refused.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum NavigationError {
    #[error("{to} não é acessível a partir de {from}")]
    Unreachable { from: Page, to: Page },

    #[error("Faça login para acessar {0}")]
    SignedOut(Page),

    #[error("{page} é restrita a {role}")]
    Forbidden { page: Page, role: Role },
}

/// Holds the current page.
#[derive(Debug, Default)]
pub struct Navigator {
    current: Page,
}

impl Navigator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn current(&self) -> Page {
        self.current
    }

    /// Check whether `to` may be entered from the current page.
    ///
    /// `role` is the signed-in user's role, `None` when signed out.
    pub fn check(&self, to: Page, role: Option<Role>) -> Result<(), NavigationError> {
        let from = self.current;
        if let Some(required) = to.required_role() {
            match role {
                None => return Err(NavigationError::SignedOut(to)),
                Some(actual) if actual != required => {
                    return Err(NavigationError::Forbidden {
                        page: to,
                        role: required,
                    })
                }
                Some(_) => {}
            }
        }

        let reachable = match to {
            Page::NotFound => true,
            Page::Login => role.is_none(),
            Page::Register(_) => role.is_none() && from == Page::Login,
            Page::StudentHome | Page::TeacherHome => {
                matches!(from, Page::Login | Page::NotFound) || from.parent() == Some(to)
            }
            child => child.parent() == Some(from),
        };

        if reachable || from == to {
            Ok(())
        } else {
            Err(NavigationError::Unreachable { from, to })
        }
    }

    /// Move to `to`, or to [`Page::NotFound`] if it is not reachable.
    ///
    /// Returns the page actually entered.
    pub fn navigate(&mut self, to: Page, role: Option<Role>) -> Page {
        match self.check(to, role) {
            Ok(()) => {
                debug!(from = %self.current, to = %to, "Navigating");
                self.current = to;
            }
            Err(e) => {
                warn!(error = %e, "Navigation refused");
                self.current = Page::NotFound;
            }
        }
        self.current
    }

    // ========================================================================
    // Named transitions
    // ========================================================================

    /// Login page to the registration form for `role`.
    pub fn open_register(&mut self, role: Role) -> Page {
        self.navigate(Page::Register(role), None)
    }

    /// Registration form back to the login page.
    pub fn back_to_login(&mut self) -> Page {
        if matches!(self.current, Page::Register(_)) {
            self.navigate(Page::Login, None)
        } else {
            self.current
        }
    }

    /// Login page to the dashboard of a freshly signed-in user.
    pub fn enter_home(&mut self, role: Role) -> Page {
        self.navigate(Page::home(role), Some(role))
    }

    /// Dashboard to one of its sub-pages.
    pub fn open(&mut self, page: Page, role: Role) -> Page {
        self.navigate(page, Some(role))
    }

    /// The one way back from a sub-page, or out of [`Page::NotFound`].
    pub fn back_to_dashboard(&mut self, role: Option<Role>) -> Page {
        let target = match (self.current, role) {
            (Page::NotFound, Some(role)) => Page::home(role),
            (Page::NotFound, None) => Page::Login,
            (page, _) => match page.parent() {
                Some(parent) => parent,
                None => return self.current,
            },
        };
        self.navigate(target, role)
    }

    /// Return to the login page unconditionally.
    pub fn logout(&mut self) -> Page {
        self.current = Page::Login;
        self.current
    }
}
