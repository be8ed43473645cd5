//! Authentication state.
//!
//! The [`SessionStore`] owns the signed-in [`Session`] together with the
//! login and registration forms. Like the resource managers it never does
//! I/O: `begin_*` validates and hands back what to send, `apply_*` takes the
//! answer. Answers carry the epoch they were started under and are dropped
//! once a logout has moved it.

use tracing::{debug, info, warn};

use crate::api::types::{Credentials, LoginResponse, Role, User};
use crate::api::{ApiError, BearerToken};
use crate::resource::validation::{self, ValidationError};

/// An authenticated session. Its presence is what "signed in" means.
#[derive(Debug, Clone)]
pub struct Session {
    token: BearerToken,
    user: User,
}

impl Session {
    pub fn new(token: BearerToken, user: User) -> Self {
        Self { token, user }
    }

    pub fn token(&self) -> &BearerToken {
        &self.token
    }

    pub fn user(&self) -> &User {
        &self.user
    }

    pub fn role(&self) -> Role {
        self.user.role
    }
}

/// Inputs of the login and registration forms.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CredentialField {
    Name,
    Password,
    ConfirmPassword,
}

impl CredentialField {
    pub fn label(&self) -> &'static str {
        match self {
            CredentialField::Name => "Nome",
            CredentialField::Password => "Senha",
            CredentialField::ConfirmPassword => "Confirmar senha",
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct LoginForm {
    pub name: String,
    pub password: String,
    pub role: Role,
    loading: bool,
}

impl LoginForm {
    pub fn is_loading(&self) -> bool {
        self.loading
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct RegisterForm {
    pub name: String,
    pub password: String,
    pub confirm_password: String,
    loading: bool,
}

impl RegisterForm {
    pub fn is_loading(&self) -> bool {
        self.loading
    }
}

/// Effect of feeding a login answer back.
#[derive(Debug)]
pub enum LoginApplied {
    Stale,
    SignedIn(Role),
    Failed(ApiError),
}

/// Effect of feeding a registration answer back.
#[derive(Debug)]
pub enum RegisterApplied {
    Stale,
    Registered,
    Failed(ApiError),
}

#[derive(Debug, Default)]
pub struct SessionStore {
    session: Option<Session>,
    login: LoginForm,
    register: RegisterForm,
    epoch: u64,
}

impl SessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn session(&self) -> Option<&Session> {
        self.session.as_ref()
    }

    pub fn is_authenticated(&self) -> bool {
        self.session.is_some()
    }

    pub fn token(&self) -> Option<&BearerToken> {
        self.session.as_ref().map(Session::token)
    }

    pub fn user(&self) -> Option<&User> {
        self.session.as_ref().map(Session::user)
    }

    pub fn role(&self) -> Option<Role> {
        self.session.as_ref().map(Session::role)
    }

    pub fn login_form(&self) -> &LoginForm {
        &self.login
    }

    pub fn register_form(&self) -> &RegisterForm {
        &self.register
    }

    pub fn epoch(&self) -> u64 {
        self.epoch
    }

    pub fn is_current(&self, epoch: u64) -> bool {
        self.epoch == epoch
    }

    // ========================================================================
    // Login
    // ========================================================================

    pub fn set_login_field(&mut self, field: CredentialField, value: String) {
        match field {
            CredentialField::Name => self.login.name = value,
            CredentialField::Password => self.login.password = value,
            CredentialField::ConfirmPassword => {}
        }
    }

    pub fn set_login_role(&mut self, role: Role) {
        self.login.role = role;
    }

    /// Validate the login form and mark it as submitting.
    ///
    /// `Ok(None)` means a submit is already in flight or a session exists.
    pub fn begin_login(&mut self) -> Result<Option<(Role, Credentials)>, ValidationError> {
        if self.login.loading || self.session.is_some() {
            return Ok(None);
        }
        if self.login.name.trim().is_empty() || self.login.password.is_empty() {
            return Err(ValidationError::MissingCredentials);
        }

        self.login.loading = true;
        Ok(Some((
            self.login.role,
            Credentials {
                name: self.login.name.trim().to_string(),
                password: self.login.password.clone(),
            },
        )))
    }

    pub fn apply_login(&mut self, epoch: u64, result: Result<LoginResponse, ApiError>) -> LoginApplied {
        if !self.is_current(epoch) {
            debug!("Dropping stale login answer");
            return LoginApplied::Stale;
        }
        self.login.loading = false;

        match result {
            Ok(response) => {
                let role = response.user.role;
                info!(user = %response.user.display_name, role = %role, "Signed in");
                self.session = Some(Session::new(BearerToken::new(response.token), response.user));
                self.login = LoginForm {
                    role,
                    ..LoginForm::default()
                };
                LoginApplied::SignedIn(role)
            }
            Err(e) => {
                warn!(error = %e, "Login failed");
                self.login.password.clear();
                LoginApplied::Failed(e)
            }
        }
    }

    /// End the session and forget both forms.
    pub fn logout(&mut self) -> Option<Session> {
        self.epoch += 1;
        self.login = LoginForm::default();
        self.register = RegisterForm::default();
        let ended = self.session.take();
        if let Some(session) = &ended {
            info!(user = %session.user.display_name, "Signed out");
        }
        ended
    }

    // ========================================================================
    // Registration
    // ========================================================================

    pub fn set_register_field(&mut self, field: CredentialField, value: String) {
        match field {
            CredentialField::Name => self.register.name = value,
            CredentialField::Password => self.register.password = value,
            CredentialField::ConfirmPassword => self.register.confirm_password = value,
        }
    }

    /// Validate the registration form for `role` and mark it as submitting.
    pub fn begin_register(&mut self, role: Role) -> Result<Option<(Role, Credentials)>, ValidationError> {
        if self.register.loading {
            return Ok(None);
        }
        let form = &self.register;
        if form.name.trim().is_empty() || form.password.is_empty() {
            return Err(ValidationError::MissingCredentials);
        }
        if form.password != form.confirm_password {
            return Err(ValidationError::PasswordMismatch);
        }
        let password = validation::password(&form.password)?;

        let credentials = Credentials {
            name: form.name.trim().to_string(),
            password,
        };
        self.register.loading = true;
        Ok(Some((role, credentials)))
    }

    pub fn apply_registered(&mut self, epoch: u64, result: Result<(), ApiError>) -> RegisterApplied {
        if !self.is_current(epoch) {
            debug!("Dropping stale registration answer");
            return RegisterApplied::Stale;
        }
        self.register.loading = false;

        match result {
            Ok(()) => {
                info!(name = %self.register.name, "Account created");
                self.register = RegisterForm::default();
                RegisterApplied::Registered
            }
            Err(e) => {
                warn!(error = %e, "Registration failed");
                RegisterApplied::Failed(e)
            }
        }
    }

    /// Forget the registration form, e.g. when leaving its page.
    pub fn clear_register_form(&mut self) {
        self.register = RegisterForm::default();
    }
}
