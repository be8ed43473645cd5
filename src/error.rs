//! Centralized error types for APTO.
//!
//! This module aggregates the error enums of each layer and turns any of
//! them into the message shown on the notification line.

use thiserror::Error;

use crate::api::error::ApiError;
use crate::config::ConfigError;
use crate::resource::ValidationError;

/// Shown when the request never got an HTTP answer.
pub const CONNECTION_ERROR_MESSAGE: &str = "Erro de conexão com o servidor";

/// Fallback for a rejected login.
pub const LOGIN_FAILED_MESSAGE: &str = "Erro ao autenticar";

/// Fallback for a rejected registration.
pub const REGISTER_FAILED_MESSAGE: &str = "Erro ao cadastrar";

/// The main application error type.
#[derive(Debug, Error)]
pub enum AppError {
    /// Configuration-related errors.
    #[error("{0}")]
    Config(#[from] ConfigError),

    /// API-related errors.
    #[error("{0}")]
    Api(#[from] ApiError),

    /// Local checks that failed before any request.
    #[error("{0}")]
    Validation(#[from] ValidationError),

    /// IO errors (file system, etc.).
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Terminal-related errors.
    #[error("Terminal error: {0}")]
    Terminal(String),

    /// Generic errors with a message.
    #[error("{0}")]
    Other(String),
}

impl AppError {
    /// Create a terminal error.
    pub fn terminal(msg: impl Into<String>) -> Self {
        AppError::Terminal(msg.into())
    }

    /// Create a generic error.
    pub fn other(msg: impl Into<String>) -> Self {
        AppError::Other(msg.into())
    }

    /// Get a user-friendly message for display.
    pub fn user_message(&self) -> String {
        match self {
            AppError::Config(e) => match e {
                ConfigError::NoConfigDir => {
                    "Não foi possível localizar o diretório de configuração.".to_string()
                }
                ConfigError::CreateDirError(_) => {
                    "Não foi possível criar o diretório de configuração.".to_string()
                }
                ConfigError::ReadError(_) => {
                    "Não foi possível ler o arquivo de configuração.".to_string()
                }
                ConfigError::WriteError(_) | ConfigError::SerializeError(_) => {
                    "Não foi possível salvar a configuração.".to_string()
                }
                ConfigError::ParseError(_) => "Arquivo de configuração inválido.".to_string(),
                ConfigError::ValidationError(msg) => format!("Configuração inválida: {}", msg),
            },
            AppError::Api(e) => api_message(e, "Erro inesperado do servidor"),
            AppError::Validation(e) => e.to_string(),
            AppError::Io(_) => "Falha ao acessar um arquivo.".to_string(),
            AppError::Terminal(msg) => format!("Erro no terminal: {}", msg),
            AppError::Other(msg) => msg.clone(),
        }
    }

    /// Check if this error is critical and prevents the client from running.
    pub fn is_critical(&self) -> bool {
        matches!(self, AppError::Config(_) | AppError::Terminal(_))
    }
}

/// Message for a failed API call.
///
/// The server's own `erro` text wins; a request that never got an answer
/// gets the connection message; anything else gets `fallback`.
pub fn api_message(error: &ApiError, fallback: &str) -> String {
    if let Some(message) = error.server_message() {
        return message.to_string();
    }
    if error.is_connection_failure() {
        return CONNECTION_ERROR_MESSAGE.to_string();
    }
    fallback.to_string()
}

/// Result type for application operations.
pub type Result<T> = std::result::Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_app_error_from_config_error() {
        let app_err: AppError = ConfigError::NoConfigDir.into();
        assert!(matches!(app_err, AppError::Config(ConfigError::NoConfigDir)));
        assert!(app_err.is_critical());
    }

    #[test]
    fn test_server_message_is_verbatim() {
        let err = ApiError::Unauthorized {
            message: Some("Senha incorreta".into()),
        };
        assert_eq!(api_message(&err, LOGIN_FAILED_MESSAGE), "Senha incorreta");
    }

    #[test]
    fn test_fallback_without_server_message() {
        let err = ApiError::Rejected {
            status: 409,
            message: None,
        };
        assert_eq!(api_message(&err, REGISTER_FAILED_MESSAGE), "Erro ao cadastrar");
    }

    #[test]
    fn test_connection_failure_message() {
        let err = ApiError::ConnectionFailed("refused".into());
        assert_eq!(api_message(&err, LOGIN_FAILED_MESSAGE), CONNECTION_ERROR_MESSAGE);
        assert_eq!(AppError::Api(err).user_message(), CONNECTION_ERROR_MESSAGE);
    }

    #[test]
    fn test_validation_message() {
        let err: AppError = ValidationError::MissingCredentials.into();
        assert_eq!(err.user_message(), "Preencha todos os campos");
        assert!(!err.is_critical());
    }

    #[test]
    fn test_config_validation_message() {
        let err = AppError::Config(ConfigError::ValidationError("timeout".into()));
        assert!(err.user_message().contains("timeout"));
    }

    #[test]
    fn test_other_error() {
        let err = AppError::other("algo deu errado");
        assert_eq!(err.user_message(), "algo deu errado");
        assert_eq!(AppError::terminal("x").user_message(), "Erro no terminal: x");
    }
}
