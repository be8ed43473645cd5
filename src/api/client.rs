//! APTO API client implementation.
//!
//! This module turns typed calls into `ApiRequest`s, sends them through a
//! [`Transport`], and maps responses back into values or [`ApiError`]s.
//! It also owns the list policy of the API: a 404 on a list or search
//! endpoint means "no rows", not failure.

use std::sync::Arc;

use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use tracing::{debug, instrument, warn};

use super::auth::BearerToken;
use super::error::{ApiError, Result};
use super::transport::{ApiRequest, ApiResponse, Method, Transport};
use super::types::{
    normalize_ids, Credentials, HistoryEntry, HistoryPayload, LoginResponse, RemedialEvaluation,
    RemedialSummary, Role,
};

/// The APTO API client.
///
/// Cheap to clone; clones share the underlying transport.
#[derive(Debug, Clone)]
pub struct ApiClient {
    transport: Arc<dyn Transport>,
}

impl ApiClient {
    /// Create a client over the given transport.
    pub fn new(transport: Arc<dyn Transport>) -> Self {
        Self { transport }
    }

    /// Authenticate against the role's login endpoint.
    ///
    /// Calls `POST /api/{alunos,professores}/login`.
    #[instrument(skip(self, credentials), fields(role = %role, name = %credentials.name))]
    pub async fn login(&self, role: Role, credentials: &Credentials) -> Result<LoginResponse> {
        let path = format!("/api/{}/login", role.collection());
        let body = to_body(credentials)?;
        let response = self.send(ApiRequest::new(Method::Post, path.as_str()).with_body(body)).await?;
        let value = expect_success(response, &path)?;
        decode(value, &path)
    }

    /// Create an account for the given role.
    ///
    /// Calls `POST /api/{alunos,professores}`.
    #[instrument(skip(self, credentials), fields(role = %role, name = %credentials.name))]
    pub async fn register(&self, role: Role, credentials: &Credentials) -> Result<()> {
        let path = format!("/api/{}", role.collection());
        let body = to_body(credentials)?;
        let response = self.send(ApiRequest::new(Method::Post, path.as_str()).with_body(body)).await?;
        expect_success(response, &path)?;
        Ok(())
    }

    /// Fetch every row of a collection.
    ///
    /// Calls `GET /api/{collection}`; a 404 yields an empty list.
    #[instrument(skip(self, token))]
    pub async fn list<T: DeserializeOwned>(
        &self,
        token: &BearerToken,
        collection: &str,
    ) -> Result<Vec<T>> {
        let path = format!("/api/{}", collection);
        not_found_as_empty(self.get_list(token, &path).await)
    }

    /// Fetch rows whose name matches `term`.
    ///
    /// Calls `GET /api/{collection}/nome/{term}`; an empty term is a plain
    /// list, and a 404 yields an empty list.
    #[instrument(skip(self, token))]
    pub async fn search<T: DeserializeOwned>(
        &self,
        token: &BearerToken,
        collection: &str,
        term: &str,
    ) -> Result<Vec<T>> {
        if term.is_empty() {
            return self.list(token, collection).await;
        }
        let path = format!("/api/{}/nome/{}", collection, urlencoding::encode(term));
        not_found_as_empty(self.get_list(token, &path).await)
    }

    /// Create a row. The response body is not used.
    #[instrument(skip(self, token, body))]
    pub async fn create<B: Serialize>(
        &self,
        token: &BearerToken,
        collection: &str,
        body: &B,
    ) -> Result<()> {
        let path = format!("/api/{}", collection);
        let request = ApiRequest::new(Method::Post, path.as_str())
            .with_body(to_body(body)?)
            .with_token(token);
        expect_success(self.send(request).await?, &path)?;
        Ok(())
    }

    /// Replace a row. The response body is not used.
    #[instrument(skip(self, token, body))]
    pub async fn update<B: Serialize>(
        &self,
        token: &BearerToken,
        collection: &str,
        id: &str,
        body: &B,
    ) -> Result<()> {
        let path = format!("/api/{}/{}", collection, urlencoding::encode(id));
        let request = ApiRequest::new(Method::Put, path.as_str())
            .with_body(to_body(body)?)
            .with_token(token);
        expect_success(self.send(request).await?, &path)?;
        Ok(())
    }

    /// Delete a row.
    #[instrument(skip(self, token))]
    pub async fn delete(&self, token: &BearerToken, collection: &str, id: &str) -> Result<()> {
        let path = format!("/api/{}/{}", collection, urlencoding::encode(id));
        let request = ApiRequest::new(Method::Delete, path.as_str()).with_token(token);
        expect_success(self.send(request).await?, &path)?;
        Ok(())
    }

    /// Evaluations the student must reinforce.
    ///
    /// Calls `GET /api/alunos/{id}/resumo-avaliacoes`; a 404 yields nothing.
    #[instrument(skip(self, token))]
    pub async fn remedial_summary(
        &self,
        token: &BearerToken,
        student_id: &str,
    ) -> Result<Vec<RemedialEvaluation>> {
        let path = format!(
            "/api/alunos/{}/resumo-avaliacoes",
            urlencoding::encode(student_id)
        );
        let result = match self.get_value(token, &path).await {
            Ok(Value::Null) => Ok(Vec::new()),
            Ok(value) => decode::<RemedialSummary>(value, &path).map(|summary| summary.evaluations),
            Err(e) => Err(e),
        };
        not_found_as_empty(result)
    }

    /// Every graded evaluation of the student.
    ///
    /// Calls `GET /api/avaliacoes-alunos/aluno/{id}`; a 404 yields nothing.
    #[instrument(skip(self, token))]
    pub async fn student_history(
        &self,
        token: &BearerToken,
        student_id: &str,
    ) -> Result<Vec<HistoryEntry>> {
        let path = format!(
            "/api/avaliacoes-alunos/aluno/{}",
            urlencoding::encode(student_id)
        );
        let result = match self.get_value(token, &path).await {
            Ok(Value::Null) => Ok(Vec::new()),
            Ok(value) => decode::<HistoryPayload>(value, &path).map(HistoryPayload::into_entries),
            Err(e) => Err(e),
        };
        not_found_as_empty(result)
    }

    async fn get_value(&self, token: &BearerToken, path: &str) -> Result<Value> {
        let request = ApiRequest::new(Method::Get, path).with_token(token);
        expect_success(self.send(request).await?, path)
    }

    async fn get_list<T: DeserializeOwned>(&self, token: &BearerToken, path: &str) -> Result<Vec<T>> {
        let value = self.get_value(token, path).await?;
        if value.is_null() {
            return Ok(Vec::new());
        }
        let items: Vec<T> = decode(value, path)?;
        debug!(count = items.len(), "Fetched list");
        Ok(items)
    }

    async fn send(&self, request: ApiRequest) -> Result<ApiResponse> {
        debug!(method = %request.method, path = %request.path, "Sending request");
        self.transport.send(request).await.map_err(|e| {
            warn!("Request failed before a response: {}", e);
            e
        })
    }
}

/// Turn a non-2xx response into an error carrying the server's message.
fn expect_success(response: ApiResponse, path: &str) -> Result<Value> {
    if response.is_success() {
        Ok(response.body)
    } else {
        let message = response.error_message();
        debug!(status = response.status, ?message, "Error response");
        Err(ApiError::from_status(response.status, path, message))
    }
}

fn not_found_as_empty<T>(result: Result<Vec<T>>) -> Result<Vec<T>> {
    match result {
        Err(ApiError::NotFound(context)) => {
            debug!(%context, "404 on list endpoint, treating as empty");
            Ok(Vec::new())
        }
        other => other,
    }
}

fn decode<T: DeserializeOwned>(mut value: Value, path: &str) -> Result<T> {
    normalize_ids(&mut value);
    serde_json::from_value(value)
        .map_err(|e| ApiError::InvalidResponse(format!("{}: failed to parse response: {}", path, e)))
}

fn to_body<B: Serialize>(body: &B) -> Result<Value> {
    serde_json::to_value(body)
        .map_err(|e| ApiError::InvalidResponse(format!("failed to encode request: {}", e)))
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::api::mock::MockTransport;
    use crate::api::types::Course;

    fn client(mock: &Arc<MockTransport>) -> ApiClient {
        ApiClient::new(mock.clone())
    }

    fn token() -> BearerToken {
        BearerToken::new("t0k3n")
    }

    #[tokio::test]
    async fn test_login_posts_to_role_endpoint() {
        let mock = MockTransport::new();
        mock.respond(
            Method::Post,
            "/api/professores/login",
            200,
            json!({ "token": "jwt", "usuario": { "id": "p1", "nome": "Rui", "tipo": "professor" } }),
        );

        let credentials = Credentials {
            name: "Rui".into(),
            password: "segredo".into(),
        };
        let response = client(&mock).login(Role::Teacher, &credentials).await.unwrap();

        assert_eq!(response.user.role, Role::Teacher);
        let requests = mock.requests();
        assert_eq!(requests.len(), 1);
        assert_eq!(requests[0].token, None);
        assert_eq!(requests[0].body, Some(json!({ "nome": "Rui", "senha": "segredo" })));
    }

    #[tokio::test]
    async fn test_login_failure_carries_server_message() {
        let mock = MockTransport::new();
        mock.respond(Method::Post, "/api/alunos/login", 401, json!({ "erro": "Senha inválida" }));

        let credentials = Credentials {
            name: "Ana".into(),
            password: "nope".into(),
        };
        let err = client(&mock).login(Role::Student, &credentials).await.unwrap_err();

        assert!(matches!(err, ApiError::Unauthorized { .. }));
        assert_eq!(err.server_message(), Some("Senha inválida"));
    }

    #[tokio::test]
    async fn test_list_sends_bearer_token() {
        let mock = MockTransport::new();
        mock.respond(Method::Get, "/api/cursos", 200, json!([{ "id": "c1", "nome": "Física" }]));

        let courses: Vec<Course> = client(&mock).list(&token(), "cursos").await.unwrap();

        assert_eq!(courses.len(), 1);
        assert_eq!(
            mock.requests()[0].token.as_ref().map(BearerToken::header_value),
            Some("Bearer t0k3n".to_string())
        );
    }

    #[tokio::test]
    async fn test_list_404_is_empty() {
        let mock = MockTransport::new();
        mock.respond(Method::Get, "/api/cursos", 404, json!({ "erro": "Nenhum curso" }));

        let courses: Vec<Course> = client(&mock).list(&token(), "cursos").await.unwrap();
        assert!(courses.is_empty());
    }

    #[tokio::test]
    async fn test_list_500_is_error() {
        let mock = MockTransport::new();
        mock.respond(Method::Get, "/api/cursos", 500, json!({ "erro": "Banco indisponível" }));

        let err = client(&mock).list::<Course>(&token(), "cursos").await.unwrap_err();
        assert_eq!(err.server_message(), Some("Banco indisponível"));
    }

    #[tokio::test]
    async fn test_search_encodes_term() {
        let mock = MockTransport::new();
        mock.respond(Method::Get, "/api/cursos/nome/C%C3%A1lculo%20I", 200, json!([]));

        let courses: Vec<Course> = client(&mock)
            .search(&token(), "cursos", "Cálculo I")
            .await
            .unwrap();

        assert!(courses.is_empty());
        assert_eq!(mock.count(Method::Get, "/api/cursos/nome/C%C3%A1lculo%20I"), 1);
    }

    #[tokio::test]
    async fn test_search_with_empty_term_lists_everything() {
        let mock = MockTransport::new();
        mock.respond(Method::Get, "/api/cursos", 200, json!([]));

        let _: Vec<Course> = client(&mock).search(&token(), "cursos", "").await.unwrap();
        assert_eq!(mock.count(Method::Get, "/api/cursos"), 1);
    }

    #[tokio::test]
    async fn test_update_and_delete_paths() {
        let mock = MockTransport::new();
        mock.respond(Method::Put, "/api/cursos/c1", 200, json!({}));
        mock.respond(Method::Delete, "/api/cursos/c1", 204, Value::Null);

        let api = client(&mock);
        api.update(&token(), "cursos", "c1", &json!({ "nome": "Física" }))
            .await
            .unwrap();
        api.delete(&token(), "cursos", "c1").await.unwrap();

        assert_eq!(mock.total(), 2);
    }

    #[tokio::test]
    async fn test_delete_404_is_an_error() {
        let mock = MockTransport::new();
        let err = client(&mock).delete(&token(), "cursos", "gone").await.unwrap_err();
        assert!(err.is_not_found());
    }

    #[tokio::test]
    async fn test_transport_failure_surfaces() {
        let mock = MockTransport::new();
        mock.fail(Method::Get, "/api/cursos", "connection refused");

        let err = client(&mock).list::<Course>(&token(), "cursos").await.unwrap_err();
        assert!(err.is_connection_failure());
    }

    #[tokio::test]
    async fn test_remedial_summary_404_is_empty() {
        let mock = MockTransport::new();
        let entries = client(&mock).remedial_summary(&token(), "s1").await.unwrap();
        assert!(entries.is_empty());
        assert_eq!(mock.count(Method::Get, "/api/alunos/s1/resumo-avaliacoes"), 1);
    }

    #[tokio::test]
    async fn test_student_history_wrapped_shape() {
        let mock = MockTransport::new();
        mock.respond(
            Method::Get,
            "/api/avaliacoes-alunos/aluno/s1",
            200,
            json!({ "avaliacoes": [{ "idAvaliacao": "e1", "nota": 7.0 }] }),
        );

        let entries = client(&mock).student_history(&token(), "s1").await.unwrap();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].score, Some(7.0));
    }

    #[test]
    fn test_register_posts_credentials() {
        let mock = MockTransport::new();
        mock.respond(Method::Post, "/api/alunos", 201, json!({ "id": "s9" }));

        let credentials = Credentials {
            name: "Bia".into(),
            password: "abcd".into(),
        };
        tokio_test::block_on(client(&mock).register(Role::Student, &credentials)).unwrap();

        assert_eq!(mock.count(Method::Post, "/api/alunos"), 1);
        assert_eq!(mock.requests()[0].token, None);
    }
}
