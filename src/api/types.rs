//! APTO API request and response types.
//!
//! Wire names follow the API (Portuguese field names); Rust names describe
//! the meaning. Ids are accepted as strings or numbers and under either
//! `id` or `_id`, since the API is not consistent about it. Bodies that
//! carry both keys go through [`normalize_ids`] before decoding.

use std::fmt;

use chrono::NaiveDate;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

/// The two kinds of account.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Role {
    #[default]
    #[serde(rename = "aluno")]
    Student,
    #[serde(rename = "professor")]
    Teacher,
}

impl Role {
    /// Collection segment for this role's endpoints.
    pub fn collection(&self) -> &'static str {
        match self {
            Role::Student => "alunos",
            Role::Teacher => "professores",
        }
    }

    /// Label shown in the UI.
    pub fn label(&self) -> &'static str {
        match self {
            Role::Student => "Aluno",
            Role::Teacher => "Professor",
        }
    }

    /// Parse the wire value.
    pub fn from_wire(value: &str) -> Option<Self> {
        match value {
            "aluno" => Some(Role::Student),
            "professor" => Some(Role::Teacher),
            _ => None,
        }
    }

    /// The wire value.
    pub fn wire(&self) -> &'static str {
        match self {
            Role::Student => "aluno",
            Role::Teacher => "professor",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// The signed-in user's profile.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    #[serde(alias = "_id", deserialize_with = "id_string")]
    pub id: String,
    #[serde(rename = "nome")]
    pub display_name: String,
    #[serde(rename = "tipo")]
    pub role: Role,
}

/// Body for login and registration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Credentials {
    #[serde(rename = "nome")]
    pub name: String,
    #[serde(rename = "senha")]
    pub password: String,
}

/// Successful login response.
#[derive(Debug, Clone, Deserialize)]
pub struct LoginResponse {
    pub token: String,
    #[serde(rename = "usuario")]
    pub user: User,
}

/// A course.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Course {
    #[serde(alias = "_id", deserialize_with = "id_string")]
    pub id: String,
    #[serde(rename = "nome")]
    pub name: String,
    #[serde(rename = "descricao", default)]
    pub description: String,
    /// Course a student is sent to for reinforcement.
    #[serde(
        rename = "idCursoReforco",
        default,
        deserialize_with = "optional_id_ref"
    )]
    pub remedial_course_id: Option<String>,
}

/// An evaluation (exam, assignment) belonging to a course.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Evaluation {
    #[serde(alias = "_id", deserialize_with = "id_string")]
    pub id: String,
    #[serde(rename = "nome")]
    pub name: String,
    #[serde(rename = "descricao", default)]
    pub description: String,
    #[serde(rename = "idCurso", deserialize_with = "id_string")]
    pub course_id: String,
    #[serde(
        rename = "data",
        default,
        with = "optional_date_format",
        skip_serializing_if = "Option::is_none"
    )]
    pub date: Option<NaiveDate>,
}

/// A student account.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Student {
    #[serde(alias = "_id", deserialize_with = "id_string")]
    pub id: String,
    #[serde(rename = "nome")]
    pub name: String,
}

/// A teacher account.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Teacher {
    #[serde(alias = "_id", deserialize_with = "id_string")]
    pub id: String,
    #[serde(rename = "nome")]
    pub name: String,
}

/// A student's score on one evaluation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GradeRecord {
    #[serde(alias = "_id", deserialize_with = "id_string")]
    pub id: String,
    #[serde(rename = "idAvaliacao", deserialize_with = "id_string")]
    pub evaluation_id: String,
    #[serde(rename = "idAluno", deserialize_with = "id_string")]
    pub student_id: String,
    #[serde(rename = "nota")]
    pub score: f64,
    #[serde(rename = "observacao", default)]
    pub notes: String,
}

/// Response of `GET /api/alunos/{id}/resumo-avaliacoes`.
#[derive(Debug, Clone, Deserialize)]
pub struct RemedialSummary {
    #[serde(rename = "idAluno", default, deserialize_with = "optional_id_ref")]
    pub student_id: Option<String>,
    #[serde(rename = "avaliacoesComReforco", default)]
    pub evaluations: Vec<RemedialEvaluation>,
}

/// One evaluation the student must reinforce.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct RemedialEvaluation {
    #[serde(rename = "idAvaliacao", deserialize_with = "evaluation_ref")]
    pub evaluation: EvaluationRef,
    #[serde(rename = "nomeCurso", default)]
    pub course_name: Option<String>,
    #[serde(rename = "nota", default)]
    pub score: Option<f64>,
    #[serde(rename = "data", default, with = "optional_date_format")]
    pub date: Option<NaiveDate>,
}

impl RemedialEvaluation {
    /// Date used for ordering: the entry's own, else the evaluation's.
    pub fn date(&self) -> Option<NaiveDate> {
        self.date.or(self.evaluation.date)
    }
}

/// One graded evaluation in a student's history.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct HistoryEntry {
    #[serde(alias = "_id", default, deserialize_with = "optional_id_ref")]
    pub id: Option<String>,
    #[serde(rename = "idAvaliacao", deserialize_with = "evaluation_ref")]
    pub evaluation: EvaluationRef,
    #[serde(rename = "nota", default)]
    pub score: Option<f64>,
    #[serde(rename = "observacao", default)]
    pub notes: Option<String>,
    #[serde(rename = "data", default, with = "optional_date_format")]
    pub date: Option<NaiveDate>,
}

impl HistoryEntry {
    /// Date used for ordering: the entry's own, else the evaluation's.
    pub fn date(&self) -> Option<NaiveDate> {
        self.date.or(self.evaluation.date)
    }
}

/// The history endpoint returns either a bare array or `{avaliacoes: [...]}`.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum HistoryPayload {
    List(Vec<HistoryEntry>),
    Wrapped {
        #[serde(rename = "avaliacoes", default)]
        evaluations: Vec<HistoryEntry>,
    },
}

impl HistoryPayload {
    pub fn into_entries(self) -> Vec<HistoryEntry> {
        match self {
            HistoryPayload::List(entries) => entries,
            HistoryPayload::Wrapped { evaluations } => evaluations,
        }
    }
}

/// A reference to an evaluation: a bare id, or the populated document.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct EvaluationRef {
    pub id: String,
    pub name: Option<String>,
    pub course_name: Option<String>,
    pub date: Option<NaiveDate>,
}

/// Drop `_id` from every object that also has `id`, so the aliased id
/// fields do not see a duplicate key.
pub fn normalize_ids(value: &mut Value) {
    match value {
        Value::Object(map) => {
            if map.contains_key("id") {
                map.remove("_id");
            }
            map.values_mut().for_each(normalize_ids);
        }
        Value::Array(items) => items.iter_mut().for_each(normalize_ids),
        _ => {}
    }
}

/// Accept `"abc"`, `42`, or a populated object with `id`/`_id`.
fn value_to_id(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Object(map) => map.get("id").or_else(|| map.get("_id")).and_then(value_to_id),
        _ => None,
    }
}

fn id_string<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    let value = Value::deserialize(deserializer)?;
    value_to_id(&value).ok_or_else(|| serde::de::Error::custom(format!("invalid id: {}", value)))
}

fn optional_id_ref<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<String>, D::Error> {
    let value = Value::deserialize(deserializer)?;
    Ok(value_to_id(&value).filter(|id| !id.is_empty()))
}

fn evaluation_ref<'de, D: Deserializer<'de>>(deserializer: D) -> Result<EvaluationRef, D::Error> {
    let value = Value::deserialize(deserializer)?;
    let id = value_to_id(&value)
        .ok_or_else(|| serde::de::Error::custom(format!("invalid evaluation: {}", value)))?;

    let field = |name: &str| value.get(name).and_then(Value::as_str).map(str::to_string);
    let course_name = value
        .get("idCurso")
        .and_then(|c| c.get("nome"))
        .and_then(Value::as_str)
        .map(str::to_string);

    Ok(EvaluationRef {
        id,
        name: field("nome"),
        course_name,
        date: field("data").and_then(|d| date_format::parse(&d)),
    })
}

/// `YYYY-MM-DD` dates; RFC 3339 timestamps are truncated to their date.
pub mod date_format {
    use chrono::NaiveDate;
    use serde::{Deserialize, Deserializer, Serializer};

    const FORMAT: &str = "%Y-%m-%d";

    pub fn parse(value: &str) -> Option<NaiveDate> {
        let day = value.trim().get(..10)?;
        NaiveDate::parse_from_str(day, FORMAT).ok()
    }

    pub fn serialize<S: Serializer>(date: &NaiveDate, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&date.format(FORMAT).to_string())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<NaiveDate, D::Error> {
        let raw = String::deserialize(deserializer)?;
        parse(&raw).ok_or_else(|| serde::de::Error::custom(format!("invalid date: {}", raw)))
    }
}

mod optional_date_format {
    use chrono::NaiveDate;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(date: &Option<NaiveDate>, serializer: S) -> Result<S::Ok, S::Error> {
        match date {
            Some(date) => super::date_format::serialize(date, serializer),
            None => serializer.serialize_none(),
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<Option<NaiveDate>, D::Error> {
        let raw = Option::<String>::deserialize(deserializer)?;
        Ok(raw.as_deref().and_then(super::date_format::parse))
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn test_role_wire_names() {
        assert_eq!(serde_json::to_value(Role::Student).unwrap(), json!("aluno"));
        assert_eq!(serde_json::to_value(Role::Teacher).unwrap(), json!("professor"));
        assert_eq!(Role::from_wire("professor"), Some(Role::Teacher));
        assert_eq!(Role::from_wire("admin"), None);
        assert_eq!(Role::Teacher.collection(), "professores");
    }

    #[test]
    fn test_login_response_parses() {
        let response: LoginResponse = serde_json::from_value(json!({
            "token": "jwt",
            "usuario": { "id": 7, "nome": "Ana", "tipo": "aluno" }
        }))
        .unwrap();

        assert_eq!(response.token, "jwt");
        assert_eq!(response.user.id, "7");
        assert_eq!(response.user.display_name, "Ana");
        assert_eq!(response.user.role, Role::Student);
    }

    #[test]
    fn test_credentials_serialize_with_wire_names() {
        let body = serde_json::to_value(Credentials {
            name: "Ana".into(),
            password: "abcd".into(),
        })
        .unwrap();
        assert_eq!(body, json!({ "nome": "Ana", "senha": "abcd" }));
    }

    #[test]
    fn test_course_accepts_underscore_id_and_null_remedial() {
        let course: Course = serde_json::from_value(json!({
            "_id": "c1",
            "nome": "Cálculo",
            "descricao": "Limites",
            "idCursoReforco": null
        }))
        .unwrap();

        assert_eq!(course.id, "c1");
        assert_eq!(course.remedial_course_id, None);
    }

    #[test]
    fn test_evaluation_accepts_populated_course_and_timestamp() {
        let evaluation: Evaluation = serde_json::from_value(json!({
            "id": "e1",
            "nome": "Prova 1",
            "idCurso": { "_id": "c1", "nome": "Cálculo" },
            "data": "2024-03-01T00:00:00.000Z"
        }))
        .unwrap();

        assert_eq!(evaluation.course_id, "c1");
        assert_eq!(evaluation.date, NaiveDate::from_ymd_opt(2024, 3, 1));
        assert_eq!(evaluation.description, "");
    }

    #[test]
    fn test_evaluation_list_tolerates_missing_date() {
        let evaluations: Vec<Evaluation> = serde_json::from_value(json!([
            { "id": "e1", "nome": "Prova 1", "idCurso": "c1", "data": "2024-03-01" },
            { "id": "e2", "nome": "Trabalho", "idCurso": "c1" },
            { "id": "e3", "nome": "Seminário", "idCurso": "c1", "data": null }
        ]))
        .unwrap();

        assert_eq!(evaluations.len(), 3);
        assert_eq!(evaluations[1].date, None);
        assert_eq!(evaluations[2].date, None);
    }

    #[test]
    fn test_body_with_both_id_keys_decodes_after_normalizing() {
        let mut value = json!([
            { "id": "c1", "_id": "c1", "nome": "Física", "idCursoReforco": { "id": "c2", "_id": "c2" } },
            { "_id": "c2", "nome": "Física Básica" }
        ]);
        assert!(serde_json::from_value::<Vec<Course>>(value.clone()).is_err());

        normalize_ids(&mut value);
        let courses: Vec<Course> = serde_json::from_value(value).unwrap();
        assert_eq!(courses[0].id, "c1");
        assert_eq!(courses[0].remedial_course_id.as_deref(), Some("c2"));
        assert_eq!(courses[1].id, "c2");
    }

    #[test]
    fn test_evaluation_date_serializes_as_day() {
        let evaluation = Evaluation {
            id: "e1".into(),
            name: "Prova".into(),
            description: String::new(),
            course_id: "c1".into(),
            date: NaiveDate::from_ymd_opt(2024, 1, 10),
        };
        let value = serde_json::to_value(&evaluation).unwrap();
        assert_eq!(value["data"], json!("2024-01-10"));
    }

    #[test]
    fn test_history_payload_both_shapes() {
        let bare: HistoryPayload = serde_json::from_value(json!([
            { "idAvaliacao": "e1", "nota": 6.5 }
        ]))
        .unwrap();
        assert_eq!(bare.into_entries().len(), 1);

        let wrapped: HistoryPayload = serde_json::from_value(json!({
            "avaliacoes": [
                { "idAvaliacao": { "_id": "e1", "nome": "Prova", "data": "2024-02-15" }, "nota": 8.0 },
                { "idAvaliacao": "e2", "nota": 9.0 }
            ]
        }))
        .unwrap();
        let entries = wrapped.into_entries();
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].evaluation.name.as_deref(), Some("Prova"));
        assert_eq!(entries[0].date(), NaiveDate::from_ymd_opt(2024, 2, 15));
    }

    #[test]
    fn test_remedial_summary_parses() {
        let summary: RemedialSummary = serde_json::from_value(json!({
            "idAluno": "s1",
            "avaliacoesComReforco": [
                { "idAvaliacao": "e1", "nomeCurso": "Física", "nota": 5.5, "data": "2024-01-10" }
            ]
        }))
        .unwrap();

        assert_eq!(summary.student_id.as_deref(), Some("s1"));
        assert_eq!(summary.evaluations[0].course_name.as_deref(), Some("Física"));
        assert_eq!(summary.evaluations[0].date(), NaiveDate::from_ymd_opt(2024, 1, 10));
    }

    #[test]
    fn test_date_format_rejects_garbage() {
        assert_eq!(date_format::parse("soon"), None);
        assert_eq!(date_format::parse("2024-13-01"), None);
    }
}
