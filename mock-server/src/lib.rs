use std::{collections::BTreeMap, sync::Arc};

use axum::{
    body::Body,
    extract::{Path, State},
    http::{header, HeaderMap, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use base64::{engine::general_purpose::STANDARD, Engine};
use serde::{Deserialize, Serialize};
use tokio::{net::TcpListener, sync::RwLock};

/// Body of `/v3/DATA/attachment`: a PDF header followed by bytes that are
/// not valid UTF-8.
pub const ATTACHMENT_BYTES: &[u8] = &[0x25, 0x50, 0xff, 0xfe, 0x00, 0x80];

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Contact {
    #[serde(rename = "ID")]
    pub id: u64,
    #[serde(rename = "Email")]
    pub email: String,
    #[serde(rename = "Name", default)]
    pub name: String,
}

#[derive(Deserialize)]
pub struct CreateContact {
    #[serde(rename = "Email")]
    pub email: String,
    #[serde(rename = "Name", default)]
    pub name: String,
}

/// Paginated JSON body returned by every REST resource.
#[derive(Debug, Serialize, Deserialize)]
pub struct Envelope<T> {
    #[serde(rename = "Count")]
    pub count: usize,
    #[serde(rename = "Total")]
    pub total: usize,
    #[serde(rename = "Data")]
    pub data: Vec<T>,
}

impl<T> Envelope<T> {
    fn of(data: Vec<T>, total: usize) -> Self {
        Self {
            count: data.len(),
            total,
            data,
        }
    }
}

/// API key pair the server accepts as Basic credentials.
#[derive(Clone, Debug)]
pub struct ApiKeys {
    pub public: String,
    pub private: String,
}

impl ApiKeys {
    pub fn new(public: impl Into<String>, private: impl Into<String>) -> Self {
        Self {
            public: public.into(),
            private: private.into(),
        }
    }

    fn authorization(&self) -> String {
        format!("Basic {}", STANDARD.encode(format!("{}:{}", self.public, self.private)))
    }
}

type Db = Arc<RwLock<BTreeMap<u64, Contact>>>;

#[derive(Clone)]
struct AppState {
    db: Db,
    authorization: Arc<str>,
}

pub fn app(keys: ApiKeys) -> Router {
    let state = AppState {
        db: Arc::new(RwLock::new(BTreeMap::new())),
        authorization: keys.authorization().into(),
    };
    Router::new()
        .route("/v3/REST/contact", get(list_contacts).post(create_contact))
        .route("/v3/REST/contact/{id}", get(get_contact))
        .route("/v3/DATA/contactslist/{id}/CSVData", get(export_contacts))
        .route("/v3/DATA/bulk/{rows}/CSVData", get(export_bulk))
        .route("/v3/DATA/attachment", get(attachment))
        .route("/v3/echo/headers", get(echo_headers))
        .route("/v3/raw", get(raw))
        .with_state(state)
}

pub async fn run(listener: TcpListener, keys: ApiKeys) -> Result<(), std::io::Error> {
    if let Ok(addr) = listener.local_addr() {
        tracing::info!(%addr, "mock email API listening");
    }
    axum::serve(listener, app(keys)).await
}

fn check_auth(state: &AppState, headers: &HeaderMap) -> Result<(), StatusCode> {
    let given = headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok());
    if given == Some(&*state.authorization) {
        return Ok(());
    }
    tracing::debug!("rejected request with missing or wrong credentials");
    Err(StatusCode::UNAUTHORIZED)
}

async fn list_contacts(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Json<Envelope<Contact>>, StatusCode> {
    check_auth(&state, &headers)?;
    let contacts = state.db.read().await;
    let data: Vec<Contact> = contacts.values().cloned().collect();
    let total = data.len();
    Ok(Json(Envelope::of(data, total)))
}

async fn create_contact(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(input): Json<CreateContact>,
) -> Result<(StatusCode, Json<Envelope<Contact>>), StatusCode> {
    check_auth(&state, &headers)?;
    let mut contacts = state.db.write().await;
    let id = contacts.keys().next_back().map_or(1, |last| last + 1);
    let contact = Contact {
        id,
        email: input.email,
        name: input.name,
    };
    contacts.insert(id, contact.clone());
    tracing::debug!(id, "contact created");
    Ok((StatusCode::CREATED, Json(Envelope::of(vec![contact], 1))))
}

async fn get_contact(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(id): Path<u64>,
) -> Result<Json<Envelope<Contact>>, StatusCode> {
    check_auth(&state, &headers)?;
    let contacts = state.db.read().await;
    let contact = contacts.get(&id).cloned().ok_or(StatusCode::NOT_FOUND)?;
    Ok(Json(Envelope::of(vec![contact], 1)))
}

async fn export_contacts(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(_list_id): Path<u64>,
) -> Result<impl IntoResponse, StatusCode> {
    check_auth(&state, &headers)?;
    let contacts = state.db.read().await;
    let records = std::iter::once(["email", "name"])
        .chain(contacts.values().map(|c| [c.email.as_str(), c.name.as_str()]));
    csv_response(records)
}

/// Synthetic export of `rows` generated contacts, for large-body tests.
async fn export_bulk(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(rows): Path<u64>,
) -> Result<impl IntoResponse, StatusCode> {
    check_auth(&state, &headers)?;
    let records = (1..=rows).map(|i| [i.to_string(), format!("contact{i}@example.com")]);
    csv_response(records)
}

fn csv_response<I, R>(
    records: I,
) -> Result<([(header::HeaderName, &'static str); 1], Vec<u8>), StatusCode>
where
    I: IntoIterator<Item = R>,
    R: IntoIterator,
    R::Item: AsRef<[u8]>,
{
    let body = render_csv(records).map_err(|err| {
        tracing::error!(%err, "csv export failed");
        StatusCode::INTERNAL_SERVER_ERROR
    })?;
    Ok(([(header::CONTENT_TYPE, "text/csv")], body))
}

fn render_csv<I, R>(records: I) -> Result<Vec<u8>, csv::Error>
where
    I: IntoIterator<Item = R>,
    R: IntoIterator,
    R::Item: AsRef<[u8]>,
{
    let mut writer = csv::Writer::from_writer(Vec::new());
    for record in records {
        writer.write_record(record)?;
    }
    writer.into_inner().map_err(|err| err.into_error().into())
}

async fn attachment() -> impl IntoResponse {
    (
        [
            (header::CONTENT_TYPE, HeaderValue::from_static("application/pdf")),
            (
                header::CONTENT_DISPOSITION,
                HeaderValue::from_bytes(b"attachment; filename=\"r\xe9sum\xe9.pdf\"")
                    .unwrap_or_else(|_| HeaderValue::from_static("attachment")),
            ),
        ],
        ATTACHMENT_BYTES,
    )
}

async fn echo_headers(headers: HeaderMap) -> Json<Envelope<[String; 2]>> {
    let data: Vec<[String; 2]> = headers
        .iter()
        .filter_map(|(name, value)| {
            value
                .to_str()
                .ok()
                .map(|v| [name.as_str().to_string(), v.to_string()])
        })
        .collect();
    let total = data.len();
    Json(Envelope::of(data, total))
}

// No Content-Type header on this response.
async fn raw() -> Response {
    Response::new(Body::from("pong"))
}
