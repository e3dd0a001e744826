use crate::http::AppState;
use crate::models::{Book, CreateBookError, FindAllBooksError, FindBookError, FindBookRequest};
use crate::repositories::BookRepository;
use crate::validation::{ValidationFailure, validate_book};
use axum::extract::rejection::{JsonRejection, PathRejection};
use axum::extract::{Json, Path, State};
use axum::http::{Method, StatusCode, Uri};
use axum::response::IntoResponse;
use serde::Serialize;
use serde_json::Value;

#[derive(Debug)]
pub struct ApiSuccess<T: Serialize>(StatusCode, Json<T>);

impl<T: Serialize> ApiSuccess<T> {
    pub const fn new(status: StatusCode, data: T) -> Self {
        Self(status, Json(data))
    }
}

impl<T: Serialize> IntoResponse for ApiSuccess<T> {
    fn into_response(self) -> axum::response::Response {
        (self.0, self.1).into_response()
    }
}

/// Body of every error response: `{"message": ...}`.
#[derive(Debug, Serialize)]
pub struct ApiErrorBody {
    message: ErrorMessage,
}

#[derive(Debug, Serialize)]
#[serde(untagged)]
pub enum ErrorMessage {
    One(String),
    Many(Vec<String>),
}

#[derive(Debug)]
pub enum ApiError {
    InternalServerError(String),
    BadRequest(ErrorMessage),
    NotFound(String),
    MethodNotAllowed(String),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> axum::response::Response {
        let (status, message) = match self {
            Self::InternalServerError(msg) => {
                (StatusCode::INTERNAL_SERVER_ERROR, ErrorMessage::One(msg))
            }
            Self::BadRequest(message) => (StatusCode::BAD_REQUEST, message),
            Self::NotFound(msg) => (StatusCode::NOT_FOUND, ErrorMessage::One(msg)),
            Self::MethodNotAllowed(msg) => {
                (StatusCode::METHOD_NOT_ALLOWED, ErrorMessage::One(msg))
            }
        };
        (status, Json(ApiErrorBody { message })).into_response()
    }
}

impl ApiError {
    fn internal(cause: &anyhow::Error) -> Self {
        tracing::error!(error = ?cause, "request failed");
        Self::InternalServerError("Internal server error".to_string())
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        Self::BadRequest(ErrorMessage::One(rejection.body_text()))
    }
}

impl From<PathRejection> for ApiError {
    fn from(rejection: PathRejection) -> Self {
        Self::BadRequest(ErrorMessage::One(rejection.body_text()))
    }
}

impl From<ValidationFailure> for ApiError {
    fn from(failure: ValidationFailure) -> Self {
        Self::BadRequest(ErrorMessage::Many(failure.messages()))
    }
}

impl From<CreateBookError> for ApiError {
    fn from(err: CreateBookError) -> Self {
        match err {
            CreateBookError::Duplicate { .. } => {
                Self::BadRequest(ErrorMessage::One(err.to_string()))
            }
            CreateBookError::Other(cause) => Self::internal(&cause),
        }
    }
}

impl From<FindBookError> for ApiError {
    fn from(err: FindBookError) -> Self {
        match err {
            FindBookError::NotFound { .. } => Self::NotFound(err.to_string()),
            FindBookError::Other(cause) => Self::internal(&cause),
        }
    }
}

impl From<FindAllBooksError> for ApiError {
    fn from(err: FindAllBooksError) -> Self {
        Self::internal(&err.0)
    }
}

#[derive(Debug, Serialize)]
pub struct BookHttpResponse {
    isbn: String,
    amazon_url: String,
    author: String,
    language: String,
    pages: i64,
    publisher: String,
    title: String,
    year: i64,
}

impl From<Book> for BookHttpResponse {
    fn from(value: Book) -> Self {
        Self {
            isbn: value.isbn().to_string(),
            amazon_url: value.amazon_url().to_string(),
            author: value.author().to_string(),
            language: value.language().to_string(),
            pages: value.pages(),
            publisher: value.publisher().to_string(),
            title: value.title().to_string(),
            year: value.year(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct ListBooksHttpResponse {
    books: Vec<BookHttpResponse>,
}

#[derive(Debug, Serialize)]
pub struct SingleBookHttpResponse {
    book: BookHttpResponse,
}

impl From<Book> for SingleBookHttpResponse {
    fn from(value: Book) -> Self {
        Self { book: value.into() }
    }
}

pub async fn list_books<BR: BookRepository>(
    State(state): State<AppState<BR>>,
) -> Result<ApiSuccess<ListBooksHttpResponse>, ApiError> {
    let books = state.book_repo.find_all_books().await?;
    let books = books.into_iter().map(BookHttpResponse::from).collect();
    Ok(ApiSuccess::new(StatusCode::OK, ListBooksHttpResponse { books }))
}

pub async fn find_book<BR: BookRepository>(
    State(state): State<AppState<BR>>,
    path: Result<Path<String>, PathRejection>,
) -> Result<ApiSuccess<SingleBookHttpResponse>, ApiError> {
    let Path(isbn) = path?;
    let req = FindBookRequest::new(isbn);
    state
        .book_repo
        .find_book(&req)
        .await
        .map_err(ApiError::from)
        .map(|book| ApiSuccess::new(StatusCode::OK, book.into()))
}

pub async fn create_book<BR: BookRepository>(
    State(state): State<AppState<BR>>,
    body: Result<Json<Value>, JsonRejection>,
) -> Result<ApiSuccess<SingleBookHttpResponse>, ApiError> {
    let Json(payload) = body?;
    let req = validate_book(&payload)?;
    let book = state.book_repo.create_book(&req).await?;
    tracing::info!(isbn = book.isbn(), "book created");
    Ok(ApiSuccess::new(StatusCode::CREATED, book.into()))
}

pub async fn route_not_found(uri: Uri) -> ApiError {
    ApiError::NotFound(format!("No route for {}", uri.path()))
}

pub async fn method_not_allowed(method: Method, uri: Uri) -> ApiError {
    ApiError::MethodNotAllowed(format!(
        "Method {method} is not allowed for {}",
        uri.path()
    ))
}
