mod handler;

use crate::repositories::BookRepository;
use anyhow::Context;
use axum::Router;
use axum::routing::get;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;

#[derive(Debug)]
pub struct AppState<BR: BookRepository> {
    book_repo: Arc<BR>,
}

impl<BR: BookRepository> AppState<BR> {
    pub fn new(book_repo: BR) -> Self {
        Self {
            book_repo: Arc::new(book_repo),
        }
    }
}

impl<BR: BookRepository> Clone for AppState<BR> {
    fn clone(&self) -> Self {
        Self {
            book_repo: Arc::clone(&self.book_repo),
        }
    }
}

#[derive(Debug)]
pub struct HttpServerConfig {
    port: u16,
}

impl HttpServerConfig {
    pub const fn new(port: u16) -> Self {
        Self { port }
    }
}

pub struct HttpServer {
    router: Router,
    listener: TcpListener,
}

impl HttpServer {
    pub async fn new<BR: BookRepository>(
        state: AppState<BR>,
        config: HttpServerConfig,
    ) -> anyhow::Result<Self> {
        let router = router(state);

        let listener = TcpListener::bind(format!("0.0.0.0:{}", config.port))
            .await
            .with_context(|| format!("Failed to bind to port {}", config.port))?;

        Ok(Self { router, listener })
    }

    pub fn local_addr(&self) -> anyhow::Result<SocketAddr> {
        self.listener
            .local_addr()
            .context("Failed to read listener address")
    }

    /// Serves requests until `shutdown` resolves, then lets in-flight
    /// requests finish.
    pub async fn run<F>(self, shutdown: F) -> anyhow::Result<()>
    where
        F: Future<Output = ()> + Send + 'static,
    {
        axum::serve(self.listener, self.router)
            .with_graceful_shutdown(shutdown)
            .await
            .context("Received error from running server")?;
        Ok(())
    }
}

/// Builds the application router with request tracing attached.
pub fn router<BR: BookRepository>(state: AppState<BR>) -> Router {
    book_routes()
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

fn book_routes<BR: BookRepository>() -> Router<AppState<BR>> {
    Router::new()
        .route(
            "/books",
            get(handler::list_books::<BR>).post(handler::create_book::<BR>),
        )
        .route("/books/{isbn}", get(handler::find_book::<BR>))
        .method_not_allowed_fallback(handler::method_not_allowed)
        .fallback(handler::route_not_found)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{
        Book, CreateBookError, CreateBookRequest, DeleteAllBooksError, FindAllBooksError,
        FindBookError, FindBookRequest,
    };
    use anyhow::anyhow;
    use async_trait::async_trait;
    use axum::body::Body;
    use axum::http::{Request, StatusCode, header};
    use serde_json::{Value, json};
    use tower::ServiceExt;

    /// Fails every call the way a lost database connection would.
    struct UnavailableRepository;

    #[async_trait]
    impl BookRepository for UnavailableRepository {
        async fn create_book(&self, _req: &CreateBookRequest) -> Result<Book, CreateBookError> {
            Err(CreateBookError::Other(anyhow!("database is locked")))
        }

        async fn find_book(&self, _req: &FindBookRequest) -> Result<Book, FindBookError> {
            Err(FindBookError::Other(anyhow!("database is locked")))
        }

        async fn find_all_books(&self) -> Result<Vec<Book>, FindAllBooksError> {
            Err(FindAllBooksError(anyhow!("database is locked")))
        }

        async fn delete_all_books(&self) -> Result<u64, DeleteAllBooksError> {
            Err(DeleteAllBooksError(anyhow!("database is locked")))
        }
    }

    async fn send(req: Request<Body>) -> (StatusCode, Value) {
        let app = router(AppState::new(UnavailableRepository));
        let response = app.oneshot(req).await.unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    fn get(uri: &str) -> Request<Body> {
        Request::builder().uri(uri).body(Body::empty()).unwrap()
    }

    fn internal_error() -> Value {
        json!({ "message": "Internal server error" })
    }

    #[tokio::test]
    async fn list_books_storage_failure_is_internal_error() {
        let (status, body) = send(get("/books")).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body, internal_error());
    }

    #[tokio::test]
    async fn find_book_storage_failure_is_internal_error() {
        let (status, body) = send(get("/books/0691161518")).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body, internal_error());
    }

    #[tokio::test]
    async fn create_book_storage_failure_is_internal_error() {
        let book = json!({
            "isbn": "1338878921",
            "amazon_url": "https://www.amazon.com/dp/059035342X",
            "author": "J.K. Rowling",
            "language": "english",
            "pages": 309,
            "publisher": "Scholastic",
            "title": "Harry Potter and the Sorcerer's Stone",
            "year": 1998
        });
        let req = Request::builder()
            .method("POST")
            .uri("/books")
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(book.to_string()))
            .unwrap();

        let (status, body) = send(req).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body, internal_error());
    }
}
