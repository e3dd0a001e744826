use crate::models::{
    Book, CreateBookError, CreateBookRequest, DeleteAllBooksError, FindAllBooksError,
    FindBookError, FindBookRequest,
};
use crate::repositories::BookRepository;
use anyhow::{Context, anyhow};
use async_trait::async_trait;
use sqlx::migrate::Migrator;
use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions, SqliteRow};
use sqlx::{FromRow, Row, SqlitePool};
use std::str::FromStr;
use std::time::Duration;

static MIGRATOR: Migrator = sqlx::migrate!();

const BOOK_COLUMNS: &str = "isbn, amazon_url, author, language, pages, publisher, title, year";

/// The single connection to the book store.
///
/// The pool is capped at one connection that never expires, so an in-memory
/// database (`sqlite::memory:`) lives exactly as long as this value.
#[derive(Debug, Clone)]
pub struct Sqlite {
    pool: SqlitePool,
}

impl Sqlite {
    pub async fn new(url: &str) -> anyhow::Result<Self> {
        let opts = SqliteConnectOptions::from_str(url)
            .with_context(|| format!("Invalid database url {url}"))?
            .create_if_missing(true)
            .journal_mode(SqliteJournalMode::Wal);
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .idle_timeout(None::<Duration>)
            .max_lifetime(None::<Duration>)
            .connect_with(opts)
            .await
            .with_context(|| format!("Failed to open database at {url}"))?;

        MIGRATOR
            .run(&pool)
            .await
            .context("Failed to run database migrations")?;

        tracing::debug!(%url, "database ready");
        Ok(Self { pool })
    }

    pub async fn close(&self) {
        self.pool.close().await;
    }
}

impl<'r> FromRow<'r, SqliteRow> for Book {
    fn from_row(row: &'r SqliteRow) -> Result<Self, sqlx::Error> {
        let isbn = row.try_get("isbn")?;
        let amazon_url = row.try_get("amazon_url")?;
        let author = row.try_get("author")?;
        let language = row.try_get("language")?;
        let pages = row.try_get("pages")?;
        let publisher = row.try_get("publisher")?;
        let title = row.try_get("title")?;
        let year = row.try_get("year")?;

        Ok(Self::new(
            isbn, amazon_url, author, language, pages, publisher, title, year,
        ))
    }
}

#[async_trait]
impl BookRepository for Sqlite {
    async fn create_book(&self, req: &CreateBookRequest) -> Result<Book, CreateBookError> {
        let submitted = req.book();
        let query = format!(
            "INSERT INTO books ({BOOK_COLUMNS}) VALUES (?, ?, ?, ?, ?, ?, ?, ?) RETURNING {BOOK_COLUMNS}"
        );
        let book = sqlx::query_as(&query)
            .bind(submitted.isbn())
            .bind(submitted.amazon_url())
            .bind(submitted.author())
            .bind(submitted.language())
            .bind(submitted.pages())
            .bind(submitted.publisher())
            .bind(submitted.title())
            .bind(submitted.year())
            .fetch_one(&self.pool)
            .await
            .map_err(|err| {
                if is_unique_violation(&err) {
                    CreateBookError::Duplicate {
                        isbn: req.isbn().to_string(),
                    }
                } else {
                    let err = anyhow!(err).context(format!(
                        "Failed to create book with isbn '{}'",
                        req.isbn()
                    ));
                    CreateBookError::Other(err)
                }
            })?;

        Ok(book)
    }

    async fn find_book(&self, req: &FindBookRequest) -> Result<Book, FindBookError> {
        let query = format!("SELECT {BOOK_COLUMNS} FROM books WHERE isbn = ?");
        let book = sqlx::query_as(&query)
            .bind(req.isbn())
            .fetch_one(&self.pool)
            .await
            .map_err(|err| {
                if matches!(err, sqlx::Error::RowNotFound) {
                    FindBookError::NotFound {
                        isbn: req.isbn().to_string(),
                    }
                } else {
                    let err = anyhow!(err).context(format!(
                        "Failed to retrieve book with isbn '{}'",
                        req.isbn()
                    ));
                    FindBookError::Other(err)
                }
            })?;

        Ok(book)
    }

    async fn find_all_books(&self) -> Result<Vec<Book>, FindAllBooksError> {
        let query = format!("SELECT {BOOK_COLUMNS} FROM books ORDER BY rowid");
        let books = sqlx::query_as(&query)
            .fetch_all(&self.pool)
            .await
            .map_err(|err| {
                let err = anyhow!(err).context("Failed to retrieve all books");
                FindAllBooksError(err)
            })?;

        Ok(books)
    }

    async fn delete_all_books(&self) -> Result<u64, DeleteAllBooksError> {
        let result = sqlx::query("DELETE FROM books")
            .execute(&self.pool)
            .await
            .map_err(|err| {
                let err = anyhow!(err).context("Failed to delete all books");
                DeleteAllBooksError(err)
            })?;

        Ok(result.rows_affected())
    }
}

fn is_unique_violation(err: &sqlx::Error) -> bool {
    if let sqlx::Error::Database(db_err) = err {
        return db_err.is_unique_violation();
    }

    false
}
