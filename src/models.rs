use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Book {
    isbn: String,
    amazon_url: String,
    author: String,
    language: String,
    pages: i64,
    publisher: String,
    title: String,
    year: i64,
}

impl Book {
    #[allow(clippy::too_many_arguments)]
    pub const fn new(
        isbn: String,
        amazon_url: String,
        author: String,
        language: String,
        pages: i64,
        publisher: String,
        title: String,
        year: i64,
    ) -> Self {
        Self {
            isbn,
            amazon_url,
            author,
            language,
            pages,
            publisher,
            title,
            year,
        }
    }

    pub fn isbn(&self) -> &str {
        &self.isbn
    }

    pub fn amazon_url(&self) -> &str {
        &self.amazon_url
    }

    pub fn author(&self) -> &str {
        &self.author
    }

    pub fn language(&self) -> &str {
        &self.language
    }

    pub const fn pages(&self) -> i64 {
        self.pages
    }

    pub fn publisher(&self) -> &str {
        &self.publisher
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub const fn year(&self) -> i64 {
        self.year
    }
}

/// A book that has passed validation and may be inserted.
///
/// Only [`crate::validation`] builds these, so holding one means every
/// schema rule was checked against the payload it came from.
#[derive(Debug, Clone)]
pub struct CreateBookRequest {
    book: Book,
}

impl CreateBookRequest {
    pub(crate) const fn new(book: Book) -> Self {
        Self { book }
    }

    pub const fn book(&self) -> &Book {
        &self.book
    }

    pub fn isbn(&self) -> &str {
        self.book.isbn()
    }
}

#[derive(Error, Debug)]
pub enum CreateBookError {
    #[error("A book with an isbn '{isbn}' already exists")]
    Duplicate { isbn: String },
    #[error(transparent)]
    Other(anyhow::Error),
}

#[derive(Debug)]
pub struct FindBookRequest {
    isbn: String,
}

impl FindBookRequest {
    pub fn new(isbn: impl Into<String>) -> Self {
        Self { isbn: isbn.into() }
    }

    pub fn isbn(&self) -> &str {
        &self.isbn
    }
}

#[derive(Error, Debug)]
pub enum FindBookError {
    // The unbalanced quote is what existing clients match on.
    #[error("There is no book with an isbn '{isbn}")]
    NotFound { isbn: String },
    #[error(transparent)]
    Other(anyhow::Error),
}

#[derive(Error, Debug)]
#[error(transparent)]
pub struct FindAllBooksError(#[from] pub anyhow::Error);

#[derive(Error, Debug)]
#[error(transparent)]
pub struct DeleteAllBooksError(#[from] pub anyhow::Error);
