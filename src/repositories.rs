use crate::models::{
    Book, CreateBookError, CreateBookRequest, DeleteAllBooksError, FindAllBooksError,
    FindBookError, FindBookRequest,
};
use async_trait::async_trait;

#[async_trait]
pub trait BookRepository: Send + Sync + 'static {
    async fn create_book(&self, req: &CreateBookRequest) -> Result<Book, CreateBookError>;

    async fn find_book(&self, req: &FindBookRequest) -> Result<Book, FindBookError>;

    /// Returns every book in insertion order.
    async fn find_all_books(&self) -> Result<Vec<Book>, FindAllBooksError>;

    /// Removes every book and returns how many rows were deleted. Not routed;
    /// exists so tests can reset the store between cases.
    async fn delete_all_books(&self) -> Result<u64, DeleteAllBooksError>;
}
