//! HTTP handlers for the catalog.

use crate::error::ApiError;
use crate::WebResult;
use crate::extractors::{CurrentUser, JsonBody, Pagination};
use crate::response::ApiResponse;
use crate::state::AppState;
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
};
use bookery_core::{Book, BookPatch, CatalogQuery, Genre, Money, NewBook, Page};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Request body for `POST /books`.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewBookBody {
    /// Title.
    pub title: Option<String>,
    /// Author.
    pub author: Option<String>,
    /// Description.
    pub description: Option<String>,
    /// Price in cents.
    pub price: Option<i64>,
    /// Cover image location.
    pub cover_image_url: Option<String>,
    /// Genre names.
    pub genre: Option<Vec<String>>,
    /// Year of publication.
    pub publication_year: Option<i32>,
    /// Initial stock.
    pub stock_quantity: Option<u32>,
}

/// Request body for `PUT /books/:id`; every field optional.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateBookBody {
    /// New title.
    pub title: Option<String>,
    /// New author.
    pub author: Option<String>,
    /// New description.
    pub description: Option<String>,
    /// New price in cents.
    pub price: Option<i64>,
    /// New cover image location.
    pub cover_image_url: Option<String>,
    /// New genre names.
    pub genre: Option<Vec<String>>,
    /// New publication year.
    pub publication_year: Option<i32>,
    /// New stock count.
    pub stock_quantity: Option<u32>,
}

/// Query filters for `GET /books`.
#[derive(Debug, Deserialize)]
pub struct BookListParams {
    /// Case-insensitive substring over title, author and description.
    pub keyword: Option<String>,
    /// Comma-separated genre names.
    pub genre: Option<String>,
}

/// A catalog entry as returned to clients.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BookResponse {
    /// Book id.
    pub id: String,
    /// Title.
    pub title: String,
    /// Author.
    pub author: String,
    /// Description.
    pub description: String,
    /// Price in cents.
    pub price: i64,
    /// Cover image location.
    pub cover_image_url: Option<String>,
    /// Genre names.
    pub genre: Vec<String>,
    /// Year of publication.
    pub publication_year: i32,
    /// Average review rating.
    pub average_rating: f64,
    /// Number of ratings.
    pub number_of_ratings: u32,
    /// Units in stock.
    pub stock_quantity: u32,
    /// Whether the book is listed and orderable.
    pub is_active: bool,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Last update timestamp.
    pub updated_at: DateTime<Utc>,
}

impl From<&Book> for BookResponse {
    fn from(book: &Book) -> Self {
        Self {
            id: book.id.to_string(),
            title: book.title.clone(),
            author: book.author.clone(),
            description: book.description.clone(),
            price: book.price.cents(),
            cover_image_url: book.cover_image_url.clone(),
            genre: book.genres.iter().map(|genre| genre.to_string()).collect(),
            publication_year: book.publication_year,
            average_rating: book.average_rating,
            number_of_ratings: book.rating_count,
            stock_quantity: book.stock,
            is_active: book.is_active,
            created_at: book.created_at,
            updated_at: book.updated_at,
        }
    }
}

/// A page of books as returned to clients.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BookListResponse {
    /// Books on this page.
    pub books: Vec<BookResponse>,
    /// 1-based page number.
    pub page: u32,
    /// Total number of pages.
    pub pages: u32,
    /// Total number of matching books.
    pub total_books: u64,
}

impl From<Page<Book>> for BookListResponse {
    fn from(page: Page<Book>) -> Self {
        Self {
            books: page.items.iter().map(BookResponse::from).collect(),
            page: page.page,
            pages: page.pages,
            total_books: page.total,
        }
    }
}

fn parse_genres(names: Vec<String>) -> Result<Vec<Genre>, ApiError> {
    names
        .into_iter()
        .map(|name| name.trim().parse::<Genre>().map_err(ApiError::from))
        .collect()
}

/// `GET /books`: public catalog listing.
pub async fn list_books(
    State(state): State<AppState>,
    Pagination(page): Pagination,
    Query(params): Query<BookListParams>,
) -> WebResult<ApiResponse<BookListResponse>> {
    let genres = match params.genre {
        Some(raw) => parse_genres(raw.split(',').map(str::to_string).collect())?,
        None => Vec::new(),
    };
    let query = CatalogQuery {
        keyword: params.keyword,
        genres,
    };
    let books = state.catalog.browse(query, page).await?;
    Ok(ApiResponse::new(
        StatusCode::OK,
        books.into(),
        "Books fetched successfully",
    ))
}

/// `GET /books/:id`: one active book.
pub async fn get_book(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> WebResult<ApiResponse<BookResponse>> {
    let book = state.catalog.fetch(&id).await?;
    Ok(ApiResponse::new(
        StatusCode::OK,
        BookResponse::from(&book),
        "Book fetched successfully",
    ))
}

/// `POST /books`: add a catalog entry.
pub async fn add_book(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    JsonBody(body): JsonBody<NewBookBody>,
) -> WebResult<ApiResponse<BookResponse>> {
    let (Some(title), Some(author), Some(description), Some(price), Some(genre), Some(year), Some(stock)) = (
        body.title,
        body.author,
        body.description,
        body.price,
        body.genre,
        body.publication_year,
        body.stock_quantity,
    ) else {
        return Err(ApiError::bad_request(
            "Please fill in all required fields: title, author, description, price, genre, publicationYear, stockQuantity.",
        ));
    };

    let new = NewBook {
        title,
        author,
        description,
        price: Money::from_cents(price),
        cover_image_url: body.cover_image_url,
        genres: parse_genres(genre)?,
        publication_year: year,
        stock,
    };
    let book = state.catalog.add(&user, new).await?;
    Ok(ApiResponse::new(
        StatusCode::CREATED,
        BookResponse::from(&book),
        "Book created successfully",
    ))
}

/// `PUT /books/:id`: partial catalog update.
pub async fn update_book(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(id): Path<String>,
    JsonBody(body): JsonBody<UpdateBookBody>,
) -> WebResult<ApiResponse<BookResponse>> {
    let patch = BookPatch {
        title: body.title,
        author: body.author,
        description: body.description,
        price: body.price.map(Money::from_cents),
        cover_image_url: body.cover_image_url,
        genres: body.genre.map(parse_genres).transpose()?,
        publication_year: body.publication_year,
        stock: body.stock_quantity,
    };
    let book = state.catalog.update(&user, &id, patch).await?;
    Ok(ApiResponse::new(
        StatusCode::OK,
        BookResponse::from(&book),
        "Book updated successfully.",
    ))
}

/// `DELETE /books/:id`: soft delete.
pub async fn delete_book(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(id): Path<String>,
) -> WebResult<ApiResponse<()>> {
    state.catalog.deactivate(&user, &id).await?;
    Ok(ApiResponse::empty(
        StatusCode::OK,
        "Book deleted successfully (soft deleted).",
    ))
}
