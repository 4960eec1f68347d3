//! Catalog entries: sellable books with price and stock.

use crate::error::Error;
use crate::money::Money;
use crate::store::Revision;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

/// Unique identifier for a catalog entry.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BookId(Uuid);

impl BookId {
    /// Generates a fresh identifier.
    #[must_use]
    pub fn generate() -> Self {
        Self(Uuid::new_v4())
    }

    /// Parses a raw identifier.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidReference`] if `raw` is not a well-formed
    /// identifier.
    pub fn parse(raw: &str) -> Result<Self, Error> {
        Uuid::parse_str(raw)
            .map(Self)
            .map_err(|_| Error::InvalidReference(format!("Invalid book ID format: {raw}")))
    }
}

impl fmt::Display for BookId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Book genres the catalog accepts.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Genre {
    /// Fiction.
    Fiction,
    /// Non-fiction.
    #[serde(rename = "Non-Fiction")]
    NonFiction,
    /// Science fiction.
    #[serde(rename = "Science Fiction")]
    ScienceFiction,
    /// Fantasy.
    Fantasy,
    /// Mystery.
    Mystery,
    /// Thriller.
    Thriller,
    /// Romance.
    Romance,
    /// Horror.
    Horror,
    /// Biography.
    Biography,
    /// History.
    History,
    /// Self-help.
    #[serde(rename = "Self-Help")]
    SelfHelp,
    /// Children's books.
    Childrens,
    /// Young adult.
    #[serde(rename = "Young Adult")]
    YoungAdult,
    /// Poetry.
    Poetry,
    /// Travel.
    Travel,
    /// Cooking.
    Cooking,
    /// Art.
    Art,
    /// Business.
    Business,
    /// Technology.
    Technology,
    /// Science.
    Science,
}

impl Genre {
    /// Wire name of the genre.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Fiction => "Fiction",
            Self::NonFiction => "Non-Fiction",
            Self::ScienceFiction => "Science Fiction",
            Self::Fantasy => "Fantasy",
            Self::Mystery => "Mystery",
            Self::Thriller => "Thriller",
            Self::Romance => "Romance",
            Self::Horror => "Horror",
            Self::Biography => "Biography",
            Self::History => "History",
            Self::SelfHelp => "Self-Help",
            Self::Childrens => "Childrens",
            Self::YoungAdult => "Young Adult",
            Self::Poetry => "Poetry",
            Self::Travel => "Travel",
            Self::Cooking => "Cooking",
            Self::Art => "Art",
            Self::Business => "Business",
            Self::Technology => "Technology",
            Self::Science => "Science",
        }
    }
}

impl fmt::Display for Genre {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Genre {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Fiction" => Ok(Self::Fiction),
            "Non-Fiction" => Ok(Self::NonFiction),
            "Science Fiction" => Ok(Self::ScienceFiction),
            "Fantasy" => Ok(Self::Fantasy),
            "Mystery" => Ok(Self::Mystery),
            "Thriller" => Ok(Self::Thriller),
            "Romance" => Ok(Self::Romance),
            "Horror" => Ok(Self::Horror),
            "Biography" => Ok(Self::Biography),
            "History" => Ok(Self::History),
            "Self-Help" => Ok(Self::SelfHelp),
            "Childrens" => Ok(Self::Childrens),
            "Young Adult" => Ok(Self::YoungAdult),
            "Poetry" => Ok(Self::Poetry),
            "Travel" => Ok(Self::Travel),
            "Cooking" => Ok(Self::Cooking),
            "Art" => Ok(Self::Art),
            "Business" => Ok(Self::Business),
            "Technology" => Ok(Self::Technology),
            "Science" => Ok(Self::Science),
            other => Err(Error::InvalidRequest(format!("Invalid genre: {other}"))),
        }
    }
}

/// A sellable book record.
///
/// Stock is a `u32`, so it can never go negative by construction; the
/// conditional decrement in the store enforces the rest. Inactive books
/// stay in the catalog for historical orders but are neither listed nor
/// orderable.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Book {
    /// Unique identifier.
    pub id: BookId,
    /// Title.
    pub title: String,
    /// Author.
    pub author: String,
    /// Description shown on the product page.
    pub description: String,
    /// Current selling price.
    pub price: Money,
    /// Cover image location, if any.
    pub cover_image_url: Option<String>,
    /// Genres this book is listed under.
    pub genres: Vec<Genre>,
    /// Year of publication.
    pub publication_year: i32,
    /// Average review rating, rounded to tenths.
    pub average_rating: f64,
    /// Number of ratings behind the average.
    pub rating_count: u32,
    /// Units currently in stock.
    pub stock: u32,
    /// Whether the book is listed and orderable.
    pub is_active: bool,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Last update timestamp.
    pub updated_at: DateTime<Utc>,
    /// Document revision for optimistic concurrency.
    pub revision: Revision,
}

/// Fields required to add a book to the catalog.
#[derive(Clone, Debug)]
pub struct NewBook {
    /// Title.
    pub title: String,
    /// Author.
    pub author: String,
    /// Description.
    pub description: String,
    /// Selling price.
    pub price: Money,
    /// Cover image location, if any.
    pub cover_image_url: Option<String>,
    /// Genres, at least one.
    pub genres: Vec<Genre>,
    /// Year of publication.
    pub publication_year: i32,
    /// Initial stock.
    pub stock: u32,
}

impl Book {
    /// Builds a catalog entry from the submitted fields.
    #[must_use]
    pub fn new(new: NewBook, now: DateTime<Utc>) -> Self {
        Self {
            id: BookId::generate(),
            title: new.title,
            author: new.author,
            description: new.description,
            price: new.price,
            cover_image_url: new.cover_image_url,
            genres: new.genres,
            publication_year: new.publication_year,
            average_rating: 0.0,
            rating_count: 0,
            stock: new.stock,
            is_active: true,
            created_at: now,
            updated_at: now,
            revision: Revision::initial(),
        }
    }

    /// Applies a partial update, returning whether anything changed.
    pub fn apply_patch(&mut self, patch: BookPatch) -> bool {
        let mut changed = false;

        update_field(&mut self.title, patch.title, &mut changed);
        update_field(&mut self.author, patch.author, &mut changed);
        update_field(&mut self.description, patch.description, &mut changed);
        update_field(&mut self.price, patch.price, &mut changed);
        update_field(
            &mut self.cover_image_url,
            patch.cover_image_url.map(Some),
            &mut changed,
        );
        update_field(&mut self.genres, patch.genres, &mut changed);
        update_field(
            &mut self.publication_year,
            patch.publication_year,
            &mut changed,
        );
        update_field(&mut self.stock, patch.stock, &mut changed);

        changed
    }
}

fn update_field<T: PartialEq>(field: &mut T, candidate: Option<T>, changed: &mut bool) {
    if let Some(value) = candidate {
        if *field != value {
            *field = value;
            *changed = true;
        }
    }
}

/// Partial catalog update; `None` fields are left untouched.
#[derive(Clone, Debug, Default)]
pub struct BookPatch {
    /// New title.
    pub title: Option<String>,
    /// New author.
    pub author: Option<String>,
    /// New description.
    pub description: Option<String>,
    /// New price.
    pub price: Option<Money>,
    /// New cover image location.
    pub cover_image_url: Option<String>,
    /// New genre set.
    pub genres: Option<Vec<Genre>>,
    /// New publication year.
    pub publication_year: Option<i32>,
    /// New stock count.
    pub stock: Option<u32>,
}

/// Filters for the public catalog listing. Only active books ever match.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct CatalogQuery {
    /// Case-insensitive substring matched against title, author and
    /// description.
    pub keyword: Option<String>,
    /// Books listed under any of these genres.
    pub genres: Vec<Genre>,
}

impl CatalogQuery {
    /// Whether the book is visible under this query.
    #[must_use]
    pub fn matches(&self, book: &Book) -> bool {
        if !book.is_active {
            return false;
        }
        if let Some(keyword) = &self.keyword {
            let needle = keyword.to_lowercase();
            let haystacks = [&book.title, &book.author, &book.description];
            if !haystacks
                .iter()
                .any(|text| text.to_lowercase().contains(&needle))
            {
                return false;
            }
        }
        if !self.genres.is_empty()
            && !self.genres.iter().any(|genre| book.genres.contains(genre))
        {
            return false;
        }
        true
    }
}
