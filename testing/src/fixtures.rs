//! Ready-made domain objects for tests.

use crate::clock::test_clock;
use bookery_core::{Book, Clock as _, Genre, Money, NewBook, Role, User, UserId};

/// Submission for a fiction book with the given title, price and stock.
#[must_use]
pub fn new_book(title: &str, price: Money, stock: u32) -> NewBook {
    NewBook {
        title: title.to_string(),
        author: "Test Author".to_string(),
        description: "A book used in tests.".to_string(),
        price,
        cover_image_url: None,
        genres: vec![Genre::Fiction],
        publication_year: 2020,
        stock,
    }
}

/// A catalog entry built from [`new_book`] at the fixed test time.
#[must_use]
pub fn book(title: &str, price: Money, stock: u32) -> Book {
    Book::new(new_book(title, price, stock), test_clock().now())
}

/// A customer account.
#[must_use]
pub fn customer(username: &str) -> User {
    User {
        id: UserId::generate(),
        username: username.to_string(),
        email: format!("{username}@example.com"),
        role: Role::Customer,
    }
}

/// An admin account.
#[must_use]
pub fn admin() -> User {
    User {
        id: UserId::generate(),
        username: "admin".to_string(),
        email: "admin@example.com".to_string(),
        role: Role::Admin,
    }
}
