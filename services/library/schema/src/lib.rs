//! sea-orm entities for the library service.

pub mod authors;
pub mod book_authors;
pub mod book_genres;
pub mod book_likes;
pub mod book_month_views;
pub mod book_views;
pub mod books;
pub mod chapters;
pub mod commentaries;
pub mod genres;
pub mod user_library;
pub mod users;
