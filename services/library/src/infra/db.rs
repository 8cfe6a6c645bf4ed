use std::collections::HashMap;

use anyhow::Context as _;
use chrono::{DateTime, NaiveDate, Utc};
use sea_orm::{
    ActiveModelTrait, ActiveValue::Set, ColumnTrait, ConnectionTrait, DatabaseConnection, DbErr,
    EntityTrait, FromQueryResult, IntoActiveModel as _, LoaderTrait, PaginatorTrait, QueryFilter,
    QueryOrder, QuerySelect, SqlErr, TransactionError, TransactionTrait,
    sea_query::{Expr, OnConflict, Query},
};

use libris_core::sea_ext::OrderBySort;
use libris_domain::engagement::ToggleOutcome;
use libris_domain::ordering::{BookOrderField, BookOrdering};
use libris_domain::pagination::PageRequest;
use libris_domain::user::UserRole;
use libris_library_schema::{
    authors, book_authors, book_genres, book_likes, book_month_views, book_views, books, chapters,
    commentaries, genres, user_library, users,
};

use crate::domain::repository::{
    AuthorRepository, BookRepository, ChapterRepository, CommentaryRepository,
    EngagementRepository, GenreRepository, UserRepository,
};
use crate::domain::types::{
    Author, Book, BookFilter, BookPatch, BookStats, BookWithLinks, Chapter, CommentAuthor,
    CommentThread, Commentary, Genre, NewBook, NewChapter, NewCommentary, NewUser, PopularBook,
    ReaderFlags, RelatedChapters, SENTINEL_EMAIL, SENTINEL_FIRST_NAME, SENTINEL_LAST_NAME,
    UNUSABLE_PASSWORD, User, UserPatch,
};
use crate::error::LibraryError;

// ── Genre repository ─────────────────────────────────────────────────────────

#[derive(Clone)]
pub struct DbGenreRepository {
    pub db: DatabaseConnection,
}

impl GenreRepository for DbGenreRepository {
    async fn list(&self) -> Result<Vec<Genre>, LibraryError> {
        let models = genres::Entity::find()
            .order_by_asc(genres::Column::Id)
            .all(&self.db)
            .await
            .context("list genres")?;
        Ok(models.into_iter().map(genre_from_model).collect())
    }

    async fn find_by_id(&self, id: i32) -> Result<Option<Genre>, LibraryError> {
        let model = genres::Entity::find_by_id(id)
            .one(&self.db)
            .await
            .context("find genre by id")?;
        Ok(model.map(genre_from_model))
    }

    async fn find_by_ids(&self, ids: &[i32]) -> Result<Vec<Genre>, LibraryError> {
        if ids.is_empty() {
            return Ok(vec![]);
        }
        let models = genres::Entity::find()
            .filter(genres::Column::Id.is_in(ids.iter().copied()))
            .all(&self.db)
            .await
            .context("find genres by ids")?;
        Ok(models.into_iter().map(genre_from_model).collect())
    }

    async fn create(&self, name: &str) -> Result<Genre, LibraryError> {
        let model = genres::ActiveModel {
            name: Set(name.to_owned()),
            ..Default::default()
        }
        .insert(&self.db)
        .await
        .context("create genre")?;
        Ok(genre_from_model(model))
    }

    async fn update(&self, id: i32, name: &str) -> Result<Option<Genre>, LibraryError> {
        let Some(model) = genres::Entity::find_by_id(id)
            .one(&self.db)
            .await
            .context("find genre for update")?
        else {
            return Ok(None);
        };
        let mut genre = model.into_active_model();
        genre.name = Set(name.to_owned());
        let model = genre.update(&self.db).await.context("update genre")?;
        Ok(Some(genre_from_model(model)))
    }

    async fn delete(&self, id: i32) -> Result<bool, LibraryError> {
        let result = genres::Entity::delete_by_id(id)
            .exec(&self.db)
            .await
            .context("delete genre")?;
        Ok(result.rows_affected > 0)
    }
}

fn genre_from_model(model: genres::Model) -> Genre {
    Genre {
        id: model.id,
        name: model.name,
    }
}

// ── Author repository ────────────────────────────────────────────────────────

#[derive(Clone)]
pub struct DbAuthorRepository {
    pub db: DatabaseConnection,
}

impl AuthorRepository for DbAuthorRepository {
    async fn list(&self) -> Result<Vec<Author>, LibraryError> {
        let models = authors::Entity::find()
            .order_by_asc(authors::Column::Id)
            .all(&self.db)
            .await
            .context("list authors")?;
        Ok(models.into_iter().map(author_from_model).collect())
    }

    async fn find_by_id(&self, id: i32) -> Result<Option<Author>, LibraryError> {
        let model = authors::Entity::find_by_id(id)
            .one(&self.db)
            .await
            .context("find author by id")?;
        Ok(model.map(author_from_model))
    }

    async fn find_by_ids(&self, ids: &[i32]) -> Result<Vec<Author>, LibraryError> {
        if ids.is_empty() {
            return Ok(vec![]);
        }
        let models = authors::Entity::find()
            .filter(authors::Column::Id.is_in(ids.iter().copied()))
            .all(&self.db)
            .await
            .context("find authors by ids")?;
        Ok(models.into_iter().map(author_from_model).collect())
    }

    async fn create(&self, first_name: &str, last_name: &str) -> Result<Author, LibraryError> {
        let model = authors::ActiveModel {
            first_name: Set(first_name.to_owned()),
            last_name: Set(last_name.to_owned()),
            ..Default::default()
        }
        .insert(&self.db)
        .await
        .context("create author")?;
        Ok(author_from_model(model))
    }

    async fn update(
        &self,
        id: i32,
        first_name: &str,
        last_name: &str,
    ) -> Result<Option<Author>, LibraryError> {
        let Some(model) = authors::Entity::find_by_id(id)
            .one(&self.db)
            .await
            .context("find author for update")?
        else {
            return Ok(None);
        };
        let mut author = model.into_active_model();
        author.first_name = Set(first_name.to_owned());
        author.last_name = Set(last_name.to_owned());
        let model = author.update(&self.db).await.context("update author")?;
        Ok(Some(author_from_model(model)))
    }

    async fn delete(&self, id: i32) -> Result<bool, LibraryError> {
        let result = authors::Entity::delete_by_id(id)
            .exec(&self.db)
            .await
            .context("delete author")?;
        Ok(result.rows_affected > 0)
    }

    async fn set_picture(
        &self,
        id: i32,
        path: &str,
    ) -> Result<Option<Option<String>>, LibraryError> {
        let Some(model) = authors::Entity::find_by_id(id)
            .one(&self.db)
            .await
            .context("find author for picture")?
        else {
            return Ok(None);
        };
        let previous = model.picture.clone();
        let mut author = model.into_active_model();
        author.picture = Set(Some(path.to_owned()));
        author.update(&self.db).await.context("set author picture")?;
        Ok(Some(previous))
    }
}

fn author_from_model(model: authors::Model) -> Author {
    Author {
        id: model.id,
        first_name: model.first_name,
        last_name: model.last_name,
        picture: model.picture,
    }
}

// ── Book repository ──────────────────────────────────────────────────────────

#[derive(Clone)]
pub struct DbBookRepository {
    pub db: DatabaseConnection,
}

impl BookRepository for DbBookRepository {
    async fn list(
        &self,
        filter: &BookFilter,
        ordering: BookOrdering,
        page: PageRequest,
    ) -> Result<Vec<BookWithLinks>, LibraryError> {
        let mut query = books::Entity::find();
        if !filter.genre_ids.is_empty() {
            query = query.filter(
                books::Column::Id.in_subquery(
                    Query::select()
                        .column(book_genres::Column::BookId)
                        .from(book_genres::Entity)
                        .and_where(
                            book_genres::Column::GenreId.is_in(filter.genre_ids.iter().copied()),
                        )
                        .to_owned(),
                ),
            );
        }
        if !filter.author_ids.is_empty() {
            query = query.filter(
                books::Column::Id.in_subquery(
                    Query::select()
                        .column(book_authors::Column::BookId)
                        .from(book_authors::Entity)
                        .and_where(
                            book_authors::Column::AuthorId
                                .is_in(filter.author_ids.iter().copied()),
                        )
                        .to_owned(),
                ),
            );
        }
        let column = match ordering.field {
            BookOrderField::Id => books::Column::Id,
            BookOrderField::Name => books::Column::Name,
            BookOrderField::Pages => books::Column::Pages,
        };
        query = query.order_by_sort(column, ordering.sort);
        if ordering.field != BookOrderField::Id {
            query = query.order_by_asc(books::Column::Id);
        }
        let models = query
            .offset(page.offset())
            .limit(page.limit())
            .all(&self.db)
            .await
            .context("list books")?;
        let books = with_links(&self.db, models)
            .await
            .context("load book links")?;
        Ok(books)
    }

    async fn find_by_id(&self, id: i32) -> Result<Option<Book>, LibraryError> {
        let model = books::Entity::find_by_id(id)
            .one(&self.db)
            .await
            .context("find book by id")?;
        Ok(model.map(book_from_model))
    }

    async fn find_with_links(&self, id: i32) -> Result<Option<BookWithLinks>, LibraryError> {
        let Some(model) = books::Entity::find_by_id(id)
            .one(&self.db)
            .await
            .context("find book by id")?
        else {
            return Ok(None);
        };
        let mut books = with_links(&self.db, vec![model])
            .await
            .context("load book links")?;
        Ok(books.pop())
    }

    async fn create(&self, book: &NewBook) -> Result<i32, LibraryError> {
        let book = book.clone();
        let id = self
            .db
            .transaction::<_, i32, DbErr>(|txn| {
                Box::pin(async move {
                    let model = books::ActiveModel {
                        name: Set(book.name),
                        pages: Set(book.pages),
                        summary: Set(book.summary),
                        ..Default::default()
                    }
                    .insert(txn)
                    .await?;
                    replace_genres(txn, model.id, &book.genre_ids).await?;
                    replace_authors(txn, model.id, &book.author_ids).await?;
                    Ok(model.id)
                })
            })
            .await
            .context("create book")?;
        Ok(id)
    }

    async fn update(&self, id: i32, patch: &BookPatch) -> Result<bool, LibraryError> {
        let patch = patch.clone();
        let found = self
            .db
            .transaction::<_, bool, DbErr>(|txn| {
                Box::pin(async move {
                    let Some(model) = books::Entity::find_by_id(id).one(txn).await? else {
                        return Ok(false);
                    };
                    let mut book = model.into_active_model();
                    if let Some(name) = patch.name {
                        book.name = Set(name);
                    }
                    if let Some(pages) = patch.pages {
                        book.pages = Set(pages);
                    }
                    if let Some(summary) = patch.summary {
                        book.summary = Set(summary);
                    }
                    if book.is_changed() {
                        book.update(txn).await?;
                    }
                    if let Some(genre_ids) = &patch.genre_ids {
                        replace_genres(txn, id, genre_ids).await?;
                    }
                    if let Some(author_ids) = &patch.author_ids {
                        replace_authors(txn, id, author_ids).await?;
                    }
                    Ok(true)
                })
            })
            .await
            .context("update book")?;
        Ok(found)
    }

    async fn delete(&self, id: i32) -> Result<bool, LibraryError> {
        let result = books::Entity::delete_by_id(id)
            .exec(&self.db)
            .await
            .context("delete book")?;
        Ok(result.rows_affected > 0)
    }

    async fn set_image(&self, id: i32, path: &str) -> Result<Option<Option<String>>, LibraryError> {
        let Some(model) = books::Entity::find_by_id(id)
            .one(&self.db)
            .await
            .context("find book for image")?
        else {
            return Ok(None);
        };
        let previous = model.image.clone();
        let mut book = model.into_active_model();
        book.image = Set(Some(path.to_owned()));
        book.update(&self.db).await.context("set book image")?;
        Ok(Some(previous))
    }

    async fn popular_in_month(
        &self,
        month: NaiveDate,
        limit: u64,
    ) -> Result<Vec<PopularBook>, LibraryError> {
        #[derive(Debug, FromQueryResult)]
        struct MonthViewCount {
            book_id: i32,
            month_views: i64,
        }

        let counts = book_month_views::Entity::find()
            .select_only()
            .column(book_month_views::Column::BookId)
            .column_as(
                Expr::col(book_month_views::Column::UserId).count(),
                "month_views",
            )
            .filter(book_month_views::Column::Month.eq(month))
            .group_by(book_month_views::Column::BookId)
            .order_by_desc(Expr::col(book_month_views::Column::UserId).count())
            .order_by_asc(book_month_views::Column::BookId)
            .limit(limit)
            .into_model::<MonthViewCount>()
            .all(&self.db)
            .await
            .context("count month views")?;
        if counts.is_empty() {
            return Ok(vec![]);
        }

        let models = books::Entity::find()
            .filter(books::Column::Id.is_in(counts.iter().map(|c| c.book_id)))
            .all(&self.db)
            .await
            .context("load popular books")?;
        let mut by_id: HashMap<i32, BookWithLinks> = with_links(&self.db, models)
            .await
            .context("load book links")?
            .into_iter()
            .map(|b| (b.book.id, b))
            .collect();

        Ok(counts
            .into_iter()
            .filter_map(|c| {
                by_id.remove(&c.book_id).map(|book| PopularBook {
                    book,
                    month_views: u64::try_from(c.month_views).unwrap_or_default(),
                })
            })
            .collect())
    }

    async fn list_library(&self, user_id: i32) -> Result<Vec<BookWithLinks>, LibraryError> {
        let models = books::Entity::find()
            .filter(
                books::Column::Id.in_subquery(
                    Query::select()
                        .column(user_library::Column::BookId)
                        .from(user_library::Entity)
                        .and_where(user_library::Column::UserId.eq(user_id))
                        .to_owned(),
                ),
            )
            .order_by_asc(books::Column::Id)
            .all(&self.db)
            .await
            .context("list library books")?;
        let books = with_links(&self.db, models)
            .await
            .context("load book links")?;
        Ok(books)
    }
}

fn book_from_model(model: books::Model) -> Book {
    Book {
        id: model.id,
        name: model.name,
        pages: model.pages,
        summary: model.summary,
        image: model.image,
    }
}

/// Batch-load genres and authors for `models`, preserving their order.
async fn with_links<C: ConnectionTrait>(
    db: &C,
    models: Vec<books::Model>,
) -> Result<Vec<BookWithLinks>, DbErr> {
    let genres = models
        .load_many_to_many(genres::Entity, book_genres::Entity, db)
        .await?;
    let authors = models
        .load_many_to_many(authors::Entity, book_authors::Entity, db)
        .await?;
    Ok(models
        .into_iter()
        .zip(genres)
        .zip(authors)
        .map(|((book, genres), authors)| {
            let mut genres: Vec<Genre> = genres.into_iter().map(genre_from_model).collect();
            genres.sort_by_key(|g| g.id);
            let mut authors: Vec<Author> = authors.into_iter().map(author_from_model).collect();
            authors.sort_by_key(|a| a.id);
            BookWithLinks {
                book: book_from_model(book),
                genres,
                authors,
            }
        })
        .collect())
}

// Link tables have composite keys, so inserts skip RETURNING.

async fn replace_genres<C: ConnectionTrait>(
    db: &C,
    book_id: i32,
    genre_ids: &[i32],
) -> Result<(), DbErr> {
    book_genres::Entity::delete_many()
        .filter(book_genres::Column::BookId.eq(book_id))
        .exec(db)
        .await?;
    if genre_ids.is_empty() {
        return Ok(());
    }
    book_genres::Entity::insert_many(unique(genre_ids).map(|genre_id| book_genres::ActiveModel {
        book_id: Set(book_id),
        genre_id: Set(genre_id),
    }))
    .exec_without_returning(db)
    .await?;
    Ok(())
}

async fn replace_authors<C: ConnectionTrait>(
    db: &C,
    book_id: i32,
    author_ids: &[i32],
) -> Result<(), DbErr> {
    book_authors::Entity::delete_many()
        .filter(book_authors::Column::BookId.eq(book_id))
        .exec(db)
        .await?;
    if author_ids.is_empty() {
        return Ok(());
    }
    book_authors::Entity::insert_many(unique(author_ids).map(|author_id| {
        book_authors::ActiveModel {
            book_id: Set(book_id),
            author_id: Set(author_id),
        }
    }))
    .exec_without_returning(db)
    .await?;
    Ok(())
}

fn unique(ids: &[i32]) -> impl Iterator<Item = i32> {
    let mut ids = ids.to_vec();
    ids.sort_unstable();
    ids.dedup();
    ids.into_iter()
}

// ── Chapter repository ───────────────────────────────────────────────────────

#[derive(Clone)]
pub struct DbChapterRepository {
    pub db: DatabaseConnection,
}

impl ChapterRepository for DbChapterRepository {
    async fn find_by_id(&self, id: i32) -> Result<Option<Chapter>, LibraryError> {
        let model = chapters::Entity::find_by_id(id)
            .one(&self.db)
            .await
            .context("find chapter by id")?;
        Ok(model.map(chapter_from_model))
    }

    async fn list_by_book(&self, book_id: i32) -> Result<Vec<Chapter>, LibraryError> {
        let models = chapters::Entity::find()
            .filter(chapters::Column::BookId.eq(book_id))
            .order_by_asc(chapters::Column::SerialNumber)
            .order_by_asc(chapters::Column::Id)
            .all(&self.db)
            .await
            .context("list chapters by book")?;
        Ok(models.into_iter().map(chapter_from_model).collect())
    }

    async fn related(
        &self,
        book_id: i32,
        serial_number: i32,
    ) -> Result<RelatedChapters, LibraryError> {
        let previous = match serial_number.checked_sub(1) {
            Some(n) => chapter_id_at(&self.db, book_id, n)
                .await
                .context("find previous chapter")?,
            None => None,
        };
        let next = match serial_number.checked_add(1) {
            Some(n) => chapter_id_at(&self.db, book_id, n)
                .await
                .context("find next chapter")?,
            None => None,
        };
        Ok(RelatedChapters { previous, next })
    }

    async fn create(&self, chapter: &NewChapter) -> Result<Chapter, LibraryError> {
        let model = chapters::ActiveModel {
            book_id: Set(chapter.book_id),
            name: Set(chapter.name.clone()),
            serial_number: Set(chapter.serial_number),
            ..Default::default()
        }
        .insert(&self.db)
        .await
        .context("create chapter")?;
        Ok(chapter_from_model(model))
    }

    async fn update(&self, id: i32, chapter: &NewChapter) -> Result<Option<Chapter>, LibraryError> {
        let Some(model) = chapters::Entity::find_by_id(id)
            .one(&self.db)
            .await
            .context("find chapter for update")?
        else {
            return Ok(None);
        };
        let mut active = model.into_active_model();
        active.book_id = Set(chapter.book_id);
        active.name = Set(chapter.name.clone());
        active.serial_number = Set(chapter.serial_number);
        let model = active.update(&self.db).await.context("update chapter")?;
        Ok(Some(chapter_from_model(model)))
    }

    async fn delete(&self, id: i32) -> Result<bool, LibraryError> {
        let result = chapters::Entity::delete_by_id(id)
            .exec(&self.db)
            .await
            .context("delete chapter")?;
        Ok(result.rows_affected > 0)
    }

    async fn set_file(&self, id: i32, path: &str) -> Result<Option<Option<String>>, LibraryError> {
        let Some(model) = chapters::Entity::find_by_id(id)
            .one(&self.db)
            .await
            .context("find chapter for file")?
        else {
            return Ok(None);
        };
        let previous = model.file.clone();
        let mut active = model.into_active_model();
        active.file = Set(Some(path.to_owned()));
        active.update(&self.db).await.context("set chapter file")?;
        Ok(Some(previous))
    }
}

/// Lowest chapter id with `serial_number` in the book, if any.
async fn chapter_id_at(
    db: &DatabaseConnection,
    book_id: i32,
    serial_number: i32,
) -> Result<Option<i32>, DbErr> {
    chapters::Entity::find()
        .select_only()
        .column(chapters::Column::Id)
        .filter(chapters::Column::BookId.eq(book_id))
        .filter(chapters::Column::SerialNumber.eq(serial_number))
        .order_by_asc(chapters::Column::Id)
        .into_tuple::<i32>()
        .one(db)
        .await
}

fn chapter_from_model(model: chapters::Model) -> Chapter {
    Chapter {
        id: model.id,
        book_id: model.book_id,
        name: model.name,
        serial_number: model.serial_number,
        file: model.file,
    }
}

// ── Commentary repository ────────────────────────────────────────────────────

#[derive(Clone)]
pub struct DbCommentaryRepository {
    pub db: DatabaseConnection,
}

impl CommentaryRepository for DbCommentaryRepository {
    async fn find_by_id(&self, id: i32) -> Result<Option<Commentary>, LibraryError> {
        let row = commentaries::Entity::find_by_id(id)
            .find_also_related(users::Entity)
            .one(&self.db)
            .await
            .context("find commentary by id")?;
        row.map(commentary_from_models).transpose()
    }

    async fn list_replies(&self, parent_id: i32) -> Result<Vec<Commentary>, LibraryError> {
        let rows = commentaries::Entity::find()
            .filter(commentaries::Column::ParentId.eq(parent_id))
            .order_by_asc(commentaries::Column::CreatedAt)
            .order_by_asc(commentaries::Column::Id)
            .find_also_related(users::Entity)
            .all(&self.db)
            .await
            .context("list replies")?;
        rows.into_iter().map(commentary_from_models).collect()
    }

    async fn list_threads(&self, book_id: i32) -> Result<Vec<CommentThread>, LibraryError> {
        let top_level = commentaries::Entity::find()
            .filter(commentaries::Column::BookId.eq(book_id))
            .filter(commentaries::Column::ParentId.is_null())
            .order_by_asc(commentaries::Column::CreatedAt)
            .order_by_asc(commentaries::Column::Id)
            .find_also_related(users::Entity)
            .all(&self.db)
            .await
            .context("list book comments")?;
        if top_level.is_empty() {
            return Ok(vec![]);
        }

        let parent_ids: Vec<i32> = top_level.iter().map(|(c, _)| c.id).collect();
        let reply_rows = commentaries::Entity::find()
            .filter(commentaries::Column::ParentId.is_in(parent_ids))
            .order_by_asc(commentaries::Column::CreatedAt)
            .order_by_asc(commentaries::Column::Id)
            .find_also_related(users::Entity)
            .all(&self.db)
            .await
            .context("list book replies")?;

        let mut replies: HashMap<i32, Vec<Commentary>> = HashMap::new();
        for row in reply_rows {
            let reply = commentary_from_models(row)?;
            if let Some(parent_id) = reply.parent_id {
                replies.entry(parent_id).or_default().push(reply);
            }
        }

        top_level
            .into_iter()
            .map(|row| {
                let comment = commentary_from_models(row)?;
                let replies = replies.remove(&comment.id).unwrap_or_default();
                Ok(CommentThread { comment, replies })
            })
            .collect()
    }

    async fn create(&self, commentary: &NewCommentary) -> Result<Commentary, LibraryError> {
        let model = match (commentaries::ActiveModel {
            book_id: Set(commentary.book_id),
            parent_id: Set(commentary.parent_id),
            user_id: Set(commentary.user_id),
            content: Set(commentary.content.clone()),
            created_at: Set(commentary.created_at),
            ..Default::default()
        })
        .insert(&self.db)
        .await
        {
            Ok(model) => model,
            Err(e) if is_foreign_key_violation(&e) => return Err(LibraryError::InvalidToken),
            Err(e) => return Err(anyhow::Error::new(e).context("create commentary").into()),
        };
        let author = users::Entity::find_by_id(model.user_id)
            .one(&self.db)
            .await
            .context("find commentary author")?;
        commentary_from_models((model, author))
    }

    async fn delete(&self, id: i32) -> Result<bool, LibraryError> {
        let result = commentaries::Entity::delete_by_id(id)
            .exec(&self.db)
            .await
            .context("delete commentary")?;
        Ok(result.rows_affected > 0)
    }
}

fn commentary_from_models(
    (model, author): (commentaries::Model, Option<users::Model>),
) -> Result<Commentary, LibraryError> {
    let author = author
        .map(|u| CommentAuthor {
            id: u.id,
            display_name: libris_domain::user::display_name(&u.first_name, &u.last_name, &u.email),
        })
        .with_context(|| format!("author of commentary {} is missing", model.id))?;
    Ok(Commentary {
        id: model.id,
        book_id: model.book_id,
        parent_id: model.parent_id,
        author,
        content: model.content,
        created_at: model.created_at,
    })
}

// ── Engagement repository ────────────────────────────────────────────────────

#[derive(Clone)]
pub struct DbEngagementRepository {
    pub db: DatabaseConnection,
}

impl EngagementRepository for DbEngagementRepository {
    async fn toggle_library(
        &self,
        user_id: i32,
        book_id: i32,
    ) -> Result<Option<ToggleOutcome>, LibraryError> {
        let outcome = self
            .db
            .transaction::<_, Option<ToggleOutcome>, DbErr>(|txn| {
                Box::pin(async move {
                    if books::Entity::find_by_id(book_id).one(txn).await?.is_none() {
                        return Ok(None);
                    }
                    let inserted = user_library::Entity::insert(user_library::ActiveModel {
                        user_id: Set(user_id),
                        book_id: Set(book_id),
                        added_at: Set(Utc::now()),
                    })
                    .on_conflict(
                        OnConflict::columns([
                            user_library::Column::UserId,
                            user_library::Column::BookId,
                        ])
                        .do_nothing()
                        .to_owned(),
                    )
                    .exec_without_returning(txn)
                    .await?;
                    if inserted > 0 {
                        return Ok(Some(ToggleOutcome::Added));
                    }
                    user_library::Entity::delete_many()
                        .filter(user_library::Column::UserId.eq(user_id))
                        .filter(user_library::Column::BookId.eq(book_id))
                        .exec(txn)
                        .await?;
                    Ok(Some(ToggleOutcome::Removed))
                })
            })
            .await
            .map_err(|e| missing_account_or(e, "toggle library"))?;
        Ok(outcome)
    }

    async fn toggle_like(
        &self,
        user_id: i32,
        book_id: i32,
    ) -> Result<Option<ToggleOutcome>, LibraryError> {
        let outcome = self
            .db
            .transaction::<_, Option<ToggleOutcome>, DbErr>(|txn| {
                Box::pin(async move {
                    if books::Entity::find_by_id(book_id).one(txn).await?.is_none() {
                        return Ok(None);
                    }
                    let inserted = book_likes::Entity::insert(book_likes::ActiveModel {
                        user_id: Set(user_id),
                        book_id: Set(book_id),
                        created_at: Set(Utc::now()),
                    })
                    .on_conflict(
                        OnConflict::columns([book_likes::Column::UserId, book_likes::Column::BookId])
                            .do_nothing()
                            .to_owned(),
                    )
                    .exec_without_returning(txn)
                    .await?;
                    if inserted > 0 {
                        return Ok(Some(ToggleOutcome::Added));
                    }
                    book_likes::Entity::delete_many()
                        .filter(book_likes::Column::UserId.eq(user_id))
                        .filter(book_likes::Column::BookId.eq(book_id))
                        .exec(txn)
                        .await?;
                    Ok(Some(ToggleOutcome::Removed))
                })
            })
            .await
            .map_err(|e| missing_account_or(e, "toggle like"))?;
        Ok(outcome)
    }

    async fn record_view(
        &self,
        user_id: i32,
        book_id: i32,
        at: DateTime<Utc>,
        month: NaiveDate,
    ) -> Result<(), LibraryError> {
        self.db
            .transaction::<_, (), DbErr>(|txn| {
                Box::pin(async move {
                    book_views::Entity::insert(book_views::ActiveModel {
                        user_id: Set(user_id),
                        book_id: Set(book_id),
                        viewed_at: Set(at),
                    })
                    .on_conflict(
                        OnConflict::columns([book_views::Column::UserId, book_views::Column::BookId])
                            .do_nothing()
                            .to_owned(),
                    )
                    .exec_without_returning(txn)
                    .await?;
                    book_month_views::Entity::insert(book_month_views::ActiveModel {
                        user_id: Set(user_id),
                        book_id: Set(book_id),
                        month: Set(month),
                        viewed_at: Set(at),
                    })
                    .on_conflict(
                        OnConflict::columns([
                            book_month_views::Column::UserId,
                            book_month_views::Column::BookId,
                        ])
                        .update_columns([
                            book_month_views::Column::Month,
                            book_month_views::Column::ViewedAt,
                        ])
                        .to_owned(),
                    )
                    .exec_without_returning(txn)
                    .await?;
                    Ok(())
                })
            })
            .await
            .map_err(|e| missing_account_or(e, "record book view"))?;
        Ok(())
    }

    async fn stats(&self, book_id: i32) -> Result<BookStats, LibraryError> {
        let views = book_views::Entity::find()
            .filter(book_views::Column::BookId.eq(book_id))
            .count(&self.db)
            .await
            .context("count book views")?;
        let likes = book_likes::Entity::find()
            .filter(book_likes::Column::BookId.eq(book_id))
            .count(&self.db)
            .await
            .context("count book likes")?;
        Ok(BookStats { views, likes })
    }

    async fn flags(&self, user_id: i32, book_id: i32) -> Result<ReaderFlags, LibraryError> {
        let in_library = user_library::Entity::find_by_id((user_id, book_id))
            .one(&self.db)
            .await
            .context("find library entry")?
            .is_some();
        let is_liked = book_likes::Entity::find_by_id((user_id, book_id))
            .one(&self.db)
            .await
            .context("find like")?
            .is_some();
        Ok(ReaderFlags {
            in_library,
            is_liked,
        })
    }
}

// ── User repository ──────────────────────────────────────────────────────────

#[derive(Clone)]
pub struct DbUserRepository {
    pub db: DatabaseConnection,
}

impl UserRepository for DbUserRepository {
    async fn find_by_id(&self, id: i32) -> Result<Option<User>, LibraryError> {
        let model = users::Entity::find_by_id(id)
            .one(&self.db)
            .await
            .context("find user by id")?;
        Ok(model.map(user_from_model))
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<User>, LibraryError> {
        let model = users::Entity::find()
            .filter(users::Column::Email.eq(email))
            .one(&self.db)
            .await
            .context("find user by email")?;
        Ok(model.map(user_from_model))
    }

    async fn create(&self, user: &NewUser) -> Result<User, LibraryError> {
        let result = users::ActiveModel {
            email: Set(user.email.clone()),
            password: Set(user.password_hash.clone()),
            first_name: Set(user.first_name.clone()),
            last_name: Set(user.last_name.clone()),
            role: Set(i16::from(UserRole::Reader.as_u8())),
            is_active: Set(true),
            date_joined: Set(user.date_joined),
            ..Default::default()
        }
        .insert(&self.db)
        .await;
        match result {
            Ok(model) => Ok(user_from_model(model)),
            Err(e) if is_unique_violation(&e) => Err(LibraryError::UserAlreadyExists),
            Err(e) => Err(anyhow::Error::new(e).context("create user").into()),
        }
    }

    async fn update(&self, id: i32, patch: &UserPatch) -> Result<Option<User>, LibraryError> {
        let Some(model) = users::Entity::find_by_id(id)
            .one(&self.db)
            .await
            .context("find user for update")?
        else {
            return Ok(None);
        };
        let mut user = model.clone().into_active_model();
        if let Some(email) = &patch.email {
            user.email = Set(email.clone());
        }
        if let Some(hash) = &patch.password_hash {
            user.password = Set(hash.clone());
        }
        if let Some(first_name) = &patch.first_name {
            user.first_name = Set(first_name.clone());
        }
        if let Some(last_name) = &patch.last_name {
            user.last_name = Set(last_name.clone());
        }
        if !user.is_changed() {
            return Ok(Some(user_from_model(model)));
        }
        match user.update(&self.db).await {
            Ok(model) => Ok(Some(user_from_model(model))),
            Err(e) if is_unique_violation(&e) => Err(LibraryError::UserAlreadyExists),
            Err(e) => Err(anyhow::Error::new(e).context("update user").into()),
        }
    }

    async fn delete_reassigning_comments(&self, id: i32) -> Result<bool, LibraryError> {
        let deleted = self
            .db
            .transaction::<_, bool, DbErr>(|txn| {
                Box::pin(async move {
                    if users::Entity::find_by_id(id).one(txn).await?.is_none() {
                        return Ok(false);
                    }
                    // Upsert so concurrent deletions share one sentinel.
                    users::Entity::insert(users::ActiveModel {
                        email: Set(SENTINEL_EMAIL.to_owned()),
                        password: Set(UNUSABLE_PASSWORD.to_owned()),
                        first_name: Set(SENTINEL_FIRST_NAME.to_owned()),
                        last_name: Set(SENTINEL_LAST_NAME.to_owned()),
                        role: Set(i16::from(UserRole::Reader.as_u8())),
                        is_active: Set(false),
                        date_joined: Set(Utc::now()),
                        ..Default::default()
                    })
                    .on_conflict(
                        OnConflict::column(users::Column::Email)
                            .do_nothing()
                            .to_owned(),
                    )
                    .exec_without_returning(txn)
                    .await?;
                    let sentinel_id = users::Entity::find()
                        .filter(users::Column::Email.eq(SENTINEL_EMAIL))
                        .one(txn)
                        .await?
                        .ok_or_else(|| DbErr::RecordNotFound(SENTINEL_EMAIL.to_owned()))?
                        .id;
                    if sentinel_id == id {
                        return Ok(false);
                    }
                    commentaries::Entity::update_many()
                        .col_expr(commentaries::Column::UserId, Expr::value(sentinel_id))
                        .filter(commentaries::Column::UserId.eq(id))
                        .exec(txn)
                        .await?;
                    users::Entity::delete_by_id(id).exec(txn).await?;
                    Ok(true)
                })
            })
            .await
            .context("delete user")?;
        Ok(deleted)
    }
}

fn is_unique_violation(err: &DbErr) -> bool {
    matches!(err.sql_err(), Some(SqlErr::UniqueConstraintViolation(_)))
}

fn is_foreign_key_violation(err: &DbErr) -> bool {
    matches!(err.sql_err(), Some(SqlErr::ForeignKeyConstraintViolation(_)))
}

/// User-keyed writes whose caller row is gone (the account was deleted while
/// its access token is still unexpired) report `InvalidToken`.
fn missing_account_or(err: TransactionError<DbErr>, context: &'static str) -> LibraryError {
    match err {
        TransactionError::Transaction(e) if is_foreign_key_violation(&e) => {
            LibraryError::InvalidToken
        }
        other => anyhow::Error::new(other).context(context).into(),
    }
}

fn user_from_model(model: users::Model) -> User {
    User {
        id: model.id,
        email: model.email,
        password_hash: model.password,
        first_name: model.first_name,
        last_name: model.last_name,
        role: u8::try_from(model.role)
            .ok()
            .and_then(UserRole::from_u8)
            .unwrap_or(UserRole::Reader),
        is_active: model.is_active,
        date_joined: model.date_joined,
    }
}
