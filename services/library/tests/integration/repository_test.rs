use sea_orm::{ColumnTrait, EntityTrait, PaginatorTrait, QueryFilter};

use libris_domain::engagement::ToggleOutcome;
use libris_domain::ordering::BookOrdering;
use libris_domain::pagination::PageRequest;
use libris_library::domain::repository::{
    BookRepository, ChapterRepository, CommentaryRepository, EngagementRepository,
    GenreRepository, UserRepository,
};
use libris_library::domain::types::{
    BookFilter, BookPatch, NewCommentary, NewUser, SENTINEL_EMAIL, month_start,
};
use libris_library::error::LibraryError;
use libris_library_schema::{
    book_month_views, book_views, commentaries as commentary_rows, users as user_rows,
};

use crate::helpers::{
    at, books, chapters, commentaries, engagement, genres, seed_author, seed_book, seed_chapter,
    seed_genre, seed_user, test_db, users,
};

// ── Engagement ───────────────────────────────────────────────────────────────

#[tokio::test]
async fn should_flip_library_membership_on_each_toggle() {
    let db = test_db().await;
    let user = seed_user(&db, "reader@example.com", false).await;
    let book = seed_book(&db, "Dune", 412, vec![], vec![]).await;
    let repo = engagement(&db);

    assert_eq!(
        repo.toggle_library(user, book).await.unwrap(),
        Some(ToggleOutcome::Added)
    );
    assert!(repo.flags(user, book).await.unwrap().in_library);
    assert_eq!(
        repo.toggle_library(user, book).await.unwrap(),
        Some(ToggleOutcome::Removed)
    );
    assert!(!repo.flags(user, book).await.unwrap().in_library);
}

#[tokio::test]
async fn should_count_likes_per_distinct_user() {
    let db = test_db().await;
    let ann = seed_user(&db, "ann@example.com", false).await;
    let bob = seed_user(&db, "bob@example.com", false).await;
    let book = seed_book(&db, "Dune", 412, vec![], vec![]).await;
    let repo = engagement(&db);

    repo.toggle_like(ann, book).await.unwrap();
    repo.toggle_like(bob, book).await.unwrap();
    assert_eq!(repo.stats(book).await.unwrap().likes, 2);

    repo.toggle_like(ann, book).await.unwrap();
    let stats = repo.stats(book).await.unwrap();
    assert_eq!(stats.likes, 1);
    assert!(!repo.flags(ann, book).await.unwrap().is_liked);
    assert!(repo.flags(bob, book).await.unwrap().is_liked);
}

#[tokio::test]
async fn should_report_missing_book_on_toggle() {
    let db = test_db().await;
    let user = seed_user(&db, "reader@example.com", false).await;
    let repo = engagement(&db);
    assert_eq!(repo.toggle_library(user, 999).await.unwrap(), None);
    assert_eq!(repo.toggle_like(user, 999).await.unwrap(), None);
}

#[tokio::test]
async fn should_keep_one_view_row_and_restamp_month() {
    let db = test_db().await;
    let user = seed_user(&db, "reader@example.com", false).await;
    let book = seed_book(&db, "Dune", 412, vec![], vec![]).await;
    let repo = engagement(&db);

    let march = at(2026, 3, 10);
    let april = at(2026, 4, 2);
    repo.record_view(user, book, march, month_start(march))
        .await
        .unwrap();
    repo.record_view(user, book, april, month_start(april))
        .await
        .unwrap();

    assert_eq!(book_views::Entity::find().count(&db).await.unwrap(), 1);
    let month_rows = book_month_views::Entity::find().all(&db).await.unwrap();
    assert_eq!(month_rows.len(), 1);
    assert_eq!(month_rows[0].month, month_start(april));
    assert_eq!(repo.stats(book).await.unwrap().views, 1);
}

#[tokio::test]
async fn should_report_invalid_token_for_writes_by_deleted_user() {
    let db = test_db().await;
    let user = seed_user(&db, "reader@example.com", false).await;
    let book = seed_book(&db, "Dune", 412, vec![], vec![]).await;
    assert!(users(&db).delete_reassigning_comments(user).await.unwrap());
    let repo = engagement(&db);
    let now = at(2026, 3, 10);

    assert!(matches!(
        repo.record_view(user, book, now, month_start(now))
            .await
            .unwrap_err(),
        LibraryError::InvalidToken
    ));
    assert!(matches!(
        repo.toggle_like(user, book).await.unwrap_err(),
        LibraryError::InvalidToken
    ));
    assert!(matches!(
        repo.toggle_library(user, book).await.unwrap_err(),
        LibraryError::InvalidToken
    ));
    let err = commentaries(&db)
        .create(&NewCommentary {
            book_id: Some(book),
            parent_id: None,
            user_id: user,
            content: "Still here?".into(),
            created_at: now,
        })
        .await
        .unwrap_err();
    assert!(matches!(err, LibraryError::InvalidToken), "got {err:?}");
    assert_eq!(book_views::Entity::find().count(&db).await.unwrap(), 0);
}

// ── Books ────────────────────────────────────────────────────────────────────

#[tokio::test]
async fn should_filter_books_by_genre_and_author() {
    let db = test_db().await;
    let scifi = seed_genre(&db, "Sci-Fi").await;
    let fantasy = seed_genre(&db, "Fantasy").await;
    let herbert = seed_author(&db, "Frank", "Herbert").await;
    let le_guin = seed_author(&db, "Ursula", "Le Guin").await;
    let dune = seed_book(&db, "Dune", 412, vec![scifi], vec![herbert]).await;
    let earthsea = seed_book(&db, "Earthsea", 183, vec![fantasy], vec![le_guin]).await;
    let dispossessed = seed_book(&db, "The Dispossessed", 387, vec![scifi], vec![le_guin]).await;
    let repo = books(&db);

    let ids = |list: Vec<libris_library::domain::types::BookWithLinks>| {
        list.into_iter().map(|b| b.book.id).collect::<Vec<_>>()
    };

    let by_genre = repo
        .list(
            &BookFilter {
                genre_ids: vec![scifi],
                author_ids: vec![],
            },
            BookOrdering::default(),
            PageRequest::default(),
        )
        .await
        .unwrap();
    assert_eq!(ids(by_genre), vec![dune, dispossessed]);

    let by_both = repo
        .list(
            &BookFilter {
                genre_ids: vec![scifi],
                author_ids: vec![le_guin],
            },
            BookOrdering::default(),
            PageRequest::default(),
        )
        .await
        .unwrap();
    assert_eq!(ids(by_both), vec![dispossessed]);

    let all = repo
        .list(
            &BookFilter::default(),
            BookOrdering::default(),
            PageRequest::default(),
        )
        .await
        .unwrap();
    assert_eq!(ids(all), vec![dune, earthsea, dispossessed]);
}

#[tokio::test]
async fn should_order_and_paginate_books() {
    let db = test_db().await;
    let a = seed_book(&db, "A", 300, vec![], vec![]).await;
    let b = seed_book(&db, "B", 100, vec![], vec![]).await;
    let c = seed_book(&db, "C", 200, vec![], vec![]).await;
    let repo = books(&db);

    let by_pages_desc = repo
        .list(
            &BookFilter::default(),
            "-pages".parse().unwrap(),
            PageRequest::default(),
        )
        .await
        .unwrap();
    let ids: Vec<i32> = by_pages_desc.iter().map(|b| b.book.id).collect();
    assert_eq!(ids, vec![a, c, b]);

    let second_page = repo
        .list(
            &BookFilter::default(),
            "name".parse().unwrap(),
            PageRequest::from_parts(Some(2), Some(2)),
        )
        .await
        .unwrap();
    let ids: Vec<i32> = second_page.iter().map(|b| b.book.id).collect();
    assert_eq!(ids, vec![c]);
}

#[tokio::test]
async fn should_replace_links_on_update() {
    let db = test_db().await;
    let scifi = seed_genre(&db, "Sci-Fi").await;
    let classic = seed_genre(&db, "Classic").await;
    let herbert = seed_author(&db, "Frank", "Herbert").await;
    let book = seed_book(&db, "Dune", 412, vec![scifi], vec![herbert]).await;
    let repo = books(&db);

    let updated = repo
        .update(
            book,
            &BookPatch {
                pages: Some(500),
                genre_ids: Some(vec![classic]),
                ..BookPatch::default()
            },
        )
        .await
        .unwrap();
    assert!(updated);

    let stored = repo.find_with_links(book).await.unwrap().unwrap();
    assert_eq!(stored.book.pages, 500);
    assert_eq!(stored.book.name, "Dune");
    assert_eq!(
        stored.genres.iter().map(|g| g.id).collect::<Vec<_>>(),
        vec![classic]
    );
    assert_eq!(
        stored.authors.iter().map(|a| a.id).collect::<Vec<_>>(),
        vec![herbert]
    );
    assert!(!repo.update(999, &BookPatch::default()).await.unwrap());
}

#[tokio::test]
async fn should_keep_books_when_genre_is_deleted() {
    let db = test_db().await;
    let scifi = seed_genre(&db, "Sci-Fi").await;
    let book = seed_book(&db, "Dune", 412, vec![scifi], vec![]).await;

    assert!(genres(&db).delete(scifi).await.unwrap());
    let stored = books(&db).find_with_links(book).await.unwrap().unwrap();
    assert!(stored.genres.is_empty());
}

#[tokio::test]
async fn should_rank_popular_books_within_month() {
    let db = test_db().await;
    let ann = seed_user(&db, "ann@example.com", false).await;
    let bob = seed_user(&db, "bob@example.com", false).await;
    let dune = seed_book(&db, "Dune", 412, vec![], vec![]).await;
    let emma = seed_book(&db, "Emma", 474, vec![], vec![]).await;
    let ulysses = seed_book(&db, "Ulysses", 730, vec![], vec![]).await;
    let repo = engagement(&db);

    let this_month = at(2026, 10, 5);
    let last_month = at(2026, 9, 20);
    for (user, book, when) in [
        (ann, emma, this_month),
        (bob, emma, this_month),
        (ann, dune, this_month),
        (bob, ulysses, last_month),
    ] {
        repo.record_view(user, book, when, month_start(when))
            .await
            .unwrap();
    }

    let popular = books(&db)
        .popular_in_month(month_start(this_month), 10)
        .await
        .unwrap();
    let ranked: Vec<(i32, u64)> = popular
        .iter()
        .map(|p| (p.book.book.id, p.month_views))
        .collect();
    assert_eq!(ranked, vec![(emma, 2), (dune, 1)]);

    let top = books(&db)
        .popular_in_month(month_start(this_month), 1)
        .await
        .unwrap();
    assert_eq!(top.len(), 1);
}

#[tokio::test]
async fn should_list_personal_library() {
    let db = test_db().await;
    let user = seed_user(&db, "reader@example.com", false).await;
    let dune = seed_book(&db, "Dune", 412, vec![], vec![]).await;
    seed_book(&db, "Emma", 474, vec![], vec![]).await;

    engagement(&db).toggle_library(user, dune).await.unwrap();
    let library = books(&db).list_library(user).await.unwrap();
    assert_eq!(library.len(), 1);
    assert_eq!(library[0].book.id, dune);
}

// ── Chapters ─────────────────────────────────────────────────────────────────

#[tokio::test]
async fn should_find_neighbouring_chapters_by_serial_number() {
    let db = test_db().await;
    let book = seed_book(&db, "Dune", 412, vec![], vec![]).await;
    let other = seed_book(&db, "Emma", 474, vec![], vec![]).await;
    let first = seed_chapter(&db, book, "Arrakis", 1).await;
    seed_chapter(&db, book, "Muad'Dib", 2).await;
    let third = seed_chapter(&db, book, "The Prophet", 3).await;
    seed_chapter(&db, other, "Volume II", 3).await;

    let related = chapters(&db).related(book, 2).await.unwrap();
    assert_eq!(related.previous, Some(first));
    assert_eq!(related.next, Some(third));

    let edge = chapters(&db).related(book, 3).await.unwrap();
    assert_eq!(edge.next, None);
}

#[tokio::test]
async fn should_list_chapters_in_reading_order() {
    let db = test_db().await;
    let book = seed_book(&db, "Dune", 412, vec![], vec![]).await;
    let second = seed_chapter(&db, book, "Two", 2).await;
    let first = seed_chapter(&db, book, "One", 1).await;

    let listed: Vec<i32> = chapters(&db)
        .list_by_book(book)
        .await
        .unwrap()
        .iter()
        .map(|c| c.id)
        .collect();
    assert_eq!(listed, vec![first, second]);
}

// ── Commentaries ─────────────────────────────────────────────────────────────

#[tokio::test]
async fn should_group_replies_under_their_comment() {
    let db = test_db().await;
    let user = seed_user(&db, "reader@example.com", false).await;
    let book = seed_book(&db, "Dune", 412, vec![], vec![]).await;
    let repo = commentaries(&db);

    let comment = repo
        .create(&NewCommentary {
            book_id: Some(book),
            parent_id: None,
            user_id: user,
            content: "Spice must flow".into(),
            created_at: at(2026, 5, 1),
        })
        .await
        .unwrap();
    let reply = repo
        .create(&NewCommentary {
            book_id: None,
            parent_id: Some(comment.id),
            user_id: user,
            content: "Agreed".into(),
            created_at: at(2026, 5, 2),
        })
        .await
        .unwrap();

    let threads = repo.list_threads(book).await.unwrap();
    assert_eq!(threads.len(), 1);
    assert_eq!(threads[0].comment.id, comment.id);
    assert_eq!(threads[0].replies.len(), 1);
    assert_eq!(threads[0].replies[0].id, reply.id);

    assert!(repo.delete(comment.id).await.unwrap());
    assert!(repo.find_by_id(reply.id).await.unwrap().is_none());
}

// ── Users ────────────────────────────────────────────────────────────────────

fn new_user(email: &str) -> NewUser {
    NewUser {
        email: email.to_owned(),
        password_hash: "hash".into(),
        first_name: String::new(),
        last_name: String::new(),
        date_joined: at(2026, 1, 1),
    }
}

#[tokio::test]
async fn should_reject_duplicate_email() {
    let db = test_db().await;
    let repo = users(&db);
    repo.create(&new_user("ada@example.com")).await.unwrap();
    let err = repo.create(&new_user("ada@example.com")).await.unwrap_err();
    assert!(
        matches!(err, LibraryError::UserAlreadyExists),
        "expected UserAlreadyExists, got {err:?}"
    );
}

#[tokio::test]
async fn should_hand_comments_to_sentinel_on_delete() {
    let db = test_db().await;
    let ada = users(&db).create(&new_user("ada@example.com")).await.unwrap();
    let grace = users(&db)
        .create(&new_user("grace@example.com"))
        .await
        .unwrap();
    let book = seed_book(&db, "Dune", 412, vec![], vec![]).await;
    let comment = commentaries(&db)
        .create(&NewCommentary {
            book_id: Some(book),
            parent_id: None,
            user_id: ada.id,
            content: "Great read".into(),
            created_at: at(2026, 5, 1),
        })
        .await
        .unwrap();

    assert!(users(&db).delete_reassigning_comments(ada.id).await.unwrap());
    assert!(users(&db).find_by_id(ada.id).await.unwrap().is_none());

    let sentinel = users(&db)
        .find_by_email(SENTINEL_EMAIL)
        .await
        .unwrap()
        .unwrap();
    assert!(!sentinel.is_active);
    let row = commentary_rows::Entity::find_by_id(comment.id)
        .one(&db)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(row.user_id, sentinel.id);

    // A second deletion reuses the same sentinel.
    assert!(users(&db).delete_reassigning_comments(grace.id).await.unwrap());
    assert!(!users(&db).delete_reassigning_comments(grace.id).await.unwrap());
    assert!(
        !users(&db)
            .delete_reassigning_comments(sentinel.id)
            .await
            .unwrap()
    );
}

#[tokio::test]
async fn should_share_one_sentinel_across_simultaneous_deletions() {
    let db = test_db().await;
    let ada = seed_user(&db, "ada@example.com", false).await;
    let grace = seed_user(&db, "grace@example.com", false).await;
    let repo = users(&db);

    let (first, second) = tokio::join!(
        repo.delete_reassigning_comments(ada),
        repo.delete_reassigning_comments(grace),
    );
    assert!(first.unwrap());
    assert!(second.unwrap());

    let sentinels = user_rows::Entity::find()
        .filter(user_rows::Column::Email.eq(SENTINEL_EMAIL))
        .count(&db)
        .await
        .unwrap();
    assert_eq!(sentinels, 1);
}
