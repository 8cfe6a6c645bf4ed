use libris_auth_types::identity::Identity;
use libris_domain::user::UserRole;
use libris_library::domain::repository::EngagementRepository;
use libris_library::domain::types::NewBook;
use libris_library::error::LibraryError;
use libris_library::usecase::book::{CreateBookUseCase, GetBookUseCase};
use libris_library::usecase::commentary::{
    AddCommentUseCase, AddReplyUseCase, DeleteCommentaryUseCase, GetCommentaryUseCase,
};

use crate::helpers::{
    at, authors, books, chapters, commentaries, engagement, genres, seed_book, seed_chapter,
    seed_genre, seed_named_user, seed_user, test_db,
};

// ── Book detail ──────────────────────────────────────────────────────────────

#[tokio::test]
async fn should_record_view_and_return_flags_for_viewer() {
    let db = test_db().await;
    let reader = seed_user(&db, "reader@example.com", false).await;
    let book = seed_book(&db, "Dune", 412, vec![], vec![]).await;
    seed_chapter(&db, book, "Arrakis", 1).await;
    engagement(&db).toggle_like(reader, book).await.unwrap();

    let uc = GetBookUseCase {
        books: books(&db),
        chapters: chapters(&db),
        commentaries: commentaries(&db),
        engagement: engagement(&db),
    };

    let detail = uc
        .execute(book, Some(reader), at(2026, 10, 1))
        .await
        .unwrap();
    assert_eq!(detail.stats.views, 1);
    assert_eq!(detail.stats.likes, 1);
    assert_eq!(detail.chapters.len(), 1);
    let flags = detail.flags.unwrap();
    assert!(flags.is_liked);
    assert!(!flags.in_library);

    let again = uc
        .execute(book, Some(reader), at(2026, 10, 2))
        .await
        .unwrap();
    assert_eq!(again.stats.views, 1);
}

#[tokio::test]
async fn should_not_record_anonymous_views() {
    let db = test_db().await;
    let book = seed_book(&db, "Dune", 412, vec![], vec![]).await;
    let uc = GetBookUseCase {
        books: books(&db),
        chapters: chapters(&db),
        commentaries: commentaries(&db),
        engagement: engagement(&db),
    };

    let detail = uc.execute(book, None, at(2026, 10, 1)).await.unwrap();
    assert_eq!(detail.stats.views, 0);
    assert!(detail.flags.is_none());

    let err = uc.execute(999, None, at(2026, 10, 1)).await.unwrap_err();
    assert!(matches!(err, LibraryError::BookNotFound));
}

#[tokio::test]
async fn should_reject_book_with_unknown_genre() {
    let db = test_db().await;
    let scifi = seed_genre(&db, "Sci-Fi").await;
    let uc = CreateBookUseCase {
        books: books(&db),
        genres: genres(&db),
        authors: authors(&db),
    };

    let err = uc
        .execute(NewBook {
            name: "Dune".into(),
            pages: 412,
            summary: String::new(),
            genre_ids: vec![scifi, 42],
            author_ids: vec![],
        })
        .await
        .unwrap_err();
    let LibraryError::Validation(fields) = err else {
        panic!("expected validation error, got {err:?}");
    };
    assert!(fields.get("genres").is_some());

    let created = uc
        .execute(NewBook {
            name: "Dune".into(),
            pages: 412,
            summary: String::new(),
            genre_ids: vec![scifi, scifi],
            author_ids: vec![],
        })
        .await
        .unwrap();
    assert_eq!(created.genres.len(), 1);
}

// ── Commentaries ─────────────────────────────────────────────────────────────

#[tokio::test]
async fn should_attach_reply_to_reply_under_top_level_comment() {
    let db = test_db().await;
    let paul = seed_named_user(&db, "paul@example.com", "Paul", "Atreides").await;
    let chani = seed_named_user(&db, "chani@example.com", "Chani", "").await;
    let book = seed_book(&db, "Dune", 412, vec![], vec![]).await;
    let now = at(2026, 6, 1);

    let comment = AddCommentUseCase {
        commentaries: commentaries(&db),
        books: books(&db),
    }
    .execute(paul, book, "  The sleeper must awaken  ", now)
    .await
    .unwrap();
    assert_eq!(comment.content, "The sleeper must awaken");
    assert_eq!(comment.book_id, Some(book));

    let replies = AddReplyUseCase {
        commentaries: commentaries(&db),
    };
    let first = replies
        .execute(chani, comment.id, "Tell me of your homeworld", now)
        .await
        .unwrap();
    assert_eq!(first.parent_id, Some(comment.id));
    assert_eq!(first.book_id, None);

    let nested = replies.execute(paul, first.id, "Caladan", now).await.unwrap();
    assert_eq!(nested.parent_id, Some(comment.id));
    assert_eq!(nested.content, "Chani, Caladan");

    let thread = GetCommentaryUseCase {
        commentaries: commentaries(&db),
    }
    .execute(comment.id)
    .await
    .unwrap();
    assert_eq!(thread.replies.len(), 2);

    let leaf = GetCommentaryUseCase {
        commentaries: commentaries(&db),
    }
    .execute(first.id)
    .await
    .unwrap();
    assert!(leaf.replies.is_empty());
}

#[tokio::test]
async fn should_reject_comment_on_missing_book() {
    let db = test_db().await;
    let user = seed_user(&db, "reader@example.com", false).await;
    let err = AddCommentUseCase {
        commentaries: commentaries(&db),
        books: books(&db),
    }
    .execute(user, 999, "hello", at(2026, 6, 1))
    .await
    .unwrap_err();
    assert!(matches!(err, LibraryError::BookNotFound));
}

#[tokio::test]
async fn should_only_let_author_or_staff_delete_comment() {
    let db = test_db().await;
    let author = seed_user(&db, "author@example.com", false).await;
    let other = seed_user(&db, "other@example.com", false).await;
    let staff = seed_user(&db, "staff@example.com", true).await;
    let book = seed_book(&db, "Dune", 412, vec![], vec![]).await;
    let add = AddCommentUseCase {
        commentaries: commentaries(&db),
        books: books(&db),
    };
    let first = add.execute(author, book, "one", at(2026, 6, 1)).await.unwrap();
    let second = add.execute(author, book, "two", at(2026, 6, 2)).await.unwrap();

    let uc = DeleteCommentaryUseCase {
        commentaries: commentaries(&db),
    };
    let stranger = Identity {
        user_id: other,
        user_role: UserRole::Reader.as_u8(),
    };
    let err = uc.execute(first.id, &stranger).await.unwrap_err();
    assert!(matches!(err, LibraryError::Forbidden));

    let owner = Identity {
        user_id: author,
        user_role: UserRole::Reader.as_u8(),
    };
    uc.execute(first.id, &owner).await.unwrap();

    let moderator = Identity {
        user_id: staff,
        user_role: UserRole::Staff.as_u8(),
    };
    uc.execute(second.id, &moderator).await.unwrap();
    assert!(matches!(
        uc.execute(second.id, &moderator).await.unwrap_err(),
        LibraryError::CommentaryNotFound
    ));
}
