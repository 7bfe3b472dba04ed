//! Store-level tests against a real Postgres instance.
//!
//! Point DATABASE_URL at a throwaway database to run them; without it
//! every test returns early. Each test seeds its own accounts and rows,
//! so the suite can share one database.

use sqlx::Row;
use uuid::Uuid;

use handle_errors::Error;
use student_hub::store::Store;
use student_hub::types::account::{Account, AccountId};
use student_hub::types::answer::NewAnswer;
use student_hub::types::question::{NewQuestion, QuestionId};
use student_hub::types::tutor::NewTutor;

async fn test_store() -> Option<Store> {
    let db_url = std::env::var("DATABASE_URL").ok()?;
    let store = Store::new(&db_url).await.ok()?;
    sqlx::migrate!().run(&store.connection).await.ok()?;
    Some(store)
}

async fn seed_account(store: &Store) -> AccountId {
    let username = format!("student-{}", Uuid::new_v4());
    store
        .add_account(Account {
            id: None,
            username: username.clone(),
            password: "hashed-elsewhere".to_string(),
        })
        .await
        .unwrap();
    store.get_account(username).await.unwrap().id.unwrap()
}

async fn seed_answer(store: &Store, account_id: AccountId) -> i32 {
    let question = store
        .add_question(
            NewQuestion {
                content: "How do lifetimes work?".to_string(),
            },
            account_id.clone(),
        )
        .await
        .unwrap();

    store
        .add_answer(
            NewAnswer {
                content: "They name borrow scopes.".to_string(),
                question_id: question.id,
            },
            account_id,
        )
        .await
        .unwrap()
        .id
        .0
}

async fn seed_tutor(store: &Store, slots: &str) -> i32 {
    store
        .add_tutor(NewTutor {
            name: format!("tutor-{}", Uuid::new_v4()),
            phone: "555-0100".to_string(),
            subject: "Rust".to_string(),
            available_slots: slots.to_string(),
        })
        .await
        .unwrap()
        .id
        .0
}

async fn vote_rows(store: &Store, answer_id: i32) -> i64 {
    sqlx::query("SELECT COUNT(*) AS votes FROM answer_votes WHERE answer_id = $1")
        .bind(answer_id)
        .fetch_one(&store.connection)
        .await
        .unwrap()
        .get("votes")
}

#[tokio::test]
async fn toggling_twice_returns_counter_to_original() {
    let store = match test_store().await {
        Some(store) => store,
        None => return,
    };
    let voter = seed_account(&store).await;
    let answer_id = seed_answer(&store, seed_account(&store).await).await;

    let on = store.toggle_vote(answer_id, voter.clone()).await.unwrap();
    assert!(on.applied);
    assert_eq!(on.upvotes, 1);
    assert_eq!(vote_rows(&store, answer_id).await, 1);

    let off = store.toggle_vote(answer_id, voter.clone()).await.unwrap();
    assert!(!off.applied);
    assert_eq!(off.upvotes, 0);
    assert_eq!(vote_rows(&store, answer_id).await, 0);

    // three calls, one net effect
    let on_again = store.toggle_vote(answer_id, voter).await.unwrap();
    assert!(on_again.applied);
    assert_eq!(on_again.upvotes, 1);
    assert_eq!(vote_rows(&store, answer_id).await, 1);
}

#[tokio::test]
async fn counter_always_matches_vote_rows() {
    let store = match test_store().await {
        Some(store) => store,
        None => return,
    };
    let author = seed_account(&store).await;
    let answer_id = seed_answer(&store, author).await;

    for _ in 0..3 {
        let voter = seed_account(&store).await;
        let receipt = store.toggle_vote(answer_id, voter).await.unwrap();
        assert_eq!(i64::from(receipt.upvotes), vote_rows(&store, answer_id).await);
    }
}

#[tokio::test]
async fn voting_on_missing_answer_is_not_found() {
    let store = match test_store().await {
        Some(store) => store,
        None => return,
    };
    let voter = seed_account(&store).await;

    let result = store.toggle_vote(0, voter).await;
    assert!(matches!(result, Err(Error::NotFound("answers"))));
}

#[tokio::test]
async fn booking_unlisted_slot_fails_without_mutation() {
    let store = match test_store().await {
        Some(store) => store,
        None => return,
    };
    let student = seed_account(&store).await;
    let tutor_id = seed_tutor(&store, "Mon 9am, Tue 2pm").await;

    let result = store.book_slot(tutor_id, student.clone(), "Wed 1pm").await;
    assert!(matches!(result, Err(Error::SlotUnavailable)));

    let tutor = store.get_tutor(tutor_id).await.unwrap();
    assert_eq!(tutor.available_slots, vec!["Mon 9am", "Tue 2pm"]);
    assert!(store.get_bookings(student).await.unwrap().is_empty());
}

#[tokio::test]
async fn cancelled_slot_is_bookable_again() {
    let store = match test_store().await {
        Some(store) => store,
        None => return,
    };
    let student_a = seed_account(&store).await;
    let student_b = seed_account(&store).await;
    let tutor_id = seed_tutor(&store, "Mon 9am, Tue 2pm").await;

    let booking = store
        .book_slot(tutor_id, student_a.clone(), "Mon 9am")
        .await
        .unwrap();
    assert_eq!(booking.slot, "Mon 9am");
    assert_eq!(
        store.get_tutor(tutor_id).await.unwrap().available_slots,
        vec!["Tue 2pm"]
    );

    let contested = store.book_slot(tutor_id, student_b.clone(), "Mon 9am").await;
    assert!(matches!(contested, Err(Error::SlotUnavailable)));

    store.cancel_booking(booking.id.0).await.unwrap();
    let available = store.get_tutor(tutor_id).await.unwrap().available_slots;
    assert!(available.contains(&"Mon 9am".to_string()));

    // the freed slot can be claimed by someone else
    let rebooked = store.book_slot(tutor_id, student_b, "Mon 9am").await.unwrap();
    assert_eq!(rebooked.slot, "Mon 9am");
}

#[tokio::test]
async fn answer_on_missing_question_is_not_found() {
    let store = match test_store().await {
        Some(store) => store,
        None => return,
    };
    let author = seed_account(&store).await;

    let result = store
        .add_answer(
            NewAnswer {
                content: "answering the void".to_string(),
                question_id: QuestionId(0),
            },
            author,
        )
        .await;
    assert!(matches!(result, Err(Error::NotFound("questions"))));
}

#[tokio::test]
async fn deleting_missing_rows_is_not_found() {
    let store = match test_store().await {
        Some(store) => store,
        None => return,
    };
    let account = seed_account(&store).await;

    let question = store.delete_question(0, account.clone()).await;
    assert!(matches!(question, Err(Error::NotFound("questions"))));

    let answer = store.delete_answer(0, account).await;
    assert!(matches!(answer, Err(Error::NotFound("answers"))));
}
