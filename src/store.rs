use sqlx::postgres::{PgPool, PgPoolOptions, PgRow};
use sqlx::Row;

use crate::types::{
    account::{Account, AccountId},
    answer::{Answer, AnswerId, NewAnswer, VoteReceipt},
    booking::{Booking, BookingId},
    question::{NewQuestion, Question, QuestionId},
    tutor::{parse_slot_labels, NewTutor, Tutor, TutorId},
};

use handle_errors::Error;

#[derive(Debug, Clone)]
pub struct Store {
    pub connection: PgPool,
}

fn db_err(error: sqlx::Error) -> Error {
    tracing::event!(tracing::Level::ERROR, "{:?}", error);
    Error::DatabaseQueryError(error)
}

impl Store {
    pub async fn new(db_url: &str) -> Result<Self, Error> {
        let db_pool = PgPoolOptions::new()
            .max_connections(5)
            .connect(db_url)
            .await
            .map_err(db_err)?;

        Ok(Store {
            connection: db_pool,
        })
    }

    pub async fn get_questions(
        &self,
        limit: Option<u32>,
        offset: u32,
    ) -> Result<Vec<Question>, Error> {
        match sqlx::query("SELECT * from questions ORDER BY id LIMIT $1 OFFSET $2")
            .bind(limit)
            .bind(offset)
            .map(|row: PgRow| Question {
                id: QuestionId(row.get("id")),
                content: row.get("content"),
                account_id: AccountId(row.get("account_id")),
            })
            .fetch_all(&self.connection)
            .await
        {
            Ok(questions) => Ok(questions),
            Err(error) => Err(db_err(error)),
        }
    }

    pub async fn search_questions(&self, query: String) -> Result<Vec<Question>, Error> {
        match sqlx::query(
            "SELECT * from questions WHERE content ILIKE '%' || $1 || '%' ORDER BY id",
        )
        .bind(query)
        .map(|row: PgRow| Question {
            id: QuestionId(row.get("id")),
            content: row.get("content"),
            account_id: AccountId(row.get("account_id")),
        })
        .fetch_all(&self.connection)
        .await
        {
            Ok(questions) => Ok(questions),
            Err(error) => Err(db_err(error)),
        }
    }

    pub async fn get_question(&self, question_id: i32) -> Result<Question, Error> {
        match sqlx::query("SELECT * from questions WHERE id = $1")
            .bind(question_id)
            .map(|row: PgRow| Question {
                id: QuestionId(row.get("id")),
                content: row.get("content"),
                account_id: AccountId(row.get("account_id")),
            })
            .fetch_optional(&self.connection)
            .await
        {
            Ok(Some(question)) => Ok(question),
            Ok(None) => Err(Error::NotFound("questions")),
            Err(error) => Err(db_err(error)),
        }
    }

    pub async fn add_question(
        &self,
        new_question: NewQuestion,
        account_id: AccountId,
    ) -> Result<Question, Error> {
        match sqlx::query(
            "INSERT INTO questions (content, account_id)
            VALUES ($1, $2)
            RETURNING id, content, account_id",
        )
        .bind(new_question.content)
        .bind(account_id.0)
        .map(|row: PgRow| Question {
            id: QuestionId(row.get("id")),
            content: row.get("content"),
            account_id: AccountId(row.get("account_id")),
        })
        .fetch_one(&self.connection)
        .await
        {
            Ok(question) => Ok(question),
            Err(error) => Err(db_err(error)),
        }
    }

    pub async fn update_question(
        &self,
        new_question: NewQuestion,
        question_id: i32,
        account_id: AccountId,
    ) -> Result<Question, Error> {
        match sqlx::query(
            "UPDATE questions
            SET content = $1
            WHERE id = $2 AND account_id = $3
            RETURNING id, content, account_id",
        )
        .bind(new_question.content)
        .bind(question_id)
        .bind(account_id.0)
        .map(|row: PgRow| Question {
            id: QuestionId(row.get("id")),
            content: row.get("content"),
            account_id: AccountId(row.get("account_id")),
        })
        .fetch_one(&self.connection)
        .await
        {
            Ok(question) => Ok(question),
            Err(error) => Err(db_err(error)),
        }
    }

    pub async fn delete_question(
        &self,
        question_id: i32,
        account_id: AccountId,
    ) -> Result<bool, Error> {
        // answers and their votes go with the question via ON DELETE CASCADE
        match sqlx::query("DELETE FROM questions WHERE id = $1 AND account_id = $2")
            .bind(question_id)
            .bind(account_id.0)
            .execute(&self.connection)
            .await
        {
            Ok(result) => {
                if result.rows_affected() == 0 {
                    Err(Error::NotFound("questions"))
                } else {
                    Ok(true)
                }
            }
            Err(error) => Err(db_err(error)),
        }
    }

    pub async fn get_answers(
        &self,
        question_id: i32,
        limit: Option<u32>,
        offset: u32,
    ) -> Result<Vec<Answer>, Error> {
        match sqlx::query(
            "SELECT * from answers WHERE question_id = $1 ORDER BY id LIMIT $2 OFFSET $3",
        )
        .bind(question_id)
        .bind(limit)
        .bind(offset)
        .map(|row: PgRow| Answer {
            id: AnswerId(row.get("id")),
            content: row.get("content"),
            question_id: QuestionId(row.get("question_id")),
            account_id: AccountId(row.get("account_id")),
            upvotes: row.get("upvotes"),
        })
        .fetch_all(&self.connection)
        .await
        {
            Ok(answers) => Ok(answers),
            Err(error) => Err(db_err(error)),
        }
    }

    pub async fn add_answer(
        &self,
        new_answer: NewAnswer,
        account_id: AccountId,
    ) -> Result<Answer, Error> {
        // answers attach to existing questions only; an absent parent is a
        // 404, not a constraint violation
        let question = sqlx::query("SELECT id FROM questions WHERE id = $1")
            .bind(new_answer.question_id.0)
            .fetch_optional(&self.connection)
            .await
            .map_err(db_err)?;

        if question.is_none() {
            return Err(Error::NotFound("questions"));
        }

        match sqlx::query(
            "INSERT INTO answers (content, question_id, account_id)
            VALUES ($1, $2, $3)
            RETURNING id, content, question_id, account_id, upvotes",
        )
        .bind(new_answer.content)
        .bind(new_answer.question_id.0)
        .bind(account_id.0)
        .map(|row: PgRow| Answer {
            id: AnswerId(row.get("id")),
            content: row.get("content"),
            question_id: QuestionId(row.get("question_id")),
            account_id: AccountId(row.get("account_id")),
            upvotes: row.get("upvotes"),
        })
        .fetch_one(&self.connection)
        .await
        {
            Ok(answer) => Ok(answer),
            Err(error) => Err(db_err(error)),
        }
    }

    pub async fn update_answer(
        &self,
        content: String,
        answer_id: i32,
        account_id: AccountId,
    ) -> Result<Answer, Error> {
        match sqlx::query(
            "UPDATE answers
            SET content = $1
            WHERE id = $2 AND account_id = $3
            RETURNING id, content, question_id, account_id, upvotes",
        )
        .bind(content)
        .bind(answer_id)
        .bind(account_id.0)
        .map(|row: PgRow| Answer {
            id: AnswerId(row.get("id")),
            content: row.get("content"),
            question_id: QuestionId(row.get("question_id")),
            account_id: AccountId(row.get("account_id")),
            upvotes: row.get("upvotes"),
        })
        .fetch_one(&self.connection)
        .await
        {
            Ok(answer) => Ok(answer),
            Err(error) => Err(db_err(error)),
        }
    }

    pub async fn delete_answer(&self, answer_id: i32, account_id: AccountId) -> Result<bool, Error> {
        match sqlx::query("DELETE FROM answers WHERE id = $1 AND account_id = $2")
            .bind(answer_id)
            .bind(account_id.0)
            .execute(&self.connection)
            .await
        {
            Ok(result) => {
                if result.rows_affected() == 0 {
                    Err(Error::NotFound("answers"))
                } else {
                    Ok(true)
                }
            }
            Err(error) => Err(db_err(error)),
        }
    }

    /// Flips the caller's vote on an answer. Vote row and denormalized
    /// counter are mutated in the same transaction, so `answers.upvotes`
    /// always equals the number of `answer_votes` rows for the answer.
    pub async fn toggle_vote(
        &self,
        answer_id: i32,
        account_id: AccountId,
    ) -> Result<VoteReceipt, Error> {
        let mut tx = self.connection.begin().await.map_err(db_err)?;

        let existing =
            sqlx::query("SELECT answer_id FROM answer_votes WHERE answer_id = $1 AND account_id = $2")
                .bind(answer_id)
                .bind(account_id.0)
                .fetch_optional(&mut tx)
                .await
                .map_err(db_err)?;

        let receipt = if existing.is_some() {
            sqlx::query("DELETE FROM answer_votes WHERE answer_id = $1 AND account_id = $2")
                .bind(answer_id)
                .bind(account_id.0)
                .execute(&mut tx)
                .await
                .map_err(db_err)?;

            let row = sqlx::query("UPDATE answers SET upvotes = upvotes - 1 WHERE id = $1 RETURNING upvotes")
                .bind(answer_id)
                .fetch_one(&mut tx)
                .await
                .map_err(db_err)?;

            VoteReceipt {
                applied: false,
                upvotes: row.get("upvotes"),
            }
        } else {
            // counter first: a missing row here means the answer is gone
            let row = sqlx::query("UPDATE answers SET upvotes = upvotes + 1 WHERE id = $1 RETURNING upvotes")
                .bind(answer_id)
                .fetch_optional(&mut tx)
                .await
                .map_err(db_err)?;

            let row = match row {
                Some(row) => row,
                None => return Err(Error::NotFound("answers")),
            };

            sqlx::query("INSERT INTO answer_votes (answer_id, account_id) VALUES ($1, $2)")
                .bind(answer_id)
                .bind(account_id.0)
                .execute(&mut tx)
                .await
                .map_err(db_err)?;

            VoteReceipt {
                applied: true,
                upvotes: row.get("upvotes"),
            }
        };

        tx.commit().await.map_err(db_err)?;

        Ok(receipt)
    }

    pub async fn add_account(&self, account: Account) -> Result<bool, Error> {
        match sqlx::query("INSERT INTO accounts (username, password) VALUES ($1, $2)")
            .bind(account.username)
            .bind(account.password)
            .execute(&self.connection)
            .await
        {
            Ok(_) => Ok(true),
            Err(error) => {
                if let Some(err) = error.as_database_error() {
                    tracing::event!(
                        tracing::Level::ERROR,
                        code = err.code().as_deref().unwrap_or("unknown"),
                        db_message = err.message(),
                    );
                } else {
                    tracing::event!(tracing::Level::ERROR, "{:?}", error);
                }
                Err(Error::DatabaseQueryError(error))
            }
        }
    }

    pub async fn get_account(&self, username: String) -> Result<Account, Error> {
        match sqlx::query("SELECT * from accounts WHERE username = $1")
            .bind(username)
            .map(|row: PgRow| Account {
                id: Some(AccountId(row.get("id"))),
                username: row.get("username"),
                password: row.get("password"),
            })
            .fetch_one(&self.connection)
            .await
        {
            Ok(account) => Ok(account),
            Err(error) => Err(db_err(error)),
        }
    }

    /// Owner lookup shared by every owned resource (questions, answers,
    /// bookings). `table` is always a static string from the call site.
    pub async fn resource_owner(
        &self,
        table: &'static str,
        id: i32,
    ) -> Result<AccountId, Error> {
        match sqlx::query(&format!("SELECT account_id FROM {} WHERE id = $1", table))
            .bind(id)
            .fetch_optional(&self.connection)
            .await
        {
            Ok(Some(row)) => Ok(AccountId(row.get("account_id"))),
            Ok(None) => Err(Error::NotFound(table)),
            Err(error) => Err(db_err(error)),
        }
    }

    pub async fn get_tutors(
        &self,
        limit: Option<u32>,
        offset: u32,
        search: Option<String>,
    ) -> Result<Vec<Tutor>, Error> {
        let query = match search {
            Some(search) => sqlx::query(
                "SELECT t.id, t.name, t.phone, t.subject,
                    COALESCE(array_agg(s.label ORDER BY s.id)
                        FILTER (WHERE s.booked = false), '{}') AS available_slots
                FROM tutors t
                LEFT JOIN tutor_slots s ON s.tutor_id = t.id
                WHERE t.name ILIKE '%' || $3 || '%' OR t.subject ILIKE '%' || $3 || '%'
                GROUP BY t.id
                ORDER BY t.id LIMIT $1 OFFSET $2",
            )
            .bind(limit)
            .bind(offset)
            .bind(search),
            None => sqlx::query(
                "SELECT t.id, t.name, t.phone, t.subject,
                    COALESCE(array_agg(s.label ORDER BY s.id)
                        FILTER (WHERE s.booked = false), '{}') AS available_slots
                FROM tutors t
                LEFT JOIN tutor_slots s ON s.tutor_id = t.id
                GROUP BY t.id
                ORDER BY t.id LIMIT $1 OFFSET $2",
            )
            .bind(limit)
            .bind(offset),
        };

        match query
            .map(|row: PgRow| Tutor {
                id: TutorId(row.get("id")),
                name: row.get("name"),
                phone: row.get("phone"),
                subject: row.get("subject"),
                available_slots: row.get("available_slots"),
            })
            .fetch_all(&self.connection)
            .await
        {
            Ok(tutors) => Ok(tutors),
            Err(error) => Err(db_err(error)),
        }
    }

    pub async fn get_tutor(&self, tutor_id: i32) -> Result<Tutor, Error> {
        match sqlx::query(
            "SELECT t.id, t.name, t.phone, t.subject,
                COALESCE(array_agg(s.label ORDER BY s.id)
                    FILTER (WHERE s.booked = false), '{}') AS available_slots
            FROM tutors t
            LEFT JOIN tutor_slots s ON s.tutor_id = t.id
            WHERE t.id = $1
            GROUP BY t.id",
        )
        .bind(tutor_id)
        .map(|row: PgRow| Tutor {
            id: TutorId(row.get("id")),
            name: row.get("name"),
            phone: row.get("phone"),
            subject: row.get("subject"),
            available_slots: row.get("available_slots"),
        })
        .fetch_optional(&self.connection)
        .await
        {
            Ok(Some(tutor)) => Ok(tutor),
            Ok(None) => Err(Error::NotFound("tutors")),
            Err(error) => Err(db_err(error)),
        }
    }

    pub async fn add_tutor(&self, new_tutor: NewTutor) -> Result<Tutor, Error> {
        let labels = parse_slot_labels(&new_tutor.available_slots);

        let mut tx = self.connection.begin().await.map_err(db_err)?;

        let row = sqlx::query(
            "INSERT INTO tutors (name, phone, subject)
            VALUES ($1, $2, $3)
            RETURNING id",
        )
        .bind(&new_tutor.name)
        .bind(&new_tutor.phone)
        .bind(&new_tutor.subject)
        .fetch_one(&mut tx)
        .await
        .map_err(db_err)?;

        let tutor_id: i32 = row.get("id");

        for label in &labels {
            sqlx::query("INSERT INTO tutor_slots (tutor_id, label) VALUES ($1, $2)")
                .bind(tutor_id)
                .bind(label)
                .execute(&mut tx)
                .await
                .map_err(db_err)?;
        }

        tx.commit().await.map_err(db_err)?;

        Ok(Tutor {
            id: TutorId(tutor_id),
            name: new_tutor.name,
            phone: new_tutor.phone,
            subject: new_tutor.subject,
            available_slots: labels,
        })
    }

    /// Replaces the display fields and the unbooked slot rows. Booked
    /// slots are held by bookings and survive the edit.
    pub async fn update_tutor(&self, new_tutor: NewTutor, tutor_id: i32) -> Result<Tutor, Error> {
        let labels = parse_slot_labels(&new_tutor.available_slots);

        let mut tx = self.connection.begin().await.map_err(db_err)?;

        let updated = sqlx::query(
            "UPDATE tutors SET name = $1, phone = $2, subject = $3 WHERE id = $4 RETURNING id",
        )
        .bind(&new_tutor.name)
        .bind(&new_tutor.phone)
        .bind(&new_tutor.subject)
        .bind(tutor_id)
        .fetch_optional(&mut tx)
        .await
        .map_err(db_err)?;

        if updated.is_none() {
            return Err(Error::NotFound("tutors"));
        }

        sqlx::query("DELETE FROM tutor_slots WHERE tutor_id = $1 AND booked = false")
            .bind(tutor_id)
            .execute(&mut tx)
            .await
            .map_err(db_err)?;

        for label in &labels {
            sqlx::query("INSERT INTO tutor_slots (tutor_id, label) VALUES ($1, $2)")
                .bind(tutor_id)
                .bind(label)
                .execute(&mut tx)
                .await
                .map_err(db_err)?;
        }

        tx.commit().await.map_err(db_err)?;

        Ok(Tutor {
            id: TutorId(tutor_id),
            name: new_tutor.name,
            phone: new_tutor.phone,
            subject: new_tutor.subject,
            available_slots: labels,
        })
    }

    pub async fn delete_tutor(&self, tutor_id: i32) -> Result<bool, Error> {
        match sqlx::query("DELETE FROM tutors WHERE id = $1")
            .bind(tutor_id)
            .execute(&self.connection)
            .await
        {
            Ok(result) => {
                if result.rows_affected() == 0 {
                    Err(Error::NotFound("tutors"))
                } else {
                    Ok(true)
                }
            }
            Err(error) => Err(db_err(error)),
        }
    }

    /// Claims one free slot matching the requested label and records the
    /// booking, all in one transaction. The claimed row is locked with
    /// FOR UPDATE so concurrent requests for the same slot serialize;
    /// the loser sees no free row and gets `SlotUnavailable`.
    pub async fn book_slot(
        &self,
        tutor_id: i32,
        account_id: AccountId,
        slot: &str,
    ) -> Result<Booking, Error> {
        let mut tx = self.connection.begin().await.map_err(db_err)?;

        let tutor = sqlx::query("SELECT id FROM tutors WHERE id = $1")
            .bind(tutor_id)
            .fetch_optional(&mut tx)
            .await
            .map_err(db_err)?;

        if tutor.is_none() {
            return Err(Error::NotFound("tutors"));
        }

        // first matching occurrence by row id; duplicates are consumed
        // one at a time
        let claimed = sqlx::query(
            "UPDATE tutor_slots SET booked = true
            WHERE id = (
                SELECT id FROM tutor_slots
                WHERE tutor_id = $1 AND label = $2 AND booked = false
                ORDER BY id
                LIMIT 1
                FOR UPDATE
            )
            RETURNING id, label",
        )
        .bind(tutor_id)
        .bind(slot)
        .fetch_optional(&mut tx)
        .await
        .map_err(db_err)?;

        let claimed = match claimed {
            Some(row) => row,
            None => return Err(Error::SlotUnavailable),
        };

        let slot_id: i32 = claimed.get("id");

        let booking = sqlx::query(
            "INSERT INTO bookings (tutor_id, slot_id, slot, account_id)
            VALUES ($1, $2, $3, $4)
            RETURNING id, tutor_id, account_id, slot",
        )
        .bind(tutor_id)
        .bind(slot_id)
        .bind(claimed.get::<String, _>("label"))
        .bind(account_id.0)
        .map(|row: PgRow| Booking {
            id: BookingId(row.get("id")),
            tutor_id: TutorId(row.get("tutor_id")),
            account_id: AccountId(row.get("account_id")),
            slot: row.get("slot"),
        })
        .fetch_one(&mut tx)
        .await
        .map_err(db_err)?;

        tx.commit().await.map_err(db_err)?;

        Ok(booking)
    }

    /// Deletes the booking and returns its slot to availability in one
    /// transaction, so the label can never get lost.
    pub async fn cancel_booking(&self, booking_id: i32) -> Result<bool, Error> {
        let mut tx = self.connection.begin().await.map_err(db_err)?;

        let deleted = sqlx::query("DELETE FROM bookings WHERE id = $1 RETURNING slot_id")
            .bind(booking_id)
            .fetch_optional(&mut tx)
            .await
            .map_err(db_err)?;

        let deleted = match deleted {
            Some(row) => row,
            None => return Err(Error::NotFound("bookings")),
        };

        sqlx::query("UPDATE tutor_slots SET booked = false WHERE id = $1")
            .bind(deleted.get::<i32, _>("slot_id"))
            .execute(&mut tx)
            .await
            .map_err(db_err)?;

        tx.commit().await.map_err(db_err)?;

        Ok(true)
    }

    pub async fn get_bookings(&self, account_id: AccountId) -> Result<Vec<Booking>, Error> {
        match sqlx::query(
            "SELECT id, tutor_id, account_id, slot FROM bookings WHERE account_id = $1 ORDER BY id",
        )
        .bind(account_id.0)
        .map(|row: PgRow| Booking {
            id: BookingId(row.get("id")),
            tutor_id: TutorId(row.get("tutor_id")),
            account_id: AccountId(row.get("account_id")),
            slot: row.get("slot"),
        })
        .fetch_all(&self.connection)
        .await
        {
            Ok(bookings) => Ok(bookings),
            Err(error) => Err(db_err(error)),
        }
    }
}
