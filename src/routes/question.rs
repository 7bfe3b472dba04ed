use serde::Serialize;
use std::collections::HashMap;
use tracing::{event, instrument, Level};
use warp::http::StatusCode;

use crate::routes::authorize;
use crate::store::Store;
use crate::types::account::Session;
use crate::types::answer::Answer;
use crate::types::pagination::{extract_pagination, Pagination};
use crate::types::question::{NewQuestion, Question};

#[derive(Serialize, Debug, Clone)]
pub struct QuestionDetail {
    pub question: Question,
    pub answers: Vec<Answer>,
}

#[instrument]
pub async fn get_questions(
    params: HashMap<String, String>,
    store: Store,
) -> Result<impl warp::Reply, warp::Rejection> {
    event!(target: "student_hub", Level::INFO, "querying questions");
    let mut pagination = Pagination::default();

    if !params.is_empty() {
        event!(Level::INFO, pagination = true);
        pagination = extract_pagination(params)?;
    }

    match store
        .get_questions(pagination.limit, pagination.offset)
        .await
    {
        Ok(res) => Ok(warp::reply::json(&res)),
        Err(e) => Err(warp::reject::custom(e)),
    }
}

pub async fn search_questions(
    params: HashMap<String, String>,
    store: Store,
) -> Result<impl warp::Reply, warp::Rejection> {
    let query = match params.get("query") {
        Some(query) => query.clone(),
        None => return Err(warp::reject::custom(handle_errors::Error::MissingParameters)),
    };

    match store.search_questions(query).await {
        Ok(res) => Ok(warp::reply::json(&res)),
        Err(e) => Err(warp::reject::custom(e)),
    }
}

/// One question together with a page of its answers.
pub async fn get_question(
    id: i32,
    params: HashMap<String, String>,
    store: Store,
) -> Result<impl warp::Reply, warp::Rejection> {
    let mut pagination = Pagination::default();

    if !params.is_empty() {
        pagination = extract_pagination(params)?;
    }

    let question = match store.get_question(id).await {
        Ok(question) => question,
        Err(e) => return Err(warp::reject::custom(e)),
    };

    match store.get_answers(id, pagination.limit, pagination.offset).await {
        Ok(answers) => Ok(warp::reply::json(&QuestionDetail { question, answers })),
        Err(e) => Err(warp::reject::custom(e)),
    }
}

pub async fn add_question(
    session: Session,
    store: Store,
    new_question: NewQuestion,
) -> Result<impl warp::Reply, warp::Rejection> {
    let account_id = session.account_id;

    match store.add_question(new_question, account_id).await {
        Ok(question) => Ok(warp::reply::json(&question)),
        Err(e) => Err(warp::reject::custom(e)),
    }
}

pub async fn update_question(
    id: i32,
    session: Session,
    store: Store,
    new_question: NewQuestion,
) -> Result<impl warp::Reply, warp::Rejection> {
    let owner = store.resource_owner("questions", id).await?;
    authorize(&owner, &session)?;

    match store
        .update_question(new_question, id, session.account_id)
        .await
    {
        Ok(res) => Ok(warp::reply::json(&res)),
        Err(e) => Err(warp::reject::custom(e)),
    }
}

pub async fn delete_question(
    id: i32,
    session: Session,
    store: Store,
) -> Result<impl warp::Reply, warp::Rejection> {
    let owner = store.resource_owner("questions", id).await?;
    authorize(&owner, &session)?;

    match store.delete_question(id, session.account_id).await {
        Ok(_) => Ok(warp::reply::with_status(
            format!("Question {} deleted", id),
            StatusCode::OK,
        )),
        Err(e) => Err(warp::reject::custom(e)),
    }
}
