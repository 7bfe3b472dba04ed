use std::collections::HashMap;
use warp::http::StatusCode;

use crate::routes::authorize;
use crate::store::Store;
use crate::types::account::Session;
use crate::types::answer::NewAnswer;

pub async fn add_answer(
    session: Session,
    store: Store,
    new_answer: NewAnswer,
) -> Result<impl warp::Reply, warp::Rejection> {
    match store.add_answer(new_answer, session.account_id).await {
        Ok(answer) => Ok(warp::reply::json(&answer)),
        Err(e) => Err(warp::reject::custom(e)),
    }
}

pub async fn update_answer(
    id: i32,
    session: Session,
    store: Store,
    params: HashMap<String, String>,
) -> Result<impl warp::Reply, warp::Rejection> {
    let content = match params.get("content") {
        Some(content) => content.clone(),
        None => return Err(warp::reject::custom(handle_errors::Error::MissingParameters)),
    };

    let owner = store.resource_owner("answers", id).await?;
    authorize(&owner, &session)?;

    match store.update_answer(content, id, session.account_id).await {
        Ok(answer) => Ok(warp::reply::json(&answer)),
        Err(e) => Err(warp::reject::custom(e)),
    }
}

pub async fn delete_answer(
    id: i32,
    session: Session,
    store: Store,
) -> Result<impl warp::Reply, warp::Rejection> {
    let owner = store.resource_owner("answers", id).await?;
    authorize(&owner, &session)?;

    match store.delete_answer(id, session.account_id).await {
        Ok(_) => Ok(warp::reply::with_status(
            format!("Answer {} deleted", id),
            StatusCode::OK,
        )),
        Err(e) => Err(warp::reject::custom(e)),
    }
}

/// Toggles the caller's upvote. Voting twice removes the vote again; the
/// reply carries the direction taken and the fresh counter.
pub async fn toggle_vote(
    id: i32,
    session: Session,
    store: Store,
) -> Result<impl warp::Reply, warp::Rejection> {
    match store.toggle_vote(id, session.account_id).await {
        Ok(receipt) => Ok(warp::reply::json(&receipt)),
        Err(e) => Err(warp::reject::custom(e)),
    }
}
