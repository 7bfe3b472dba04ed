use std::collections::HashMap;
use tracing::{event, instrument, Level};
use warp::http::StatusCode;

use crate::store::Store;
use crate::types::account::Session;
use crate::types::pagination::{extract_pagination, Pagination};
use crate::types::tutor::NewTutor;

#[instrument]
pub async fn get_tutors(
    mut params: HashMap<String, String>,
    store: Store,
) -> Result<impl warp::Reply, warp::Rejection> {
    event!(target: "student_hub", Level::INFO, "querying tutors");
    let search = params.remove("search");
    let mut pagination = Pagination::default();

    if !params.is_empty() {
        pagination = extract_pagination(params)?;
    }

    match store
        .get_tutors(pagination.limit, pagination.offset, search)
        .await
    {
        Ok(res) => Ok(warp::reply::json(&res)),
        Err(e) => Err(warp::reject::custom(e)),
    }
}

pub async fn get_tutor(id: i32, store: Store) -> Result<impl warp::Reply, warp::Rejection> {
    match store.get_tutor(id).await {
        Ok(tutor) => Ok(warp::reply::json(&tutor)),
        Err(e) => Err(warp::reject::custom(e)),
    }
}

// Tutors carry no owner; any authenticated account may manage them.
pub async fn add_tutor(
    _session: Session,
    store: Store,
    new_tutor: NewTutor,
) -> Result<impl warp::Reply, warp::Rejection> {
    match store.add_tutor(new_tutor).await {
        Ok(tutor) => Ok(warp::reply::json(&tutor)),
        Err(e) => Err(warp::reject::custom(e)),
    }
}

pub async fn update_tutor(
    id: i32,
    _session: Session,
    store: Store,
    new_tutor: NewTutor,
) -> Result<impl warp::Reply, warp::Rejection> {
    match store.update_tutor(new_tutor, id).await {
        Ok(tutor) => Ok(warp::reply::json(&tutor)),
        Err(e) => Err(warp::reject::custom(e)),
    }
}

pub async fn delete_tutor(
    id: i32,
    _session: Session,
    store: Store,
) -> Result<impl warp::Reply, warp::Rejection> {
    match store.delete_tutor(id).await {
        Ok(_) => Ok(warp::reply::with_status(
            format!("Tutor {} deleted", id),
            StatusCode::OK,
        )),
        Err(e) => Err(warp::reject::custom(e)),
    }
}
