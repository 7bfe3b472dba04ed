use std::collections::HashMap;
use warp::http::StatusCode;

use crate::routes::authorize;
use crate::store::Store;
use crate::types::account::Session;

/// Claims one of the tutor's free slots for the session account. The
/// form carries the requested slot label; it is trimmed before matching.
pub async fn book_slot(
    tutor_id: i32,
    session: Session,
    store: Store,
    params: HashMap<String, String>,
) -> Result<impl warp::Reply, warp::Rejection> {
    let slot = match params.get("slot") {
        Some(slot) => slot.trim().to_string(),
        None => return Err(warp::reject::custom(handle_errors::Error::MissingParameters)),
    };

    if slot.is_empty() {
        return Err(warp::reject::custom(handle_errors::Error::MissingParameters));
    }

    match store.book_slot(tutor_id, session.account_id, &slot).await {
        Ok(booking) => Ok(warp::reply::json(&booking)),
        Err(e) => Err(warp::reject::custom(e)),
    }
}

/// Only the student who created the booking may cancel it.
pub async fn cancel_booking(
    id: i32,
    session: Session,
    store: Store,
) -> Result<impl warp::Reply, warp::Rejection> {
    let owner = store.resource_owner("bookings", id).await?;
    authorize(&owner, &session)?;

    match store.cancel_booking(id).await {
        Ok(_) => Ok(warp::reply::with_status(
            format!("Booking {} cancelled", id),
            StatusCode::OK,
        )),
        Err(e) => Err(warp::reject::custom(e)),
    }
}

pub async fn get_bookings(
    session: Session,
    store: Store,
) -> Result<impl warp::Reply, warp::Rejection> {
    match store.get_bookings(session.account_id).await {
        Ok(bookings) => Ok(warp::reply::json(&bookings)),
        Err(e) => Err(warp::reject::custom(e)),
    }
}
