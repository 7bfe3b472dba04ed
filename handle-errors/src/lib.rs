use argon2::Error as ArgonError;
use warp::{
    filters::{body::BodyDeserializeError, cors::CorsForbidden},
    http::StatusCode,
    reject::Reject,
    Rejection, Reply,
};

use tracing::{event, instrument, Level};

#[derive(Debug)]
pub enum Error {
    ParseError(std::num::ParseIntError),
    MissingParameters,
    WrongPassword,
    CannotDecryptToken,
    Unauthenticated,
    Unauthorized,
    NotFound(&'static str),
    SlotUnavailable,
    ArgonLibraryError(ArgonError),
    DatabaseQueryError(sqlx::Error),
}

impl std::fmt::Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        match &*self {
            Error::ParseError(err) => {
                write!(f, "Cannot parse parameter: {}", err)
            }
            Error::MissingParameters => {
                write!(f, "Missing parameters")
            }
            Error::WrongPassword => {
                write!(f, "Wrong password")
            }
            Error::CannotDecryptToken => {
                write!(f, "Cannot decrypt token")
            }
            Error::Unauthenticated => {
                write!(f, "No valid session")
            }
            Error::Unauthorized => {
                write!(f, "No permission to change the underlying resource")
            }
            Error::NotFound(resource) => {
                write!(f, "Resource not found: {}", resource)
            }
            Error::SlotUnavailable => {
                write!(f, "Slot not available")
            }
            Error::ArgonLibraryError(_) => {
                write!(f, "Cannot verify password")
            }
            Error::DatabaseQueryError(_) => {
                write!(f, "Cannot update, invalid data.")
            }
        }
    }
}

impl Reject for Error {}

// Postgres unique_violation
const DUPLICATE_KEY: &str = "23505";

#[instrument]
pub async fn return_error(r: Rejection) -> Result<impl Reply, Rejection> {
    if let Some(crate::Error::DatabaseQueryError(e)) = r.find() {
        event!(Level::ERROR, "Database query error");
        match e {
            sqlx::Error::Database(err) => {
                if err.code().as_deref() == Some(DUPLICATE_KEY) {
                    Ok(warp::reply::with_status(
                        "Account already exists".to_string(),
                        StatusCode::UNPROCESSABLE_ENTITY,
                    ))
                } else {
                    Ok(warp::reply::with_status(
                        "Cannot update data".to_string(),
                        StatusCode::UNPROCESSABLE_ENTITY,
                    ))
                }
            }
            _ => Ok(warp::reply::with_status(
                "Cannot update data".to_string(),
                StatusCode::UNPROCESSABLE_ENTITY,
            )),
        }
    } else if let Some(crate::Error::NotFound(resource)) = r.find() {
        event!(Level::WARN, "Resource not found: {}", resource);
        Ok(warp::reply::with_status(
            format!("Resource not found: {}", resource),
            StatusCode::NOT_FOUND,
        ))
    } else if let Some(crate::Error::Unauthenticated) = r.find() {
        event!(Level::ERROR, "No valid session attached to request");
        Ok(warp::reply::with_status(
            "No valid session".to_string(),
            StatusCode::UNAUTHORIZED,
        ))
    } else if let Some(crate::Error::CannotDecryptToken) = r.find() {
        event!(Level::ERROR, "Cannot decrypt session token");
        Ok(warp::reply::with_status(
            "No valid session".to_string(),
            StatusCode::UNAUTHORIZED,
        ))
    } else if let Some(crate::Error::Unauthorized) = r.find() {
        event!(Level::ERROR, "Not matching account id");
        Ok(warp::reply::with_status(
            "No permission to change underlying resource".to_string(),
            StatusCode::FORBIDDEN,
        ))
    } else if let Some(crate::Error::SlotUnavailable) = r.find() {
        event!(Level::WARN, "Requested slot is not available");
        Ok(warp::reply::with_status(
            "Slot not available".to_string(),
            StatusCode::UNPROCESSABLE_ENTITY,
        ))
    } else if let Some(crate::Error::WrongPassword) = r.find() {
        event!(Level::ERROR, "Entered wrong password");
        Ok(warp::reply::with_status(
            "Wrong username/password combination".to_string(),
            StatusCode::UNAUTHORIZED,
        ))
    } else if let Some(error) = r.find::<warp::reject::MissingHeader>() {
        // only the Authorization header is extracted from requests
        event!(Level::ERROR, "Missing header: {}", error);
        Ok(warp::reply::with_status(
            "No valid session".to_string(),
            StatusCode::UNAUTHORIZED,
        ))
    } else if let Some(error) = r.find::<CorsForbidden>() {
        event!(Level::ERROR, "CORS forbidden error: {}", error);
        Ok(warp::reply::with_status(
            error.to_string(),
            StatusCode::FORBIDDEN,
        ))
    } else if let Some(error) = r.find::<BodyDeserializeError>() {
        event!(Level::ERROR, "Cannot deserialize request body: {}", error);
        Ok(warp::reply::with_status(
            error.to_string(),
            StatusCode::UNPROCESSABLE_ENTITY,
        ))
    } else if let Some(error) = r.find::<Error>() {
        event!(Level::ERROR, "{}", error);
        Ok(warp::reply::with_status(
            error.to_string(),
            StatusCode::UNPROCESSABLE_ENTITY,
        ))
    } else {
        event!(Level::WARN, "Requested route was not found");
        Ok(warp::reply::with_status(
            "Route not found".to_string(),
            StatusCode::NOT_FOUND,
        ))
    }
}
