use argon2::{self, Config};
use chrono::prelude::*;

use rand::Rng;
use std::{env, future};
use warp::http::StatusCode;
use warp::Filter;

use crate::store::Store;
use crate::types::account::{Account, AccountId, Session};

pub fn verify_token(token: String) -> Result<Session, handle_errors::Error> {
    let key = env::var("PASETO_KEY").map_err(|_| handle_errors::Error::CannotDecryptToken)?;
    let token = paseto::tokens::validate_local_token(
        &token,
        None,
        key.as_bytes(),
        &paseto::tokens::TimeBackend::Chrono,
    )
    .map_err(|_| handle_errors::Error::CannotDecryptToken)?;

    serde_json::from_value::<Session>(token).map_err(|_| handle_errors::Error::CannotDecryptToken)
}

pub async fn register(store: Store, account: Account) -> Result<impl warp::Reply, warp::Rejection> {
    let hashed_password = hash_password(account.password.as_bytes());

    let account = Account {
        id: account.id,
        username: account.username,
        password: hashed_password,
    };

    match store.add_account(account).await {
        Ok(_) => Ok(warp::reply::with_status("Account added", StatusCode::OK)),
        Err(e) => Err(warp::reject::custom(e)),
    }
}

pub fn hash_password(password: &[u8]) -> String {
    let salt = rand::thread_rng().gen::<[u8; 32]>();
    let config = Config::default();
    argon2::hash_encoded(password, &salt, &config).unwrap()
}

pub async fn login(store: Store, login: Account) -> Result<impl warp::Reply, warp::Rejection> {
    match store.get_account(login.username).await {
        Ok(account) => match verify_password(&account.password, login.password.as_bytes()) {
            Ok(verified) => {
                if verified {
                    Ok(warp::reply::json(&issue_token(
                        account.id.expect("id not found"),
                    )))
                } else {
                    Err(warp::reject::custom(handle_errors::Error::WrongPassword))
                }
            }
            Err(e) => Err(warp::reject::custom(
                handle_errors::Error::ArgonLibraryError(e),
            )),
        },
        Err(e) => Err(warp::reject::custom(e)),
    }
}

fn verify_password(hash: &str, password: &[u8]) -> Result<bool, argon2::Error> {
    argon2::verify_encoded(hash, password)
}

fn issue_token(account_id: AccountId) -> String {
    let key = env::var("PASETO_KEY").expect("PASETO key not set");
    let current_date_time = Utc::now();
    let dt = current_date_time + chrono::Duration::days(1);

    paseto::tokens::PasetoBuilder::new()
        .set_encryption_key(&Vec::from(key.as_bytes()))
        .set_expiration(&dt)
        .set_not_before(&Utc::now())
        .set_claim("account_id", serde_json::json!(account_id))
        .build()
        .expect("Failed to construct paseto token w/ builder")
}

pub fn auth() -> impl Filter<Extract = (Session,), Error = warp::Rejection> + Clone {
    warp::header::<String>("Authorization").and_then(|token: String| {
        let token = match verify_token(token) {
            Ok(t) => t,
            Err(_) => {
                return future::ready(Err(warp::reject::custom(
                    handle_errors::Error::Unauthenticated,
                )))
            }
        };

        future::ready(Ok(token))
    })
}

#[cfg(test)]
mod authentication_tests {
    use super::*;

    #[test]
    fn hashed_password_verifies() {
        let hash = hash_password("secret".as_bytes());
        assert!(verify_password(&hash, "secret".as_bytes()).unwrap());
        assert!(!verify_password(&hash, "not the secret".as_bytes()).unwrap());
    }

    #[test]
    fn issued_token_decrypts_to_session() {
        env::set_var("PASETO_KEY", "RANDOM WORDS WINTER MACINTOSH PC");
        let token = issue_token(AccountId(7));
        let session = verify_token(token).unwrap();
        assert_eq!(session.account_id, AccountId(7));
    }

    #[test]
    fn garbage_token_is_rejected() {
        env::set_var("PASETO_KEY", "RANDOM WORDS WINTER MACINTOSH PC");
        let result = verify_token("not a token".to_string());
        assert!(matches!(
            result,
            Err(handle_errors::Error::CannotDecryptToken)
        ));
    }
}
