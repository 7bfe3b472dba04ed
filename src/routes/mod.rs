use crate::types::account::{AccountId, Session};

pub mod answer;
pub mod authentication;
pub mod booking;
pub mod question;
pub mod tutor;

/// Ownership gate shared by questions, answers, and bookings: the
/// session account must be the resource owner.
pub fn authorize(owner: &AccountId, session: &Session) -> Result<(), handle_errors::Error> {
    if owner == &session.account_id {
        Ok(())
    } else {
        Err(handle_errors::Error::Unauthorized)
    }
}

#[cfg(test)]
mod authorize_tests {
    use super::*;
    use chrono::prelude::*;

    fn session_for(account_id: i32) -> Session {
        Session {
            exp: Utc::now() + chrono::Duration::days(1),
            account_id: AccountId(account_id),
            nbf: Utc::now(),
        }
    }

    #[test]
    fn owner_passes() {
        assert!(authorize(&AccountId(3), &session_for(3)).is_ok());
    }

    #[test]
    fn non_owner_is_rejected() {
        let result = authorize(&AccountId(3), &session_for(4));
        assert!(matches!(
            result,
            Err(handle_errors::Error::Unauthorized)
        ));
    }
}
