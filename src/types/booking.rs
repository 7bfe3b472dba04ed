use serde::{Deserialize, Serialize};

use crate::types::account::AccountId;
use crate::types::tutor::TutorId;

#[derive(Serialize, Debug, Deserialize, Clone)]
pub struct Booking {
    pub id: BookingId,
    pub tutor_id: TutorId,
    pub account_id: AccountId,
    pub slot: String,
}

#[derive(Serialize, Debug, Clone, Eq, Hash, Deserialize, PartialEq)]
pub struct BookingId(pub i32);
