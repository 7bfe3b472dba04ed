use serde::{Deserialize, Serialize};

use crate::types::account::AccountId;
use crate::types::question::QuestionId;

#[derive(Serialize, Debug, Deserialize, Clone)]
pub struct Answer {
    pub id: AnswerId,
    pub content: String,
    pub question_id: QuestionId,
    pub account_id: AccountId,
    pub upvotes: i32,
}

#[derive(Serialize, Debug, Clone, Eq, Hash, Deserialize, PartialEq)]
pub struct AnswerId(pub i32);

#[derive(Deserialize, Serialize, Debug, Clone)]
pub struct NewAnswer {
    pub content: String,
    pub question_id: QuestionId,
}

/// Result of a vote toggle: whether a vote is now applied for the caller,
/// and the answer's counter after the mutation.
#[derive(Serialize, Debug, Clone)]
pub struct VoteReceipt {
    pub applied: bool,
    pub upvotes: i32,
}
