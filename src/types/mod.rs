pub mod account;
pub mod answer;
pub mod booking;
pub mod pagination;
pub mod question;
pub mod tutor;
