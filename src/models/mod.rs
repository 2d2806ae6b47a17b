pub mod contact;
pub mod medicine;
pub mod purchase;
pub mod sale;
pub mod supplier;
pub mod user;
