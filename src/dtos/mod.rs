pub mod contact;
pub mod medicine;
pub mod purchase;
pub mod report;
pub mod sale;
pub mod supplier;
pub mod user;
