// src/dtos/contact.rs
use serde::{Deserialize, Serialize};

use crate::models::contact::Contact;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateContactRequest {
    pub name: String,
    pub phone: String,
    pub message: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateContactStatusRequest {
    pub status: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ContactResponse {
    pub id: i64,
    pub name: String,
    pub phone: String,
    pub message: String,
    pub status: String,
    pub created_at: Option<String>,
}

impl From<Contact> for ContactResponse {
    fn from(c: Contact) -> Self {
        Self {
            id: c.id,
            name: c.name,
            phone: c.phone,
            message: c.message,
            status: c.status,
            created_at: c.created_at.map(|dt| dt.to_rfc3339()),
        }
    }
}
