use core::fmt;
use std::fmt::{Display, Formatter};

use bson::oid::ObjectId;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::rights::Rights;

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct User {
    #[serde(rename = "_id")]
    pub id: ObjectId,
    /// Address on the notification channel.
    pub chat_id: i64,
    pub name: UserName,
    pub rights: Rights,
    pub phone: Option<String>,
    #[serde(default = "default_is_active")]
    pub is_active: bool,
    #[serde(with = "bson::serde_helpers::chrono_datetime_as_bson_datetime")]
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub version: u64,
}

impl User {
    pub fn new(chat_id: i64, name: UserName, phone: Option<String>, rights: Rights) -> User {
        User {
            id: ObjectId::new(),
            chat_id,
            name,
            rights,
            phone: phone.map(|p| sanitize_phone(&p)),
            is_active: true,
            created_at: Utc::now(),
            version: 0,
        }
    }
}

fn default_is_active() -> bool {
    true
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct UserName {
    pub first_name: String,
    pub last_name: Option<String>,
}

impl UserName {
    pub fn new(first_name: impl Into<String>, last_name: Option<String>) -> UserName {
        UserName {
            first_name: first_name.into(),
            last_name,
        }
    }
}

impl Display for UserName {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.first_name)?;
        if let Some(last_name) = &self.last_name {
            write!(f, " {}", last_name)?;
        }
        Ok(())
    }
}

pub fn sanitize_phone(phone: &str) -> String {
    phone.chars().filter(|c| c.is_ascii_digit()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sanitize_phone() {
        assert_eq!("79161234567", sanitize_phone("+7 (916) 123-45-67"));
        assert_eq!("", sanitize_phone("call me"));
    }
}
