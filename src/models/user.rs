use chrono::{DateTime, Utc};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::sync::LazyLock;

use super::required;
use crate::error::{InventoryError, Result};

static GOV_ID: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^\d{12}$").expect("valid regex"));
static PHONE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^\d{10}$").expect("valid regex"));
static EMAIL: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").expect("valid regex"));

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Admin,
    Incharge,
    User,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Admin => "admin",
            Role::Incharge => "incharge",
            Role::User => "user",
        }
    }
}

impl FromStr for Role {
    type Err = InventoryError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "admin" => Ok(Role::Admin),
            "incharge" => Ok(Role::Incharge),
            "user" => Ok(Role::User),
            _ => Err(InventoryError::invalid_input(
                "role must be Admin, Incharge, or User",
            )),
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A registered member of the department.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: String,
    pub gov_id: String,
    pub name: String,
    pub email: String,
    pub phone: String,
    pub role: Role,
    /// Home station name.
    pub location: String,
    pub created_at: DateTime<Utc>,
}

impl User {
    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }
}

/// Registration fields as submitted by the identity flow.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegistrationForm {
    pub gov_id: Option<String>,
    pub name: Option<String>,
    pub email: Option<String>,
    #[serde(alias = "number")]
    pub phone: Option<String>,
    pub role: Option<String>,
    pub location: Option<String>,
}

/// A validated registration, ready to be stored.
#[derive(Debug, Clone, PartialEq)]
pub struct NewUser {
    pub gov_id: String,
    pub name: String,
    pub email: String,
    pub phone: String,
    pub role: Role,
    pub location: String,
}

impl TryFrom<RegistrationForm> for NewUser {
    type Error = InventoryError;

    fn try_from(form: RegistrationForm) -> Result<Self> {
        let gov_id = required(form.gov_id, "govId")?;
        if !GOV_ID.is_match(&gov_id) {
            return Err(InventoryError::invalid_input(
                "Government ID must be exactly 12 digits",
            ));
        }

        let name = required(form.name, "name")?;

        let email = required(form.email, "email")?;
        if !EMAIL.is_match(&email) {
            return Err(InventoryError::invalid_input("Please enter a valid email"));
        }

        let phone = required(form.phone, "phone")?;
        if !PHONE.is_match(&phone) {
            return Err(InventoryError::invalid_input(
                "Phone number must be exactly 10 digits",
            ));
        }

        let role = required(form.role, "role")?.parse()?;
        let location = required(form.location, "location")?;

        Ok(NewUser {
            gov_id,
            name,
            email,
            phone,
            role,
            location,
        })
    }
}
