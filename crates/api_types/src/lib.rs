use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

pub mod project {
    use super::*;

    #[derive(Debug, Serialize, Deserialize)]
    pub struct ProjectNew {
        pub name: String,
        pub description: String,
        pub full_amount: i64,
    }

    /// Partial edit of a project. Absent fields are left untouched.
    #[derive(Debug, Default, Serialize, Deserialize)]
    #[serde(deny_unknown_fields)]
    pub struct ProjectUpdate {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        pub name: Option<String>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        pub description: Option<String>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        pub full_amount: Option<i64>,
    }

    impl ProjectUpdate {
        pub fn is_empty(&self) -> bool {
            self.name.is_none() && self.description.is_none() && self.full_amount.is_none()
        }
    }

    #[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
    pub struct ProjectView {
        pub id: i32,
        pub name: String,
        pub description: String,
        pub full_amount: i64,
        pub invested_amount: i64,
        pub fully_invested: bool,
        pub create_date: DateTime<Utc>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        pub close_date: Option<DateTime<Utc>>,
    }
}

pub mod donation {
    use super::*;

    #[derive(Debug, Serialize, Deserialize)]
    #[serde(deny_unknown_fields)]
    pub struct DonationNew {
        pub full_amount: i64,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        pub comment: Option<String>,
    }

    /// What a donor sees of their own donations.
    #[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
    pub struct DonationView {
        pub id: i32,
        pub full_amount: i64,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        pub comment: Option<String>,
        pub create_date: DateTime<Utc>,
    }

    /// Superuser view, adding the donor and the funding state.
    #[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
    pub struct DonationFullView {
        pub id: i32,
        pub user_id: String,
        pub full_amount: i64,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        pub comment: Option<String>,
        pub invested_amount: i64,
        pub fully_invested: bool,
        pub create_date: DateTime<Utc>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        pub close_date: Option<DateTime<Utc>>,
    }
}
