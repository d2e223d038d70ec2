//! The module contains `Donation` struct and its table.

use sea_orm::entity::prelude::*;

use crate::Funding;

/// Money given by a user.
///
/// A donation is never edited or deleted after creation; only the matching
/// engine moves its invested amount.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Donation {
    pub id: i32,
    pub user_id: String,
    pub comment: Option<String>,
    pub funding: Funding,
}

/// Input for a new donation.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DonationNew {
    pub full_amount: i64,
    pub comment: Option<String>,
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "donations")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub user_id: String,
    #[sea_orm(column_type = "Text", nullable)]
    pub comment: Option<String>,
    pub full_amount: i64,
    pub invested_amount: i64,
    pub fully_invested: bool,
    pub create_date: DateTimeUtc,
    pub close_date: Option<DateTimeUtc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

impl Model {
    pub(crate) fn funding(&self) -> Funding {
        Funding {
            full_amount: self.full_amount,
            invested_amount: self.invested_amount,
            fully_invested: self.fully_invested,
            create_date: self.create_date,
            close_date: self.close_date,
        }
    }
}

impl From<Model> for Donation {
    fn from(value: Model) -> Self {
        let funding = value.funding();
        Self {
            id: value.id,
            user_id: value.user_id,
            comment: value.comment,
            funding,
        }
    }
}
