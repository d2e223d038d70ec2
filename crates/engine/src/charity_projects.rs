//! The module contains `Project` struct and its table.

use sea_orm::entity::prelude::*;

use crate::Funding;

/// A charity project collecting money.
///
/// The name is unique across all projects. Name, description and
/// `full_amount` can be edited until the project is fully invested.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Project {
    pub id: i32,
    pub name: String,
    pub description: String,
    pub funding: Funding,
}

/// Input for a new project.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ProjectNew {
    pub name: String,
    pub description: String,
    pub full_amount: i64,
}

/// Partial update of a project: absent fields are left untouched.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ProjectPatch {
    pub name: Option<String>,
    pub description: Option<String>,
    pub full_amount: Option<i64>,
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "charity_projects")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    #[sea_orm(unique)]
    pub name: String,
    #[sea_orm(column_type = "Text")]
    pub description: String,
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

impl From<Model> for Project {
    fn from(value: Model) -> Self {
        let funding = value.funding();
        Self {
            id: value.id,
            name: value.name,
            description: value.description,
            funding,
        }
    }
}
