use chrono::Utc;
use sea_orm::{ActiveValue, QueryFilter, QueryOrder, Select, TransactionTrait, prelude::*};

use crate::{Contribution, Donation, DonationNew, EngineError, ResultEngine, donations};

use super::{Engine, normalize_optional_text, require_positive_amount, with_tx};

fn oldest_first(select: Select<donations::Entity>) -> Select<donations::Entity> {
    select
        .order_by_asc(donations::Column::CreateDate)
        .order_by_asc(donations::Column::Id)
}

impl Engine {
    /// Records a donation of `user_id` and matches it against the open
    /// projects.
    ///
    /// The returned donation reflects the settlement.
    pub async fn new_donation(&self, user_id: &str, input: DonationNew) -> ResultEngine<Donation> {
        let full_amount = require_positive_amount(input.full_amount, "full_amount")?;
        let comment = normalize_optional_text(input.comment.as_deref());

        let donation_id = self
            .retrying("insertion of donation", || {
                self.insert_donation(user_id, full_amount, comment.clone())
            })
            .await?;
        tracing::info!(donation_id, user_id, full_amount, "created donation");

        self.settle(Contribution::donation(donation_id)).await?;
        self.donation(donation_id).await
    }

    async fn insert_donation(
        &self,
        user_id: &str,
        full_amount: i64,
        comment: Option<String>,
    ) -> ResultEngine<i32> {
        with_tx!(self, |db_tx| {
            let model = donations::ActiveModel {
                id: ActiveValue::NotSet,
                user_id: ActiveValue::Set(user_id.to_string()),
                comment: ActiveValue::Set(comment),
                full_amount: ActiveValue::Set(full_amount),
                invested_amount: ActiveValue::Set(0),
                fully_invested: ActiveValue::Set(false),
                create_date: ActiveValue::Set(Utc::now()),
                close_date: ActiveValue::Set(None),
            }
            .insert(&db_tx)
            .await?;
            Ok(model.id)
        })
    }

    /// Return a donation snapshot from DB.
    pub async fn donation(&self, donation_id: i32) -> ResultEngine<Donation> {
        with_tx!(self, |db_tx| {
            let model = donations::Entity::find_by_id(donation_id)
                .one(&db_tx)
                .await?
                .ok_or_else(|| EngineError::KeyNotFound(format!("donation {donation_id}")))?;
            Ok(Donation::from(model))
        })
    }

    /// All donations, oldest first.
    pub async fn donations(&self) -> ResultEngine<Vec<Donation>> {
        with_tx!(self, |db_tx| {
            let models = oldest_first(donations::Entity::find()).all(&db_tx).await?;
            Ok(models.into_iter().map(Donation::from).collect())
        })
    }

    /// Donations made by `user_id`, oldest first.
    pub async fn donations_by_user(&self, user_id: &str) -> ResultEngine<Vec<Donation>> {
        with_tx!(self, |db_tx| {
            let models = oldest_first(
                donations::Entity::find().filter(donations::Column::UserId.eq(user_id)),
            )
            .all(&db_tx)
            .await?;
            Ok(models.into_iter().map(Donation::from).collect())
        })
    }
}
