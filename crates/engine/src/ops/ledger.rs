//! Funding-state accessors shared by the project and donation tables.
//!
//! Both tables carry the same amount columns, so the accessors are generated
//! once per table and dispatched on [`Side`].

use sea_orm::DatabaseTransaction;

use crate::{Contribution, Funding, ResultEngine, Side};

/// Generates the funding accessors for a table module exposing `Entity`,
/// `Column` and `Model::funding`.
macro_rules! impl_funding_ledger {
    ($module:ident, $table:ident) => {
        mod $module {
            use sea_orm::{DatabaseTransaction, QueryFilter, QueryOrder, prelude::*, sea_query::Expr};

            use crate::{Funding, ResultEngine, $table};

            pub(super) async fn funding(
                db: &DatabaseTransaction,
                id: i32,
            ) -> ResultEngine<Option<Funding>> {
                let model = $table::Entity::find_by_id(id).one(db).await?;
                Ok(model.map(|m| m.funding()))
            }

            pub(super) async fn oldest_open(
                db: &DatabaseTransaction,
            ) -> ResultEngine<Option<(i32, Funding)>> {
                let model = $table::Entity::find()
                    .filter($table::Column::FullyInvested.eq(false))
                    .order_by_asc($table::Column::CreateDate)
                    .order_by_asc($table::Column::Id)
                    .one(db)
                    .await?;
                Ok(model.map(|m| (m.id, m.funding())))
            }

            pub(super) async fn store(
                db: &DatabaseTransaction,
                id: i32,
                before: &Funding,
                after: &Funding,
            ) -> ResultEngine<bool> {
                let result = $table::Entity::update_many()
                    .col_expr(
                        $table::Column::InvestedAmount,
                        Expr::value(after.invested_amount),
                    )
                    .col_expr(
                        $table::Column::FullyInvested,
                        Expr::value(after.fully_invested),
                    )
                    .col_expr($table::Column::CloseDate, Expr::value(after.close_date))
                    .filter($table::Column::Id.eq(id))
                    .filter($table::Column::FullAmount.eq(before.full_amount))
                    .filter($table::Column::InvestedAmount.eq(before.invested_amount))
                    .filter($table::Column::FullyInvested.eq(false))
                    .exec(db)
                    .await?;
                Ok(result.rows_affected == 1)
            }
        }
    };
}

impl_funding_ledger!(project_funding, charity_projects);
impl_funding_ledger!(donation_funding, donations);

/// Current funding state of a record, `None` if it does not exist.
pub(super) async fn funding(
    db: &DatabaseTransaction,
    record: Contribution,
) -> ResultEngine<Option<Funding>> {
    match record.side {
        Side::Project => project_funding::funding(db, record.id).await,
        Side::Donation => donation_funding::funding(db, record.id).await,
    }
}

/// The oldest not fully invested record of `side`, by creation date then id.
pub(super) async fn oldest_open(
    db: &DatabaseTransaction,
    side: Side,
) -> ResultEngine<Option<(Contribution, Funding)>> {
    let found = match side {
        Side::Project => project_funding::oldest_open(db).await?,
        Side::Donation => donation_funding::oldest_open(db).await?,
    };
    Ok(found.map(|(id, funding)| (Contribution { side, id }, funding)))
}

/// Writes `after` only if the row still matches `before` and is open.
///
/// Returns `false` when another writer changed the row in the meantime.
pub(super) async fn store(
    db: &DatabaseTransaction,
    record: Contribution,
    before: &Funding,
    after: &Funding,
) -> ResultEngine<bool> {
    match record.side {
        Side::Project => project_funding::store(db, record.id, before, after).await,
        Side::Donation => donation_funding::store(db, record.id, before, after).await,
    }
}
