//! Donation API endpoints.

use api_types::donation::{DonationFullView, DonationNew, DonationView};
use axum::{Extension, Json, extract::State};

use crate::{ServerError, server::ServerState, user};

fn map_donation(donation: engine::Donation) -> DonationView {
    DonationView {
        id: donation.id,
        full_amount: donation.funding.full_amount,
        comment: donation.comment,
        create_date: donation.funding.create_date,
    }
}

fn map_donation_full(donation: engine::Donation) -> DonationFullView {
    DonationFullView {
        id: donation.id,
        user_id: donation.user_id,
        full_amount: donation.funding.full_amount,
        comment: donation.comment,
        invested_amount: donation.funding.invested_amount,
        fully_invested: donation.funding.fully_invested,
        create_date: donation.funding.create_date,
        close_date: donation.funding.close_date,
    }
}

/// Handle requests for donating. The donation is matched against the open
/// projects before the response is sent.
pub async fn create(
    Extension(user): Extension<user::Model>,
    State(state): State<ServerState>,
    Json(payload): Json<DonationNew>,
) -> Result<Json<DonationView>, ServerError> {
    let donation = state
        .engine
        .new_donation(
            &user.username,
            engine::DonationNew {
                full_amount: payload.full_amount,
                comment: payload.comment,
            },
        )
        .await?;

    Ok(Json(map_donation(donation)))
}

pub async fn list(
    State(state): State<ServerState>,
) -> Result<Json<Vec<DonationFullView>>, ServerError> {
    let donations = state
        .engine
        .donations()
        .await?
        .into_iter()
        .map(map_donation_full)
        .collect();

    Ok(Json(donations))
}

pub async fn mine(
    Extension(user): Extension<user::Model>,
    State(state): State<ServerState>,
) -> Result<Json<Vec<DonationView>>, ServerError> {
    let donations = state
        .engine
        .donations_by_user(&user.username)
        .await?
        .into_iter()
        .map(map_donation)
        .collect();

    Ok(Json(donations))
}
