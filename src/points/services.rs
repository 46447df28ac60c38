use serde::Serialize;
use tracing::{info, warn};
use uuid::Uuid;

use super::{
    notify::Notification,
    payments::{ChargeMeta, ChargeOutcome, ChargeRequest},
    repo::{Account, Credit, Purchase},
};
use crate::{error::AppError, state::AppState};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Wallet {
    /// Purchasable points.
    Points,
    /// Points earned through regular app use.
    Regular,
}

#[derive(Debug, Serialize, PartialEq)]
pub struct BalanceCheck {
    pub status: &'static str,
    #[serde(rename = "enoughPoints")]
    pub enough_points: bool,
    pub points: i64,
}

#[derive(Debug, Serialize, PartialEq)]
pub struct Recharge {
    pub tx_ref: String,
    #[serde(flatten)]
    pub outcome: ChargeOutcome,
}

#[derive(Debug, Serialize, PartialEq)]
pub struct Reconciled {
    pub status: &'static str,
    pub points: i64,
}

async fn account(st: &AppState, user_id: Uuid) -> Result<Account, AppError> {
    st.accounts
        .account(user_id)
        .await?
        .ok_or_else(|| AppError::NotFound("User not found".into()))
}

pub async fn check_balance(
    st: &AppState,
    user_id: Uuid,
    cost_points: i64,
    wallet: Wallet,
) -> Result<BalanceCheck, AppError> {
    let acc = account(st, user_id).await?;
    let points = match wallet {
        Wallet::Points => acc.points,
        Wallet::Regular => acc.total_points,
    };
    Ok(BalanceCheck {
        status: "success",
        enough_points: points >= cost_points,
        points,
    })
}

/// Starts an M-Pesa charge for `points` (one point per currency unit).
pub async fn recharge(
    st: &AppState,
    user_id: Uuid,
    points: i64,
    phone: &str,
) -> Result<Recharge, AppError> {
    if points <= 0 {
        return Err(AppError::validation("points", "must be a positive number"));
    }
    let phone = phone.trim();
    if phone.is_empty() {
        return Err(AppError::validation("phone", "is required"));
    }
    let acc = account(st, user_id).await?;
    let cfg = &st.config.payments;
    let tx_ref = format!("ITR-{}", Uuid::new_v4());
    let req = ChargeRequest {
        tx_ref: tx_ref.clone(),
        amount: points,
        currency: cfg.currency.clone(),
        phone_number: phone.to_string(),
        fullname: format!(
            "{} {}",
            acc.firstname.as_deref().unwrap_or("Zen"),
            acc.lastname.as_deref().unwrap_or("Seeker")
        ),
        email: acc.email,
        meta: ChargeMeta {
            customer_id: user_id.to_string(),
            fcm_token: acc.fcm_token.unwrap_or_default(),
            country: cfg.country.clone(),
            payment_type: "mpesa".into(),
            redirect_url: cfg.redirect_url.clone(),
            order_id: format!("IKI-{}", Uuid::new_v4()),
        },
    };
    let outcome = st.payments.initiate_charge(&req).await?;
    info!(user_id = %user_id, %tx_ref, status = %outcome.status, "recharge initiated");
    Ok(Recharge { tx_ref, outcome })
}

/// Verifies `tx_ref` with the gateway and credits `added_points` once.
pub async fn reconcile(
    st: &AppState,
    user_id: Uuid,
    tx_ref: &str,
    added_points: i64,
) -> Result<Reconciled, AppError> {
    if added_points <= 0 {
        return Err(AppError::validation("added_points", "must be a positive number"));
    }
    let acc = account(st, user_id).await?;
    let tx = st.payments.verify_by_reference(tx_ref).await?;
    if !tx.is_successful() {
        info!(user_id = %user_id, %tx_ref, status = %tx.status, "transaction not successful");
        return Ok(Reconciled {
            status: "success",
            points: acc.points,
        });
    }
    if let Some(owner) = tx.customer_id() {
        if owner != user_id.to_string() {
            warn!(user_id = %user_id, %tx_ref, "transaction belongs to another user");
            return Err(AppError::validation(
                "transaction_ref",
                "transaction does not belong to this user",
            ));
        }
    }
    // One point per currency unit paid.
    let paid_points = tx.amount.floor() as i64;
    if added_points > paid_points {
        warn!(user_id = %user_id, %tx_ref, added_points, paid_points, "claimed points exceed payment");
        return Err(AppError::validation(
            "added_points",
            format!("must not exceed the {paid_points} points paid for"),
        ));
    }

    let purchase = Purchase {
        tx_ref: tx.tx_ref.clone(),
        user_id,
        amount: tx.amount,
        points: added_points,
        data: serde_json::to_value(&tx).map_err(anyhow::Error::from)?,
    };
    let balance = match st.accounts.credit_purchase(&purchase).await? {
        Credit::Applied { balance } => balance,
        Credit::AlreadyRecorded { balance } => {
            info!(user_id = %user_id, %tx_ref, "purchase already reconciled");
            return Ok(Reconciled {
                status: "success",
                points: balance,
            });
        }
    };
    info!(user_id = %user_id, %tx_ref, added_points, balance, "points credited");

    let token = tx
        .fcm_token()
        .filter(|t| !t.is_empty())
        .map(str::to_owned)
        .or(acc.fcm_token);
    match token {
        Some(token) => {
            let note = Notification {
                title: "Purchase Successful".into(),
                body: format!(
                    "{} Confirmed. You have successfully purchased {} Iki points. \
                     Your new Iki points balance is {}. A transaction receipt has been sent to your email.",
                    tx.tx_ref, tx.amount, balance
                ),
            };
            if let Err(e) = st.notifier.send(&token, &note).await {
                warn!(user_id = %user_id, error = %e, "purchase notification failed");
            }
        }
        None => warn!(user_id = %user_id, "no device token; purchase notification skipped"),
    }

    Ok(Reconciled {
        status: "success",
        points: balance,
    })
}
