//! Mobile-money charges through Flutterwave.

use std::time::Duration;

use axum::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, instrument};

use crate::{config::PaymentConfig, error::AppError};

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct ChargeMeta {
    pub customer_id: String,
    pub fcm_token: String,
    pub country: String,
    pub payment_type: String,
    pub redirect_url: String,
    pub order_id: String,
}

/// Body of `POST /v3/charges?type=mpesa`.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct ChargeRequest {
    pub tx_ref: String,
    pub amount: i64,
    pub currency: String,
    pub phone_number: String,
    pub fullname: String,
    pub email: String,
    pub meta: ChargeMeta,
}

#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
pub struct ChargeOutcome {
    pub status: String,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub data: Option<Value>,
}

/// The `data` object of a verify-by-reference response.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
pub struct VerifiedTransaction {
    pub tx_ref: String,
    pub status: String,
    #[serde(default)]
    pub amount: f64,
    #[serde(default)]
    pub currency: Option<String>,
    #[serde(default)]
    pub meta: Option<Value>,
}

impl VerifiedTransaction {
    pub fn is_successful(&self) -> bool {
        self.status == "successful"
    }

    fn meta_str(&self, key: &str) -> Option<&str> {
        self.meta.as_ref()?.get(key)?.as_str()
    }

    pub fn customer_id(&self) -> Option<&str> {
        self.meta_str("customer_id")
    }

    pub fn fcm_token(&self) -> Option<&str> {
        self.meta_str("fcm_token")
    }
}

#[derive(Debug, thiserror::Error)]
pub enum PaymentError {
    #[error("http: {0}")]
    Http(#[from] reqwest::Error),
    #[error("gateway returned {status}: {body}")]
    Status { status: u16, body: String },
    #[error("unexpected gateway response: {0}")]
    Decode(String),
}

impl From<PaymentError> for AppError {
    fn from(e: PaymentError) -> Self {
        AppError::upstream("payments", e)
    }
}

#[async_trait]
pub trait PaymentGateway: Send + Sync {
    async fn initiate_charge(&self, req: &ChargeRequest) -> Result<ChargeOutcome, PaymentError>;
    async fn verify_by_reference(&self, tx_ref: &str) -> Result<VerifiedTransaction, PaymentError>;
}

pub struct FlutterwaveGateway {
    http: reqwest::Client,
    base_url: String,
    api_key: String,
}

impl FlutterwaveGateway {
    pub fn new(cfg: &PaymentConfig) -> anyhow::Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(30))
            .build()?;
        Ok(Self {
            http,
            base_url: cfg.base_url.trim_end_matches('/').to_string(),
            api_key: cfg.api_key.clone(),
        })
    }

    async fn read(resp: reqwest::Response) -> Result<Value, PaymentError> {
        let status = resp.status();
        let body = resp.text().await?;
        if !status.is_success() {
            return Err(PaymentError::Status {
                status: status.as_u16(),
                body,
            });
        }
        serde_json::from_str(&body).map_err(|e| PaymentError::Decode(e.to_string()))
    }
}

#[async_trait]
impl PaymentGateway for FlutterwaveGateway {
    #[instrument(skip(self, req), fields(tx_ref = %req.tx_ref, amount = req.amount))]
    async fn initiate_charge(&self, req: &ChargeRequest) -> Result<ChargeOutcome, PaymentError> {
        let resp = self
            .http
            .post(format!("{}/v3/charges", self.base_url))
            .query(&[("type", "mpesa")])
            .bearer_auth(&self.api_key)
            .json(req)
            .send()
            .await?;
        let body = Self::read(resp).await?;
        debug!(status = ?body.get("status"), "charge initiated");
        serde_json::from_value(body).map_err(|e| PaymentError::Decode(e.to_string()))
    }

    #[instrument(skip(self))]
    async fn verify_by_reference(&self, tx_ref: &str) -> Result<VerifiedTransaction, PaymentError> {
        let resp = self
            .http
            .get(format!("{}/v3/transactions/verify_by_reference", self.base_url))
            .query(&[("tx_ref", tx_ref)])
            .bearer_auth(&self.api_key)
            .send()
            .await?;
        let mut body = Self::read(resp).await?;
        let data = body
            .get_mut("data")
            .map(Value::take)
            .filter(|d| !d.is_null())
            .ok_or_else(|| PaymentError::Decode("missing data".into()))?;
        serde_json::from_value(data).map_err(|e| PaymentError::Decode(e.to_string()))
    }
}
