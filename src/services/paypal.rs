//! Payment processor client (PayPal Orders v2)
//!
//! Only the captured amount reported by the processor is ever credited;
//! amounts shown to the payer in the browser are not trusted.

use std::time::Duration;

use anyhow::{bail, Context, Result};
use async_trait::async_trait;
use reqwest::Client;
use rust_decimal::Decimal;
use serde::Deserialize;
use serde_json::{json, Value};

use crate::configure::PaypalConfig;

/// Order created at the processor, awaiting payer approval
#[derive(Debug, Clone, PartialEq, serde::Serialize, Deserialize)]
pub struct ProcessorOrder {
    pub id: String,
    pub status: String,
}

#[derive(Debug, Clone, PartialEq)]
pub enum CaptureOutcome {
    /// Money moved; `settled_amount` comes from the processor's response
    Completed { settled_amount: Decimal },
    /// Money moved but the settled amount could not be read from the response
    CompletedUnreadable { reason: String },
    NotCompleted { message: String },
}

#[async_trait]
pub trait PaymentProcessor: Send + Sync {
    async fn create_order(&self, amount: Decimal) -> Result<ProcessorOrder>;

    async fn capture_order(&self, order_id: &str) -> Result<CaptureOutcome>;

    fn name(&self) -> &str;
}

#[derive(Debug, Deserialize)]
struct AccessToken {
    access_token: String,
}

/// Amount as the processor expects it: two decimals, e.g. `20.00`
pub fn format_amount(amount: Decimal) -> String {
    let mut rounded = amount.round_dp(2);
    rounded.rescale(2);
    rounded.to_string()
}

pub fn order_request_body(amount: Decimal, currency: &str) -> Value {
    json!({
        "intent": "CAPTURE",
        "purchase_units": [{
            "amount": {
                "currency_code": currency,
                "value": format_amount(amount),
            }
        }]
    })
}

/// Interpret a capture response body
pub fn parse_capture_response(body: &Value) -> Result<CaptureOutcome> {
    if body["status"] == "COMPLETED" {
        let value = body["purchase_units"][0]["payments"]["captures"][0]["amount"]["value"].as_str();
        let outcome = match value {
            Some(v) => match v.parse::<Decimal>() {
                Ok(settled_amount) => CaptureOutcome::Completed { settled_amount },
                Err(_) => CaptureOutcome::CompletedUnreadable {
                    reason: format!("invalid captured amount {:?}", v),
                },
            },
            None => CaptureOutcome::CompletedUnreadable {
                reason: "completed capture carries no captured amount".to_string(),
            },
        };
        return Ok(outcome);
    }

    let message = body["details"][0]["description"]
        .as_str()
        .or_else(|| body["message"].as_str())
        .unwrap_or("payment was not completed")
        .to_string();
    Ok(CaptureOutcome::NotCompleted { message })
}

pub struct PayPalClient {
    client: Client,
    config: PaypalConfig,
}

impl PayPalClient {
    pub fn new(config: PaypalConfig) -> Result<Self> {
        let client = Client::builder().timeout(Duration::from_secs(30)).build()?;
        Ok(Self { client, config })
    }

    async fn access_token(&self) -> Result<String> {
        if self.config.client_id.is_empty() || self.config.client_secret.is_empty() {
            bail!("paypal credentials are not configured");
        }

        let token: AccessToken = self
            .client
            .post(format!("{}/v1/oauth2/token", self.config.base_url))
            .basic_auth(&self.config.client_id, Some(&self.config.client_secret))
            .form(&[("grant_type", "client_credentials")])
            .send()
            .await?
            .error_for_status()
            .context("paypal token request rejected")?
            .json()
            .await?;

        Ok(token.access_token)
    }
}

#[async_trait]
impl PaymentProcessor for PayPalClient {
    async fn create_order(&self, amount: Decimal) -> Result<ProcessorOrder> {
        if amount <= Decimal::ZERO {
            bail!("order amount must be positive");
        }
        let token = self.access_token().await?;

        let order: ProcessorOrder = self
            .client
            .post(format!("{}/v2/checkout/orders", self.config.base_url))
            .bearer_auth(token)
            .json(&order_request_body(amount, &self.config.currency))
            .send()
            .await?
            .error_for_status()
            .context("paypal order creation rejected")?
            .json()
            .await?;

        log::info!("paypal order {} created for {}", order.id, format_amount(amount));
        Ok(order)
    }

    async fn capture_order(&self, order_id: &str) -> Result<CaptureOutcome> {
        let token = self.access_token().await?;

        // error bodies carry the reason, so the status code is not checked here
        let body: Value = self
            .client
            .post(format!("{}/v2/checkout/orders/{}/capture", self.config.base_url, order_id))
            .bearer_auth(token)
            .header("Content-Type", "application/json")
            .send()
            .await?
            .json()
            .await
            .context("unreadable paypal capture response")?;

        parse_capture_response(&body)
    }

    fn name(&self) -> &str {
        "paypal"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_format_amount() {
        assert_eq!(format_amount(dec!(20)), "20.00");
        assert_eq!(format_amount(dec!(12.5)), "12.50");
        assert_eq!(format_amount(dec!(9.999)), "10.00");
    }

    #[test]
    fn test_order_request_body() {
        let body = order_request_body(dec!(15), "USD");
        assert_eq!(body["intent"], "CAPTURE");
        assert_eq!(body["purchase_units"][0]["amount"]["value"], "15.00");
        assert_eq!(body["purchase_units"][0]["amount"]["currency_code"], "USD");
    }

    #[test]
    fn test_completed_capture_uses_captured_amount() {
        let body = json!({
            "id": "5O190127TN364715T",
            "status": "COMPLETED",
            "purchase_units": [{
                "amount": {"currency_code": "USD", "value": "25.00"},
                "payments": {"captures": [{
                    "id": "3C679366HH908993F",
                    "status": "COMPLETED",
                    "amount": {"currency_code": "USD", "value": "20.00"}
                }]}
            }]
        });
        assert_eq!(
            parse_capture_response(&body).unwrap(),
            CaptureOutcome::Completed { settled_amount: dec!(20.00) }
        );
    }

    #[test]
    fn test_failed_capture_message() {
        let body = json!({
            "name": "UNPROCESSABLE_ENTITY",
            "message": "The requested action could not be performed.",
            "details": [{"issue": "INSTRUMENT_DECLINED", "description": "The instrument presented was declined."}]
        });
        assert_eq!(
            parse_capture_response(&body).unwrap(),
            CaptureOutcome::NotCompleted {
                message: "The instrument presented was declined.".to_string()
            }
        );

        let body = json!({"message": "Order not approved"});
        assert!(matches!(
            parse_capture_response(&body).unwrap(),
            CaptureOutcome::NotCompleted { message } if message == "Order not approved"
        ));
    }

    #[test]
    fn test_completed_without_readable_amount() {
        let body = json!({"status": "COMPLETED", "purchase_units": []});
        assert!(matches!(
            parse_capture_response(&body).unwrap(),
            CaptureOutcome::CompletedUnreadable { .. }
        ));

        let body = json!({
            "status": "COMPLETED",
            "purchase_units": [{"payments": {"captures": [{"amount": {"value": "twenty"}}]}}]
        });
        assert!(matches!(
            parse_capture_response(&body).unwrap(),
            CaptureOutcome::CompletedUnreadable { reason } if reason.contains("twenty")
        ));
    }
}
