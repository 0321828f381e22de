// Minimal client for the Twilio Programmable Messaging REST API.

use std::collections::HashMap;

pub mod models;
use reqwest::{header, Client};

use crate::models::{MessageErrorResponse, MessageResponse};

const DEFAULT_API_BASE: &str = "https://api.twilio.com";

#[derive(Debug, Clone)]
pub struct TwilioOptions {
    pub account_sid: String,
    pub auth_token: String,
    /// Sender number in E.164 format
    pub from_number: String,
}

#[derive(Debug, Clone)]
pub struct TwilioService {
    options: TwilioOptions,
    api_base: String,
    client: Client,
}

impl TwilioService {
    pub fn new(options: TwilioOptions) -> Self {
        Self::with_api_base(options, DEFAULT_API_BASE)
    }

    /// Point the client at a different API host (e.g. a local stub)
    pub fn with_api_base(options: TwilioOptions, api_base: &str) -> Self {
        Self {
            options,
            api_base: api_base.trim_end_matches('/').to_string(),
            client: Client::new(),
        }
    }

    pub fn messages_url(&self) -> String {
        format!(
            "{base}/2010-04-01/Accounts/{sid}/Messages.json",
            base = self.api_base,
            sid = self.options.account_sid
        )
    }

    /// Send an SMS with the given body to `recipient`.
    pub async fn send_message(
        &self,
        recipient: &str,
        body: &str,
    ) -> Result<MessageResponse, &'static str> {
        let mut headers = header::HeaderMap::new();
        headers.insert(
            header::CONTENT_TYPE,
            header::HeaderValue::from_static("application/x-www-form-urlencoded"),
        );

        let mut form_body: HashMap<&str, &str> = HashMap::new();
        form_body.insert("To", recipient);
        form_body.insert("From", &self.options.from_number);
        form_body.insert("Body", body);

        let res = self
            .client
            .post(self.messages_url())
            .basic_auth(&self.options.account_sid, Some(&self.options.auth_token))
            .headers(headers)
            .form(&form_body)
            .send()
            .await;

        let response = match res {
            Ok(response) => response,
            Err(e) => {
                eprintln!("Request to Twilio failed: {}", e);
                return Err("Error sending message");
            }
        };

        let status = response.status();
        if !status.is_success() {
            let error_body = response.text().await.unwrap_or_default();
            match serde_json::from_str::<MessageErrorResponse>(&error_body) {
                Ok(err) => eprintln!("Twilio error ({}): {} {}", status, err.code, err.message),
                Err(_) => eprintln!("Twilio error ({}): {}", status, error_body),
            }
            return Err("Twilio returned an error");
        }

        response.json::<MessageResponse>().await.map_err(|e| {
            eprintln!("Failed to parse Twilio response: {}", e);
            "Error parsing message response"
        })
    }
}
