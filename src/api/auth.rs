//! Authentication, registration and email verification endpoints.

use reqwest::Method;

use super::{Access, ApiClient};
use crate::error::ApiResult;
use crate::models::{
    AvailabilityResponse, EmailCodeRequest, EmailVerifyRequest, LoginRequest, RefreshRequest,
    RegisterRequest, TokenResponse, User,
};

impl ApiClient {
    pub async fn login(&self, login_id: &str, password: &str) -> ApiResult<TokenResponse> {
        let body = LoginRequest {
            login_id: login_id.to_string(),
            password: password.to_string(),
        };
        self.send_json(Method::POST, "/api/auth/login", &body, Access::Anonymous)
            .await
    }

    pub async fn refresh(&self, refresh_token: &str) -> ApiResult<TokenResponse> {
        let body = RefreshRequest {
            refresh_token: refresh_token.to_string(),
        };
        self.send_json(Method::POST, "/api/auth/refresh", &body, Access::Anonymous)
            .await
    }

    pub async fn register(&self, request: &RegisterRequest) -> ApiResult<()> {
        self.send_unit(
            Method::POST,
            "/api/users/register",
            Some(request),
            Access::Anonymous,
        )
        .await
    }

    /// True when the login id is still free
    pub async fn check_login_id(&self, login_id: &str) -> ApiResult<bool> {
        let builder = self
            .request(Method::GET, "/api/users/check-loginid", Access::Anonymous)?
            .query(&[("loginId", login_id)]);
        let value = self.execute_json(builder).await?;
        decode_availability(value)
    }

    /// True when the nickname is still free
    pub async fn check_nickname(&self, nickname: &str) -> ApiResult<bool> {
        let builder = self
            .request(Method::GET, "/api/users/check-nickname", Access::Anonymous)?
            .query(&[("nickname", nickname)]);
        let value = self.execute_json(builder).await?;
        decode_availability(value)
    }

    pub async fn send_email_code(&self, email: &str) -> ApiResult<()> {
        let body = EmailCodeRequest {
            email: email.to_string(),
        };
        self.send_unit(Method::POST, "/api/email/send-code", Some(&body), Access::Anonymous)
            .await
    }

    pub async fn verify_email_code(&self, email: &str, code: &str) -> ApiResult<()> {
        let body = EmailVerifyRequest {
            email: email.to_string(),
            code: code.to_string(),
        };
        self.send_unit(
            Method::POST,
            "/api/email/verify-code",
            Some(&body),
            Access::Anonymous,
        )
        .await
    }

    pub async fn me(&self) -> ApiResult<User> {
        self.get_item("/api/users/me", Access::Required).await
    }
}

/// Availability endpoints answer either a bare boolean or `{available}`
fn decode_availability(value: serde_json::Value) -> ApiResult<bool> {
    if let Some(flag) = value.as_bool() {
        return Ok(flag);
    }
    let parsed: AvailabilityResponse = super::envelope::normalize_item(value)?;
    Ok(parsed.available)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_availability_shapes() {
        assert!(decode_availability(json!(true)).unwrap());
        assert!(!decode_availability(json!({"available": false})).unwrap());
        assert!(decode_availability(json!({"data": {"isAvailable": true}})).unwrap());
        assert!(decode_availability(json!("yes")).is_err());
    }
}
