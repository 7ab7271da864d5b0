// End-to-end enrollment lifecycle over the HTTP surface


#[cfg(test)]
mod tests {
    use crate::test_utils::*;
    use axum::http::StatusCode;

    #[tokio::test]
    async fn test_health() {
        let ctx = TestContext::new();
        let (status, body) = ctx.get("/health").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, r#"{"status":"ok"}"#);
    }

    #[tokio::test]
    async fn test_complete_lifecycle() {
        let ctx = TestContext::new();
        let status_uri = format!("/mfa/totp/{}", ACCOUNT);

        let (_, body) = ctx.get(&status_uri).await;
        assert!(body.contains(r#""status":"disabled""#));

        // DISABLED -> PENDING
        let (status, body) = ctx.post(&format!("/mfa/totp/{}/secret", ACCOUNT), serde_json::json!({})).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["secret"], FIXED_SECRET);
        assert_eq!(
            body["uri"],
            format!("otpauth://totp/Marketplace:alice%40example.com?secret={}&issuer=Marketplace", FIXED_SECRET)
        );
        let (_, body) = ctx.get(&status_uri).await;
        assert!(body.contains(r#""status":"pending""#));

        // PENDING -> ENABLED
        let (status, body) = ctx.submit("enable", &ctx.code(FIXED_SECRET)).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "enabled");

        // login gate
        let (status, body) = ctx.submit("verify", &ctx.code(FIXED_SECRET)).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["valid"], true);

        // ENABLED -> DISABLED
        let (status, body) = ctx.submit("disable", &ctx.code(FIXED_SECRET)).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "disabled");
        let (_, body) = ctx.get(&status_uri).await;
        assert!(body.contains(r#""status":"disabled""#));
    }

    #[tokio::test]
    async fn test_wrong_code_does_not_enable() {
        let ctx = TestContext::new();
        ctx.post(&format!("/mfa/totp/{}/secret", ACCOUNT), serde_json::json!({})).await;

        let wrong = if ctx.code(FIXED_SECRET) == "000000" { "111111" } else { "000000" };
        let (status, body) = ctx.submit("enable", wrong).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body["code"], 401);

        let (_, body) = ctx.get(&format!("/mfa/totp/{}", ACCOUNT)).await;
        assert!(body.contains(r#""status":"pending""#));
    }

    #[tokio::test]
    async fn test_cannot_reissue_secret_when_enabled() {
        let ctx = TestContext::new();
        ctx.enroll().await;
        let (status, _) = ctx.post(&format!("/mfa/totp/{}/secret", ACCOUNT), serde_json::json!({})).await;
        assert_eq!(status, StatusCode::CONFLICT);
    }

    #[tokio::test]
    async fn test_enable_without_pending_secret() {
        let ctx = TestContext::new();
        let (status, _) = ctx.submit("enable", "123456").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_verify_requires_enabled_account() {
        let ctx = TestContext::new();
        let (status, _) = ctx.submit("verify", "123456").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_code_accepted_one_step_late_only() {
        let ctx = TestContext::new();
        let secret = ctx.enroll().await;
        let code = ctx.code(&secret);

        ctx.clock.advance(30);
        let (_, body) = ctx.submit("verify", &code).await;
        assert_eq!(body["valid"], true);

        ctx.clock.advance(30);
        let (_, body) = ctx.submit("verify", &code).await;
        assert_eq!(body["valid"], false);
    }

    #[tokio::test]
    async fn test_future_code_is_rejected() {
        let ctx = TestContext::new();
        let secret = ctx.enroll().await;
        let next = code_at(&secret, ctx.now() + 30);
        assert_ne!(next, ctx.code(&secret));
        let (_, body) = ctx.submit("verify", &next).await;
        assert_eq!(body["valid"], false);
    }

    #[tokio::test]
    async fn test_configured_issuer_appears_in_uri() {
        let cfg = twofactor::config::AppConfig { totp_issuer: "Acme Market".to_string(), ..Default::default() };
        let ctx = TestContext::with_config(cfg);
        let (_, body) = ctx.post(&format!("/mfa/totp/{}/secret", ACCOUNT), serde_json::json!({})).await;
        let uri = body["uri"].as_str().unwrap();
        assert!(uri.starts_with("otpauth://totp/Acme%20Market:alice%40example.com?"));
        assert!(uri.ends_with("&issuer=Acme%20Market"));
    }
}
