use once_cell::sync::Lazy;
use redis::aio::ConnectionManager;
use serde_json::json;

// Shared test context. The tests expect a running server on port 3000 with
// the schema applied and a seeded admin account.
struct TestContext {
    client: reqwest::Client,
    base_url: String,
}

const TEST_USERNAME: &str = "admin";
const TEST_PASSWORD: &str = "AdminPass123!";

static REDIS_CLIENT: Lazy<redis::Client> =
    Lazy::new(|| redis::Client::open("redis://127.0.0.1:6379/").unwrap());

impl TestContext {
    fn new() -> Self {
        Self {
            client: reqwest::Client::builder().build().unwrap(),
            base_url: "http://127.0.0.1:3000".to_string(),
        }
    }

    async fn login(&self) -> String {
        let response = self
            .client
            .post(format!("{}/auth/login", self.base_url))
            .json(&json!({
                "username": TEST_USERNAME,
                "password": TEST_PASSWORD
            }))
            .send()
            .await
            .unwrap();

        assert_eq!(response.status().as_u16(), 200, "Login failed");
        let body: serde_json::Value = response.json().await.unwrap();
        body["token"].as_str().expect("token missing").to_string()
    }
}

async fn get_redis_conn() -> ConnectionManager {
    REDIS_CLIENT.get_connection_manager().await.unwrap()
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;
    use serde_json::Value;

    async fn setup() {
        let mut con = get_redis_conn().await;
        let _: () = redis::cmd("DEL")
            .arg("video_statistics")
            .query_async(&mut con)
            .await
            .unwrap();
        let _: () = redis::cmd("DEL")
            .arg(format!("user_details:{}", TEST_USERNAME))
            .query_async(&mut con)
            .await
            .unwrap();
    }

    #[tokio::test]
    #[ignore = "requires a running server with a seeded admin user"]
    async fn test_login_and_whoami() {
        setup().await;
        let context = TestContext::new();

        let login_response = context
            .client
            .post(format!("{}/auth/login", context.base_url))
            .json(&json!({
                "username": TEST_USERNAME,
                "password": TEST_PASSWORD
            }))
            .send()
            .await
            .unwrap();

        assert_eq!(login_response.status().as_u16(), 200, "Login failed");
        let login_body: Value = login_response.json().await.unwrap();
        let token = login_body["token"].as_str().expect("token missing");
        assert!(!token.is_empty());
        assert!(login_body["issuedAt"].is_string());
        assert!(login_body["expiresAt"].is_string());

        let whoami_response = context
            .client
            .get(format!("{}/auth/whoami", context.base_url))
            .bearer_auth(token)
            .send()
            .await
            .unwrap();

        assert_eq!(whoami_response.status().as_u16(), 200, "Whoami failed");
        let whoami_body: Value = whoami_response.json().await.unwrap();
        assert_eq!(whoami_body["username"], TEST_USERNAME);
        assert_eq!(whoami_body["active"], true);
        assert!(whoami_body["authorities"].is_array());
    }

    #[tokio::test]
    #[ignore = "requires a running server with a seeded admin user"]
    async fn test_login_rejects_bad_credentials() {
        let context = TestContext::new();

        let response = context
            .client
            .post(format!("{}/auth/login", context.base_url))
            .json(&json!({
                "username": TEST_USERNAME,
                "password": "definitely-wrong"
            }))
            .send()
            .await
            .unwrap();

        assert_eq!(response.status().as_u16(), 401);
        let body: Value = response.json().await.unwrap();
        assert_eq!(body["error"], "INVALID_CREDENTIALS");
    }

    #[tokio::test]
    #[ignore = "requires a running server"]
    async fn test_login_reports_blank_fields() {
        let context = TestContext::new();

        let response = context
            .client
            .post(format!("{}/auth/login", context.base_url))
            .json(&json!({}))
            .send()
            .await
            .unwrap();

        assert_eq!(response.status().as_u16(), 400);
        let body: Value = response.json().await.unwrap();
        assert_eq!(body["error"], "BAD_REQUEST");
        assert_eq!(body["fieldErrors"]["username"], "must not be blank");
        assert_eq!(body["fieldErrors"]["password"], "must not be blank");
    }

    #[tokio::test]
    #[ignore = "requires a running server"]
    async fn test_catalog_requires_a_token() {
        let context = TestContext::new();

        let response = context
            .client
            .get(format!("{}/videos", context.base_url))
            .send()
            .await
            .unwrap();

        assert_eq!(response.status().as_u16(), 401);
        let body: Value = response.json().await.unwrap();
        assert_eq!(body["error"], "UNAUTHORIZED");
    }

    #[tokio::test]
    #[ignore = "requires a running server"]
    async fn test_garbage_token_is_rejected() {
        let context = TestContext::new();

        let response = context
            .client
            .get(format!("{}/videos", context.base_url))
            .bearer_auth("not-a-real-token")
            .send()
            .await
            .unwrap();

        assert_eq!(response.status().as_u16(), 401);
        let body: Value = response.json().await.unwrap();
        assert_eq!(body["error"], "UNAUTHORIZED");
    }

    #[tokio::test]
    #[ignore = "requires a running server"]
    async fn test_health_is_public() {
        let context = TestContext::new();

        let response = context
            .client
            .get(format!("{}/health", context.base_url))
            .send()
            .await
            .unwrap();

        assert_eq!(response.status().as_u16(), 200);
        let body: Value = response.json().await.unwrap();
        assert_eq!(body["status"], "UP");
    }

    #[tokio::test]
    #[ignore = "requires a running server with a seeded admin user"]
    async fn test_catalog_listing_validates_every_parameter() {
        let context = TestContext::new();
        let token = context.login().await;

        let response = context
            .client
            .get(format!(
                "{}/videos?page=0&size=lots&sortBy=password&sortDirection=sideways",
                context.base_url
            ))
            .bearer_auth(&token)
            .send()
            .await
            .unwrap();

        assert_eq!(response.status().as_u16(), 400);
        let body: Value = response.json().await.unwrap();
        assert_eq!(body["error"], "BAD_REQUEST");
        assert_eq!(
            body["fieldErrors"]["page"],
            "must be greater than or equal to 1"
        );
        assert_eq!(body["fieldErrors"]["size"], "must be an integer");
        assert!(body["fieldErrors"]["sortBy"].is_string());
        assert_eq!(body["fieldErrors"]["sortDirection"], "must be ASC or DESC");
    }

    #[tokio::test]
    #[ignore = "requires a running server with a seeded admin user"]
    async fn test_catalog_listing_returns_a_page_envelope() {
        setup().await;
        let context = TestContext::new();
        let token = context.login().await;

        let response = context
            .client
            .get(format!("{}/videos?page=1&size=5", context.base_url))
            .bearer_auth(&token)
            .send()
            .await
            .unwrap();

        assert_eq!(response.status().as_u16(), 200);
        let body: Value = response.json().await.unwrap();
        assert_eq!(body["page"], 1);
        assert_eq!(body["size"], 5);
        assert!(body["totalElements"].is_number());
        assert!(body["totalPages"].is_number());
        assert!(body["content"].is_array());
    }

    #[tokio::test]
    #[ignore = "requires a running server with a seeded admin user"]
    async fn test_unknown_video_is_not_found() {
        let context = TestContext::new();
        let token = context.login().await;

        let response = context
            .client
            .get(format!(
                "{}/videos/00000000-0000-0000-0000-000000000000",
                context.base_url
            ))
            .bearer_auth(&token)
            .send()
            .await
            .unwrap();

        assert_eq!(response.status().as_u16(), 404);
        let body: Value = response.json().await.unwrap();
        assert_eq!(body["error"], "NOT_FOUND");
        assert_eq!(body["message"], "Video not found");
    }

    #[tokio::test]
    #[ignore = "requires a running server with a seeded admin user"]
    async fn test_unknown_username_reads_like_a_wrong_password() {
        let context = TestContext::new();

        let wrong_password = context
            .client
            .post(format!("{}/auth/login", context.base_url))
            .json(&json!({
                "username": TEST_USERNAME,
                "password": "definitely-wrong"
            }))
            .send()
            .await
            .unwrap();
        let unknown_user = context
            .client
            .post(format!("{}/auth/login", context.base_url))
            .json(&json!({
                "username": "no_such_user_anywhere",
                "password": "definitely-wrong"
            }))
            .send()
            .await
            .unwrap();

        assert_eq!(wrong_password.status().as_u16(), 401);
        assert_eq!(unknown_user.status().as_u16(), 401);

        // Both rejections must be indistinguishable, or the endpoint leaks
        // which usernames exist.
        let wrong_body: Value = wrong_password.json().await.unwrap();
        let unknown_body: Value = unknown_user.json().await.unwrap();
        assert_eq!(unknown_body["error"], "INVALID_CREDENTIALS");
        assert_eq!(unknown_body["message"], "Invalid credentials provided");
        assert_eq!(wrong_body["error"], unknown_body["error"]);
        assert_eq!(wrong_body["message"], unknown_body["message"]);
    }

    #[tokio::test]
    #[ignore = "requires a running server, a seeded admin user, and the external video source"]
    async fn test_import_completion_drops_cached_stats() {
        let context = TestContext::new();
        let token = context.login().await;
        let mut con = get_redis_conn().await;

        // Plant a cached value so the invalidation is observable even when
        // the import brings in nothing.
        let sentinel = r#"[{"source":"sentinel","total_videos":1,"average_duration":null}]"#;
        let _: () = redis::cmd("SET")
            .arg("video_statistics")
            .arg(sentinel)
            .query_async(&mut con)
            .await
            .unwrap();

        let response = context
            .client
            .post(format!("{}/videos/import", context.base_url))
            .bearer_auth(&token)
            .send()
            .await
            .unwrap();
        assert_eq!(response.status().as_u16(), 204);

        // The worker polls every few seconds; give the import time to land.
        let mut cleared = false;
        for _ in 0..40 {
            tokio::time::sleep(Duration::from_millis(500)).await;
            let cached: Option<String> = redis::cmd("GET")
                .arg("video_statistics")
                .query_async(&mut con)
                .await
                .unwrap();
            if cached.is_none() {
                cleared = true;
                break;
            }
        }
        assert!(
            cleared,
            "import completion should drop the cached statistics"
        );
    }

    #[tokio::test]
    #[ignore = "requires a running server with a seeded admin user"]
    async fn test_stats_are_recomputed_and_then_cached() {
        setup().await;
        let context = TestContext::new();
        let token = context.login().await;

        let first = context
            .client
            .get(format!("{}/videos/stats", context.base_url))
            .bearer_auth(&token)
            .send()
            .await
            .unwrap();
        assert_eq!(first.status().as_u16(), 200);
        let first_body: Value = first.json().await.unwrap();

        // A non-empty result must now sit in the cache; an empty one is
        // deliberately never cached.
        let mut con = get_redis_conn().await;
        let cached: Option<String> = redis::cmd("GET")
            .arg("video_statistics")
            .query_async(&mut con)
            .await
            .unwrap();
        assert_eq!(cached.is_some(), !first_body.as_array().unwrap().is_empty());

        let second = context
            .client
            .get(format!("{}/videos/stats", context.base_url))
            .bearer_auth(&token)
            .send()
            .await
            .unwrap();
        assert_eq!(second.status().as_u16(), 200);
        let second_body: Value = second.json().await.unwrap();
        assert_eq!(first_body, second_body);
    }

    #[tokio::test]
    #[ignore = "requires a running server with a seeded admin user"]
    async fn test_non_uuid_video_id_gets_the_uniform_error_body() {
        let context = TestContext::new();
        let token = context.login().await;

        let response = context
            .client
            .get(format!("{}/videos/not-a-uuid", context.base_url))
            .bearer_auth(&token)
            .send()
            .await
            .unwrap();

        assert_eq!(response.status().as_u16(), 400);
        let body: Value = response.json().await.unwrap();
        assert_eq!(body["error"], "BAD_REQUEST");
        assert_eq!(body["message"], "Invalid path parameter");
        assert!(body["timestamp"].is_string());
    }
}
