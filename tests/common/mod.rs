//! Common test utilities for E2E tests

use chrono::{Duration, Utc};
use studiopay::auth::{Session, create_session_token};
use studiopay::data::ReviewStatus;
use studiopay::{AppState, config};
use tempfile::TempDir;
use tokio::net::TcpListener;

pub const ADMIN_EMAIL: &str = "admin@test.example.com";
pub const SESSION_SECRET: &str = "test-secret-key-32-bytes-long!!!";

/// Test server instance
pub struct TestServer {
    pub addr: String,
    pub state: AppState,
    pub _temp_dir: TempDir,
    pub client: reqwest::Client,
}

impl TestServer {
    /// Create a new test server instance
    pub async fn new() -> Self {
        // Create temporary directory for test database
        let temp_dir = TempDir::new().unwrap();
        let db_path = temp_dir.path().join("test.db");

        // Create test configuration
        let config = config::AppConfig {
            server: config::ServerConfig {
                host: "127.0.0.1".to_string(),
                port: 0, // Let OS assign port
                domain: "localhost".to_string(),
                protocol: "http".to_string(),
            },
            database: config::DatabaseConfig {
                path: db_path.clone(),
            },
            auth: config::AuthConfig {
                session_secret: SESSION_SECRET.to_string(),
                session_max_age: 604800,
                admin_emails: vec![ADMIN_EMAIL.to_string()],
                google: config::GoogleOAuthConfig {
                    client_id: "test-client-id".to_string(),
                    client_secret: "test-client-secret".to_string(),
                },
            },
            payout: config::PayoutConfig {
                minimum_withdrawal: 500.0,
                default_earnings_per_view: 0.0001,
                region: config::BankRegion::Ifsc,
            },
            logging: config::LoggingConfig {
                level: "info".to_string(),
                format: "pretty".to_string(),
            },
        };

        // Initialize app state
        let state = AppState::new(config.clone()).await.unwrap();

        // Create HTTP client (redirects disabled so auth flows can be asserted)
        let client = reqwest::Client::builder()
            .redirect(reqwest::redirect::Policy::none())
            .timeout(std::time::Duration::from_secs(10))
            .build()
            .unwrap();

        // Bind to random port
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let addr_str = format!("http://{}", addr);

        // Build router
        let app = studiopay::build_router(state.clone());

        // Spawn server in background
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        // Wait a bit for server to start
        tokio::time::sleep(tokio::time::Duration::from_millis(100)).await;

        Self {
            addr: addr_str,
            state,
            _temp_dir: temp_dir,
            client,
        }
    }

    /// Get base URL for API requests
    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.addr, path)
    }

    /// Sign a user in directly: create/refresh the profile the way the
    /// OAuth callback does, and mint a session token.
    pub async fn login(&self, user_id: &str, email: &str) -> String {
        let is_admin = self.state.config.auth.is_admin_email(email);
        self.state
            .db
            .upsert_profile_on_login(user_id, email, Some("Test User"), is_admin)
            .await
            .unwrap();

        let now = Utc::now();
        let session = Session {
            user_id: user_id.to_string(),
            email: email.to_string(),
            name: Some("Test User".to_string()),
            created_at: now,
            expires_at: now + Duration::days(7),
        };
        create_session_token(&session, SESSION_SECRET).unwrap()
    }

    /// Sign the configured admin in
    pub async fn login_admin(&self) -> String {
        self.login("admin-user", ADMIN_EMAIL).await
    }

    /// Give a user an earnings balance through the accrual path:
    /// approved short, then a metrics edit at rate 1.0.
    pub async fn seed_balance(&self, user_id: &str, amount: f64) {
        use studiopay::data::{EntityId, ShortSubmission};

        let short = ShortSubmission {
            id: EntityId::new().0,
            user_id: user_id.to_string(),
            shorts_url: "https://youtube.com/shorts/seed".to_string(),
            title: None,
            status: "pending".to_string(),
            views_count: 0,
            credited_views: 0,
            earnings_per_view: 1.0,
            admin_remarks: None,
            submitted_at: Utc::now(),
            reviewed_at: None,
            reviewed_by: None,
        };
        self.state.db.insert_short(&short).await.unwrap();
        self.state
            .db
            .review_short(&short.id, ReviewStatus::Approved, None, "seed-admin")
            .await
            .unwrap();
        self.state
            .db
            .update_short_metrics(&short.id, amount as i64, 1.0)
            .await
            .unwrap();
    }
}
