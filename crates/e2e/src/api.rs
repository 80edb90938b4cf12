//! Backend setup over HTTP: state reset and user seeding

use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{E2eError, E2eResult};

pub const RESET_PATH: &str = "/api/testing/reset";
pub const USERS_PATH: &str = "/api/users";

/// User as accepted by `POST /api/users`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewUser {
    pub username: String,
    pub name: String,
    pub password: String,
}

impl NewUser {
    pub fn new(username: &str, name: &str, password: &str) -> Self {
        Self {
            username: username.to_string(),
            name: name.to_string(),
            password: password.to_string(),
        }
    }
}

/// Fields of the "new blog" form
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewBlog {
    pub title: String,
    pub author: String,
    pub url: String,
}

impl NewBlog {
    pub fn new(title: &str, author: &str, url: &str) -> Self {
        Self {
            title: title.to_string(),
            author: author.to_string(),
            url: url.to_string(),
        }
    }

    /// Text the blog list renders for a collapsed entry
    pub fn summary(&self) -> String {
        format!("{} {}", self.title, self.author)
    }
}

/// Thin client for the test-only endpoints of the backend
#[derive(Debug, Clone)]
pub struct ApiClient {
    http: reqwest::Client,
    base_url: String,
}

impl ApiClient {
    pub fn new(base_url: &str, timeout: Duration) -> E2eResult<Self> {
        let http = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Clear all users and blogs
    pub async fn reset(&self) -> E2eResult<()> {
        debug!("Resetting backend state");
        let resp = self
            .http
            .post(format!("{}{}", self.base_url, RESET_PATH))
            .send()
            .await?;
        check_status(RESET_PATH, resp).await
    }

    pub async fn create_user(&self, user: &NewUser) -> E2eResult<()> {
        debug!("Creating user '{}'", user.username);
        let resp = self
            .http
            .post(format!("{}{}", self.base_url, USERS_PATH))
            .json(user)
            .send()
            .await?;
        check_status(USERS_PATH, resp).await
    }
}

async fn check_status(endpoint: &str, resp: reqwest::Response) -> E2eResult<()> {
    let status = resp.status();
    if status.is_success() {
        return Ok(());
    }
    let body = resp.text().await.unwrap_or_default();
    Err(E2eError::Setup {
        endpoint: endpoint.to_string(),
        status: status.as_u16(),
        body,
    })
}

/// The account every scenario seeds
pub fn admin() -> NewUser {
    NewUser::new("admin", "Admin Tester", "admin-tester")
}

/// A second account, used to check what non-owners can see
pub fn second_user() -> NewUser {
    NewUser::new("tester", "Admin Tester", "new-tester")
}

pub fn playwright_blog() -> NewBlog {
    NewBlog::new(
        "End to end tests using Playwright",
        "Paul Aderoju",
        "https://www.paul-roju.me",
    )
}

pub fn jest_blog() -> NewBlog {
    NewBlog::new("Jest is also used", "Paul Aderoju", "https://www.jest-test.com")
}

pub fn fullstack_blog() -> NewBlog {
    NewBlog::new(
        "Uni Helsinki Fullstack rocks",
        "Paul Aderoju",
        "https://fullstackopen.com/",
    )
}
