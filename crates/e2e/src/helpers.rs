//! Reusable interaction sequences shared by scenarios
//!
//! Helpers only record interactions. They never assert: a failed login or a
//! rejected blog shows up in whatever the calling scenario checks next.

use crate::api::NewBlog;
use crate::locator::Locator;
use crate::page::{Page, WaitState};

/// Open the login form and submit credentials.
pub fn login(page: &mut Page, username: &str, password: &str) {
    page.click(Locator::button("Login"))
        .fill(Locator::test_id("username"), username)
        .fill(Locator::test_id("password"), password)
        .click(Locator::button("login"));
}

/// Open the "new blog" form, fill every field and submit.
pub fn create_blog(page: &mut Page, blog: &NewBlog) {
    page.click(Locator::button("new blog"))
        .fill(Locator::test_id("title"), &blog.title)
        .fill(Locator::test_id("author"), &blog.author)
        .fill(Locator::test_id("url"), &blog.url)
        .click(Locator::button("create"));
}

/// Log out and wait until the login button is back.
pub fn logout(page: &mut Page) {
    page.wait_for(Locator::button("Log out"), WaitState::Visible)
        .click(Locator::button("Log out"))
        .wait_for(Locator::button("Login"), WaitState::Visible);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::playwright_blog;
    use crate::page::Step;

    #[test]
    fn test_login_sequence() {
        let mut page = Page::new();
        login(&mut page, "admin", "admin-tester");

        assert_eq!(
            page.steps(),
            &[
                Step::Click { target: Locator::button("Login") },
                Step::Fill { target: Locator::test_id("username"), value: "admin".into() },
                Step::Fill { target: Locator::test_id("password"), value: "admin-tester".into() },
                Step::Click { target: Locator::button("login") },
            ]
        );
    }

    #[test]
    fn test_create_blog_fills_all_fields_then_submits() {
        let mut page = Page::new();
        create_blog(&mut page, &playwright_blog());

        let steps = page.into_steps();
        assert_eq!(steps.len(), 5);
        assert_eq!(steps[0], Step::Click { target: Locator::button("new blog") });
        assert_eq!(
            steps[3],
            Step::Fill {
                target: Locator::test_id("url"),
                value: "https://www.paul-roju.me".into()
            }
        );
        assert_eq!(steps[4], Step::Click { target: Locator::button("create") });
    }

    #[test]
    fn test_logout_clicks_once() {
        let mut page = Page::new();
        logout(&mut page);

        let clicks = page
            .steps()
            .iter()
            .filter(|s| matches!(s, Step::Click { .. }))
            .count();
        assert_eq!(clicks, 1);
    }
}
