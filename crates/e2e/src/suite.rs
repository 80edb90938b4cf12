//! The blog app scenarios

use crate::api::{admin, fullstack_blog, jest_blog, playwright_blog, second_user};
use crate::helpers::{create_blog, login, logout};
use crate::locator::Locator;
use crate::page::Page;
use crate::scenario::Scenario;

/// CSS class of a rendered blog entry
pub const BLOG_ROW: &str = ".always-visible";

/// Every scenario, in run order
pub fn blog_app_suite() -> Vec<Scenario> {
    vec![
        login_form_is_shown(),
        login_succeeds_with_correct_credentials(),
        login_fails_with_wrong_credentials(),
        a_new_blog_can_be_created(),
        a_blog_can_be_liked(),
        a_blog_can_be_deleted(),
        only_the_creator_sees_the_remove_button(),
        blogs_are_ordered_by_likes(),
    ]
}

fn base(name: &str) -> Scenario {
    Scenario::new(format!("Blog app › {}", name)).user(admin())
}

/// Scenario that starts with the admin already logged in.
fn logged_in(name: &str) -> (Scenario, Page) {
    let scenario = Scenario::new(format!("Blog app › When logged in › {}", name)).user(admin());
    let mut page = Page::new();
    let user = admin();
    login(&mut page, &user.username, &user.password);
    (scenario, page)
}

pub fn login_form_is_shown() -> Scenario {
    let mut page = Page::new();
    page.expect_visible(Locator::text("username"))
        .expect_visible(Locator::placeholder("username"))
        .expect_visible(Locator::text("password"))
        .expect_visible(Locator::placeholder("********"))
        .expect_visible(Locator::button("Login"));

    base("Login form is shown")
        .describe("The front page shows the login form")
        .tag("login")
        .tag("smoke")
        .steps(page)
}

pub fn login_succeeds_with_correct_credentials() -> Scenario {
    let user = admin();
    let mut page = Page::new();
    page.fill(Locator::test_id("username"), &user.username)
        .fill(Locator::test_id("password"), &user.password)
        .click(Locator::button("Login"))
        .expect_visible(Locator::exact_text(format!("{} logged in", user.name)));

    base("Login › succeeds with correct credentials")
        .tag("login")
        .tag("smoke")
        .steps(page)
}

pub fn login_fails_with_wrong_credentials() -> Scenario {
    let mut page = Page::new();
    page.fill(Locator::test_id("username"), "addmin")
        .fill(Locator::test_id("password"), "addmin--tester")
        .click(Locator::button("Login"))
        .expect_visible(Locator::text("invalid username or password"))
        .expect_hidden(Locator::text("logged in"))
        .expect_hidden(Locator::button("Log out"));

    base("Login › fails with wrong credentials")
        .tag("login")
        .steps(page)
}

pub fn a_new_blog_can_be_created() -> Scenario {
    let (scenario, mut page) = logged_in("a new blog can be created");
    let blog = playwright_blog();
    create_blog(&mut page, &blog);
    page.expect_visible(Locator::text(blog.summary()));

    scenario.tag("blogs").tag("smoke").steps(page)
}

pub fn a_blog_can_be_liked() -> Scenario {
    let (scenario, mut page) = logged_in("a blog can be liked");
    create_blog(&mut page, &playwright_blog());
    page.click(Locator::button("view"))
        .click(Locator::button("like"))
        .expect_visible(Locator::text("1"));

    scenario.tag("blogs").steps(page)
}

pub fn a_blog_can_be_deleted() -> Scenario {
    let (scenario, mut page) = logged_in("a blog can be deleted");
    let blog = playwright_blog();
    create_blog(&mut page, &blog);
    // The handler must exist before the confirm() fires.
    page.click(Locator::button("view"))
        .accept_dialogs()
        .click(Locator::button("remove"))
        .expect_hidden(Locator::text(blog.summary()))
        .expect_count(Locator::css(BLOG_ROW), 0);

    scenario.tag("blogs").steps(page)
}

pub fn only_the_creator_sees_the_remove_button() -> Scenario {
    let (scenario, mut page) = logged_in("only the user who added the blog sees the blog's delete button");
    let other = second_user();
    create_blog(&mut page, &playwright_blog());
    page.click(Locator::button("view"))
        .expect_visible(Locator::button("remove"));

    logout(&mut page);
    login(&mut page, &other.username, &other.password);

    page.click(Locator::button("view"))
        .expect_hidden(Locator::button("remove"));

    scenario.user(other).tag("blogs").tag("authorization").steps(page)
}

pub fn blogs_are_ordered_by_likes() -> Scenario {
    let (scenario, mut page) = logged_in(
        "blogs are arranged in the order according to the likes, the blog with the most likes first",
    );
    let blogs = [playwright_blog(), jest_blog(), fullstack_blog()];
    for blog in &blogs {
        create_blog(&mut page, blog);
        page.expect_visible(Locator::text(blog.summary()));
    }

    let row = |i: usize| Locator::css(BLOG_ROW).nth(i);

    // Liking the top entry never moves it, so indices stay stable.
    page.click(row(0).and_button("view"));
    for likes in 1..=2 {
        page.click(row(0).and_button("like"))
            .expect_text(row(0), likes.to_string());
    }

    page.click(row(1).and_button("view"))
        .click(row(1).and_button("like"))
        .expect_text(row(1), "1");

    page.click(row(2).and_button("view"));

    for (i, (blog, likes)) in blogs.iter().zip(["2", "1", "0"]).enumerate() {
        page.expect_text(row(i), &blog.title)
            .expect_visible(row(i).and_text(likes));
    }

    scenario.tag("blogs").tag("ordering").steps(page)
}
