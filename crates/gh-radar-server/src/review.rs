//! Review generation and comment formatting
//!
//! Review content is an external concern: the service only needs *a* review
//! body for the changed files. The `ReviewGenerator` trait keeps that
//! pluggable; the default implementation returns a canned message nudging the
//! author toward test coverage.

use async_trait::async_trait;
use gh_radar_client::ChangedFile;
use minijinja::{context, Environment};

/// Produces a review body for a set of changed files.
#[async_trait]
pub trait ReviewGenerator: Send + Sync {
    async fn generate_review(&self, files: &[ChangedFile]) -> anyhow::Result<String>;
}

/// The built-in generator: ignores the files and returns a fixed message.
pub struct CannedReviewGenerator;

#[async_trait]
impl ReviewGenerator for CannedReviewGenerator {
    async fn generate_review(&self, _files: &[ChangedFile]) -> anyhow::Result<String> {
        Ok(CANNED_REVIEW.to_string())
    }
}

const CANNED_REVIEW: &str = r#"Hey there! 👋 I'm your friendly neighborhood code review bot, and I couldn't help but notice something...

WHERE ARE THE TESTS?! 😱

Listen, I don't want to get all dramatic here, but do you know what happens to code without tests? BAD THINGS. Very bad things. Like:
- Production servers crying themselves to sleep 😢
- Bugs multiplying faster than rabbits on energy drinks 🐰⚡
- Senior developers having existential crises at 3 AM 😵

Could you please add some tests? Pretty please? With error handling on top?

If not... well... I know where your code lives, and I have a very particular set of skills. Skills that make me a nightmare for untested code. 🦾

Just kidding! (mostly) 😅

But seriously, let's get some test coverage going! Your future self will thank you, and I'll stop having these dramatic episodes.

With love and mild threats,
Your Test Coverage Bot 🤖❤️"#;

const COMMENT_TEMPLATE: &str = "\
Hi @{{ username }}! 👋

{{ review }}

---
_This comment was posted automatically after a look at the changed files._";

/// Render the comment posted to the pull request.
pub fn format_comment(username: &str, review: &str) -> anyhow::Result<String> {
    let mut env = Environment::new();
    env.add_template("comment", COMMENT_TEMPLATE)?;
    let template = env.get_template("comment")?;
    let rendered = template.render(context! { username, review })?;
    Ok(rendered)
}
