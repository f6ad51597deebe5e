//! Content submission: local validation, one POST, outcome reporting.
//!
//! Validation failures never reach the network or the notification
//! bridge; they are shown inline on the form.

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use moddash_proto::config::SubmissionConfig;
use moddash_proto::protocol::{NewPost, Post};

use crate::error::{HttpError, SubmitError, ValidationError};
use crate::gateway::Gateway;
use crate::notify::{NotificationBridge, NotificationEvent};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ContentCategory {
    #[default]
    General,
    News,
    Article,
    Blog,
    Review,
    Other,
}

impl ContentCategory {
    pub const ALL: [ContentCategory; 6] = [
        ContentCategory::General,
        ContentCategory::News,
        ContentCategory::Article,
        ContentCategory::Blog,
        ContentCategory::Review,
        ContentCategory::Other,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ContentCategory::General => "general",
            ContentCategory::News => "news",
            ContentCategory::Article => "article",
            ContentCategory::Blog => "blog",
            ContentCategory::Review => "review",
            ContentCategory::Other => "other",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            ContentCategory::General => "General",
            ContentCategory::News => "News",
            ContentCategory::Article => "Article",
            ContentCategory::Blog => "Blog Post",
            ContentCategory::Review => "Review",
            ContentCategory::Other => "Other",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|c| c.as_str() == s)
    }

    pub fn next(&self) -> Self {
        let idx = Self::ALL.iter().position(|c| c == self).unwrap_or(0);
        Self::ALL[(idx + 1) % Self::ALL.len()]
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubmissionForm {
    pub title: String,
    pub content: String,
    pub author: String,
    pub category: ContentCategory,
    pub server: String,
    default_category: ContentCategory,
}

impl SubmissionForm {
    pub fn new(config: &SubmissionConfig) -> Self {
        let default_category = ContentCategory::parse(&config.default_category).unwrap_or_default();
        Self {
            title: String::new(),
            content: String::new(),
            author: String::new(),
            category: default_category,
            server: config.default_server.clone(),
            default_category,
        }
    }

    /// The request body, or the first missing required field.
    pub fn validate(&self) -> Result<NewPost, ValidationError> {
        let required = [
            ("title", &self.title),
            ("content", &self.content),
            ("author", &self.author),
        ];
        if let Some((field, _)) = required.iter().find(|(_, v)| v.trim().is_empty()) {
            return Err(ValidationError::MissingField { field: *field });
        }
        Ok(NewPost {
            title: self.title.trim().to_string(),
            content: self.content.trim().to_string(),
            author: self.author.trim().to_string(),
            category: self.category.as_str().to_string(),
            server: self.server.clone(),
        })
    }

    /// Clear the inputs; the target server is kept.
    pub fn reset(&mut self) {
        self.title.clear();
        self.content.clear();
        self.author.clear();
        self.category = self.default_category;
    }
}

impl Default for SubmissionForm {
    fn default() -> Self {
        Self::new(&SubmissionConfig::default())
    }
}

/// Validate, then POST.  An invalid form makes no request.
///
/// One-shot entry point for callers without a [`SyncHub`]; the hub goes
/// through [`Submission::begin`] and its dispatcher instead.
///
/// [`SyncHub`]: crate::hub::SyncHub
pub async fn submit(gateway: &Gateway, form: &SubmissionForm) -> Result<Post, SubmitError> {
    let body = form.validate()?;
    Ok(gateway.create_post(&body).await?)
}

/// Submission flow state for the form view.
#[derive(Debug, Default)]
pub struct Submission {
    pub form: SubmissionForm,
    in_flight: bool,
    inline_error: Option<String>,
}

impl Submission {
    pub fn new(config: &SubmissionConfig) -> Self {
        Self {
            form: SubmissionForm::new(config),
            in_flight: false,
            inline_error: None,
        }
    }

    pub fn is_submitting(&self) -> bool {
        self.in_flight
    }

    pub fn inline_error(&self) -> Option<&str> {
        self.inline_error.as_deref()
    }

    /// Validate and mark the submission in flight.  The caller sends the
    /// returned body and reports back through [`Submission::finish`].
    pub fn begin(&mut self) -> Result<NewPost, ValidationError> {
        if self.in_flight {
            return Err(ValidationError::InFlight);
        }
        match self.form.validate() {
            Ok(body) => {
                self.inline_error = None;
                self.in_flight = true;
                Ok(body)
            }
            Err(err) => {
                self.inline_error = Some(err.inline_message().to_string());
                Err(err)
            }
        }
    }

    /// Record the POST outcome.  Returns the created item on success.
    pub fn finish(
        &mut self,
        outcome: Result<Post, HttpError>,
        notifications: &mut NotificationBridge,
    ) -> Option<Post> {
        if !self.in_flight {
            warn!("[submit] outcome with no submission in flight, ignored");
            return None;
        }
        self.in_flight = false;
        match outcome {
            Ok(post) => {
                info!("[submit] created {} ({:?})", post.id, post.title);
                self.form.reset();
                self.inline_error = None;
                notifications.enqueue(
                    NotificationEvent::success("Content Submitted")
                        .with_message("Your content has been submitted for moderation."),
                );
                Some(post)
            }
            Err(err) => {
                warn!("[submit] failed: {}", err);
                self.inline_error = Some("Failed to submit content. Please try again.".to_string());
                notifications.enqueue(
                    NotificationEvent::error("Submission failed").with_message(err.summary()),
                );
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use chrono::Utc;
    use moddash_proto::protocol::PostStatus;

    use super::*;

    fn filled() -> SubmissionForm {
        let mut form = SubmissionForm::default();
        form.title = "  Launch notes ".into();
        form.content = "Body".into();
        form.author = "sam".into();
        form.category = ContentCategory::News;
        form
    }

    fn created() -> Post {
        Post {
            id: "99".into(),
            title: "Launch notes".into(),
            content: "Body".into(),
            author: "sam".into(),
            status: PostStatus::Pending,
            server: "server1".into(),
            worker: None,
            moderation_details: None,
            created_at: Utc::now(),
            completed_at: None,
            toxicity_score: None,
            review_reason: None,
            category: Some("news".into()),
            processing_time: None,
        }
    }

    #[test]
    fn test_validate_trims_and_fills_defaults() {
        let body = filled().validate().unwrap();
        assert_eq!(body.title, "Launch notes");
        assert_eq!(body.category, "news");
        assert_eq!(body.server, "server1");
    }

    #[test]
    fn test_whitespace_title_is_missing() {
        let mut form = filled();
        form.title = "   ".into();
        assert_eq!(
            form.validate(),
            Err(ValidationError::MissingField { field: "title" })
        );
    }

    #[test]
    fn test_invalid_form_is_inline_only() {
        let mut notes = NotificationBridge::default();
        let mut sub = Submission::default();
        sub.form.content = "text".into();
        assert!(sub.begin().is_err());
        assert!(!sub.is_submitting());
        assert_eq!(sub.inline_error(), Some("Please fill in all required fields"));
        assert!(sub.finish(Ok(created()), &mut notes).is_none());
        assert!(notes.is_empty());
    }

    #[test]
    fn test_success_resets_form_and_notifies() {
        let mut notes = NotificationBridge::default();
        let mut sub = Submission::default();
        sub.form = filled();
        sub.begin().unwrap();
        assert!(sub.is_submitting());
        assert_eq!(sub.begin(), Err(ValidationError::InFlight));

        let post = sub.finish(Ok(created()), &mut notes).unwrap();
        assert_eq!(post.id, "99");
        assert!(sub.form.title.is_empty());
        assert_eq!(sub.form.category, ContentCategory::General);
        let shown: Vec<&str> = notes.visible().map(|n| n.event.title.as_str()).collect();
        assert_eq!(shown, vec!["Content Submitted"]);
    }

    #[test]
    fn test_http_failure_keeps_input() {
        let mut notes = NotificationBridge::default();
        let mut sub = Submission::default();
        sub.form = filled();
        sub.begin().unwrap();
        let err = HttpError::Status {
            status: 500,
            status_text: "Internal Server Error".into(),
        };
        assert!(sub.finish(Err(err), &mut notes).is_none());
        assert_eq!(sub.form.author, "sam");
        assert!(sub.inline_error().is_some());
        assert_eq!(notes.len(), 1);
    }

    #[test]
    fn test_category_cycle_wraps() {
        assert_eq!(ContentCategory::Other.next(), ContentCategory::General);
        assert_eq!(ContentCategory::parse("blog"), Some(ContentCategory::Blog));
    }
}
