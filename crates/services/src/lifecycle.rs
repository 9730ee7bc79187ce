//! # Post Lifecycle Engine
//!
//! The state machine behind every post status change. Pure: callers feed
//! the current status and an event, and get back either the transition to
//! apply (with its compare-and-set precondition) or an idempotent no-op.
//!
//! Nothing else in the system writes `status` or `published_at`.

use domains::{AppError, PostStatus, Result};

/// A status-changing event, after authorization has already passed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Event {
    /// Bot-initiated hand-off of a draft. The trusted + can-publish
    /// conjunction decides whether review is skipped.
    Submit { trusted: bool, can_publish: bool },
    /// Owner-initiated publication.
    Publish,
    /// Owner approval of a pending post (session or bot credential).
    Approve,
    /// Owner rejection; archives the post.
    Reject,
    /// Owner archival.
    Archive,
}

/// What the engine decided.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// Move to `to`, but only while the stored status is still one of
    /// `from` — the gateway applies this as a conditional update so two
    /// concurrent approvals cannot both stamp `published_at`.
    Apply {
        from: &'static [PostStatus],
        to: PostStatus,
        stamp_published: bool,
    },
    /// The post is already where this event would take it. Success, not an
    /// error: retried approvals from unreliable clients must not fail.
    AlreadyDone { status: PostStatus },
}

const FROM_DRAFT: &[PostStatus] = &[PostStatus::Draft];
const FROM_REVIEWABLE: &[PostStatus] = &[PostStatus::Draft, PostStatus::PendingReview];
const FROM_NON_TERMINAL: &[PostStatus] = &[
    PostStatus::Draft,
    PostStatus::PendingReview,
    PostStatus::Published,
];

/// Decide the transition for `event` from `current`.
pub fn transition(current: PostStatus, event: Event) -> Result<Outcome> {
    match event {
        Event::Submit {
            trusted,
            can_publish,
        } => {
            if current != PostStatus::Draft {
                return Err(AppError::InvalidTransition(
                    "only drafts can be submitted for review".into(),
                ));
            }
            if trusted && can_publish {
                Ok(Outcome::Apply {
                    from: FROM_DRAFT,
                    to: PostStatus::Published,
                    stamp_published: true,
                })
            } else {
                Ok(Outcome::Apply {
                    from: FROM_DRAFT,
                    to: PostStatus::PendingReview,
                    stamp_published: false,
                })
            }
        }

        Event::Publish | Event::Approve => match current {
            PostStatus::Published => Ok(Outcome::AlreadyDone {
                status: PostStatus::Published,
            }),
            PostStatus::Archived => Err(AppError::InvalidTransition(
                "cannot publish an archived post".into(),
            )),
            PostStatus::Draft | PostStatus::PendingReview => Ok(Outcome::Apply {
                from: FROM_REVIEWABLE,
                to: PostStatus::Published,
                stamp_published: true,
            }),
        },

        Event::Reject => match current {
            PostStatus::Archived => Ok(Outcome::AlreadyDone {
                status: PostStatus::Archived,
            }),
            PostStatus::Published => Err(AppError::InvalidTransition(
                "cannot reject a published post".into(),
            )),
            PostStatus::Draft | PostStatus::PendingReview => Ok(Outcome::Apply {
                from: FROM_REVIEWABLE,
                to: PostStatus::Archived,
                stamp_published: false,
            }),
        },

        Event::Archive => match current {
            PostStatus::Archived => Ok(Outcome::AlreadyDone {
                status: PostStatus::Archived,
            }),
            _ => Ok(Outcome::Apply {
                from: FROM_NON_TERMINAL,
                to: PostStatus::Archived,
                stamp_published: false,
            }),
        },
    }
}

/// First ~200 characters of the body, recomputed whenever the body changes
/// before publication, never after.
pub fn excerpt_of(body: &str) -> String {
    body.chars().take(200).collect()
}
