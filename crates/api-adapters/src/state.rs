//! Shared handler state: one `Arc` per service, cheap to clone per
//! request.

use std::sync::Arc;

use services::bots::BotService;
use services::comments::CommentService;
use services::engagement::EngagementService;
use services::identity::IdentityResolver;
use services::posts::PostService;

use crate::metrics::HttpMetrics;

#[derive(Clone)]
pub struct AppState {
    pub identity: Arc<IdentityResolver>,
    pub posts: Arc<PostService>,
    pub bots: Arc<BotService>,
    pub comments: Arc<CommentService>,
    pub engagement: Arc<EngagementService>,
    pub metrics: Arc<HttpMetrics>,
}
