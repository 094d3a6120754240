/// Business logic layer
///
/// - `pagination`: page arithmetic and the `Page` result type
/// - `feed`: composes paginated feeds for a scope
/// - `follow`: the user → author follow graph
/// - `posts`: post creation, edit authorization, updates and deletion
/// - `comments`: comment creation and listing
pub mod comments;
pub mod feed;
pub mod follow;
pub mod pagination;
pub mod posts;

pub use comments::CommentService;
pub use feed::FeedService;
pub use follow::FollowService;
pub use pagination::{page_token, Page, Paginator, PAGE_SIZE};
pub use posts::{EditGrant, ImageUpload, PostService};
