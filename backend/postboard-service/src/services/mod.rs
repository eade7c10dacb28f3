/// Business logic layer
///
/// Services own authorization and validation; repositories only persist.
pub mod comments;
pub mod likes;
pub mod post_view;
pub mod posts;
pub mod profiles;
pub mod threads;

pub use comments::CommentService;
pub use likes::LikeService;
pub use post_view::PostViewService;
pub use posts::{NewPostInput, PostChangesInput, PostService};
pub use profiles::{ProfileChangesInput, ProfileService};
pub use threads::ThreadBuilder;
