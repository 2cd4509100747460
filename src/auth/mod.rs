pub mod dto;
pub mod extractors;
pub mod handlers;
pub mod password;
pub mod repo;
pub mod repo_types;
pub mod session;

pub use extractors::{AuthContext, CurrentUser};
pub use repo::UserStore;
pub use repo_types::User;
pub use session::{SessionCodec, SESSION_COOKIE};
