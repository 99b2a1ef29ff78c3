pub mod magic_link;
pub mod token_store;

pub use magic_link::{MagicLink, MagicLinkService};
pub use token_store::{start_cleanup_task, InMemoryTokenStore, TokenStore};
