mod google;
mod traits;

pub use google::{GoogleProvider, BUSINESS_MANAGE_SCOPE};
pub use traits::{OAuthProvider, TokenSet};
