//! Resource kinds served by almanac

pub mod event;
pub mod session;
pub mod token;
pub mod user;

pub use event::{Event, EventFactory};
pub use session::SessionAuthenticator;
pub use token::{Token, TokenFactory};
pub use user::{PasswordChange, User, UserFactory};
