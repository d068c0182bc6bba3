//! Mock implementations for testing

mod plugin;
mod session;

pub use plugin::{MockDisseminator, MockIngester, PluginCall};
pub use session::{MOCK_HANDLE_PREFIX, MockSession, MockSessionProvider, SessionJournal};
