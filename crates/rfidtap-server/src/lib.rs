mod error;
mod listener;
mod observer;
mod session;

pub use error::{ServerError, SessionError};
pub use listener::{serve_one, Listener, ServeReport};
pub use observer::{ConsoleObserver, FrameObserver};
pub use session::{Session, SessionEnd, SessionSummary};
