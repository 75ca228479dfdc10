pub mod gotify;

pub use gotify::{GotifyClient, GotifyMessage, Notifier};

#[cfg(test)]
pub use gotify::MockNotifier;
