//! Transient user feedback.
//!
//! The channel holds at most one error and one success message. A new
//! message of either kind replaces the previous one. Success messages expire
//! on their own; errors stay until the next user action clears them.

use std::time::Duration;

use tokio::time::Instant;

/// Default lifetime of a success message.
pub const DEFAULT_SUCCESS_DURATION: Duration = Duration::from_secs(3);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotificationKind {
    Error,
    Success,
}

impl NotificationKind {
    pub fn icon(&self) -> &'static str {
        match self {
            NotificationKind::Error => "✗",
            NotificationKind::Success => "✓",
        }
    }
}

#[derive(Debug, Clone)]
pub struct Notification {
    pub message: String,
    pub kind: NotificationKind,
    created_at: Instant,
    /// `None` means it never expires.
    duration: Option<Duration>,
}

impl Notification {
    fn new(message: impl Into<String>, kind: NotificationKind, duration: Option<Duration>) -> Self {
        Self {
            message: message.into(),
            kind,
            created_at: Instant::now(),
            duration,
        }
    }

    pub fn is_expired(&self) -> bool {
        self.duration
            .is_some_and(|duration| self.created_at.elapsed() >= duration)
    }

    /// Time left before expiry; `None` for messages that persist.
    pub fn remaining(&self) -> Option<Duration> {
        self.duration
            .map(|duration| duration.saturating_sub(self.created_at.elapsed()))
    }
}

#[derive(Debug)]
pub struct NotificationChannel {
    error: Option<Notification>,
    success: Option<Notification>,
    success_duration: Duration,
}

impl Default for NotificationChannel {
    fn default() -> Self {
        Self::new(DEFAULT_SUCCESS_DURATION)
    }
}

impl NotificationChannel {
    pub fn new(success_duration: Duration) -> Self {
        Self {
            error: None,
            success: None,
            success_duration,
        }
    }

    /// Replace the current error.
    pub fn error(&mut self, message: impl Into<String>) {
        self.error = Some(Notification::new(message, NotificationKind::Error, None));
    }

    /// Replace the current success message.
    pub fn success(&mut self, message: impl Into<String>) {
        self.success = Some(Notification::new(
            message,
            NotificationKind::Success,
            Some(self.success_duration),
        ));
    }

    pub fn error_message(&self) -> Option<&str> {
        self.error.as_ref().map(|n| n.message.as_str())
    }

    pub fn success_message(&self) -> Option<&str> {
        self.success.as_ref().map(|n| n.message.as_str())
    }

    pub fn clear_error(&mut self) {
        self.error = None;
    }

    pub fn clear(&mut self) {
        self.error = None;
        self.success = None;
    }

    /// Drop expired messages. Call on every tick.
    pub fn tick(&mut self) {
        if self.success.as_ref().is_some_and(Notification::is_expired) {
            self.success = None;
        }
    }

    pub fn is_empty(&self) -> bool {
        self.error.is_none() && self.success.is_none()
    }

    /// Active messages, error first.
    pub fn iter(&self) -> impl Iterator<Item = &Notification> {
        self.error.iter().chain(self.success.iter())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test(start_paused = true)]
    async fn test_success_expires() {
        let mut channel = NotificationChannel::new(Duration::from_secs(3));
        channel.success("Curso criado com sucesso!");

        tokio::time::advance(Duration::from_millis(2900)).await;
        channel.tick();
        assert_eq!(channel.success_message(), Some("Curso criado com sucesso!"));

        tokio::time::advance(Duration::from_millis(200)).await;
        channel.tick();
        assert_eq!(channel.success_message(), None);
    }

    #[tokio::test(start_paused = true)]
    async fn test_error_persists_until_cleared() {
        let mut channel = NotificationChannel::default();
        channel.error("Erro ao carregar cursos");

        tokio::time::advance(Duration::from_secs(60)).await;
        channel.tick();
        assert_eq!(channel.error_message(), Some("Erro ao carregar cursos"));

        channel.clear_error();
        assert!(channel.is_empty());
    }

    #[test]
    fn test_one_message_per_kind() {
        let mut channel = NotificationChannel::default();
        channel.error("primeiro");
        channel.error("segundo");
        channel.success("ok");

        let messages: Vec<&str> = channel.iter().map(|n| n.message.as_str()).collect();
        assert_eq!(messages, vec!["segundo", "ok"]);
    }

    #[test]
    fn test_icons() {
        assert_eq!(NotificationKind::Error.icon(), "✗");
        assert_eq!(NotificationKind::Success.icon(), "✓");
    }
}
