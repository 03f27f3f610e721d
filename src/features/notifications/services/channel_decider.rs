use serde::Serialize;
use utoipa::ToSchema;

/// A delivery channel the decider can select. Delivery itself is the
/// dispatcher's job; this core only picks the set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum NotificationChannel {
    InApp,
    Email,
}

impl NotificationChannel {
    pub fn as_str(&self) -> &'static str {
        match self {
            NotificationChannel::InApp => "in_app",
            NotificationChannel::Email => "email",
        }
    }
}

/// Per-(thread, recipient) burst state.
///
/// A burst is a run of unread messages since the recipient last marked the
/// thread read. The first message of a burst gets an email on top of the
/// in-app badge; every later message in the same burst stays in-app only, so
/// rapid-fire conversations do not turn into email spam. Reading the thread
/// closes the burst and re-arms the email.
///
/// The state is never stored: it is derived from the recipient's unread count
/// at decision time, which makes the decision idempotent under retry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BurstState {
    /// No unread messages; the next inbound message opens a burst
    Clean,
    /// At least one unread message; the burst email has already been sent
    BurstOpen,
}

impl BurstState {
    /// Derive the state from the recipient's unread count immediately before
    /// the message being decided. Callers working from the store's
    /// post-insert count subtract the message itself first.
    pub fn from_unread(unread_before: i64) -> Self {
        if unread_before <= 0 {
            BurstState::Clean
        } else {
            BurstState::BurstOpen
        }
    }

    /// Transition for an inbound message from the counterpart. Returns the
    /// next state and the channels this message fires on.
    pub fn on_message(self) -> (BurstState, Vec<NotificationChannel>) {
        match self {
            BurstState::Clean => (
                BurstState::BurstOpen,
                vec![NotificationChannel::InApp, NotificationChannel::Email],
            ),
            BurstState::BurstOpen => (BurstState::BurstOpen, vec![NotificationChannel::InApp]),
        }
    }

    /// Transition for the recipient marking the thread read
    pub fn on_read(self) -> BurstState {
        BurstState::Clean
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_message_into_a_clean_thread_carries_email() {
        let (next, channels) = BurstState::Clean.on_message();
        assert_eq!(next, BurstState::BurstOpen);
        assert_eq!(
            channels,
            vec![NotificationChannel::InApp, NotificationChannel::Email]
        );
    }

    #[test]
    fn followups_inside_an_open_burst_stay_in_app_only() {
        let (next, channels) = BurstState::BurstOpen.on_message();
        assert_eq!(next, BurstState::BurstOpen);
        assert_eq!(channels, vec![NotificationChannel::InApp]);
    }

    #[test]
    fn reading_closes_the_burst_and_rearms_email() {
        // msg 1 → email, msg 2 → badge only, read, msg 3 → email again
        let (state, first) = BurstState::Clean.on_message();
        let (state, second) = state.on_message();
        let state = state.on_read();
        let (_, third) = state.on_message();

        assert!(first.contains(&NotificationChannel::Email));
        assert!(!second.contains(&NotificationChannel::Email));
        assert!(third.contains(&NotificationChannel::Email));
    }

    #[test]
    fn state_derives_from_the_pre_message_unread_count() {
        assert_eq!(BurstState::from_unread(0), BurstState::Clean);
        assert_eq!(BurstState::from_unread(1), BurstState::BurstOpen);
        assert_eq!(BurstState::from_unread(7), BurstState::BurstOpen);
        // Serialized appends report the count including the new message;
        // subtracting it yields 0 for the burst opener
        assert_eq!(BurstState::from_unread(1 - 1), BurstState::Clean);
    }
}
