/// Caller-side facts the client needs but does not own
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ClientContext {
    /// Logged-in user; messages from this id raise no notification
    pub current_user_id: Option<i64>,
}

impl ClientContext {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_current_user(mut self, user_id: i64) -> Self {
        self.current_user_id = Some(user_id);
        self
    }

    /// An unknown sender or an unknown current user never counts as own
    pub fn is_own_message(&self, sender_id: Option<i64>) -> bool {
        matches!((sender_id, self.current_user_id), (Some(sender), Some(me)) if sender == me)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_own_message_detection() {
        let ctx = ClientContext::new().with_current_user(7);
        assert!(ctx.is_own_message(Some(7)));
        assert!(!ctx.is_own_message(Some(42)));
        assert!(!ctx.is_own_message(None));
        assert!(!ClientContext::new().is_own_message(Some(7)));
    }
}
