use murmure_shared::types::UserId;

/// Default text shown in place of a body that could not be decrypted.
/// The renderer may substitute its own localisation; raw error detail
/// never reaches the UI.
pub const UNDECRYPTABLE_PLACEHOLDER: &str = "[message could not be decrypted]";

/// Whether a rendered message was produced by the local user.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Sent,
    Received,
}

/// Decrypted body of one entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MessageBody {
    Text(String),
    /// The entry's payload failed to decode or decrypt. The rest of the
    /// snapshot is unaffected.
    Undecryptable,
}

impl MessageBody {
    pub fn display_text(&self) -> &str {
        match self {
            MessageBody::Text(text) => text,
            MessageBody::Undecryptable => UNDECRYPTABLE_PLACEHOLDER,
        }
    }
}

/// One element of the render list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MessageView {
    pub sender: UserId,
    pub body: MessageBody,
}

/// Sent/received split for one message.
///
/// Recomputed on every render pass and never cached on the view: the
/// local identity is stable for the process lifetime, but sender
/// equality must stay a comparison, not a stored fact.
pub fn classify(local_user: &UserId, view: &MessageView) -> Direction {
    if view.sender == *local_user {
        Direction::Sent
    } else {
        Direction::Received
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn view(sender: &str) -> MessageView {
        MessageView {
            sender: UserId::new(sender),
            body: MessageBody::Text("hi".into()),
        }
    }

    #[test]
    fn test_own_message_is_sent() {
        let me = UserId::new("u1");
        assert_eq!(classify(&me, &view("u1")), Direction::Sent);
    }

    #[test]
    fn test_counterpart_message_is_received() {
        let me = UserId::new("u1");
        assert_eq!(classify(&me, &view("u2")), Direction::Received);
    }

    #[test]
    fn test_foreign_sender_is_received() {
        let me = UserId::new("u1");
        assert_eq!(classify(&me, &view("never-seen-before")), Direction::Received);
        assert_eq!(classify(&me, &view("")), Direction::Received);
    }

    #[test]
    fn test_placeholder_for_undecryptable_body() {
        let body = MessageBody::Undecryptable;
        assert_eq!(body.display_text(), UNDECRYPTABLE_PLACEHOLDER);
    }
}
