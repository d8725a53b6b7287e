//! Domain events for the application.
//!
//! Events are published on the in-process event bus after a state change has been
//! committed. Subscribers include the SSE stream for connected clients and the
//! category allowlist cache.

use serde::Serialize;

/// Events sent to subscribers and connected clients via SSE (Server-Sent Events).
#[derive(Clone, Debug, Serialize, PartialEq, Eq)]
#[serde(tag = "type", content = "payload")]
pub enum SolvedEvent {
    AcceptedSolution {
        topic_id: i32,
        post_id: i32,
        accepter_id: i32,
    },
    UnacceptedSolution {
        topic_id: i32,
        post_id: i32,
    },

    /// Clients viewing the topic should re-fetch it.
    TopicReload {
        topic_id: i32,
    },

    TopicAutoClosed {
        topic_id: i32,
    },

    CategoryUpdated {
        category_id: i32,
    },
}

impl SolvedEvent {
    /// Event name used for webhooks and automation hooks.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::AcceptedSolution { .. } => "accepted_solution",
            Self::UnacceptedSolution { .. } => "unaccepted_solution",
            Self::TopicReload { .. } => "topic_reload",
            Self::TopicAutoClosed { .. } => "topic_auto_closed",
            Self::CategoryUpdated { .. } => "category_updated",
        }
    }

    #[must_use]
    pub const fn topic_id(&self) -> Option<i32> {
        match self {
            Self::AcceptedSolution { topic_id, .. }
            | Self::UnacceptedSolution { topic_id, .. }
            | Self::TopicReload { topic_id }
            | Self::TopicAutoClosed { topic_id } => Some(*topic_id),
            Self::CategoryUpdated { .. } => None,
        }
    }
}
