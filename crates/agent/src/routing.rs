//! Routing controller — the single branching decision of the loop.

use roster_core::message::Role;
use roster_core::state::ConversationState;

/// Where control goes after a model turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Route {
    Tools,
    End,
}

/// Inspect the latest turn: a model turn requesting at least one tool routes
/// to [`Route::Tools`], anything else ends the invocation.
pub fn route(state: &ConversationState) -> Route {
    match state.last() {
        Some(turn) if turn.role == Role::Model && turn.requests_tools() => Route::Tools,
        _ => Route::End,
    }
}

/// Nodes of the agent graph.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Node {
    Agent,
    Tools,
    End,
}

impl Node {
    pub fn next(self, state: &ConversationState) -> Node {
        match self {
            Node::Agent => match route(state) {
                Route::Tools => Node::Tools,
                Route::End => Node::End,
            },
            Node::Tools => Node::Agent,
            Node::End => Node::End,
        }
    }

    pub fn is_terminal(self) -> bool {
        self == Node::End
    }
}
