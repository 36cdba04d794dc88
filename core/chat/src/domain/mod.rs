//! chat 固有のドメイン型（型と不変条件）

pub mod command;
pub mod conversation;
pub mod message;
pub mod stream_session;
pub mod transcript;
pub mod transcript_reducer;

pub use command::{ChatCommand, SendOptions};
pub use conversation::ConversationRef;
pub use message::{AssistantReply, Message, Role};
pub use stream_session::{SessionId, SessionState, StreamSession, DONE_SENTINEL};
pub use transcript::Transcript;
pub use transcript_reducer::{reduce, TranscriptEvent};
