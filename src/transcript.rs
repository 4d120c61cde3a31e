//! Chat transcripts: an ordered list of user and agent messages, as the
//! assistant screen keeps them. Agent messages carry markdown; user messages
//! are shown verbatim.

use serde::{Deserialize, Serialize};
use tracing::{debug, trace};

use crate::config::Config;
use crate::error::{Error, Result};
use crate::parser;
use crate::typst::{emit_blocks, escape_markup, preamble, rgb};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    #[serde(alias = "assistant")]
    Agent,
}

/// A single chat message. Unknown fields (tool calls and the like) are ignored.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct Message {
    pub role: Role,
    pub text: String,
    /// Milliseconds since the Unix epoch.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<u64>,
}

/// Parse a JSON array of messages.
pub fn parse_transcript(json: &str) -> Result<Vec<Message>> {
    let messages: Vec<Message> = serde_json::from_str(json).map_err(Error::Transcript)?;
    debug!(messages = messages.len(), "parsed transcript");
    Ok(messages)
}

/// Convert a transcript to Typst markup, one bubble per message.
pub fn transcript_to_typst(messages: &[Message], config: &Config) -> String {
    let colors = &config.colors;
    let mut out = preamble(config);

    for message in messages {
        match message.role {
            Role::User => {
                out.push_str(&format!(
                    "#align(right, block(fill: {}, radius: 12pt, inset: 10pt, text(fill: rgb(\"#FFFFFF\"))[",
                    rgb(&colors.primary)
                ));
                escape_markup(&message.text, &mut out);
                out.push_str("]))\n\n");
            }
            Role::Agent => {
                if message.text.trim().is_empty() {
                    trace!(timestamp = ?message.timestamp, "skipping empty agent message");
                    continue;
                }
                out.push_str(&format!(
                    "#block(fill: {}, radius: 12pt, inset: 10pt, width: 100%)[\n",
                    rgb(&colors.surface)
                ));
                emit_blocks(&parser::parse(&message.text), config, &mut out);
                out.push_str("]\n\n");
            }
        }
    }

    out
}
