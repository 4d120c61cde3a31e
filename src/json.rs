use serde_json::Value;

use crate::block::Block;
use crate::error::Result;
use crate::inline;
use crate::parser;
use crate::transcript::{Message, Role};

/// A block as JSON, with its inline spans under `spans` when it has any.
fn block_value(block: &Block) -> Result<Value> {
    let mut value = serde_json::to_value(block)?;
    if block.has_inline_content()
        && let Some(object) = value.as_object_mut()
    {
        let spans = serde_json::to_value(inline::render(block.content()))?;
        object.insert("spans".to_string(), spans);
    }
    Ok(value)
}

pub fn blocks_to_json(blocks: &[Block]) -> Result<Value> {
    let values = blocks.iter().map(block_value).collect::<Result<Vec<_>>>()?;
    Ok(Value::Array(values))
}

/// Agent messages get their parsed blocks; user messages stay as text.
pub fn transcript_to_json(messages: &[Message]) -> Result<Value> {
    let mut values = Vec::with_capacity(messages.len());
    for message in messages {
        let mut value = serde_json::to_value(message)?;
        if message.role == Role::Agent
            && let Some(object) = value.as_object_mut()
        {
            let blocks = blocks_to_json(&parser::parse(&message.text))?;
            object.insert("blocks".to_string(), blocks);
        }
        values.push(value);
    }
    Ok(Value::Array(values))
}
