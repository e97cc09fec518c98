//! Message inbox: admin-authored notices delivered to the traveler.
use chrono::{DateTime, Local, TimeZone};

use super::errors::JourneyError;
use super::types::{Message, MessagePriority};

pub const DEFAULT_SENDER: &str = "System Admin";

/// Display format for message timestamps, e.g. "Mar 4, 2026, 9:05 PM".
pub const TIMESTAMP_FORMAT: &str = "%b %-d, %Y, %-I:%M %p";

pub fn unread_count(messages: &[Message]) -> usize {
    messages.iter().filter(|m| !m.read).count()
}

pub fn next_message_id(messages: &[Message]) -> u32 {
    messages.iter().map(|m| m.id).max().unwrap_or(0) + 1
}

pub fn format_timestamp<Tz: TimeZone>(at: &DateTime<Tz>) -> String
where
    Tz::Offset: std::fmt::Display,
{
    at.format(TIMESTAMP_FORMAT).to_string()
}

/// Build a new unread message with the next free id, stamped now.
pub fn compose(
    messages: &[Message],
    title: &str,
    content: &str,
    priority: MessagePriority,
) -> Message {
    Message {
        id: next_message_id(messages),
        title: title.to_string(),
        content: content.to_string(),
        sender: DEFAULT_SENDER.to_string(),
        timestamp: format_timestamp(&Local::now()),
        read: false,
        priority,
    }
}

/// Open a message, marking it read. Returns a copy of the opened message.
pub fn open_message(messages: &mut [Message], id: u32) -> Result<Message, JourneyError> {
    let message = messages
        .iter_mut()
        .find(|m| m.id == id)
        .ok_or_else(|| JourneyError::NotFound(format!("message {}", id)))?;
    message.read = true;
    Ok(message.clone())
}

pub fn delete_message(messages: &mut Vec<Message>, id: u32) -> Result<Message, JourneyError> {
    let idx = messages
        .iter()
        .position(|m| m.id == id)
        .ok_or_else(|| JourneyError::NotFound(format!("message {}", id)))?;
    Ok(messages.remove(idx))
}

/// Mark everything read; returns how many changed.
pub fn mark_all_read(messages: &mut [Message]) -> usize {
    let mut changed = 0;
    for message in messages.iter_mut().filter(|m| !m.read) {
        message.read = true;
        changed += 1;
    }
    changed
}

pub fn format_inbox(messages: &[Message]) -> Vec<String> {
    if messages.is_empty() {
        return vec!["No messages.".to_string()];
    }
    let mut lines = vec![format!("Inbox ({} unread)", unread_count(messages))];
    for m in messages {
        let flag = if m.read { " " } else { "*" };
        let priority = match m.priority {
            MessagePriority::High => " !",
            _ => "",
        };
        lines.push(format!("{} {}. {}{} - {} ({})", flag, m.id, m.title, priority, m.sender, m.timestamp));
    }
    lines
}
