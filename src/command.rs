//! Classification of inbound chat messages.
use thiserror::Error;

use crate::models::{Status, Topic};

pub const GREETING: &str = "Начать";
const REPLY_KEYWORD: &str = "ответ";
const STATUS_KEYWORD: &str = "статус";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Show the topic menu.
    Greeting,
    /// Open a new appeal on the chosen topic.
    SelectTopic(Topic),
    /// Manager answer: `Ответ <id> <text>`.
    Reply { appeal_id: i32, text: String },
    /// Manager status change: `Статус <id> <STATUS>`.
    SetStatus { appeal_id: i32, status: Status },
    /// Anything else: body text for the sender's pending appeal.
    FreeText(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CommandError {
    #[error("reply command must look like `Ответ <id> <text>`")]
    MalformedReply,
    #[error("unknown status keyword `{0}`")]
    UnknownStatus(String),
}

/// Rules are checked in order: greeting, topic choice, reply, status change,
/// free text. Only the reply and status commands can be malformed.
pub fn parse_message(text: &str) -> Result<Command, CommandError> {
    let trimmed = text.trim();

    if trimmed == GREETING {
        return Ok(Command::Greeting);
    }

    if trimmed.len() == 1 {
        if let Some(topic) = Topic::from_menu_choice(trimmed) {
            return Ok(Command::SelectTopic(topic));
        }
    }

    let (keyword, rest) = split_first_token(trimmed);

    if keyword.to_lowercase() == REPLY_KEYWORD {
        return parse_reply(rest);
    }

    if keyword.to_lowercase() == STATUS_KEYWORD {
        if let Some(command) = parse_status(rest)? {
            return Ok(command);
        }
    }

    Ok(Command::FreeText(trimmed.to_string()))
}

fn split_first_token(text: &str) -> (&str, &str) {
    match text.split_once(char::is_whitespace) {
        Some((head, tail)) => (head, tail.trim_start()),
        None => (text, ""),
    }
}

fn parse_reply(rest: &str) -> Result<Command, CommandError> {
    let (id, body) = split_first_token(rest);
    let appeal_id = id.parse().map_err(|_| CommandError::MalformedReply)?;
    if body.is_empty() {
        return Err(CommandError::MalformedReply);
    }
    Ok(Command::Reply {
        appeal_id,
        text: body.to_string(),
    })
}

/// `None` when the message only looks like a status command.
fn parse_status(rest: &str) -> Result<Option<Command>, CommandError> {
    let tokens: Vec<&str> = rest.split_whitespace().collect();
    let [id, keyword] = tokens.as_slice() else {
        return Ok(None);
    };
    let Ok(appeal_id) = id.parse() else {
        return Ok(None);
    };
    let status = keyword
        .parse()
        .map_err(|_| CommandError::UnknownStatus(keyword.to_string()))?;
    Ok(Some(Command::SetStatus { appeal_id, status }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn greeting_must_match_exactly() {
        assert_eq!(parse_message("Начать"), Ok(Command::Greeting));
        assert_eq!(parse_message("  Начать \n"), Ok(Command::Greeting));
        assert_eq!(
            parse_message("Начать заново"),
            Ok(Command::FreeText("Начать заново".to_string()))
        );
    }

    #[test]
    fn single_digits_select_topics() {
        assert_eq!(parse_message("1"), Ok(Command::SelectTopic(Topic::Life)));
        assert_eq!(parse_message("4"), Ok(Command::SelectTopic(Topic::Sport)));
        assert_eq!(parse_message("6"), Ok(Command::FreeText("6".to_string())));
        assert_eq!(parse_message("12"), Ok(Command::FreeText("12".to_string())));
    }

    #[test]
    fn reply_keeps_rest_of_message() {
        assert_eq!(
            parse_message("ОТВЕТ 42 Ваше обращение  рассмотрено"),
            Ok(Command::Reply {
                appeal_id: 42,
                text: "Ваше обращение  рассмотрено".to_string(),
            })
        );
        assert_eq!(
            parse_message("ответ 7 первая строка\nвторая"),
            Ok(Command::Reply {
                appeal_id: 7,
                text: "первая строка\nвторая".to_string(),
            })
        );
    }

    #[test]
    fn malformed_replies_are_rejected() {
        assert_eq!(parse_message("Ответ"), Err(CommandError::MalformedReply));
        assert_eq!(parse_message("Ответ 42"), Err(CommandError::MalformedReply));
        assert_eq!(
            parse_message("Ответ сорок два текст"),
            Err(CommandError::MalformedReply)
        );
    }

    #[test]
    fn reply_keyword_must_be_a_whole_token() {
        assert_eq!(
            parse_message("Ответьте пожалуйста"),
            Ok(Command::FreeText("Ответьте пожалуйста".to_string()))
        );
    }

    #[test]
    fn status_command_parses_keyword() {
        assert_eq!(
            parse_message("Статус 5 in_progress"),
            Ok(Command::SetStatus {
                appeal_id: 5,
                status: Status::InProgress,
            })
        );
        assert_eq!(
            parse_message("статус 5 DONE"),
            Err(CommandError::UnknownStatus("DONE".to_string()))
        );
    }

    #[test]
    fn status_like_text_is_free_text() {
        for text in ["Статус стипендии непонятен", "Статус x NEW", "Статус 5"] {
            assert_eq!(parse_message(text), Ok(Command::FreeText(text.to_string())));
        }
    }
}
