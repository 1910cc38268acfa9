use std::fmt;
use std::io::Write;
use std::str::FromStr;

use chrono::NaiveDateTime;
use diesel::deserialize::{self, FromSql, FromSqlRow};
use diesel::expression::AsExpression;
use diesel::pg::{Pg, PgValue};
use diesel::prelude::*;
use diesel::serialize::{self, IsNull, Output, ToSql};
use diesel::sql_types::Text;
use thiserror::Error;

use crate::schema::*;

pub const MAX_TEXT_LEN: usize = 1000;

#[derive(Debug, Error, PartialEq, Eq)]
#[error("unknown {kind} code `{code}`")]
pub struct UnknownCode {
    kind: &'static str,
    code: String,
}

/// Appeal topic. Stored as a short code, see [`Topic::code`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, AsExpression, FromSqlRow)]
#[diesel(sql_type = Text)]
pub enum Topic {
    Life,
    Scholarship,
    Study,
    Sport,
    International,
}

impl Topic {
    /// Menu order: the student picks a topic by its 1-based position here.
    pub const ALL: [Topic; 5] = [
        Topic::Life,
        Topic::Scholarship,
        Topic::Study,
        Topic::Sport,
        Topic::International,
    ];

    pub fn code(self) -> &'static str {
        match self {
            Topic::Life => "life",
            Topic::Scholarship => "scholarship",
            Topic::Study => "study",
            Topic::Sport => "sport",
            Topic::International => "international",
        }
    }

    pub fn from_menu_choice(choice: &str) -> Option<Topic> {
        let index: usize = choice.parse().ok()?;
        index
            .checked_sub(1)
            .and_then(|index| Topic::ALL.get(index).copied())
    }
}

impl fmt::Display for Topic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

impl FromStr for Topic {
    type Err = UnknownCode;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Topic::ALL
            .into_iter()
            .find(|topic| topic.code().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| UnknownCode {
                kind: "topic",
                code: s.to_string(),
            })
    }
}

/// Appeal status. Transitions only move forward and `Resolved` is terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, AsExpression, FromSqlRow)]
#[diesel(sql_type = Text)]
pub enum Status {
    New,
    InProgress,
    Resolved,
}

impl Status {
    pub const ALL: [Status; 3] = [Status::New, Status::InProgress, Status::Resolved];

    pub fn code(self) -> &'static str {
        match self {
            Status::New => "new",
            Status::InProgress => "in_progress",
            Status::Resolved => "resolved",
        }
    }

    /// Keyword accepted by the status command, e.g. `IN_PROGRESS`.
    pub fn keyword(self) -> String {
        self.code().to_ascii_uppercase()
    }

    fn rank(self) -> u8 {
        match self {
            Status::New => 0,
            Status::InProgress => 1,
            Status::Resolved => 2,
        }
    }

    pub fn is_terminal(self) -> bool {
        self == Status::Resolved
    }

    pub fn can_transition_to(self, next: Status) -> bool {
        !self.is_terminal() && next.rank() >= self.rank()
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

impl FromStr for Status {
    type Err = UnknownCode;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Status::ALL
            .into_iter()
            .find(|status| status.code().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| UnknownCode {
                kind: "status",
                code: s.to_string(),
            })
    }
}

impl ToSql<Text, Pg> for Topic {
    fn to_sql<'b>(&'b self, out: &mut Output<'b, '_, Pg>) -> serialize::Result {
        out.write_all(self.code().as_bytes())?;
        Ok(IsNull::No)
    }
}

impl FromSql<Text, Pg> for Topic {
    fn from_sql(bytes: PgValue<'_>) -> deserialize::Result<Self> {
        let raw = <String as FromSql<Text, Pg>>::from_sql(bytes)?;
        Ok(raw.parse()?)
    }
}

impl ToSql<Text, Pg> for Status {
    fn to_sql<'b>(&'b self, out: &mut Output<'b, '_, Pg>) -> serialize::Result {
        out.write_all(self.code().as_bytes())?;
        Ok(IsNull::No)
    }
}

impl FromSql<Text, Pg> for Status {
    fn from_sql(bytes: PgValue<'_>) -> deserialize::Result<Self> {
        let raw = <String as FromSql<Text, Pg>>::from_sql(bytes)?;
        Ok(raw.parse()?)
    }
}

#[derive(Debug, Clone, PartialEq, Queryable, Identifiable, Associations)]
#[diesel(table_name = appeals)]
#[diesel(belongs_to(Manager))]
pub struct Appeal {
    pub id: i32,
    pub student_id: i64,
    pub topic: Topic,
    pub text: String,
    pub status: Status,
    pub response: Option<String>,
    pub manager_id: Option<i32>,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

impl Appeal {
    /// A draft is a `New` appeal still waiting for its body text.
    pub fn is_draft(&self) -> bool {
        self.status == Status::New && self.text.is_empty()
    }
}

#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = appeals)]
pub struct NewAppeal {
    pub student_id: i64,
    pub topic: Topic,
    pub text: String,
    pub status: Status,
}

impl NewAppeal {
    pub fn draft(student_id: i64, topic: Topic) -> Self {
        Self {
            student_id,
            topic,
            text: String::new(),
            status: Status::New,
        }
    }
}

/// Partial update of an appeal. `None` fields are left untouched.
#[derive(Debug, Clone, Default, PartialEq, AsChangeset)]
#[diesel(table_name = appeals)]
pub struct AppealChanges {
    pub text: Option<String>,
    pub status: Option<Status>,
    pub response: Option<String>,
    pub manager_id: Option<i32>,
    pub updated_at: Option<NaiveDateTime>,
}

#[derive(Debug, Clone, PartialEq, Queryable, Identifiable)]
#[diesel(table_name = managers)]
pub struct Manager {
    pub id: i32,
    pub vk_id: i64,
    pub name: String,
    pub topic: Topic,
    pub created_at: NaiveDateTime,
}

#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = managers)]
pub struct NewManager {
    pub vk_id: i64,
    pub name: String,
    pub topic: Topic,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn menu_choices_follow_topic_order() {
        assert_eq!(Topic::from_menu_choice("1"), Some(Topic::Life));
        assert_eq!(Topic::from_menu_choice("3"), Some(Topic::Study));
        assert_eq!(Topic::from_menu_choice("5"), Some(Topic::International));
        assert_eq!(Topic::from_menu_choice("0"), None);
        assert_eq!(Topic::from_menu_choice("6"), None);
        assert_eq!(Topic::from_menu_choice("x"), None);
    }

    #[test]
    fn codes_parse_back_case_insensitively() {
        for topic in Topic::ALL {
            assert_eq!(topic.code().to_uppercase().parse::<Topic>(), Ok(topic));
        }
        for status in Status::ALL {
            assert_eq!(status.keyword().parse::<Status>(), Ok(status));
        }
        assert!("closed".parse::<Status>().is_err());
    }

    #[test]
    fn status_moves_forward_only() {
        assert!(Status::New.can_transition_to(Status::InProgress));
        assert!(Status::New.can_transition_to(Status::New));
        assert!(Status::InProgress.can_transition_to(Status::Resolved));
        assert!(!Status::InProgress.can_transition_to(Status::New));
        for next in Status::ALL {
            assert!(!Status::Resolved.can_transition_to(next));
        }
    }
}
