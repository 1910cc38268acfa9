//! User-facing texts. Storage codes never leak into messages; labels live here.

use crate::command::CommandError;
use crate::models::{Appeal, Status, Topic};

pub fn topic_label(topic: Topic) -> &'static str {
    match topic {
        Topic::Life => "Быт",
        Topic::Scholarship => "Стипендии",
        Topic::Study => "Учебный процесс",
        Topic::Sport => "Спорт",
        Topic::International => "Международные вопросы",
    }
}

pub fn status_label(status: Status) -> &'static str {
    match status {
        Status::New => "Новое",
        Status::InProgress => "На рассмотрении",
        Status::Resolved => "Решено",
    }
}

pub fn topic_menu() -> String {
    let mut menu = String::from("Привет! Это бот Студсовета МГУ.\nВыбери тему обращения:");
    for (index, topic) in Topic::ALL.into_iter().enumerate() {
        menu.push_str(&format!("\n{}. {}", index + 1, topic_label(topic)));
    }
    menu
}

pub fn appeal_started(appeal: &Appeal) -> String {
    format!(
        "Выбрана тема: {}\nСоздано обращение №{}. Напиши текст обращения.",
        topic_label(appeal.topic),
        appeal.id
    )
}

pub fn draft_pending(appeal_id: i32) -> String {
    format!("У тебя уже есть незаполненное обращение №{appeal_id}. Сначала напиши его текст.")
}

pub fn appeal_not_started() -> String {
    "Вы ещё не начали писать обращение.\nВведите номер темы для начала.".to_string()
}

pub fn appeal_accepted(appeal: &Appeal) -> String {
    format!(
        "Обращение #{} принято!\nТема: {}",
        appeal.id,
        topic_label(appeal.topic)
    )
}

pub fn manager_notification(appeal: &Appeal) -> String {
    format!(
        "Новое обращение #{}\nТема: {}\nТекст: {}\n\nЧтобы ответить, отправь:\nОтвет [номер] [текст ответа]",
        appeal.id,
        topic_label(appeal.topic),
        appeal.text
    )
}

pub fn student_answer(appeal: &Appeal) -> String {
    format!(
        "Ответ на обращение #{}\nТема: {}\nОтвет: {}",
        appeal.id,
        topic_label(appeal.topic),
        appeal.response.as_deref().unwrap_or_default()
    )
}

pub fn response_sent() -> String {
    "Ответ успешно отправлен студенту".to_string()
}

pub fn response_undelivered(appeal_id: i32) -> String {
    format!("Ответ на обращение #{appeal_id} сохранён, но доставить его студенту не удалось")
}

pub fn status_changed(appeal: &Appeal) -> String {
    format!(
        "Статус обращения #{} изменен на {}",
        appeal.id,
        status_label(appeal.status)
    )
}

pub fn invalid_transition(appeal_id: i32, from: Status, to: Status) -> String {
    format!(
        "Нельзя изменить статус обращения #{appeal_id}: {} → {}",
        status_label(from),
        status_label(to)
    )
}

pub fn not_found() -> String {
    "Обращение с таким номером не найдено".to_string()
}

pub fn already_answered() -> String {
    "На это обращение уже был дан ответ".to_string()
}

pub fn command_error(error: &CommandError) -> String {
    match error {
        CommandError::MalformedReply => {
            "Неправильный формат команды. Пример: Ответ 42 Ваше обращение рассмотрено".to_string()
        }
        CommandError::UnknownStatus(_) => {
            let keywords: Vec<String> = Status::ALL.into_iter().map(Status::keyword).collect();
            format!("Неверный статус. Возможные: {}", keywords.join(", "))
        }
    }
}

pub fn internal_failure() -> String {
    "Не удалось обработать сообщение. Попробуйте позже.".to_string()
}
