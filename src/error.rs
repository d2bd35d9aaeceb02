use thiserror::Error;

/// How the poll loop reacts to a failure
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// The bot must not start (or keep running)
    Fatal,
    /// Logged only; cursor and last report stay untouched
    RecoverableSilent,
    /// Turned into a diagnostic and sent to the chat, subject to change suppression
    RecoverableReported,
}

/// Every failure the bot knows how to classify.
///
/// Display strings of the reported variants end up in the chat, so they are
/// written for the end user.
#[derive(Debug, Error)]
pub enum BotError {
    #[error("Отсутствуют обязательные переменные окружения: {}", .0.join(", "))]
    MissingCredentials(Vec<&'static str>),

    #[error("API Yandex Practicum недоступен. Код ответа: {status}")]
    ApiAccess { status: u16 },

    #[error("Неизвестный сбой API Yandex Practicum: {source}. url: {url} params: from_date={from_date}")]
    Connection {
        #[source]
        source: reqwest::Error,
        url: String,
        from_date: i64,
    },

    #[error("Ответ от API не является словарем: response = {0}")]
    NotAMapping(String),

    #[error("Ключи homeworks или current_date отсутствуют в словаре")]
    MissingKeys,

    #[error("Список домашних работ не является списком")]
    HomeworksNotAList,

    #[error("Отсутствует ключ {field} в {record}")]
    MissingField { field: &'static str, record: String },

    #[error("Недокументированный статус домашней работы: {0}")]
    UnknownStatus(String),
}

impl BotError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            BotError::MissingCredentials(_) => ErrorKind::Fatal,
            BotError::MissingKeys => ErrorKind::RecoverableSilent,
            BotError::ApiAccess { .. }
            | BotError::Connection { .. }
            | BotError::NotAMapping(_)
            | BotError::HomeworksNotAList
            | BotError::MissingField { .. }
            | BotError::UnknownStatus(_) => ErrorKind::RecoverableReported,
        }
    }
}
