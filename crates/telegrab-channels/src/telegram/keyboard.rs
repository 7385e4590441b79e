//! Reply-markup serialization.
//!
//! False flags and empty button text are omitted entirely, never sent as
//! `false`/`""`. No semantic validation is done.

use telegrab_core::{error::TelegrabError, message::ReplyMarkup};

/// Serialize a keyboard or hide directive to its `reply_markup` JSON value.
pub fn encode_value(markup: ReplyMarkup<'_>) -> Result<serde_json::Value, TelegrabError> {
    let value = match markup {
        ReplyMarkup::Keyboard(keyboard) => serde_json::to_value(keyboard)?,
        ReplyMarkup::Hide(hide) => serde_json::to_value(hide)?,
    };
    Ok(value)
}

/// Serialize to the string sent in the `reply_markup` field.
pub fn encode(markup: ReplyMarkup<'_>) -> Result<String, TelegrabError> {
    Ok(encode_value(markup)?.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use telegrab_core::message::{KeyboardButton, ReplyKeyboardHide, ReplyKeyboardMarkup};

    #[test]
    fn test_plain_keyboard_omits_false_flags() {
        let kb = ReplyKeyboardMarkup::new(vec![vec![KeyboardButton::text("Yes")]]);
        let value = encode_value(ReplyMarkup::Keyboard(&kb)).unwrap();
        assert_eq!(value, json!({ "keyboard": [[{ "text": "Yes" }]] }));
    }

    #[test]
    fn test_rows_and_buttons_keep_order() {
        let kb = ReplyKeyboardMarkup::new(vec![
            vec![KeyboardButton::text("1"), KeyboardButton::text("2")],
            vec![KeyboardButton::text("3")],
        ]);
        let value = encode_value(ReplyMarkup::Keyboard(&kb)).unwrap();
        assert_eq!(
            value["keyboard"],
            json!([[{ "text": "1" }, { "text": "2" }], [{ "text": "3" }]])
        );
    }

    #[test]
    fn test_request_flags_only_when_true() {
        let kb = ReplyKeyboardMarkup::new(vec![vec![
            KeyboardButton::contact("Phone"),
            KeyboardButton::location("Where"),
            KeyboardButton {
                text: String::new(),
                request_contact: true,
                request_location: true,
            },
        ]]);
        let value = encode_value(ReplyMarkup::Keyboard(&kb)).unwrap();
        assert_eq!(
            value["keyboard"][0],
            json!([
                { "text": "Phone", "request_contact": true },
                { "text": "Where", "request_location": true },
                { "request_contact": true, "request_location": true },
            ])
        );
    }

    #[test]
    fn test_top_level_flags_when_set() {
        let kb = ReplyKeyboardMarkup::new(vec![vec![KeyboardButton::text("A")]])
            .resize()
            .one_time()
            .selective();
        let value = encode_value(ReplyMarkup::Keyboard(&kb)).unwrap();
        assert_eq!(value["resize_keyboard"], json!(true));
        assert_eq!(value["one_time_keyboard"], json!(true));
        assert_eq!(value["selective"], json!(true));
    }

    #[test]
    fn test_hide_directive() {
        let hide = ReplyKeyboardHide {
            hide: true,
            selective: false,
        };
        assert_eq!(
            encode(ReplyMarkup::Hide(&hide)).unwrap(),
            r#"{"hide_keyboard":true}"#
        );

        let hide = ReplyKeyboardHide {
            hide: true,
            selective: true,
        };
        assert_eq!(
            encode_value(ReplyMarkup::Hide(&hide)).unwrap(),
            json!({ "hide_keyboard": true, "selective": true })
        );
    }
}
