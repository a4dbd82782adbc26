//! HTML formatting helpers (Telegram HTML parse mode).

use crate::domain::UserId;
use crate::members::MemberProfile;

/// Escape HTML special characters for Telegram HTML parse mode.
pub fn escape_html(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}

/// Render a clickable mention for a member.
///
/// Users with a public username get an at-mention link; users without one get
/// a `tg://user` deep link with the full name as link text.
pub fn mention_html(user_id: UserId, profile: &MemberProfile) -> String {
    match profile.username.as_deref() {
        Some(username) => format!(r#"<a href="https://t.me/{username}">@{username}</a>"#),
        None => format!(
            r#"<a href="tg://user?id={}">{}</a>"#,
            user_id.0,
            escape_html(&profile.full_name)
        ),
    }
}

/// Fallback mention for a voter missing from the registry (should not happen
/// since registration runs before vote processing, but renders something
/// clickable rather than panicking).
pub fn mention_html_bare(user_id: UserId) -> String {
    format!(r#"<a href="tg://user?id={0}">{0}</a>"#, user_id.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn escapes_html_special_chars() {
        assert_eq!(escape_html("a<b>&\"c\""), "a&lt;b&gt;&amp;&quot;c&quot;");
    }

    #[test]
    fn mention_prefers_username() {
        let p = MemberProfile {
            username: Some("paco".to_string()),
            full_name: "Paco Pérez".to_string(),
        };
        assert_eq!(
            mention_html(UserId(7), &p),
            r#"<a href="https://t.me/paco">@paco</a>"#
        );
    }

    #[test]
    fn mention_falls_back_to_numeric_id() {
        let p = MemberProfile {
            username: None,
            full_name: "Paco <3".to_string(),
        };
        assert_eq!(
            mention_html(UserId(7), &p),
            r#"<a href="tg://user?id=7">Paco &lt;3</a>"#
        );
    }
}
