use htmlescape::encode_minimal;

pub struct RenderedEmail {
    pub subject: String,
    pub html: String,
}

fn layout(greeting_name: &str, body: &str) -> String {
    format!(
        r#"<html>
    <body style="font-family: Arial, sans-serif; color: #333; background-color: #f9f9f9; padding: 20px;">
        <div style="max-width: 600px; margin: auto; background-color: #fff; padding: 20px; border-radius: 8px;">
            <h1 style="color: #4CAF50;">Здравствуйте, {name}!</h1>
            {body}
        </div>
    </body>
</html>"#,
        name = encode_minimal(greeting_name),
        body = body,
    )
}

pub fn verification_email(name: &str, code: &str, ttl_minutes: i64) -> RenderedEmail {
    let body = format!(
        r#"<p style="font-size: 16px;">Ваш код подтверждения почты:</p>
            <p style="font-size: 28px; letter-spacing: 6px; font-weight: bold;">{code}</p>
            <p style="font-size: 14px; color: #666;">Код действителен {ttl} мин.</p>"#,
        code = encode_minimal(code),
        ttl = ttl_minutes,
    );
    RenderedEmail {
        subject: "Подтверждение почты".to_string(),
        html: layout(name, &body),
    }
}

pub fn password_reset_email(name: &str, link: &str) -> RenderedEmail {
    let body = format!(
        r#"<p style="font-size: 16px;">Чтобы задать новый пароль, перейдите по ссылке:</p>
            <a href="{link}" style="display: inline-block; margin-top: 20px; padding: 10px 15px; color: #fff; background-color: #4CAF50; text-decoration: none; border-radius: 5px;">Сбросить пароль</a>
            <p style="font-size: 14px; color: #666;">Если вы не запрашивали сброс, просто проигнорируйте это письмо.</p>"#,
        link = encode_minimal(link),
    );
    RenderedEmail {
        subject: "Сброс пароля".to_string(),
        html: layout(name, &body),
    }
}

/// `{frontend}/password/reset?token=...`
pub fn password_reset_link(frontend_url: &str, token: &str) -> String {
    format!(
        "{}/password/reset?token={}",
        frontend_url.trim_end_matches('/'),
        urlencoding::encode(token)
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn verification_email_escapes_name_and_shows_code() {
        let mail = verification_email("<b>Ivan</b>", "012345", 15);
        assert!(mail.html.contains("&lt;b&gt;Ivan&lt;/b&gt;"));
        assert!(mail.html.contains("012345"));
        assert!(!mail.html.contains("<b>Ivan</b>"));
    }

    #[test]
    fn reset_link_is_rooted_at_frontend() {
        let link = password_reset_link("https://shop.example/", "a.b+c");
        assert_eq!(link, "https://shop.example/password/reset?token=a.b%2Bc");
        let mail = password_reset_email("Ivan", &link);
        assert!(mail.html.contains("https://shop.example/password/reset?token=a.b%2Bc"));
    }
}
