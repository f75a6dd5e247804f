use crate::config::SmtpConfig;
use crate::error::{AppError, AppResult};
use crate::utils::OTP_TTL_MINUTES;
use lettre::{
    AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor,
    message::{Mailbox, header::ContentType},
    transport::smtp::authentication::Credentials,
};

/// Email template with `{{var}}` substitution.
struct EmailTemplate {
    content: &'static str,
}

impl EmailTemplate {
    const fn new(content: &'static str) -> Self {
        Self { content }
    }

    fn render(&self, vars: &[(&str, &str)]) -> String {
        let mut result = self.content.to_string();
        for (key, value) in vars {
            result = result.replace(&format!("{{{{{}}}}}", key), value);
        }
        result
    }
}

const WELCOME_TEMPLATE: EmailTemplate =
    EmailTemplate::new(include_str!("../../templates/emails/welcome.html"));
const WELCOME_CANDIDATE_TEMPLATE: EmailTemplate =
    EmailTemplate::new(include_str!("../../templates/emails/welcome_candidate.html"));
const OTP_TEMPLATE: EmailTemplate =
    EmailTemplate::new(include_str!("../../templates/emails/otp.html"));

/// SMTP 邮件发送；host 为空时只记录日志
#[derive(Clone)]
pub struct Mailer {
    transport: Option<AsyncSmtpTransport<Tokio1Executor>>,
    from_mailbox: Option<Mailbox>,
    brand: String,
}

impl Mailer {
    pub fn new(config: &SmtpConfig) -> AppResult<Self> {
        if config.host.trim().is_empty() {
            log::warn!("SMTP host not configured, outgoing email is disabled");
            return Ok(Self::disabled(&config.from_name));
        }

        let creds = Credentials::new(config.username.clone(), config.password.clone());
        let transport = if config.tls {
            AsyncSmtpTransport::<Tokio1Executor>::relay(&config.host)
                .map_err(|e| AppError::ConfigError(format!("Failed to create SMTP relay: {e}")))?
                .port(config.port)
                .credentials(creds)
                .build()
        } else {
            AsyncSmtpTransport::<Tokio1Executor>::builder_dangerous(&config.host)
                .port(config.port)
                .credentials(creds)
                .build()
        };

        let from_mailbox: Mailbox = format!("{} <{}>", config.from_name, config.from_email)
            .parse()
            .map_err(|e| AppError::ConfigError(format!("Invalid from email address: {e}")))?;

        Ok(Self {
            transport: Some(transport),
            from_mailbox: Some(from_mailbox),
            brand: config.from_name.clone(),
        })
    }

    pub fn disabled(brand: &str) -> Self {
        Self {
            transport: None,
            from_mailbox: None,
            brand: brand.to_string(),
        }
    }

    pub async fn send_welcome(&self, to: &str, name: &str) -> AppResult<()> {
        let body = WELCOME_TEMPLATE.render(&[("name", name), ("brand", &self.brand)]);
        let subject = format!("Welcome to {}, {}!", self.brand, name);
        self.send_html(to, &subject, body).await
    }

    pub async fn send_welcome_candidate(
        &self,
        to: &str,
        full_name: &str,
        password: &str,
    ) -> AppResult<()> {
        let body = WELCOME_CANDIDATE_TEMPLATE.render(&[
            ("name", full_name),
            ("email", to),
            ("password", password),
            ("brand", &self.brand),
        ]);
        let subject = format!("Welcome to {}, {}!", self.brand, full_name);
        self.send_html(to, &subject, body).await
    }

    pub async fn send_otp(&self, to: &str, name: &str, otp: &str) -> AppResult<()> {
        let expiry = OTP_TTL_MINUTES.to_string();
        let body = OTP_TEMPLATE.render(&[
            ("name", name),
            ("otp", otp),
            ("expiry_minutes", &expiry),
            ("brand", &self.brand),
        ]);
        let subject = format!("Your OTP for {} Verification", self.brand);
        self.send_html(to, &subject, body).await
    }

    async fn send_html(&self, to: &str, subject: &str, body: String) -> AppResult<()> {
        let (Some(transport), Some(from)) = (&self.transport, &self.from_mailbox) else {
            log::info!("Email disabled, skipped \"{}\" to {}", subject, to);
            return Ok(());
        };

        let to_mailbox: Mailbox = to
            .parse()
            .map_err(|e| AppError::ValidationError(format!("Invalid recipient email: {e}")))?;

        let email = Message::builder()
            .from(from.clone())
            .to(to_mailbox)
            .subject(subject)
            .header(ContentType::TEXT_HTML)
            .body(body)
            .map_err(|e| AppError::InternalError(format!("Failed to build email: {e}")))?;

        transport
            .send(email)
            .await
            .map_err(|e| AppError::ExternalApiError(format!("Failed to send email: {e}")))?;

        log::info!("Email \"{}\" sent to {}", subject, to);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_template_render() {
        let template = EmailTemplate::new("Hello {{name}}, your code is {{otp}}.");
        let result = template.render(&[("name", "Asha"), ("otp", "482913")]);
        assert_eq!(result, "Hello Asha, your code is 482913.");
    }

    #[test]
    fn test_candidate_template_has_credentials() {
        let result = WELCOME_CANDIDATE_TEMPLATE.render(&[
            ("name", "Ravi Kumar"),
            ("email", "ravi@example.com"),
            ("password", "05072001"),
            ("brand", "Edu Consult"),
        ]);
        assert!(result.contains("ravi@example.com"));
        assert!(result.contains("05072001"));
        assert!(!result.contains("{{"));
    }

    #[tokio::test]
    async fn test_disabled_mailer_is_a_no_op() {
        let mailer = Mailer::new(&SmtpConfig::default()).unwrap();
        assert!(mailer.send_otp("asha@example.com", "Asha", "123456").await.is_ok());
    }
}
