//! Email copy for account notifications.

use rust_decimal::Decimal;

use crate::config::APP_NAME;
use crate::domain::User;
use crate::jobs::EmailJob;

pub const WELCOME_SUBJECT: &str = "Welcome To CoinBlazers";
pub const USER_WITHDRAWAL_SUBJECT: &str = "Withdrawal Request Received and Processing";
pub const ADMIN_WITHDRAWAL_SUBJECT: &str = "User Withdrawal Notification";
pub const PASSWORD_RESET_SUBJECT: &str = "Password Reset Instructions";

pub fn welcome(user: &User) -> EmailJob {
    let text = format!(
        "Dear {first},\n\n\
         Welcome to {app}!\n\n\
         We're thrilled to have you on board. {app} gives you a seamless and secure \
         way to navigate the world of cryptocurrencies.\n\n\
         To get started, explore your dashboard and the tools available to you. If you \
         have any questions, our support team is always ready to help.\n\n\
         Warm regards,\n\
         The {app} Team",
        first = user.first_name,
        app = APP_NAME,
    );

    EmailJob::new(&user.email, WELCOME_SUBJECT, text)
}

/// Acknowledgement sent to the account holder
pub fn user_withdrawal(user: &User, amount: Decimal) -> EmailJob {
    let text = format!(
        "Dear {name},\n\n\
         We have received your withdrawal request of ${amount}. Your request is currently \
         being processed.\n\n\
         We will notify you once the withdrawal has been completed and the amount has been \
         transferred to your wallet.\n\n\
         Thank you for your patience.\n\n\
         Best regards,\n\
         {app}",
        name = user.full_name(),
        amount = amount,
        app = APP_NAME,
    );

    EmailJob::new(&user.email, USER_WITHDRAWAL_SUBJECT, text)
}

/// Staff notification sent to the operator address
pub fn admin_withdrawal(user: &User, amount: Decimal, operator_email: &str) -> EmailJob {
    let text = format!(
        "Withdrawal Request Notification\n\n\
         User: {name} ({email})\n\
         Amount: ${amount}\n\n\
         The user has requested a withdrawal of ${amount}. Please process this request at \
         your earliest convenience.\n\n\
         Best regards,\n\
         {app} System",
        name = user.full_name(),
        email = user.email,
        amount = amount,
        app = APP_NAME,
    );

    EmailJob::new(operator_email, ADMIN_WITHDRAWAL_SUBJECT, text)
}

pub fn password_reset(user: &User, reset_link: &str, ttl_seconds: i64) -> EmailJob {
    let expires_in = describe_duration(ttl_seconds);

    let text = format!(
        "Dear {first},\n\n\
         We received a request to reset your password. Click the link below to set a new \
         password:\n{link}\n\n\
         This link expires in {expires_in}. If you didn't request this, you can safely \
         ignore this email.\n\n\
         Best regards,\n\
         {app} Support Team",
        first = user.first_name,
        link = reset_link,
        expires_in = expires_in,
        app = APP_NAME,
    );

    let html = format!(
        r#"<div style="font-family: Arial, sans-serif; color: #111; line-height: 1.6;">
  <div style="max-width:600px;margin:0 auto;padding:24px;border:1px solid #eee;border-radius:8px;">
    <h2 style="margin: 0 0 16px; color: #0d6efd;">Reset your password</h2>
    <p>Dear {first},</p>
    <p>We received a request to reset your password. Click the button below to set a new password.</p>
    <p style="margin: 24px 0;">
      <a href="{link}" style="background: #0d6efd; color: #fff; text-decoration: none; padding: 12px 18px; border-radius: 6px; display: inline-block;">Reset Password</a>
    </p>
    <p>If the button doesn't work, copy and paste this link into your browser:</p>
    <p style="word-break: break-all;"><a href="{link}">{link}</a></p>
    <p style="color:#555; font-size: 14px;">This link expires in <strong>{expires_in}</strong>.</p>
    <hr style="border:0;border-top:1px solid #eee; margin: 20px 0;" />
    <p style="color:#555; font-size: 14px;">If you did not request this, you can safely ignore this email.</p>
    <p>Best regards,<br/>{app} Support Team</p>
  </div>
</div>"#,
        first = html_escape(&user.first_name),
        link = reset_link,
        expires_in = expires_in,
        app = APP_NAME,
    );

    EmailJob::new(&user.email, PASSWORD_RESET_SUBJECT, text).with_html(html)
}

/// "1 hour", "2 hours", "30 minutes", "45 seconds"
fn describe_duration(seconds: i64) -> String {
    let (count, unit) = if seconds % 3600 == 0 {
        (seconds / 3600, "hour")
    } else if seconds % 60 == 0 {
        (seconds / 60, "minute")
    } else {
        (seconds, "second")
    };

    if count == 1 {
        format!("1 {}", unit)
    } else {
        format!("{} {}s", count, unit)
    }
}

fn html_escape(input: &str) -> String {
    input
        .replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}
