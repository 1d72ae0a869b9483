use super::Input;
use crate::app::App;
use api_shared::{UserProfile, UserStatus};
use emr_client::ClientResult;
use emr_core::validation::{validate_forgot_password, validate_login, validate_reset_password};

pub async fn login(
    app: &App,
    email: &str,
    password: Option<String>,
    input: &mut Input,
) -> ClientResult<String> {
    let password = match password {
        Some(password) => password,
        None => input.prompt("Mật khẩu").await?,
    };
    let credentials = validate_login(email, &password)?;
    let profile = app.client.auth().login(&credentials).await?;
    Ok(format!("Xin chào, {}!", profile.display_name()))
}

pub async fn logout(app: &App) -> ClientResult<String> {
    app.client.auth().logout().await?;
    Ok("Đã đăng xuất.".into())
}

pub async fn whoami(app: &App) -> ClientResult<String> {
    let profile = app.client.user().profile().await?;
    Ok(render_profile(&profile))
}

pub async fn forgot_password(app: &App, email: &str) -> ClientResult<String> {
    let email = validate_forgot_password(email)?;
    let response = app.client.auth().forgot_password(&email).await?;
    Ok(if response.message.is_empty() {
        format!("Nếu {email} tồn tại, liên kết đặt lại mật khẩu đã được gửi.")
    } else {
        response.message
    })
}

pub async fn reset_password(
    app: &App,
    token: &str,
    password: Option<String>,
    confirm: Option<String>,
    input: &mut Input,
) -> ClientResult<String> {
    let password = match password {
        Some(password) => password,
        None => input.prompt("Mật khẩu mới").await?,
    };
    let confirm = match confirm {
        Some(confirm) => confirm,
        None => input.prompt("Nhập lại mật khẩu mới").await?,
    };
    let reset = validate_reset_password(token, &password, &confirm)?;
    app.client.auth().reset_password(&reset).await?;
    Ok("Mật khẩu đã được cập nhật. Hãy đăng nhập lại bằng mật khẩu mới.".into())
}

fn status_label(status: UserStatus) -> &'static str {
    match status {
        UserStatus::Active => "Đang hoạt động",
        UserStatus::Inactive => "Chưa kích hoạt",
        UserStatus::Suspended => "Đã bị khóa",
        UserStatus::Unknown => "Không rõ",
    }
}

pub fn render_profile(profile: &UserProfile) -> String {
    format!(
        "Họ tên:     {}\nEmail:      {}\nVai trò:    {}\nTrạng thái: {}",
        profile.display_name(),
        profile.email,
        profile.roles.join(", "),
        status_label(profile.status)
    )
}
