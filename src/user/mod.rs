mod requests;
mod responses;
pub mod utils;

use crate::{
    database::{self, assert},
    mail,
    models::{
        password_resets::PasswordResetData,
        user_logins::UserLoginData,
        users::{NewUser, UpdateUser, UserData, DEFAULT_AVATAR, DEFAULT_COUNTRY},
    },
    protocol::SimpleResponse,
    AppState,
};
use actix_web::web;
use anyhow::{bail, Context};
use diesel::prelude::*;

use self::{
    requests::*,
    responses::*,
    utils::{
        hash_password, login_user, new_token, normalize_country, normalize_email,
        normalize_phone, validate_password,
    },
};

pub fn config(cfg: &mut web::ServiceConfig) {
    cfg.service(register)
        .service(login)
        .service(logout)
        .service(view_info)
        .service(modify_info)
        .service(modify_notes)
        .service(modify_password)
        .service(password_reset)
        .service(password_reset_confirm)
        .service(password_reset_confirm_page);
}

/// Page opened from the reset email; its form posts the token back to `password_reset_confirm`.
#[actix_web::get("/password_reset_confirm")]
async fn password_reset_confirm_page(
    state: web::Data<AppState>,
) -> actix_web::Result<actix_files::NamedFile> {
    crate::pages::page(&state, "password_reset_confirm.html")
}

crate::post_funcs! {
    (register, "/register", RegisterRequest, SimpleResponse),
    (login, "/login", LoginRequest, LoginResponse),
    (logout, "/logout", LogoutRequest, SimpleResponse),
    (view_info, "/view_info", ViewInfoRequest, ViewInfoResponse),
    (modify_info, "/modify_info", ModifyInfoRequest, SimpleResponse),
    (modify_notes, "/modify_notes", ModifyNotesRequest, SimpleResponse),
    (modify_password, "/modify_password", ModifyPasswordRequest, SimpleResponse),
    (password_reset, "/password_reset", PasswordResetRequest, SimpleResponse),
    (password_reset_confirm, "/password_reset_confirm", PasswordResetConfirmRequest, SimpleResponse),
}

/// Inserts a new account. Fails when the email is taken.
pub fn create_user(
    conn: &mut SqliteConnection,
    email: String,
    password: &str,
    first_name: String,
    last_name: String,
    is_staff: bool,
) -> anyhow::Result<()> {
    use crate::schema::users;

    conn.transaction::<_, anyhow::Error, _>(|conn| {
        assert::assert_email_free(conn, &email)?;

        let data = NewUser {
            email,
            password: hash_password(password),
            first_name,
            last_name,
            phone: None,
            country: DEFAULT_COUNTRY.to_string(),
            avatar: Some(DEFAULT_AVATAR.to_string()),
            is_staff,
            date_joined: crate::utils::now(),
        };
        diesel::insert_into(users::table)
            .values(data)
            .execute(conn)
            .context("DB error")?;

        Ok(())
    })
}

/// Creates the staff account from the configuration unless it exists.
pub fn ensure_superuser(
    conn: &mut SqliteConnection,
    email: &str,
    password: &str,
) -> anyhow::Result<bool> {
    use crate::schema::users;

    let email = normalize_email(email)?;
    let res = users::table
        .filter(users::email.eq(&email))
        .count()
        .get_result::<i64>(conn)
        .context("DB error")?;
    if res > 0 {
        return Ok(false);
    }
    create_user(conn, email, password, "admin".to_string(), String::new(), true)?;
    Ok(true)
}

async fn register_impl(
    state: web::Data<AppState>,
    info: web::Json<RegisterRequest>,
) -> anyhow::Result<SimpleResponse> {
    let info = info.into_inner();
    let email = normalize_email(&info.email)?;
    validate_password(&info.password1, &info.password2)?;

    let registered = email.clone();
    database::run(&state.pool, move |conn| {
        create_user(
            conn,
            email,
            &info.password1,
            info.first_name.trim().to_string(),
            info.last_name.trim().to_string(),
            false,
        )
    })
    .await?;
    log::info!("User {} registered", registered);

    Ok(SimpleResponse::ok())
}

async fn login_impl(
    state: web::Data<AppState>,
    info: web::Json<LoginRequest>,
) -> anyhow::Result<LoginResponse> {
    use crate::schema::{user_logins, users};

    let info = info.into_inner();
    let email = info.email.trim().to_lowercase();

    let login_token = database::run(&state.pool, move |conn| {
        let hashed_password = hash_password(&info.password);
        let user_id = users::table
            .filter(users::email.eq(&email))
            .filter(users::password.eq(&hashed_password))
            .filter(users::is_active.eq(true))
            .select(users::id)
            .get_result::<i32>(conn)
            .optional()
            .context("DB error")?;
        let Some(user_id) = user_id else {
            bail!("Please enter a correct email and password");
        };

        let now = crate::utils::now();
        let login_token = new_token(&format!("login:{}:{}", email, hashed_password), now);
        let token_data = UserLoginData {
            token: login_token.clone(),
            user_id,
            login_time: now,
        };
        diesel::insert_into(user_logins::table)
            .values(token_data)
            .execute(conn)
            .context("DB error")?;

        Ok(login_token)
    })
    .await?;

    Ok(LoginResponse {
        success: true,
        err: "".to_string(),
        login_token,
    })
}

async fn logout_impl(
    state: web::Data<AppState>,
    info: web::Json<LogoutRequest>,
) -> anyhow::Result<SimpleResponse> {
    use crate::schema::user_logins;

    let info = info.into_inner();
    database::run(&state.pool, move |conn| {
        diesel::delete(user_logins::table.filter(user_logins::token.eq(info.login_token)))
            .execute(conn)
            .context("DB error")
    })
    .await?;

    Ok(SimpleResponse::ok())
}

async fn view_info_impl(
    state: web::Data<AppState>,
    info: web::Json<ViewInfoRequest>,
) -> anyhow::Result<ViewInfoResponse> {
    let info = info.into_inner();
    let ttl = state.config.login_ttl_secs;
    let user = database::run(&state.pool, move |conn| {
        login_user(conn, &info.login_token, ttl)
    })
    .await?;

    Ok(ViewInfoResponse {
        success: true,
        err: "".to_string(),
        id: user.id,
        email: user.email,
        first_name: user.first_name,
        last_name: user.last_name,
        phone: user.phone.unwrap_or_default(),
        country: user.country,
        about_me: user.about_me.unwrap_or_default(),
        avatar: user.avatar.unwrap_or_default(),
        notes: user.notes.unwrap_or_default(),
        date_joined: crate::utils::format_datetime_str(&user.date_joined),
    })
}

async fn modify_info_impl(
    state: web::Data<AppState>,
    info: web::Json<ModifyInfoRequest>,
) -> anyhow::Result<SimpleResponse> {
    use crate::schema::users;

    let info = info.into_inner();
    let data = UpdateUser {
        first_name: info.first_name.map(|s| s.trim().to_string()),
        last_name: info.last_name.map(|s| s.trim().to_string()),
        phone: info.phone.as_deref().map(normalize_phone).transpose()?,
        country: info.country.as_deref().map(normalize_country).transpose()?,
        about_me: info.about_me,
        avatar: info.avatar,
    };

    let ttl = state.config.login_ttl_secs;
    database::run(&state.pool, move |conn| {
        let user = login_user(conn, &info.login_token, ttl)?;
        if data.is_empty() {
            return Ok(());
        }
        diesel::update(users::table.filter(users::id.eq(user.id)))
            .set(&data)
            .execute(conn)
            .context("DB error")?;
        Ok(())
    })
    .await?;

    Ok(SimpleResponse::ok())
}

async fn modify_notes_impl(
    state: web::Data<AppState>,
    info: web::Json<ModifyNotesRequest>,
) -> anyhow::Result<SimpleResponse> {
    use crate::schema::users;

    let info = info.into_inner();
    let ttl = state.config.login_ttl_secs;
    database::run(&state.pool, move |conn| {
        let user = login_user(conn, &info.login_token, ttl)?;
        let notes = Some(info.notes).filter(|notes| !notes.is_empty());
        diesel::update(users::table.filter(users::id.eq(user.id)))
            .set(users::notes.eq(notes))
            .execute(conn)
            .context("DB error")?;
        Ok(())
    })
    .await?;

    Ok(SimpleResponse::ok())
}

async fn modify_password_impl(
    state: web::Data<AppState>,
    info: web::Json<ModifyPasswordRequest>,
) -> anyhow::Result<SimpleResponse> {
    use crate::schema::users;

    let info = info.into_inner();
    validate_password(&info.password_new1, &info.password_new2)?;

    let ttl = state.config.login_ttl_secs;
    database::run(&state.pool, move |conn| {
        let user = login_user(conn, &info.login_token, ttl)?;
        if user.password != hash_password(&info.password_old) {
            bail!("Your old password was entered incorrectly");
        }

        diesel::update(users::table.filter(users::id.eq(user.id)))
            .set(users::password.eq(hash_password(&info.password_new1)))
            .execute(conn)
            .context("DB error")?;
        Ok(())
    })
    .await?;

    Ok(SimpleResponse::ok())
}

async fn password_reset_impl(
    state: web::Data<AppState>,
    info: web::Json<PasswordResetRequest>,
) -> anyhow::Result<SimpleResponse> {
    use crate::schema::{password_resets, users};

    let email = normalize_email(&info.into_inner().email)?;
    let issued = database::run(&state.pool, move |conn| {
        let user = users::table
            .filter(users::email.eq(&email))
            .filter(users::is_active.eq(true))
            .get_result::<UserData>(conn)
            .optional()
            .context("DB error")?;
        let Some(user) = user else {
            return Ok(None);
        };

        let now = crate::utils::now();
        let token = new_token(&format!("reset:{}:{}", user.email, user.password), now);
        diesel::insert_into(password_resets::table)
            .values(PasswordResetData {
                token: token.clone(),
                user_id: user.id,
                created_at: now,
            })
            .execute(conn)
            .context("DB error")?;

        Ok(Some((user, token)))
    })
    .await?;

    // unknown addresses get the same answer
    match issued {
        Some((user, token)) => {
            let link = format!(
                "{}/user/password_reset_confirm?token={}",
                state.config.site_url.trim_end_matches('/'),
                token
            );
            mail::deliver(state.mailer.clone(), mail::password_reset(&user, &link)).await;
        }
        None => log::debug!("Password reset requested for an unknown email"),
    }

    Ok(SimpleResponse::ok())
}

async fn password_reset_confirm_impl(
    state: web::Data<AppState>,
    info: web::Json<PasswordResetConfirmRequest>,
) -> anyhow::Result<SimpleResponse> {
    use crate::schema::{password_resets, user_logins, users};

    let info = info.into_inner();
    validate_password(&info.password_new1, &info.password_new2)?;

    let ttl = state.config.reset_ttl_secs;
    database::run(&state.pool, move |conn| {
        conn.transaction::<_, anyhow::Error, _>(|conn| {
            let reset = password_resets::table
                .filter(password_resets::token.eq(&info.token))
                .get_result::<PasswordResetData>(conn)
                .optional()
                .context("DB error")?;
            let reset = match reset {
                Some(reset)
                    if crate::utils::now()
                        .signed_duration_since(reset.created_at)
                        .num_seconds()
                        <= ttl =>
                {
                    reset
                }
                _ => bail!("The password reset link is invalid or has expired"),
            };

            diesel::update(users::table.filter(users::id.eq(reset.user_id)))
                .set(users::password.eq(hash_password(&info.password_new1)))
                .execute(conn)
                .context("DB error")?;
            diesel::delete(password_resets::table.filter(password_resets::user_id.eq(reset.user_id)))
                .execute(conn)
                .context("DB error")?;
            diesel::delete(user_logins::table.filter(user_logins::user_id.eq(reset.user_id)))
                .execute(conn)
                .context("DB error")?;

            Ok(())
        })
    })
    .await?;

    Ok(SimpleResponse::ok())
}
