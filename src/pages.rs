use std::path::Path;

use actix_files::NamedFile;
use actix_web::{get, post, web, Either};
use serde::Deserialize;

use crate::{mail, protocol::text_response, AppState};

type PageResult = actix_web::Result<Either<actix_web::HttpResponse, NamedFile>>;

pub fn config(cfg: &mut web::ServiceConfig) {
    cfg.service(index)
        .service(about)
        .service(menu)
        .service(contacts)
        .service(index_feedback)
        .service(contacts_feedback);
}

#[derive(Deserialize)]
pub struct ContactForm {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub phone: String,
    #[serde(default)]
    pub message: String,
}

pub(crate) fn page(state: &AppState, name: &str) -> actix_web::Result<NamedFile> {
    Ok(NamedFile::open(Path::new(&state.config.static_dir).join(name))?)
}

#[get("/")]
async fn index(state: web::Data<AppState>) -> actix_web::Result<NamedFile> {
    page(&state, "index.html")
}

#[get("/about/")]
async fn about(state: web::Data<AppState>) -> actix_web::Result<NamedFile> {
    page(&state, "about.html")
}

#[get("/menu/")]
async fn menu(state: web::Data<AppState>) -> actix_web::Result<NamedFile> {
    page(&state, "menu.html")
}

#[get("/contacts/")]
async fn contacts(state: web::Data<AppState>) -> actix_web::Result<NamedFile> {
    page(&state, "contacts.html")
}

#[post("/")]
async fn index_feedback(state: web::Data<AppState>, form: web::Form<ContactForm>) -> PageResult {
    feedback(state, form.into_inner()).await
}

#[post("/contacts/")]
async fn contacts_feedback(state: web::Data<AppState>, form: web::Form<ContactForm>) -> PageResult {
    feedback(state, form.into_inner()).await
}

/// Forwards a contact form to the restaurant mailbox.
async fn feedback(state: web::Data<AppState>, form: ContactForm) -> PageResult {
    let name = form.name.trim();
    let email = form.email.trim();
    let message = form.message.trim();
    if name.is_empty() || email.is_empty() || message.is_empty() {
        return Ok(Either::Left(text_response(
            "Please fill in all required fields.",
        )));
    }

    let feedback_mail = mail::contact_feedback(
        state.mailer.sender(),
        name,
        email,
        form.phone.trim(),
        message,
    );
    mail::deliver(state.mailer.clone(), feedback_mail).await;

    Ok(Either::Right(page(&state, "success_send_message.html")?))
}
