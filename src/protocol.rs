use actix_web::HttpResponse;
use serde::Serialize;

/// Response bodies able to carry an error message instead of their payload.
pub trait ErrorResponse: Serialize {
    fn err<S: ToString>(err: S) -> Self;
}

#[derive(Debug, Default, Serialize)]
pub struct SimpleResponse {
    pub success: bool,
    pub err: String,
}

impl SimpleResponse {
    pub fn ok() -> Self {
        Self {
            success: true,
            err: "".to_string(),
        }
    }
}

#[macro_export]
macro_rules! impl_err_response {
    ( $( $type:ty),+ $(,)? ) => {
        $(
            impl $crate::protocol::ErrorResponse for $type {
                fn err<S: ToString>(err: S) -> Self {
                    Self {
                        success: false,
                        err: err.to_string(),
                        ..Default::default()
                    }
                }
            }
        )+
    };
}

impl_err_response! {
    SimpleResponse,
}

/// Plain text answer used by the HTML form endpoints.
pub fn text_response<S: Into<String>>(text: S) -> HttpResponse {
    HttpResponse::Ok()
        .content_type("text/plain; charset=utf-8")
        .body(text.into())
}
