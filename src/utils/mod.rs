use actix_web::FromRequest;
use futures_util::future::{ready, Ready};

use crate::{api::error, modules::image::Code};

/// `{code}` path segment that passed the 4-digit check.
pub struct ValidatedCode(pub Code);

impl FromRequest for ValidatedCode {
    type Error = error::Error;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(
        req: &actix_web::HttpRequest,
        _payload: &mut actix_web::dev::Payload,
    ) -> Self::Future {
        let raw = req.match_info().get("code").unwrap_or_default();

        ready(Code::parse(raw).map(ValidatedCode).map_err(|e| {
            log::warn!("Rejected lookup with invalid code {:?}", raw);
            error::Error::from(e)
        }))
    }
}
