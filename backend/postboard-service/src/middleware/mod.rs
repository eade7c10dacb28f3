/// Request identity extraction
///
/// Authentication happens upstream. The gateway forwards the verified user in
/// `x-user-id` (UUID) and `x-user-name` headers; handlers take either
/// [`AuthenticatedUser`] (required) or [`OptionalUser`] (anonymous allowed).
use crate::domain::models::Actor;
use actix_web::{error::ErrorUnauthorized, Error, FromRequest, HttpRequest};
use std::future::{ready, Ready};
use uuid::Uuid;

pub const USER_ID_HEADER: &str = "x-user-id";
pub const USER_NAME_HEADER: &str = "x-user-name";

/// Identity of the caller; rejects the request with 401 when absent
#[derive(Debug, Clone)]
pub struct AuthenticatedUser(pub Actor);

/// Identity of the caller if the request carries one
#[derive(Debug, Clone)]
pub struct OptionalUser(pub Option<Actor>);

impl OptionalUser {
    pub fn actor(&self) -> Option<&Actor> {
        self.0.as_ref()
    }
}

fn header<'a>(req: &'a HttpRequest, name: &str) -> Option<&'a str> {
    req.headers()
        .get(name)
        .and_then(|h| h.to_str().ok())
        .map(str::trim)
        .filter(|v| !v.is_empty())
}

/// Ok(None) when no identity is present, Err when it is present but malformed
fn actor_from_headers(req: &HttpRequest) -> Result<Option<Actor>, Error> {
    let Some(raw_id) = header(req, USER_ID_HEADER) else {
        return Ok(None);
    };
    let id = Uuid::parse_str(raw_id).map_err(|_| ErrorUnauthorized("Invalid user ID"))?;
    let name = header(req, USER_NAME_HEADER).unwrap_or_default();
    Ok(Some(Actor::new(id, name)))
}

impl FromRequest for AuthenticatedUser {
    type Error = Error;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _: &mut actix_web::dev::Payload) -> Self::Future {
        ready(actor_from_headers(req).and_then(|actor| {
            actor
                .map(AuthenticatedUser)
                .ok_or_else(|| ErrorUnauthorized("Authentication required"))
        }))
    }
}

impl FromRequest for OptionalUser {
    type Error = Error;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _: &mut actix_web::dev::Payload) -> Self::Future {
        ready(actor_from_headers(req).map(OptionalUser))
    }
}
