use axum::{async_trait, extract::FromRequestParts, http::request::Parts};

use crate::api::AppState;
use crate::errors::Error;
use crate::models::Customer;

/// Header carrying the authenticated principal. Token verification happens
/// upstream; the gateway forwards the verified company name here.
pub const IDENTITY_HEADER: &str = "x-company-name";

#[derive(Debug, Clone)]
pub struct CurrentCustomer(pub Customer);

#[async_trait]
impl FromRequestParts<AppState> for CurrentCustomer {
    type Rejection = Error;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let company_name = parts
            .headers
            .get(IDENTITY_HEADER)
            .and_then(|value| value.to_str().ok())
            .ok_or(Error::Unauthenticated)?;

        let customer = state
            .customers
            .find_by_company_name(company_name)
            .await?
            .ok_or(Error::Unauthenticated)?;

        Ok(CurrentCustomer(customer))
    }
}
