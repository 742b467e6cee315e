use actix_web::{get, web, HttpRequest, HttpResponse};
use chrono::Utc;
use serde::Deserialize;
use tracing::debug;

use super::{actor_id, AppState};
use crate::error::{AppError, Result};
use crate::models::{AccountCreatedAt, ActorContext, DeviceSignals};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FeedQueryParams {
    /// Active role; defaults to the first entry of `roles`
    pub role: Option<String>,
    /// Comma separated role list held by the actor
    pub roles: Option<String>,
    pub account_created_at: Option<String>,
    /// Falls back to User-Agent sniffing when absent
    pub mobile: Option<bool>,
}

impl FeedQueryParams {
    fn role_list(&self) -> Vec<String> {
        self.roles
            .as_deref()
            .unwrap_or_default()
            .split(',')
            .map(str::trim)
            .filter(|role| !role.is_empty())
            .map(str::to_string)
            .collect()
    }

    fn actor(&self, actor_id: String, default_role: &str) -> Result<ActorContext> {
        let roles = self.role_list();
        let role = self
            .role
            .as_deref()
            .map(str::trim)
            .filter(|role| !role.is_empty())
            .map(str::to_string)
            .or_else(|| roles.first().cloned())
            .unwrap_or_else(|| default_role.to_string());

        if !roles.is_empty() && !roles.contains(&role) {
            return Err(AppError::BadRequest(format!(
                "Active role '{}' is not one of the actor's roles",
                role
            )));
        }

        Ok(ActorContext {
            actor_id,
            roles: if roles.is_empty() { vec![role.clone()] } else { roles },
            role,
            account_created_at: self
                .account_created_at
                .clone()
                .map(AccountCreatedAt::Raw),
        })
    }
}

fn is_mobile_user_agent(req: &HttpRequest) -> bool {
    req.headers()
        .get(actix_web::http::header::USER_AGENT)
        .and_then(|value| value.to_str().ok())
        .map(|ua| ua.contains("Mobi") || ua.contains("Android"))
        .unwrap_or(false)
}

#[get("/feed")]
pub async fn get_feed(
    query: web::Query<FeedQueryParams>,
    http_req: HttpRequest,
    state: web::Data<AppState>,
) -> Result<HttpResponse> {
    let actor_id = actor_id(&http_req)?;
    let service = &state.personalization;
    let actor = query.actor(actor_id, &service.catalog().default_role)?;
    let device = DeviceSignals {
        is_mobile: query.mobile.unwrap_or_else(|| is_mobile_user_agent(&http_req)),
    };

    debug!(actor_id = %actor.actor_id, role = %actor.role, is_mobile = device.is_mobile, "Feed requested");

    let feed = service.feed_for(&actor, device, Utc::now()).await?;
    Ok(HttpResponse::Ok().json(feed))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn params(role: Option<&str>, roles: Option<&str>) -> FeedQueryParams {
        FeedQueryParams {
            role: role.map(str::to_string),
            roles: roles.map(str::to_string),
            account_created_at: None,
            mobile: None,
        }
    }

    #[test]
    fn test_role_defaults_to_first_listed_role() {
        let actor = params(None, Some("seller, customer"))
            .actor("u1".to_string(), "customer")
            .unwrap();
        assert_eq!(actor.role, "seller");
        assert_eq!(actor.roles, vec!["seller", "customer"]);
    }

    #[test]
    fn test_role_defaults_to_catalog_default() {
        let actor = params(None, None).actor("u1".to_string(), "customer").unwrap();
        assert_eq!(actor.role, "customer");
    }

    #[test]
    fn test_active_role_must_be_held() {
        let err = params(Some("partner"), Some("seller"))
            .actor("u1".to_string(), "customer")
            .unwrap_err();
        assert!(matches!(err, AppError::BadRequest(_)));
    }
}
