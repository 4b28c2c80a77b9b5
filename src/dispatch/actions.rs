//! Per-route request shaping.
//!
//! Each [`Action`] extracts and validates its inputs and describes the one
//! upstream call to make, or answers locally.

use axum::{
    body::Body,
    http::Method,
    response::{IntoResponse, Response},
    Json,
};
use bytes::Bytes;

use crate::auth::Identity;
use crate::dispatch::inputs::{
    decode_json, parse_id, query_param, CommentUpdate, DeleteUser, MehmQuery, MehmUpdate,
    NewComment,
};
use crate::dispatch::outbound::{OutboundRequest, Stamped, Upstream};
use crate::error::{GatewayError, GatewayResult};
use crate::routing::PathParams;

/// What a route does once the caller is authenticated.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    Health,
    ListMehms,
    GetMehm,
    LikeMehm,
    RemoveMehm,
    UpdateMehm,
    Profile,
    ListUsers,
    ToggleElevation,
    DeleteUser,
    GetComment,
    NewComment,
    UpdateComment,
    RemoveComment,
}

/// The inbound request, reduced to what actions read.
pub struct Inbound {
    pub method: Method,
    pub params: PathParams,
    pub query: Option<String>,
    pub body: Body,
    pub body_limit: usize,
}

impl Inbound {
    fn query(&self) -> Option<&str> {
        self.query.as_deref()
    }

    fn path_id(&self) -> GatewayResult<u64> {
        parse_id(self.params.get("id"), "id")
    }

    /// Read the whole body, bounded by the configured limit.
    async fn bytes(self) -> GatewayResult<Bytes> {
        let limit = self.body_limit;
        axum::body::to_bytes(self.body, limit).await.map_err(|e| {
            if e.into_inner().is::<http_body_util::LengthLimitError>() {
                GatewayError::PayloadTooLarge { limit }
            } else {
                GatewayError::UnprocessableBody("failed reading request body".to_string())
            }
        })
    }
}

/// Result of preparing a route.
pub enum Prepared {
    /// Answer without contacting a backend.
    Respond(Response),
    /// Forward; `owner` names the account the request targets, if any.
    Forward {
        request: OutboundRequest,
        owner: Option<String>,
    },
}

impl Prepared {
    fn forward(request: OutboundRequest) -> GatewayResult<Self> {
        Ok(Prepared::Forward {
            request,
            owner: None,
        })
    }
}

fn verified(identity: Option<&Identity>) -> GatewayResult<&Identity> {
    identity.ok_or_else(|| GatewayError::Internal("route requires an identity".to_string()))
}

impl Action {
    pub async fn prepare(
        self,
        inbound: Inbound,
        identity: Option<&Identity>,
    ) -> GatewayResult<Prepared> {
        let caller = verified(identity);
        let method = inbound.method.clone();

        match self {
            Action::Health => {
                let body = Json(serde_json::json!({ "status": "ok" }));
                Ok(Prepared::Respond(body.into_response()))
            }

            Action::ListMehms => {
                caller?;
                let filters = MehmQuery::parse(inbound.query())?;
                Prepared::forward(
                    OutboundRequest::new(Upstream::Mehms, method, "/mehms").queries(filters.to_pairs()),
                )
            }

            Action::GetMehm => {
                let caller = caller?;
                let id = inbound.path_id()?;
                Prepared::forward(
                    OutboundRequest::new(Upstream::Mehms, method, format!("/mehms/get/{}", id))
                        .query("userId", &caller.id),
                )
            }

            Action::LikeMehm => {
                let caller = caller?;
                let id = inbound.path_id()?;
                Prepared::forward(
                    OutboundRequest::new(Upstream::Mehms, method, format!("/mehms/{}/like", id))
                        .query("userId", &caller.id),
                )
            }

            Action::RemoveMehm => {
                let caller = caller?;
                let id = inbound.path_id()?;
                Prepared::forward(
                    OutboundRequest::new(Upstream::Mehms, method, format!("/mehms/{}/remove", id))
                        .caller(caller),
                )
            }

            Action::UpdateMehm => {
                let caller = caller?;
                let id = inbound.path_id()?;
                let input: MehmUpdate = decode_json(&inbound.bytes().await?)?;
                Prepared::forward(
                    OutboundRequest::new(Upstream::Mehms, method, format!("/mehms/{}/update", id))
                        .caller(caller)
                        .json(&Stamped::new(&input, caller))?,
                )
            }

            Action::Profile => Ok(Prepared::Respond(Json(caller?.clone()).into_response())),

            Action::ListUsers => {
                caller?;
                Prepared::forward(OutboundRequest::new(Upstream::Users, method, "/all"))
            }

            Action::ToggleElevation => {
                caller?;
                let raw = query_param(inbound.query(), "id");
                let id = parse_id(raw.as_deref(), "id")?;
                Prepared::forward(
                    OutboundRequest::new(Upstream::Users, method, "/elevate").query("id", id),
                )
            }

            Action::DeleteUser => {
                caller?;
                let input: DeleteUser = decode_json(&inbound.bytes().await?)?;
                Ok(Prepared::Forward {
                    request: OutboundRequest::new(Upstream::Users, method, "/delete")
                        .query("id", &input.id),
                    owner: Some(input.id),
                })
            }

            Action::GetComment => {
                caller?;
                let id = inbound.path_id()?;
                Prepared::forward(OutboundRequest::new(
                    Upstream::Mehms,
                    method,
                    format!("/comments/get/{}", id),
                ))
            }

            Action::NewComment => {
                let caller = caller?;
                let query = inbound.query.clone();
                let body = inbound.bytes().await?;
                let input = if body.is_empty() {
                    NewComment::from_query(query.as_deref())?
                } else {
                    decode_json::<NewComment>(&body)?
                };
                Prepared::forward(
                    OutboundRequest::new(Upstream::Mehms, method, "/comments/new")
                        .query("userId", &caller.id)
                        .json(&Stamped::new(&input, caller))?,
                )
            }

            Action::UpdateComment => {
                let caller = caller?;
                let input: CommentUpdate = decode_json(&inbound.bytes().await?)?;
                Prepared::forward(
                    OutboundRequest::new(Upstream::Mehms, method, "/comments/update")
                        .caller(caller)
                        .json(&Stamped::new(&input, caller))?,
                )
            }

            Action::RemoveComment => {
                let caller = caller?;
                let raw = query_param(inbound.query(), "commentId");
                let id = parse_id(raw.as_deref(), "commentId")?;
                Prepared::forward(
                    OutboundRequest::new(Upstream::Mehms, method, "/comments/remove")
                        .query("commentId", id)
                        .caller(caller),
                )
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::routing::{RouteLookup, RouteTable, ROUTES};

    fn identity(admin: bool) -> Identity {
        Identity {
            id: "11".into(),
            username: "ada".into(),
            email: "ada@example.com".into(),
            is_admin: admin,
        }
    }

    fn inbound(method: Method, path: &str, query: Option<&str>, body: &'static str) -> Inbound {
        let params = match RouteTable::new(ROUTES).lookup(&method, path) {
            RouteLookup::Matched(m) => m.params,
            other => panic!("no route for {}: {:?}", path, other),
        };
        Inbound {
            method,
            params,
            query: query.map(str::to_owned),
            body: Body::from(body),
            body_limit: 1024,
        }
    }

    async fn forwarded(action: Action, inbound: Inbound, identity: &Identity) -> (OutboundRequest, Option<String>) {
        match action.prepare(inbound, Some(identity)).await {
            Ok(Prepared::Forward { request, owner }) => (request, owner),
            Ok(Prepared::Respond(_)) => panic!("expected forward"),
            Err(e) => panic!("prepare failed: {}", e),
        }
    }

    #[tokio::test]
    async fn test_get_mehm_passes_caller_id() {
        let (request, owner) = forwarded(
            Action::GetMehm,
            inbound(Method::GET, "/api/mehms/5", None, ""),
            &identity(false),
        )
        .await;
        assert_eq!(request.upstream, Upstream::Mehms);
        assert_eq!(request.path_and_query(), "/mehms/get/5?userId=11");
        assert!(request.body.is_none());
        assert!(owner.is_none());
    }

    #[tokio::test]
    async fn test_remove_comment_requires_numeric_id() {
        let err = Action::RemoveComment
            .prepare(
                inbound(Method::POST, "/api/comments/remove", Some("commentId=abc"), ""),
                Some(&identity(false)),
            )
            .await
            .err()
            .unwrap();
        assert_eq!(err.status_code().as_u16(), 400);

        let (request, _) = forwarded(
            Action::RemoveComment,
            inbound(Method::POST, "/api/comments/remove", Some("commentId=8"), ""),
            &identity(true),
        )
        .await;
        assert_eq!(
            request.path_and_query(),
            "/comments/remove?commentId=8&userId=11&isAdmin=true"
        );
    }

    #[tokio::test]
    async fn test_delete_user_reports_target_owner() {
        let (request, owner) = forwarded(
            Action::DeleteUser,
            inbound(Method::POST, "/api/user/delete", None, r#"{"id":"99"}"#),
            &identity(false),
        )
        .await;
        assert_eq!(request.upstream, Upstream::Users);
        assert_eq!(request.path_and_query(), "/delete?id=99");
        assert_eq!(owner.as_deref(), Some("99"));
    }

    #[tokio::test]
    async fn test_new_comment_falls_back_to_query() {
        let (request, _) = forwarded(
            Action::NewComment,
            inbound(Method::POST, "/api/comments/new", Some("mehmId=4&comment=yo"), ""),
            &identity(false),
        )
        .await;
        let body: serde_json::Value = serde_json::from_slice(request.body.as_ref().unwrap()).unwrap();
        assert_eq!(body["mehmId"], 4);
        assert_eq!(body["comment"], "yo");
        assert_eq!(body["userId"], "11");
    }

    #[tokio::test]
    async fn test_client_cannot_spoof_identity_fields() {
        let (request, _) = forwarded(
            Action::UpdateComment,
            inbound(
                Method::POST,
                "/api/comments/update",
                None,
                r#"{"id":3,"comment":"x","userId":"1","isAdmin":true}"#,
            ),
            &identity(false),
        )
        .await;
        let body: serde_json::Value = serde_json::from_slice(request.body.as_ref().unwrap()).unwrap();
        assert_eq!(
            body,
            serde_json::json!({"id": 3, "text": "x", "userId": "11", "isAdmin": false})
        );
        assert_eq!(
            request.path_and_query(),
            "/comments/update?userId=11&isAdmin=false"
        );
    }

    #[tokio::test]
    async fn test_update_mehm_stamps_admin_identity() {
        let (request, owner) = forwarded(
            Action::UpdateMehm,
            inbound(
                Method::POST,
                "/api/mehms/3/update",
                None,
                r#"{"title":"t","description":"d","userId":"9","isAdmin":false}"#,
            ),
            &identity(true),
        )
        .await;
        assert_eq!(request.upstream, Upstream::Mehms);
        assert_eq!(request.method, Method::POST);
        assert_eq!(request.path_and_query(), "/mehms/3/update?userId=11&isAdmin=true");
        assert!(owner.is_none());

        let body: serde_json::Value = serde_json::from_slice(request.body.as_ref().unwrap()).unwrap();
        assert_eq!(
            body,
            serde_json::json!({"description": "d", "title": "t", "userId": "11", "isAdmin": true})
        );
    }

    #[tokio::test]
    async fn test_remove_mehm_passes_caller_params() {
        let (request, _) = forwarded(
            Action::RemoveMehm,
            inbound(Method::POST, "/api/mehms/3/remove", None, ""),
            &identity(false),
        )
        .await;
        assert_eq!(request.method, Method::POST);
        assert_eq!(request.path_and_query(), "/mehms/3/remove?userId=11&isAdmin=false");
        assert!(request.body.is_none());
    }

    #[tokio::test]
    async fn test_oversized_body_is_rejected() {
        let mut request = inbound(Method::POST, "/api/user/delete", None, r#"{"id":"99"}"#);
        request.body_limit = 4;
        let err = Action::DeleteUser
            .prepare(request, Some(&identity(false)))
            .await
            .err()
            .unwrap();
        assert_eq!(err.status_code().as_u16(), 413);
    }

    #[tokio::test]
    async fn test_health_needs_no_identity() {
        let prepared = Action::Health
            .prepare(inbound(Method::GET, "/health", None, ""), None)
            .await
            .ok()
            .unwrap();
        assert!(matches!(prepared, Prepared::Respond(_)));
    }
}
