//! Custom Axum extractors.
//!
//! `TaskSubmission` lets the mutation handlers accept a task draft as either
//! an HTML form body or a JSON body, dispatching on the request's
//! `Content-Type`.

use crate::types::TaskDraft;
use axum::{
    Form, Json, async_trait,
    extract::{FromRequest, Request},
    http::header::CONTENT_TYPE,
    response::{IntoResponse, Response},
};

/// Task draft extracted from a form or JSON request body.
///
/// `application/json` bodies go through [`Json`]; everything else goes
/// through [`Form`], matching what browsers submit.
#[derive(Debug)]
pub struct TaskSubmission(pub TaskDraft);

#[async_trait]
impl<S> FromRequest<S> for TaskSubmission
where
    S: Send + Sync,
{
    type Rejection = Response;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let content_type = req
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|value| value.to_str().ok())
            .unwrap_or_default();

        if content_type.starts_with("application/json") {
            let Json(draft) = Json::<TaskDraft>::from_request(req, state)
                .await
                .map_err(IntoResponse::into_response)?;
            Ok(Self(draft))
        } else {
            let Form(draft) = Form::<TaskDraft>::from_request(req, state)
                .await
                .map_err(IntoResponse::into_response)?;
            Ok(Self(draft))
        }
    }
}
