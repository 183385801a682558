//! Per-request state threaded through a dispatch chain.

use crate::computed::{Computed, Properties};

use super::entity_path::EntityPath;
use super::request::RestRequest;
use super::response::RestResponse;

/// Everything a handler sees for one request: the request, the resolved
/// entity path, a private copy of the registered prototype (if any) and the
/// response being built.
///
/// A context is owned by a single dispatch and never shared between
/// requests.
#[derive(Debug)]
pub struct RequestContext {
    request: RestRequest,
    path: EntityPath,
    prototype: Option<Computed>,
    response: RestResponse,
}

impl RequestContext {
    pub fn new(request: RestRequest, path: EntityPath, prototype: Option<Computed>) -> Self {
        Self {
            request,
            path,
            prototype,
            response: RestResponse::new(),
        }
    }

    pub fn request(&self) -> &RestRequest {
        &self.request
    }

    pub fn path(&self) -> &EntityPath {
        &self.path
    }

    /// The registered prototype for this path, used to recover default
    /// field sets and validators.
    pub fn prototype(&self) -> Option<&Computed> {
        self.prototype.as_ref()
    }

    /// Shorthand for [`RestRequest::params`].
    pub fn params(&self) -> Properties {
        self.request.params()
    }

    pub fn response(&self) -> &RestResponse {
        &self.response
    }

    pub fn response_mut(&mut self) -> &mut RestResponse {
        &mut self.response
    }

    pub fn into_response(self) -> RestResponse {
        self.response
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::computed::EntitySchema;

    #[test]
    fn test_context_accessors() {
        let schema = EntitySchema::builder("Note")
            .undefined_field("title")
            .build()
            .unwrap();
        let ctx = RequestContext::new(
            RestRequest::new("GET", "note").with_id("1"),
            EntityPath::from_segment("note"),
            Some(Computed::new(schema)),
        );

        assert_eq!(ctx.path().as_str(), "note");
        assert_eq!(ctx.prototype().map(Computed::type_name), Some("Note"));
        assert_eq!(ctx.params()["id"].as_str(), Some("1"));
        assert!(!ctx.response().is_handled());
    }

    #[test]
    fn test_into_response() {
        let mut ctx = RequestContext::new(
            RestRequest::new("DELETE", "note"),
            EntityPath::from_segment("note"),
            None,
        );
        ctx.response_mut().set_status(204);
        assert_eq!(ctx.into_response().status(), Some(204));
    }
}
