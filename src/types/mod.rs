//! Request, response and routing types of the dispatch layer.
//!
//! Canonical forms:
//! - Entity path: kebab-case route segment, e.g. `user-profile`
//! - Collection: camelCase storage name, e.g. `userProfile`
//! - Method: lower-case bucket name, `all` being the wildcard

mod entity_path;
mod handler;
mod method;
mod request;
mod request_context;
mod response;

pub use entity_path::{EntityPath, class_to_path, path_to_collection};
pub use handler::{DEFAULT_PRIORITY, PrioritizedHandler};
pub use method::Method;
pub use request::RestRequest;
pub use request_context::RequestContext;
pub use response::{ErrorBody, RestResponse, status};
