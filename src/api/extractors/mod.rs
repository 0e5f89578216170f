/*!
 * Request extractors for the auth-check endpoint
 *
 * - BearerToken: raw token from `Authorization: Bearer ...` (401 when absent)
 * - OriginalRequest: method/URI of the request being authorized, as forwarded
 *   by the front-end in X-Original-* headers (400 when the URI is absent)
 */

mod bearer;
mod original_request;

pub use bearer::BearerToken;
pub use original_request::{ORIGINAL_METHOD, ORIGINAL_URI, OriginalRequest};
