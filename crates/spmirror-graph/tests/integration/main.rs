//! Integration tests for the Graph adapter
//!
//! All tests run against a wiremock-based mock Graph API server; no real
//! network traffic is involved.

mod test_resolver;
mod test_upload;
