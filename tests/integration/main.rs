//! Integration tests for QuotaHub.
//!
//! These tests exercise the repositories and the HTTP router against a
//! real PostgreSQL database. They skip (and pass) when
//! `QUOTAHUB_TEST_DATABASE_URL` is not set.

mod helpers;
mod quota_api_test;
mod server_resources_test;
mod settings_test;
