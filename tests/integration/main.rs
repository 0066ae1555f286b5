//! Integration tests for the scraper
//!
//! These tests use wiremock to stand up a mock job-ad site and exercise
//! the fetch layer, login sequence, listing walk and full runs end-to-end.

mod common;
mod fetch_tests;
mod listing_tests;
mod run_tests;
mod session_tests;
