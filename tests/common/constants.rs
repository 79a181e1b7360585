//! Shared constants for end-to-end tests
//!
//! This module contains all constants used across the test suite.
//! When test data changes (user credentials, seeded movies, etc.),
//! update only this file.

// ============================================================================
// Test User Credentials
// ============================================================================

/// Regular test user email
pub const TEST_USER_EMAIL: &str = "testuser@example.com";

/// Regular test user password
pub const TEST_USER_PASS: &str = "testpass123";

/// Admin test user email
pub const ADMIN_EMAIL: &str = "admin@example.com";

/// Admin test user password
pub const ADMIN_PASS: &str = "adminpass123";

// ============================================================================
// Seeded Movies
// ============================================================================
//
// The fixture database starts empty apart from the two users, then seeds
// these two movies in order, so their rowids are stable.

/// Id of the first seeded movie
pub const MOVIE_1_ID: i64 = 1;

/// Title of the first seeded movie
pub const MOVIE_1_TITLE: &str = "The Long Goodbye";

/// Id of the second seeded movie
pub const MOVIE_2_ID: i64 = 2;

/// Title of the second seeded movie
pub const MOVIE_2_TITLE: &str = "Stalker";

/// An id no seeded movie will ever have
pub const MISSING_MOVIE_ID: i64 = 424242;

// ============================================================================
// Test Timeouts and Configuration
// ============================================================================

/// Maximum time to wait for server to become ready (milliseconds)
pub const SERVER_READY_TIMEOUT_MS: u64 = 5000;

/// Timeout for individual HTTP requests (seconds)
pub const REQUEST_TIMEOUT_SECS: u64 = 10;

/// Polling interval when waiting for server ready (milliseconds)
pub const SERVER_READY_POLL_INTERVAL_MS: u64 = 50;

/// Secret used to sign session tokens in tests
pub const TEST_JWT_SECRET: &str = "e2e-test-secret";
