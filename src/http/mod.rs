//! HTTP API server for the browser client
//!
//! This module provides a REST API for driving interview sessions:
//! - POST /sessions - Start a session from a question list or a candidate profile
//! - GET /sessions/:id - Query the session snapshot
//! - DELETE /sessions/:id - Abandon a session
//! - POST /sessions/:id/recording/{start,stop,retry,chunk} - Recording window
//! - POST /sessions/:id/device, GET /sessions/:id/preview - Capture device
//! - POST /sessions/:id/{submit,skip,navigate,finish} - Answers and navigation
//! - GET /health - Health check

mod handlers;
mod routes;
mod state;

pub use routes::create_router;
pub use state::{AppState, SessionEntry};
