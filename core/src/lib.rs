//! Synchronous client for the DHIS2 Web API, as used inline in custom
//! forms and reports.
//!
//! # Overview
//! `Dhis2Client` composes a request URL from a base URL, an endpoint and a
//! merged set of query parameters (instance defaults overlaid by call-site
//! entries, call-site wins), performs the HTTP round-trip and returns the
//! parsed JSON body. `extract_query_param` reads a named parameter out of
//! a DHIS2-style location hash (`#/route?key=value`).
//!
//! # Design
//! - `Dhis2Client` is immutable after construction — base URL plus the
//!   fixed `paging=false` default parameter.
//! - URL composition and response parsing are plain functions over the
//!   `http` data types, so they test without a network; only `request`
//!   performs I/O.
//! - Failures map to one `ApiError` variant per cause (URL, status, JSON,
//!   transport) and are logged once inside `request` before propagating.

pub mod client;
pub mod error;
pub mod http;
pub mod location;

pub use client::{Dhis2Client, DEFAULT_BASE_URL};
pub use error::ApiError;
pub use http::{HttpMethod, HttpRequest, HttpResponse};
pub use location::extract_query_param;
