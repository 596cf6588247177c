//! Incidentbot - declare, triage, and close incidents from Slack.
//!
//! # Architecture
//!
//! Inbound event → [`commands`] (normalizer) → [`services`] (lifecycle
//! controller) → [`store`] (incident records) + [`slack`] (presentation and
//! Web API calls).
//!
//! The controller is generic over the [`store::IncidentStore`] and
//! [`gateway::MessagingGateway`] capabilities; the binary wires it to
//! Postgres and the Slack Web API, the integration tests to in-memory fakes.

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod commands;
pub mod config;
pub mod db;
pub mod error;
pub mod gateway;
pub mod routes;
pub mod services;
pub mod slack;
pub mod state;
pub mod store;
