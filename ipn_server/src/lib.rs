//! HTTP front end for the IPN listener.
//!
//! The gateway calls `/ipn` with the status-check URL of a transaction. Each request is handed to
//! [`ipn_engine::NotificationFlowApi`], which validates it, asks the gateway for the authoritative status (through
//! [`integrations::gateway::GatewayClient`]) and reconciles the transaction store. [`errors::ServerError`] turns the
//! outcome into a status code and a short plain-text body.
//!
//! Routes:
//! * `GET /health`: liveness check.
//! * `GET /ipn?url=...` and `POST /ipn` with `{"url": "..."}`: notifications. Other methods get a 405.
//!
//! Configuration comes from `IPN_*` environment variables; see [`config::ServerConfig`].

pub mod cli;
pub mod config;
pub mod data_objects;
pub mod errors;
pub mod helpers;
pub mod integrations;
pub mod routes;
pub mod server;

#[cfg(test)]
mod endpoint_tests;
