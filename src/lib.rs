pub mod configuration;
pub mod domain;
pub mod extract;
pub mod gateway;
pub mod openapi;
pub mod routes;
pub mod startup;
pub mod telemetry;
pub mod trial;
