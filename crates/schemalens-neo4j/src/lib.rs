//! # SchemaLens Neo4j
//!
//! A [`QueryService`](schemalens_core::QueryService) that reads label
//! statistics from a Neo4j server through the transactional Cypher HTTP
//! endpoint.
//!
//! Each query is a single-statement commit request. Store-reported errors
//! become [`QueryError::Api`](schemalens_core::QueryError::Api) and rows that
//! do not fit the expected columns become
//! [`QueryError::Decode`](schemalens_core::QueryError::Decode).
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use schemalens_core::prelude::*;
//! use schemalens_neo4j::{Neo4jConfig, Neo4jQueryService};
//! use std::sync::Arc;
//!
//! let service = Neo4jQueryService::new(Neo4jConfig::default())?;
//! let cache = ConceptCache::build(
//!     Arc::new(service),
//!     TypeHierarchy::builtin().into_shared(),
//!     BuildConfig::default(),
//! )
//! .await?;
//! ```

mod client;
pub mod cypher;

pub use client::{Neo4jConfig, Neo4jQueryService};
pub use cypher::Statement;
