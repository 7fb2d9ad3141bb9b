//! # SchemaLens Web
//!
//! JSON HTTP API and static browser UI over a [`ConceptCache`](schemalens_core::ConceptCache).
//!
//! ## Quick Start
//!
//! ```bash
//! # Serve the built-in sample graph
//! cargo run -p schemalens-web -- --demo --port 8080
//!
//! # Serve a Neo4j server
//! cargo run -p schemalens-web -- --neo4j-url http://localhost:7474
//! ```
//!
//! ## API Endpoints
//!
//! | Method | Path | Description |
//! |--------|------|-------------|
//! | GET | `/api/health` | Readiness, build time and concept count |
//! | GET | `/api/concepts` | Concept summaries sorted by label |
//! | GET | `/api/concepts/:label` | One concept with hierarchy details, 404 if unknown |
//! | POST | `/api/rebuild` | Rebuild the snapshot, 502 if the store cannot list labels |

pub mod config;
pub mod routes;
pub mod state;

pub use config::Config;
pub use routes::create_router;
pub use state::AppState;
