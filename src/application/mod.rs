//! Application layer: Use cases and services.
//!
//! This module orchestrates domain logic with ports to implement
//! the core use cases of the application.

pub mod chat;
pub mod clothing;
pub mod dashboard;
pub mod gateway;

pub use chat::{AdviceChatService, ChatOutcome, PersonalizedAdvice};
pub use clothing::{ClothingAdvice, ClothingService, ClothingSource, ClothingStrategy};
pub use dashboard::{resolve_location, Dashboard, DashboardService};
pub use gateway::AggregationGateway;
