/// OpenAPI documentation generation.
pub mod documentation;
/// Game session operations: start, roll, score and queries.
pub mod game_service;
/// Health check service.
pub mod health_service;
/// Storage connection supervisor toggling degraded mode.
pub mod storage_supervisor;
/// Player registration.
pub mod user_service;
