// handlers/protected/mod.rs - Handlers behind jwt_auth_middleware
//
// Every handler here receives the caller as `Extension<AuthUser>` and passes
// it explicitly into the service layer.

pub mod tickets;
pub mod users;
