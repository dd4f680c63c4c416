// handlers/mod.rs - Two security tiers
//
// public:    no authentication (service info, health, register, login)
// protected: bearer JWT required (/api/tickets/*, /api/users/me)

pub mod protected;
pub mod public;
pub mod utils;
