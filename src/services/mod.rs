pub mod account_service;
pub mod ticket_service;

pub use account_service::{AccountError, AccountService, AuthPayload, LoginRequest, RegisterRequest};
pub use ticket_service::{CreateTicketRequest, TicketError, TicketService};
