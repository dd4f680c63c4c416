pub mod account;
pub mod ticket;

pub use account::{Account, NewAccount};
pub use ticket::{NewTicket, Ticket, TicketPatch, TicketRow, TicketStatus};
