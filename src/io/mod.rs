pub mod tickets;

pub use tickets::{read_tickets, read_tickets_csv, TicketReaderConfig};
