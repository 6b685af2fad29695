pub mod forwarding_table;

pub use forwarding_table::{forwarding_tables, ForwardingEntry, ForwardingTable, PathReport, Route};
