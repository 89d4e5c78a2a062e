pub mod backend;
pub mod client;
pub mod session;
pub mod simulate;
pub mod view;

pub use backend::SignalsBackend;
pub use client::HttpSignalsClient;
pub use session::Dashboard;
pub use view::{
    derive, ActionFilter, CategoryFilter, Filters, PageSize, SignalPage, SortConfig,
    SortDirection, SortKey, ViewQuery,
};
