//! HTTP request handlers for API endpoints.
//!
//! Each handler module corresponds to a logical grouping of endpoints.

pub mod drafts;
pub mod health;
pub mod redirect;
pub mod shorten;
pub mod stats;
pub mod stats_list;
pub mod urls;

pub use drafts::{get_drafts_handler, put_drafts_handler};
pub use health::health_handler;
pub use redirect::redirect_handler;
pub use shorten::shorten_handler;
pub use stats::stats_handler;
pub use stats_list::stats_list_handler;
pub use urls::{create_url_handler, get_url_handler, list_urls_handler, record_click_handler};
