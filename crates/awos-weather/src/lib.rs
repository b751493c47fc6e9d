//! AWOS weather session state for aviation weather displays
//!
//! Fetches raw METAR reports and airport metadata from remote HTTP
//! endpoints, decodes reports via the external `metar` parser, and
//! republishes the results as an observable session snapshot with a
//! single periodic refresh timer.

pub mod airport;
pub mod decode;
pub mod error;
pub mod metar;
pub mod poll;
pub mod retry;
pub mod session;
pub mod types;

pub use airport::AirportClient;
pub use decode::{decode_report, DecodedReport};
pub use error::{DecodeError, FetchError};
pub use metar::MetarClient;
pub use poll::PollHandle;
pub use session::{SessionController, SessionSnapshot};
pub use types::{AirportRecord, ResponseShape, Runway};
