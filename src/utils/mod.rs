pub mod archive_name;
pub mod clock;
pub mod schedule;

pub use archive_name::{normalize_archive_name, validate_archive_name};
pub use clock::{Clock, SystemClock};
pub use schedule::{DATE_LABEL_FORMAT, DrawSchedule, parse_date_label};
