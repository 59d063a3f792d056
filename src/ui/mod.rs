pub mod icons;
pub mod output;
pub mod table;
pub mod theme;

pub use icons::Icons;
pub use output::{dim, error, header, info, section, status, success, summary_row, warn};
pub use table::{dentist_table, totals_table};
pub use theme::{Theme, theme};
