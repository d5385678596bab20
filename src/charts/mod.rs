//! Charts module - PNG export of the dashboard figures

mod renderer;

pub use renderer::{date_span, value_ceiling, ChartError, ChartRenderer};
