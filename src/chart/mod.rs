//! Chart layer: turns query views into declarative [`spec::ChartSpec`]s that any
//! plotting backend can draw. The egui backend lives in `ui::plot`.

pub mod render;
pub mod spec;

pub use render::{render_price_chart, render_volume_chart};
pub use spec::ChartSpec;
