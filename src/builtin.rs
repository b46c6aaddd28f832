/// Site stylesheet, linked from every page.
pub const SITE_CSS: &str = include_str!("builtin.css");
