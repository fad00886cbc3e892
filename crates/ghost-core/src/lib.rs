#![deny(warnings)]
pub mod belief;
pub mod game;
pub mod model;
pub mod sensor;

pub struct AppInfo;

impl AppInfo {
    pub const fn name() -> &'static str {
        "ghostgrid"
    }

    pub const fn codename() -> &'static str {
        "Spectral"
    }

    pub const fn version() -> &'static str {
        env!("CARGO_PKG_VERSION")
    }
}

#[cfg(test)]
mod tests {
    use super::AppInfo;

    #[test]
    fn exposes_static_metadata() {
        assert_eq!(AppInfo::name(), "ghostgrid");
        assert_eq!(AppInfo::codename(), "Spectral");
        assert!(!AppInfo::version().is_empty());
    }
}
