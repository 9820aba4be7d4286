use std::env::consts::{ARCH, OS};

/// Release builds may set these at compile time.
const COMMIT: Option<&str> = option_env!("TEMPEST_COMMIT");
const BUILD_DATE: Option<&str> = option_env!("TEMPEST_BUILD_DATE");

pub fn render() -> String {
    format!(
        "tempest {}\n  commit: {}\n  built:  {}\n  os:     {OS}/{ARCH}\n",
        env!("CARGO_PKG_VERSION"),
        COMMIT.unwrap_or("none"),
        BUILD_DATE.unwrap_or("unknown"),
    )
}
