pub(crate) const DEFAULT_USER_AGENT: &str = concat!("ratewave/", env!("CARGO_PKG_VERSION"));
