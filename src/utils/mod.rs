pub mod human_format;
pub mod logo;
pub mod url;

pub use logo::LogoUrlGenerator;
pub use url::UrlUtils;
