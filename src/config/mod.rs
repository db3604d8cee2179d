//! Configuration module

mod site;

pub use site::CmsConfig;
pub use site::MessagesConfig;
pub use site::ReadingConfig;
pub use site::RevalidateConfig;
pub use site::SiteConfig;
