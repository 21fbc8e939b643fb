pub mod http;
pub mod method_override;
pub mod views;

pub use http::{app, router, AppState, HttpServer, HttpServerConfig};
pub use method_override::{MethodOverride, MethodOverrideLayer};
pub use views::{HtmlViews, Views};
