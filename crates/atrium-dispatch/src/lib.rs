pub mod adapter;
pub mod dispatcher;
pub mod error;
pub mod mock_adapters;
pub mod registry;
pub mod types;
pub mod weather;

pub use adapter::{CredentialStore, NoCredentials, ToolAdapter};
pub use dispatcher::Dispatcher;
pub use error::{DispatchError, Result};
pub use types::{DispatchOutcome, DispatchRequest};
pub use weather::WeatherForecastAdapter;
