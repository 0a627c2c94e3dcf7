pub mod client;
pub mod content;
pub mod error;
pub mod geography;
pub mod transport;
pub mod translations;

pub use client::{DataEnvelope, NStackClient};
pub use content::ContentRef;
pub use error::ClientError;
pub use geography::{Continent, Country, IpAddress, Timezone};
pub use transport::HttpTransport;
pub use translations::{translations_key, StoreLocalizationRefresher};
