use crate::client::NStackClient;
use crate::error::ClientError;
use nstack_cache::{get_json, set_json};
use nstack_core::LanguageDescriptor;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

pub const COUNTRIES_KEY: &str = "CountriesKey";
pub const CONTINENTS_KEY: &str = "ContinentsKey";
pub const LANGUAGES_KEY: &str = "LanguangesKey";
pub const TIMEZONES_KEY: &str = "TimezonesKey";

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct IpAddress {
    pub ip_start: String,
    pub ip_end: String,
    pub country: String,
    pub state_prov: String,
    pub city: String,
    pub lat: String,
    pub lng: String,
    pub time_zone_offset: String,
    pub time_zone_name: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Country {
    pub id: i64,
    pub name: String,
    pub code: String,
    pub code_iso: String,
    pub native: String,
    pub phone: i64,
    pub capital: String,
    pub capital_time_zone: String,
    pub currency: String,
    pub currency_name: String,
    pub image: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Continent {
    pub id: i64,
    pub name: String,
    pub code: String,
    pub image_url: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Timezone {
    pub id: i64,
    pub name: String,
    pub abbr: String,
    pub offset_sec: i64,
    pub label: String,
}

impl NStackClient {
    pub async fn ip_details(&self) -> Result<IpAddress, ClientError> {
        self.get_data("geographic/ip-address").await
    }

    pub async fn countries(&self) -> Result<Vec<Country>, ClientError> {
        self.get_data("geographic/countries").await
    }

    pub async fn continents(&self) -> Result<Vec<Continent>, ClientError> {
        self.get_data("geographic/continents").await
    }

    pub async fn languages(&self) -> Result<Vec<LanguageDescriptor>, ClientError> {
        self.get_data("geographic/languages").await
    }

    pub async fn timezones(&self) -> Result<Vec<Timezone>, ClientError> {
        self.get_data("geographic/time_zones").await
    }

    /// The time zone at a coordinate.
    pub async fn timezone(&self, lat: f64, lng: f64) -> Result<Timezone, ClientError> {
        self.get_data(&format!("geographic/time_zones/by_lat_lng?lat_lng={},{}", lat, lng))
            .await
    }

    pub async fn update_countries(&self) -> Result<Vec<Country>, ClientError> {
        let countries = self.countries().await?;
        self.persist(COUNTRIES_KEY, &countries).await?;
        Ok(countries)
    }

    pub async fn update_continents(&self) -> Result<Vec<Continent>, ClientError> {
        let continents = self.continents().await?;
        self.persist(CONTINENTS_KEY, &continents).await?;
        Ok(continents)
    }

    pub async fn update_languages(&self) -> Result<Vec<LanguageDescriptor>, ClientError> {
        let languages = self.languages().await?;
        self.persist(LANGUAGES_KEY, &languages).await?;
        Ok(languages)
    }

    pub async fn update_timezones(&self) -> Result<Vec<Timezone>, ClientError> {
        let timezones = self.timezones().await?;
        self.persist(TIMEZONES_KEY, &timezones).await?;
        Ok(timezones)
    }

    pub async fn cached_countries(&self) -> Result<Vec<Country>, ClientError> {
        self.cached(COUNTRIES_KEY).await
    }

    pub async fn cached_continents(&self) -> Result<Vec<Continent>, ClientError> {
        self.cached(CONTINENTS_KEY).await
    }

    pub async fn cached_languages(&self) -> Result<Vec<LanguageDescriptor>, ClientError> {
        self.cached(LANGUAGES_KEY).await
    }

    pub async fn cached_timezones(&self) -> Result<Vec<Timezone>, ClientError> {
        self.cached(TIMEZONES_KEY).await
    }

    async fn persist<T: Serialize>(&self, key: &str, values: &[T]) -> Result<(), ClientError> {
        set_json(self.store.as_ref(), key, values).await?;
        tracing::debug!(key, count = values.len(), "cached geographic data");
        Ok(())
    }

    /// Nothing cached yet reads as empty.
    async fn cached<T: DeserializeOwned>(&self, key: &str) -> Result<Vec<T>, ClientError> {
        Ok(get_json(self.store.as_ref(), key).await?.unwrap_or_default())
    }
}
