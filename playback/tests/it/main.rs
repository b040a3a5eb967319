#![deny(rust_2018_idioms)]

use config::{Config, File};
use playback::settings::Settings;

pub mod engine;
pub mod helper;

#[test]
fn test_local_settings_are_valid() {
    let settings = Config::builder()
        .add_source(File::with_name("config/local.yml").required(true))
        .set_override("environment", "local")
        .unwrap()
        .build()
        .unwrap()
        .try_deserialize::<Settings>()
        .unwrap();

    assert_eq!(settings.vessels.len(), 2);
}

#[test]
fn test_production_settings_are_valid() {
    Config::builder()
        .add_source(File::with_name("config/production.yml").required(true))
        .set_override("environment", "production")
        .unwrap()
        .build()
        .unwrap()
        .try_deserialize::<Settings>()
        .unwrap();
}
