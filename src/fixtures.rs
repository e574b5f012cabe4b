//! Shared test model: an orders extract feeding customers, orders, their link
//! and two satellites, plus a role-playing copy of the customer side.

use crate::config::LoadConfig;
use crate::metadata::{
    DrivingKeyField, EffectivitySatellite, Field, FieldDataType as T, Hub, Link, RolePlayingHub, Satellite, Table,
    TableRegistry,
};
use crate::orchestrator::DataVaultLoad;
use crate::staging::{MemoryStaging, StagedRow, StagingLocation};
use chrono::{DateTime, NaiveDate, TimeZone, Utc};
use rstest::fixture;

const SCHEMA: &str = "dv";

/// Hash key, record metadata, then `business_key` at position 4.
pub fn hub_fields(table: &str, business_key: &str) -> Vec<Field> {
    vec![
        Field::new(table, format!("{table}_hashkey"), T::Text, 1, true).with_length(32),
        Field::new(table, "r_timestamp", T::TimestampNtz, 2, true),
        Field::new(table, "r_source", T::Text, 3, true),
        Field::new(table, business_key, T::Text, 4, true),
    ]
}

fn link_fields(table: &str, customer_hub: &str, customer_key: &str) -> Vec<Field> {
    vec![
        Field::new(table, format!("{table}_hashkey"), T::Text, 1, true).with_length(32),
        Field::new(table, "h_order_hashkey", T::Text, 2, true).with_length(32),
        Field::new(table, format!("{customer_hub}_hashkey"), T::Text, 3, true).with_length(32),
        Field::new(table, "order_id", T::Text, 4, true),
        Field::new(table, customer_key, T::Text, 5, true),
        Field::new(table, "ck_test_string", T::Text, 6, true),
        Field::new(table, "ck_test_timestamp", T::TimestampNtz, 7, true),
        Field::new(table, "r_timestamp", T::TimestampNtz, 8, true),
        Field::new(table, "r_source", T::Text, 9, true),
    ]
}

fn satellite_head(table: &str, key_field: &str) -> Vec<Field> {
    vec![
        Field::new(table, key_field, T::Text, 1, true).with_length(32),
        Field::new(table, "s_hashdiff", T::Text, 2, true).with_length(32),
        Field::new(table, "r_timestamp", T::TimestampNtz, 3, true),
        Field::new(table, "r_timestamp_end", T::TimestampNtz, 4, true),
        Field::new(table, "r_source", T::Text, 5, true),
    ]
}

/// Effectivity layout with a single `dummy_descriptive_field` payload.
pub fn effectivity_fields(table: &str, key_field: &str) -> Vec<Field> {
    let mut fields = satellite_head(table, key_field);
    fields.push(Field::new(table, "dummy_descriptive_field", T::Text, 6, true));
    fields
}

fn batch_location(extract_start_timestamp: DateTime<Utc>) -> StagingLocation {
    StagingLocation::new("dv_stg", format!("orders_{}", extract_start_timestamp.format("%Y%m%d_%H%M%S")))
}

/// One extracted order line. `payload` feeds both satellites.
pub fn order_row(customer_id: &str, order_id: &str, payload: &str) -> StagedRow {
    let placed = NaiveDate::from_ymd_opt(2019, 8, 5).and_then(|d| d.and_hms_opt(12, 0, 0)).unwrap();
    StagedRow::new()
        .with("customer_id", customer_id)
        .with("order_id", order_id)
        .with("ck_test_string", "web")
        .with("ck_test_timestamp", placed)
        .with("test_string", payload)
        .with("x_customer_id", customer_id)
        .with("dummy_descriptive_field", payload)
}

pub fn orders_staging(config: &LoadConfig, rows: Vec<StagedRow>) -> MemoryStaging {
    MemoryStaging::new().with_rows(config.staging_location(), rows)
}

#[fixture]
pub fn extract_start_timestamp() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2019, 8, 6, 0, 0, 0).unwrap()
}

#[fixture]
pub fn load_config(extract_start_timestamp: DateTime<Utc>) -> LoadConfig {
    LoadConfig {
        source: "test".into(),
        extract_schema: "dv_extract".into(),
        extract_table: "extract_orders".into(),
        staging_schema: "dv_stg".into(),
        staging_table: "orders".into(),
        extract_start_timestamp,
        ..Default::default()
    }
}

#[fixture]
pub fn h_customer(extract_start_timestamp: DateTime<Utc>) -> Hub {
    Hub::new(SCHEMA, "h_customer", hub_fields("h_customer", "customer_id"))
        .unwrap()
        .with_staging(batch_location(extract_start_timestamp))
}

#[fixture]
pub fn h_customer_test_role_playing(extract_start_timestamp: DateTime<Utc>) -> RolePlayingHub {
    let name = "h_customer_test_role_playing";
    RolePlayingHub::new(SCHEMA, name, hub_fields(name, "customer_test_role_playing_id"), "h_customer")
        .unwrap()
        .with_staging(batch_location(extract_start_timestamp))
}

#[fixture]
pub fn h_order() -> Hub {
    Hub::new(SCHEMA, "h_order", hub_fields("h_order", "order_id")).unwrap()
}

#[fixture]
pub fn l_order_customer(extract_start_timestamp: DateTime<Utc>) -> Link {
    Link::new(SCHEMA, "l_order_customer", link_fields("l_order_customer", "h_customer", "customer_id"))
        .unwrap()
        .with_staging(batch_location(extract_start_timestamp))
}

#[fixture]
pub fn l_order_customer_test_role_playing() -> Link {
    let name = "l_order_customer_test_role_playing";
    Link::new(
        SCHEMA,
        name,
        link_fields(name, "h_customer_test_role_playing", "customer_test_role_playing_id"),
    )
    .unwrap()
}

#[fixture]
pub fn hs_customer(extract_start_timestamp: DateTime<Utc>) -> Satellite {
    let t = "hs_customer";
    let mut fields = satellite_head(t, "h_customer_hashkey");
    fields.extend([
        Field::new(t, "test_string", T::Text, 6, false),
        Field::new(t, "test_date", T::Date, 7, false),
        Field::new(t, "test_timestamp", T::TimestampNtz, 8, false),
        Field::new(t, "test_integer", T::Number, 9, false).with_numeric(38, 0),
        Field::new(t, "test_decimal", T::Number, 10, false).with_numeric(18, 8),
        Field::new(t, "x_customer_id", T::Text, 11, false),
        Field::new(t, "grouping_key", T::Text, 12, false),
    ]);
    Satellite::new(SCHEMA, t, fields)
        .unwrap()
        .with_staging(batch_location(extract_start_timestamp))
}

#[fixture]
pub fn ls_order_customer_eff() -> EffectivitySatellite {
    let name = "ls_order_customer_eff";
    let keys = vec![DrivingKeyField::new("h_customer_hashkey", "l_order_customer", name)];
    EffectivitySatellite::new(SCHEMA, name, effectivity_fields(name, "l_order_customer_hashkey"), keys).unwrap()
}

#[fixture]
pub fn ls_order_customer_test_role_playing_eff() -> EffectivitySatellite {
    let name = "ls_order_customer_test_role_playing_eff";
    let keys = vec![DrivingKeyField::new(
        "h_customer_test_role_playing_hashkey",
        "l_order_customer_test_role_playing",
        name,
    )];
    let fields = effectivity_fields(name, "l_order_customer_test_role_playing_hashkey");
    EffectivitySatellite::new(SCHEMA, name, fields, keys).unwrap()
}

/// The five tables of the plain model, in dependency order.
#[fixture]
pub fn all_tables(
    h_customer: Hub,
    h_order: Hub,
    l_order_customer: Link,
    hs_customer: Satellite,
    ls_order_customer_eff: EffectivitySatellite,
) -> Vec<Table> {
    vec![
        h_customer.into(),
        h_order.into(),
        l_order_customer.into(),
        hs_customer.into(),
        ls_order_customer_eff.into(),
    ]
}

#[fixture]
pub fn data_vault_load(load_config: LoadConfig, all_tables: Vec<Table>) -> DataVaultLoad {
    DataVaultLoad::new(load_config, all_tables, &TableRegistry::new()).unwrap()
}
