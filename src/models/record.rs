//! Flat key -> value export of annotated zones.
//!
//! Downstream consumers (dataframes, JSON-lines ingestion) rely on every
//! row carrying the same key set, with nulls where a field does not apply
//! to the zone's kind or annotation state. Field names are stable;
//! renaming one is a breaking change.

use serde_json::{Map, Value};
use strum::IntoEnumIterator;

use crate::domain::Timeframe;
use crate::models::zone::{AnnotatedZone, IndicatorSnapshot, NearbySummary, ZoneKind, ZonePayload};

const PAYLOAD_COLUMNS: [&str; 7] = [
    "body_size",
    "wick_ratio",
    "member_count",
    "level",
    "level_deviation",
    "avg_volume_around_zone",
    "duration_between_first_last_touch",
];

// serde_json maps non-finite floats to null, which is exactly what the
// "no distance found" infinities should become.
fn num(value: f64) -> Value {
    Value::from(value)
}

fn opt_num(value: Option<f64>) -> Value {
    value.map(num).unwrap_or(Value::Null)
}

fn opt_u64(value: Option<u64>) -> Value {
    value.map(Value::from).unwrap_or(Value::Null)
}

fn opt_i64(value: Option<i64>) -> Value {
    value.map(Value::from).unwrap_or(Value::Null)
}

fn put(record: &mut Map<String, Value>, key: &str, value: Value) {
    record.insert(key.to_string(), value);
}

/// Flattens one annotated zone into a uniform record. Bare zones (no
/// annotations) produce the same keys with zeroed counters and nulls.
pub fn flat_record(annotated: &AnnotatedZone) -> Map<String, Value> {
    let zone = &annotated.zone;
    let mut record = Map::new();

    put(&mut record, "kind", Value::from(zone.kind.abbrev()));
    put(&mut record, "symbol", Value::from(zone.symbol.as_str()));
    put(&mut record, "timeframe", Value::from(zone.timeframe.label()));
    put(&mut record, "price_high", num(zone.price_high));
    put(&mut record, "price_low", num(zone.price_low));
    put(&mut record, "zone_width", num(zone.zone_width()));
    put(
        &mut record,
        "created_index",
        Value::from(zone.created_index as u64),
    );
    put(&mut record, "created_time", Value::from(zone.created_time_ms));
    put(
        &mut record,
        "touch_index",
        opt_u64(zone.touch.map(|t| t.index as u64)),
    );
    put(
        &mut record,
        "touch_time",
        opt_i64(zone.touch.map(|t| t.time_ms)),
    );

    put_payload(&mut record, "", &zone.payload);

    for (name, value) in zone.snapshot.fields() {
        put(&mut record, name, opt_num(value));
    }
    put(&mut record, "avg_volume_5", num(zone.stats.avg_volume_5));
    put(&mut record, "close_std_5", num(zone.stats.close_std_5));
    put(&mut record, "momentum_5", num(zone.stats.momentum_5));

    put_confluence_counters(&mut record, annotated);

    let nearby = annotated.nearby.clone().unwrap_or_default();
    put(
        &mut record,
        "distance_to_nearest_zone_above",
        num(nearby.distance_above),
    );
    put(
        &mut record,
        "distance_to_nearest_zone_below",
        num(nearby.distance_below),
    );
    put_nearby_side(&mut record, "above", nearby.above.as_ref());
    put_nearby_side(&mut record, "below", nearby.below.as_ref());

    let reaction = annotated.reaction.clone().unwrap_or_default();
    put(
        &mut record,
        "touch_type",
        reaction
            .touch_type
            .map(|t| Value::from(t.label()))
            .unwrap_or(Value::Null),
    );
    put(
        &mut record,
        "reaction_index",
        opt_u64(reaction.touch_index.map(|i| i as u64)),
    );
    let candle = reaction.touch_candle;
    put(&mut record, "reaction_open", opt_num(candle.map(|c| c.open)));
    put(&mut record, "reaction_high", opt_num(candle.map(|c| c.high)));
    put(&mut record, "reaction_low", opt_num(candle.map(|c| c.low)));
    put(
        &mut record,
        "reaction_close",
        opt_num(candle.map(|c| c.close)),
    );
    put(
        &mut record,
        "reaction_volume",
        opt_num(candle.map(|c| c.volume)),
    );

    let target = reaction.target;
    put(
        &mut record,
        "target_kind",
        target
            .map(|t| Value::from(t.kind.abbrev()))
            .unwrap_or(Value::Null),
    );
    put(
        &mut record,
        "target_timeframe",
        target
            .map(|t| Value::from(t.timeframe.label()))
            .unwrap_or(Value::Null),
    );
    put(
        &mut record,
        "target_price_high",
        opt_num(target.map(|t| t.price_high)),
    );
    put(
        &mut record,
        "target_price_low",
        opt_num(target.map(|t| t.price_low)),
    );
    put(
        &mut record,
        "target_crossed_index",
        opt_u64(target.map(|t| t.crossed_at_index as u64)),
    );

    record
}

// Counter keys exist for every kind and timeframe even when zero, so rows
// from different symbols and runs always align column-wise.
fn put_confluence_counters(record: &mut Map<String, Value>, annotated: &AnnotatedZone) {
    let mut kind_counts: Vec<(&'static str, u64)> =
        ZoneKind::iter().map(|k| (k.abbrev(), 0)).collect();
    let mut tf_counts: Vec<(&'static str, u64)> =
        Timeframe::iter().map(|t| (t.label(), 0)).collect();

    if let Some(conf) = &annotated.confluence {
        for hit in conf
            .core_confluence
            .iter()
            .chain(conf.liquidity_confluence.iter())
        {
            for (abbrev, count) in kind_counts.iter_mut() {
                if *abbrev == hit.kind.abbrev() {
                    *count += 1;
                }
            }
            for (label, count) in tf_counts.iter_mut() {
                if *label == hit.timeframe.label() {
                    *count += 1;
                }
            }
        }
    }

    for (abbrev, count) in kind_counts {
        put(record, &format!("conf_count_{abbrev}"), Value::from(count));
    }
    for (label, count) in tf_counts {
        put(record, &format!("conf_{label}_count"), Value::from(count));
    }
}

// Null-fill the payload columns under `prefix`, then overwrite the ones
// this kind has.
fn put_payload(record: &mut Map<String, Value>, prefix: &str, payload: &ZonePayload) {
    for key in PAYLOAD_COLUMNS {
        put(record, &format!("{prefix}{key}"), Value::Null);
    }
    match payload {
        ZonePayload::Structure {
            body_size,
            wick_ratio,
            ..
        } => {
            put(record, &format!("{prefix}body_size"), num(*body_size));
            put(record, &format!("{prefix}wick_ratio"), num(*wick_ratio));
        }
        ZonePayload::Liquidity {
            member_count,
            level,
            level_deviation,
            avg_volume_around_zone,
            duration_between_first_last_touch_ms,
            ..
        } => {
            put(
                record,
                &format!("{prefix}member_count"),
                Value::from(*member_count as u64),
            );
            put(record, &format!("{prefix}level"), num(*level));
            put(
                record,
                &format!("{prefix}level_deviation"),
                num(*level_deviation),
            );
            put(
                record,
                &format!("{prefix}avg_volume_around_zone"),
                num(*avg_volume_around_zone),
            );
            put(
                record,
                &format!("{prefix}duration_between_first_last_touch"),
                Value::from(*duration_between_first_last_touch_ms),
            );
        }
        ZonePayload::Ath => {}
    }
}

fn put_nearby_side(record: &mut Map<String, Value>, prefix: &str, summary: Option<&NearbySummary>) {
    match summary {
        Some(s) => {
            put(record, &format!("{prefix}_kind"), Value::from(s.kind.abbrev()));
            put(
                record,
                &format!("{prefix}_timeframe"),
                Value::from(s.timeframe.label()),
            );
            put(record, &format!("{prefix}_price_high"), num(s.price_high));
            put(record, &format!("{prefix}_price_low"), num(s.price_low));
            put(
                record,
                &format!("{prefix}_created_index"),
                Value::from(s.created_index as u64),
            );
            put(
                record,
                &format!("{prefix}_created_time"),
                Value::from(s.created_time_ms),
            );
            put(
                record,
                &format!("{prefix}_touch_index"),
                opt_u64(s.touch_index.map(|i| i as u64)),
            );
            put(
                record,
                &format!("{prefix}_touch_time"),
                opt_i64(s.touch_time_ms),
            );
            put(
                record,
                &format!("{prefix}_avg_volume_5"),
                num(s.stats.avg_volume_5),
            );
            put(
                record,
                &format!("{prefix}_close_std_5"),
                num(s.stats.close_std_5),
            );
            put(
                record,
                &format!("{prefix}_momentum_5"),
                num(s.stats.momentum_5),
            );
            for (name, value) in s.snapshot.fields() {
                put(record, &format!("{prefix}_{name}"), opt_num(value));
            }
            put_payload(record, &format!("{prefix}_"), &s.payload);
        }
        None => {
            for key in [
                "kind",
                "timeframe",
                "price_high",
                "price_low",
                "created_index",
                "created_time",
                "touch_index",
                "touch_time",
                "avg_volume_5",
                "close_std_5",
                "momentum_5",
            ] {
                put(record, &format!("{prefix}_{key}"), Value::Null);
            }
            for (name, _) in IndicatorSnapshot::default().fields() {
                put(record, &format!("{prefix}_{name}"), Value::Null);
            }
            for key in PAYLOAD_COLUMNS {
                put(record, &format!("{prefix}_{key}"), Value::Null);
            }
        }
    }
}
