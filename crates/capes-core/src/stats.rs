//! # Stats Module
//!
//! Aggregate statistics over the whole catalogue.
//!
//! Every partition is counted independently in one pass. The mean power
//! level is computed in integer hundredths and rounded half-up, so the
//! result is exact and identical on every platform.

use crate::{Character, Decimal2, Universe};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Summary of the full record set.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatsSnapshot {
    #[serde(rename = "total_superheroes")]
    pub total: usize,
    #[serde(rename = "active_superheroes")]
    pub active: usize,
    #[serde(rename = "inactive_superheroes")]
    pub inactive: usize,
    pub villains: usize,
    #[serde(rename = "superheroes")]
    pub heroes: usize,
    /// Mean power level, two decimal places; `0.00` for an empty catalogue.
    #[serde(with = "average_number")]
    pub average_power_level: Decimal2,
    /// Only universes that occur are present.
    pub universe_distribution: BTreeMap<Universe, usize>,
    /// Only power levels that occur are present.
    pub power_level_distribution: BTreeMap<u8, usize>,
}

/// The average as a JSON number (`7.33`). The value is produced from the
/// exact decimal text, so no rounding happens on the way out.
mod average_number {
    use crate::{Decimal2, FieldValue};
    use serde::{Deserialize, Deserializer, Serializer, de, ser};

    pub fn serialize<S: Serializer>(value: &Decimal2, s: S) -> Result<S::Ok, S::Error> {
        let number = value
            .to_string()
            .parse::<f64>()
            .map_err(|_| ser::Error::custom("average out of range"))?;
        s.serialize_f64(number)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Decimal2, D::Error> {
        FieldValue::deserialize(d)?
            .to_decimal()
            .map_err(|_| de::Error::custom("invalid decimal"))
    }
}

/// Mean of `sum / count` in hundredths, rounded half-up.
fn mean_hundredths(sum: u64, count: u64) -> i64 {
    if count == 0 {
        return 0;
    }
    // (sum / count) * 100 + 0.5, kept in integers.
    let scaled = sum.saturating_mul(200).saturating_add(count) / count.saturating_mul(2);
    i64::try_from(scaled).unwrap_or(i64::MAX)
}

impl StatsSnapshot {
    /// Aggregate a record set.
    #[must_use]
    pub fn compute(records: &[Character]) -> Self {
        let mut snapshot = Self {
            total: records.len(),
            ..Self::default()
        };
        let mut power_sum: u64 = 0;

        for record in records {
            let a = &record.attrs;
            if a.is_active {
                snapshot.active += 1;
            } else {
                snapshot.inactive += 1;
            }
            if a.is_villain {
                snapshot.villains += 1;
            } else {
                snapshot.heroes += 1;
            }
            power_sum += u64::from(a.power_level);
            *snapshot.universe_distribution.entry(a.universe).or_insert(0) += 1;
            *snapshot
                .power_level_distribution
                .entry(a.power_level)
                .or_insert(0) += 1;
        }

        snapshot.average_power_level =
            Decimal2::from_hundredths(mean_hundredths(power_sum, records.len() as u64));
        snapshot
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::panic)]
mod tests {
    use super::*;
    use crate::{CharacterAttrs, CharacterId};
    use chrono::Utc;

    fn record(id: u64, power: u8, universe: Universe, active: bool, villain: bool) -> Character {
        Character {
            id: CharacterId(id),
            attrs: CharacterAttrs {
                power_level: power,
                universe,
                is_active: active,
                is_villain: villain,
                ..CharacterAttrs::named(format!("C{}", id))
            },
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn empty_catalogue() {
        let stats = StatsSnapshot::compute(&[]);
        assert_eq!(stats.total, 0);
        assert_eq!(stats.average_power_level, Decimal2::ZERO);
        assert!(stats.universe_distribution.is_empty());
        assert!(stats.power_level_distribution.is_empty());
    }

    #[test]
    fn partitions_and_average() {
        let records = vec![
            record(1, 5, Universe::Marvel, true, false),
            record(2, 7, Universe::Dc, false, true),
            record(3, 10, Universe::Dc, true, false),
        ];
        let stats = StatsSnapshot::compute(&records);

        assert_eq!(stats.total, 3);
        assert_eq!(stats.active + stats.inactive, stats.total);
        assert_eq!(stats.villains + stats.heroes, stats.total);
        assert_eq!(stats.villains, 1);
        assert_eq!(stats.average_power_level, Decimal2(733));
        assert_eq!(stats.universe_distribution.get(&Universe::Dc), Some(&2));
        assert_eq!(stats.universe_distribution.get(&Universe::Other), None);
        assert_eq!(stats.power_level_distribution.get(&7), Some(&1));
    }

    #[test]
    fn average_rounds_half_up() {
        assert_eq!(mean_hundredths(2, 3), 67);
        assert_eq!(mean_hundredths(1, 8), 13);
        assert_eq!(mean_hundredths(20, 2), 1000);
        assert_eq!(mean_hundredths(0, 0), 0);
    }

    #[test]
    fn json_field_names() {
        let records = vec![record(1, 7, Universe::Dc, true, false)];
        let json = serde_json::to_value(StatsSnapshot::compute(&records)).unwrap();

        assert_eq!(json["total_superheroes"], 1);
        assert_eq!(json["active_superheroes"], 1);
        assert_eq!(json["inactive_superheroes"], 0);
        assert_eq!(json["superheroes"], 1);
        assert_eq!(json["average_power_level"], 7.0);
        assert_eq!(json["universe_distribution"]["DC"], 1);
        assert_eq!(json["power_level_distribution"]["7"], 1);
    }

    #[test]
    fn average_is_a_json_number() {
        let records = vec![
            record(1, 5, Universe::Marvel, true, false),
            record(2, 7, Universe::Dc, false, true),
            record(3, 10, Universe::Dc, true, false),
        ];
        let json = serde_json::to_value(StatsSnapshot::compute(&records)).unwrap();
        assert!(json["average_power_level"].is_number());
        assert_eq!(json["average_power_level"], 7.33);
        assert!(json.to_string().contains("\"average_power_level\":7.33"));

        let back: StatsSnapshot = serde_json::from_value(json).unwrap();
        assert_eq!(back.average_power_level, Decimal2(733));
    }
}
