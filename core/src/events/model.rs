//! Canonical event model.
//!
//! Every line the classifier recognizes becomes one `ParsedEvent`. The
//! serde shape (`type` discriminant + `payload` object, camelCase fields)
//! matches the rows the persistence collaborator stores, so finalized
//! sequences round-trip through the event table unchanged.

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

/// Name used for synthesized kills until identification improves on it.
pub const UNKNOWN_CREATURE: &str = "Unknown Creature";

/// A game-world coordinate (planet longitude/latitude).
///
/// `(0, 0)` is the "unset" sentinel: no GPS evidence yet.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Location {
    pub lon: f64,
    pub lat: f64,
}

impl Location {
    pub fn new(lon: f64, lat: f64) -> Self {
        Self { lon, lat }
    }

    pub fn is_unset(&self) -> bool {
        self.lon == 0.0 && self.lat == 0.0
    }
}

/// One looted item as reported by a single loot line.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LootItem {
    pub name: String,
    pub count: u32,
    /// Trade-terminal value in PED.
    pub tt_value: f64,
}

/// A classified event with its stream identity.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ParsedEvent {
    pub timestamp: NaiveDateTime,
    pub session_id: String,
    pub user_id: String,
    #[serde(flatten)]
    pub kind: EventKind,
}

/// The tagged union of everything the pipeline understands.
///
/// Created once by the classifier (or synthesized by the aggregator) and
/// never mutated afterwards, with one exception: the aggregator may
/// overwrite the `location` of a `MobKilled` event a single time while a
/// GPS ping is within its look-back window.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "payload", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum EventKind {
    // ─── Offensive combat ────────────────────────────────────────────────
    #[serde(rename_all = "camelCase")]
    HitRegistered {
        damage: f64,
        critical: bool,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        damage_resisted: Option<f64>,
    },
    MissRegistered,
    TargetDodged,
    TargetEvaded,
    TargetJammed,

    // ─── Defensive combat ────────────────────────────────────────────────
    PlayerDodged,
    PlayerEvaded,
    #[serde(rename_all = "camelCase")]
    DamageTaken { amount: f64, critical: bool },
    DamageDeflected,
    #[serde(rename_all = "camelCase")]
    HealReceived { amount: f64 },

    // ─── Loot and kills ──────────────────────────────────────────────────
    #[serde(rename_all = "camelCase")]
    LootReceived {
        items: Vec<LootItem>,
        #[serde(rename = "totalTTValue")]
        total_tt_value: f64,
        is_global: bool,
    },
    #[serde(rename_all = "camelCase")]
    MobKilled {
        mob_name: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        mob_id: Option<i64>,
        location: Location,
    },

    // ─── Position ────────────────────────────────────────────────────────
    #[serde(rename_all = "camelCase")]
    GpsUpdate { location: Location },

    // ─── Progression ─────────────────────────────────────────────────────
    #[serde(rename_all = "camelCase")]
    SkillGain { skill: String, amount: f64 },
    #[serde(rename_all = "camelCase")]
    AttributeGain { attribute: String, amount: f64 },
    #[serde(rename_all = "camelCase")]
    EffectReceived { effect: String },
    #[serde(rename_all = "camelCase")]
    TierUp { item: String, tier: f64 },
    #[serde(rename_all = "camelCase")]
    EnhancerBroken { item: String, remaining: u32 },

    // ─── Player / world announcements ────────────────────────────────────
    #[serde(rename_all = "camelCase")]
    PlayerDeath {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        killer: Option<String>,
    },
    #[serde(rename_all = "camelCase")]
    GlobalKill {
        player: String,
        mob_name: String,
        value: f64,
        hall_of_fame: bool,
    },
    #[serde(rename_all = "camelCase")]
    MiningClaim { resource: String },
}

impl ParsedEvent {
    pub fn new(
        timestamp: NaiveDateTime,
        session_id: impl Into<String>,
        user_id: impl Into<String>,
        kind: EventKind,
    ) -> Self {
        Self {
            timestamp,
            session_id: session_id.into(),
            user_id: user_id.into(),
            kind,
        }
    }

    pub fn is_loot(&self) -> bool {
        matches!(self.kind, EventKind::LootReceived { .. })
    }

    pub fn is_kill(&self) -> bool {
        matches!(self.kind, EventKind::MobKilled { .. })
    }

    /// Events that mark active combat, used for time-to-kill bounds.
    pub fn is_combat(&self) -> bool {
        matches!(
            self.kind,
            EventKind::HitRegistered { .. }
                | EventKind::MissRegistered
                | EventKind::TargetDodged
                | EventKind::TargetEvaded
                | EventKind::TargetJammed
                | EventKind::PlayerDodged
                | EventKind::PlayerEvaded
                | EventKind::DamageTaken { .. }
                | EventKind::DamageDeflected
        )
    }

    /// Stable discriminant name, matching the serde `type` tag.
    pub fn kind_name(&self) -> &'static str {
        match self.kind {
            EventKind::HitRegistered { .. } => "HIT_REGISTERED",
            EventKind::MissRegistered => "MISS_REGISTERED",
            EventKind::TargetDodged => "TARGET_DODGED",
            EventKind::TargetEvaded => "TARGET_EVADED",
            EventKind::TargetJammed => "TARGET_JAMMED",
            EventKind::PlayerDodged => "PLAYER_DODGED",
            EventKind::PlayerEvaded => "PLAYER_EVADED",
            EventKind::DamageTaken { .. } => "DAMAGE_TAKEN",
            EventKind::DamageDeflected => "DAMAGE_DEFLECTED",
            EventKind::HealReceived { .. } => "HEAL_RECEIVED",
            EventKind::LootReceived { .. } => "LOOT_RECEIVED",
            EventKind::MobKilled { .. } => "MOB_KILLED",
            EventKind::GpsUpdate { .. } => "GPS_UPDATE",
            EventKind::SkillGain { .. } => "SKILL_GAIN",
            EventKind::AttributeGain { .. } => "ATTRIBUTE_GAIN",
            EventKind::EffectReceived { .. } => "EFFECT_RECEIVED",
            EventKind::TierUp { .. } => "TIER_UP",
            EventKind::EnhancerBroken { .. } => "ENHANCER_BROKEN",
            EventKind::PlayerDeath { .. } => "PLAYER_DEATH",
            EventKind::GlobalKill { .. } => "GLOBAL_KILL",
            EventKind::MiningClaim { .. } => "MINING_CLAIM",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn ts() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 1, 15)
            .unwrap()
            .and_hms_opt(12, 34, 56)
            .unwrap()
    }

    #[test]
    fn serializes_with_type_and_payload() {
        let ev = ParsedEvent::new(
            ts(),
            "s1",
            "u1",
            EventKind::HitRegistered {
                damage: 45.6,
                critical: false,
                damage_resisted: None,
            },
        );
        let json = serde_json::to_value(&ev).unwrap();
        assert_eq!(json["type"], "HIT_REGISTERED");
        assert_eq!(json["payload"]["damage"], 45.6);
        assert_eq!(json["sessionId"], "s1");
    }

    #[test]
    fn loot_payload_keeps_original_tt_key() {
        let ev = ParsedEvent::new(
            ts(),
            "s1",
            "u1",
            EventKind::LootReceived {
                items: vec![LootItem {
                    name: "Animal Muscle Oil".into(),
                    count: 12,
                    tt_value: 2.4,
                }],
                total_tt_value: 2.4,
                is_global: false,
            },
        );
        let json = serde_json::to_value(&ev).unwrap();
        assert_eq!(json["payload"]["totalTTValue"], 2.4);
        assert_eq!(json["payload"]["items"][0]["ttValue"], 2.4);
    }

    #[test]
    fn round_trips_through_json() {
        let ev = ParsedEvent::new(
            ts(),
            "s1",
            "u1",
            EventKind::MobKilled {
                mob_name: UNKNOWN_CREATURE.into(),
                mob_id: None,
                location: Location::new(100.0, 200.0),
            },
        );
        let json = serde_json::to_string(&ev).unwrap();
        let back: ParsedEvent = serde_json::from_str(&json).unwrap();
        assert_eq!(ev, back);
    }
}
