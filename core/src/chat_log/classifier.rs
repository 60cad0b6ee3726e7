//! Stateless single-line classifier.
//!
//! `classify` tries an ordered list of pattern matchers and returns the
//! first match; a line matching nothing yields `None`, which is not an
//! error (chat noise outnumbers system messages). Matching uses prefix
//! and suffix slicing, no regex. Numeric captures are parsed tolerantly;
//! a capture that fails to parse makes the whole line non-matching.
//!
//! Ordering matters in two places: the critical-damage forms must be
//! checked before their generic counterparts, and the skill-experience
//! form before the bare attribute-gain form.

use super::{GLOBALS_CHANNEL, RawLine, SYSTEM_CHANNEL};
use crate::events::model::{EventKind, Location, LootItem, ParsedEvent};

const CRIT_MARKER: &str = "Critical hit - Additional damage! ";

/// Classify one raw line into at most one event.
///
/// Pure apart from a `tracing::debug!` diagnostic on GPS lines.
pub fn classify(raw: &RawLine, session_id: &str, user_id: &str) -> Option<ParsedEvent> {
    let (channel, _sender, body) = raw.split_channel()?;

    let kind = match channel {
        SYSTEM_CHANNEL => match_system(body),
        GLOBALS_CHANNEL => match_global(body),
        _ => None,
    }
    // Waypoints are pasted into ordinary chat, so they match any channel.
    .or_else(|| match_waypoint(body))?;

    Some(ParsedEvent::new(raw.timestamp, session_id, user_id, kind))
}

fn match_system(body: &str) -> Option<EventKind> {
    // Critical forms strip their marker and reuse the generic matcher;
    // checked first so the generic patterns never shadow them.
    if let Some(rest) = body.strip_prefix(CRIT_MARKER) {
        if let Some(kind) = match_hit(rest, true) {
            return Some(kind);
        }
        if let Some(kind) = match_damage_taken(rest, true) {
            return Some(kind);
        }
    }

    match_hit(body, false)
        .or_else(|| match_damage_taken(body, false))
        .or_else(|| match_avoidance(body))
        .or_else(|| match_heal(body))
        .or_else(|| match_loot(body))
        .or_else(|| match_skill_gain(body))
        .or_else(|| match_attribute_gain(body))
        .or_else(|| match_effect(body))
        .or_else(|| match_tier_up(body))
        .or_else(|| match_enhancer_break(body))
        .or_else(|| match_death(body))
        .or_else(|| match_claim(body))
}

// ─── Combat ──────────────────────────────────────────────────────────────

fn match_hit(body: &str, critical: bool) -> Option<EventKind> {
    let rest = body.strip_prefix("You inflicted ")?;
    let (damage, rest) = take_number(rest)?;
    let rest = rest.strip_prefix(" points of damage.")?;

    // Optional resisted remainder: "... damage. (12.3 points resisted)"
    let damage_resisted = rest
        .trim_start()
        .strip_prefix('(')
        .and_then(|r| r.strip_suffix(" points resisted)"))
        .and_then(parse_number);

    Some(EventKind::HitRegistered {
        damage,
        critical,
        damage_resisted,
    })
}

fn match_damage_taken(body: &str, critical: bool) -> Option<EventKind> {
    let rest = body.strip_prefix("You took ")?;
    let (amount, rest) = take_number(rest)?;
    rest.strip_prefix(" points of damage")?;
    Some(EventKind::DamageTaken { amount, critical })
}

fn match_avoidance(body: &str) -> Option<EventKind> {
    match body.trim_end() {
        "You missed." => Some(EventKind::MissRegistered),
        "The target Dodged your attack." => Some(EventKind::TargetDodged),
        "The target Evaded your attack." => Some(EventKind::TargetEvaded),
        "The target Jammed your attack." => Some(EventKind::TargetJammed),
        "You Dodged an attack." => Some(EventKind::PlayerDodged),
        "You Evaded the attack." => Some(EventKind::PlayerEvaded),
        "Damage deflected!" => Some(EventKind::DamageDeflected),
        _ => None,
    }
}

fn match_heal(body: &str) -> Option<EventKind> {
    let rest = body.strip_prefix("You healed yourself ")?;
    let (amount, rest) = take_number(rest)?;
    rest.strip_prefix(" points")?;
    Some(EventKind::HealReceived { amount })
}

// ─── Loot ────────────────────────────────────────────────────────────────

/// `You received Animal Muscle Oil x (12) Value: 2.40 PED`
fn match_loot(body: &str) -> Option<EventKind> {
    let rest = body.strip_prefix("You received ")?;
    let x_pos = rest.rfind(" x (")?;
    let name = rest[..x_pos].trim();
    let after = &rest[x_pos + 4..];
    let close = after.find(')')?;
    let count: u32 = after[..close].trim().parse().ok()?;
    let value_part = after[close + 1..].trim_start().strip_prefix("Value: ")?;
    let tt_value = parse_number(value_part.trim_end().strip_suffix(" PED")?)?;

    if name.is_empty() {
        return None;
    }

    Some(EventKind::LootReceived {
        items: vec![LootItem {
            name: name.to_string(),
            count,
            tt_value,
        }],
        total_tt_value: tt_value,
        is_global: false,
    })
}

// ─── Progression ─────────────────────────────────────────────────────────

fn match_skill_gain(body: &str) -> Option<EventKind> {
    let rest = body.strip_prefix("You have gained ")?;
    let (amount, rest) = take_number(rest)?;
    let rest = rest.strip_prefix(" experience in your ")?;
    let skill = rest.trim_end_matches('.').strip_suffix(" skill")?.trim();
    Some(EventKind::SkillGain {
        skill: skill.to_string(),
        amount,
    })
}

fn match_attribute_gain(body: &str) -> Option<EventKind> {
    let rest = body.strip_prefix("You have gained ")?;
    let (amount, rest) = take_number(rest)?;
    let attribute = rest.trim().trim_end_matches('.');
    if attribute.is_empty() || attribute.contains(' ') {
        return None;
    }
    Some(EventKind::AttributeGain {
        attribute: attribute.to_string(),
        amount,
    })
}

fn match_effect(body: &str) -> Option<EventKind> {
    let effect = body.strip_prefix("You are affected by ")?;
    Some(EventKind::EffectReceived {
        effect: effect.trim_end_matches('.').to_string(),
    })
}

fn match_tier_up(body: &str) -> Option<EventKind> {
    let rest = body.strip_prefix("Your ")?;
    let pos = rest.find(" has reached tier ")?;
    let item = &rest[..pos];
    let tier = parse_number(rest[pos + 18..].trim_end_matches(['.', '!']))?;
    Some(EventKind::TierUp {
        item: item.to_string(),
        tier,
    })
}

fn match_enhancer_break(body: &str) -> Option<EventKind> {
    let rest = body.strip_prefix("Your ")?;
    let pos = rest.find(" broke. You have ")?;
    let item = &rest[..pos];
    let after = &rest[pos + 17..];
    let end = after.find(" enhancer")?;
    let remaining: u32 = after[..end].trim().parse().ok()?;
    Some(EventKind::EnhancerBroken {
        item: item.to_string(),
        remaining,
    })
}

fn match_death(body: &str) -> Option<EventKind> {
    let rest = body.strip_prefix("You were killed by ")?;
    let killer = rest
        .trim_end_matches(['!', '.'])
        .trim_start_matches("the vicious ")
        .trim();
    Some(EventKind::PlayerDeath {
        killer: (!killer.is_empty()).then(|| killer.to_string()),
    })
}

fn match_claim(body: &str) -> Option<EventKind> {
    let rest = body.strip_prefix("You have claimed a resource! (")?;
    let resource = rest.strip_suffix(')')?;
    Some(EventKind::MiningClaim {
        resource: resource.to_string(),
    })
}

// ─── Globals channel ─────────────────────────────────────────────────────

/// `Jane Doe killed a creature (Atrox Young) with a value of 54 PED!`
fn match_global(body: &str) -> Option<EventKind> {
    let pos = body.find(" killed a creature (")?;
    let player = body[..pos].trim();
    let after = &body[pos + 20..];
    let close = after.find(')')?;
    let mob_name = after[..close].trim();
    let value_part = after[close + 1..]
        .trim_start()
        .strip_prefix("with a value of ")?;
    let (value, _) = take_number(value_part)?;

    Some(EventKind::GlobalKill {
        player: player.to_string(),
        mob_name: mob_name.to_string(),
        value,
        hall_of_fame: body.contains("Hall of Fame"),
    })
}

// ─── Waypoints ───────────────────────────────────────────────────────────

/// `[Calypso, 79085, 67537, 120, waypoint]` pasted into any chat channel.
fn match_waypoint(body: &str) -> Option<EventKind> {
    let start = body.find('[')?;
    let end = body[start..].find(']')? + start;
    let fields: Vec<&str> = body[start + 1..end].split(',').collect();
    if fields.len() < 4 {
        return None;
    }

    let lon = parse_number(fields[1].trim())?;
    let lat = parse_number(fields[2].trim())?;
    let location = Location::new(lon, lat);

    // Diagnostic only; not part of the functional contract.
    tracing::debug!(lon, lat, "waypoint line classified as GPS update");

    Some(EventKind::GpsUpdate { location })
}

// ─── Numeric helpers ─────────────────────────────────────────────────────

/// Split a leading decimal number off `s`. Tolerates integers and
/// fractional forms; anything else rejects the capture.
fn take_number(s: &str) -> Option<(f64, &str)> {
    let end = s
        .find(|c: char| !c.is_ascii_digit() && c != '.' && c != '-')
        .unwrap_or(s.len());
    let value = parse_number(&s[..end])?;
    Some((value, &s[end..]))
}

fn parse_number(s: &str) -> Option<f64> {
    let v: f64 = s.trim().parse().ok()?;
    v.is_finite().then_some(v)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{NaiveDate, NaiveDateTime};

    fn now() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 1, 15)
            .unwrap()
            .and_hms_opt(12, 0, 0)
            .unwrap()
    }

    fn classify_line(line: &str) -> Option<ParsedEvent> {
        classify(&RawLine::new(line, now()), "s1", "u1")
    }

    #[test]
    fn classifies_hit() {
        let ev = classify_line("2024-01-15 12:34:56 [System] [] You inflicted 45.6 points of damage.")
            .unwrap();
        assert_eq!(
            ev.kind,
            EventKind::HitRegistered {
                damage: 45.6,
                critical: false,
                damage_resisted: None
            }
        );
    }

    #[test]
    fn critical_hit_checked_before_generic() {
        let ev = classify_line(
            "2024-01-15 12:34:56 [System] [] Critical hit - Additional damage! You inflicted 103.4 points of damage.",
        )
        .unwrap();
        assert_eq!(
            ev.kind,
            EventKind::HitRegistered {
                damage: 103.4,
                critical: true,
                damage_resisted: None
            }
        );
    }

    #[test]
    fn critical_damage_taken_checked_before_generic() {
        let ev = classify_line(
            "2024-01-15 12:34:56 [System] [] Critical hit - Additional damage! You took 31.2 points of damage.",
        )
        .unwrap();
        assert_eq!(
            ev.kind,
            EventKind::DamageTaken {
                amount: 31.2,
                critical: true
            }
        );
    }

    #[test]
    fn classifies_avoidance_family() {
        let cases = [
            ("You missed.", EventKind::MissRegistered),
            ("The target Dodged your attack.", EventKind::TargetDodged),
            ("The target Evaded your attack.", EventKind::TargetEvaded),
            ("The target Jammed your attack.", EventKind::TargetJammed),
            ("You Dodged an attack.", EventKind::PlayerDodged),
            ("You Evaded the attack.", EventKind::PlayerEvaded),
        ];
        for (body, expected) in cases {
            let line = format!("2024-01-15 12:34:56 [System] [] {body}");
            assert_eq!(classify_line(&line).unwrap().kind, expected, "{body}");
        }
    }

    #[test]
    fn classifies_loot_line() {
        let ev = classify_line(
            "2024-01-15 12:34:56 [System] [] You received Animal Muscle Oil x (12) Value: 2.40 PED",
        )
        .unwrap();
        let EventKind::LootReceived {
            items,
            total_tt_value,
            is_global,
        } = ev.kind
        else {
            panic!("not loot");
        };
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].name, "Animal Muscle Oil");
        assert_eq!(items[0].count, 12);
        assert_eq!(total_tt_value, 2.4);
        assert!(!is_global);
    }

    #[test]
    fn classifies_skill_before_attribute() {
        let ev = classify_line(
            "2024-01-15 12:34:56 [System] [] You have gained 0.5872 experience in your Rifle skill",
        )
        .unwrap();
        assert_eq!(
            ev.kind,
            EventKind::SkillGain {
                skill: "Rifle".into(),
                amount: 0.5872
            }
        );

        let ev = classify_line("2024-01-15 12:34:56 [System] [] You have gained 0.0719 Agility")
            .unwrap();
        assert_eq!(
            ev.kind,
            EventKind::AttributeGain {
                attribute: "Agility".into(),
                amount: 0.0719
            }
        );
    }

    #[test]
    fn classifies_global_kill_and_hof() {
        let ev = classify_line(
            "2024-01-15 12:40:00 [Globals] [] Jane Doe killed a creature (Atrox Young) with a value of 54 PED!",
        )
        .unwrap();
        assert_eq!(
            ev.kind,
            EventKind::GlobalKill {
                player: "Jane Doe".into(),
                mob_name: "Atrox Young".into(),
                value: 54.0,
                hall_of_fame: false
            }
        );

        let ev = classify_line(
            "2024-01-15 12:41:00 [Globals] [] Jane Doe killed a creature (Atrox Stalker) with a value of 801 PED! A record has been added to the Hall of Fame!",
        )
        .unwrap();
        assert!(matches!(
            ev.kind,
            EventKind::GlobalKill { hall_of_fame: true, .. }
        ));
    }

    #[test]
    fn classifies_waypoint_on_chat_channel() {
        let ev = classify_line(
            "2024-01-15 12:42:00 [Local] [Jane Doe] [Calypso, 79085, 67537, 120, waypoint]",
        )
        .unwrap();
        assert_eq!(
            ev.kind,
            EventKind::GpsUpdate {
                location: Location::new(79085.0, 67537.0)
            }
        );
    }

    #[test]
    fn combat_text_outside_system_channel_is_dropped() {
        assert!(classify_line("2024-01-15 12:34:56 [Local] [Jane Doe] You missed.").is_none());
        assert!(classify_line("You inflicted 45.6 points of damage.").is_none());
    }

    #[test]
    fn malformed_number_makes_line_non_matching() {
        assert!(
            classify_line("2024-01-15 12:34:56 [System] [] You inflicted NaN points of damage.")
                .is_none()
        );
        assert!(
            classify_line(
                "2024-01-15 12:34:56 [System] [] You received Widget x (many) Value: 1.00 PED"
            )
            .is_none()
        );
    }

    #[test]
    fn unrecognized_system_line_is_dropped_silently() {
        assert!(
            classify_line("2024-01-15 12:34:56 [System] [] Session time: 1 hour").is_none()
        );
    }

    #[test]
    fn classifies_death_and_effect() {
        let ev = classify_line(
            "2024-01-15 12:50:00 [System] [] You were killed by the vicious Atrox Prowler!",
        )
        .unwrap();
        assert_eq!(
            ev.kind,
            EventKind::PlayerDeath {
                killer: Some("Atrox Prowler".into())
            }
        );

        let ev = classify_line("2024-01-15 12:50:10 [System] [] You are affected by Bleeding.")
            .unwrap();
        assert_eq!(
            ev.kind,
            EventKind::EffectReceived {
                effect: "Bleeding".into()
            }
        );
    }
}
