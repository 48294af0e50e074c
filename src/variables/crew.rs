//! Crew seats and the `CREW_` family.

use super::{Value, VariableRegistry, parse_indexed};
use crate::snapshot::{CrewSeat, Snapshot};

pub(super) fn register(r: &mut VariableRegistry) {
    r.number("CREWCOUNT", |s| s.crew_count() as f64);
    r.number("CREWCAPACITY", |s| s.crew.len() as f64);
}

/// Resolve `CREW_<n>_{FIRST,LAST,FULL,PRESENT}` against the seat table.
pub(super) fn evaluate_indexed(
    name: &str,
    s: &Snapshot,
) -> Option<Value> {
    let (index, field) = parse_indexed(name, "CREW_")?;
    let seat = s.crew.get(index);
    match field {
        "FIRST" => Some(seat_text(seat, CrewSeat::first_name)),
        "LAST" => Some(seat_text(seat, CrewSeat::last_name)),
        "FULL" => Some(seat_text(seat, |c| c.occupant.as_deref().unwrap_or_default())),
        "PRESENT" => Some(Value::Number(match seat {
            Some(c) if c.occupant.is_some() => 1.0,
            Some(_) => -1.0,
            None => 0.0,
        })),
        _ => None,
    }
}

fn seat_text(
    seat: Option<&CrewSeat>,
    get: fn(&CrewSeat) -> &str,
) -> Value {
    Value::Text(seat.map(get).unwrap_or_default().to_owned())
}
