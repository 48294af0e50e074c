//! Action-group states as 1/0 flags.

use super::{Value, VariableRegistry};

pub(super) fn register(r: &mut VariableRegistry) {
    r.flag("GEAR", |s| s.vessel.action_groups.gear);
    r.flag("BRAKES", |s| s.vessel.action_groups.brakes);
    r.flag("SAS", |s| s.vessel.action_groups.sas);
    r.flag("RCS", |s| s.vessel.action_groups.rcs);
    r.flag("LIGHTS", |s| s.vessel.action_groups.lights);
    r.flag("ABORT", |s| s.vessel.action_groups.abort);
    for group in 0..10 {
        r.define(format!("AG{group}"), move |s| Value::from(s.vessel.action_groups.custom[group]));
    }
}

#[cfg(test)]
mod tests {
    use super::super::evaluate;
    use super::super::test_support::orbiting_vessel;
    use super::*;
    use crate::snapshot::Snapshot;

    #[test]
    fn test_flags() {
        let mut v = orbiting_vessel();
        v.action_groups.gear = true;
        v.action_groups.custom[3] = true;
        let s = Snapshot::build(&v);
        assert_eq!(evaluate("GEAR", &s), Value::Number(1.0));
        assert_eq!(evaluate("BRAKES", &s), Value::Number(0.0));
        assert_eq!(evaluate("AG3", &s), Value::Number(1.0));
        assert_eq!(evaluate("AG4", &s), Value::Number(0.0));
        assert_eq!(evaluate("AG10", &s), Value::Text("AG10".into()));
    }
}
