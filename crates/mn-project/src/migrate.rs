//! Schema migration framework.

use crate::ProjectError;
use crate::schema::Scenario;

pub const LATEST_VERSION: u32 = 1;

/// Seed that version-0 files implicitly used for every random signal.
pub const LEGACY_SEED: u64 = 42;

pub fn migrate_to_latest(mut scenario: Scenario) -> Result<Scenario, ProjectError> {
    while scenario.version < LATEST_VERSION {
        scenario = migrate_one_version(scenario)?;
    }
    Ok(scenario)
}

fn migrate_one_version(scenario: Scenario) -> Result<Scenario, ProjectError> {
    match scenario.version {
        0 => migrate_v0_to_v1(scenario),
        v => Err(ProjectError::Migration {
            what: format!("No migration path from version {}", v),
        }),
    }
}

/// Version 0 had no `seed` field; random signals always drew from seed 42.
fn migrate_v0_to_v1(mut scenario: Scenario) -> Result<Scenario, ProjectError> {
    if scenario.signal.is_random() && scenario.seed.is_none() {
        scenario.seed = Some(LEGACY_SEED);
    }
    scenario.version = 1;
    Ok(scenario)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn load(version: u32, signal: &str) -> Scenario {
        let yaml = format!(
            "version: {version}\nname: m\nsignal: {signal}\nsolver: {{ dt_s: 5.0e-8, t_end_s: 1.0e-5 }}\n"
        );
        serde_yaml::from_str(&yaml).unwrap()
    }

    #[test]
    fn migrate_latest_is_noop() {
        let scenario = load(LATEST_VERSION, "{ type: Constant, value: 0.0 }");
        let migrated = migrate_to_latest(scenario.clone()).unwrap();
        assert_eq!(migrated, scenario);
    }

    #[test]
    fn v0_random_signal_gets_legacy_seed() {
        let scenario = load(0, "{ type: PinkNoise, baseline: 0.0, amplitude: 1.0e-6, frequency: 1.0e5 }");
        let migrated = migrate_to_latest(scenario).unwrap();
        assert_eq!(migrated.version, LATEST_VERSION);
        assert_eq!(migrated.seed, Some(LEGACY_SEED));
    }

    #[test]
    fn v0_deterministic_signal_stays_unseeded() {
        let scenario = load(0, "{ type: Constant, value: 1.0e-6 }");
        let migrated = migrate_to_latest(scenario).unwrap();
        assert_eq!(migrated.seed, None);
    }
}
