use std::sync::{LazyLock, RwLock, RwLockReadGuard};

pub static CONFIGURATION: LazyLock<RwLock<Configuration>> =
    LazyLock::new(|| RwLock::new(Configuration::default()));

/// Settings consulted while importing and exporting GRASP models
#[derive(Clone, Debug)]
pub struct Configuration {
    /// Reaction id prefixes marking exchange/boundary reactions, which are
    /// catalyzed by the sentinel exchange enzyme instead of a declared isoenzyme
    pub exchange_prefixes: Vec<String>,
    /// Isoenzyme key of the sentinel exchange enzyme
    pub exchange_enzyme: String,
    /// Title of the single Reference row used for eQuilibrator estimates
    pub equilibrator_title: String,
    /// Number of decimals Gibbs energy means and half-widths are rounded to
    pub gibbs_decimals: i32,
    /// Subunit count used when the `subunits` cell is blank
    pub default_subunits: u32,
}

impl Default for Configuration {
    fn default() -> Self {
        Configuration {
            exchange_prefixes: vec!["EX_".to_string(), "IN_".to_string()],
            exchange_enzyme: "EX_enz".to_string(),
            equilibrator_title: "eQuilibrator".to_string(),
            gibbs_decimals: 2,
            default_subunits: 1,
        }
    }
}

impl Configuration {
    /// Whether `reaction_id` names an exchange/boundary reaction
    pub fn is_exchange_reaction(&self, reaction_id: &str) -> bool {
        self.exchange_prefixes
            .iter()
            .any(|prefix| reaction_id.starts_with(prefix.as_str()))
    }
}

/// Read the global configuration, recovering it if a writer panicked
pub fn read_configuration() -> RwLockReadGuard<'static, Configuration> {
    CONFIGURATION
        .read()
        .unwrap_or_else(|poisoned| poisoned.into_inner())
}
